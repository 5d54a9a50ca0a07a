//! Game setup and turn flow.
//!
//! A turn walks the current player through the six phases, each announced
//! by a PhaseChange event that skills may cancel to skip the phase.

use tracing::{debug, info, info_span, Instrument};

use crate::cards::{CardId, RealCardId};
use crate::core::{EngineError, EngineErrorKind, EngineResult, PlayerId};
use crate::events::{CardUseEvent, Event, GameEvent, PhaseChangeEvent, PlayerPhase, Stage};
use crate::processor::{GameProcessor, StageHandler};
use crate::rules::{check_card_use, roles_for, GameResult, Role};
use crate::zones::{StackEnd, Zone, ZonePosition};

use futures::future::BoxFuture;
use futures::FutureExt;

use super::actions::CardEffectHandler;
use super::messages::{Notice, PlayAction, Prompt, Response};
use super::Room;

impl Room {
    /// Shuffle the deck and seats, assign roles and deal opening hands.
    pub async fn game_start(&mut self) -> EngineResult<()> {
        if self.is_started() {
            return Err(EngineError::new(EngineErrorKind::IllegalAction("game already started".into())));
        }
        self.zones.shuffle_zone(&Zone::DrawStack, &mut self.rng);

        let mut seats = self.seats().to_vec();
        if self.config().shuffle_seats {
            self.rng_mut().shuffle(&mut seats);
        }

        if self.config().assign_roles {
            let mut roles = roles_for(seats.len())?;
            self.rng_mut().shuffle(&mut roles);
            for (&player, &role) in seats.iter().zip(&roles) {
                self.player_mut(player).role = Some(role);
            }
            if let Some(lord_seat) = roles.iter().position(|&r| r == Role::Lord) {
                seats.rotate_left(lord_seat);
                let lord = seats[0];
                // Rebinding grants the lord-only skills.
                if let Some(character) = self.player(lord).character {
                    self.bind_character(lord, character)?;
                }
            }
        }
        self.set_seats(seats);

        let first = self.seats()[0];
        self.set_current(first);
        self.mark_started();
        info!(players = self.player_count(), %first, "Game started");

        let hand_size = self.config().initial_hand_size;
        for player in self.seats().to_vec() {
            self.draw_cards(player, hand_size, StackEnd::Top).await?;
        }
        self.broadcast(Notice::Snapshot(self.snapshot()));
        Ok(())
    }

    /// Play the current player's turn.
    pub async fn play_turn(&mut self) -> EngineResult<()> {
        let player = self.current();
        if !self.player(player).is_alive() {
            return Ok(());
        }
        let keep = self.limit_skill_names(player);
        self.player_mut(player).reset_history(&keep);

        if self.player(player).turned_over {
            debug!(%player, "Turned over, turn skipped");
            return self.turn_over(player);
        }

        let mut previous = None;
        for phase in PlayerPhase::ALL {
            if self.is_over() || !self.player(player).is_alive() {
                break;
            }
            if self.player(player).skipped_phases.contains(&phase) {
                debug!(%player, ?phase, "Phase skipped");
                continue;
            }
            let mut event = Event::new(GameEvent::PhaseChange(PhaseChangeEvent {
                player,
                from: previous,
                to: phase,
            }));
            GameProcessor::handle(self, &mut event, Some(&mut PhaseHandler)).await?;
            previous = Some(phase);
        }
        self.player_mut(player).skipped_phases.clear();
        self.set_phase(None);
        Ok(())
    }

    /// Skip `phase` of `player`'s current or next turn.
    pub fn skip_phase(&mut self, player: PlayerId, phase: PlayerPhase) -> EngineResult<()> {
        self.check_player(player)?;
        let skipped = &mut self.player_mut(player).skipped_phases;
        if !skipped.contains(&phase) {
            skipped.push(phase);
        }
        Ok(())
    }

    async fn run_phase(&mut self, player: PlayerId, phase: PlayerPhase) -> EngineResult<()> {
        match phase {
            PlayerPhase::Judge => self.judge_phase(player).await,
            PlayerPhase::Draw => {
                let amount = self.config().draw_phase_amount;
                self.draw_cards(player, amount, StackEnd::Top).await.map(|_| ())
            }
            PlayerPhase::Play => {
                self.play_phase(player).await;
                Ok(())
            }
            PlayerPhase::Drop => self.drop_phase(player).await,
            PlayerPhase::Prepare | PlayerPhase::Finish => Ok(()),
        }
    }

    /// Resolve delayed tricks, last placed first.
    async fn judge_phase(&mut self, player: PlayerId) -> EngineResult<()> {
        let pending: Vec<RealCardId> = self.judge_area(player).iter().rev().copied().collect();
        for card in pending {
            if self.is_over() || !self.player(player).is_alive() {
                break;
            }
            if !self.zones.is_in_zone(card, &Zone::Judge(player)) {
                continue;
            }
            self.relocate(&[card], &Zone::Processing, ZonePosition::Top, None);

            let id = CardId::Real(card);
            let effect = self
                .card_view(&id)?
                .skill
                .and_then(|name| self.catalog().skill(&name).ok().and_then(|s| s.as_active().cloned()));
            if let Some(effect) = effect {
                let mut event = Event::new(GameEvent::CardEffect(CardUseEvent::new(player, id).with_target(player)));
                let mut handler = CardEffectHandler { effect };
                let outcome = GameProcessor::handle(self, &mut event, Some(&mut handler)).await;
                self.bury_real(&[card]);
                outcome?;
            } else {
                self.bury_real(&[card]);
            }
        }
        Ok(())
    }

    /// Ask for play actions until the player finishes or the action budget
    /// runs out. Rejected or failing actions are reported and play goes on.
    async fn play_phase(&mut self, player: PlayerId) {
        for _ in 0..self.config().max_play_actions {
            if self.is_over() || !self.player(player).is_alive() {
                break;
            }
            let action = match self.ask(player, Prompt::AskForPlayAction).await {
                Some(Response::PlayAction(action)) => action,
                _ => PlayAction::Finish,
            };
            let outcome = match action {
                PlayAction::Finish => break,
                PlayAction::UseCard { card, targets } => self.play_card(player, card, &targets).await,
                PlayAction::UseSkill { skill, cards, targets } => self.use_skill(player, &skill, cards, targets).await,
                PlayAction::ViewAs {
                    skill,
                    cards,
                    as_card,
                    targets,
                } => match self.view_as(player, &skill, cards, &as_card) {
                    Ok(card) => self.play_card(player, card, &targets).await,
                    Err(error) => Err(error),
                },
            };
            if let Err(error) = outcome {
                self.report(&error);
            }
        }
    }

    async fn play_card(&mut self, player: PlayerId, card: CardId, chosen: &[PlayerId]) -> EngineResult<()> {
        match check_card_use(self, player, &card, chosen) {
            Ok(targets) => self.use_card(player, card, targets).await,
            Err(error) => {
                self.release_virtual(&card);
                Err(error)
            }
        }
    }

    /// Drop down to the hand limit, which is the player's hp.
    async fn drop_phase(&mut self, player: PlayerId) -> EngineResult<()> {
        let limit = usize::try_from(self.player(player).hp.max(0)).unwrap_or(0);
        let excess = self.hand(player).len().saturating_sub(limit);
        if excess > 0 {
            self.ask_for_card_drop(player, excess).await?;
        }
        Ok(())
    }

    /// Advance to the next alive player in seat order. The round goes up
    /// when the seat order wraps.
    pub fn next_turn(&mut self) {
        let current = self.current();
        let order = self.alive_players_from(current);
        let next = match order.as_slice() {
            [] => return,
            [first, rest @ ..] if *first == current => rest.first().copied().unwrap_or(current),
            [first, ..] => *first,
        };
        let seat_of = |p: PlayerId| self.player(p).seat;
        if seat_of(next) <= seat_of(current) {
            self.advance_round();
        }
        self.set_current(next);
    }

    /// Play the game to the end.
    ///
    /// Contract violations inside a turn are reported and the game moves on;
    /// an exhausted deck ends the game in a draw, as does reaching the
    /// configured round limit.
    pub async fn run(&mut self) -> EngineResult<GameResult> {
        if !self.is_started() {
            self.game_start().await?;
        }
        loop {
            if let Some(result) = self.result() {
                return Ok(result.clone());
            }

            let (round, player) = (self.round(), self.current());
            let turn = self.play_turn().instrument(info_span!("turn", round, %player)).await;
            if let Err(error) = turn {
                self.report(&error);
                if error.kind == EngineErrorKind::EmptyDeck {
                    self.finish(GameResult::Draw);
                }
            }
            if self.is_over() {
                continue;
            }

            self.next_turn();
            let limit = self.config().max_rounds;
            if limit > 0 && self.round() > limit {
                info!(limit, "Round limit reached");
                self.finish(GameResult::Draw);
            }
        }
    }
}

/// Sets the phase and runs its body once the change went through.
struct PhaseHandler;

impl StageHandler for PhaseHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::PhaseChanged {
                return Ok(true);
            }
            let GameEvent::PhaseChange(change) = &event.payload else {
                return Ok(false);
            };
            let (player, phase) = (change.player, change.to);
            room.set_phase(Some(phase));
            debug!(%player, ?phase, "Phase");
            room.broadcast(Notice::PhaseChanged { player, phase });
            room.run_phase(player, phase).await?;
            Ok(true)
        }
        .boxed()
    }
}
