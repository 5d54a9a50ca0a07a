//! Multi-step protocols: judgement, pin-dian and card aiming.

use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::cards::{CardId, CardView, RealCardId};
use crate::core::{EngineError, EngineErrorKind, EngineResult, PlayerId};
use crate::events::{AimEvent, CardLostReason, Event, GameEvent, JudgeEvent, PinDianEvent, PinDianResult, Stage, Targets};
use crate::processor::{GameProcessor, StageHandler};
use crate::transport::Transport;
use crate::zones::StackEnd;

use super::messages::{Notice, Prompt, Response};
use super::Room;

/// Winner of a pin-dian given each participant's card number, in
/// participant order.
///
/// The highest number wins. A later card that ties the current leader
/// erases the lead; a strictly higher card afterwards can still take it.
#[must_use]
pub fn pindian_winner(numbers: &[(PlayerId, u8)]) -> Option<PlayerId> {
    let mut leader: Option<PlayerId> = None;
    let mut best: Option<u8> = None;
    for &(player, number) in numbers {
        match best {
            Some(top) if number < top => {}
            Some(top) if number == top => leader = None,
            _ => {
                leader = Some(player);
                best = Some(number);
            }
        }
    }
    leader
}

impl Room {
    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    // === Judgement ===

    /// Judge for `player`: reveal the top card of the draw stack, let skills
    /// replace it, then bury whatever was involved. Returns the final judge
    /// card as the rules see it.
    pub async fn judge(
        &mut self,
        player: PlayerId,
        by_card: Option<CardId>,
        by_skill: Option<String>,
    ) -> EngineResult<CardView> {
        self.check_player(player)?;
        let revealed = self.take_from_draw_stack(1, StackEnd::Top)?;
        let original: CardId = revealed
            .first()
            .copied()
            .ok_or_else(|| EngineError::new(EngineErrorKind::EmptyDeck))?
            .into();

        let mut event = Event::new(GameEvent::Judge(JudgeEvent {
            to: player,
            judge_card: original.clone(),
            by_card,
            by_skill,
        }));
        let outcome = GameProcessor::handle(self, &mut event, Some(&mut JudgeHandler)).await;

        let final_card = match &event.payload {
            GameEvent::Judge(judge) => judge.judge_card.clone(),
            _ => original.clone(),
        };
        let view = self.card_view(&final_card);
        let involved = self.virtual_cards.resolve_all(&[original, final_card.clone()])?;
        self.bury_real(&involved);
        self.release_virtual(&final_card);

        outcome?;
        view
    }

    // === Pin-dian ===

    /// Pin-dian between `from` and `targets`. Every participant submits a
    /// hand card at once; a participant who does not answer submits their
    /// first hand card.
    pub async fn pindian(&mut self, from: PlayerId, targets: Vec<PlayerId>) -> EngineResult<PinDianResult> {
        if targets.is_empty() {
            return Err(EngineError::new(EngineErrorKind::IllegalAction("pin-dian needs a target".into())));
        }
        for &player in std::iter::once(&from).chain(&targets) {
            self.check_player(player)?;
            if !self.player(player).is_alive() || self.hand(player).is_empty() {
                return Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
                    "{player} cannot pin-dian"
                ))));
            }
        }

        let mut event = Event::new(GameEvent::PinDian(PinDianEvent {
            from,
            targets: targets.into_iter().collect(),
            result: None,
        }));
        let mut handler = PinDianHandler { submitted: Vec::new() };
        let outcome = GameProcessor::handle(self, &mut event, Some(&mut handler)).await;
        self.bury_real(&handler.submitted);
        outcome?;

        match event.payload {
            GameEvent::PinDian(PinDianEvent {
                result: Some(result), ..
            }) => Ok(result),
            _ => Ok(PinDianResult {
                winner: None,
                cards: Vec::new(),
            }),
        }
    }

    /// Ask every participant for a card concurrently and collect the
    /// answers in participant order.
    async fn collect_pindian_cards(&mut self, participants: &[PlayerId], from: PlayerId) -> Vec<(PlayerId, RealCardId)> {
        let prompt = Prompt::AskForPinDian { from };
        let timeout = self.config().response_timeout();
        let transport = self.transport();

        let mut waits = Vec::with_capacity(participants.len());
        for &player in participants {
            let request = if self.player(player).online {
                self.post_request(player, &prompt)
                    .map_err(|error| warn!(%player, %error, "Pin-dian prompt could not be sent"))
                    .ok()
            } else {
                None
            };
            let transport = Arc::clone(&transport);
            let prompt = prompt.clone();
            waits.push(async move {
                match request {
                    Some(id) => Room::await_reply(transport, player, id, prompt, timeout).await,
                    None => None,
                }
            });
        }
        let answers = join_all(waits).await;

        participants
            .iter()
            .zip(answers)
            .filter_map(|(&player, answer)| {
                let hand = self.hand(player);
                let chosen = match answer {
                    Some(Response::Card(Some(CardId::Real(card)))) if hand.contains(&card) => Some(card),
                    Some(other) => {
                        debug!(%player, ?other, "Pin-dian answer unusable, first hand card used");
                        None
                    }
                    None => None,
                };
                chosen.or_else(|| hand.first().copied()).map(|card| (player, card))
            })
            .collect()
    }

    // === Aiming ===

    /// Run the Aim events of a card use and return the surviving targets
    /// together with the skills the aim events were triggered by.
    ///
    /// A multi-target card aims at each original target separately.
    pub async fn aim(
        &mut self,
        from: PlayerId,
        card: &CardId,
        targets: Targets,
        multi: bool,
    ) -> EngineResult<(Targets, Vec<String>)> {
        let groups: Vec<Targets> = if multi {
            targets.iter().map(|&t| std::iter::once(t).collect()).collect()
        } else {
            vec![targets]
        };

        let mut survivors = Targets::new();
        let mut forced: Vec<String> = Vec::new();
        for group in groups {
            let mut event = Event::new(GameEvent::Aim(AimEvent {
                from,
                by_card: card.clone(),
                targets: group,
            }));
            GameProcessor::handle(self, &mut event, None).await?;

            for skill in event.control.triggered_by() {
                if !forced.contains(skill) {
                    forced.push(skill.clone());
                }
            }
            if event.is_terminated() {
                continue;
            }
            if let GameEvent::Aim(aim) = &event.payload {
                for &target in &aim.targets {
                    if !survivors.contains(&target) {
                        survivors.push(target);
                    }
                }
            }
        }
        debug!(%from, %card, ?survivors, "Aimed");
        Ok((survivors, forced))
    }
}

struct JudgeHandler;

impl StageHandler for JudgeHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage == Stage::JudgeEffect {
                if let GameEvent::Judge(judge) = &event.payload {
                    info!(player = %judge.to, card = %judge.judge_card, "Judge result");
                    room.broadcast(Notice::JudgeResult {
                        player: judge.to,
                        card: judge.judge_card.clone(),
                    });
                }
            }
            Ok(true)
        }
        .boxed()
    }
}

struct PinDianHandler {
    submitted: Vec<RealCardId>,
}

impl StageHandler for PinDianHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::PinDianEffect {
                return Ok(true);
            }
            let GameEvent::PinDian(pindian) = &event.payload else {
                return Ok(false);
            };
            let from = pindian.from;
            let participants: Vec<PlayerId> = std::iter::once(from).chain(pindian.targets.iter().copied()).collect();

            let chosen = room.collect_pindian_cards(&participants, from).await;
            let mut numbers = Vec::with_capacity(chosen.len());
            let mut cards = Vec::with_capacity(chosen.len());
            for (player, card) in chosen {
                let lost = room
                    .lose_cards(player, &[CardId::Real(card)], CardLostReason::PinDian, None)
                    .await?;
                if !lost.contains(&card) {
                    continue;
                }
                self.submitted.push(card);
                numbers.push((player, room.card_view(&CardId::Real(card))?.number));
                cards.push((player, CardId::Real(card)));
            }

            let winner = pindian_winner(&numbers);
            info!(%from, ?winner, ?numbers, "Pin-dian");
            room.broadcast(Notice::PinDianResult {
                winner,
                cards: cards.clone(),
            });
            if let GameEvent::PinDian(pindian) = &mut event.payload {
                pindian.result = Some(PinDianResult { winner, cards });
            }
            Ok(true)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(numbers: &[u8]) -> Vec<(PlayerId, u8)> {
        numbers
            .iter()
            .enumerate()
            .map(|(i, &n)| (PlayerId::new(i as u8), n))
            .collect()
    }

    #[test]
    fn test_highest_wins() {
        assert_eq!(pindian_winner(&ranks(&[5, 3, 2])), Some(PlayerId::new(0)));
        assert_eq!(pindian_winner(&ranks(&[2, 9])), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_tie_erases_leader() {
        assert_eq!(pindian_winner(&ranks(&[5, 5, 3])), None);
        assert_eq!(pindian_winner(&ranks(&[5, 3, 5, 4])), None);
    }

    #[test]
    fn test_higher_card_after_tie_wins() {
        assert_eq!(pindian_winner(&ranks(&[5, 5, 7])), Some(PlayerId::new(2)));
    }

    #[test]
    fn test_no_participants() {
        assert_eq!(pindian_winner(&[]), None);
    }
}
