//! Card movement: drawing, losing, dropping, obtaining, equipping.
//!
//! Every movement validates its inputs before touching a zone, then runs its
//! event through the processor; the zone changes happen in the stage
//! handler. Cards leaving a player always pass through the processing area,
//! from which they are either picked up by their destination or buried.
//!
//! Visibility follows one policy ([`Room::announce_move`]): judge-zone moves
//! are public, hand traffic, draw-stack traffic and card-play losses are
//! broadcast as a count with the full list sent to the owners involved, and
//! everything else is public.

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, info};

use crate::cards::{CardId, RealCardId};
use crate::core::{EngineError, EngineErrorKind, EngineResult, PlayerId};
use crate::events::{
    CardDropEvent, CardLostEvent, CardLostReason, CardObtainedReason, DrawCardEvent, Event, GameEvent,
    ObtainCardEvent, Stage,
};
use crate::processor::{GameProcessor, StageHandler};
use crate::zones::{Area, StackEnd, Zone, ZonePosition};

use super::messages::Notice;
use super::Room;

/// A request to move cards between arbitrary zones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCards {
    pub cards: Vec<CardId>,
    /// Player the cards are taken from; `None` for shared zones.
    pub from: Option<PlayerId>,
    pub to: Zone,
    /// Reason recorded on the loss when `from` is a player.
    pub reason: CardLostReason,
    /// Player who caused the move.
    pub proposer: Option<PlayerId>,
}

impl MoveCards {
    #[must_use]
    pub fn new(cards: Vec<CardId>, to: Zone) -> Self {
        Self {
            cards,
            from: None,
            to,
            reason: CardLostReason::PassiveMove,
            proposer: None,
        }
    }

    #[must_use]
    pub fn from_player(mut self, player: PlayerId) -> Self {
        self.from = Some(player);
        self
    }

    #[must_use]
    pub fn proposed_by(mut self, player: PlayerId) -> Self {
        self.proposer = Some(player);
        if self.from == Some(player) {
            self.reason = CardLostReason::ActiveMove;
        }
        self
    }
}

impl Room {
    // === Drawing ===

    /// Draw `amount` cards into `player`'s hand from one end of the draw
    /// stack. Returns the cards drawn.
    pub async fn draw_cards(&mut self, player: PlayerId, amount: usize, end: StackEnd) -> EngineResult<Vec<RealCardId>> {
        self.check_player(player)?;
        let mut event = Event::new(GameEvent::DrawCard(DrawCardEvent {
            player,
            amount,
            asked_by: player,
        }));
        let mut handler = DrawHandler { end, drawn: Vec::new() };
        GameProcessor::handle(self, &mut event, Some(&mut handler)).await?;
        Ok(handler.drawn)
    }

    /// Move `amount` cards from the draw stack into the processing area,
    /// folding the discard stack in once if the draw stack is short.
    ///
    /// Fails with `EmptyDeck` before moving anything if both stacks together
    /// cannot supply `amount` cards.
    pub(crate) fn take_from_draw_stack(&mut self, amount: usize, end: StackEnd) -> EngineResult<Vec<RealCardId>> {
        if self.draw_stack().len() + self.discard_stack().len() < amount {
            return Err(EngineError::new(EngineErrorKind::EmptyDeck));
        }
        if self.draw_stack().len() < amount {
            let folded = self.zones.fold_discard_into_draw(&mut self.rng);
            if folded > 0 {
                info!(folded, "Discard stack reshuffled into draw stack");
                self.broadcast(Notice::Reshuffled {
                    draw_stack_size: self.draw_stack().len(),
                });
            }
        }

        let cards = self.zones.peek_draw(amount, end);
        for &card in &cards {
            self.zones.move_to_zone(card, Zone::Processing, ZonePosition::Top);
        }
        self.announce_move(&cards, Some(&Zone::DrawStack), &Zone::Processing, None);
        Ok(cards)
    }

    // === Obtaining ===

    /// Move cards into `to`'s hand from wherever they are.
    pub async fn obtain_cards(
        &mut self,
        to: PlayerId,
        cards: Vec<RealCardId>,
        from: Option<PlayerId>,
        reason: CardObtainedReason,
    ) -> EngineResult<()> {
        self.check_player(to)?;
        for &card in &cards {
            self.check_tracked(card)?;
        }
        if cards.is_empty() {
            return Ok(());
        }
        let mut event = Event::new(GameEvent::ObtainCard(ObtainCardEvent { to, from, cards, reason }));
        GameProcessor::handle(self, &mut event, Some(&mut ObtainHandler)).await
    }

    // === Losing and dropping ===

    /// Resolve `cards` to physical cards and find where `player` holds each
    /// one. Nothing moves.
    pub fn held_cards(&self, player: PlayerId, cards: &[CardId]) -> EngineResult<Vec<(RealCardId, Area)>> {
        self.check_player(player)?;
        self.virtual_cards
            .resolve_all(cards)?
            .into_iter()
            .map(|card| {
                self.zones
                    .find_in_player(player, card)
                    .map(|area| (card, area))
                    .ok_or_else(|| EngineError::new(EngineErrorKind::CardNotHeld(player, card)))
            })
            .collect()
    }

    /// Take cards from `player` into the processing area.
    ///
    /// Every card is validated first; a card `player` does not hold aborts
    /// with `CardNotHeld` and nothing moves. Returns the cards that actually
    /// left, which is empty if a skill cancelled the loss.
    pub async fn lose_cards(
        &mut self,
        player: PlayerId,
        cards: &[CardId],
        reason: CardLostReason,
        dropped_by: Option<PlayerId>,
    ) -> EngineResult<Vec<RealCardId>> {
        let held = self.held_cards(player, cards)?;
        if held.is_empty() {
            return Ok(Vec::new());
        }
        let mut event = Event::new(GameEvent::CardLost(CardLostEvent {
            from: player,
            cards: held,
            reason,
            dropped_by,
        }));
        let mut handler = LoseHandler { lost: Vec::new() };
        GameProcessor::handle(self, &mut event, Some(&mut handler)).await?;
        Ok(handler.lost)
    }

    /// Drop cards of `player` to the discard stack.
    pub async fn drop_cards(&mut self, player: PlayerId, cards: &[CardId], dropped_by: PlayerId) -> EngineResult<()> {
        self.held_cards(player, cards)?;
        if cards.is_empty() {
            return Ok(());
        }
        let mut event = Event::new(GameEvent::CardDrop(CardDropEvent {
            from: player,
            cards: cards.to_vec(),
            dropped_by,
        }));
        GameProcessor::handle(self, &mut event, Some(&mut DropHandler)).await
    }

    /// Move in-flight cards to the top of the discard stack. Cards that are
    /// no longer in the processing area are left alone.
    pub fn bury(&mut self, cards: &[CardId]) -> EngineResult<()> {
        let real = self.virtual_cards.resolve_all(cards)?;
        self.bury_real(&real);
        Ok(())
    }

    pub(crate) fn bury_real(&mut self, cards: &[RealCardId]) {
        let in_flight: Vec<RealCardId> = cards
            .iter()
            .copied()
            .filter(|&card| self.zones.is_in_zone(card, &Zone::Processing))
            .collect();
        if in_flight.is_empty() {
            return;
        }
        for &card in &in_flight {
            self.zones.move_to_zone(card, Zone::DiscardStack, ZonePosition::Top);
        }
        debug!(count = in_flight.len(), "Buried");
        self.announce_move(&in_flight, Some(&Zone::Processing), &Zone::DiscardStack, None);
        self.retire_virtuals_over(&in_flight);
    }

    /// Return cards to one end of the draw stack. The first card listed
    /// ends up closest to that end.
    pub fn put_cards(&mut self, end: StackEnd, cards: &[RealCardId]) -> EngineResult<()> {
        for &card in cards {
            self.check_tracked(card)?;
        }
        for &card in cards.iter().rev() {
            let from = self.zones.move_to_zone(card, Zone::DrawStack, end.into());
            self.announce_move(&[card], from.as_ref(), &Zone::DrawStack, None);
        }
        Ok(())
    }

    // === General moves ===

    /// Move cards to any zone. Cards taken from a player are lost first;
    /// equip arrivals displace same-type equipment; hand arrivals are
    /// obtained.
    pub async fn move_cards(&mut self, request: MoveCards) -> EngineResult<()> {
        let MoveCards {
            cards,
            from,
            to,
            reason,
            proposer,
        } = request;

        let real = match from {
            Some(player) => self.lose_cards(player, &cards, reason, proposer).await?,
            None => {
                let real = self.virtual_cards.resolve_all(&cards)?;
                for &card in &real {
                    self.check_tracked(card)?;
                }
                real
            }
        };
        if real.is_empty() {
            return Ok(());
        }
        let into_processing = to == Zone::Processing;

        match to {
            Zone::Hand(player) => {
                let reason = if proposer == Some(player) {
                    CardObtainedReason::ActivePrey
                } else {
                    CardObtainedReason::PassiveObtained
                };
                self.obtain_cards(player, real.clone(), from, reason).await?;
            }
            Zone::Equip(player) => {
                for &card in &real {
                    self.equip(player, card).await?;
                }
            }
            Zone::DiscardStack => {
                let remaining: Vec<RealCardId> = real
                    .iter()
                    .copied()
                    .filter(|&c| !self.zones.is_in_zone(c, &Zone::Processing))
                    .collect();
                self.relocate(&remaining, &Zone::Processing, ZonePosition::Top, None);
                self.bury_real(&real);
            }
            Zone::DrawStack => self.put_cards(StackEnd::Top, &real)?,
            other => self.relocate(&real, &other, ZonePosition::Top, None),
        }

        // Anything left in flight by a cancelled arrival goes to the discard.
        if !into_processing {
            self.bury_real(&real);
        }
        Ok(())
    }

    /// Put an equip card into `player`'s equip zone, displacing equipment of
    /// the same type to the discard stack.
    pub async fn equip(&mut self, player: PlayerId, card: RealCardId) -> EngineResult<()> {
        self.check_player(player)?;
        self.check_tracked(card)?;
        let equip_type = self.catalog.card(card)?.card_type.equip_type().ok_or_else(|| {
            EngineError::new(EngineErrorKind::IllegalAction(format!("card {card} is not equipment")))
        })?;

        let displaced: Vec<CardId> = self
            .equips(player)
            .iter()
            .copied()
            .filter(|&held| held != card)
            .filter(|&held| {
                self.catalog
                    .card(held)
                    .is_ok_and(|def| def.card_type.equip_type() == Some(equip_type))
            })
            .map(CardId::from)
            .collect();
        if !displaced.is_empty() {
            let lost = self
                .lose_cards(player, &displaced, CardLostReason::PlaceToDropStack, None)
                .await?;
            self.bury_real(&lost);
        }

        info!(%player, %card, ?equip_type, "Equipped");
        self.relocate(&[card], &Zone::Equip(player), ZonePosition::Top, None);
        Ok(())
    }

    // === Internals ===

    pub(crate) fn check_tracked(&self, card: RealCardId) -> EngineResult<()> {
        if self.zones.contains(card) {
            Ok(())
        } else {
            Err(EngineError::new(EngineErrorKind::UnknownCard(card.into())))
        }
    }

    /// Move cards to `to`, announcing each group of cards that came from
    /// the same zone.
    pub(crate) fn relocate(
        &mut self,
        cards: &[RealCardId],
        to: &Zone,
        position: ZonePosition,
        reason: Option<CardLostReason>,
    ) {
        let mut groups: Vec<(Option<Zone>, Vec<RealCardId>)> = Vec::new();
        for &card in cards {
            let Some(from) = self.zones.move_to_zone(card, to.clone(), position) else {
                continue;
            };
            match groups.iter_mut().find(|(zone, _)| zone.as_ref() == Some(&from)) {
                Some((_, moved)) => moved.push(card),
                None => groups.push((Some(from), vec![card])),
            }
        }
        for (from, moved) in groups {
            if from.as_ref() != Some(to) {
                self.announce_move(&moved, from.as_ref(), to, reason);
            }
        }
        if *to == Zone::DiscardStack {
            self.retire_virtuals_over(cards);
        }
    }

    /// Tell clients about a move, hiding card identities where needed.
    pub(crate) fn announce_move(
        &self,
        cards: &[RealCardId],
        from: Option<&Zone>,
        to: &Zone,
        reason: Option<CardLostReason>,
    ) {
        if cards.is_empty() {
            return;
        }
        let touches_judge = matches!(from, Some(Zone::Judge(_))) || matches!(to, Zone::Judge(_));
        let private_end = |zone: &Zone| matches!(zone, Zone::Hand(_) | Zone::DrawStack | Zone::Outside(..));
        let hidden = !touches_judge
            && (reason.is_some_and(CardLostReason::is_card_play)
                || from.is_some_and(private_end)
                || private_end(to));

        if !hidden {
            self.broadcast(Notice::CardsMoved {
                cards: cards.to_vec(),
                from: from.cloned(),
                to: to.clone(),
            });
            return;
        }

        self.broadcast(Notice::CardsMovedHidden {
            count: cards.len(),
            from: from.cloned(),
            to: to.clone(),
        });
        let mut owners: Vec<PlayerId> = Vec::with_capacity(2);
        for owner in from.and_then(Zone::owner).into_iter().chain(to.owner()) {
            if !owners.contains(&owner) {
                owners.push(owner);
            }
        }
        for owner in owners {
            self.notify(
                owner,
                Notice::CardsMoved {
                    cards: cards.to_vec(),
                    from: from.cloned(),
                    to: to.clone(),
                },
            );
        }
    }
}

struct DrawHandler {
    end: StackEnd,
    drawn: Vec<RealCardId>,
}

impl StageHandler for DrawHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::CardDrawing {
                return Ok(true);
            }
            let GameEvent::DrawCard(draw) = &event.payload else {
                return Ok(false);
            };
            let (player, amount) = (draw.player, draw.amount);
            if amount == 0 {
                return Ok(true);
            }
            let cards = room.take_from_draw_stack(amount, self.end)?;
            info!(%player, amount, "Drew cards");
            room.obtain_cards(player, cards.clone(), None, CardObtainedReason::CardDraw)
                .await?;
            room.bury_real(&cards);
            self.drawn = cards;
            Ok(true)
        }
        .boxed()
    }
}

struct ObtainHandler;

impl StageHandler for ObtainHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage == Stage::CardObtaining {
                if let GameEvent::ObtainCard(obtain) = &event.payload {
                    room.relocate(&obtain.cards, &Zone::Hand(obtain.to), ZonePosition::Top, None);
                }
            }
            Ok(true)
        }
        .boxed()
    }
}

struct LoseHandler {
    lost: Vec<RealCardId>,
}

impl StageHandler for LoseHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::CardLosing {
                return Ok(true);
            }
            let GameEvent::CardLost(lost) = &event.payload else {
                return Ok(false);
            };
            // Skills at BeforeCardLose may already have moved some cards.
            let still_held: Vec<RealCardId> = lost
                .cards
                .iter()
                .filter(|(card, area)| room.zones.is_in_zone(*card, &Zone::of(lost.from, area.clone())))
                .map(|(card, _)| *card)
                .collect();
            room.relocate(&still_held, &Zone::Processing, ZonePosition::Top, Some(lost.reason));
            self.lost = still_held;
            Ok(true)
        }
        .boxed()
    }
}

struct DropHandler;

impl StageHandler for DropHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::CardDropping {
                return Ok(true);
            }
            let GameEvent::CardDrop(drop) = &event.payload else {
                return Ok(false);
            };
            let reason = if drop.from == drop.dropped_by {
                CardLostReason::ActiveDrop
            } else {
                CardLostReason::PassiveDrop
            };
            info!(from = %drop.from, count = drop.cards.len(), "Dropping cards");
            let lost = room
                .lose_cards(drop.from, &drop.cards, reason, Some(drop.dropped_by))
                .await?;
            room.bury_real(&lost);
            Ok(true)
        }
        .boxed()
    }
}
