//! Gameplay verbs: using and responding with cards, active skills, hp
//! changes, dying and death, and the card prompts built on top of them.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::cards::{CardId, CardType, CardView, RealCardId};
use crate::core::{EngineError, EngineErrorKind, EngineResult, PlayerId};
use crate::events::{
    AskForCardEvent, CardLostReason, CardResponseEvent, CardUseEvent, DamageEvent, Event, GameEvent, LoseHpEvent,
    PlayerDeathEvent, RecoverEvent, SkillUseEvent, Stage, Targets,
};
use crate::processor::{GameProcessor, StageHandler};
use crate::rules::{check_game_over, Standing};
use crate::skills::ActiveSkill;
use crate::zones::{Zone, ZonePosition};

use super::messages::{Notice, Prompt, Response};
use super::Room;

/// Name of the card asked for when a player is dying.
pub const RESCUE_CARD: &str = "peach";

impl Room {
    // === Cards ===

    /// Use a card. The card leaves `from` at the start of the use and is
    /// buried when the use ends, whatever happened in between. A virtual
    /// card is released afterwards, even if the use was refused.
    pub async fn use_card(&mut self, from: PlayerId, card: CardId, targets: Vec<PlayerId>) -> EngineResult<()> {
        let outcome = self.run_card_use(from, card.clone(), targets).await;
        self.release_virtual(&card);
        outcome
    }

    async fn run_card_use(&mut self, from: PlayerId, card: CardId, targets: Vec<PlayerId>) -> EngineResult<()> {
        self.check_player(from)?;
        for &target in &targets {
            self.check_player(target)?;
        }
        let view = self.card_view(&card)?;
        self.held_cards(from, &[card.clone()])?;

        let effect = match view.skill.as_deref() {
            Some(name) => self.catalog.skill(name)?.as_active().cloned(),
            None => None,
        };
        if effect.is_none() && !matches!(view.card_type, CardType::Equip(_) | CardType::DelayedTrick) {
            return Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
                "{} has no effect",
                view.name
            ))));
        }

        let aimed = !targets.is_empty();
        let mut event = Event::new(GameEvent::CardUse(CardUseEvent {
            from,
            card,
            targets: targets.into_iter().collect(),
        }));
        let mut handler = CardUseHandler {
            view,
            effect,
            aimed,
            moved: Vec::new(),
        };
        let outcome = GameProcessor::handle(self, &mut event, Some(&mut handler)).await;
        self.bury_real(&handler.moved);
        outcome
    }

    /// Play a card in response to a request. Returns whether the response
    /// went through. A virtual card is released afterwards.
    pub async fn response_card(&mut self, from: PlayerId, card: CardId) -> EngineResult<bool> {
        let outcome = self.run_card_response(from, card.clone()).await;
        self.release_virtual(&card);
        outcome
    }

    async fn run_card_response(&mut self, from: PlayerId, card: CardId) -> EngineResult<bool> {
        self.check_player(from)?;
        self.held_cards(from, &[card.clone()])?;
        let mut event = Event::new(GameEvent::CardResponse(CardResponseEvent { from, card }));
        let mut handler = CardResponseHandler {
            moved: Vec::new(),
            completed: false,
        };
        let outcome = GameProcessor::handle(self, &mut event, Some(&mut handler)).await;
        self.bury_real(&handler.moved);
        outcome?;
        Ok(handler.completed && !event.is_terminated())
    }

    /// Build a virtual card out of `cards` through a view-as skill.
    pub fn view_as(&mut self, owner: PlayerId, skill: &str, cards: Vec<CardId>, as_card: &str) -> EngineResult<CardId> {
        self.check_player(owner)?;
        let definition = self
            .effective_skills(owner)
            .into_iter()
            .find(|s| s.name == skill)
            .ok_or_else(|| EngineError::new(EngineErrorKind::IllegalAction(format!("{owner} lacks {skill}"))))?;
        let view_as = definition.as_view_as().cloned().ok_or_else(|| {
            EngineError::new(EngineErrorKind::IllegalAction(format!("{skill} cannot view cards as others")))
        })?;

        if !view_as.can_view_as().iter().any(|name| name == as_card) {
            return Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
                "{skill} cannot produce {as_card}"
            ))));
        }
        if cards.len() != view_as.card_count() {
            return Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
                "{skill} needs {} cards, got {}",
                view_as.card_count(),
                cards.len()
            ))));
        }
        self.held_cards(owner, &cards)?;
        for card in &cards {
            let view = self.card_view(card)?;
            if !view_as.card_filter(self, owner, &view) {
                return Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
                    "{skill} rejects {}",
                    view.name
                ))));
            }
        }

        let id = self.virtual_cards.create(as_card, Some(skill), cards);
        debug!(%owner, %skill, %id, "Virtual card created");
        Ok(id)
    }

    // === Active skills ===

    /// Use an active skill of `from`.
    pub async fn use_skill(
        &mut self,
        from: PlayerId,
        skill: &str,
        cards: Vec<CardId>,
        targets: Vec<PlayerId>,
    ) -> EngineResult<()> {
        self.check_player(from)?;
        let definition = self
            .effective_skills(from)
            .into_iter()
            .find(|s| s.name == skill)
            .ok_or_else(|| EngineError::new(EngineErrorKind::IllegalAction(format!("{from} lacks {skill}"))))?;
        let active = definition.as_active().cloned().ok_or_else(|| {
            EngineError::new(EngineErrorKind::IllegalAction(format!("{skill} is not an active skill")))
        })?;
        self.check_skill_use(from, skill, &active, &cards, &targets)?;

        let mut skill_use = SkillUseEvent::new(from, skill);
        skill_use.cards = cards;
        skill_use.targets = targets.into_iter().collect();

        let mut use_event = Event::new(GameEvent::SkillUse(skill_use));
        let mut using = ActiveSkillHandler {
            active: Arc::clone(&active),
        };
        GameProcessor::handle(self, &mut use_event, Some(&mut using)).await?;
        if use_event.is_terminated() {
            return Ok(());
        }
        let GameEvent::SkillUse(skill_use) = use_event.payload else {
            return Ok(());
        };
        let mut effect_event = Event::new(GameEvent::SkillEffect(skill_use));
        GameProcessor::handle(self, &mut effect_event, Some(&mut using)).await
    }

    fn check_skill_use(
        &self,
        from: PlayerId,
        skill: &str,
        active: &Arc<dyn ActiveSkill>,
        cards: &[CardId],
        targets: &[PlayerId],
    ) -> EngineResult<()> {
        let illegal = |reason: String| Err(EngineError::new(EngineErrorKind::IllegalAction(reason)));
        if !active.can_use(self, from) {
            return illegal(format!("{skill} cannot be used now"));
        }
        let (min_cards, max_cards) = active.card_range();
        if cards.len() < min_cards || cards.len() > max_cards {
            return illegal(format!("{skill} takes {min_cards}..={max_cards} cards"));
        }
        let (min_targets, max_targets) = active.target_range();
        if targets.len() < min_targets || targets.len() > max_targets {
            return illegal(format!("{skill} takes {min_targets}..={max_targets} targets"));
        }
        self.held_cards(from, cards)?;
        for card in cards {
            let view = self.card_view(card)?;
            if !active.card_filter(self, from, &view) {
                return illegal(format!("{skill} rejects {}", view.name));
            }
        }
        for &target in targets {
            self.check_player(target)?;
            if !active.target_filter(self, from, target) {
                return illegal(format!("{skill} cannot target {target}"));
            }
        }
        Ok(())
    }

    // === Hp ===

    /// Deal damage. A target left at 0 hp or below enters dying.
    pub async fn damage(&mut self, damage: DamageEvent) -> EngineResult<()> {
        self.check_player(damage.to)?;
        if !self.player(damage.to).is_alive() || damage.amount <= 0 {
            return Ok(());
        }
        let mut event = Event::new(GameEvent::Damage(damage));
        GameProcessor::handle(self, &mut event, Some(&mut HpHandler)).await
    }

    /// Lose hp without a source. A player left at 0 hp or below enters dying.
    pub async fn lose_hp(&mut self, player: PlayerId, amount: i32) -> EngineResult<()> {
        self.check_player(player)?;
        if !self.player(player).is_alive() || amount <= 0 {
            return Ok(());
        }
        let mut event = Event::new(GameEvent::LoseHp(LoseHpEvent { player, amount }));
        GameProcessor::handle(self, &mut event, Some(&mut HpHandler)).await
    }

    /// Recover hp, capped at max hp.
    pub async fn recover(&mut self, to: PlayerId, by: Option<PlayerId>, amount: i32) -> EngineResult<()> {
        self.check_player(to)?;
        if !self.player(to).is_alive() || amount <= 0 {
            return Ok(());
        }
        let mut event = Event::new(GameEvent::Recover(RecoverEvent { to, by, amount }));
        GameProcessor::handle(self, &mut event, Some(&mut HpHandler)).await
    }

    pub(crate) fn change_hp(&mut self, player: PlayerId, delta: i32) {
        let target = self.player_mut(player);
        target.hp = (target.hp + delta).min(target.max_hp);
        let (hp, max_hp) = (target.hp, target.max_hp);
        info!(%player, delta, hp, "Hp changed");
        self.broadcast(Notice::HpChanged { player, hp, max_hp });
    }

    /// Ask every alive player, starting from the current one, to rescue
    /// `player`; kill them if nobody does.
    pub async fn dying(&mut self, player: PlayerId, killed_by: Option<PlayerId>) -> EngineResult<()> {
        self.check_player(player)?;
        if !self.player(player).is_alive() || self.player(player).hp > 0 {
            return Ok(());
        }
        let mut event = Event::new(GameEvent::PlayerDying(PlayerDeathEvent { player, killed_by }));
        GameProcessor::handle(self, &mut event, Some(&mut DyingHandler)).await
    }

    /// Kill a player: reveal their role, drop their cards, check game over.
    pub async fn kill(&mut self, player: PlayerId, killed_by: Option<PlayerId>) -> EngineResult<()> {
        self.check_player(player)?;
        if !self.player(player).is_alive() {
            return Ok(());
        }
        let mut event = Event::new(GameEvent::PlayerDied(PlayerDeathEvent { player, killed_by }));
        event.control.mark_uncancellable();
        GameProcessor::handle(self, &mut event, Some(&mut DeathHandler)).await
    }

    /// Evaluate the game-over condition and finish the game if it is met.
    pub fn check_game_over(&mut self) -> bool {
        let standings: Vec<Standing> = self
            .players()
            .map(|p| Standing {
                player: p.id,
                role: p.role,
                alive: p.is_alive(),
            })
            .collect();
        match check_game_over(&standings) {
            Some(result) => {
                self.finish(result);
                true
            }
            None => false,
        }
    }

    /// Flip a player's character card.
    pub fn turn_over(&mut self, player: PlayerId) -> EngineResult<()> {
        self.check_player(player)?;
        let target = self.player_mut(player);
        target.turned_over = !target.turned_over;
        let turned_over = target.turned_over;
        debug!(%player, turned_over, "Turned over");
        self.broadcast(Notice::TurnedOver { player, turned_over });
        Ok(())
    }

    // === Prompts ===

    /// Ask `to` for a card named `card_name` to use. Returns the card the
    /// player chose (possibly virtual); the caller uses it.
    pub async fn ask_for_card_use(
        &mut self,
        to: PlayerId,
        card_name: &str,
        from: Option<PlayerId>,
    ) -> EngineResult<Option<CardId>> {
        self.ask_for_card(to, card_name, from, false).await
    }

    /// Ask `to` to respond with a card named `card_name`, and play it.
    /// Returns the card if the response went through.
    pub async fn ask_for_card_response(
        &mut self,
        to: PlayerId,
        card_name: &str,
        from: Option<PlayerId>,
    ) -> EngineResult<Option<CardId>> {
        let Some(card) = self.ask_for_card(to, card_name, from, true).await? else {
            return Ok(None);
        };
        if self.response_card(to, card.clone()).await? {
            Ok(Some(card))
        } else {
            Ok(None)
        }
    }

    async fn ask_for_card(
        &mut self,
        to: PlayerId,
        card_name: &str,
        from: Option<PlayerId>,
        response: bool,
    ) -> EngineResult<Option<CardId>> {
        self.check_player(to)?;
        let ask = AskForCardEvent {
            to,
            card_name: card_name.to_owned(),
            from,
            answer: None,
        };
        let mut event = Event::new(if response {
            GameEvent::AskForCardResponse(ask)
        } else {
            GameEvent::AskForCardUse(ask)
        });
        GameProcessor::handle(self, &mut event, Some(&mut AskHandler { response })).await?;
        match event.payload {
            GameEvent::AskForCardUse(ask) | GameEvent::AskForCardResponse(ask) => Ok(ask.answer),
            _ => Ok(None),
        }
    }

    /// Check a client's answer to a card prompt.
    fn accept_card_answer(&mut self, to: PlayerId, card_name: &str, answer: Response) -> Option<CardId> {
        let checked = match answer {
            Response::Card(None) => return None,
            Response::Card(Some(card)) => self
                .held_cards(to, &[card.clone()])
                .and_then(|_| self.card_view(&card))
                .and_then(|view| {
                    if view.name == card_name {
                        Ok(card)
                    } else {
                        Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
                            "{} is not a {card_name}",
                            view.name
                        ))))
                    }
                }),
            Response::ViewAs { skill, cards } => self.view_as(to, &skill, cards, card_name),
            _ => return None,
        };
        match checked {
            Ok(card) => Some(card),
            Err(error) => {
                warn!(player = %to, %error, "Card answer rejected");
                self.report(&error);
                None
            }
        }
    }

    /// Ask `player` to drop `amount` hand cards, dropping the first ones in
    /// hand if the answer is missing or invalid. Returns the dropped cards.
    pub async fn ask_for_card_drop(&mut self, player: PlayerId, amount: usize) -> EngineResult<Vec<CardId>> {
        self.check_player(player)?;
        let hand: Vec<RealCardId> = self.hand(player).to_vec();
        let amount = amount.min(hand.len());
        if amount == 0 {
            return Ok(Vec::new());
        }

        let answer = self.ask(player, Prompt::AskForCardDrop { amount }).await;
        let chosen = match answer {
            Some(Response::Cards(cards)) if self.valid_drop(player, &cards, amount) => cards,
            _ => hand.iter().take(amount).copied().map(CardId::from).collect(),
        };
        self.drop_cards(player, &chosen, player).await?;
        Ok(chosen)
    }

    fn valid_drop(&self, player: PlayerId, cards: &[CardId], amount: usize) -> bool {
        let mut seen: Vec<RealCardId> = Vec::with_capacity(cards.len());
        cards.len() == amount
            && cards.iter().all(|card| match card.as_real() {
                Some(real) if self.zones.is_in_zone(real, &Zone::Hand(player)) && !seen.contains(&real) => {
                    seen.push(real);
                    true
                }
                _ => false,
            })
    }
}

struct CardUseHandler {
    view: CardView,
    effect: Option<Arc<dyn ActiveSkill>>,
    aimed: bool,
    moved: Vec<RealCardId>,
}

impl CardUseHandler {
    async fn pre_use(&mut self, room: &mut Room, event: &mut Event) -> EngineResult<bool> {
        let GameEvent::CardUse(card_use) = &event.payload else {
            return Ok(false);
        };
        let (from, card, targets) = (card_use.from, card_use.card.clone(), card_use.targets.to_vec());

        self.moved = room
            .lose_cards(from, &[card.clone()], CardLostReason::CardUse, None)
            .await?;
        if self.moved.len() != self.view.real_ids.len() {
            debug!(%from, %card, "Card use cancelled while paying");
            return Ok(false);
        }

        room.player_mut(from).record_card_use(&self.view.name);
        info!(%from, card = %self.view.name, ?targets, "Card used");
        room.broadcast(Notice::CardUsed { from, card, targets });

        if let Some(effect) = &self.effect {
            effect.on_use(room, event).await?;
        }
        Ok(true)
    }

    async fn aim(&mut self, room: &mut Room, event: &mut Event) -> EngineResult<bool> {
        let GameEvent::CardUse(card_use) = &event.payload else {
            return Ok(false);
        };
        if card_use.targets.is_empty() {
            return Ok(true);
        }
        let (from, card, targets) = (card_use.from, card_use.card.clone(), card_use.targets.clone());
        let (survivors, forced) = room
            .aim(from, &card, targets, self.view.target_mode.is_multi())
            .await?;
        for skill in forced {
            event.control.add_triggered_by(skill);
        }
        if let GameEvent::CardUse(card_use) = &mut event.payload {
            card_use.targets = survivors;
        }
        Ok(true)
    }

    async fn apply(&mut self, room: &mut Room, event: &mut Event) -> EngineResult<()> {
        let GameEvent::CardUse(card_use) = &event.payload else {
            return Ok(());
        };
        let from = card_use.from;

        match self.view.card_type {
            CardType::Equip(_) => {
                if let Some(&card) = self.view.real_ids.first() {
                    room.equip(from, card).await?;
                }
            }
            CardType::DelayedTrick => {
                let owner = card_use.targets.first().copied().unwrap_or(from);
                room.relocate(&self.view.real_ids, &Zone::Judge(owner), ZonePosition::Top, None);
            }
            CardType::Basic | CardType::Trick => {
                let Some(effect) = self.effect.clone() else {
                    return Ok(());
                };
                let targets: Targets = if self.aimed {
                    card_use.targets.clone()
                } else {
                    std::iter::once(from).collect()
                };
                let card = card_use.card.clone();
                let flags: Vec<String> = event.control.flags().map(str::to_owned).collect();

                for target in targets {
                    if !room.player(target).is_alive() || room.is_over() || event.is_terminated() {
                        continue;
                    }
                    let mut effect_event = Event::new(GameEvent::CardEffect(
                        CardUseEvent::new(from, card.clone()).with_target(target),
                    ));
                    for flag in &flags {
                        effect_event.control.add_flag(flag.clone());
                    }
                    let mut handler = CardEffectHandler {
                        effect: Arc::clone(&effect),
                    };
                    GameProcessor::handle(room, &mut effect_event, Some(&mut handler)).await?;
                }
            }
        }
        Ok(())
    }
}

impl StageHandler for CardUseHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            match stage {
                Stage::PreCardUse => self.pre_use(room, event).await,
                Stage::CardUseAim => self.aim(room, event).await,
                Stage::CardUseEffect => {
                    self.apply(room, event).await?;
                    Ok(true)
                }
                Stage::AfterCardUseEffect => {
                    if let Some(effect) = self.effect.clone() {
                        effect.after_effect(room, event).await?;
                    }
                    Ok(true)
                }
                Stage::CardUseFinished => {
                    room.bury_real(&self.moved);
                    Ok(true)
                }
                _ => Ok(true),
            }
        }
        .boxed()
    }
}

/// Runs a card's effect on the single target of a CardEffect event.
pub(crate) struct CardEffectHandler {
    pub(crate) effect: Arc<dyn ActiveSkill>,
}

impl StageHandler for CardEffectHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage == Stage::CardEffecting {
                self.effect.on_effect(room, event).await?;
            }
            Ok(true)
        }
        .boxed()
    }
}

struct CardResponseHandler {
    moved: Vec<RealCardId>,
    completed: bool,
}

impl StageHandler for CardResponseHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            let GameEvent::CardResponse(response) = &event.payload else {
                return Ok(false);
            };
            let (from, card) = (response.from, response.card.clone());
            match stage {
                Stage::PreCardResponse => {
                    let expected = room.virtual_cards.resolve(&card)?.len();
                    self.moved = room
                        .lose_cards(from, &[card.clone()], CardLostReason::CardResponse, None)
                        .await?;
                    Ok(self.moved.len() == expected)
                }
                Stage::CardResponding => {
                    info!(%from, %card, "Card responded");
                    room.broadcast(Notice::CardResponded { from, card });
                    self.completed = true;
                    Ok(true)
                }
                _ => Ok(true),
            }
        }
        .boxed()
    }
}

struct ActiveSkillHandler {
    active: Arc<dyn ActiveSkill>,
}

impl StageHandler for ActiveSkillHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            match stage {
                Stage::SkillUsing => {
                    if let GameEvent::SkillUse(skill_use) = &event.payload {
                        info!(from = %skill_use.from, skill = %skill_use.skill, "Skill used");
                        room.player_mut(skill_use.from).record_skill_use(&skill_use.skill);
                        room.broadcast(Notice::SkillUsed {
                            from: skill_use.from,
                            skill: skill_use.skill.clone(),
                            targets: skill_use.targets.to_vec(),
                        });
                    }
                    self.active.on_use(room, event).await?;
                }
                Stage::SkillEffecting => self.active.on_effect(room, event).await?,
                Stage::AfterSkillEffect => self.active.after_effect(room, event).await?,
                _ => {}
            }
            Ok(true)
        }
        .boxed()
    }
}

/// Applies hp changes for damage, hp loss and recovery.
struct HpHandler;

impl StageHandler for HpHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            match (stage, &event.payload) {
                (Stage::Damaging, GameEvent::Damage(damage)) => {
                    if damage.amount <= 0 {
                        return Ok(false);
                    }
                    info!(from = ?damage.from, to = %damage.to, amount = damage.amount, nature = ?damage.nature, "Damage");
                    room.change_hp(damage.to, -damage.amount);
                }
                (Stage::Damaged, GameEvent::Damage(damage)) => {
                    if room.player(damage.to).hp <= 0 {
                        room.dying(damage.to, damage.from).await?;
                    }
                }
                (Stage::LosingHp, GameEvent::LoseHp(lose)) => {
                    if lose.amount <= 0 {
                        return Ok(false);
                    }
                    room.change_hp(lose.player, -lose.amount);
                }
                (Stage::AfterLostHp, GameEvent::LoseHp(lose)) => {
                    if room.player(lose.player).hp <= 0 {
                        room.dying(lose.player, None).await?;
                    }
                }
                (Stage::Recovering, GameEvent::Recover(recover)) => {
                    let player = room.player(recover.to);
                    if !player.is_alive() || recover.amount <= 0 {
                        return Ok(false);
                    }
                    room.change_hp(recover.to, recover.amount);
                }
                _ => {}
            }
            Ok(true)
        }
        .boxed()
    }
}

struct DyingHandler;

impl StageHandler for DyingHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            let GameEvent::PlayerDying(dying) = &event.payload else {
                return Ok(false);
            };
            let (player, killed_by) = (dying.player, dying.killed_by);
            match stage {
                Stage::PlayerDying => {
                    info!(%player, "Dying");
                    for saver in room.alive_players_from(room.current()) {
                        while room.player(player).hp <= 0 && room.player(saver).is_alive() {
                            let Some(card) = room.ask_for_card_use(saver, RESCUE_CARD, Some(player)).await? else {
                                break;
                            };
                            if let Err(error) = room.use_card(saver, card, vec![player]).await {
                                room.report(&error);
                                break;
                            }
                        }
                        if room.player(player).hp > 0 {
                            break;
                        }
                    }
                }
                Stage::AfterPlayerDying => {
                    if room.player(player).is_alive() && room.player(player).hp <= 0 {
                        room.kill(player, killed_by).await?;
                    }
                }
                _ => {}
            }
            Ok(true)
        }
        .boxed()
    }
}

struct DeathHandler;

impl StageHandler for DeathHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::PlayerDied {
                return Ok(true);
            }
            let GameEvent::PlayerDied(death) = &event.payload else {
                return Ok(false);
            };
            let (player, killed_by) = (death.player, death.killed_by);

            let role = {
                let dead = room.player_mut(player);
                dead.dead = true;
                dead.role
            };
            info!(%player, ?role, ?killed_by, "Player died");
            room.broadcast(Notice::PlayerDied { player, role });

            let cards: Vec<CardId> = room
                .hand(player)
                .iter()
                .chain(room.equips(player))
                .chain(room.judge_area(player))
                .copied()
                .map(CardId::from)
                .collect();
            room.drop_cards(player, &cards, killed_by.unwrap_or(player)).await?;

            room.check_game_over();
            Ok(true)
        }
        .boxed()
    }
}

struct AskHandler {
    response: bool,
}

impl StageHandler for AskHandler {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::Asking {
                return Ok(true);
            }
            let (GameEvent::AskForCardUse(ask) | GameEvent::AskForCardResponse(ask)) = &event.payload else {
                return Ok(false);
            };
            if ask.answer.is_some() {
                return Ok(true);
            }
            let (to, card_name, from) = (ask.to, ask.card_name.clone(), ask.from);
            let prompt = if self.response {
                Prompt::AskForCardResponse {
                    card_name: card_name.clone(),
                    from,
                }
            } else {
                Prompt::AskForCardUse {
                    card_name: card_name.clone(),
                    from,
                }
            };
            let answer = match room.ask(to, prompt).await {
                Some(reply) => room.accept_card_answer(to, &card_name, reply),
                None => None,
            };
            if let GameEvent::AskForCardUse(ask) | GameEvent::AskForCardResponse(ask) = &mut event.payload {
                ask.answer = answer;
            }
            Ok(true)
        }
        .boxed()
    }
}
