//! The room: authoritative game state and the bridge to its clients.
//!
//! A `Room` owns the players, every card zone, the virtual card table and
//! the turn position. All gameplay verbs (using and responding with cards,
//! drawing, dropping, damage, judgement, pin-dian) are methods on the room
//! that build an [`Event`](crate::events::Event) and drive it through the
//! [`GameProcessor`](crate::processor::GameProcessor).
//!
//! One room is one sequential flow: every method takes `&mut self`, and the
//! only suspension points are the `ask_*` helpers, which wait on the
//! transport with a bounded timeout and fall back to a default decision.
//!
//! ## Key Types
//!
//! - `Room`: the state and all verbs (split across submodules)
//! - `RoomBuilder`: roster, catalog and transport wiring
//! - `LogEntry`: the room's operator log

pub mod actions;
pub mod messages;
pub mod movement;
pub mod player;
pub mod protocols;
pub mod turn;

pub use movement::MoveCards;
pub use player::{FlagKey, FlagValue, Player};
pub use protocols::pindian_winner;

use std::sync::Arc;
use std::time::Duration;

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::cards::{CardId, CardView, RealCardId, Suit, VirtualCards};
use crate::catalog::{Catalog, CharacterId};
use crate::core::state::role_is_public;
use crate::core::{
    EngineError, EngineErrorKind, EngineResult, GameRng, PlayerId, PlayerInfo, PlayerMap, RoomConfig,
    RoomSnapshot,
};
use crate::events::PlayerPhase;
use crate::rules::GameResult;
use crate::skills::{Skill, SkillType};
use crate::transport::Transport;
use crate::zones::{Zone, ZoneManager, ZonePosition};

use messages::{Notice, Prompt, RequestId, Response, ServerMessage};

/// Severity of a room log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
    /// A contract violation or a failing skill.
    Violation,
}

/// One line of the room's operator log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub round: u32,
    pub level: LogLevel,
    pub message: String,
}

/// Authoritative state of one game.
pub struct Room {
    config: RoomConfig,
    catalog: Arc<Catalog>,
    transport: Arc<dyn Transport>,
    players: PlayerMap<Player>,
    /// Player ids in seat order.
    seats: Vec<PlayerId>,
    pub(crate) zones: ZoneManager,
    pub(crate) virtual_cards: VirtualCards,
    rng: GameRng,
    round: u32,
    current: PlayerId,
    phase: Option<PlayerPhase>,
    started: bool,
    result: Option<GameResult>,
    /// Skills currently firing, innermost last.
    pub(crate) resolving_skills: Vec<String>,
    next_request: RequestId,
    log: Vector<LogEntry>,
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("round", &self.round)
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("players", &self.players.player_count())
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Room`].
///
/// ## Example
///
/// ```ignore
/// let room = RoomBuilder::new(RoomConfig::default())
///     .with_catalog(catalog)
///     .with_transport(Arc::new(LocalTransport::passive()))
///     .with_player("alice", CharacterId::new(1))
///     .with_player("bob", CharacterId::new(2))
///     .build()?;
/// ```
pub struct RoomBuilder {
    config: RoomConfig,
    catalog: Option<Arc<Catalog>>,
    transport: Option<Arc<dyn Transport>>,
    roster: Vec<(String, Option<CharacterId>)>,
}

impl RoomBuilder {
    #[must_use]
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            catalog: None,
            transport: None,
            roster: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Add a player bound to a character.
    #[must_use]
    pub fn with_player(mut self, name: impl Into<String>, character: CharacterId) -> Self {
        self.roster.push((name.into(), Some(character)));
        self
    }

    /// Add a player with no character (hp 0 until one is bound).
    #[must_use]
    pub fn with_unbound_player(mut self, name: impl Into<String>) -> Self {
        self.roster.push((name.into(), None));
        self
    }

    /// Validate the catalog, place the deck on the draw stack in catalog
    /// order and bind characters.
    #[instrument(skip(self), fields(players = self.roster.len()))]
    pub fn build(self) -> EngineResult<Room> {
        let catalog = self
            .catalog
            .ok_or_else(|| EngineError::new(EngineErrorKind::Config("room has no catalog".into())))?;
        let transport = self
            .transport
            .ok_or_else(|| EngineError::new(EngineErrorKind::Config("room has no transport".into())))?;
        if self.roster.is_empty() || self.roster.len() > usize::from(u8::MAX) {
            return Err(EngineError::new(EngineErrorKind::Config(format!(
                "unsupported player count {}",
                self.roster.len()
            ))));
        }
        catalog.validate()?;

        let players: Vec<Player> = self
            .roster
            .iter()
            .enumerate()
            .map(|(i, (name, _))| Player::new(PlayerId::new(i as u8), name.clone()))
            .collect();
        let seats = players.iter().map(|p| p.id).collect();

        let mut zones = ZoneManager::new();
        for &card in catalog.deck() {
            zones.add_to_zone(card, Zone::DrawStack, ZonePosition::Bottom)?;
        }

        let mut room = Room {
            rng: GameRng::new(self.config.seed),
            config: self.config,
            catalog,
            transport,
            players: PlayerMap::from_vec(players),
            seats,
            zones,
            virtual_cards: VirtualCards::new(),
            round: 1,
            current: PlayerId::new(0),
            phase: None,
            started: false,
            result: None,
            resolving_skills: Vec::new(),
            next_request: 0,
            log: Vector::new(),
        };

        for (i, (_, character)) in self.roster.iter().enumerate() {
            if let Some(character) = character {
                room.bind_character(PlayerId::new(i as u8), *character)?;
            }
        }

        info!(deck = room.catalog.deck().len(), "Room built");
        Ok(room)
    }
}

impl Room {
    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id]
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id]
    }

    /// Players in id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().map(|(_, p)| p)
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    /// Player ids in seat order.
    #[must_use]
    pub fn seats(&self) -> &[PlayerId] {
        &self.seats
    }

    /// Fail unless `id` names a player of this room.
    pub fn check_player(&self, id: PlayerId) -> EngineResult<()> {
        if self.players.contains(id) {
            Ok(())
        } else {
            Err(EngineError::new(EngineErrorKind::UnknownPlayer(id)))
        }
    }

    /// Alive players in seat order, starting at `start` and wrapping.
    #[must_use]
    pub fn alive_players_from(&self, start: PlayerId) -> Vec<PlayerId> {
        let offset = self.seats.iter().position(|&p| p == start).unwrap_or(0);
        self.seats[offset..]
            .iter()
            .chain(&self.seats[..offset])
            .copied()
            .filter(|&p| self.players[p].is_alive())
            .collect()
    }

    #[must_use]
    pub fn current(&self) -> PlayerId {
        self.current
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn phase(&self) -> Option<PlayerPhase> {
        self.phase
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn log(&self) -> &Vector<LogEntry> {
        &self.log
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    #[must_use]
    pub fn virtual_cards(&self) -> &VirtualCards {
        &self.virtual_cards
    }

    /// Forget a virtual card once it has been played or turned down.
    pub(crate) fn release_virtual(&mut self, card: &CardId) {
        if self.virtual_cards.remove(card) > 0 {
            debug!(%card, "Virtual card released");
        }
    }

    /// Forget every virtual card built on cards that reached the discard
    /// stack; none of them can be played any more.
    pub(crate) fn retire_virtuals_over(&mut self, cards: &[RealCardId]) {
        let retired = self.virtual_cards.remove_containing(cards);
        if retired > 0 {
            debug!(retired, "Stale virtual cards dropped");
        }
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[RealCardId] {
        self.zones.cards_in_zone(&Zone::Hand(player))
    }

    #[must_use]
    pub fn equips(&self, player: PlayerId) -> &[RealCardId] {
        self.zones.cards_in_zone(&Zone::Equip(player))
    }

    #[must_use]
    pub fn judge_area(&self, player: PlayerId) -> &[RealCardId] {
        self.zones.cards_in_zone(&Zone::Judge(player))
    }

    #[must_use]
    pub fn draw_stack(&self) -> &[RealCardId] {
        self.zones.cards_in_zone(&Zone::DrawStack)
    }

    #[must_use]
    pub fn discard_stack(&self) -> &[RealCardId] {
        self.zones.cards_in_zone(&Zone::DiscardStack)
    }

    #[must_use]
    pub fn processing_area(&self) -> &[RealCardId] {
        self.zones.cards_in_zone(&Zone::Processing)
    }

    /// Whether every card of the deck is in exactly one zone.
    #[must_use]
    pub fn deck_is_partitioned(&self) -> bool {
        self.zones.is_partition_of(self.catalog.deck())
    }

    // === Setup mutators ===

    pub(crate) fn set_current(&mut self, player: PlayerId) {
        self.current = player;
    }

    pub(crate) fn set_phase(&mut self, phase: Option<PlayerPhase>) {
        self.phase = phase;
    }

    pub(crate) fn set_seats(&mut self, seats: Vec<PlayerId>) {
        for (seat, &id) in seats.iter().enumerate() {
            self.players[id].seat = seat;
        }
        self.seats = seats;
    }

    pub(crate) fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }

    pub(crate) fn advance_round(&mut self) {
        self.round += 1;
    }

    pub(crate) fn finish(&mut self, result: GameResult) {
        if self.result.is_none() {
            info!(?result, "Game over");
            self.record(LogLevel::Info, format!("game over: {result:?}"));
            self.broadcast(Notice::GameOver(result.clone()));
            self.result = Some(result);
        }
    }

    /// Bind a character to a player, granting its skills. Lord-only skills
    /// are granted only to a lord; shadow skills come with their main skill.
    #[instrument(skip(self))]
    pub fn bind_character(&mut self, player: PlayerId, character: CharacterId) -> EngineResult<()> {
        self.check_player(player)?;
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog.character(character)?;
        let is_lord = self.players[player].role == Some(crate::rules::Role::Lord);

        let target = &mut self.players[player];
        for skill in target.skills().to_vec() {
            target.remove_skill(&skill);
        }
        target.bind_character(definition);

        for name in &definition.skills {
            let skill = catalog.skill(name)?;
            if skill.lord_only && !is_lord {
                continue;
            }
            target.add_skill(name.clone());
            for shadow in &skill.shadows {
                target.add_skill(shadow.clone());
            }
        }
        debug!(%player, character = %definition.name, "Character bound");
        Ok(())
    }

    // === Skills and card views ===

    /// Skills granted by equipped cards, in equip order.
    #[must_use]
    pub fn equip_skills(&self, player: PlayerId) -> Vec<Arc<Skill>> {
        self.equips(player)
            .iter()
            .filter_map(|&card| self.catalog.card(card).ok())
            .filter_map(|def| def.skill.as_deref())
            .filter_map(|name| self.catalog.skill(name).ok())
            .cloned()
            .collect()
    }

    /// Skills the player owns, in acquisition order.
    #[must_use]
    pub fn own_skills(&self, player: PlayerId) -> Vec<Arc<Skill>> {
        self.players[player]
            .skills()
            .iter()
            .filter_map(|name| self.catalog.skill(name).ok())
            .cloned()
            .collect()
    }

    /// Equip skills followed by own skills.
    #[must_use]
    pub fn effective_skills(&self, player: PlayerId) -> Vec<Arc<Skill>> {
        let mut skills = self.equip_skills(player);
        skills.extend(self.own_skills(player));
        skills
    }

    /// Limit skills of a player, whose history survives turn resets.
    #[must_use]
    pub(crate) fn limit_skill_names(&self, player: PlayerId) -> Vec<String> {
        self.own_skills(player)
            .iter()
            .filter(|s| s.skill_type == SkillType::Limit)
            .map(|s| s.name.clone())
            .collect()
    }

    /// The card as the rules see it, including the holder's transforms.
    pub fn card_view(&self, card: &CardId) -> EngineResult<CardView> {
        match card {
            CardId::Real(id) => {
                let mut view = CardView::of(self.catalog.card(*id)?);
                if let Some(owner) = self.holder_of(*id) {
                    for skill in self.own_skills(owner) {
                        if let Some(transform) = skill.as_transform() {
                            if transform.can_transform(&view) {
                                transform.force_transform(&mut view);
                            }
                        }
                    }
                }
                Ok(view)
            }
            CardId::Virtual(vid) => {
                let virtual_card = self
                    .virtual_cards
                    .get(vid)
                    .ok_or_else(|| EngineError::new(EngineErrorKind::UnknownVirtualCard(vid.0.clone())))?;
                let template = self.catalog.card_by_name(&virtual_card.name).ok_or_else(|| {
                    EngineError::new(EngineErrorKind::InvalidContent(format!(
                        "no card named {} to view as",
                        virtual_card.name
                    )))
                })?;
                let (suit, number) = match virtual_card.contained.as_slice() {
                    [only] => {
                        let inner = self.card_view(only)?;
                        (inner.suit, inner.number)
                    }
                    _ => (Suit::NoSuit, 0),
                };
                Ok(CardView {
                    id: card.clone(),
                    name: virtual_card.name.clone(),
                    suit,
                    number,
                    card_type: template.card_type,
                    target_mode: template.target_mode,
                    skill: template.skill.clone(),
                    real_ids: self.virtual_cards.resolve(card)?,
                })
            }
        }
    }

    /// Player holding a card in hand or equip zone.
    #[must_use]
    pub fn holder_of(&self, card: RealCardId) -> Option<PlayerId> {
        match self.zones.get_zone(card)? {
            Zone::Hand(p) | Zone::Equip(p) => Some(*p),
            _ => None,
        }
    }

    // === Flags, marks and skills ===

    pub fn set_flag(&mut self, player: PlayerId, key: FlagKey, value: FlagValue) -> EngineResult<()> {
        self.check_player(player)?;
        self.players[player].set_flag(key.clone(), value.clone());
        self.announce_flag(player, key, Some(value));
        Ok(())
    }

    pub fn remove_flag(&mut self, player: PlayerId, key: &FlagKey) -> EngineResult<()> {
        self.check_player(player)?;
        if self.players[player].remove_flag(key).is_some() {
            self.announce_flag(player, key.clone(), None);
        }
        Ok(())
    }

    fn announce_flag(&self, player: PlayerId, key: FlagKey, value: Option<FlagValue>) {
        let public = key.is_public();
        let notice = Notice::FlagChanged { player, key, value };
        if public {
            self.broadcast(notice);
        } else {
            self.notify(player, notice);
        }
    }

    /// Add `delta` to a mark and return the new value.
    pub fn add_mark(&mut self, player: PlayerId, name: &str, delta: i32) -> EngineResult<i32> {
        self.check_player(player)?;
        let value = self.players[player].add_mark(name, delta);
        self.broadcast(Notice::MarkChanged {
            player,
            name: name.to_owned(),
            value,
        });
        Ok(value)
    }

    pub fn set_mark(&mut self, player: PlayerId, name: &str, value: i32) -> EngineResult<()> {
        self.check_player(player)?;
        self.players[player].set_mark(name, value);
        self.broadcast(Notice::MarkChanged {
            player,
            name: name.to_owned(),
            value,
        });
        Ok(())
    }

    /// Grant a skill outside of character binding.
    pub fn obtain_skill(&mut self, player: PlayerId, skill: &str) -> EngineResult<()> {
        self.check_player(player)?;
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog.skill(skill)?;
        if self.players[player].add_skill(skill) {
            for shadow in &definition.shadows {
                self.players[player].add_skill(shadow.clone());
            }
            self.broadcast(Notice::SkillObtained {
                player,
                skill: skill.to_owned(),
            });
        }
        Ok(())
    }

    pub fn lose_skill(&mut self, player: PlayerId, skill: &str) -> EngineResult<()> {
        self.check_player(player)?;
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog.skill(skill)?;
        if self.players[player].remove_skill(skill) {
            for shadow in &definition.shadows {
                self.players[player].remove_skill(shadow);
            }
            self.broadcast(Notice::SkillLost {
                player,
                skill: skill.to_owned(),
            });
        }
        Ok(())
    }

    // === Snapshot ===

    /// Public view of the room.
    #[must_use]
    pub fn snapshot(&self) -> RoomSnapshot {
        let players = self
            .seats
            .iter()
            .map(|&id| {
                let p = &self.players[id];
                PlayerInfo {
                    id,
                    name: p.name.clone(),
                    seat: p.seat,
                    character: p.character,
                    role: p.role.filter(|_| role_is_public(p.role, p.dead)),
                    hp: p.hp,
                    max_hp: p.max_hp,
                    dead: p.dead,
                    turned_over: p.turned_over,
                    hand_size: self.hand(id).len(),
                    equips: self.equips(id).to_vec(),
                    judge_area: self.judge_area(id).to_vec(),
                }
            })
            .collect();

        RoomSnapshot {
            draw_stack_size: self.draw_stack().len(),
            discard_stack_size: self.discard_stack().len(),
            round: self.round,
            current: self.current,
            phase: self.phase,
            players,
        }
    }

    // === Client bridge ===

    /// Send a notice to everyone. Transport failures are soft.
    pub(crate) fn broadcast(&self, notice: Notice) {
        if let Err(error) = self.transport.send(None, ServerMessage::Notice(notice)) {
            warn!(%error, "Broadcast failed");
        }
    }

    /// Send a notice to one player. Transport failures are soft.
    pub(crate) fn notify(&self, player: PlayerId, notice: Notice) {
        if let Err(error) = self.transport.send(Some(player), ServerMessage::Notice(notice)) {
            warn!(%player, %error, "Notify failed");
        }
    }

    /// Allocate a request id and send the prompt.
    pub(crate) fn post_request(&mut self, to: PlayerId, prompt: &Prompt) -> EngineResult<RequestId> {
        self.next_request += 1;
        let id = self.next_request;
        self.transport.send(
            Some(to),
            ServerMessage::Request {
                id,
                to,
                prompt: prompt.clone(),
            },
        )?;
        Ok(id)
    }

    /// Ask one player and wait for a matching answer.
    ///
    /// Returns `None` when the player is unknown or offline, the transport
    /// fails, or the response timeout elapses; callers apply the prompt's
    /// default.
    pub async fn ask(&mut self, to: PlayerId, prompt: Prompt) -> Option<Response> {
        if let Err(error) = self.check_player(to) {
            self.report(&error);
            return None;
        }
        if !self.players[to].online {
            debug!(player = %to, "Offline, default applied");
            return None;
        }
        let id = match self.post_request(to, &prompt) {
            Ok(id) => id,
            Err(error) => {
                warn!(player = %to, %error, "Prompt could not be sent");
                return None;
            }
        };
        let answer = Self::await_reply(
            Arc::clone(&self.transport),
            to,
            id,
            prompt,
            self.config.response_timeout(),
        )
        .await;
        if answer.is_none() {
            self.record(LogLevel::Warning, format!("{to} did not answer request {id}"));
        }
        answer
    }

    /// Wait for the reply to request `id`, ignoring stale and mismatched
    /// replies until the deadline.
    pub(crate) async fn await_reply(
        transport: Arc<dyn Transport>,
        player: PlayerId,
        id: RequestId,
        prompt: Prompt,
        timeout: Duration,
    ) -> Option<Response> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match tokio::time::timeout_at(deadline, transport.receive(player)).await {
                Err(_) => {
                    warn!(%player, request = id, "Response timed out");
                    return None;
                }
                Ok(Err(error)) => {
                    warn!(%player, request = id, %error, "Transport failed while waiting");
                    return None;
                }
                Ok(Ok(reply))
                    if reply.request_id != id || reply.from != player || !reply.response.answers(&prompt) =>
                {
                    warn!(%player, expected = id, got = reply.request_id, "Stale or mismatched reply ignored");
                }
                Ok(Ok(reply)) => return Some(reply.response),
            }
        }
    }

    // === Log ===

    pub(crate) fn record(&mut self, level: LogLevel, message: String) {
        self.log.push_back(LogEntry {
            round: self.round,
            level,
            message,
        });
    }

    /// Put an aborted action on the log.
    pub fn report(&mut self, error: &EngineError) {
        if error.is_contract_violation() {
            error!(%error, "Action aborted");
            self.record(LogLevel::Violation, error.to_string());
        } else {
            warn!(%error, "Action rejected");
            self.record(LogLevel::Warning, error.to_string());
        }
    }

    pub(crate) fn report_skill_failure(&mut self, skill: &str, owner: PlayerId, error: &EngineError) {
        error!(%skill, %owner, %error, "Skill failed");
        self.record(LogLevel::Violation, format!("skill {skill} of {owner} failed: {error}"));
    }
}

#[cfg(test)]
mod tests;
