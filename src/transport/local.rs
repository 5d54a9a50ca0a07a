//! In-process transport answering prompts from a decision source.
//!
//! Used for bots and tests. Every message sent through it is recorded.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::FxHashMap;
use tracing::trace;

use super::Transport;
use crate::core::{EngineResult, PlayerId};
use crate::room::messages::{ClientReply, Notice, Prompt, Response, ServerMessage};

/// Produces a player's answer to a prompt.
///
/// `None` means the player never answers; the room falls back to the
/// prompt's default once the response timeout elapses.
pub trait DecisionSource: Send + Sync {
    fn decide(&self, player: PlayerId, prompt: &Prompt) -> Option<Response>;
}

impl<F> DecisionSource for F
where
    F: Fn(PlayerId, &Prompt) -> Option<Response> + Send + Sync,
{
    fn decide(&self, player: PlayerId, prompt: &Prompt) -> Option<Response> {
        self(player, prompt)
    }
}

/// Declines every prompt immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassiveDecisions;

impl DecisionSource for PassiveDecisions {
    fn decide(&self, _player: PlayerId, prompt: &Prompt) -> Option<Response> {
        Some(Response::decline_for(prompt))
    }
}

/// Answers from per-player queues, declining once a queue runs dry.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    queues: Mutex<FxHashMap<PlayerId, VecDeque<Option<Response>>>>,
}

impl ScriptedDecisions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next answer of `player`. `None` makes the player silent
    /// for that prompt.
    pub fn push(&self, player: PlayerId, response: Option<Response>) {
        lock(&self.queues).entry(player).or_default().push_back(response);
    }

    /// Builder variant of [`ScriptedDecisions::push`].
    #[must_use]
    pub fn then(self, player: PlayerId, response: Response) -> Self {
        self.push(player, Some(response));
        self
    }

    #[must_use]
    pub fn remaining(&self, player: PlayerId) -> usize {
        lock(&self.queues).get(&player).map_or(0, VecDeque::len)
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(&self, player: PlayerId, prompt: &Prompt) -> Option<Response> {
        let next = lock(&self.queues).get_mut(&player).and_then(VecDeque::pop_front);
        match next {
            Some(answer) => answer,
            None => Some(Response::decline_for(prompt)),
        }
    }
}

/// Transport whose clients live in-process.
pub struct LocalTransport {
    source: Arc<dyn DecisionSource>,
    pending: Mutex<FxHashMap<PlayerId, VecDeque<ClientReply>>>,
    sent: Mutex<Vec<(Option<PlayerId>, ServerMessage)>>,
}

impl LocalTransport {
    #[must_use]
    pub fn new(source: Arc<dyn DecisionSource>) -> Self {
        Self {
            source,
            pending: Mutex::new(FxHashMap::default()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Transport whose clients decline everything.
    #[must_use]
    pub fn passive() -> Self {
        Self::new(Arc::new(PassiveDecisions))
    }

    /// Queue a reply as if a client had sent it.
    pub fn inject(&self, reply: ClientReply) {
        lock(&self.pending).entry(reply.from).or_default().push_back(reply);
    }

    /// Every message sent so far, with its addressee.
    #[must_use]
    pub fn sent(&self) -> Vec<(Option<PlayerId>, ServerMessage)> {
        lock(&self.sent).clone()
    }

    /// Notices sent so far, broadcast or private.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.sent)
            .iter()
            .filter_map(|(_, message)| match message {
                ServerMessage::Notice(notice) => Some(notice.clone()),
                ServerMessage::Request { .. } => None,
            })
            .collect()
    }

    /// Prompts sent to `player` so far.
    #[must_use]
    pub fn prompts_to(&self, player: PlayerId) -> Vec<Prompt> {
        lock(&self.sent)
            .iter()
            .filter_map(|(_, message)| match message {
                ServerMessage::Request { to, prompt, .. } if *to == player => Some(prompt.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for LocalTransport {
    fn send(&self, to: Option<PlayerId>, message: ServerMessage) -> EngineResult<()> {
        if let ServerMessage::Request { id, to: player, prompt } = &message {
            match self.source.decide(*player, prompt) {
                Some(response) => self.inject(ClientReply {
                    request_id: *id,
                    from: *player,
                    response,
                }),
                None => trace!(%player, request = id, "Local client stays silent"),
            }
        }
        lock(&self.sent).push((to, message));
        Ok(())
    }

    async fn receive(&self, player: PlayerId) -> EngineResult<ClientReply> {
        let next = lock(&self.pending).get_mut(&player).and_then(VecDeque::pop_front);
        match next {
            Some(reply) => Ok(reply),
            None => futures::future::pending().await,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
