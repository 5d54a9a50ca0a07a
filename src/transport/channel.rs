//! Transport over tokio channels.

use rustc_hash::FxHashMap;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use super::Transport;
use crate::core::{EngineError, EngineErrorKind, EngineResult, PlayerId};
use crate::room::messages::{ClientReply, RequestId, Response, ServerMessage};

/// Room side of a set of channel pairs.
pub struct ChannelTransport {
    outgoing: FxHashMap<PlayerId, mpsc::UnboundedSender<ServerMessage>>,
    incoming: FxHashMap<PlayerId, Mutex<mpsc::UnboundedReceiver<ClientReply>>>,
}

/// Client side of one player's channel pair.
pub struct ClientHandle {
    pub player: PlayerId,
    inbox: mpsc::UnboundedReceiver<ServerMessage>,
    outbox: mpsc::UnboundedSender<ClientReply>,
}

impl ChannelTransport {
    /// Create a transport and one client handle per player.
    #[must_use]
    pub fn new(players: impl IntoIterator<Item = PlayerId>) -> (Self, Vec<ClientHandle>) {
        let mut outgoing = FxHashMap::default();
        let mut incoming = FxHashMap::default();
        let mut handles = Vec::new();

        for player in players {
            let (to_client, inbox) = mpsc::unbounded_channel();
            let (outbox, from_client) = mpsc::unbounded_channel();
            outgoing.insert(player, to_client);
            incoming.insert(player, Mutex::new(from_client));
            handles.push(ClientHandle { player, inbox, outbox });
        }

        (Self { outgoing, incoming }, handles)
    }
}

#[async_trait::async_trait]
impl Transport for ChannelTransport {
    fn send(&self, to: Option<PlayerId>, message: ServerMessage) -> EngineResult<()> {
        match to {
            Some(player) => {
                let sender = self
                    .outgoing
                    .get(&player)
                    .ok_or_else(|| EngineError::new(EngineErrorKind::UnknownPlayer(player)))?;
                if sender.send(message).is_err() {
                    debug!(%player, "Client gone, message dropped");
                }
            }
            None => {
                for (player, sender) in &self.outgoing {
                    if sender.send(message.clone()).is_err() {
                        debug!(%player, "Client gone, broadcast dropped");
                    }
                }
            }
        }
        Ok(())
    }

    async fn receive(&self, player: PlayerId) -> EngineResult<ClientReply> {
        let receiver = self
            .incoming
            .get(&player)
            .ok_or_else(|| EngineError::new(EngineErrorKind::UnknownPlayer(player)))?;
        let mut receiver = receiver.lock().await;
        receiver.recv().await.ok_or_else(|| {
            warn!(%player, "Client disconnected");
            EngineError::new(EngineErrorKind::Transport(format!("{player} disconnected")))
        })
    }
}

impl ClientHandle {
    /// Next message from the room, or `None` once the room is gone.
    pub async fn next_message(&mut self) -> Option<ServerMessage> {
        self.inbox.recv().await
    }

    /// Non-blocking variant of [`ClientHandle::next_message`].
    pub fn try_next_message(&mut self) -> Option<ServerMessage> {
        self.inbox.try_recv().ok()
    }

    /// Answer a request.
    pub fn reply(&self, request_id: RequestId, response: Response) -> EngineResult<()> {
        self.outbox
            .send(ClientReply {
                request_id,
                from: self.player,
                response,
            })
            .map_err(|_| EngineError::new(EngineErrorKind::Transport("room closed".into())))
    }
}
