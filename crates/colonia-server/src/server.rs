//! WebSocket server and connection handling.
//!
//! The transport delivers one typed action at a time to the registry and
//! broadcasts the resulting snapshot to every participant of the game, or
//! the error message back to the originator only. After any applied action
//! it kicks the bot driver in case the turn passed to a bot.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::GameRegistry;
use colonia_core::{GamePhase, GameState};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    pub registry: Arc<GameRegistry>,
    /// Outgoing channel per connected client
    clients: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Connected clients per game id
    game_members: DashMap<String, HashSet<Uuid>>,
}

impl ServerState {
    pub fn new(registry: Arc<GameRegistry>) -> Self {
        Self {
            registry,
            clients: DashMap::new(),
            game_members: DashMap::new(),
        }
    }

    /// Send a message to a specific client.
    fn send_to(&self, client: Uuid, message: ServerMessage) {
        if let Some(sender) = self.clients.get(&client) {
            let _ = sender.send(message);
        }
    }

    /// Broadcast a message to every connected member of a game.
    fn broadcast(&self, game_id: &str, message: ServerMessage) {
        if let Some(members) = self.game_members.get(game_id) {
            for client in members.iter() {
                self.send_to(*client, message.clone());
            }
        }
    }

    /// Broadcast a snapshot, following up with the game-over notice when
    /// the terminal phase was reached.
    fn broadcast_snapshot(&self, game_id: &str, state: &GameState) {
        self.broadcast(
            game_id,
            ServerMessage::GameState {
                state: state.clone(),
            },
        );
        if state.phase == GamePhase::Finished {
            if let Some(winner) = state.players.iter().max_by_key(|p| p.victory_points) {
                self.broadcast(
                    game_id,
                    ServerMessage::GameOver {
                        winner_id: winner.id.clone(),
                        winner_name: winner.name.clone(),
                        victory_points: winner.victory_points,
                    },
                );
            }
        }
    }

    fn join_membership(&self, game_id: &str, client: Uuid) {
        self.game_members
            .entry(game_id.to_string())
            .or_default()
            .insert(client);
    }

    /// Detach a client from a game. True when nobody is left connected.
    fn leave_membership(&self, game_id: &str, client: Uuid) -> bool {
        match self.game_members.get_mut(game_id) {
            Some(mut members) => {
                members.remove(&client);
                members.is_empty()
            }
            None => true,
        }
    }

    fn drop_client(&self, client: Uuid) {
        self.clients.remove(&client);
        for mut members in self.game_members.iter_mut() {
            members.remove(&client);
        }
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Colonia server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let client_id = Uuid::new_v4();

    // Channel for outgoing messages, forwarded by a dedicated task
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.clients.insert(client_id, tx);

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&message) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(message) = ws_receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_message) => handle_message(&state, client_id, client_message),
                Err(e) => {
                    warn!("Malformed message from {}: {}", addr, e);
                    state.send_to(
                        client_id,
                        ServerMessage::Error {
                            message: format!("malformed message: {e}"),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    info!("Connection closed: {}", addr);
    state.drop_client(client_id);
    send_task.abort();
    Ok(())
}

/// Dispatch one client message.
fn handle_message(state: &Arc<ServerState>, client: Uuid, message: ClientMessage) {
    match message {
        ClientMessage::CreateGame { player_name, bots } => {
            match state.registry.create_game(&player_name, &bots) {
                Ok((game_id, player_id)) => {
                    state.join_membership(&game_id, client);
                    state.send_to(client, ServerMessage::GameCreated { game_id, player_id });
                }
                Err(err) => state.send_to(
                    client,
                    ServerMessage::Error {
                        message: err.to_string(),
                    },
                ),
            }
        }

        ClientMessage::JoinGame {
            game_id,
            player_name,
        } => match state.registry.join_game(&game_id, &player_name) {
            Ok(player_id) => {
                state.join_membership(&game_id, client);
                state.send_to(client, ServerMessage::Joined { game_id, player_id });
            }
            Err(err) => state.send_to(
                client,
                ServerMessage::Error {
                    message: err.to_string(),
                },
            ),
        },

        ClientMessage::StartGame { game_id } => match state.registry.start_game(&game_id) {
            Ok(snapshot) => {
                state.broadcast(&game_id, ServerMessage::GameStarted { state: snapshot });
                kick_bots(state, &game_id);
            }
            Err(err) => state.send_to(
                client,
                ServerMessage::Error {
                    message: err.to_string(),
                },
            ),
        },

        ClientMessage::ResumeGame { game_id } => match state.registry.game_state(&game_id) {
            Some(snapshot) => {
                state.join_membership(&game_id, client);
                state.send_to(client, ServerMessage::GameState { state: snapshot });
                kick_bots(state, &game_id);
            }
            None => state.send_to(
                client,
                ServerMessage::Error {
                    message: "game not found".to_string(),
                },
            ),
        },

        ClientMessage::GameAction { game_id, action } => {
            match state.registry.process_action(&game_id, &action) {
                Ok(snapshot) => {
                    state.broadcast_snapshot(&game_id, &snapshot);
                    kick_bots(state, &game_id);
                }
                // Failures go to the originator only; no state broadcast
                Err(err) => state.send_to(
                    client,
                    ServerMessage::Error {
                        message: err.to_string(),
                    },
                ),
            }
        }

        ClientMessage::LeaveGame { game_id } => {
            if state.leave_membership(&game_id, client) {
                // Last connected participant left: drop the cached engine.
                // The store copy stays authoritative and reloadable.
                state.registry.evict(&game_id);
            }
        }

        ClientMessage::ListGames => {
            let games = state.registry.list_games();
            state.send_to(client, ServerMessage::GameList { games });
        }

        ClientMessage::Ping => state.send_to(client, ServerMessage::Pong),
    }
}

/// Start the bot driver for a game. The driver re-checks on every
/// iteration whether the current player is still a bot and whether the
/// game still exists, so spawning is safe even when no bot is up next.
fn kick_bots(state: &Arc<ServerState>, game_id: &str) {
    let registry = Arc::clone(&state.registry);
    let broadcaster = Arc::clone(state);
    let drive_id = game_id.to_string();
    let broadcast_id = game_id.to_string();

    tokio::spawn(async move {
        registry
            .drive_bots(drive_id, move |snapshot: &GameState| {
                broadcaster.broadcast_snapshot(&broadcast_id, snapshot);
            })
            .await;
    });
}
