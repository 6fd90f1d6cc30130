//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, RoomInfo, RoomStatus, ServerMessage};
use crate::room::{GameRoom, RoomError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use hexchess_core::Rules;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All active rooms
    pub rooms: DashMap<Uuid, GameRoom>,
    /// Mapping from player ID to their room ID
    pub player_rooms: DashMap<Uuid, Uuid>,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Rules for newly created rooms
    pub rules: Rules,
}

impl ServerState {
    pub fn new(rules: Rules) -> Self {
        Self {
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
            rules,
        }
    }

    /// Room the player is currently in
    pub fn room_of(&self, player_id: Uuid) -> Option<Uuid> {
        self.player_rooms.get(&player_id).map(|entry| *entry)
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to all players in a room.
    pub fn broadcast_to_room(&self, room_id: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                self.send_to_player(*player_id, msg.clone());
            }
        }
    }

    /// Broadcast a message to all players in a room except one.
    pub fn broadcast_to_room_except(&self, room_id: Uuid, except: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                if *player_id != except {
                    self.send_to_player(*player_id, msg.clone());
                }
            }
        }
    }

    /// Send an error message to a player.
    pub fn send_error(&self, player_id: Uuid, error: impl Display) {
        self.send_to_player(
            player_id,
            ServerMessage::Error {
                message: error.to_string(),
            },
        );
    }

    /// Get list of waiting rooms.
    pub fn get_waiting_rooms(&self) -> Vec<RoomInfo> {
        self.rooms
            .iter()
            .filter(|r| r.status == RoomStatus::Waiting)
            .map(|r| r.to_info())
            .collect()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("hexchess server listening on {}", addr);

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

    // Assign a player ID
    let player_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    // Send welcome message
    let welcome = ServerMessage::Welcome { player_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text.into())).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => handle_message(player_id, client_msg, &state),
                    Err(e) => {
                        warn!("Invalid message from {}: {}", player_id, e);
                        state.send_error(player_id, format!("Invalid message: {}", e));
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(player_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    handle_disconnect(player_id, &state);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(player_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateRoom { player_name } => {
            if state.room_of(player_id).is_some() {
                state.send_error(player_id, RoomError::AlreadyInRoom);
                return;
            }
            let room_id = Uuid::new_v4();
            let room = GameRoom::new(room_id, player_id, player_name, state.rules);
            let room_info = room.to_info();

            state.rooms.insert(room_id, room);
            state.player_rooms.insert(player_id, room_id);
            info!(%room_id, host = %player_id, "room created");

            state.send_to_player(player_id, ServerMessage::RoomCreated { room_id });
            state.send_to_player(player_id, ServerMessage::JoinedRoom { room: room_info });
        }

        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            if state.room_of(player_id).is_some() {
                state.send_error(player_id, RoomError::AlreadyInRoom);
                return;
            }
            if let Some(mut room) = state.rooms.get_mut(&room_id) {
                match room.add_player(player_id, player_name) {
                    Ok(()) => {
                        let room_info = room.to_info();
                        state.player_rooms.insert(player_id, room_id);

                        state.send_to_player(
                            player_id,
                            ServerMessage::JoinedRoom {
                                room: room_info.clone(),
                            },
                        );

                        // Notify other players
                        drop(room); // Release lock before broadcasting
                        state.broadcast_to_room_except(
                            room_id,
                            player_id,
                            ServerMessage::RoomUpdated { room: room_info },
                        );
                    }
                    Err(e) => state.send_error(player_id, e),
                }
            } else {
                state.send_error(player_id, "Room not found");
            }
        }

        ClientMessage::LeaveRoom => {
            if let Some((_, room_id)) = state.player_rooms.remove(&player_id) {
                let should_remove = {
                    if let Some(mut room) = state.rooms.get_mut(&room_id) {
                        let is_empty = room.remove_player(player_id).unwrap_or(false);

                        if !is_empty {
                            let room_info = room.to_info();
                            drop(room);
                            state.broadcast_to_room(
                                room_id,
                                ServerMessage::RoomUpdated { room: room_info },
                            );
                        }

                        is_empty
                    } else {
                        false
                    }
                };

                if should_remove {
                    state.rooms.remove(&room_id);
                    info!(%room_id, "room removed");
                }

                state.send_to_player(player_id, ServerMessage::LeftRoom);
            }
        }

        ClientMessage::StartGame => {
            let Some(room_id) = state.room_of(player_id) else {
                return;
            };
            if let Some(mut room) = state.rooms.get_mut(&room_id) {
                match room.start_game(player_id) {
                    Ok(()) => {
                        let game_state = room.game_state();
                        let room_info = room.to_info();
                        drop(room);

                        info!(%room_id, "game started");
                        state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
                        if let Some(game_state) = game_state {
                            let color = game_state.side_to_move();
                            state.broadcast_to_room(
                                room_id,
                                ServerMessage::GameStarted {
                                    state: Box::new(game_state),
                                },
                            );
                            state.broadcast_to_room(room_id, ServerMessage::TurnChanged { color });
                        }
                    }
                    Err(e) => state.send_error(player_id, e),
                }
            }
        }

        ClientMessage::SelectCell { cell } => {
            let Some(room_id) = state.room_of(player_id) else {
                return;
            };
            if let Some(room) = state.rooms.get(&room_id) {
                match room.valid_moves(cell) {
                    Ok(moves) => {
                        drop(room);
                        state.send_to_player(player_id, ServerMessage::ValidMoves { cell, moves });
                    }
                    Err(e) => {
                        drop(room);
                        state.send_error(player_id, e);
                    }
                }
            }
        }

        ClientMessage::RequestMove { from, to } => {
            let Some(room_id) = state.room_of(player_id) else {
                return;
            };
            if let Some(mut room) = state.rooms.get_mut(&room_id) {
                match room.request_move(player_id, from, to) {
                    Ok(events) => {
                        let game_state = room.game_state();
                        let winner = room.winner();
                        drop(room);

                        debug!(%room_id, %from, %to, "move applied");

                        // Send move result to the acting player
                        state.send_to_player(
                            player_id,
                            ServerMessage::MoveResult {
                                success: true,
                                events,
                                error: None,
                            },
                        );

                        // Broadcast updated game state
                        if let Some(game_state) = game_state {
                            let color = game_state.side_to_move();
                            state.broadcast_to_room(
                                room_id,
                                ServerMessage::GameState {
                                    state: Box::new(game_state),
                                },
                            );
                            state.broadcast_to_room(room_id, ServerMessage::TurnChanged { color });
                        }

                        // Check for game over
                        if let Some((winner, winner_name)) = winner {
                            info!(%room_id, %winner, "game over");
                            state.broadcast_to_room(
                                room_id,
                                ServerMessage::GameOver {
                                    winner,
                                    winner_name,
                                },
                            );
                        }
                    }
                    Err(e) => {
                        drop(room);
                        state.send_to_player(
                            player_id,
                            ServerMessage::MoveResult {
                                success: false,
                                events: vec![],
                                error: Some(e.to_string()),
                            },
                        );
                    }
                }
            }
        }

        ClientMessage::Chat { message } => {
            if let Some(room_id) = state.room_of(player_id) {
                let player_name = state
                    .rooms
                    .get(&room_id)
                    .and_then(|r| r.players.get(&player_id).map(|p| p.name.clone()))
                    .unwrap_or_else(|| "Unknown".to_string());

                state.broadcast_to_room(
                    room_id,
                    ServerMessage::ChatMessage {
                        player_name,
                        message,
                    },
                );
            }
        }

        ClientMessage::ListRooms => {
            let rooms = state.get_waiting_rooms();
            state.send_to_player(player_id, ServerMessage::RoomList { rooms });
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

/// Handle player disconnect.
fn handle_disconnect(player_id: Uuid, state: &Arc<ServerState>) {
    if let Some((_, room_id)) = state.player_rooms.remove(&player_id) {
        if let Some(mut room) = state.rooms.get_mut(&room_id) {
            // Mark player as disconnected instead of removing during game
            if room.status == RoomStatus::InGame {
                room.set_player_connected(player_id, false);
                let room_info = room.to_info();
                drop(room);
                state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
            } else {
                // Remove player if game hasn't started
                let is_empty = room.remove_player(player_id).unwrap_or(false);
                if is_empty {
                    drop(room);
                    state.rooms.remove(&room_id);
                } else {
                    let room_info = room.to_info();
                    drop(room);
                    state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
                }
            }
        }
    }
}
