//! Game room management.

use hexchess_core::{Color, GameEvent, GameState, HexCoord, MoveRejected, Rules};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::{PlayerInfo, RoomInfo, RoomStatus};

/// Seats per room: one per color
pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room is full")]
    RoomFull,

    #[error("Already in a room")]
    AlreadyInRoom,

    #[error("Player not in room")]
    PlayerNotInRoom,

    #[error("Not the host")]
    NotHost,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Move rejected: {0}")]
    Move(#[from] MoveRejected),
}

/// A player in a game room.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
    /// Assigned when the game starts
    pub color: Option<Color>,
}

impl RoomPlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            connected: true,
            color: None,
        }
    }

    pub fn to_info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            color: self.color,
            connected: self.connected,
        }
    }
}

/// A game room seating two players.
pub struct GameRoom {
    pub id: Uuid,
    pub name: String,
    pub host_id: Uuid,
    pub status: RoomStatus,
    pub players: HashMap<Uuid, RoomPlayer>,
    /// Join order; the first player plays White
    pub player_order: Vec<Uuid>,
    /// Rules the game is created with
    pub rules: Rules,
    /// The game state (once started)
    pub game: Option<GameState>,
}

impl GameRoom {
    pub fn new(id: Uuid, host_id: Uuid, host_name: String, rules: Rules) -> Self {
        let mut players = HashMap::new();
        players.insert(host_id, RoomPlayer::new(host_id, host_name.clone()));

        Self {
            id,
            name: format!("{}'s Game", host_name),
            host_id,
            status: RoomStatus::Waiting,
            players,
            player_order: vec![host_id],
            rules,
            game: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<(), RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.contains_key(&player_id) {
            return Err(RoomError::AlreadyInRoom);
        }
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }

        self.players.insert(player_id, RoomPlayer::new(player_id, name));
        self.player_order.push(player_id);
        Ok(())
    }

    /// Remove a player; returns true if the room is now empty
    pub fn remove_player(&mut self, player_id: Uuid) -> Result<bool, RoomError> {
        if self.players.remove(&player_id).is_none() {
            return Err(RoomError::PlayerNotInRoom);
        }
        self.player_order.retain(|&id| id != player_id);

        // If host left, assign new host
        if player_id == self.host_id {
            if let Some(&next) = self.player_order.first() {
                self.host_id = next;
            }
        }

        Ok(self.players.is_empty())
    }

    pub fn set_player_connected(&mut self, player_id: Uuid, connected: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = connected;
        }
    }

    pub fn start_game(&mut self, requester_id: Uuid) -> Result<(), RoomError> {
        if requester_id != self.host_id {
            return Err(RoomError::NotHost);
        }
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.len() < MAX_PLAYERS {
            return Err(RoomError::NotEnoughPlayers);
        }

        // Host plays White, the other seat Black
        for &player_id in &self.player_order {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.color = Some(if player_id == self.host_id {
                    Color::White
                } else {
                    Color::Black
                });
            }
        }

        self.game = Some(GameState::with_rules(self.rules));
        self.status = RoomStatus::InGame;

        Ok(())
    }

    /// Color a player plays in the running game
    pub fn color_of(&self, player_id: Uuid) -> Result<Color, RoomError> {
        self.players
            .get(&player_id)
            .ok_or(RoomError::PlayerNotInRoom)?
            .color
            .ok_or(RoomError::GameNotStarted)
    }

    /// Valid destinations of the piece on `cell`
    pub fn valid_moves(&self, cell: HexCoord) -> Result<Vec<HexCoord>, RoomError> {
        let game = self.game.as_ref().ok_or(RoomError::GameNotStarted)?;
        Ok(game.valid_moves(cell))
    }

    pub fn request_move(
        &mut self,
        player_id: Uuid,
        from: HexCoord,
        to: HexCoord,
    ) -> Result<Vec<GameEvent>, RoomError> {
        let color = self.color_of(player_id)?;
        let game = self.game.as_mut().ok_or(RoomError::GameNotStarted)?;

        if game.side_to_move() != color {
            return Err(RoomError::NotYourTurn);
        }

        let events = game.request_move(from, to)?;

        if game.is_finished() {
            self.status = RoomStatus::Finished;
        }

        Ok(events)
    }

    pub fn game_state(&self) -> Option<GameState> {
        self.game.clone()
    }

    pub fn side_to_move(&self) -> Option<Color> {
        self.game.as_ref().map(|g| g.side_to_move())
    }

    pub fn winner(&self) -> Option<(Color, String)> {
        let winner = self.game.as_ref()?.winner()?;
        let name = self
            .players
            .values()
            .find(|p| p.color == Some(winner))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| winner.to_string());
        Some((winner, name))
    }

    pub fn to_info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .player_order
                .iter()
                .filter_map(|id| self.players.get(id).map(|p| p.to_info()))
                .collect(),
            host_id: self.host_id,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_room() -> (GameRoom, Uuid, Uuid) {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), Rules::default());
        let guest_id = Uuid::new_v4();
        room.add_player(guest_id, "Guest".to_string()).unwrap();
        room.start_game(host_id).unwrap();
        (room, host_id, guest_id)
    }

    #[test]
    fn test_create_room() {
        let host_id = Uuid::new_v4();
        let room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), Rules::default());

        assert_eq!(room.player_count(), 1);
        assert!(!room.is_full());
        assert_eq!(room.host_id, host_id);
        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.name, "Host's Game");
    }

    #[test]
    fn test_add_remove_players() {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), Rules::default());

        let player2 = Uuid::new_v4();
        room.add_player(player2, "Player 2".to_string()).unwrap();

        assert_eq!(room.player_count(), 2);
        assert!(room.is_full());

        // Can't add a third player
        let player3 = Uuid::new_v4();
        assert!(matches!(
            room.add_player(player3, "Player 3".to_string()),
            Err(RoomError::RoomFull)
        ));

        // Host leaving hands the room over
        let empty = room.remove_player(host_id).unwrap();
        assert!(!empty);
        assert_eq!(room.host_id, player2);
        assert!(room.remove_player(player2).unwrap());
        assert!(matches!(
            room.remove_player(player2),
            Err(RoomError::PlayerNotInRoom)
        ));
    }

    #[test]
    fn test_player_cannot_take_two_seats() {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), Rules::default());

        assert!(matches!(
            room.add_player(host_id, "Host again".to_string()),
            Err(RoomError::AlreadyInRoom)
        ));
        assert_eq!(room.player_count(), 1);
        assert_eq!(room.player_order, vec![host_id]);
    }

    #[test]
    fn test_start_game_assigns_colors() {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), Rules::default());

        // Can't start with only 1 player
        assert!(matches!(
            room.start_game(host_id),
            Err(RoomError::NotEnoughPlayers)
        ));

        let guest_id = Uuid::new_v4();
        room.add_player(guest_id, "Guest".to_string()).unwrap();

        // Non-host can't start
        assert!(matches!(room.start_game(guest_id), Err(RoomError::NotHost)));

        room.start_game(host_id).unwrap();
        assert_eq!(room.status, RoomStatus::InGame);
        assert_eq!(room.color_of(host_id).unwrap(), Color::White);
        assert_eq!(room.color_of(guest_id).unwrap(), Color::Black);
        assert_eq!(room.side_to_move(), Some(Color::White));
    }

    #[test]
    fn test_moves_follow_turn_order() {
        let (mut room, host_id, guest_id) = started_room();
        let from = HexCoord::new(0, -1);
        let to = HexCoord::new(0, 0);

        assert!(room.valid_moves(from).unwrap().contains(&to));
        assert!(matches!(
            room.request_move(guest_id, HexCoord::new(0, 1), HexCoord::new(0, 0)),
            Err(RoomError::NotYourTurn)
        ));

        let events = room.request_move(host_id, from, to).unwrap();
        assert!(!events.is_empty());
        assert_eq!(room.side_to_move(), Some(Color::Black));

        assert!(matches!(
            room.request_move(host_id, HexCoord::new(0, 0), HexCoord::new(0, 1)),
            Err(RoomError::NotYourTurn)
        ));
    }

    #[test]
    fn test_engine_rejection_is_reported() {
        let (mut room, host_id, _) = started_room();
        assert!(matches!(
            room.request_move(host_id, HexCoord::ORIGIN, HexCoord::new(0, 1)),
            Err(RoomError::Move(MoveRejected::NoPiece(_)))
        ));
        assert_eq!(room.side_to_move(), Some(Color::White));
    }

    #[test]
    fn test_moves_need_a_started_game() {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), Rules::default());
        assert!(matches!(
            room.valid_moves(HexCoord::ORIGIN),
            Err(RoomError::GameNotStarted)
        ));
        assert!(matches!(
            room.request_move(host_id, HexCoord::new(0, -1), HexCoord::ORIGIN),
            Err(RoomError::GameNotStarted)
        ));
        assert!(room.winner().is_none());
    }
}
