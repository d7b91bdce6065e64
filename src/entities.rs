//! Wire entities shared with the poker node's gateway.
//!
//! Everything here is produced by the gateway and replaced wholesale on each
//! reconcile; nothing in this crate mutates these values field by field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chip amounts as reported by the gateway.
pub type Chips = i64;

/// Phase of the shared game, as the node reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum GameStatus {
    Waiting,
    PlayerReady,
    Dealing,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    HandComplete,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "WAITING",
            Self::PlayerReady => "PLAYER-READY",
            Self::Dealing => "DEALING",
            Self::Preflop => "PREFLOP",
            Self::Flop => "FLOP",
            Self::Turn => "TURN",
            Self::River => "RIVER",
            Self::Showdown => "SHOWDOWN",
            Self::HandComplete => "HAND-COMPLETE",
        };
        write!(f, "{repr}")
    }
}

/// An action a player can submit on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    Ready,
}

impl PlayerAction {
    /// BET and RAISE carry an amount in the request body; the rest do not.
    pub fn requires_value(&self) -> bool {
        matches!(self, Self::Bet | Self::Raise)
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Fold => "FOLD",
            Self::Check => "CHECK",
            Self::Call => "CALL",
            Self::Bet => "BET",
            Self::Raise => "RAISE",
            Self::Ready => "READY",
        };
        write!(f, "{repr}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Spades => "♠",
            Self::Hearts => "♥",
            Self::Diamonds => "♦",
            Self::Clubs => "♣",
        }
    }
}

/// A single card. Immutable; the `display` label is precomputed by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub value: u8,
    pub display: String,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value_repr = match self.value {
            1 | 14 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            n => n.to_string(),
        };
        write!(f, "{value_repr}{}", self.suit.glyph())
    }
}

/// Per-viewer snapshot of the shared table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub status: GameStatus,
    /// The viewer's own hole cards.
    pub my_hand: Vec<Card>,
    /// Community cards, 0-5 elements.
    pub community_cards: Vec<Card>,
    pub pot: Chips,
    pub highest_bet: Chips,
    pub min_raise: Chips,
    /// Action kinds currently legal for the viewer.
    pub valid_actions: Vec<PlayerAction>,
    pub is_my_turn: bool,
    pub my_stack: Chips,
    pub current_turn_id: i64,
    pub my_player_id: i64,
    pub dealer_id: i64,
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// Seconds of time bank remaining, when the node enforces one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_bank: Option<u64>,
}

impl TableState {
    /// Whether `action` is currently legal for the viewer.
    pub fn can(&self, action: PlayerAction) -> bool {
        self.valid_actions.contains(&action)
    }

    /// `is_my_turn` implies the viewer is the current-turn player.
    pub fn turn_consistent(&self) -> bool {
        !self.is_my_turn || self.current_turn_id == self.my_player_id
    }
}

/// Public state of one player at the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub player_id: i64,
    pub listen_addr: String,
    pub stack: Chips,
    pub current_bet: Chips,
    pub is_active: bool,
    pub is_folded: bool,
    pub is_all_in: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub is_current_turn: bool,
}

/// Full roster, with the node's redundant counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayersSnapshot {
    pub players: Vec<PlayerState>,
    pub total_players: usize,
    pub active_players: usize,
}

impl PlayersSnapshot {
    /// The redundant counts must agree with the roster itself.
    pub fn counts_consistent(&self) -> bool {
        self.total_players == self.players.len()
            && self.active_players == self.players.iter().filter(|p| p.is_active).count()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub game_status: GameStatus,
}

/// Acknowledgement returned by every action endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    #[serde(default)]
    pub value: Option<Chips>,
    pub player: String,
}

/// Request body for BET and RAISE.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest {
    pub value: Chips,
}

/// Request body for joining a peer node.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectRequest {
    pub addr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(suit: Suit, value: u8) -> Card {
        Card {
            suit,
            value,
            display: String::new(),
        }
    }

    #[test]
    fn test_status_wire_names_use_hyphens() {
        assert_eq!(
            serde_json::to_string(&GameStatus::PlayerReady).unwrap(),
            "\"PLAYER-READY\""
        );
        assert_eq!(
            serde_json::to_string(&GameStatus::HandComplete).unwrap(),
            "\"HAND-COMPLETE\""
        );
        assert_eq!(
            serde_json::from_str::<GameStatus>("\"PREFLOP\"").unwrap(),
            GameStatus::Preflop
        );
    }

    #[test]
    fn test_action_wire_names() {
        for (action, repr) in [
            (PlayerAction::Fold, "\"FOLD\""),
            (PlayerAction::Check, "\"CHECK\""),
            (PlayerAction::Call, "\"CALL\""),
            (PlayerAction::Bet, "\"BET\""),
            (PlayerAction::Raise, "\"RAISE\""),
            (PlayerAction::Ready, "\"READY\""),
        ] {
            assert_eq!(serde_json::to_string(&action).unwrap(), repr);
            assert_eq!(serde_json::from_str::<PlayerAction>(repr).unwrap(), action);
        }
    }

    #[test]
    fn test_requires_value() {
        assert!(PlayerAction::Bet.requires_value());
        assert!(PlayerAction::Raise.requires_value());
        assert!(!PlayerAction::Fold.requires_value());
        assert!(!PlayerAction::Check.requires_value());
        assert!(!PlayerAction::Call.requires_value());
        assert!(!PlayerAction::Ready.requires_value());
    }

    #[test]
    fn test_card_display() {
        assert_eq!(card(Suit::Spades, 1).to_string(), "A♠");
        assert_eq!(card(Suit::Hearts, 13).to_string(), "K♥");
        assert_eq!(card(Suit::Diamonds, 10).to_string(), "10♦");
        assert_eq!(card(Suit::Clubs, 11).to_string(), "J♣");
    }

    #[test]
    fn test_table_state_parses_gateway_json() {
        let json = r#"{
            "status": "PREFLOP",
            "my_hand": [{"suit": "SPADES", "value": 1, "display": "ACE of SPADES ♠"}],
            "community_cards": [],
            "pot": 60,
            "highest_bet": 40,
            "min_raise": 20,
            "valid_actions": ["FOLD", "CALL", "RAISE"],
            "is_my_turn": true,
            "my_stack": 960,
            "current_turn_id": 1,
            "my_player_id": 1,
            "dealer_id": 2,
            "small_blind": 10,
            "big_blind": 20
        }"#;
        let table: TableState = serde_json::from_str(json).unwrap();
        assert_eq!(table.status, GameStatus::Preflop);
        assert!(table.can(PlayerAction::Call));
        assert!(!table.can(PlayerAction::Check));
        assert!(table.turn_consistent());
        assert_eq!(table.time_bank, None);
    }

    #[test]
    fn test_turn_consistency_violation() {
        let json = r#"{
            "status": "FLOP", "my_hand": [], "community_cards": [],
            "pot": 0, "highest_bet": 0, "min_raise": 20, "valid_actions": [],
            "is_my_turn": true, "my_stack": 1000,
            "current_turn_id": 2, "my_player_id": 1, "dealer_id": 0,
            "small_blind": 10, "big_blind": 20
        }"#;
        let table: TableState = serde_json::from_str(json).unwrap();
        assert!(!table.turn_consistent());
    }

    #[test]
    fn test_players_counts_consistent() {
        let player = PlayerState {
            player_id: 1,
            listen_addr: "localhost:3000".into(),
            stack: 1000,
            current_bet: 0,
            is_active: true,
            is_folded: false,
            is_all_in: false,
            is_dealer: true,
            is_small_blind: false,
            is_big_blind: false,
            is_current_turn: false,
        };
        let mut folded = player.clone();
        folded.player_id = 2;
        folded.is_active = false;
        folded.is_folded = true;

        let snapshot = PlayersSnapshot {
            players: vec![player, folded],
            total_players: 2,
            active_players: 1,
        };
        assert!(snapshot.counts_consistent());

        let inconsistent = PlayersSnapshot {
            active_players: 2,
            ..snapshot
        };
        assert!(!inconsistent.counts_consistent());
    }

    #[test]
    fn test_action_response_value_optional() {
        let with_value: ActionResponse =
            serde_json::from_str(r#"{"status": "BET", "value": 50, "player": "localhost:3000"}"#)
                .unwrap();
        assert_eq!(with_value.value, Some(50));

        let without: ActionResponse =
            serde_json::from_str(r#"{"status": "FOLD", "player": "localhost:3000"}"#).unwrap();
        assert_eq!(without.value, None);
    }
}
