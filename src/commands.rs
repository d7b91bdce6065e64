//! Command parsing for the interactive CLI.

use std::fmt;

use crate::entities::{Chips, PlayerAction};

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid bet/raise amount (not a valid number).
    InvalidAmount(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{}'. Must be a positive number (e.g., 'bet 50')",
                value
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A parsed CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Submit a player action. Missing BET/RAISE amounts are carried through
    /// as `None` and rejected by the dispatcher's own validation.
    Act {
        action: PlayerAction,
        value: Option<Chips>,
    },
    /// Force a reconcile outside the poll cadence.
    Refresh,
    /// Print the roster.
    Players,
    Help,
    Quit,
}

/// Parse a command string into a [`ClientCommand`].
///
/// # Examples
///
/// ```
/// use pokersync::commands::{parse_command, ClientCommand};
/// use pokersync::entities::PlayerAction;
///
/// assert_eq!(
///     parse_command("call"),
///     Ok(ClientCommand::Act { action: PlayerAction::Call, value: None })
/// );
/// assert_eq!(
///     parse_command("bet 50"),
///     Ok(ClientCommand::Act { action: PlayerAction::Bet, value: Some(50) })
/// );
/// ```
pub fn parse_command(input: &str) -> Result<ClientCommand, ParseError> {
    let trimmed = input.trim();

    match trimmed {
        "ready" => return Ok(act(PlayerAction::Ready, None)),
        "fold" => return Ok(act(PlayerAction::Fold, None)),
        "check" => return Ok(act(PlayerAction::Check, None)),
        "call" => return Ok(act(PlayerAction::Call, None)),
        "refresh" => return Ok(ClientCommand::Refresh),
        "players" => return Ok(ClientCommand::Players),
        "help" | "?" => return Ok(ClientCommand::Help),
        "quit" | "exit" => return Ok(ClientCommand::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"bet") => parse_amount_command(PlayerAction::Bet, &parts),
        Some(&"raise") => parse_amount_command(PlayerAction::Raise, &parts),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

fn act(action: PlayerAction, value: Option<Chips>) -> ClientCommand {
    ClientCommand::Act { action, value }
}

/// Parse "bet AMOUNT" / "raise AMOUNT".
fn parse_amount_command(
    action: PlayerAction,
    parts: &[&str],
) -> Result<ClientCommand, ParseError> {
    match parts.get(1) {
        Some(value) => {
            let amount = value
                .parse::<Chips>()
                .ok()
                .filter(|amount| *amount > 0)
                .ok_or_else(|| ParseError::InvalidAmount(value.to_string()))?;
            Ok(act(action, Some(amount)))
        }
        // Let the dispatcher surface its "Value is required" error.
        None => Ok(act(action, None)),
    }
}
