//! A state-sync poker client for a P2P poker node.
//!
//! The client polls the node's HTTP gateway for authoritative table state,
//! keeps a local store in step with it, and submits player actions typed on
//! stdin.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use pico_args::Arguments;
use tokio::io::AsyncBufReadExt;

use pokersync::{
    api_client::{ApiClient, Gateway},
    commands::{ClientCommand, parse_command},
    config::ClientConfig,
    dispatcher::ActionDispatcher,
    entities::{PlayerAction, PlayersSnapshot, TableState},
    poller::Poller,
    store::{GameStore, StoreSnapshot},
};

const HELP: &str = "\
Sync client for a P2P poker node

USAGE:
  pokersync [OPTIONS]

OPTIONS:
  --server URL          Gateway URL  [default: http://localhost:8080]
  --interval MS         Poll interval in milliseconds; 0 disables polling
  --connect ADDR        Ask the node to join an existing peer before starting

FLAGS:
  -h, --help            Print help information

COMMANDS (at the prompt):
  ready, fold, check, call, bet <amount>, raise <amount>
  refresh, players, help, quit
";

struct Args {
    server_url: Option<String>,
    interval: Option<Duration>,
    connect: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs.opt_value_from_str("--server")?,
        interval: pargs
            .opt_value_from_str::<_, u64>("--interval")?
            .map(Duration::from_millis),
        connect: pargs.opt_value_from_str("--connect")?,
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::from_env(args.server_url, args.interval)
        .context("Invalid configuration")?;

    let gateway: Arc<dyn Gateway> = Arc::new(ApiClient::new(config.base_url.clone()));
    let store = Arc::new(GameStore::with_retry(Arc::clone(&gateway), config.retry));
    let poller = Poller::spawn(Arc::clone(&store), config.poll_interval);
    let dispatcher = ActionDispatcher::refreshing(Arc::clone(&gateway), Arc::clone(&store));

    if let Some(addr) = &args.connect {
        println!("Asking node to join peer {addr}...");
        gateway
            .connect_peer(addr)
            .await
            .with_context(|| format!("Failed to join peer {addr}"))?;
    }

    println!("Connecting to {}...", config.base_url);
    match store.refresh().await {
        Ok(()) => display_snapshot(&store.snapshot()),
        Err(err) => println!("Not connected yet ({err}); type 'refresh' to retry."),
    }

    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        line.clear();
        match stdin.read_line(&mut line).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                match parse_command(input) {
                    Ok(ClientCommand::Quit) => {
                        println!("Disconnecting...");
                        break;
                    }
                    Ok(ClientCommand::Help) => print!("{HELP}"),
                    Ok(ClientCommand::Refresh) => {
                        match store.refresh().await {
                            Ok(()) => display_snapshot(&store.snapshot()),
                            Err(err) => eprintln!("Refresh failed: {err}"),
                        }
                    }
                    Ok(ClientCommand::Players) => {
                        match &store.snapshot().players {
                            Some(players) => print!("{}", format_players(players)),
                            None => println!("No roster fetched yet."),
                        }
                    }
                    Ok(ClientCommand::Act { action, value }) => {
                        match dispatcher.execute_action(action, value).await {
                            Ok(ack) => {
                                println!("{} acknowledged by {}", ack.status, ack.player);
                                // The success hook already refreshed the store.
                                display_snapshot(&store.snapshot());
                            }
                            Err(err) => eprintln!("Error: {err}"),
                        }
                    }
                    Err(err) => eprintln!("Error: {err}"),
                }
            }
            Err(err) => {
                eprintln!("Error reading input: {err}");
                break;
            }
        }
    }

    poller.shutdown();
    println!("Disconnected from node.");
    Ok(())
}

/// Print the last-known table in a readable format.
fn display_snapshot(snapshot: &StoreSnapshot) {
    println!("{}", "═".repeat(72));
    match snapshot.connected {
        true => println!("● Connected"),
        false => println!(
            "● Disconnected{}",
            snapshot
                .error
                .as_deref()
                .map(|e| format!(" ({e})"))
                .unwrap_or_default()
        ),
    }

    match &snapshot.table {
        Some(table) => print!("{}", format_table(table)),
        None => println!("No table state yet."),
    }

    if let Some(players) = &snapshot.players {
        print!("{}", format_players(players));
    }
    println!("{}", "═".repeat(72));
}

fn format_table(table: &TableState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status: {}", table.status);
    let _ = writeln!(out, "Blinds: ${}/{}", table.small_blind, table.big_blind);

    if !table.community_cards.is_empty() {
        let board: Vec<String> = table.community_cards.iter().map(|c| c.to_string()).collect();
        let _ = writeln!(out, "Board: {}", board.join(" "));
    }

    let _ = writeln!(
        out,
        "Pot: ${}  Highest bet: ${}  Min raise: ${}",
        table.pot, table.highest_bet, table.min_raise
    );

    let hand: Vec<String> = table.my_hand.iter().map(|c| c.to_string()).collect();
    let _ = writeln!(
        out,
        "Your hand: {}  Stack: ${}",
        if hand.is_empty() {
            "??".to_string()
        } else {
            hand.join(" ")
        },
        table.my_stack
    );

    if table.is_my_turn {
        let actions: Vec<String> = table.valid_actions.iter().map(|a| a.to_string()).collect();
        let _ = writeln!(out, "→ Your turn! Valid actions: {}", actions.join(", "));
        if table.can(PlayerAction::Raise) {
            let _ = writeln!(out, "  (min raise is ${})", table.min_raise);
        }
    } else {
        let _ = writeln!(out, "Waiting on player {}", table.current_turn_id);
    }
    out
}

fn format_players(players: &PlayersSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Players: {} total, {} active",
        players.total_players, players.active_players
    );
    for player in &players.players {
        let mut markers = Vec::new();
        if player.is_dealer {
            markers.push("D");
        }
        if player.is_small_blind {
            markers.push("SB");
        }
        if player.is_big_blind {
            markers.push("BB");
        }
        if player.is_current_turn {
            markers.push("→");
        }

        let state = if player.is_folded {
            "folded"
        } else if player.is_all_in {
            "all-in"
        } else if player.is_active {
            "active"
        } else {
            "waiting"
        };

        let marker_repr = if markers.is_empty() {
            String::new()
        } else {
            format!(" ({})", markers.join("/"))
        };

        let _ = writeln!(
            out,
            "  {}. {}{} - ${} (bet ${}) - {}",
            player.player_id, player.listen_addr, marker_repr, player.stack, player.current_bet, state
        );
    }
    out
}
