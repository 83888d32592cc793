//! Huddle kiosk: a terminal front end for the sync agent.
//!
//! Shows the live team counts as they arrive and hands out teams.
//!
//! | Input   | Action                                |
//! |---------|---------------------------------------|
//! | `Enter` | assign a team to the current person   |
//! | `r`     | reset the kiosk for the next person   |
//! | `q`     | quit, closing the live feed           |
//!
//! Logs go to stderr so they do not interleave with the display.

use anyhow::Context;
use huddle_client::{AssignmentSource, ClientConfig, ClientSyncAgent, FeedMode, VoteState};
use huddle_types::CounterState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("huddle-kiosk starting");

    let config = ClientConfig::from_env().context("invalid kiosk configuration")?;
    info!(
        api = config.api_base_url,
        simulation = config.simulation_mode,
        state_dir = %config.state_dir.display(),
        "Configuration loaded"
    );
    let agent = ClientSyncAgent::new(config).context("could not start the sync agent")?;

    match agent.state().await {
        VoteState::Voted(record) => {
            if let Some(team) = record.team() {
                println!("This kiosk already assigned {}. Press r to reset.", team.display_name());
            }
        }
        VoteState::Unvoted => println!("Press Enter to get your team."),
    }

    let (feed, mut snapshots) = agent.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(snapshot) = snapshots.recv() => print_counts(&snapshot, feed.mode()),
            line = lines.next_line() => {
                let Some(line) = line.context("could not read from stdin")? else {
                    break;
                };
                match line.trim() {
                    "" => assign(&agent).await,
                    "r" => match agent.reset().await {
                        Ok(()) => println!("Ready for the next person. Press Enter to get your team."),
                        Err(e) => {
                            error!(error = %e, "Reset failed");
                            println!("Could not reset. Please try again.");
                        }
                    },
                    "q" => break,
                    other => println!("Unknown command {other:?}. Enter = assign, r = reset, q = quit."),
                }
            }
        }
    }

    feed.close();
    info!("huddle-kiosk stopped");
    Ok(())
}

async fn assign(agent: &ClientSyncAgent) {
    match agent.request_assignment().await {
        Ok(outcome) => {
            let team = outcome.team.team();
            match outcome.source {
                AssignmentSource::AlreadyAssigned => {
                    println!("You are already on {} ({}).", team.name, team.hex);
                }
                AssignmentSource::Authoritative => {
                    println!("Welcome to {} ({})!", team.name, team.hex);
                }
                AssignmentSource::LocalFallback => {
                    println!("Welcome to {} ({})! (offline)", team.name, team.hex);
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Assignment failed");
            println!("Something went wrong. Please try again.");
        }
    }
}

fn print_counts(counts: &CounterState, mode: FeedMode) {
    let line: Vec<String> = counts
        .summaries()
        .into_iter()
        .map(|summary| format!("{} {}", summary.name, summary.count))
        .collect();
    let source = if mode == FeedMode::Poll { " [offline]" } else { "" };
    println!("{} | total {}{source}", line.join(" | "), counts.total());
}
