//! Terminal host: plays a floor from stdin, one command per line.
mod config;
mod input;
mod render;

use anyhow::{Context, Result};
use tactics_content::{ConfigLoader, ContentFactory};
use tactics_core::TurnPhase;
use tactics_runtime::{Event, Session, Topic};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{self, Duration};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::CliConfig;
use input::Command;

/// Upper bound on frames spent waiting for the board to go quiet.
const MAX_SETTLE_FRAMES: usize = 10_000;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _guard = setup_logging(&config)?;

    let factory = ContentFactory::new(&config.data_dir);
    let tactics = match &config.config_path {
        Some(path) => ConfigLoader::load(path)?,
        None => factory.load_config()?,
    };
    let layout = factory
        .load_floor(&config.floor)
        .with_context(|| format!("failed to open floor '{}'", config.floor))?;

    let mut session = Session::builder()
        .layout(layout)
        .tactics(tactics)
        .auto_complete_actions(true)
        .build()?;
    let mut subscriptions = session.bus().subscribe_multiple(&Topic::ALL);

    session.start()?;
    tracing::info!(floor = %config.floor, "floor opened");
    println!("{}", input::HELP);
    present(&session, &mut subscriptions, &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match input::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("{error:#}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", input::HELP);
                continue;
            }
            Command::Board => {}
            Command::Select(position) => {
                session.select(position);
            }
            Command::EndTurn => {
                if session.end_turn().is_none() {
                    println!("cannot end the turn right now");
                }
            }
        }

        run_until_quiet(&mut session, &config).await;
        present(&session, &mut subscriptions, &config);

        if let Some(outcome) = session.outcome() {
            println!("floor decided: {outcome} in round {}", session.round());
            break;
        }
    }

    Ok(())
}

/// Ticks at the configured frame rate until no unit is busy and the enemy
/// has handed the turn back.
async fn run_until_quiet(session: &mut Session, config: &CliConfig) {
    let mut frames = time::interval(Duration::from_millis(config.tick_ms));
    let dt = config.frame_seconds();

    for _ in 0..MAX_SETTLE_FRAMES {
        if session.is_idle() && session.phase() != TurnPhase::EnemyTurn {
            return;
        }
        frames.tick().await;
        session.tick(dt);
    }
    tracing::warn!(frames = MAX_SETTLE_FRAMES, "board never went quiet");
}

fn present(
    session: &Session,
    subscriptions: &mut [(Topic, broadcast::Receiver<Event>)],
    config: &CliConfig,
) {
    for (topic, rx) in subscriptions.iter_mut() {
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if config.echo_events {
                        match serde_json::to_string(&event) {
                            Ok(json) => println!("{json}"),
                            Err(error) => tracing::warn!(?topic, %error, "event not serializable"),
                        }
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(?topic, skipped, "event stream lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
    print!("{}", render::board(session));
}

/// Logs to stderr, and to `<log_dir>/tactics.log` when a directory is configured.
fn setup_logging(config: &CliConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, "tactics.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = &config.log_dir {
        tracing::info!("Log file: {}/tactics.log", dir.display());
    }
    Ok(guard)
}
