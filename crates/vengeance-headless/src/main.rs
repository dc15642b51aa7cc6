use tracing_subscriber::EnvFilter;

use vengeance_core::PixelVengeance;
use vengeance_core::config::EngineConfig;
use vengeance_headless::driver::{SessionBroadcast, SessionCommand, spawn_session};
use vengeance_headless::settings::HeadlessSettings;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("{} headless starting", vengeance_core::GAME_NAME);

    let settings = HeadlessSettings::from_env();
    let game = match PixelVengeance::with_config(EngineConfig::load()) {
        Ok(game) => game,
        Err(e) => {
            tracing::error!(error = %e, "Invalid engine config");
            std::process::exit(1);
        },
    };

    let mode = settings.mode;
    let (cmd_tx, mut broadcast_rx, handle) = spawn_session(game, settings);
    let _ = cmd_tx.send(SessionCommand::SetMode(mode));
    let _ = cmd_tx.send(SessionCommand::Start);

    loop {
        tokio::select! {
            msg = broadcast_rx.recv() => {
                match msg {
                    Some(SessionBroadcast::Events(events)) => {
                        for event in events {
                            tracing::info!(?event, "Event");
                        }
                    },
                    Some(SessionBroadcast::Snapshot(_)) => {},
                    Some(SessionBroadcast::Ended) | None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping session");
                let _ = cmd_tx.send(SessionCommand::Stop);
            }
        }
    }

    match handle.await {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to encode run summary"),
        },
        Err(e) => tracing::error!(error = %e, "Frame loop task failed"),
    }
}
