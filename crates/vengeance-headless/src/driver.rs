use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use vengeance_core::PixelVengeance;
use vengeance_core::entity::{Direction, GameMode, GameStatus, PlayerId};
use vengeance_core::events::GameEvent;

use crate::autopilot;
use crate::settings::HeadlessSettings;

/// Commands sent from a front end to the frame loop.
#[derive(Debug)]
pub enum SessionCommand {
    SetHeading {
        player_id: PlayerId,
        heading: Direction,
    },
    Shoot {
        player_id: PlayerId,
    },
    SetName {
        player_id: PlayerId,
        name: String,
    },
    SetMode(GameMode),
    Start,
    Pause,
    Reset,
    Stop,
}

/// Output of the frame loop.
#[derive(Debug, Clone)]
pub enum SessionBroadcast {
    /// MessagePack snapshot of maze and state, sent once per frame.
    Snapshot(Vec<u8>),
    /// Events produced by one frame, only sent when there are any.
    Events(Vec<GameEvent>),
    /// The loop has exited.
    Ended,
}

/// Final tally returned when the loop exits.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed_ms: f64,
    pub status: GameStatus,
    pub winner: Option<PlayerId>,
    pub high_score: u32,
    pub scores: [u32; 2],
}

impl RunSummary {
    fn of(game: &PixelVengeance, frames: u64) -> Self {
        let state = game.state();
        Self {
            frames,
            elapsed_ms: state.elapsed_ms,
            status: state.status,
            winner: state.winner,
            high_score: state.high_score,
            scores: [state.players[0].score, state.players[1].score],
        }
    }
}

/// Spawn the frame loop as a tokio task.
/// Returns the command sender, broadcast receiver and the task handle.
pub fn spawn_session(
    game: PixelVengeance,
    settings: HeadlessSettings,
) -> (
    mpsc::UnboundedSender<SessionCommand>,
    mpsc::UnboundedReceiver<SessionBroadcast>,
    JoinHandle<RunSummary>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(run_frame_loop(game, settings, cmd_rx, broadcast_tx));

    (cmd_tx, broadcast_rx, handle)
}

async fn run_frame_loop(
    mut game: PixelVengeance,
    settings: HeadlessSettings,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    broadcast_tx: mpsc::UnboundedSender<SessionBroadcast>,
) -> RunSummary {
    let frame_ms = settings.frame_ms();
    let max_frames = settings.max_frames();
    let mut interval = tokio::time::interval(Duration::from_secs_f32(frame_ms / 1000.0));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut frames: u64 = 0;
    tracing::info!(fps = settings.fps, ?max_frames, autopilot = settings.autopilot, "Frame loop started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if game.state().status != GameStatus::Playing {
                    // Commands queued while idle (GameStarted) still go out.
                    let events = game.advance(0.0);
                    if !events.is_empty() {
                        let _ = broadcast_tx.send(SessionBroadcast::Events(events));
                    }
                    continue;
                }

                if settings.autopilot {
                    for player_id in [1, 2] {
                        if !game.state().is_participating(player_id) {
                            continue;
                        }
                        let steering = autopilot::steer(game.state(), game.maze(), player_id);
                        if let Some(heading) = steering.heading {
                            game.set_heading(player_id, heading);
                        }
                        if steering.shoot {
                            game.request_shoot(player_id);
                        }
                    }
                }

                let events = game.advance(frame_ms);
                frames += 1;
                for event in &events {
                    tracing::debug!(?event, frame = frames, "Game event");
                }
                if !events.is_empty() {
                    let _ = broadcast_tx.send(SessionBroadcast::Events(events));
                }
                let _ = broadcast_tx.send(SessionBroadcast::Snapshot(game.serialize_state()));

                if game.state().status == GameStatus::GameOver {
                    break;
                }
                if max_frames.is_some_and(|max| frames >= max) {
                    tracing::info!(frames, "Frame budget reached");
                    break;
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::SetHeading { player_id, heading }) => {
                        game.set_heading(player_id, heading);
                    },
                    Some(SessionCommand::Shoot { player_id }) => {
                        game.request_shoot(player_id);
                    },
                    Some(SessionCommand::SetName { player_id, name }) => {
                        game.set_player_name(player_id, &name);
                    },
                    Some(SessionCommand::SetMode(mode)) => game.set_mode(mode),
                    Some(SessionCommand::Start) => game.start(),
                    Some(SessionCommand::Pause) => game.pause(),
                    Some(SessionCommand::Reset) => game.reset(),
                    Some(SessionCommand::Stop) | None => break,
                }
            }
        }
    }

    let summary = RunSummary::of(&game, frames);
    tracing::info!(
        frames,
        status = ?summary.status,
        winner = ?summary.winner,
        high_score = summary.high_score,
        "Frame loop ended"
    );
    let _ = broadcast_tx.send(SessionBroadcast::Ended);
    summary
}
