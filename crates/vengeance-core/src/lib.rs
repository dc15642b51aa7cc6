pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod interaction;
pub mod maze;
pub mod movement;
pub mod projectile;
pub mod pursuer;
pub mod schedule;
pub mod scoring;
pub mod tick;

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use config::EngineConfig;
use entity::{
    Archetype, Direction, GameMode, GameStatus, MAX_NAME_LEN, Pellet, Player, PlayerId,
    Projectile, Pursuer, PursuerId, default_name,
};
use error::ConfigError;
use events::GameEvent;
use interaction::slot;
use maze::{Maze, Tile};
use schedule::RespawnQueue;

/// Display name of the game.
pub const GAME_NAME: &str = "PIXEL VENGEANCE";

/// Serializable session state, broadcast to renderers as a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub status: GameStatus,
    /// Unset until chosen; `start()` falls back to single-player.
    pub mode: Option<GameMode>,
    pub players: [Player; 2],
    pub pursuers: [Pursuer; 4],
    pub projectiles: Vec<Projectile>,
    pub pellets: Vec<Pellet>,
    pub high_score: u32,
    pub winner: Option<PlayerId>,
    /// Session clock, advanced only while playing.
    pub elapsed_ms: f64,
    pub respawns: RespawnQueue,
    pub next_projectile_id: u32,
}

impl SessionState {
    fn initial(config: &EngineConfig, maze: &Maze, high_score: u32) -> Self {
        let pursuers = std::array::from_fn(|i| {
            let [x, y] = config.pursuer_spawns[i];
            Pursuer::new(i as PursuerId, Archetype::ALL[i], Tile::new(x, y))
        });
        Self {
            status: GameStatus::ModeSelection,
            mode: None,
            players: [1, 2].map(|id| {
                Player::new(
                    id,
                    maze.player_spawn(id),
                    config.starting_lives,
                    config.max_ammo,
                )
            }),
            pursuers,
            projectiles: Vec::new(),
            pellets: maze.pellets(),
            high_score,
            winner: None,
            elapsed_ms: 0.0,
            respawns: RespawnQueue::default(),
            next_projectile_id: 0,
        }
    }

    /// Player 1 always plays; player 2 only in two-player mode.
    pub fn participates(mode: Option<GameMode>, player_id: PlayerId) -> bool {
        match player_id {
            1 => true,
            2 => mode == Some(GameMode::TwoPlayer),
            _ => false,
        }
    }

    pub fn is_participating(&self, player_id: PlayerId) -> bool {
        Self::participates(self.mode, player_id)
    }
}

/// Intent staged between ticks for one player.
#[derive(Debug, Clone, Copy, Default)]
struct PendingIntent {
    heading: Option<Direction>,
    shoot: bool,
}

/// A Pixel Vengeance session: the only writer of [`SessionState`].
///
/// Intent calls stage changes; [`advance`](Self::advance) applies them at the
/// start of the next playing tick and runs the fixed resolution order.
pub struct PixelVengeance {
    state: SessionState,
    maze: Maze,
    config: EngineConfig,
    pending_intents: HashMap<PlayerId, PendingIntent>,
    outbox: Vec<GameEvent>,
    rng: StdRng,
}

impl PixelVengeance {
    pub fn new() -> Self {
        match Self::with_config(EngineConfig::load()) {
            Ok(game) => game,
            Err(e) => {
                tracing::warn!("Loaded config rejected: {e}, using defaults");
                Self::with_config(EngineConfig::default())
                    .expect("built-in configuration must be valid")
            },
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        let maze = config.validate()?;
        Ok(Self {
            state: SessionState::initial(&config, &maze, 0),
            rng: StdRng::seed_from_u64(config.rng_seed),
            maze,
            config,
            pending_intents: HashMap::new(),
            outbox: Vec::new(),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        matches!(id, 1 | 2).then(|| &self.state.players[slot(id)])
    }

    pub fn pursuer(&self, id: PursuerId) -> Option<&Pursuer> {
        self.state.pursuers.get(usize::from(id))
    }

    /// MessagePack snapshot of the maze and session state.
    pub fn serialize_state(&self) -> Vec<u8> {
        rmp_serde::to_vec(&(&self.maze, &self.state))
            .expect("session state serialization must succeed")
    }

    // ---- intents ----

    /// Stage a desired heading; it becomes the player's next heading.
    pub fn set_heading(&mut self, player_id: PlayerId, heading: Direction) {
        if !self.accepts_intent(player_id, "heading") {
            return;
        }
        self.pending_intents.entry(player_id).or_default().heading = Some(heading);
    }

    /// Stage a shot for the next tick.
    pub fn request_shoot(&mut self, player_id: PlayerId) {
        if !self.accepts_intent(player_id, "shoot") {
            return;
        }
        self.pending_intents.entry(player_id).or_default().shoot = true;
    }

    fn accepts_intent(&self, player_id: PlayerId, kind: &'static str) -> bool {
        if self.state.status != GameStatus::Playing {
            tracing::debug!(player_id, kind, status = ?self.state.status, "Intent ignored");
            return false;
        }
        if !self.state.is_participating(player_id) {
            tracing::debug!(player_id, kind, "Intent from non-participating player ignored");
            return false;
        }
        true
    }

    /// Set a display name before the game starts. Names are truncated to
    /// [`MAX_NAME_LEN`] characters; a blank name restores the default.
    pub fn set_player_name(&mut self, player_id: PlayerId, name: &str) {
        if self.state.status != GameStatus::ModeSelection || !matches!(player_id, 1 | 2) {
            tracing::debug!(player_id, "Name change ignored");
            return;
        }
        let trimmed = name.trim();
        self.state.players[slot(player_id)].name = if trimmed.is_empty() {
            default_name(player_id)
        } else {
            trimmed.chars().take(MAX_NAME_LEN).collect()
        };
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        if self.state.status != GameStatus::ModeSelection {
            tracing::debug!(?mode, "Mode change ignored outside mode selection");
            return;
        }
        self.state.mode = Some(mode);
    }

    /// Leave mode selection, or resume from pause.
    pub fn start(&mut self) {
        match self.state.status {
            GameStatus::ModeSelection => {
                let mode = *self.state.mode.get_or_insert(GameMode::SinglePlayer);
                self.state.status = GameStatus::Playing;
                tracing::info!(?mode, "Game started");
                self.outbox.push(GameEvent::GameStarted { mode });
            },
            GameStatus::Paused => {
                self.state.status = GameStatus::Playing;
                tracing::info!("Game resumed");
            },
            GameStatus::Playing | GameStatus::GameOver => {},
        }
    }

    pub fn pause(&mut self) {
        if self.state.status == GameStatus::Playing {
            self.state.status = GameStatus::Paused;
            self.pending_intents.clear();
            tracing::info!("Game paused");
        }
    }

    /// Back to mode selection with a fresh layout. The high score survives.
    pub fn reset(&mut self) {
        let high_score = self.state.high_score;
        self.state = SessionState::initial(&self.config, &self.maze, high_score);
        self.pending_intents.clear();
        self.outbox.clear();
        self.rng = StdRng::seed_from_u64(self.config.rng_seed);
        tracing::info!(high_score, "Session reset");
    }

    // ---- tick ----

    /// Advance the simulation by `delta_ms`. A no-op unless playing.
    ///
    /// Returns the events produced, preceded by any queued by intent calls.
    pub fn advance(&mut self, delta_ms: f32) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.outbox);
        if self.state.status != GameStatus::Playing {
            return events;
        }
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            tracing::debug!(delta_ms, "Rejected frame delta");
            return events;
        }

        let clamped = tick::clamp_frame(&self.config, delta_ms);
        if clamped < delta_ms {
            tracing::debug!(delta_ms, clamped, "Frame delta clamped");
        }
        let delta_ms = clamped;

        let steps = tick::substeps(&self.config, delta_ms);
        let step_ms = delta_ms / steps as f32;
        for _ in 0..steps {
            self.step(step_ms, &mut events);
            if self.state.status != GameStatus::Playing {
                break;
            }
        }
        events
    }

    fn step(&mut self, delta_ms: f32, events: &mut Vec<GameEvent>) {
        self.state.elapsed_ms += f64::from(delta_ms);
        interaction::respawn_due(&mut self.state, &self.maze, events);
        self.consume_intents(events);

        tick::tick_timers(&mut self.state, &self.config, delta_ms);
        tick::move_players(&mut self.state, &self.maze, &self.config, delta_ms);
        tick::move_pursuers(
            &mut self.state,
            &self.maze,
            &self.config,
            delta_ms,
            &mut self.rng,
        );

        interaction::resolve_projectiles(
            &mut self.state,
            &self.maze,
            &self.config,
            delta_ms,
            events,
        );
        interaction::resolve_pellets(&mut self.state, &self.config, events);
        interaction::resolve_contacts(&mut self.state, &self.maze, &self.config, events);

        self.check_game_over(events);
    }

    fn consume_intents(&mut self, events: &mut Vec<GameEvent>) {
        for player_id in [1, 2] {
            let Some(intent) = self.pending_intents.remove(&player_id) else {
                continue;
            };
            if let Some(heading) = intent.heading {
                self.state.players[slot(player_id)].next_heading = heading;
            }
            if intent.shoot
                && let Some(projectile_id) = interaction::fire(&mut self.state, player_id)
            {
                events.push(GameEvent::ShotFired {
                    player_id,
                    projectile_id,
                });
            }
        }
    }

    fn check_game_over(&mut self, events: &mut Vec<GameEvent>) {
        let mode = self.state.mode.unwrap_or(GameMode::SinglePlayer);
        let [one, two] = &self.state.players;
        let over = self.state.pellets.is_empty()
            || one.lives == 0
            || (mode == GameMode::TwoPlayer && two.lives == 0);
        if !over {
            return;
        }

        let winner = scoring::decide_winner(mode, one.score, two.score);
        let high_score = scoring::updated_high_score(self.state.high_score, &[one.score, two.score]);
        self.state.status = GameStatus::GameOver;
        self.state.winner = winner;
        self.state.high_score = high_score;
        self.pending_intents.clear();
        tracing::info!(?winner, high_score, "Game over");
        events.push(GameEvent::GameOver { winner, high_score });
    }
}

impl Default for PixelVengeance {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a snapshot produced by [`PixelVengeance::serialize_state`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<(Maze, SessionState), rmp_serde::decode::Error> {
    rmp_serde::from_slice(bytes)
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::config::EngineConfig;
    use crate::entity::{GameMode, GameStatus};
    use crate::events::GameEvent;
    use crate::{PixelVengeance, SessionState};

    /// Small fully walled maze with open corridors and a central house.
    pub const OPEN_MAZE: [&str; 7] = [
        "#########",
        "#1.....2#",
        "#.#.#.#.#",
        "#...G...#",
        "#.#.#.#.#",
        "#.......#",
        "#########",
    ];

    /// Default tunables on [`OPEN_MAZE`].
    pub fn open_maze_config() -> EngineConfig {
        EngineConfig {
            maze: OPEN_MAZE.iter().map(|row| row.to_string()).collect(),
            pursuer_spawns: [[4, 3], [3, 3], [5, 3], [4, 5]],
            ..EngineConfig::default()
        }
    }

    /// A session already in play.
    pub fn started(config: EngineConfig, mode: GameMode) -> PixelVengeance {
        let mut game = PixelVengeance::with_config(config).expect("test config must be valid");
        game.set_mode(mode);
        game.start();
        game
    }

    /// Run `n` ticks of `delta_ms`, returning every event produced.
    pub fn run_ticks(game: &mut PixelVengeance, n: usize, delta_ms: f32) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.advance(delta_ms));
        }
        all_events
    }

    // ================================================================
    // Session contracts
    // ================================================================

    /// While paused, ticks must not change anything; resuming must.
    pub fn contract_pause_freezes_state(game: &mut PixelVengeance) {
        game.start();
        game.advance(16.0);
        game.pause();
        assert_eq!(game.state().status, GameStatus::Paused);
        let before = game.serialize_state();
        run_ticks(game, 10, 16.0);
        assert_eq!(before, game.serialize_state(), "State must not change while paused");

        game.pause();
        assert_eq!(before, game.serialize_state(), "Second pause must be a no-op");

        game.start();
        game.advance(16.0);
        assert_ne!(before, game.serialize_state(), "State must change after resume");
    }

    /// reset() then a zero tick restores the initial layout, keeping the high score.
    pub fn contract_reset_restores_initial_layout(game: &mut PixelVengeance) {
        game.reset();
        let initial: SessionState = game.state().clone();

        game.start();
        run_ticks(game, 60, 16.0);
        game.state_mut().high_score = 4242;
        game.state_mut().pellets.pop();
        game.reset();
        game.advance(0.0);

        let state = game.state();
        assert_eq!(state.status, GameStatus::ModeSelection);
        assert_eq!(state.pellets, initial.pellets);
        for (now, then) in state.players.iter().zip(&initial.players) {
            assert_eq!(now.position, then.position);
            assert_eq!(now.score, 0);
            assert_eq!(now.lives, then.lives);
        }
        for (now, then) in state.pursuers.iter().zip(&initial.pursuers) {
            assert_eq!(now.position, then.position);
        }
        assert!(state.projectiles.is_empty());
        assert_eq!(state.high_score, 4242);
    }

    /// No participating player or pursuer ever rounds into a wall tile.
    pub fn contract_no_actor_in_wall(game: &mut PixelVengeance, ticks: usize, delta_ms: f32) {
        for tick in 0..ticks {
            game.advance(delta_ms);
            let state = game.state();
            let maze = game.maze();
            for player in state.players.iter().filter(|p| state.is_participating(p.id)) {
                let tile = player.position.tile();
                assert!(
                    !maze.is_wall_cell(tile.x, tile.y),
                    "player {} in wall at {:?} on tick {tick}",
                    player.id,
                    player.position
                );
            }
            for pursuer in &state.pursuers {
                let tile = pursuer.position.tile();
                assert!(
                    !maze.is_wall_cell(tile.x, tile.y),
                    "pursuer {} in wall at {:?} on tick {tick}",
                    pursuer.id,
                    pursuer.position
                );
            }
        }
    }
}
