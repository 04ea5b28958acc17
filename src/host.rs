//! Host-side lifecycle for a mounted game window
//!
//! The window manager owns one `MountedGame` per open game window. It calls
//! `start`/`stop`, feeds wall-clock time into `advance`, forwards raw key
//! names, and reads snapshots to render. Ticks and key events go through a
//! single FIFO queue per window and reach the simulation strictly in order.

use std::collections::VecDeque;

use serde::Serialize;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{
    FallingPieceSimulation, GridSnakeSimulation, Key, PaddleBallSimulation, Simulation,
};

/// Work queued for a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostMessage {
    Tick,
    KeyDown(Key),
    KeyUp(Key),
}

/// Drives one simulation on a fixed-interval clock
#[derive(Debug)]
pub struct GameRunner<S: Simulation> {
    sim: S,
    running: bool,
    tick_interval_ms: f64,
    max_substeps: u32,
    max_frame_ms: f64,
    accumulator: f64,
    last_time: Option<f64>,
    queue: VecDeque<HostMessage>,
    events: VecDeque<S::Event>,
    ticks: u64,
}

impl<S: Simulation> GameRunner<S> {
    /// Stopped runner with default frame limits
    pub fn new(sim: S, tick_interval_ms: f64) -> Self {
        Self {
            sim,
            running: false,
            tick_interval_ms,
            max_substeps: MAX_SUBSTEPS,
            max_frame_ms: MAX_FRAME_MS,
            accumulator: 0.0,
            last_time: None,
            queue: VecDeque::new(),
            events: VecDeque::new(),
            ticks: 0,
        }
    }

    /// Override the substep cap and frame clamp
    pub fn with_limits(mut self, max_substeps: u32, max_frame_ms: f64) -> Self {
        self.max_substeps = max_substeps.max(1);
        self.max_frame_ms = max_frame_ms;
        self
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_interval_ms(&self) -> f64 {
        self.tick_interval_ms
    }

    /// Ticks run since this runner (or its last `replace`) began
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Begin ticking. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            log::debug!("start ignored, already running");
            return false;
        }
        self.running = true;
        self.accumulator = 0.0;
        self.last_time = None;
        self.sim.release_all_keys();
        true
    }

    /// Halt ticking and drop pending input. The simulation state is kept
    /// for display. Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.queue.clear();
        // Key-ups are not delivered while stopped
        self.sim.release_all_keys();
        self.accumulator = 0.0;
        self.last_time = None;
        true
    }

    /// Swap in a fresh simulation, keeping the lifecycle state.
    /// Returns the old one.
    pub fn replace(&mut self, sim: S) -> S {
        self.queue.clear();
        self.events.clear();
        self.accumulator = 0.0;
        self.ticks = 0;
        std::mem::replace(&mut self.sim, sim)
    }

    /// Forward a DOM key name. Returns true if a running game consumed it.
    pub fn handle_key_down(&mut self, key_name: &str) -> bool {
        self.post_key(key_name, HostMessage::KeyDown)
    }

    pub fn handle_key_up(&mut self, key_name: &str) -> bool {
        self.post_key(key_name, HostMessage::KeyUp)
    }

    fn post_key(&mut self, key_name: &str, message: fn(Key) -> HostMessage) -> bool {
        if !self.running {
            return false;
        }
        let Some(key) = Key::from_key_name(key_name) else {
            return false;
        };
        self.queue.push_back(message(key));
        self.pump();
        true
    }

    /// Feed the clock. Runs every tick that came due since the previous
    /// call, up to the substep cap, and returns how many ran.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if !self.running {
            return 0;
        }
        let elapsed = match self.last_time {
            Some(last) => (now_ms - last).clamp(0.0, self.max_frame_ms),
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.accumulator += elapsed;

        let mut due = 0;
        while self.accumulator >= self.tick_interval_ms && due < self.max_substeps {
            self.queue.push_back(HostMessage::Tick);
            self.accumulator -= self.tick_interval_ms;
            due += 1;
        }
        if self.accumulator >= self.tick_interval_ms {
            log::debug!("Dropping {:.1}ms of backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        self.pump();
        due
    }

    fn pump(&mut self) {
        while let Some(message) = self.queue.pop_front() {
            match message {
                HostMessage::Tick => {
                    self.sim.tick();
                    self.ticks += 1;
                }
                HostMessage::KeyDown(key) => self.sim.handle_key_down(key),
                HostMessage::KeyUp(key) => self.sim.handle_key_up(key),
            }
            for event in self.sim.take_events() {
                if self.events.len() == MAX_PENDING_EVENTS {
                    self.events.pop_front();
                }
                self.events.push_back(event);
            }
        }
    }

    pub fn snapshot(&self) -> S::Snapshot {
        self.sim.snapshot()
    }

    pub fn is_over(&self) -> bool {
        self.sim.is_over()
    }

    /// Drain events produced since the last call, oldest first
    pub fn take_events(&mut self) -> Vec<S::Event> {
        self.events.drain(..).collect()
    }
}

/// The games a window can host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameKind {
    PaddleBall,
    GridSnake,
    FallingPiece,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::PaddleBall, GameKind::GridSnake, GameKind::FallingPiece];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::PaddleBall => "paddle-ball",
            GameKind::GridSnake => "grid-snake",
            GameKind::FallingPiece => "falling-piece",
        }
    }

    /// Parse a window id; accepts the desktop icon names too
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "paddle-ball" | "paddleball" | "pong" => Some(GameKind::PaddleBall),
            "grid-snake" | "gridsnake" | "snake" => Some(GameKind::GridSnake),
            "falling-piece" | "fallingpiece" | "tetris" => Some(GameKind::FallingPiece),
            _ => None,
        }
    }
}

/// One game window's simulation and clock
#[derive(Debug)]
pub enum MountedGame {
    PaddleBall(GameRunner<PaddleBallSimulation>),
    GridSnake(GameRunner<GridSnakeSimulation>),
    FallingPiece(GameRunner<FallingPieceSimulation>),
}

macro_rules! with_runner {
    ($game:expr, $runner:ident => $body:expr) => {
        match $game {
            MountedGame::PaddleBall($runner) => $body,
            MountedGame::GridSnake($runner) => $body,
            MountedGame::FallingPiece($runner) => $body,
        }
    };
}

impl MountedGame {
    /// Build a stopped game. `settings.seed` overrides `seed` when set.
    pub fn mount(kind: GameKind, settings: &Settings, seed: u64) -> Self {
        let seed = settings.seed.unwrap_or(seed);
        let interval = settings.tick_interval_ms(kind);
        log::info!("Mounting {} (seed {}, tick {:.1}ms)", kind.as_str(), seed, interval);

        macro_rules! runner {
            ($sim:expr) => {
                GameRunner::new($sim, interval).with_limits(settings.max_substeps, settings.max_frame_ms)
            };
        }
        match kind {
            GameKind::PaddleBall => MountedGame::PaddleBall(runner!(PaddleBallSimulation::new())),
            GameKind::GridSnake => MountedGame::GridSnake(runner!(GridSnakeSimulation::new(seed))),
            GameKind::FallingPiece => {
                MountedGame::FallingPiece(runner!(FallingPieceSimulation::new(seed)))
            }
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            MountedGame::PaddleBall(_) => GameKind::PaddleBall,
            MountedGame::GridSnake(_) => GameKind::GridSnake,
            MountedGame::FallingPiece(_) => GameKind::FallingPiece,
        }
    }

    pub fn start(&mut self) -> bool {
        let started = with_runner!(self, runner => runner.start());
        if started {
            log::info!("{} started", self.kind().as_str());
        }
        started
    }

    pub fn stop(&mut self) -> bool {
        let stopped = with_runner!(self, runner => runner.stop());
        if stopped {
            log::info!("{} stopped", self.kind().as_str());
        }
        stopped
    }

    pub fn is_running(&self) -> bool {
        with_runner!(self, runner => runner.is_running())
    }

    pub fn tick_interval_ms(&self) -> f64 {
        with_runner!(self, runner => runner.tick_interval_ms())
    }

    pub fn advance(&mut self, now_ms: f64) -> u32 {
        with_runner!(self, runner => runner.advance(now_ms))
    }

    pub fn handle_key_down(&mut self, key_name: &str) -> bool {
        with_runner!(self, runner => runner.handle_key_down(key_name))
    }

    pub fn handle_key_up(&mut self, key_name: &str) -> bool {
        with_runner!(self, runner => runner.handle_key_up(key_name))
    }

    pub fn is_over(&self) -> bool {
        with_runner!(self, runner => runner.is_over())
    }

    /// Fresh simulation of the same kind. This is the only way to restart
    /// paddle-ball and grid-snake.
    pub fn remount(&mut self, seed: u64) {
        match self {
            MountedGame::PaddleBall(runner) => {
                runner.replace(PaddleBallSimulation::new());
            }
            MountedGame::GridSnake(runner) => {
                runner.replace(GridSnakeSimulation::new(seed));
            }
            MountedGame::FallingPiece(runner) => {
                runner.replace(FallingPieceSimulation::new(seed));
            }
        }
        log::info!("{} remounted (seed {})", self.kind().as_str(), seed);
    }

    /// The window's restart affordance: falling-piece resets in place,
    /// the others are remounted
    pub fn restart(&mut self, seed: u64) {
        match self {
            MountedGame::FallingPiece(runner) => runner.sim_mut().reset(),
            _ => self.remount(seed),
        }
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        with_runner!(self, runner => serde_json::to_string(&runner.snapshot()))
    }

    /// Drain pending events as a JSON array
    pub fn take_events_json(&mut self) -> Result<String, serde_json::Error> {
        with_runner!(self, runner => serde_json::to_string(&runner.take_events()))
    }
}
