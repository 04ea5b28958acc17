//! Paddle-ball simulation
//!
//! The player guards the left edge, the AI guards the right. Coordinates are
//! screen pixels with y growing downward; the ball is a square whose `pos` is
//! its top-left corner.

use glam::Vec2;
use serde::Serialize;

use super::Simulation;
use super::collision::{Side, ball_paddle_contact, reflect_velocity};
use super::input::{HeldKeys, Key};

/// Play-field dimensions
pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 600.0;
pub const BORDER_WIDTH: f32 = 5.0;

/// Paddle defaults
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const PADDLE_START_TOP: f32 = 250.0;
pub const PADDLE_MIN_TOP: f32 = BORDER_WIDTH;
pub const PADDLE_MAX_TOP: f32 = CANVAS_HEIGHT - PADDLE_HEIGHT - BORDER_WIDTH;
/// Player paddle travel per tick while an arrow key is held
pub const PLAYER_SPEED: f32 = 10.0;
/// AI paddle travel cap per tick
pub const AI_MAX_SPEED: f32 = 7.0;

/// Ball defaults
pub const BALL_SIZE: f32 = 10.0;
pub const BALL_START_POS: Vec2 = Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
pub const BALL_START_VEL: Vec2 = Vec2::new(4.0, 4.0);

/// Ball x where the player paddle's face sits
const LEFT_FACE: f32 = PADDLE_WIDTH + BORDER_WIDTH;
/// Ball x where the AI paddle's face sits
const RIGHT_FACE: f32 = CANVAS_WIDTH - PADDLE_WIDTH - BORDER_WIDTH;
/// Lowest top edge the ball can have before touching the bottom border
const BALL_MAX_TOP: f32 = CANVAS_HEIGHT - BORDER_WIDTH - BALL_SIZE;

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: BALL_START_POS,
            vel: BALL_START_VEL,
            size: BALL_SIZE,
        }
    }
}

impl Ball {
    /// Back to center, serving toward the side that just conceded
    pub fn reset(&mut self) {
        self.pos = BALL_START_POS;
        self.vel.x = -self.vel.x;
    }

    /// Linear guess of the ball's y when it reaches the AI's x-plane.
    ///
    /// Wall bounces are not modeled, so the guess may land outside the field.
    pub fn predict_y_at_right(&self) -> f32 {
        if self.vel.x == 0.0 {
            return self.pos.y;
        }
        let time_to_reach = (CANVAS_WIDTH - self.pos.x - PADDLE_WIDTH - BORDER_WIDTH) / self.vel.x.abs();
        self.pos.y + self.vel.y * time_to_reach
    }
}

/// A vertical paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Paddle {
    /// Top edge y
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            top: PADDLE_START_TOP,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    /// Shift by `delta`, clamped to the play field
    pub fn nudge(&mut self, delta: f32) {
        self.top = (self.top + delta).clamp(PADDLE_MIN_TOP, PADDLE_MAX_TOP);
    }

    /// Move toward `target_top` by at most `max_speed`
    pub fn move_toward(&mut self, target_top: f32, max_speed: f32) {
        if target_top.is_nan() {
            return;
        }
        let step = (target_top - self.top).abs().min(max_speed);
        if target_top > self.top {
            self.nudge(step);
        } else {
            self.nudge(-step);
        }
    }
}

/// Rally tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub player: u32,
    pub ai: u32,
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaddleBallEvent {
    /// Ball bounced off the top or bottom border
    WallBounce,
    /// Ball bounced off the paddle on this side
    PaddleHit(Side),
    /// This side won the rally (`Left` is the player)
    Scored(Side),
}

/// Renderable state
#[derive(Debug, Clone, Serialize)]
pub struct PaddleBallSnapshot {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub border_width: f32,
    pub ball: Ball,
    pub player_paddle: Paddle,
    pub ai_paddle: Paddle,
    pub scores: Scores,
}

/// Ball-and-paddles game against a predicting AI
#[derive(Debug, Clone, Default)]
pub struct PaddleBallSimulation {
    pub ball: Ball,
    pub player_paddle: Paddle,
    pub ai_paddle: Paddle,
    pub scores: Scores,
    held: HeldKeys,
    events: Vec<PaddleBallEvent>,
}

impl PaddleBallSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held-key state used by the next tick
    pub fn set_player_input(&mut self, held: HeldKeys) {
        self.held = held;
    }

    pub fn held_keys(&self) -> HeldKeys {
        self.held
    }

    fn move_player(&mut self) {
        if self.held.is_held(Key::ArrowUp) {
            self.player_paddle.nudge(-PLAYER_SPEED);
        }
        if self.held.is_held(Key::ArrowDown) {
            self.player_paddle.nudge(PLAYER_SPEED);
        }
    }

    fn move_ai(&mut self) {
        let target = self.ball.predict_y_at_right() - PADDLE_HEIGHT / 2.0;
        self.ai_paddle.move_toward(target, AI_MAX_SPEED);
    }

    fn move_ball(&mut self) {
        let mut next = self.ball.pos + self.ball.vel;

        if next.y <= BORDER_WIDTH || next.y >= BALL_MAX_TOP {
            let normal = if next.y <= BORDER_WIDTH { Vec2::Y } else { Vec2::NEG_Y };
            self.ball.vel = reflect_velocity(self.ball.vel, normal);
            next.y = next.y.clamp(BORDER_WIDTH, BALL_MAX_TOP);
            self.events.push(PaddleBallEvent::WallBounce);
        }

        if ball_paddle_contact(
            next,
            self.ball.size,
            Side::Left,
            LEFT_FACE,
            self.player_paddle.top,
            self.player_paddle.height,
        ) {
            self.ball.vel = reflect_velocity(self.ball.vel, Vec2::X);
            next.x = LEFT_FACE;
            self.events.push(PaddleBallEvent::PaddleHit(Side::Left));
        }

        if ball_paddle_contact(
            next,
            self.ball.size,
            Side::Right,
            RIGHT_FACE,
            self.ai_paddle.top,
            self.ai_paddle.height,
        ) {
            self.ball.vel = reflect_velocity(self.ball.vel, Vec2::NEG_X);
            next.x = RIGHT_FACE - self.ball.size;
            self.events.push(PaddleBallEvent::PaddleHit(Side::Right));
        }

        if next.x <= BORDER_WIDTH {
            self.scores.ai += 1;
            self.end_rally(Side::Right);
            return;
        }

        if next.x + self.ball.size >= CANVAS_WIDTH - BORDER_WIDTH {
            self.scores.player += 1;
            self.end_rally(Side::Left);
            return;
        }

        self.ball.pos = next;
    }

    fn end_rally(&mut self, winner: Side) {
        log::debug!(
            "Rally won by {:?} (player {} - ai {})",
            winner,
            self.scores.player,
            self.scores.ai
        );
        self.ball.reset();
        self.events.push(PaddleBallEvent::Scored(winner));
    }
}

impl Simulation for PaddleBallSimulation {
    type Snapshot = PaddleBallSnapshot;
    type Event = PaddleBallEvent;

    /// Paddles first (player from held keys, AI from the ball's current
    /// heading), then the ball against the updated paddles. Both paddles
    /// have already moved when the ball's contacts are tested.
    fn tick(&mut self) {
        self.move_player();
        self.move_ai();
        self.move_ball();
    }

    fn handle_key_down(&mut self, key: Key) {
        self.held.press(key);
    }

    fn handle_key_up(&mut self, key: Key) {
        self.held.release(key);
    }

    fn release_all_keys(&mut self) {
        self.held.clear();
    }

    fn snapshot(&self) -> PaddleBallSnapshot {
        PaddleBallSnapshot {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            border_width: BORDER_WIDTH,
            ball: self.ball,
            player_paddle: self.player_paddle,
            ai_paddle: self.ai_paddle,
            scores: self.scores,
        }
    }

    /// Rallies never end the game
    fn is_over(&self) -> bool {
        false
    }

    fn take_events(&mut self) -> Vec<PaddleBallEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ball_in_field(ball: &Ball) -> bool {
        ball.pos.x >= BORDER_WIDTH
            && ball.pos.x <= CANVAS_WIDTH - BORDER_WIDTH
            && ball.pos.y >= BORDER_WIDTH
            && ball.pos.y <= CANVAS_HEIGHT - BORDER_WIDTH
    }

    #[test]
    fn test_starting_state() {
        let sim = PaddleBallSimulation::new();
        assert_eq!(sim.ball.pos, Vec2::new(400.0, 300.0));
        assert_eq!(sim.ball.vel, Vec2::new(4.0, 4.0));
        assert_eq!(sim.player_paddle.top, 250.0);
        assert_eq!(sim.ai_paddle.top, 250.0);
        assert_eq!(sim.scores, Scores::default());
    }

    #[test]
    fn test_free_flight_tick() {
        let mut sim = PaddleBallSimulation::new();
        sim.tick();
        assert_eq!(sim.ball.pos, Vec2::new(404.0, 304.0));
        assert_eq!(sim.ball.vel, Vec2::new(4.0, 4.0));
        assert!(sim.take_events().is_empty());
    }

    #[test]
    fn test_ai_tracks_prediction() {
        let mut sim = PaddleBallSimulation::new();
        // time = (800 - 400 - 15) / 4 = 96.25, predicted = 300 + 4 * 96.25 = 685
        assert_eq!(sim.ball.predict_y_at_right(), 685.0);
        sim.tick();
        // Target 635 is below, so the AI moves down at full speed
        assert_eq!(sim.ai_paddle.top, 257.0);
    }

    #[test]
    fn test_prediction_ignores_bounces() {
        let ball = Ball {
            pos: Vec2::new(100.0, 500.0),
            vel: Vec2::new(4.0, 4.0),
            size: BALL_SIZE,
        };
        // The real ball would bounce off the floor long before reaching the AI
        assert!(ball.predict_y_at_right() > CANVAS_HEIGHT);
    }

    #[test]
    fn test_ai_settles_on_target() {
        let mut paddle = Paddle::default();
        paddle.move_toward(253.0, AI_MAX_SPEED);
        assert_eq!(paddle.top, 253.0);
        paddle.move_toward(-1000.0, AI_MAX_SPEED);
        assert_eq!(paddle.top, 246.0);
        paddle.top = PADDLE_MIN_TOP + 2.0;
        paddle.move_toward(-1000.0, AI_MAX_SPEED);
        assert_eq!(paddle.top, PADDLE_MIN_TOP);
    }

    #[test]
    fn test_top_wall_bounce() {
        let mut sim = PaddleBallSimulation::new();
        sim.ball.pos = Vec2::new(400.0, 7.0);
        sim.ball.vel = Vec2::new(4.0, -4.0);
        sim.tick();
        assert_eq!(sim.ball.pos, Vec2::new(404.0, BORDER_WIDTH));
        assert_eq!(sim.ball.vel, Vec2::new(4.0, 4.0));
        assert_eq!(sim.take_events(), vec![PaddleBallEvent::WallBounce]);
    }

    #[test]
    fn test_bottom_wall_bounce() {
        let mut sim = PaddleBallSimulation::new();
        sim.ball.pos = Vec2::new(400.0, 583.0);
        sim.tick();
        assert_eq!(sim.ball.pos, Vec2::new(404.0, 585.0));
        assert_eq!(sim.ball.vel, Vec2::new(4.0, -4.0));
    }

    #[test]
    fn test_player_paddle_hit() {
        let mut sim = PaddleBallSimulation::new();
        sim.ball.pos = Vec2::new(18.0, 290.0);
        sim.ball.vel = Vec2::new(-4.0, 4.0);
        sim.tick();
        assert_eq!(sim.ball.pos, Vec2::new(15.0, 294.0));
        assert_eq!(sim.ball.vel, Vec2::new(4.0, 4.0));
        assert_eq!(sim.take_events(), vec![PaddleBallEvent::PaddleHit(Side::Left)]);
        assert_eq!(sim.scores, Scores::default());
    }

    #[test]
    fn test_ai_paddle_hit() {
        let mut sim = PaddleBallSimulation::new();
        sim.ball.pos = Vec2::new(772.0, 290.0);
        sim.tick();
        // AI moved to 253 first; ball's right edge reached x=785 inside its span
        assert_eq!(sim.ai_paddle.top, 253.0);
        assert_eq!(sim.ball.pos, Vec2::new(775.0, 294.0));
        assert_eq!(sim.ball.vel, Vec2::new(-4.0, 4.0));
        assert_eq!(sim.take_events(), vec![PaddleBallEvent::PaddleHit(Side::Right)]);
    }

    #[test]
    fn test_ai_scores_when_player_misses() {
        let mut sim = PaddleBallSimulation::new();
        sim.ball.pos = Vec2::new(8.0, 100.0);
        sim.ball.vel = Vec2::new(-4.0, 4.0);
        sim.tick();
        assert_eq!(sim.scores, Scores { player: 0, ai: 1 });
        assert_eq!(sim.ball.pos, Vec2::new(400.0, 300.0));
        // Horizontal direction flipped from the pre-reset value
        assert_eq!(sim.ball.vel, Vec2::new(4.0, 4.0));
        assert_eq!(sim.take_events(), vec![PaddleBallEvent::Scored(Side::Right)]);
    }

    #[test]
    fn test_player_scores_when_ai_misses() {
        let mut sim = PaddleBallSimulation::new();
        sim.ball.pos = Vec2::new(784.0, 100.0);
        sim.tick();
        assert_eq!(sim.scores, Scores { player: 1, ai: 0 });
        assert_eq!(sim.ball.pos, BALL_START_POS);
        assert_eq!(sim.ball.vel.x, -4.0);
        assert!(!sim.is_over());
    }

    #[test]
    fn test_player_movement_and_clamp() {
        let mut sim = PaddleBallSimulation::new();
        sim.handle_key_down(Key::ArrowUp);
        sim.tick();
        assert_eq!(sim.player_paddle.top, 240.0);

        for _ in 0..100 {
            sim.tick();
        }
        assert_eq!(sim.player_paddle.top, PADDLE_MIN_TOP);

        sim.handle_key_up(Key::ArrowUp);
        sim.handle_key_down(Key::ArrowDown);
        for _ in 0..100 {
            sim.tick();
        }
        assert_eq!(sim.player_paddle.top, PADDLE_MAX_TOP);

        sim.handle_key_up(Key::ArrowDown);
        let top = sim.player_paddle.top;
        sim.tick();
        assert_eq!(sim.player_paddle.top, top);
    }

    #[test]
    fn test_release_all_keys() {
        let mut sim = PaddleBallSimulation::new();
        sim.handle_key_down(Key::ArrowUp);
        sim.handle_key_down(Key::ArrowDown);
        sim.release_all_keys();
        assert_eq!(sim.held_keys(), HeldKeys::default());
        sim.tick();
        assert_eq!(sim.player_paddle.top, PADDLE_START_TOP);
    }

    #[test]
    fn test_set_player_input() {
        let mut sim = PaddleBallSimulation::new();
        let mut held = HeldKeys::default();
        held.press(Key::ArrowDown);
        sim.set_player_input(held);
        sim.tick();
        assert_eq!(sim.player_paddle.top, 260.0);
        assert!(sim.held_keys().is_held(Key::ArrowDown));
    }

    #[test]
    fn test_snapshot_serializes() {
        let sim = PaddleBallSimulation::new();
        let json = serde_json::to_value(sim.snapshot()).unwrap();
        assert_eq!(json["ball"]["pos"], serde_json::json!([400.0, 300.0]));
        assert_eq!(json["scores"]["player"], 0);
        assert_eq!(json["canvas_width"], 800.0);
    }

    #[derive(Debug, Clone, Copy)]
    enum Action {
        Down(Key),
        Up(Key),
        Ticks(u8),
    }

    fn action() -> impl Strategy<Value = Action> {
        let key = prop_oneof![Just(Key::ArrowUp), Just(Key::ArrowDown)];
        prop_oneof![
            key.clone().prop_map(Action::Down),
            key.prop_map(Action::Up),
            (1u8..60).prop_map(Action::Ticks),
        ]
    }

    proptest! {
        #[test]
        fn paddles_and_ball_stay_in_field(actions in prop::collection::vec(action(), 1..80)) {
            let mut sim = PaddleBallSimulation::new();
            for action in actions {
                match action {
                    Action::Down(key) => sim.handle_key_down(key),
                    Action::Up(key) => sim.handle_key_up(key),
                    Action::Ticks(n) => {
                        for _ in 0..n {
                            let before = sim.scores;
                            sim.tick();
                            for paddle in [sim.player_paddle, sim.ai_paddle] {
                                prop_assert!(paddle.top >= PADDLE_MIN_TOP);
                                prop_assert!(paddle.top <= PADDLE_MAX_TOP);
                            }
                            prop_assert!(ball_in_field(&sim.ball));
                            let gained = (sim.scores.player - before.player) + (sim.scores.ai - before.ai);
                            prop_assert!(gained <= 1);
                        }
                    }
                }
            }
        }
    }
}
