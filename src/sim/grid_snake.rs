//! Grid-snake simulation
//!
//! The snake moves one cell per tick in its current direction. Eating food
//! grows it by one; leaving the grid or running into its own body ends the game.

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::Simulation;
use super::collision::cell_in_bounds;
use super::input::{Direction, Key};

/// Cells per side of the square grid
pub const GRID_SIZE: i32 = 20;
pub const START_HEAD: IVec2 = IVec2::new(10, 10);
pub const START_FOOD: IVec2 = IVec2::new(15, 15);
pub const START_DIRECTION: Direction = Direction::Right;

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GridSnakeEvent {
    /// Head reached the food; `next_food` is where the new food was placed
    FoodEaten { at: IVec2, next_food: IVec2 },
    /// Head left the grid or hit the body
    Died,
}

/// Renderable state
#[derive(Debug, Clone, Serialize)]
pub struct GridSnakeSnapshot {
    pub grid_size: i32,
    /// Head first
    pub snake: Vec<IVec2>,
    pub food: IVec2,
    pub direction: Direction,
    pub game_over: bool,
}

/// Snake on a fixed grid
#[derive(Debug, Clone)]
pub struct GridSnakeSimulation {
    /// Head at the front
    snake: VecDeque<IVec2>,
    direction: Direction,
    food: IVec2,
    game_over: bool,
    rng: Pcg32,
    events: Vec<GridSnakeEvent>,
}

impl GridSnakeSimulation {
    /// One-cell snake at the grid center heading right, food at (15, 15)
    pub fn new(seed: u64) -> Self {
        Self::with_layout(&[START_HEAD], START_DIRECTION, START_FOOD, seed)
    }

    /// Start from an explicit body (head first), heading and food cell
    pub fn with_layout(body: &[IVec2], direction: Direction, food: IVec2, seed: u64) -> Self {
        Self {
            snake: body.iter().copied().collect(),
            direction,
            food,
            game_over: false,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn head(&self) -> Option<IVec2> {
        self.snake.front().copied()
    }

    pub fn body(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.snake.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> IVec2 {
        self.food
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Heading for the next tick. Reversing onto the neck is not prevented.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Any cell on the grid, the snake's body included
    fn random_cell(&mut self) -> IVec2 {
        IVec2::new(
            self.rng.random_range(0..GRID_SIZE),
            self.rng.random_range(0..GRID_SIZE),
        )
    }

    fn die(&mut self, new_head: IVec2) {
        self.game_over = true;
        self.events.push(GridSnakeEvent::Died);
        log::info!(
            "Grid-snake game over at {:?}, length {}",
            new_head,
            self.snake.len()
        );
    }
}

impl Simulation for GridSnakeSimulation {
    type Snapshot = GridSnakeSnapshot;
    type Event = GridSnakeEvent;

    /// The new head is tested against the body as it was before this move,
    /// tail included, even though the tail would vacate its cell this tick.
    fn tick(&mut self) {
        if self.game_over {
            return;
        }
        let Some(head) = self.head() else {
            return;
        };
        let new_head = head + self.direction.to_ivec2();

        if !cell_in_bounds(new_head, GRID_SIZE, GRID_SIZE) || self.snake.contains(&new_head) {
            self.die(new_head);
            return;
        }

        self.snake.push_front(new_head);

        if new_head == self.food {
            let next_food = self.random_cell();
            self.food = next_food;
            self.events.push(GridSnakeEvent::FoodEaten {
                at: new_head,
                next_food,
            });
            log::debug!("Grid-snake ate at {:?}, length {}", new_head, self.snake.len());
        } else {
            self.snake.pop_back();
        }
    }

    fn handle_key_down(&mut self, key: Key) {
        self.set_direction(key.direction());
    }

    fn handle_key_up(&mut self, _key: Key) {}

    fn snapshot(&self) -> GridSnakeSnapshot {
        GridSnakeSnapshot {
            grid_size: GRID_SIZE,
            snake: self.body().collect(),
            food: self.food,
            direction: self.direction,
            game_over: self.game_over,
        }
    }

    fn is_over(&self) -> bool {
        self.game_over
    }

    fn take_events(&mut self) -> Vec<GridSnakeEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_starting_layout() {
        let sim = GridSnakeSimulation::new(1);
        assert_eq!(sim.body().collect::<Vec<_>>(), vec![IVec2::new(10, 10)]);
        assert_eq!(sim.direction(), Direction::Right);
        assert_eq!(sim.food(), IVec2::new(15, 15));
        assert!(!sim.game_over());
    }

    #[test]
    fn test_moves_right_five_ticks() {
        let mut sim = GridSnakeSimulation::new(1);
        for _ in 0..5 {
            sim.tick();
        }
        assert_eq!(sim.head(), Some(IVec2::new(15, 10)));
        assert_eq!(sim.len(), 1);
        assert!(sim.take_events().is_empty());
    }

    #[test]
    fn test_eating_grows_and_moves_food() {
        let mut sim = GridSnakeSimulation::with_layout(
            &[IVec2::new(10, 10)],
            Direction::Right,
            IVec2::new(12, 10),
            7,
        );
        sim.tick();
        assert_eq!(sim.len(), 1);
        sim.tick();
        assert_eq!(sim.len(), 2);
        assert_eq!(
            sim.body().collect::<Vec<_>>(),
            vec![IVec2::new(12, 10), IVec2::new(11, 10)]
        );

        let events = sim.take_events();
        assert_eq!(events.len(), 1);
        let GridSnakeEvent::FoodEaten { at, next_food } = events[0] else {
            panic!("expected FoodEaten, got {:?}", events[0]);
        };
        assert_eq!(at, IVec2::new(12, 10));
        assert_eq!(sim.food(), next_food);
        assert!(cell_in_bounds(next_food, GRID_SIZE, GRID_SIZE));
    }

    #[test]
    fn test_food_may_land_on_body() {
        // Head at (1, 0) with every other cell but (0, 0) in the body
        let mut body = vec![IVec2::new(1, 0)];
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let cell = IVec2::new(x, y);
                if cell != IVec2::new(0, 0) && cell != IVec2::new(1, 0) {
                    body.push(cell);
                }
            }
        }
        let mut sim = GridSnakeSimulation::with_layout(&body, Direction::Left, IVec2::new(0, 0), 5);
        sim.tick();
        assert!(!sim.game_over());
        assert_eq!(sim.len(), (GRID_SIZE * GRID_SIZE) as usize);

        // The grid is full, so wherever the food went it is under the snake
        let events = sim.take_events();
        let GridSnakeEvent::FoodEaten { next_food, .. } = events[0] else {
            panic!("expected FoodEaten, got {:?}", events[0]);
        };
        assert!(sim.body().any(|cell| cell == next_food));
    }

    #[test]
    fn test_turning_takes_effect_next_tick() {
        let mut sim = GridSnakeSimulation::new(1);
        sim.handle_key_down(Key::ArrowDown);
        assert_eq!(sim.head(), Some(IVec2::new(10, 10)));
        sim.tick();
        assert_eq!(sim.head(), Some(IVec2::new(10, 11)));
        sim.handle_key_down(Key::ArrowLeft);
        sim.tick();
        assert_eq!(sim.head(), Some(IVec2::new(9, 11)));
        sim.handle_key_down(Key::ArrowUp);
        sim.handle_key_up(Key::ArrowUp);
        sim.tick();
        assert_eq!(sim.head(), Some(IVec2::new(9, 10)));
    }

    #[test]
    fn test_right_wall_ends_game_and_freezes() {
        let mut sim = GridSnakeSimulation::with_layout(
            &[IVec2::new(19, 4)],
            Direction::Right,
            IVec2::new(0, 0),
            1,
        );
        sim.tick();
        assert!(sim.game_over());
        assert_eq!(sim.take_events(), vec![GridSnakeEvent::Died]);
        assert_eq!(sim.head(), Some(IVec2::new(19, 4)));

        sim.handle_key_down(Key::ArrowDown);
        sim.tick();
        assert_eq!(sim.head(), Some(IVec2::new(19, 4)));
        assert!(sim.take_events().is_empty());
    }

    #[test]
    fn test_left_wall_ends_game() {
        let mut sim = GridSnakeSimulation::with_layout(
            &[IVec2::new(0, 4)],
            Direction::Left,
            IVec2::new(5, 5),
            1,
        );
        sim.tick();
        assert!(sim.is_over());
    }

    #[test]
    fn test_reversing_single_cell_is_allowed() {
        let mut sim = GridSnakeSimulation::new(1);
        sim.handle_key_down(Key::ArrowLeft);
        sim.tick();
        assert!(!sim.game_over());
        assert_eq!(sim.head(), Some(IVec2::new(9, 10)));
    }

    #[test]
    fn test_reversing_into_neck_dies() {
        let mut sim = GridSnakeSimulation::with_layout(
            &[IVec2::new(5, 5), IVec2::new(4, 5)],
            Direction::Right,
            IVec2::new(0, 0),
            1,
        );
        sim.handle_key_down(Key::ArrowLeft);
        sim.tick();
        assert!(sim.game_over());
    }

    /// Known boundary case: the tail cell still counts as body on the tick
    /// it would be vacated.
    #[test]
    fn test_chasing_own_tail_dies() {
        // 2x2 loop: head (5,5), then (5,6), (6,6), tail (6,5)
        let mut sim = GridSnakeSimulation::with_layout(
            &[
                IVec2::new(5, 5),
                IVec2::new(5, 6),
                IVec2::new(6, 6),
                IVec2::new(6, 5),
            ],
            Direction::Right,
            IVec2::new(0, 0),
            1,
        );
        sim.tick();
        assert!(sim.game_over());
        assert_eq!(sim.len(), 4);
    }

    #[test]
    fn test_same_seed_same_food() {
        let layout = [IVec2::new(10, 10)];
        let mut a = GridSnakeSimulation::with_layout(&layout, Direction::Right, IVec2::new(11, 10), 99);
        let mut b = GridSnakeSimulation::with_layout(&layout, Direction::Right, IVec2::new(11, 10), 99);
        a.tick();
        b.tick();
        assert_eq!(a.food(), b.food());
    }

    #[test]
    fn test_snapshot_serializes() {
        let sim = GridSnakeSimulation::new(1);
        let json = serde_json::to_value(sim.snapshot()).unwrap();
        assert_eq!(json["snake"], serde_json::json!([[10, 10]]));
        assert_eq!(json["food"], serde_json::json!([15, 15]));
        assert_eq!(json["direction"], "Right");
        assert_eq!(json["grid_size"], 20);
    }

    fn key() -> impl Strategy<Value = Option<Key>> {
        prop_oneof![
            3 => Just(None),
            1 => Just(Some(Key::ArrowUp)),
            1 => Just(Some(Key::ArrowDown)),
            1 => Just(Some(Key::ArrowLeft)),
            1 => Just(Some(Key::ArrowRight)),
        ]
    }

    proptest! {
        #[test]
        fn snake_stays_distinct_and_in_bounds(
            seed in any::<u64>(),
            food_x in 0..GRID_SIZE,
            food_y in 0..GRID_SIZE,
            keys in prop::collection::vec(key(), 1..300),
        ) {
            let mut sim = GridSnakeSimulation::with_layout(
                &[START_HEAD],
                START_DIRECTION,
                IVec2::new(food_x, food_y),
                seed,
            );
            for key in keys {
                match key {
                    Some(key) => sim.handle_key_down(key),
                    None => {
                        let was_over = sim.game_over();
                        let before: Vec<IVec2> = sim.body().collect();
                        sim.tick();
                        if was_over {
                            prop_assert!(sim.game_over());
                            prop_assert_eq!(sim.body().collect::<Vec<_>>(), before);
                        } else if !sim.game_over() {
                            prop_assert!(sim.len() >= before.len());
                        }
                    }
                }
                let cells: HashSet<IVec2> = sim.body().collect();
                prop_assert_eq!(cells.len(), sim.len());
                for cell in cells {
                    prop_assert!(cell_in_bounds(cell, GRID_SIZE, GRID_SIZE));
                }
            }
        }
    }
}
