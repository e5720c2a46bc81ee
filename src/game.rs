use std::collections::VecDeque;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GameError;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_BOARD_SIZE: usize = 10;
// A 2x2 torus puts the neck one step ahead of the head in both axes
pub const MIN_BOARD_SIZE: usize = 3;
pub const MAX_BOARD_SIZE: usize = 64;
pub const INITIAL_SNAKE_LENGTH: usize = 2;

// Timing (in milliseconds)
pub const TICK_MS: u64 = 500;

// Random samples tried per board cell before falling back to a scan.
const FOOD_ATTEMPTS_PER_CELL: usize = 8;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// One cell over in `direction`, wrapping each axis on a `board_size` torus.
    pub fn stepped(&self, direction: Direction, board_size: usize) -> Self {
        let n = board_size;
        match direction {
            Direction::Up => Self::new(self.x, (self.y + n - 1) % n),
            Direction::Down => Self::new(self.x, (self.y + 1) % n),
            Direction::Left => Self::new((self.x + n - 1) % n, self.y),
            Direction::Right => Self::new((self.x + 1) % n, self.y),
        }
    }

    fn is_adjacent(&self, other: Position, board_size: usize) -> bool {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .iter()
            .any(|&d| self.stepped(d, board_size) == other)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellState {
    Empty,
    Head,
    Body,
    Food,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Running,
    Over,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Moved,
    DirectionChanged(Direction),
    AteFood { score: u32 },
    BoardFilled,
    GameOver { score: u32 },
    Restarted,
}

// ============================================================================
// Food Source Trait
// ============================================================================

/// Supplies candidate food cells. The game rejects occupied candidates and
/// asks again.
pub trait FoodSource {
    fn next_position(&mut self, board_size: usize) -> Position;
}

/// Uniform samples over the whole board.
pub struct RandomFoodSource {
    rng: StdRng,
}

impl RandomFoodSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl FoodSource for RandomFoodSource {
    fn next_position(&mut self, board_size: usize) -> Position {
        Position::new(
            self.rng.gen_range(0..board_size),
            self.rng.gen_range(0..board_size),
        )
    }
}

/// Replays a fixed list of candidates, cycling when exhausted. An empty
/// list always offers `(0, 0)`.
pub struct SequenceFoodSource {
    positions: Vec<Position>,
    index: usize,
}

impl SequenceFoodSource {
    pub fn new(positions: Vec<Position>) -> Self {
        Self { positions, index: 0 }
    }
}

impl FoodSource for SequenceFoodSource {
    fn next_position(&mut self, _board_size: usize) -> Position {
        if self.positions.is_empty() {
            return Position::new(0, 0);
        }
        let position = self.positions[self.index % self.positions.len()];
        self.index += 1;
        position
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    board_size: usize,
    snake: VecDeque<Position>,
    // Indexed by y * board_size + x
    occupied: Vec<bool>,
    food: Position,
    direction: Direction,
    pending_direction: Direction,
    score: u32,
    state: GameState,
    food_source: Box<dyn FoodSource>,
    events: Vec<GameEvent>,
}

// ============================================================================
// Game Logic
// ============================================================================

fn starting_snake(board_size: usize) -> Vec<Position> {
    let center = board_size / 2;
    (0..INITIAL_SNAKE_LENGTH)
        .map(|i| Position::new(center - i, center))
        .collect()
}

impl Game {
    pub fn new(board_size: usize) -> Result<Self, GameError> {
        Self::with_source(board_size, Box::new(RandomFoodSource::from_entropy()))
    }

    pub fn with_source(
        board_size: usize,
        food_source: Box<dyn FoodSource>,
    ) -> Result<Self, GameError> {
        Self::with_layout(
            board_size,
            starting_snake(board_size),
            Direction::Right,
            food_source,
        )
    }

    /// Builds a game from an arbitrary mid-play layout. `snake` is head-first.
    pub fn with_layout(
        board_size: usize,
        snake: Vec<Position>,
        direction: Direction,
        food_source: Box<dyn FoodSource>,
    ) -> Result<Self, GameError> {
        if board_size < MIN_BOARD_SIZE {
            return Err(GameError::BoardTooSmall { size: board_size });
        }
        if board_size > MAX_BOARD_SIZE {
            return Err(GameError::BoardTooLarge { size: board_size });
        }
        if snake.len() < INITIAL_SNAKE_LENGTH {
            return Err(GameError::InvalidSnake(format!(
                "length {} is below {}",
                snake.len(),
                INITIAL_SNAKE_LENGTH
            )));
        }

        let mut occupied = vec![false; board_size * board_size];
        for (i, pos) in snake.iter().enumerate() {
            if pos.x >= board_size || pos.y >= board_size {
                return Err(GameError::InvalidSnake(format!(
                    "segment {:?} is off the board",
                    pos
                )));
            }
            let cell = &mut occupied[pos.y * board_size + pos.x];
            if *cell {
                return Err(GameError::InvalidSnake(format!(
                    "segment {:?} appears twice",
                    pos
                )));
            }
            *cell = true;
            if i > 0 && !pos.is_adjacent(snake[i - 1], board_size) {
                return Err(GameError::InvalidSnake(format!(
                    "segments {:?} and {:?} are not adjacent",
                    snake[i - 1],
                    pos
                )));
            }
        }

        if snake[0].stepped(direction, board_size) == snake[1] {
            return Err(GameError::InvalidSnake(format!(
                "heading {:?} turns the head back into {:?}",
                direction, snake[1]
            )));
        }

        let mut game = Self {
            board_size,
            snake: snake.into_iter().collect(),
            occupied,
            food: Position::new(0, 0),
            direction,
            pending_direction: direction,
            score: 0,
            state: GameState::Running,
            food_source,
            events: Vec::new(),
        };
        game.food = game
            .place_food()
            .ok_or_else(|| GameError::InvalidSnake("snake fills the board".to_string()))?;
        Ok(game)
    }

    fn index(&self, pos: Position) -> usize {
        pos.y * self.board_size + pos.x
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        pos.x < self.board_size && pos.y < self.board_size && self.occupied[self.index(pos)]
    }

    fn push_head(&mut self, pos: Position) {
        let i = self.index(pos);
        self.occupied[i] = true;
        self.snake.push_front(pos);
    }

    fn pop_tail(&mut self) {
        if let Some(tail) = self.snake.pop_back() {
            let i = self.index(tail);
            self.occupied[i] = false;
        }
    }

    /// Rejection-samples the food source for a free cell. `None` only when
    /// the snake covers the whole board.
    fn place_food(&mut self) -> Option<Position> {
        let n = self.board_size;
        let area = n * n;
        if self.snake.len() >= area {
            return None;
        }

        for _ in 0..area * FOOD_ATTEMPTS_PER_CELL {
            let candidate = self.food_source.next_position(n);
            if candidate.x < n && candidate.y < n && !self.is_occupied(candidate) {
                return Some(candidate);
            }
        }

        debug!("food source kept hitting the snake, scanning for a free cell");
        (0..area)
            .map(|i| Position::new(i % n, i / n))
            .find(|pos| !self.is_occupied(*pos))
    }

    /// Queues a turn for the next tick. Reversals are ignored.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.state != GameState::Running || self.direction.is_opposite(direction) {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    pub fn tick(&mut self) {
        if self.state != GameState::Running {
            return;
        }

        if self.pending_direction != self.direction {
            self.direction = self.pending_direction;
            self.events.push(GameEvent::DirectionChanged(self.direction));
        }

        let new_head = self.head().stepped(self.direction, self.board_size);

        // Checked against the pre-move body, tail included
        if self.is_occupied(new_head) {
            self.end_game();
            return;
        }

        self.push_head(new_head);

        if new_head == self.food {
            self.score += 1;
            self.events.push(GameEvent::AteFood { score: self.score });
            debug!("ate food at {:?}, score {}", new_head, self.score);

            match self.place_food() {
                Some(food) => self.food = food,
                None => {
                    warn!("snake covers the whole {0}x{0} board", self.board_size);
                    self.events.push(GameEvent::BoardFilled);
                    self.end_game();
                }
            }
        } else {
            self.pop_tail();
            self.events.push(GameEvent::Moved);
        }
    }

    fn end_game(&mut self) {
        self.state = GameState::Over;
        self.events.push(GameEvent::GameOver { score: self.score });
        info!("game over with score {}", self.score);
    }

    pub fn reset(&mut self) {
        self.snake = starting_snake(self.board_size).into_iter().collect();
        self.occupied = vec![false; self.board_size * self.board_size];
        for pos in self.snake.clone() {
            let i = self.index(pos);
            self.occupied[i] = true;
        }

        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.score = 0;
        self.state = GameState::Running;
        self.events.clear();

        // The board is at least 3x3, so a free cell always exists here
        if let Some(food) = self.place_food() {
            self.food = food;
        }

        self.events.push(GameEvent::Restarted);
        info!("game restarted");
    }

    pub fn tick_duration_ms(&self) -> u64 {
        TICK_MS
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Head-first snake body.
    pub fn snake(&self) -> &VecDeque<Position> {
        &self.snake
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Direction of the last executed move.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Direction the next tick will move in.
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::Over
    }

    /// Returns the board as rows of cells, `grid[y][x]`
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut grid = vec![vec![CellState::Empty; self.board_size]; self.board_size];

        grid[self.food.y][self.food.x] = CellState::Food;
        for pos in self.snake.iter().skip(1) {
            grid[pos.y][pos.x] = CellState::Body;
        }
        let head = self.head();
        grid[head.y][head.x] = CellState::Head;

        grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn positions(cells: &[(usize, usize)]) -> Vec<Position> {
        cells.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    pub fn scripted(cells: &[(usize, usize)]) -> Box<dyn FoodSource> {
        Box::new(SequenceFoodSource::new(positions(cells)))
    }

    /// Game on a `board_size` board with the given head-first snake and a
    /// scripted food source.
    pub fn game_with(
        board_size: usize,
        snake: &[(usize, usize)],
        direction: Direction,
        food: &[(usize, usize)],
    ) -> Game {
        match Game::with_layout(board_size, positions(snake), direction, scripted(food)) {
            Ok(game) => game,
            Err(e) => panic!("bad test layout: {e}"),
        }
    }
}
