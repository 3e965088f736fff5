//! Gameplay value primitives. The lobby core only carries these so a match
//! implementation has something to build on; nothing here touches shared
//! state.

/// A facing or movement direction on the arena grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Down,
    Up,
    Right,
}

/// Grid position. Rows grow downward, columns grow rightward.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Coordinate {
    pub row: i32,
    pub col: i32,
}

impl Coordinate {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn shift(&mut self, direction: Direction, amount: i32) {
        match direction {
            Direction::Up => self.row -= amount,
            Direction::Down => self.row += amount,
            Direction::Left => self.col -= amount,
            Direction::Right => self.col += amount,
        }
    }
}

/// Per-player combat state for a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fighter {
    pub pos: Coordinate,
    pub speed: i32,
    pub hp: u32,
    pub max_hp: u32,
}

impl Fighter {
    pub fn new(speed: i32, max_hp: u32) -> Self {
        Self {
            pos: Coordinate::default(),
            speed,
            hp: 0,
            max_hp,
        }
    }

    /// Place the fighter on the grid at match start and restore its health.
    pub fn deploy(&mut self, pos: Coordinate) {
        self.pos = pos;
        self.hp = self.max_hp;
    }

    pub fn advance(&mut self, direction: Direction) {
        self.pos.shift(direction, self.speed);
    }

    /// Combat resolution hook. Gameplay wiring attaches here.
    pub fn strike(&mut self, _direction: Direction) {}
}

impl Default for Fighter {
    fn default() -> Self {
        Self::new(1, 3)
    }
}
