//! Grid geometry for layout analysis.
//!
//! Pure functions and small value types that describe where things sit on
//! the analysis grid: positions, cardinal directions, connector reach, the
//! fixed machine footprint, and the pickup/drop-off points of a connector.
//!
//! The analysis frame has +x pointing east and +y pointing north. Layout
//! payloads use the opposite y convention; [`GridPosition::from_payload`]
//! performs that conversion.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Largest payload coordinate magnitude accepted by
/// [`GridPosition::from_payload`].
pub const PAYLOAD_LIMIT: i32 = 1 << 30;

/// A position on the 2D analysis grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert a payload tile-center coordinate into the analysis frame.
    ///
    /// Payload y grows southward, so it is negated. Both 1x1 and 3x3
    /// entities sit on `.5` centers, and flooring keeps their relative
    /// placement intact.
    ///
    /// Coordinates that are not finite or lie beyond [`PAYLOAD_LIMIT`] are
    /// rejected.
    pub fn from_payload(x: f64, y: f64) -> Result<Self, SpatialError> {
        let cell = |v: f64| {
            let floored = v.floor();
            (floored.is_finite() && floored.abs() <= PAYLOAD_LIMIT as f64).then_some(floored as i32)
        };
        Ok(Self {
            x: cell(x).ok_or(SpatialError::CoordinateOutOfRange(x))?,
            y: cell(-y).ok_or(SpatialError::CoordinateOutOfRange(y))?,
        })
    }

    /// The position `distance` cells away in `direction`. Saturates at the
    /// edge of the grid.
    pub fn step(&self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x.saturating_add(dx.saturating_mul(distance)),
            y: self.y.saturating_add(dy.saturating_mul(distance)),
        }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

/// Cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinal directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Unit displacement for this direction in the analysis frame.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Decode a payload direction code.
    ///
    /// Payloads use eight-way codes where only the even values are cardinal:
    /// 0 north, 2 east, 4 south, 6 west.
    pub fn from_code(code: u8) -> Result<Self, SpatialError> {
        match code {
            0 => Ok(Direction::North),
            2 => Ok(Direction::East),
            4 => Ok(Direction::South),
            6 => Ok(Direction::West),
            other => Err(SpatialError::InvalidDirectionCode(other)),
        }
    }

    /// The payload code for this direction.
    pub fn code(&self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 2,
            Direction::South => 4,
            Direction::West => 6,
        }
    }
}

/// How many cells a connector reaches on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Reach {
    /// Picks up from and drops into the adjacent cell.
    #[default]
    Short,
    /// Reaches two cells away.
    Long,
}

impl Reach {
    pub fn cells(&self) -> i32 {
        match self {
            Reach::Short => 1,
            Reach::Long => 2,
        }
    }

    pub fn from_cells(cells: u32) -> Result<Self, SpatialError> {
        match cells {
            1 => Ok(Reach::Short),
            2 => Ok(Reach::Long),
            other => Err(SpatialError::InvalidReach(other)),
        }
    }
}

/// Errors from decoding geometry values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpatialError {
    #[error("invalid direction code: {0}")]
    InvalidDirectionCode(u8),
    #[error("invalid reach: {0} cells (expected 1 or 2)")]
    InvalidReach(u32),
    #[error("payload coordinate out of range: {0}")]
    CoordinateOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// Machine footprint
// ---------------------------------------------------------------------------

/// Side length of every machine footprint.
pub const MACHINE_SIZE: u32 = 3;

/// The fixed 3x3 box a machine occupies, centered on its position.
///
/// The same box is the machine's input boundary and its output boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub center: GridPosition,
}

impl Footprint {
    pub fn centered_on(center: GridPosition) -> Self {
        Self { center }
    }

    fn half_extent() -> i32 {
        (MACHINE_SIZE / 2) as i32
    }

    /// Lower-left corner (inclusive).
    pub fn min(&self) -> GridPosition {
        let h = Self::half_extent();
        GridPosition::new(self.center.x.saturating_sub(h), self.center.y.saturating_sub(h))
    }

    /// Upper-right corner (inclusive).
    pub fn max(&self) -> GridPosition {
        let h = Self::half_extent();
        GridPosition::new(self.center.x.saturating_add(h), self.center.y.saturating_add(h))
    }

    /// Whether the point lies inside the footprint.
    pub fn contains(&self, pos: GridPosition) -> bool {
        let (min, max) = (self.min(), self.max());
        pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
    }

    /// Iterate over all tiles of the footprint, row by row from the bottom.
    pub fn tiles(&self) -> impl Iterator<Item = GridPosition> {
        let min = self.min();
        let size = MACHINE_SIZE as i32;
        (0..size).flat_map(move |dy| (0..size).map(move |dx| GridPosition::new(min.x + dx, min.y + dy)))
    }
}

// ---------------------------------------------------------------------------
// Connector endpoints
// ---------------------------------------------------------------------------

/// Placement of a connector: where it stands, which way it delivers, and
/// how far it reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorPlacement {
    pub position: GridPosition,
    pub facing: Direction,
    pub reach: Reach,
}

impl ConnectorPlacement {
    pub fn new(position: GridPosition, facing: Direction, reach: Reach) -> Self {
        Self {
            position,
            facing,
            reach,
        }
    }

    /// The cell the connector drops items into.
    pub fn output_position(&self) -> GridPosition {
        self.position.step(self.facing, self.reach.cells())
    }

    /// The cell the connector picks items up from.
    pub fn input_position(&self) -> GridPosition {
        self.position.step(self.facing.opposite(), self.reach.cells())
    }
}
