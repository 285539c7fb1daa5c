//! Generating unit model.
//!
//! A unit is one hydroelectric plant. Its class fixes the generation
//! capacity and the permissible water-level band; only the current water
//! level and the active flag change after creation.
//!
//! | Class | Capacity | Min level | Max level |
//! |-------|----------|-----------|-----------|
//! | H1    | 15.0     | 50.0      | 200.0     |
//! | H2    | 5.0      | 25.0      | 100.0     |
//! | H3    | 2.0      | 10.0      | 50.0      |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capacity class of a generating unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    /// Large plant.
    H1,
    /// Medium plant.
    H2,
    /// Small plant.
    H3,
}

impl UnitClass {
    /// All classes, largest first.
    pub const ALL: [UnitClass; 3] = [UnitClass::H1, UnitClass::H2, UnitClass::H3];

    /// Generation capacity credited while active.
    pub fn capacity(self) -> f64 {
        match self {
            UnitClass::H1 => 15.0,
            UnitClass::H2 => 5.0,
            UnitClass::H3 => 2.0,
        }
    }

    /// Lowest permissible water level.
    pub fn min_water_level(self) -> f64 {
        match self {
            UnitClass::H1 => 50.0,
            UnitClass::H2 => 25.0,
            UnitClass::H3 => 10.0,
        }
    }

    /// Highest permissible water level.
    pub fn max_water_level(self) -> f64 {
        match self {
            UnitClass::H1 => 200.0,
            UnitClass::H2 => 100.0,
            UnitClass::H3 => 50.0,
        }
    }

    /// Midpoint of the permissible band; the starting level of every unit.
    pub fn midpoint(self) -> f64 {
        (self.min_water_level() + self.max_water_level()) / 2.0
    }

    /// Short class tag.
    pub fn name(self) -> &'static str {
        match self {
            UnitClass::H1 => "H1",
            UnitClass::H2 => "H2",
            UnitClass::H3 => "H3",
        }
    }
}

impl fmt::Display for UnitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable identifier of a unit: its slot in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

impl UnitId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

/// A hydroelectric generating unit.
///
/// Capacity and the water-level band are copied from the class at
/// construction and never change. The active flag is only flipped by
/// [`GenerationLedger`](crate::generation::GenerationLedger) so that the
/// aggregate total always matches the set of active units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    class: UnitClass,
    capacity: f64,
    min_water_level: f64,
    max_water_level: f64,
    water_level: f64,
    pub(crate) active: bool,
}

impl Unit {
    /// Creates an inactive unit at the midpoint of its class band.
    ///
    /// The id is assigned when the unit is inserted into a registry.
    pub fn new(class: UnitClass) -> Self {
        Self {
            id: UnitId(0),
            class,
            capacity: class.capacity(),
            min_water_level: class.min_water_level(),
            max_water_level: class.max_water_level(),
            water_level: class.midpoint(),
            active: false,
        }
    }

    /// Sets the starting water level.
    pub fn with_water_level(mut self, level: f64) -> Self {
        self.water_level = level;
        self
    }

    pub(crate) fn assign_id(&mut self, id: UnitId) {
        self.id = id;
    }

    /// Registry identifier.
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Capacity class.
    pub fn class(&self) -> UnitClass {
        self.class
    }

    /// Generation capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Lowest permissible water level.
    pub fn min_water_level(&self) -> f64 {
        self.min_water_level
    }

    /// Highest permissible water level.
    pub fn max_water_level(&self) -> f64 {
        self.max_water_level
    }

    /// Current water level.
    pub fn water_level(&self) -> f64 {
        self.water_level
    }

    /// Overwrites the current water level.
    pub fn set_water_level(&mut self, level: f64) {
        self.water_level = level;
    }

    /// Adds inflow (rain) to the reservoir.
    pub fn add_water(&mut self, amount: f64) {
        self.water_level += amount;
    }

    /// Removes water from the reservoir (generation or spillage).
    pub fn drain(&mut self, amount: f64) {
        self.water_level -= amount;
    }

    /// Whether the unit is currently generating.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Normalized fill fraction: 0.0 at the minimum, 1.0 at the maximum.
    ///
    /// Lets units with different operating bands compare fairly.
    pub fn relative_level(&self) -> f64 {
        (self.water_level - self.min_water_level) / (self.max_water_level - self.min_water_level)
    }

    /// Water strictly above the minimum (eligible for activation).
    pub fn is_above_min(&self) -> bool {
        self.water_level > self.min_water_level
    }

    /// Water inside the closed band `[min, max]`.
    pub fn is_within_range(&self) -> bool {
        self.water_level >= self.min_water_level && self.water_level <= self.max_water_level
    }

    /// Water inside the open band `(min, max)`.
    pub fn is_strictly_within_range(&self) -> bool {
        self.water_level > self.min_water_level && self.water_level < self.max_water_level
    }

    /// Water above the maximum.
    pub fn is_overfull(&self) -> bool {
        self.water_level > self.max_water_level
    }
}
