//! Fleet domain models.
//!
//! Provides the data types shared by the registry, the dispatcher and the
//! unit actors.
//!
//! | Type | Role |
//! |------|------|
//! | `Unit` | One generating plant: fixed class data plus water level and active flag |
//! | `UnitClass` | Capacity class (H1, H2, H3) with its fixed band |
//! | `RainProbabilities` | Outcome probabilities of the rain process |
//! | `RainProcess` | Per-actor rain event state |

mod rain;
mod unit;

pub use rain::{RainOutcome, RainProbabilities, RainProcess};
pub use unit::{Unit, UnitClass, UnitId};
