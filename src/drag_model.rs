//! Standard drag models and the built-in tables they select.

use crate::drag::{DragTable, G1_DRAG_TABLE, G7_DRAG_TABLE};
use crate::BallisticsError;

/// Standard drag model selecting one of the built-in drag tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragModel {
    G1,
    G7,
}

impl DragModel {
    /// The shared, process-lifetime table for this model.
    pub fn table(&self) -> &'static DragTable {
        match self {
            DragModel::G1 => &G1_DRAG_TABLE,
            DragModel::G7 => &G7_DRAG_TABLE,
        }
    }
}

impl std::str::FromStr for DragModel {
    type Err = BallisticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "G1" => Ok(DragModel::G1),
            "G7" => Ok(DragModel::G7),
            _ => Err(BallisticsError::Message(format!(
                "unknown drag model '{s}', expected G1 or G7"
            ))),
        }
    }
}

impl std::fmt::Display for DragModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
