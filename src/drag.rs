//! Drag coefficient lookup against Mach-indexed drag tables
use std::io::Read;
use std::path::Path;
use once_cell::sync::Lazy;
use crate::atmosphere::speed_of_sound;
use crate::drag_tables::{G1_TABLE_DATA, G7_TABLE_DATA};
use crate::BallisticsError;

/// Drag table data structure
///
/// Ordered mapping from Mach number to dimensionless drag coefficient.
/// Mach keys are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTable {
    pub mach_values: Vec<f64>,
    pub cd_values: Vec<f64>,
}

impl DragTable {
    /// Create a drag table from parallel mach and cd arrays
    pub fn new(mach_values: Vec<f64>, cd_values: Vec<f64>) -> Result<Self, BallisticsError> {
        if mach_values.is_empty() {
            return Err(BallisticsError::InvalidDragTable("table has no entries".to_string()));
        }
        if mach_values.len() != cd_values.len() {
            return Err(BallisticsError::InvalidDragTable(format!(
                "{} mach values but {} drag coefficients",
                mach_values.len(),
                cd_values.len()
            )));
        }
        if let Some(bad) = mach_values.iter().chain(cd_values.iter()).find(|v| !v.is_finite()) {
            return Err(BallisticsError::InvalidDragTable(format!("non-finite value {bad}")));
        }
        if let Some(i) = mach_values.windows(2).position(|w| w[1] <= w[0]) {
            return Err(BallisticsError::InvalidDragTable(format!(
                "mach values must be strictly increasing: {} followed by {}",
                mach_values[i],
                mach_values[i + 1]
            )));
        }
        Ok(Self { mach_values, cd_values })
    }

    /// Create a drag table from (mach, cd) pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, BallisticsError> {
        let (mach_values, cd_values) = pairs.iter().copied().unzip();
        Self::new(mach_values, cd_values)
    }

    /// Built-in data is known to be sorted, so it skips validation.
    fn from_static(pairs: &[(f64, f64)]) -> Self {
        let (mach_values, cd_values) = pairs.iter().copied().unzip();
        Self { mach_values, cd_values }
    }

    /// Load a custom table from a CSV file with a header row and `mach,cd` columns
    pub fn from_csv_path(path: &Path) -> Result<Self, BallisticsError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv_records(reader)
    }

    /// Same as [`DragTable::from_csv_path`] for an in-memory reader
    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Self, BallisticsError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(rdr);
        Self::from_csv_records(reader)
    }

    fn from_csv_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, BallisticsError> {
        let mut mach_values = Vec::new();
        let mut cd_values = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() < 2 {
                return Err(BallisticsError::InvalidDragTable(format!(
                    "row {} has {} columns, expected mach,cd",
                    row + 1,
                    record.len()
                )));
            }
            let parse = |field: &str| {
                field.parse::<f64>().map_err(|_| {
                    BallisticsError::InvalidDragTable(format!("row {}: '{field}' is not a number", row + 1))
                })
            };
            mach_values.push(parse(&record[0])?);
            cd_values.push(parse(&record[1])?);
        }

        Self::new(mach_values, cd_values)
    }

    pub fn len(&self) -> usize {
        self.mach_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mach_values.is_empty()
    }

    /// Highest Mach number covered by the table
    pub fn max_mach(&self) -> f64 {
        self.mach_values.last().copied().unwrap_or(0.0)
    }

    /// Interpolate the drag coefficient at `mach`.
    ///
    /// Finds the first breakpoint whose key is `>= mach` and interpolates
    /// linearly from its predecessor, or from `(0, 0)` when the match is the
    /// first entry. An exact hit returns the stored coefficient unchanged.
    /// Returns `None` when `mach` lies beyond the last breakpoint.
    pub fn lookup(&self, mach: f64) -> Option<f64> {
        let idx = self.mach_values.partition_point(|&m| m < mach);
        if idx >= self.mach_values.len() {
            return None;
        }

        let (hi_mach, hi_cd) = (self.mach_values[idx], self.cd_values[idx]);
        if hi_mach == mach {
            return Some(hi_cd);
        }

        let (lo_mach, lo_cd) = if idx == 0 {
            (0.0, 0.0)
        } else {
            (self.mach_values[idx - 1], self.cd_values[idx - 1])
        };

        let denominator = hi_mach - lo_mach;
        if denominator.abs() < crate::constants::MIN_DIVISION_THRESHOLD {
            return Some(hi_cd);
        }
        let scale = (mach - lo_mach) / denominator;
        Some(lo_cd + scale * (hi_cd - lo_cd))
    }
}

/// G1 drag table, built once and shared by all solves
pub static G1_DRAG_TABLE: Lazy<DragTable> = Lazy::new(|| DragTable::from_static(&G1_TABLE_DATA));

/// G7 drag table, built once and shared by all solves
pub static G7_DRAG_TABLE: Lazy<DragTable> = Lazy::new(|| DragTable::from_static(&G7_TABLE_DATA));

/// Convert a speed (m/s) to a Mach number at the given air temperature (K)
pub fn speed_to_mach(speed_mps: f64, temperature_k: f64) -> f64 {
    speed_mps / speed_of_sound(temperature_k)
}

/// Drag coefficient for a projectile speed (m/s) at an air temperature (K).
///
/// Beyond the table's last breakpoint this returns `0.0`: the projectile is
/// treated as drag-free. That is an extrapolation-as-zero approximation, not
/// physics, and it is logged at trace level.
pub fn get_drag_coefficient(table: &DragTable, speed_mps: f64, temperature_k: f64) -> f64 {
    let mach = speed_to_mach(speed_mps, temperature_k);
    match table.lookup(mach) {
        Some(cd) => cd,
        None => {
            log::trace!(
                "Mach {:.3} beyond drag table limit {:.3}, using zero drag",
                mach,
                table.max_mach()
            );
            0.0
        }
    }
}
