//! Breakeven search over projection series
//!
//! A breakeven is the first month at which a scenario's crossover condition
//! holds. Month 0 counts: a condition already true before any payment is an
//! immediate breakeven. "Never" is a value, not an error.

use serde::{Deserialize, Serialize};

use crate::projection::PeriodSnapshot;

/// First month a crossover condition holds, or never within the horizon
///
/// Serialized as the month number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Breakeven {
    Month(u32),
    Never,
}

impl From<Option<u32>> for Breakeven {
    fn from(month: Option<u32>) -> Self {
        month.map_or(Breakeven::Never, Breakeven::Month)
    }
}

impl From<Breakeven> for Option<u32> {
    fn from(breakeven: Breakeven) -> Self {
        breakeven.month()
    }
}

impl Breakeven {
    pub fn month(&self) -> Option<u32> {
        match self {
            Breakeven::Month(month) => Some(*month),
            Breakeven::Never => None,
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Breakeven::Never)
    }

    /// True when the breakeven falls after `months`; `Never` exceeds any horizon
    pub fn exceeds(&self, months: u32) -> bool {
        match self {
            Breakeven::Month(month) => *month > months,
            Breakeven::Never => true,
        }
    }

    /// Display form: month resolution below `month_threshold`, years and
    /// months otherwise. The month index stays the canonical value.
    pub fn display(&self, month_threshold: u32) -> BreakevenDisplay {
        match self {
            Breakeven::Month(month) if *month < month_threshold => BreakevenDisplay::Months { months: *month },
            Breakeven::Month(month) => BreakevenDisplay::Years {
                years: month / 12,
                months: month % 12,
            },
            Breakeven::Never => BreakevenDisplay::Never,
        }
    }
}

/// How a breakeven should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum BreakevenDisplay {
    Months { months: u32 },
    Years { years: u32, months: u32 },
    Never,
}

/// First entry of `series` for which `condition` holds
pub fn find_breakeven<T, F>(series: &[T], mut condition: F) -> Breakeven
where
    T: PeriodSnapshot,
    F: FnMut(&T) -> bool,
{
    series
        .iter()
        .find(|entry| condition(*entry))
        .map_or(Breakeven::Never, |entry| Breakeven::Month(entry.month()))
}

/// First index at which a cumulative advantage is non-negative
///
/// Values are whole cents so there is no floating noise to flip the sign.
pub fn find_first_non_negative(advantage: &[i64]) -> Breakeven {
    advantage
        .iter()
        .position(|&value| value >= 0)
        .map_or(Breakeven::Never, |idx| Breakeven::Month(idx as u32))
}
