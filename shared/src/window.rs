//! Calendar months read by a replenishment run

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of months of history a run reads
pub const WINDOW_MONTHS: usize = 12;

/// How the outflow window is placed relative to the run date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// January to December of the previous calendar year
    #[default]
    PreviousYear,
    /// The twelve complete months before the run month
    Trailing,
}

/// A calendar month
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month before this one
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The month after this one
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// First day of the month, `None` for an out-of-range month
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Half-open date range `[first day, first day of next month)`
    pub fn date_range(self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first_day()?, self.next().first_day()?))
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Ordered months (oldest first) a run aggregates outflows over
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutflowWindow {
    months: Vec<YearMonth>,
}

impl OutflowWindow {
    pub fn for_mode(mode: WindowMode, today: NaiveDate) -> Self {
        match mode {
            WindowMode::PreviousYear => Self::previous_year(today),
            WindowMode::Trailing => Self::trailing(today),
        }
    }

    pub fn previous_year(today: NaiveDate) -> Self {
        let year = today.year() - 1;
        Self {
            months: (1..=12).map(|month| YearMonth::new(year, month)).collect(),
        }
    }

    pub fn trailing(today: NaiveDate) -> Self {
        let mut months = Vec::with_capacity(WINDOW_MONTHS);
        let mut cursor = YearMonth::new(today.year(), today.month());
        for _ in 0..WINDOW_MONTHS {
            cursor = cursor.previous();
            months.push(cursor);
        }
        months.reverse();
        Self { months }
    }

    pub fn months(&self) -> &[YearMonth] {
        &self.months
    }

    pub fn first(&self) -> YearMonth {
        self.months[0]
    }

    pub fn last(&self) -> YearMonth {
        self.months[self.months.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}
