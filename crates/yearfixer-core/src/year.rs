//! Validated year values and typed access to an item's year fields.

use serde::Serialize;
use std::fmt;

use yearfixer_db::entities::item;

/// A calendar year strictly inside `(0, 2100)`.
///
/// Every write to an item's year fields goes through this type, so `0` and
/// out-of-range values can never be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Year(i32);

impl Year {
    /// Exclusive upper bound of the plausibility window.
    pub const UPPER_BOUND: i32 = 2100;

    pub fn new(value: i32) -> Option<Self> {
        (value > 0 && value < Self::UPPER_BOUND).then_some(Self(value))
    }

    /// Parse the leading four characters of a `YYYY[-MM[-DD]]` date.
    pub fn from_date_prefix(date: &str) -> Option<Self> {
        let prefix: String = date.chars().take(4).collect();
        prefix.trim().parse::<i32>().ok().and_then(Self::new)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed accessors for the fields year resolution reads and writes.
pub trait YearFields {
    fn year(&self) -> Option<Year>;
    fn set_year(&mut self, year: Year);
    fn original_year(&self) -> Option<Year>;
    fn set_original_year(&mut self, year: Year);
    fn mb_artistid(&self) -> Option<&str>;
    fn mb_albumid(&self) -> Option<&str>;
    fn title(&self) -> Option<&str>;
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl YearFields for item::Model {
    fn year(&self) -> Option<Year> {
        self.year.and_then(Year::new)
    }

    fn set_year(&mut self, year: Year) {
        self.year = Some(year.get());
    }

    fn original_year(&self) -> Option<Year> {
        self.original_year.and_then(Year::new)
    }

    fn set_original_year(&mut self, year: Year) {
        self.original_year = Some(year.get());
    }

    fn mb_artistid(&self) -> Option<&str> {
        self.mb_artistid.as_deref().and_then(non_empty)
    }

    fn mb_albumid(&self) -> Option<&str> {
        self.mb_albumid.as_deref().and_then(non_empty)
    }

    fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }
}
