//! Year inference from sibling items sharing an album or artist id.

use tracing::debug;

use crate::error::YearFixerError;
use crate::library::{Item, Library};
use crate::query::{Field, ItemQuery};
use crate::year::{Year, YearFields};

/// Grouping key for sibling lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Album,
    Artist,
}

impl Scope {
    pub fn field(self) -> Field {
        match self {
            Scope::Album => Field::MbAlbumId,
            Scope::Artist => Field::MbArtistId,
        }
    }

    /// The item's identifier for this scope, if it has one.
    pub fn value_of<I: YearFields + ?Sized>(self, item: &I) -> Option<&str> {
        match self {
            Scope::Album => item.mb_albumid(),
            Scope::Artist => item.mb_artistid(),
        }
    }
}

/// The year field being averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearField {
    Year,
    OriginalYear,
}

impl YearField {
    pub fn field(self) -> Field {
        match self {
            YearField::Year => Field::Year,
            YearField::OriginalYear => Field::OriginalYear,
        }
    }

    fn raw(self, item: &Item) -> Option<i32> {
        match self {
            YearField::Year => item.year,
            YearField::OriginalYear => item.original_year,
        }
    }
}

/// Rounded mean of the plausible years in `values`; `None` when none survive.
///
/// Halves round away from zero.
pub fn rounded_mean<I>(values: I) -> Option<Year>
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = values
        .into_iter()
        .filter_map(Year::new)
        .fold((0i64, 0i64), |(sum, count), year| {
            (sum + i64::from(year.get()), count + 1)
        });

    if count == 0 {
        return None;
    }
    let mean = (sum as f64 / count as f64).round() as i32;
    Year::new(mean)
}

/// Mean `target` across every item whose `scope` id equals `scope_value`.
///
/// The item being resolved is not excluded when it matches the scope.
pub async fn mean_year(
    library: &dyn Library,
    scope: Scope,
    scope_value: &str,
    target: YearField,
) -> Result<Option<Year>, YearFixerError> {
    let query = ItemQuery::Match(scope.field(), scope_value.to_string());
    let siblings = library.items(&query, &[]).await?;

    let mean = rounded_mean(siblings.iter().filter_map(|item| target.raw(item)));
    debug!(
        scope = %scope.field(),
        scope_value,
        target = %target.field(),
        siblings = siblings.len(),
        mean = ?mean.map(Year::get),
        "sibling mean"
    );
    Ok(mean)
}
