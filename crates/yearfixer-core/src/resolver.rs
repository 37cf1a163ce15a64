//! Per-item year resolution.
//!
//! For each field that is missing (or every field, in force mode) the chain
//! is tried in order and the first hit wins:
//!
//! * `original_year`: MusicBrainz, album mean, artist mean
//! * `year`: album mean, artist mean
//!
//! Whatever is still missing afterwards is copied from the other field.
//! A lookup that finds nothing never clears a value the item already has.

use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::YearFixerError;
use crate::library::{Item, Library};
use crate::musicbrainz::MusicBrainzClient;
use crate::stats::{mean_year, Scope, YearField};
use crate::year::{Year, YearFields};

/// Where a field's final value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YearSource {
    Existing,
    MusicBrainz,
    AlbumMean,
    ArtistMean,
    CrossFill,
}

impl From<Scope> for YearSource {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Album => YearSource::AlbumMean,
            Scope::Artist => YearSource::ArtistMean,
        }
    }
}

impl fmt::Display for YearSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            YearSource::Existing => "existing",
            YearSource::MusicBrainz => "musicbrainz",
            YearSource::AlbumMean => "album mean",
            YearSource::ArtistMean => "artist mean",
            YearSource::CrossFill => "cross-fill",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Both fields were present and force mode was off; nothing was queried.
    AlreadyComplete,
    /// At least one field changed.
    Updated,
    /// Lookups ran but produced the values the item already had.
    Unchanged,
    /// Neither field could be determined.
    Unresolved,
}

type Resolved = (Year, YearSource);

/// Outcome of resolving one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub item_id: i32,
    pub year: Option<Year>,
    pub year_source: Option<YearSource>,
    pub original_year: Option<Year>,
    pub original_year_source: Option<YearSource>,
    pub status: ResolutionStatus,
}

impl ItemReport {
    pub fn changed(&self) -> bool {
        self.status == ResolutionStatus::Updated
    }
}

pub struct YearResolver<'a> {
    remote: &'a MusicBrainzClient,
    library: &'a dyn Library,
    force: bool,
}

impl<'a> YearResolver<'a> {
    pub fn new(remote: &'a MusicBrainzClient, library: &'a dyn Library, force: bool) -> Self {
        Self {
            remote,
            library,
            force,
        }
    }

    /// Fill in the item's year fields in place.
    ///
    /// Only library failures are returned as errors; lookup problems are
    /// logged and fall through to the next source.
    pub async fn process_item(&self, item: &mut Item) -> Result<ItemReport, YearFixerError> {
        let before = (item.year, item.original_year);
        let mut original_year = YearFields::original_year(&*item).map(|y| (y, YearSource::Existing));
        let mut year = YearFields::year(&*item).map(|y| (y, YearSource::Existing));

        if original_year.is_some() && year.is_some() && !self.force {
            debug!(item_id = item.id, "year fields already set");
            return Ok(report(item.id, year, original_year, ResolutionStatus::AlreadyComplete));
        }

        if original_year.is_none() || self.force {
            if let Some(found) = self.resolve_original_year(item).await? {
                original_year = Some(found);
            }
        }

        if year.is_none() || self.force {
            if let Some(found) = self.sibling_mean(item, YearField::Year).await? {
                year = Some(found);
            }
        }

        match (year, original_year) {
            (None, Some((y, _))) => year = Some((y, YearSource::CrossFill)),
            (Some((y, _)), None) => original_year = Some((y, YearSource::CrossFill)),
            _ => {}
        }

        if let Some((y, _)) = year {
            item.set_year(y);
        }
        if let Some((y, _)) = original_year {
            item.set_original_year(y);
        }

        let status = if year.is_none() && original_year.is_none() {
            info!(item_id = item.id, title = %item.title, "could not determine year");
            ResolutionStatus::Unresolved
        } else if before != (item.year, item.original_year) {
            ResolutionStatus::Updated
        } else {
            ResolutionStatus::Unchanged
        };

        let report = report(item.id, year, original_year, status);
        debug!(
            item_id = item.id,
            year = ?report.year.map(Year::get),
            year_source = ?report.year_source,
            original_year = ?report.original_year.map(Year::get),
            original_year_source = ?report.original_year_source,
            status = ?status,
            "resolved item"
        );
        Ok(report)
    }

    async fn resolve_original_year(&self, item: &Item) -> Result<Option<Resolved>, YearFixerError> {
        match self.remote.fetch_original_year(item).await {
            Ok(Some(year)) => return Ok(Some((year, YearSource::MusicBrainz))),
            Ok(None) => {}
            Err(e @ YearFixerError::MissingIdentifier(_)) => {
                error!(item_id = item.id, "{e}");
            }
            Err(e) => return Err(e),
        }
        self.sibling_mean(item, YearField::OriginalYear).await
    }

    async fn sibling_mean(
        &self,
        item: &Item,
        target: YearField,
    ) -> Result<Option<Resolved>, YearFixerError> {
        for scope in [Scope::Album, Scope::Artist] {
            let Some(value) = scope.value_of(item) else {
                debug!(item_id = item.id, scope = %scope.field(), "no scope id, skipping");
                continue;
            };
            if let Some(year) = mean_year(self.library, scope, value, target).await? {
                return Ok(Some((year, scope.into())));
            }
        }
        Ok(None)
    }
}

fn report(
    item_id: i32,
    year: Option<Resolved>,
    original_year: Option<Resolved>,
    status: ResolutionStatus,
) -> ItemReport {
    ItemReport {
        item_id,
        year: year.map(|(y, _)| y),
        year_source: year.map(|(_, s)| s),
        original_year: original_year.map(|(y, _)| y),
        original_year_source: original_year.map(|(_, s)| s),
        status,
    }
}
