//! The `yearfixer` command: select items, resolve them one by one, persist.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::YearFixerError;
use crate::library::{Item, Library};
use crate::musicbrainz::MusicBrainzClient;
use crate::query::{parse_query_parts, selection_query};
use crate::resolver::{ResolutionStatus, YearResolver};

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub selected: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub already_complete: usize,
    pub unresolved: usize,
    /// Items whose processing hit a library error
    pub failed: usize,
}

pub struct YearFixerCommand<'a> {
    library: &'a dyn Library,
    config: Config,
    remote: MusicBrainzClient,
}

impl<'a> YearFixerCommand<'a> {
    pub fn new(library: &'a dyn Library, config: &Config) -> Result<Self, YearFixerError> {
        let remote = MusicBrainzClient::new(&config.musicbrainz)?;
        Ok(Self {
            library,
            config: config.clone(),
            remote,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Items matching the user query, limited to those missing year data
    /// unless force mode is on.
    pub async fn retrieve_items<S: AsRef<str>>(
        &self,
        query: &[S],
    ) -> Result<Vec<Item>, YearFixerError> {
        let (user_query, sort) = parse_query_parts(query);
        let query = selection_query(user_query, self.config.force);
        debug!(query = %query, force = self.config.force, "selecting items");
        self.library.items(&query, &sort).await
    }

    /// Resolve and store every selected item.
    ///
    /// A failure on one item is logged and counted; the run continues.
    pub async fn run<S: AsRef<str>>(&self, query: &[S]) -> Result<RunSummary, YearFixerError> {
        let items = self.retrieve_items(query).await?;
        let mut summary = RunSummary {
            selected: items.len(),
            ..RunSummary::default()
        };
        info!(count = items.len(), force = self.config.force, "items selected");

        let resolver = YearResolver::new(&self.remote, self.library, self.config.force);

        for mut item in items {
            debug!(item_id = item.id, title = %item.title, "processing item");
            match self.process_one(&resolver, &mut item).await {
                Ok(ResolutionStatus::Updated) => summary.updated += 1,
                Ok(ResolutionStatus::Unchanged) => summary.unchanged += 1,
                Ok(ResolutionStatus::AlreadyComplete) => summary.already_complete += 1,
                Ok(ResolutionStatus::Unresolved) => summary.unresolved += 1,
                Err(e) => {
                    error!(item_id = item.id, error = %e, "failed to process item");
                    summary.failed += 1;
                }
            }
        }

        info!(
            selected = summary.selected,
            updated = summary.updated,
            unresolved = summary.unresolved,
            failed = summary.failed,
            "yearfixer run complete"
        );
        Ok(summary)
    }

    async fn process_one(
        &self,
        resolver: &YearResolver<'_>,
        item: &mut Item,
    ) -> Result<ResolutionStatus, YearFixerError> {
        let report = resolver.process_item(item).await?;
        if !report.changed() {
            return Ok(report.status);
        }

        if self.config.write {
            if let Err(e) = self.library.try_write(item).await {
                warn!(item_id = item.id, path = %item.path, error = %e, "could not write tags");
            }
        }
        self.library.store(item).await?;

        info!(
            item_id = item.id,
            title = %item.title,
            year = ?item.year,
            original_year = ?item.original_year,
            "updated"
        );
        Ok(report.status)
    }
}
