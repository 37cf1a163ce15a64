//! Fills in missing `year` and `original_year` on library items.
//!
//! Years are resolved from MusicBrainz first, then from the mean of sibling
//! items sharing the same album or artist identifier, and finally the two
//! fields are cross-filled from each other.

pub mod about;
pub mod command;
pub mod config;
pub mod error;
pub mod library;
pub mod musicbrainz;
pub mod query;
pub mod resolver;
pub mod stats;
pub mod year;

pub use command::{RunSummary, YearFixerCommand};
pub use config::{Config, MusicBrainzConfig};
pub use error::YearFixerError;
pub use library::{DbLibrary, Item, Library};
pub use musicbrainz::{FetchReport, FetchState, GiveUpReason, MusicBrainzClient, RetryPolicy};
pub use query::{parse_query_parts, Field, ItemQuery, Sort};
pub use resolver::{ItemReport, ResolutionStatus, YearResolver, YearSource};
pub use stats::{mean_year, Scope, YearField};
pub use year::{Year, YearFields};

#[cfg(test)]
pub(crate) mod test_support;
