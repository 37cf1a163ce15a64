pub mod tags;

pub use tags::{is_supported_format, write_year_tags, TagError, YearTags};
