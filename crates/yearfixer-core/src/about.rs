//! Package identity, fixed at compile time.

pub const PACKAGE_TITLE: &str = "YearFixer";
pub const PACKAGE_NAME: &str = "yearfixer";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PACKAGE_URL: &str = "https://github.com/adamjakab/BeetsPluginYearFixer";
pub const SHORT_DESCRIPTION: &str = "fix `original_year` and `year` tags on library items";

/// User-Agent sent to MusicBrainz: `<product>/<version> ( <url> )`.
pub fn user_agent() -> String {
    format!("{PACKAGE_TITLE}/{VERSION} ( {PACKAGE_URL} )")
}

/// One-line identity shown by `--version`.
pub fn version_info() -> String {
    format!("{PACKAGE_TITLE} ({PACKAGE_NAME}) v{VERSION} - {SHORT_DESCRIPTION}")
}
