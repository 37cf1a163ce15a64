//! Structured item predicates and the free-text query parser.
//!
//! Query words follow the usual library-tool conventions:
//!
//! * `field:value` matches a field (substring for text fields, equality for
//!   numeric ones),
//! * `field+` / `field-` sorts ascending / descending,
//! * any other word is a substring match against title, artist or album.

use std::fmt;

use yearfixer_db::entities::item;

/// Item fields addressable from queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Artist,
    Album,
    Path,
    MbArtistId,
    MbAlbumId,
    Year,
    OriginalYear,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Id,
        Field::Title,
        Field::Artist,
        Field::Album,
        Field::Path,
        Field::MbArtistId,
        Field::MbAlbumId,
        Field::Year,
        Field::OriginalYear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Path => "path",
            Field::MbArtistId => "mb_artistid",
            Field::MbAlbumId => "mb_albumid",
            Field::Year => "year",
            Field::OriginalYear => "original_year",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Field::Id | Field::Year | Field::OriginalYear)
    }

    pub fn column(self) -> item::Column {
        match self {
            Field::Id => item::Column::Id,
            Field::Title => item::Column::Title,
            Field::Artist => item::Column::Artist,
            Field::Album => item::Column::Album,
            Field::Path => item::Column::Path,
            Field::MbArtistId => item::Column::MbArtistid,
            Field::MbAlbumId => item::Column::MbAlbumid,
            Field::Year => item::Column::Year,
            Field::OriginalYear => item::Column::OriginalYear,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A predicate over items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemQuery {
    /// Matches every item.
    True,
    /// Exact equality.
    Match(Field, String),
    /// Case-insensitive substring match.
    Substring(Field, String),
    Numeric(Field, i64),
    IsNull(Field),
    /// Field equals the empty string.
    Empty(Field),
    And(Vec<ItemQuery>),
    Or(Vec<ItemQuery>),
}

impl fmt::Display for ItemQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[ItemQuery], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{part}")?;
            }
            f.write_str(")")
        }

        match self {
            ItemQuery::True => f.write_str("TRUE"),
            ItemQuery::Match(field, value) => write!(f, "{field} = {value:?}"),
            ItemQuery::Substring(field, value) => write!(f, "{field} ~ {value:?}"),
            ItemQuery::Numeric(field, value) => write!(f, "{field} == {value}"),
            ItemQuery::IsNull(field) => write!(f, "{field} IS NULL"),
            ItemQuery::Empty(field) => write!(f, "{field} = ''"),
            ItemQuery::And(parts) => join(f, parts, " AND "),
            ItemQuery::Or(parts) => join(f, parts, " OR "),
        }
    }
}

/// One ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: Field,
    pub descending: bool,
}

/// Items where either year field is zero, empty or absent.
pub fn missing_year_filter() -> ItemQuery {
    ItemQuery::Or(
        [Field::Year, Field::OriginalYear]
            .into_iter()
            .flat_map(|field| {
                [
                    ItemQuery::Numeric(field, 0),
                    ItemQuery::Empty(field),
                    ItemQuery::IsNull(field),
                ]
            })
            .collect(),
    )
}

/// The query that picks items for a run: in force mode the user query alone,
/// otherwise the user query restricted to items missing year data.
pub fn selection_query(user_query: ItemQuery, force: bool) -> ItemQuery {
    if force {
        user_query
    } else {
        ItemQuery::And(vec![user_query, missing_year_filter()])
    }
}

/// Parse free-text query words into a predicate and an ordering.
pub fn parse_query_parts<S: AsRef<str>>(parts: &[S]) -> (ItemQuery, Vec<Sort>) {
    let mut terms = Vec::new();
    let mut sorts = Vec::new();

    for part in parts.iter().map(AsRef::as_ref) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some(sort) = parse_sort(part) {
            sorts.push(sort);
            continue;
        }

        terms.push(parse_term(part));
    }

    let query = match terms.len() {
        0 => ItemQuery::True,
        1 => terms.remove(0),
        _ => ItemQuery::And(terms),
    };
    (query, sorts)
}

fn parse_sort(part: &str) -> Option<Sort> {
    let (name, descending) = if let Some(name) = part.strip_suffix('+') {
        (name, false)
    } else if let Some(name) = part.strip_suffix('-') {
        (name, true)
    } else {
        return None;
    };
    Field::from_name(name).map(|field| Sort { field, descending })
}

fn parse_term(part: &str) -> ItemQuery {
    if let Some((name, value)) = part.split_once(':') {
        if let Some(field) = Field::from_name(name) {
            return field_term(field, value);
        }
    }

    ItemQuery::Or(
        [Field::Title, Field::Artist, Field::Album]
            .into_iter()
            .map(|field| ItemQuery::Substring(field, part.to_string()))
            .collect(),
    )
}

fn field_term(field: Field, value: &str) -> ItemQuery {
    if field.is_numeric() {
        if value.is_empty() {
            return ItemQuery::IsNull(field);
        }
        if let Ok(number) = value.parse::<i64>() {
            return ItemQuery::Numeric(field, number);
        }
        return ItemQuery::Match(field, value.to_string());
    }

    if value.is_empty() {
        ItemQuery::Or(vec![ItemQuery::Empty(field), ItemQuery::IsNull(field)])
    } else {
        ItemQuery::Substring(field, value.to_string())
    }
}
