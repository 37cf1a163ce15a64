//! Library access: the `Library` trait and its SeaORM implementation.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    QueryFilter, QueryOrder, Set,
};
use std::path::PathBuf;
use tracing::debug;
use yearfixer_audio::{write_year_tags, YearTags};
use yearfixer_db::entities::item;

use crate::error::YearFixerError;
use crate::query::{Field, ItemQuery, Sort};
use crate::year::YearFields;

/// A library item.
pub type Item = item::Model;

/// Operations the year resolver needs from the music library.
#[async_trait]
pub trait Library: Send + Sync {
    /// All items matching `query`, in `sort` order.
    async fn items(&self, query: &ItemQuery, sort: &[Sort]) -> Result<Vec<Item>, YearFixerError>;

    /// Persist the item's year fields.
    async fn store(&self, item: &Item) -> Result<(), YearFixerError>;

    /// Mirror the item's year fields into its audio file.
    async fn try_write(&self, item: &Item) -> Result<(), YearFixerError>;
}

/// `Library` backed by the `items` table.
#[derive(Clone)]
pub struct DbLibrary {
    db: DatabaseConnection,
}

impl DbLibrary {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Translate a predicate into a SeaORM condition.
pub fn to_condition(query: &ItemQuery) -> Condition {
    match query {
        ItemQuery::True => Condition::all().add(Expr::val(1).eq(1)),
        ItemQuery::Match(field, value) => {
            Condition::all().add(field.column().eq(value.as_str()))
        }
        ItemQuery::Substring(field, value) => {
            Condition::all().add(field.column().contains(value.as_str()))
        }
        ItemQuery::Numeric(field, value) => Condition::all().add(field.column().eq(*value)),
        ItemQuery::IsNull(field) => Condition::all().add(field.column().is_null()),
        ItemQuery::Empty(field) => Condition::all().add(field.column().eq("")),
        ItemQuery::And(parts) => parts
            .iter()
            .fold(Condition::all(), |cond, part| cond.add(to_condition(part))),
        ItemQuery::Or(parts) => parts
            .iter()
            .fold(Condition::any(), |cond, part| cond.add(to_condition(part))),
    }
}

#[async_trait]
impl Library for DbLibrary {
    async fn items(&self, query: &ItemQuery, sort: &[Sort]) -> Result<Vec<Item>, YearFixerError> {
        let mut select = item::Entity::find().filter(to_condition(query));

        if sort.is_empty() {
            select = select
                .order_by_asc(item::Column::Artist)
                .order_by_asc(item::Column::Album)
                .order_by_asc(item::Column::Title);
        } else {
            for key in sort {
                let order = if key.descending { Order::Desc } else { Order::Asc };
                select = select.order_by(key.field.column(), order);
            }
        }
        // Stable tie-break so repeated runs visit items in the same order
        select = select.order_by_asc(Field::Id.column());

        let items = select.all(&self.db).await?;
        debug!(query = %query, count = items.len(), "library query");
        Ok(items)
    }

    async fn store(&self, item: &Item) -> Result<(), YearFixerError> {
        let mut active = item::ActiveModel::from(item.clone());
        active.year = Set(item.year);
        active.original_year = Set(item.original_year);
        active.update(&self.db).await?;
        debug!(item_id = item.id, year = ?item.year, original_year = ?item.original_year, "stored item");
        Ok(())
    }

    async fn try_write(&self, item: &Item) -> Result<(), YearFixerError> {
        if item.path.trim().is_empty() {
            debug!(item_id = item.id, "item has no file path, skipping tag write");
            return Ok(());
        }

        let path = PathBuf::from(&item.path);
        let tags = YearTags {
            year: item.year().map(|y| y.get().unsigned_abs()),
            original_year: item.original_year().map(|y| y.get().unsigned_abs()),
        };

        tokio::task::spawn_blocking(move || write_year_tags(&path, tags))
            .await
            .map_err(|e| YearFixerError::Io(std::io::Error::other(e)))??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{missing_year_filter, parse_query_parts};
    use crate::test_support::{insert_item, memory_library, NewItem};

    fn titles(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    // ── items() ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_items_true_returns_everything() {
        let library = memory_library().await;
        insert_item(&library, NewItem::new("A")).await;
        insert_item(&library, NewItem::new("B")).await;

        let items = library.items(&ItemQuery::True, &[]).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_items_match_is_exact() {
        let library = memory_library().await;
        insert_item(&library, NewItem::new("A").album_id("album-1")).await;
        insert_item(&library, NewItem::new("B").album_id("album-10")).await;

        let query = ItemQuery::Match(Field::MbAlbumId, "album-1".into());
        let items = library.items(&query, &[]).await.unwrap();
        assert_eq!(titles(&items), vec!["A"]);
    }

    #[tokio::test]
    async fn test_items_substring_is_case_insensitive() {
        let library = memory_library().await;
        insert_item(&library, NewItem::new("Help!").artist("The Beatles")).await;
        insert_item(&library, NewItem::new("Angie").artist("The Rolling Stones")).await;

        let (query, sort) = parse_query_parts(&["artist:beatles"]);
        let items = library.items(&query, &sort).await.unwrap();
        assert_eq!(titles(&items), vec!["Help!"]);
    }

    #[tokio::test]
    async fn test_items_missing_year_filter() {
        let library = memory_library().await;
        insert_item(&library, NewItem::new("complete").years(Some(1990), Some(1990))).await;
        insert_item(&library, NewItem::new("zero year").years(Some(0), Some(1990))).await;
        insert_item(&library, NewItem::new("null original").years(Some(1990), None)).await;
        insert_item(&library, NewItem::new("nothing").years(None, None)).await;

        let sort = [Sort {
            field: Field::Id,
            descending: false,
        }];
        let items = library.items(&missing_year_filter(), &sort).await.unwrap();
        assert_eq!(titles(&items), vec!["zero year", "null original", "nothing"]);
    }

    #[tokio::test]
    async fn test_items_sort_descending() {
        let library = memory_library().await;
        insert_item(&library, NewItem::new("a").album("Abbey Road")).await;
        insert_item(&library, NewItem::new("b").album("Revolver")).await;

        let (query, sort) = parse_query_parts(&["album-"]);
        let items = library.items(&query, &sort).await.unwrap();
        assert_eq!(titles(&items), vec!["b", "a"]);
    }

    // ── store() ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_store_updates_year_fields() {
        let library = memory_library().await;
        let mut item = insert_item(&library, NewItem::new("A")).await;

        item.year = Some(1977);
        item.original_year = Some(1975);
        library.store(&item).await.unwrap();

        let reloaded = item::Entity::find_by_id(item.id)
            .one(library.connection())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.year, Some(1977));
        assert_eq!(reloaded.original_year, Some(1975));
        assert_eq!(reloaded.title, "A");
    }

    // ── try_write() ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_try_write_without_path_is_noop() {
        let library = memory_library().await;
        let item = insert_item(&library, NewItem::new("A").years(Some(1990), None)).await;
        assert!(library.try_write(&item).await.is_ok());
    }

    #[tokio::test]
    async fn test_try_write_unsupported_file() {
        let library = memory_library().await;
        let tmp = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        let item = insert_item(
            &library,
            NewItem::new("A")
                .years(Some(1990), Some(1990))
                .path(tmp.path().to_str().unwrap()),
        )
        .await;

        let err = library.try_write(&item).await.unwrap_err();
        assert!(matches!(err, YearFixerError::Tags(_)));
    }
}
