// Shared test utilities for integration tests
use yearfixer_core::{Config, DbLibrary, Item, MusicBrainzConfig};
use yearfixer_db::entities::item;
use yearfixer_db::sea_orm::{ActiveModelTrait, NotSet, Set};
use yearfixer_db::DatabaseConfig;
use yearfixer_migration::{Migrator, MigratorTrait};

pub async fn memory_library() -> DbLibrary {
    let db = yearfixer_db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");
    DbLibrary::new(db)
}

/// Config pointing at a mock MusicBrainz, tag writing off.
pub fn test_config(mock_uri: &str, force: bool) -> Config {
    Config {
        force,
        write: false,
        musicbrainz: MusicBrainzConfig {
            base_url: format!("{mock_uri}/ws/2/"),
            backoff_ms: 1,
            ..MusicBrainzConfig::default()
        },
    }
}

pub async fn add_track(
    library: &DbLibrary,
    title: &str,
    artist_id: Option<&str>,
    album_id: Option<&str>,
    year: Option<i32>,
    original_year: Option<i32>,
) -> Item {
    item::ActiveModel {
        id: NotSet,
        title: Set(title.to_string()),
        artist: Set("Artist".to_string()),
        album: Set("Album".to_string()),
        path: Set(String::new()),
        mb_artistid: Set(artist_id.map(str::to_string)),
        mb_albumid: Set(album_id.map(str::to_string)),
        year: Set(year),
        original_year: Set(original_year),
    }
    .insert(library.connection())
    .await
    .expect("insert item")
}
