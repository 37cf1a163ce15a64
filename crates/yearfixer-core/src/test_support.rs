// Shared helpers for unit tests
use sea_orm::{ActiveModelTrait, NotSet, Set};
use yearfixer_db::entities::item;
use yearfixer_db::DatabaseConfig;
use yearfixer_migration::{Migrator, MigratorTrait};

use crate::config::MusicBrainzConfig;
use crate::library::{DbLibrary, Item};

/// Fresh, migrated in-memory library.
pub async fn memory_library() -> DbLibrary {
    let db = yearfixer_db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");
    DbLibrary::new(db)
}

/// MusicBrainz settings pointing at a mock server, with a negligible backoff.
pub fn mock_musicbrainz(base_url: &str) -> MusicBrainzConfig {
    MusicBrainzConfig {
        base_url: format!("{base_url}/ws/2/"),
        backoff_ms: 1,
        ..MusicBrainzConfig::default()
    }
}

/// Detached item, never persisted.
pub fn sample_item() -> Item {
    Item {
        id: 1,
        title: "Song".into(),
        artist: "Artist".into(),
        album: "Album".into(),
        path: String::new(),
        mb_artistid: Some("artist-1".into()),
        mb_albumid: Some("album-1".into()),
        year: None,
        original_year: None,
    }
}

/// Builder for rows inserted by tests.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    title: String,
    artist: String,
    album: String,
    path: String,
    mb_artistid: Option<String>,
    mb_albumid: Option<String>,
    year: Option<i32>,
    original_year: Option<i32>,
}

impl NewItem {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn artist(mut self, artist: &str) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn album(mut self, album: &str) -> Self {
        self.album = album.into();
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.into();
        self
    }

    pub fn artist_id(mut self, id: &str) -> Self {
        self.mb_artistid = Some(id.into());
        self
    }

    pub fn album_id(mut self, id: &str) -> Self {
        self.mb_albumid = Some(id.into());
        self
    }

    pub fn years(mut self, year: Option<i32>, original_year: Option<i32>) -> Self {
        self.year = year;
        self.original_year = original_year;
        self
    }
}

pub async fn insert_item(library: &DbLibrary, new: NewItem) -> Item {
    item::ActiveModel {
        id: NotSet,
        title: Set(new.title),
        artist: Set(new.artist),
        album: Set(new.album),
        path: Set(new.path),
        mb_artistid: Set(new.mb_artistid),
        mb_albumid: Set(new.mb_albumid),
        year: Set(new.year),
        original_year: Set(new.original_year),
    }
    .insert(library.connection())
    .await
    .expect("insert item")
}
