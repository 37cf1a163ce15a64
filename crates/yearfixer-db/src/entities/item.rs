use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One track in the music library.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Audio file backing this item
    pub path: String,
    pub mb_artistid: Option<String>,
    pub mb_albumid: Option<String>,
    /// `0` is a legacy "unknown" marker and reads as absent.
    pub year: Option<i32>,
    pub original_year: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
