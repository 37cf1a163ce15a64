use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::Title).string().not_null().default(""))
                    .col(ColumnDef::new(Items::Artist).string().not_null().default(""))
                    .col(ColumnDef::new(Items::Album).string().not_null().default(""))
                    .col(ColumnDef::new(Items::Path).string().not_null().default(""))
                    .col(ColumnDef::new(Items::MbArtistid).string_len(36).null())
                    .col(ColumnDef::new(Items::MbAlbumid).string_len(36).null())
                    .col(ColumnDef::new(Items::Year).integer().null())
                    .col(ColumnDef::new(Items::OriginalYear).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_mb_albumid")
                    .table(Items::Table)
                    .col(Items::MbAlbumid)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_mb_artistid")
                    .table(Items::Table)
                    .col(Items::MbArtistid)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Items {
    Table,
    Id,
    Title,
    Artist,
    Album,
    Path,
    MbArtistid,
    MbAlbumid,
    Year,
    OriginalYear,
}
