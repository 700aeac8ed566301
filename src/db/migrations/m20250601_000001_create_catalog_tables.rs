use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Videos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Videos::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Videos::Title).string().not_null())
                    .col(ColumnDef::new(Videos::ThumbnailUrl).string().not_null())
                    .col(ColumnDef::new(Videos::Duration).integer().not_null())
                    .col(
                        ColumnDef::new(Videos::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Videos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Videos::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Backing indexes for the list sort keys
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("videos_created_at_idx")
                    .table(Videos::Table)
                    .col(Videos::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("videos_views_idx")
                    .table(Videos::Table)
                    .col(Videos::Views)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tags::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Tags::Color).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VideoTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VideoTags::VideoId).string().not_null())
                    .col(ColumnDef::new(VideoTags::TagId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(VideoTags::VideoId)
                            .col(VideoTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_tags_video_id")
                            .from(VideoTags::Table, VideoTags::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_tags_tag_id")
                            .from(VideoTags::Table, VideoTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("video_tags_video_id_idx")
                    .table(VideoTags::Table)
                    .col(VideoTags::VideoId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("video_tags_tag_id_idx")
                    .table(VideoTags::Table)
                    .col(VideoTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Videos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Videos {
    Table,
    Id,
    Title,
    ThumbnailUrl,
    Duration,
    Views,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    Color,
}

#[derive(DeriveIden)]
enum VideoTags {
    Table,
    VideoId,
    TagId,
}
