use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    /// Hex color, e.g. `#3B82F6`.
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::video_tag::Entity")]
    VideoTag,
}

impl Related<super::video_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoTag.def()
    }
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        super::video_tag::Relation::Video.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::video_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
