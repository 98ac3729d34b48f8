use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "region")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Title-cased; unique across regions.
    #[sea_orm(unique, column_type = "String(StringLen::N(25))")]
    pub name: String,

    #[sea_orm(default_value = 1)]
    pub active: i16,

    /// `.png` or `.jpg` when an image is attached.
    pub image_extension: Option<String>,

    #[sea_orm(has_many)]
    pub comunas: HasMany<super::comuna::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
