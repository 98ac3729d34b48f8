use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comuna")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub region_id: i32,
    #[sea_orm(belongs_to, from = "region_id", to = "id")]
    pub region: HasOne<super::region::Entity>,

    /// Title-cased; unique across all comunas, not per region.
    #[sea_orm(unique, column_type = "String(StringLen::N(25))")]
    pub name: String,

    #[sea_orm(default_value = 1)]
    pub active: i16,

    pub image_extension: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
