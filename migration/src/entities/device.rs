use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub codename: String,
    pub region: String,
    pub miui_name: String,
    pub miui_code: String,
    pub mi_website_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub picture: Option<String>,
    pub eol: bool,
    pub firmware_updater: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
