use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "firmware")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub codename: String,
    pub version: String,
    pub android: String,
    pub branch: String,
    pub size: Option<i64>,
    #[sea_orm(unique)]
    pub md5: Option<String>,
    #[sea_orm(unique)]
    pub filename: String,
    #[sea_orm(column_type = "Text")]
    pub github_link: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub osdn_link: Option<String>,
    pub date: Option<Date>,
    pub inserted_on: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
