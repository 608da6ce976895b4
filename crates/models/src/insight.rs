use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::industry;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "insights")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image: String,
    pub view_count: i32,
    pub display_order: i32,
    pub is_active: bool,
    pub industry_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Industry }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Industry => Entity::belongs_to(industry::Entity)
                .from(Column::IndustryId)
                .to(industry::Column::Id)
                .into(),
        }
    }
}

impl Related<industry::Entity> for Entity {
    fn to() -> RelationDef { Relation::Industry.def() }
}

impl ActiveModelBehavior for ActiveModel {}
