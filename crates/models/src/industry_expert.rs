//! Join rows linking industries to their experts.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{expert, industry};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "industry_experts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub industry_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub expert_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Industry, Expert }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Industry => Entity::belongs_to(industry::Entity)
                .from(Column::IndustryId)
                .to(industry::Column::Id)
                .into(),
            Relation::Expert => Entity::belongs_to(expert::Entity)
                .from(Column::ExpertId)
                .to(expert::Column::Id)
                .into(),
        }
    }
}

impl Related<industry::Entity> for Entity {
    fn to() -> RelationDef { Relation::Industry.def() }
}

impl Related<expert::Entity> for Entity {
    fn to() -> RelationDef { Relation::Expert.def() }
}

impl ActiveModelBehavior for ActiveModel {}
