use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{case_study, industry_expert, insight};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "industries")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { CaseStudies, Insights, IndustryExperts }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::CaseStudies => Entity::has_many(case_study::Entity).into(),
            Relation::Insights => Entity::has_many(insight::Entity).into(),
            Relation::IndustryExperts => Entity::has_many(industry_expert::Entity).into(),
        }
    }
}

impl Related<case_study::Entity> for Entity {
    fn to() -> RelationDef { Relation::CaseStudies.def() }
}

impl Related<insight::Entity> for Entity {
    fn to() -> RelationDef { Relation::Insights.def() }
}

impl ActiveModelBehavior for ActiveModel {}
