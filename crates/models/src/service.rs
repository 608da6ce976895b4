use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{case_study, service_category, service_expert};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category, CaseStudies, ServiceExperts }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(service_category::Entity)
                .from(Column::CategoryId)
                .to(service_category::Column::Id)
                .into(),
            Relation::CaseStudies => Entity::has_many(case_study::Entity).into(),
            Relation::ServiceExperts => Entity::has_many(service_expert::Entity).into(),
        }
    }
}

impl Related<service_category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl Related<case_study::Entity> for Entity {
    fn to() -> RelationDef { Relation::CaseStudies.def() }
}

impl ActiveModelBehavior for ActiveModel {}
