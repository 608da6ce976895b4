use sea_orm_migration::prelude::*;

/// Unique indexes back the natural-key checks done by the service layer;
/// the rest speed up the common list filters and ordering.
const UNIQUE: &[(&str, Target, &[&str])] = &[
    ("uniq_service_categories_slug", Target::ServiceCategories, &["slug"]),
    ("uniq_services_slug", Target::Services, &["slug"]),
    ("uniq_industries_slug", Target::Industries, &["slug"]),
    ("uniq_experts_name_title", Target::Experts, &["name", "title"]),
    ("uniq_leaders_name_title", Target::Leaders, &["name", "title"]),
    ("uniq_affiliations_name", Target::Affiliations, &["name"]),
    ("uniq_affiliations_acronym", Target::Affiliations, &["acronym"]),
];

const PLAIN: &[(&str, Target, &[&str])] = &[
    ("idx_services_category", Target::Services, &["category_id"]),
    ("idx_case_studies_industry", Target::CaseStudies, &["industry_id"]),
    ("idx_case_studies_service", Target::CaseStudies, &["service_id"]),
    ("idx_insights_industry", Target::Insights, &["industry_id"]),
    ("idx_service_experts_expert", Target::ServiceExperts, &["expert_id"]),
    ("idx_industry_experts_expert", Target::IndustryExperts, &["expert_id"]),
    ("idx_experts_sort_order", Target::Experts, &["sort_order"]),
    ("idx_leaders_sort_order", Target::Leaders, &["sort_order"]),
    ("idx_contact_messages_created_at", Target::ContactMessages, &["created_at"]),
];

#[derive(Clone, Copy)]
enum Target {
    ServiceCategories,
    Services,
    Industries,
    Experts,
    Leaders,
    Affiliations,
    CaseStudies,
    Insights,
    ServiceExperts,
    IndustryExperts,
    ContactMessages,
}

impl Target {
    fn name(self) -> &'static str {
        match self {
            Target::ServiceCategories => "service_categories",
            Target::Services => "services",
            Target::Industries => "industries",
            Target::Experts => "experts",
            Target::Leaders => "leaders",
            Target::Affiliations => "affiliations",
            Target::CaseStudies => "case_studies",
            Target::Insights => "insights",
            Target::ServiceExperts => "service_experts",
            Target::IndustryExperts => "industry_experts",
            Target::ContactMessages => "contact_messages",
        }
    }
}

fn index(name: &str, table: Target, cols: &[&str], unique: bool) -> IndexCreateStatement {
    let mut stmt = Index::create();
    stmt.name(name).table(Alias::new(table.name())).if_not_exists();
    for col in cols {
        stmt.col(Alias::new(*col));
    }
    if unique {
        stmt.unique();
    }
    stmt.to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, cols) in UNIQUE {
            manager.create_index(index(name, *table, cols, true)).await?;
        }
        for (name, table, cols) in PLAIN {
            manager.create_index(index(name, *table, cols, false)).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in UNIQUE.iter().chain(PLAIN.iter()) {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(table.name())).to_owned())
                .await?;
        }
        Ok(())
    }
}
