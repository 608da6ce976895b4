use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use super::setup_test_db;
use crate::{case_study, expert, industry, insight, service, service_category, service_expert};

fn industry_am(slug: &str) -> industry::ActiveModel {
    let now = Utc::now();
    industry::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(slug.to_string()),
        name: Set("Energy".into()),
        description: Set("Energy sector advisory".into()),
        is_active: Set(true),
        sort_order: Set(1),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

fn expert_am(name: &str, title: &str) -> expert::ActiveModel {
    let now = Utc::now();
    expert::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        title: Set(title.to_string()),
        bio: Set("Audit partner".into()),
        image: Set(String::new()),
        location: Set("Lagos".into()),
        experience: Set(12),
        projects_led: Set(40),
        linkedin_url: Set(None),
        email: Set(None),
        phone: Set(None),
        education: Set(vec!["BSc Accounting".into(), "MBA".into()]),
        specialties: Set(vec![]),
        professional_membership: Set(vec!["ICAN".into()]),
        sort_order: Set(1),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

fn case_study_am(industry_id: Option<Uuid>, service_id: Option<Uuid>) -> case_study::ActiveModel {
    let now = Utc::now();
    case_study::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Grid modernisation".into()),
        description: Set("d".repeat(60)),
        impact: Set("Reduced losses by 12%".into()),
        impact_level: Set(case_study::ImpactLevel::High),
        display_order: Set(1),
        is_active: Set(true),
        industry_id: Set(industry_id),
        service_id: Set(service_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

#[tokio::test]
async fn text_arrays_round_trip() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let name = format!("Array Expert {}", Uuid::new_v4());
    let created = expert_am(&name, "Partner").insert(&db).await?;
    let found = expert::Entity::find_by_id(created.id).one(&db).await?.unwrap();
    assert_eq!(found.education, vec!["BSc Accounting".to_string(), "MBA".to_string()]);
    assert!(found.specialties.is_empty());
    expert::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn deleting_industry_cascades_to_case_studies_and_insights() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let ind = industry_am(&format!("energy-{}", Uuid::new_v4())).insert(&db).await?;
    case_study_am(Some(ind.id), None).insert(&db).await?;
    case_study_am(Some(ind.id), None).insert(&db).await?;
    let now = Utc::now();
    insight::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Outlook".into()),
        content: Set("c".repeat(120)),
        image: Set(String::new()),
        view_count: Set(0),
        display_order: Set(1),
        is_active: Set(true),
        industry_id: Set(Some(ind.id)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;

    industry::Entity::delete_by_id(ind.id).exec(&db).await?;

    let left = case_study::Entity::find()
        .filter(case_study::Column::IndustryId.eq(ind.id))
        .count(&db)
        .await?;
    assert_eq!(left, 0);
    let left = insight::Entity::find()
        .filter(insight::Column::IndustryId.eq(ind.id))
        .count(&db)
        .await?;
    assert_eq!(left, 0);
    Ok(())
}

#[tokio::test]
async fn duplicate_slug_is_rejected_by_unique_index() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let slug = format!("dup-{}", Uuid::new_v4());
    let first = industry_am(&slug).insert(&db).await?;
    let second = industry_am(&slug).insert(&db).await;
    assert!(second.is_err());
    industry::Entity::delete_by_id(first.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_expert_name_title_is_rejected() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let name = format!("Dup Expert {}", Uuid::new_v4());
    let first = expert_am(&name, "Director").insert(&db).await?;
    assert!(expert_am(&name, "Director").insert(&db).await.is_err());
    // same name with another title is fine
    let other = expert_am(&name, "Manager").insert(&db).await?;
    expert::Entity::delete_many()
        .filter(expert::Column::Id.is_in([first.id, other.id]))
        .exec(&db)
        .await?;
    Ok(())
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted_and_links_cascade() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let now = Utc::now();
    let cat = service_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(format!("cat-{}", Uuid::new_v4())),
        name: Set("Assurance".into()),
        description: Set(None),
        is_active: Set(true),
        sort_order: Set(1),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    let svc = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(format!("svc-{}", Uuid::new_v4())),
        name: Set("External Audit".into()),
        description: Set("s".repeat(60)),
        category_id: Set(Some(cat.id)),
        is_active: Set(true),
        sort_order: Set(1),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    let exp = expert_am(&format!("Linked {}", Uuid::new_v4()), "Partner").insert(&db).await?;
    service_expert::ActiveModel {
        service_id: Set(svc.id),
        expert_id: Set(exp.id),
        created_at: Set(now.into()),
    }
    .insert(&db)
    .await?;

    assert!(service_category::Entity::delete_by_id(cat.id).exec(&db).await.is_err());

    service::Entity::delete_by_id(svc.id).exec(&db).await?;
    let links = service_expert::Entity::find()
        .filter(service_expert::Column::ExpertId.eq(exp.id))
        .count(&db)
        .await?;
    assert_eq!(links, 0);

    service_category::Entity::delete_by_id(cat.id).exec(&db).await?;
    expert::Entity::delete_by_id(exp.id).exec(&db).await?;
    Ok(())
}
