//! Expert assignments on services and industries (`service_experts`,
//! `industry_experts`).

use std::collections::HashSet;

use sea_orm::{
    sea_query::{OnConflict, Query, SelectStatement},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{expert, industry, industry_expert, service, service_expert};

use crate::{errors::ServiceError, guards};

/// The taxonomy node experts are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Service(Uuid),
    Industry(Uuid),
}

impl Owner {
    fn label(self) -> &'static str {
        match self {
            Owner::Service(_) => "Service",
            Owner::Industry(_) => "Industry",
        }
    }

    fn expert_ids(self) -> SelectStatement {
        match self {
            Owner::Service(id) => Query::select()
                .column(service_expert::Column::ExpertId)
                .from(service_expert::Entity)
                .and_where(service_expert::Column::ServiceId.eq(id))
                .to_owned(),
            Owner::Industry(id) => Query::select()
                .column(industry_expert::Column::ExpertId)
                .from(industry_expert::Entity)
                .and_where(industry_expert::Column::IndustryId.eq(id))
                .to_owned(),
        }
    }
}

/// 404 unless the owning service/industry exists.
pub async fn ensure_owner<C: ConnectionTrait>(conn: &C, owner: Owner) -> Result<(), ServiceError> {
    match owner {
        Owner::Service(id) => guards::require::<service::Entity, _>(conn, id, "Service").await.map(|_| ()),
        Owner::Industry(id) => guards::require::<industry::Entity, _>(conn, id, "Industry").await.map(|_| ()),
    }
}

/// Attached experts ordered by their display position.
pub async fn experts_of<C: ConnectionTrait>(conn: &C, owner: Owner) -> Result<Vec<expert::Model>, ServiceError> {
    Ok(expert::Entity::find()
        .filter(expert::Column::Id.in_subquery(owner.expert_ids()))
        .order_by_asc(expert::Column::SortOrder)
        .order_by_asc(expert::Column::Name)
        .order_by_asc(expert::Column::Id)
        .all(conn)
        .await?)
}

pub async fn count_experts<C: ConnectionTrait>(conn: &C, owner: Owner) -> Result<u64, ServiceError> {
    let n = match owner {
        Owner::Service(id) => {
            service_expert::Entity::find().filter(service_expert::Column::ServiceId.eq(id)).count(conn).await?
        }
        Owner::Industry(id) => {
            industry_expert::Entity::find().filter(industry_expert::Column::IndustryId.eq(id)).count(conn).await?
        }
    };
    Ok(n)
}

/// Every id in `ids` must name an existing expert.
pub async fn ensure_experts_exist<C: ConnectionTrait>(conn: &C, ids: &[Uuid]) -> Result<(), ServiceError> {
    let wanted: HashSet<Uuid> = ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(());
    }
    let found = expert::Entity::find()
        .select_only()
        .column(expert::Column::Id)
        .filter(expert::Column::Id.is_in(wanted.iter().copied()))
        .into_tuple::<Uuid>()
        .all(conn)
        .await?;
    if found.len() != wanted.len() {
        return Err(ServiceError::invalid("expertIds", "One or more experts not found"));
    }
    Ok(())
}

/// Insert join rows, skipping pairs that already exist. Returns rows inserted.
async fn insert_links<C: ConnectionTrait>(conn: &C, owner: Owner, expert_ids: &[Uuid]) -> Result<u64, ServiceError> {
    if expert_ids.is_empty() {
        return Ok(0);
    }
    let now = crate::now();
    let inserted = match owner {
        Owner::Service(id) => {
            let rows = expert_ids.iter().map(|expert_id| service_expert::ActiveModel {
                service_id: Set(id),
                expert_id: Set(*expert_id),
                created_at: Set(now),
            });
            service_expert::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([service_expert::Column::ServiceId, service_expert::Column::ExpertId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?
        }
        Owner::Industry(id) => {
            let rows = expert_ids.iter().map(|expert_id| industry_expert::ActiveModel {
                industry_id: Set(id),
                expert_id: Set(*expert_id),
                created_at: Set(now),
            });
            industry_expert::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([industry_expert::Column::IndustryId, industry_expert::Column::ExpertId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?
        }
    };
    Ok(inserted)
}

/// Attach one expert. 404 when either side is missing, 409 when already attached.
#[instrument(skip(db))]
pub async fn attach(db: &DatabaseConnection, owner: Owner, expert_id: Uuid) -> Result<(), ServiceError> {
    ensure_owner(db, owner).await?;
    guards::require::<expert::Entity, _>(db, expert_id, "Expert").await?;
    if insert_links(db, owner, &[expert_id]).await? == 0 {
        return Err(ServiceError::Conflict(format!(
            "Expert is already assigned to this {}",
            owner.label().to_lowercase()
        )));
    }
    info!(?owner, %expert_id, "expert attached");
    Ok(())
}

/// Detach exactly the `(owner, expert)` pair.
#[instrument(skip(db))]
pub async fn detach(db: &DatabaseConnection, owner: Owner, expert_id: Uuid) -> Result<(), ServiceError> {
    ensure_owner(db, owner).await?;
    let removed = match owner {
        Owner::Service(id) => {
            service_expert::Entity::delete_many()
                .filter(service_expert::Column::ServiceId.eq(id))
                .filter(service_expert::Column::ExpertId.eq(expert_id))
                .exec(db)
                .await?
        }
        Owner::Industry(id) => {
            industry_expert::Entity::delete_many()
                .filter(industry_expert::Column::IndustryId.eq(id))
                .filter(industry_expert::Column::ExpertId.eq(expert_id))
                .exec(db)
                .await?
        }
    };
    if removed.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Expert is not assigned to this {}",
            owner.label().to_lowercase()
        )));
    }
    info!(?owner, %expert_id, "expert detached");
    Ok(())
}

/// Replace the owner's expert set. Run inside the caller's transaction.
pub async fn replace<C: ConnectionTrait>(conn: &C, owner: Owner, expert_ids: &[Uuid]) -> Result<(), ServiceError> {
    ensure_experts_exist(conn, expert_ids).await?;
    match owner {
        Owner::Service(id) => {
            service_expert::Entity::delete_many().filter(service_expert::Column::ServiceId.eq(id)).exec(conn).await?;
        }
        Owner::Industry(id) => {
            industry_expert::Entity::delete_many().filter(industry_expert::Column::IndustryId.eq(id)).exec(conn).await?;
        }
    }
    insert_links(conn, owner, expert_ids).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{catalog_service, expert_service, industry_service};
    use crate::test_support::get_db;

    #[tokio::test]
    async fn attach_twice_conflicts_and_detach_is_exact() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let svc = catalog_service::tests::create_service(&db).await?.service;
        let industry = industry_service::tests::create_industry(&db).await?;
        let a = expert_service::tests::create_expert(&db).await?;
        let b = expert_service::tests::create_expert(&db).await?;

        attach(&db, Owner::Service(svc.id), a.id).await?;
        attach(&db, Owner::Service(svc.id), b.id).await?;
        attach(&db, Owner::Industry(industry.id), a.id).await?;
        let err = attach(&db, Owner::Service(svc.id), a.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(count_experts(&db, Owner::Service(svc.id)).await?, 2);

        detach(&db, Owner::Service(svc.id), a.id).await?;
        let left: Vec<Uuid> = experts_of(&db, Owner::Service(svc.id)).await?.into_iter().map(|e| e.id).collect();
        assert_eq!(left, vec![b.id]);
        // the industry link is untouched
        assert_eq!(count_experts(&db, Owner::Industry(industry.id)).await?, 1);

        let err = detach(&db, Owner::Service(svc.id), a.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = attach(&db, Owner::Service(Uuid::new_v4()), a.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = attach(&db, Owner::Service(svc.id), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        service::Entity::delete_by_id(svc.id).exec(&db).await?;
        industry::Entity::delete_by_id(industry.id).exec(&db).await?;
        expert::Entity::delete_many().filter(expert::Column::Id.is_in([a.id, b.id])).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_set() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let industry = industry_service::tests::create_industry(&db).await?;
        let a = expert_service::tests::create_expert(&db).await?;
        let b = expert_service::tests::create_expert(&db).await?;

        replace(&db, Owner::Industry(industry.id), &[a.id]).await?;
        replace(&db, Owner::Industry(industry.id), &[b.id]).await?;
        let ids: Vec<Uuid> = experts_of(&db, Owner::Industry(industry.id)).await?.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b.id]);

        let err = replace(&db, Owner::Industry(industry.id), &[Uuid::new_v4()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        industry::Entity::delete_by_id(industry.id).exec(&db).await?;
        expert::Entity::delete_many().filter(expert::Column::Id.is_in([a.id, b.id])).exec(&db).await?;
        Ok(())
    }
}
