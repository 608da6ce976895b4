use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use super::setup_test_db;
use crate::partner;

fn partner_am(name: &str) -> partner::ActiveModel {
    let now = Utc::now();
    partner::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        image: Set("https://cdn.example.com/logo.png".into()),
        sort_order: Set(1),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

/// Test basic transaction commit
#[tokio::test]
async fn test_transaction_commit() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let txn = db.begin().await?;
    let created = partner_am(&format!("tx_commit_{}", Uuid::new_v4())).insert(&txn).await?;
    txn.commit().await?;

    let found = partner::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());

    partner::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

/// Test transaction rollback
#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let txn = db.begin().await?;
    let created = partner_am(&format!("tx_rollback_{}", Uuid::new_v4())).insert(&txn).await?;
    txn.rollback().await?;

    let found = partner::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_none());
    Ok(())
}
