use sqlx::MySqlPool;
use uuid::Uuid;

use crate::uuid_bin;

pub async fn find_label_ids(db: &MySqlPool, vendor_id: Uuid) -> sqlx::Result<Vec<i64>> {
    sqlx::query_scalar("SELECT label_id FROM vendor_category_labels WHERE vendor_id = ?")
        .bind(uuid_bin::encode(vendor_id).to_vec())
        .fetch_all(db)
        .await
}

/// Tags a vendor with each label id. `INSERT IGNORE` makes re-tagging
/// idempotent; an empty list is a no-op.
pub async fn add_labels(db: &MySqlPool, vendor_id: Uuid, label_ids: &[i64]) -> sqlx::Result<()> {
    if label_ids.is_empty() {
        return Ok(());
    }
    let vendor_bytes = uuid_bin::encode(vendor_id).to_vec();
    let mut tx = db.begin().await?;
    for label_id in label_ids {
        sqlx::query("INSERT IGNORE INTO vendor_category_labels (vendor_id, label_id) VALUES (?, ?)")
            .bind(&vendor_bytes)
            .bind(*label_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

pub async fn remove_label(db: &MySqlPool, vendor_id: Uuid, label_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM vendor_category_labels WHERE vendor_id = ? AND label_id = ?")
        .bind(uuid_bin::encode(vendor_id).to_vec())
        .bind(label_id)
        .execute(db)
        .await?;
    Ok(())
}
