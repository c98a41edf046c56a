use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySqlPool, Row};
use uuid::Uuid;

use crate::uuid_bin;

/// Vendor record, `vendors` table. Deletion is soft: `is_active` flips to
/// false and the row stays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub vendor_name: String,
    pub point_person: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub miles: Option<i32>,
    pub products: Option<String>,
    pub is_active: bool,
    pub is_farmer: bool,
    pub is_produce: bool,
    pub woman_owned: bool,
    pub bipoc_owned: bool,
    pub veteran_owned: bool,
}

impl FromRow<'_, MySqlRow> for Vendor {
    fn from_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        let id_bytes: Vec<u8> = row.try_get("id")?;
        let id = uuid_bin::decode(&id_bytes).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "id".into(),
            source: "vendors.id is not a 16-byte uuid".into(),
        })?;
        Ok(Self {
            id,
            vendor_name: row.try_get("vendor")?,
            point_person: row.try_get("point_person")?,
            email: row.try_get("email")?,
            location: row.try_get("location")?,
            miles: row.try_get("miles")?,
            products: row.try_get("products")?,
            is_active: row.try_get("is_active")?,
            is_farmer: row.try_get("is_farmer")?,
            is_produce: row.try_get("is_produce")?,
            woman_owned: row.try_get("woman_owned")?,
            bipoc_owned: row.try_get("bipoc_owned")?,
            veteran_owned: row.try_get("veteran_owned")?,
        })
    }
}

pub async fn insert(db: &MySqlPool, vendor: &Vendor) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO vendors (id, vendor, point_person, email, location, miles, products,
                             is_active, is_farmer, is_produce, woman_owned, bipoc_owned, veteran_owned)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid_bin::encode(vendor.id).to_vec())
    .bind(&vendor.vendor_name)
    .bind(&vendor.point_person)
    .bind(&vendor.email)
    .bind(&vendor.location)
    .bind(vendor.miles)
    .bind(&vendor.products)
    .bind(vendor.is_active)
    .bind(vendor.is_farmer)
    .bind(vendor.is_produce)
    .bind(vendor.woman_owned)
    .bind(vendor.bipoc_owned)
    .bind(vendor.veteran_owned)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update(db: &MySqlPool, vendor: &Vendor) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE vendors
        SET vendor = ?, point_person = ?, email = ?, location = ?, miles = ?, products = ?,
            is_farmer = ?, is_produce = ?, woman_owned = ?, bipoc_owned = ?, veteran_owned = ?
        WHERE id = ?
        "#,
    )
    .bind(&vendor.vendor_name)
    .bind(&vendor.point_person)
    .bind(&vendor.email)
    .bind(&vendor.location)
    .bind(vendor.miles)
    .bind(&vendor.products)
    .bind(vendor.is_farmer)
    .bind(vendor.is_produce)
    .bind(vendor.woman_owned)
    .bind(vendor.bipoc_owned)
    .bind(vendor.veteran_owned)
    .bind(uuid_bin::encode(vendor.id).to_vec())
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find_by_id(db: &MySqlPool, id: Uuid) -> sqlx::Result<Option<Vendor>> {
    sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ?")
        .bind(uuid_bin::encode(id).to_vec())
        .fetch_optional(db)
        .await
}

/// Active vendors only, ordered by name.
pub async fn find_active_paged(db: &MySqlPool, page: u32, size: u32) -> sqlx::Result<Vec<Vendor>> {
    let offset = i64::from(page) * i64::from(size);
    sqlx::query_as::<_, Vendor>(
        "SELECT * FROM vendors WHERE is_active = TRUE ORDER BY vendor LIMIT ? OFFSET ?",
    )
    .bind(i64::from(size))
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count_active(db: &MySqlPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM vendors WHERE is_active = TRUE")
        .fetch_one(db)
        .await
}

/// Soft delete: the row is kept, flagged inactive.
pub async fn soft_delete(db: &MySqlPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE vendors SET is_active = FALSE WHERE id = ?")
        .bind(uuid_bin::encode(id).to_vec())
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
