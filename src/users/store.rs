use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::uuid_bin;

/// Identity record backing authentication. `id` is `None` only before the
/// first save; rows loaded from the store always carry one.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Option<Uuid>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Credential store seam. The SQL implementation is the production one; tests
/// swap in an in-memory store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Empty, never an error, when no row matches.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Inserts with a fresh random id when `user.id` is unset, updates the
    /// matching row otherwise. Errors unless exactly one row was written.
    async fn save(&self, user: User) -> anyhow::Result<User>;

    /// Unconditional hard delete. Not wired to any endpoint; kept as a
    /// primitive for administrative tooling.
    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<()>;
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Vec<u8>,
    email: String,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> anyhow::Result<Self> {
        let id = uuid_bin::decode(&row.id)
            .with_context(|| format!("users.id for {} is not a 16-byte uuid", row.email))?;
        Ok(Self {
            id: Some(id),
            email: row.email,
            password_hash: row.password_hash,
        })
    }
}

/// `users` table access over `BINARY(16)` ids. Email uniqueness is enforced
/// solely by the column's unique constraint; a duplicate insert surfaces as a
/// database error.
#[derive(Clone)]
pub struct SqlUserStore {
    db: MySqlPool,
}

impl SqlUserStore {
    pub fn new(db: MySqlPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SqlUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash FROM users WHERE id = ?",
        )
        .bind(uuid_bin::encode(id).to_vec())
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn save(&self, mut user: User) -> anyhow::Result<User> {
        match user.id {
            None => {
                let id = Uuid::new_v4();
                let result =
                    sqlx::query("INSERT INTO users (id, email, password_hash) VALUES (?, ?, ?)")
                        .bind(uuid_bin::encode(id).to_vec())
                        .bind(&user.email)
                        .bind(&user.password_hash)
                        .execute(&self.db)
                        .await?;
                if result.rows_affected() != 1 {
                    anyhow::bail!("failed to insert user record");
                }
                user.id = Some(id);
                debug!(user_id = %id, email = %user.email, "user inserted");
                Ok(user)
            }
            Some(id) => {
                let result =
                    sqlx::query("UPDATE users SET email = ?, password_hash = ? WHERE id = ?")
                        .bind(&user.email)
                        .bind(&user.password_hash)
                        .bind(uuid_bin::encode(id).to_vec())
                        .execute(&self.db)
                        .await?;
                if result.rows_affected() != 1 {
                    anyhow::bail!("failed to update user record");
                }
                debug!(user_id = %id, email = %user.email, "user updated");
                Ok(user)
            }
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(uuid_bin::encode(id).to_vec())
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Seeds an initial account when `BOOTSTRAP_EMAIL`/`BOOTSTRAP_PASSWORD` are
/// configured and the email is not already present. There is no registration
/// endpoint, so this is the only production write path into `users`.
pub async fn ensure_bootstrap_user(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    if store.find_by_email(email).await?.is_some() {
        debug!(email = %email, "bootstrap user already present");
        return Ok(());
    }
    let password_hash = crate::auth::password::hash_password(password)?;
    let user = store
        .save(User {
            id: None,
            email: email.to_string(),
            password_hash,
        })
        .await?;
    info!(user_id = ?user.id, email = %email, "bootstrap user created");
    Ok(())
}
