use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// A registered account, one row of the `usuarios` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum SaveError {
    /// The unique index on `usuarios.email` rejected the write. Concurrent
    /// registrations with the same email land here instead of both
    /// succeeding.
    #[error("email already taken")]
    EmailTaken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM usuarios
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Exact match; at most one row given the unique index.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM usuarios
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Upsert: no id inserts a new row with a fresh uuid and both timestamps
    /// set to now; an id rewrites every field and refreshes `updated_at`
    /// only. Timestamps are written here, not by column defaults.
    pub async fn save(
        db: &PgPool,
        id: Option<Uuid>,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, SaveError> {
        let now = OffsetDateTime::now_utc();
        let result = match id {
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO usuarios (id, name, email, password_hash, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $5)
                    RETURNING id, name, email, password_hash, created_at, updated_at
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(name)
                .bind(email)
                .bind(password_hash)
                .bind(now)
                .fetch_one(db)
                .await
            }
            Some(id) => {
                sqlx::query_as::<_, User>(
                    r#"
                    UPDATE usuarios
                    SET name = $2, email = $3, password_hash = $4, updated_at = $5
                    WHERE id = $1
                    RETURNING id, name, email, password_hash, created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(name)
                .bind(email)
                .bind(password_hash)
                .bind(now)
                .fetch_one(db)
                .await
            }
        };

        result.map_err(|e| {
            if is_unique_violation(&e) {
                SaveError::EmailTaken
            } else {
                SaveError::Database(e)
            }
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}
