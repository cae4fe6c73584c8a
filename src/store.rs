//! Credential store - persistence of user records
//!
//! The store hands out immutable `User` snapshots; mutation happens only
//! through explicit `update` calls. Login uniqueness is enforced by the
//! store itself (a UNIQUE constraint in Postgres), and a violation at
//! write time is the authoritative registration conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::error::AuthError;

/// User record snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub hashed_password: String,
    pub balance: i64,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied on registration; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub hashed_password: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;
    /// Insert a new record and return it with its assigned id. Fails with
    /// `UserExists` on a login conflict.
    async fn insert(&self, user: NewUser) -> Result<User, AuthError>;
    async fn update(&self, user: &User) -> Result<(), AuthError>;
}

/// Postgres-backed store used in production.
pub struct PgUserStore {
    db_pool: PgPool,
}

impl PgUserStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AuthError> {
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, hashed_password, balance, is_verified, created_at)
            VALUES ($1, $2, 0, FALSE, $3)
            RETURNING *
            "#,
        )
        .bind(&user.login)
        .bind(&user.hashed_password)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await;

        match inserted {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::UserExists(user.login))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, user: &User) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            UPDATE users
            SET login = $2, hashed_password = $3, balance = $4, is_verified = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.login)
        .bind(&user.hashed_password)
        .bind(user.balance)
        .bind(user.is_verified)
        .execute(&self.db_pool)
        .await?;
        Ok(())
    }
}

/// In-memory store for tests and local development.
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(users.iter().find(|u| u.login == login).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if users.iter().any(|u| u.login == user.login) {
            return Err(AuthError::UserExists(user.login));
        }
        let record = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            login: user.login,
            hashed_password: user.hashed_password,
            balance: 0,
            is_verified: false,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn update(&self, user: &User) -> Result<(), AuthError> {
        let mut users = self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(AuthError::UserNotFound),
        }
    }
}
