//! The categorized-product storefront: accounts with a cached role, a flat
//! list of categories, and a super-admin who hands out admin rights.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::user_model::Role;
use crate::utils::auth::SessionKeys;

pub mod extractors;
pub mod handlers;
pub mod service;
pub mod store;

pub use store::{InMemoryStorefrontStore, PgStorefrontStore};

/// Shared by every request of the storefront through `web::Data`.
pub struct StorefrontState {
    pub store: Arc<dyn StorefrontStore>,
    pub sessions: SessionKeys,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

#[derive(FromRow)]
pub struct AccountRow {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::from_db(&row.role)
            .ok_or_else(|| AppError::Internal(format!("unknown role '{}'", row.role)))?;
        Ok(Account {
            id: row.id,
            email: row.email,
            password_hash: row.password,
            role,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub image_url: String,
}

#[async_trait]
pub trait StorefrontStore: Send + Sync {
    async fn find_account(&self, id: i32) -> AppResult<Option<Account>>;
    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>>;
    async fn list_accounts(&self) -> AppResult<Vec<Account>>;

    /// Inserts the account as super-admin when the table is empty, as a
    /// plain user otherwise. Duplicate emails are a validation error.
    async fn create_account(&self, email: &str, password_hash: &str) -> AppResult<Account>;

    async fn set_role(&self, id: i32, role: Role) -> AppResult<()>;

    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn create_category(&self, name: &str, image_url: &str) -> AppResult<Category>;
}
