use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::{Mutex, MutexGuard};

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::user_model::Role;
use crate::storefront::{Account, AccountRow, Category, StorefrontStore};

const ACCOUNT_COLUMNS: &str = "id, email, password, role";

#[derive(Clone)]
pub struct PgStorefrontStore {
    pool: PgPool,
}

impl PgStorefrontStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations/storefront").run(&self.pool).await?;
        Ok(())
    }
}

fn duplicate_account(err: sqlx::Error) -> AppError {
    if !is_unique_violation(&err) {
        return AppError::Database(err);
    }
    match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some("accounts_email_key") => {
            AppError::Validation("Email already exists.".to_string())
        }
        // Two first registrations raced for the super-admin slot.
        _ => AppError::Validation("Registration conflicted. Please try again.".to_string()),
    }
}

#[async_trait]
impl StorefrontStore for PgStorefrontStore {
    async fn find_account(&self, id: i32) -> AppResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id");
        sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    async fn create_account(&self, email: &str, password_hash: &str) -> AppResult<Account> {
        let sql = format!(
            "INSERT INTO accounts (email, password, role) \
             SELECT $1, $2, CASE WHEN EXISTS (SELECT 1 FROM accounts) THEN 'user' ELSE 'superadmin' END \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(duplicate_account)?;
        Account::try_from(row)
    }

    async fn set_role(&self, id: i32, role: Role) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, image_url FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn create_category(&self, name: &str, image_url: &str) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, image_url) VALUES ($1, $2) RETURNING id, name, image_url",
        )
        .bind(name)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }
}

/// Storefront tables held in memory behind one lock.
#[derive(Default)]
pub struct InMemoryStorefrontStore {
    state: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    categories: Vec<Category>,
    next_account_id: i32,
    next_category_id: i32,
}

impl InMemoryStorefrontStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl StorefrontStore for InMemoryStorefrontStore {
    async fn find_account(&self, id: i32) -> AppResult<Option<Account>> {
        Ok(self.lock()?.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        Ok(self
            .lock()?
            .accounts
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        Ok(self.lock()?.accounts.clone())
    }

    async fn create_account(&self, email: &str, password_hash: &str) -> AppResult<Account> {
        let mut tables = self.lock()?;
        if tables.accounts.iter().any(|a| a.email == email) {
            return Err(AppError::Validation("Email already exists.".to_string()));
        }

        let role = if tables.accounts.is_empty() {
            Role::SuperAdmin
        } else {
            Role::User
        };
        tables.next_account_id += 1;
        let account = Account {
            id: tables.next_account_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn set_role(&self, id: i32, role: Role) -> AppResult<()> {
        let mut tables = self.lock()?;
        if role.is_super_admin()
            && tables
                .accounts
                .iter()
                .any(|a| a.id != id && a.role.is_super_admin())
        {
            return Err(AppError::Internal("a super-admin already exists".to_string()));
        }
        if let Some(account) = tables.accounts.iter_mut().find(|a| a.id == id) {
            account.role = role;
        }
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.lock()?.categories.clone())
    }

    async fn create_category(&self, name: &str, image_url: &str) -> AppResult<Category> {
        let mut tables = self.lock()?;
        tables.next_category_id += 1;
        let category = Category {
            id: tables.next_category_id,
            name: name.to_string(),
            image_url: image_url.to_string(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }
}
