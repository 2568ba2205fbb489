use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::user_model::Role;
use crate::storefront::{Account, Category, StorefrontStore};
use crate::utils::auth::{hash_password, verify_password};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Used by both `/register` and `/sign`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Promoted(Account),
    /// Already admin or super-admin; nothing was written.
    Unchanged(Account),
}

pub async fn register(store: &dyn StorefrontStore, form: AccountForm) -> AppResult<Account> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required.".to_string(),
        ));
    }

    let account = store
        .create_account(email, &hash_password(&form.password)?)
        .await?;
    log::info!(
        "Registered storefront account {} as {}",
        account.id,
        account.role.as_str()
    );
    Ok(account)
}

pub async fn sign_in(store: &dyn StorefrontStore, form: AccountForm) -> AppResult<Account> {
    let email = form.email.trim();
    match store.find_account_by_email(email).await? {
        Some(account) if verify_password(&account.password_hash, &form.password) => {
            log::info!("Storefront account {} signed in", account.id);
            Ok(account)
        }
        _ => {
            log::warn!("Failed storefront sign-in for {email}");
            Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()))
        }
    }
}

pub async fn list_categories(store: &dyn StorefrontStore) -> AppResult<Vec<Category>> {
    store.list_categories().await
}

pub async fn create_category(store: &dyn StorefrontStore, form: CategoryForm) -> AppResult<Category> {
    let name = form.name.trim();
    let image_url = form.image_url.trim();
    if name.is_empty() || image_url.is_empty() {
        return Err(AppError::Validation(
            "Category name and image URL are required.".to_string(),
        ));
    }

    let category = store.create_category(name, image_url).await?;
    log::info!("Added category '{}' ({})", category.name, category.id);
    Ok(category)
}

pub async fn list_accounts(store: &dyn StorefrontStore) -> AppResult<Vec<Account>> {
    store.list_accounts().await
}

/// Grants admin to a plain user. The super-admin's own role is never rewritten.
pub async fn assign_admin(store: &dyn StorefrontStore, id: i32) -> AppResult<Assignment> {
    let mut account = store
        .find_account(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found.".to_string()))?;
    if account.role != Role::User {
        return Ok(Assignment::Unchanged(account));
    }

    store.set_role(id, Role::Admin).await?;
    account.role = Role::Admin;
    log::info!("Storefront account {id} promoted to admin");
    Ok(Assignment::Promoted(account))
}
