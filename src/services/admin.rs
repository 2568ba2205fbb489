use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::order_model::Order;
use crate::models::product_model::CatalogView;
use crate::models::user_model::{is_valid_phone, Role, User, SUPER_ADMIN_ID};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub users: Vec<User>,
    pub customers: Vec<Order>,
    pub total_users: usize,
    pub total_orders: usize,
    pub catalog: CatalogView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditUserForm {
    pub phone: String,
    pub email: String,
    /// Checkbox: present means "admin".
    #[serde(default)]
    pub is_admin: Option<String>,
}

/// Result of a promote/demote request that passed every permission check.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleChange {
    Changed(User),
    /// The target already had the requested role.
    Unchanged(User),
}

pub async fn dashboard(store: &dyn Store) -> AppResult<DashboardView> {
    let users = store.list_users().await?;
    let customers = store.list_orders().await?;
    let catalog = CatalogView::group(store.list_products(None).await?);

    Ok(DashboardView {
        total_users: users.len(),
        total_orders: customers.len(),
        users,
        customers,
        catalog,
    })
}

pub async fn list_orders(store: &dyn Store) -> AppResult<Vec<Order>> {
    store.list_orders().await
}

async fn target(store: &dyn Store, id: i32) -> AppResult<User> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
}

fn require_super_admin(actor: &User) -> AppResult<()> {
    if actor.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the Super Admin can change administrative roles.".to_string(),
        ))
    }
}

pub async fn promote_to_admin(store: &dyn Store, actor: &User, id: i32) -> AppResult<RoleChange> {
    if id == SUPER_ADMIN_ID {
        return Err(AppError::Forbidden(
            "Cannot change the Super Admin's role.".to_string(),
        ));
    }
    require_super_admin(actor)?;

    let mut user = target(store, id).await?;
    if user.role != Role::User {
        return Ok(RoleChange::Unchanged(user));
    }

    user.role = Role::Admin;
    store.update_user(&user).await?;
    log::info!("User {} promoted to admin by {}", user.id, actor.id);
    Ok(RoleChange::Changed(user))
}

pub async fn demote_from_admin(store: &dyn Store, actor: &User, id: i32) -> AppResult<RoleChange> {
    if id == SUPER_ADMIN_ID {
        return Err(AppError::Forbidden("Cannot demote the Super Admin.".to_string()));
    }
    require_super_admin(actor)?;

    let mut user = target(store, id).await?;
    if user.role != Role::Admin {
        return Ok(RoleChange::Unchanged(user));
    }

    user.role = Role::User;
    store.update_user(&user).await?;
    log::info!("User {} demoted by {}", user.id, actor.id);
    Ok(RoleChange::Changed(user))
}

/// Loads a user for the edit page, applying the same guard as `edit_user`.
pub async fn user_for_edit(store: &dyn Store, actor: &User, id: i32) -> AppResult<User> {
    let user = target(store, id).await?;
    guard_super_admin_record(actor, &user)?;
    Ok(user)
}

fn guard_super_admin_record(actor: &User, target: &User) -> AppResult<()> {
    if (target.is_super_admin() || target.id == SUPER_ADMIN_ID) && !actor.is_super_admin() {
        return Err(AppError::Forbidden(
            "Access denied. Only the Super Admin can edit Super Admin details.".to_string(),
        ));
    }
    Ok(())
}

pub async fn edit_user(
    store: &dyn Store,
    actor: &User,
    id: i32,
    form: EditUserForm,
) -> AppResult<User> {
    let mut user = target(store, id).await?;
    guard_super_admin_record(actor, &user)?;

    let phone = form.phone.trim().to_string();
    let email = form.email.trim().to_string();
    if !is_valid_phone(&phone) {
        return Err(AppError::Validation(
            "Phone number is invalid (must be 11 digits and contain only numbers).".to_string(),
        ));
    }
    if email.is_empty() {
        return Err(AppError::Validation("Email is required!".to_string()));
    }
    if let Some(owner) = store.find_user_by_email(&email).await? {
        if owner.id != user.id {
            return Err(AppError::Validation("Email already exists.".to_string()));
        }
    }

    user.phone = phone;
    user.email = email;
    if actor.is_super_admin() && !user.is_super_admin() {
        user.role = if form.is_admin.is_some() {
            Role::Admin
        } else {
            Role::User
        };
    }

    store.update_user(&user).await?;
    log::info!("User {} updated by {}", user.id, actor.id);
    Ok(user)
}

/// Removes the user together with their cart and its lines.
pub async fn delete_user(store: &dyn Store, actor: &User, id: i32) -> AppResult<User> {
    if id == SUPER_ADMIN_ID {
        return Err(AppError::Forbidden(
            "Cannot delete the Super Admin user.".to_string(),
        ));
    }
    if !actor.is_super_admin() {
        return Err(AppError::Forbidden(
            "Only the Super Admin can delete users.".to_string(),
        ));
    }

    let user = target(store, id).await?;
    if !store.delete_user_with_cart(id).await? {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    log::info!("User {} ({}) deleted by {}", user.id, user.email, actor.id);
    Ok(user)
}
