use crate::error::{AppError, AppResult};
use crate::models::auth_model::{RegisterForm, SignInForm};
use crate::models::user_model::{is_valid_phone, NewUser, Role, User, SUPER_ADMIN_ID};
use crate::store::Store;
use crate::utils::auth::{hash_password, verify_password};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Every rule is checked before anything is written.
pub async fn register(store: &dyn Store, form: RegisterForm) -> AppResult<User> {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();

    if email.is_empty() {
        return Err(AppError::Validation("Email is required!".to_string()));
    }
    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("Email already exists.".to_string()));
    }
    if username.is_empty() {
        return Err(AppError::Validation("Username is required!".to_string()));
    }
    if store.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::Validation("User already exists.".to_string()));
    }
    if !is_valid_phone(&form.phone) {
        return Err(AppError::Validation(
            "Phone number is invalid (must be 11 digits and contain only numbers).".to_string(),
        ));
    }
    if form.password != form.confirm {
        return Err(AppError::Validation("Password does not match".to_string()));
    }

    let user = store
        .create_user_with_cart(NewUser {
            username,
            phone: form.phone,
            email,
            password_hash: hash_password(&form.password)?,
        })
        .await?;

    log::info!("Registered user {} ({})", user.id, user.email);
    Ok(user)
}

/// Unknown email and wrong password fail identically.
pub async fn sign_in(store: &dyn Store, form: SignInForm) -> AppResult<User> {
    let email = form.email.trim();
    let mut user = match store.find_user_by_email(email).await? {
        Some(user) if verify_password(&user.password_hash, &form.password) => user,
        _ => {
            log::warn!("Failed sign-in for {email}");
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }
    };

    if user.id == SUPER_ADMIN_ID && !user.is_super_admin() {
        user.role = Role::SuperAdmin;
        store.update_user(&user).await?;
        log::info!("User {} promoted to super-admin on first sign-in", user.id);
    }

    log::info!("User {} signed in", user.id);
    Ok(user)
}
