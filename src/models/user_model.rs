use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// The permanent super-admin of the food app.
pub const SUPER_ADMIN_ID: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    #[serde(rename = "superadmin")]
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// Admin routes are open to admins and the super-admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_super_admin(&self) -> bool {
        *self == Role::SuperAdmin
    }
}

/// A food-app user together with the cart created alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub cart_id: i32,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(FromRow)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub cart_id: i32,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_db(&row.role)
            .ok_or_else(|| AppError::Internal(format!("unknown role '{}'", row.role)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            phone: row.phone,
            email: row.email,
            password_hash: row.password,
            role,
            cart_id: row.cart_id,
        })
    }
}

/// Phone numbers are exactly 11 ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 11 && phone.bytes().all(|b| b.is_ascii_digit())
}
