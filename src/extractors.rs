use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use futures_util::future::LocalBoxFuture;
use std::ops::Deref;
use thiserror::Error;

use crate::error::AppError;
use crate::models::user_model::User;
use crate::state::AppState;
use crate::utils::session::{redirect, Flash, SESSION_COOKIE};

/// Rejection of a guarded route: a redirect carrying a flash message.
#[derive(Debug, Error)]
#[error("{}", .flash.message)]
pub struct AuthRedirect {
    pub location: &'static str,
    pub flash: Flash,
}

impl AuthRedirect {
    pub fn sign_in(location: &'static str) -> Self {
        Self {
            location,
            flash: Flash::warning("Please log in to continue."),
        }
    }

    pub fn admins_only(location: &'static str) -> Self {
        Self {
            location,
            flash: Flash::error("Access denied. Admins only."),
        }
    }
}

impl ResponseError for AuthRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        redirect(self.location, self.flash.clone())
    }
}

/// Failure while resolving the identity of a request.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Redirect(#[from] AuthRedirect),
    #[error(transparent)]
    App(#[from] AppError),
}

impl ResponseError for IdentityError {
    fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Redirect(redirect) => redirect.status_code(),
            IdentityError::App(err) => err.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            IdentityError::Redirect(redirect) => redirect.error_response(),
            IdentityError::App(err) => err.error_response(),
        }
    }
}

/// Re-reads the user behind the session cookie so role changes and
/// deletions apply on the very next request.
async fn current_user(req: HttpRequest) -> Result<Option<User>, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(AppError::Internal("application state missing".to_string()));
    };
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Some(user_id) = state
        .sessions
        .read(cookie.value())
        .and_then(|claims| claims.user_id())
    else {
        return Ok(None);
    };
    state.store.find_user(user_id).await
}

async fn signed_in(req: HttpRequest) -> Result<SignedIn, IdentityError> {
    match current_user(req).await? {
        Some(user) => Ok(SignedIn(user)),
        None => Err(AuthRedirect::sign_in("/login").into()),
    }
}

async fn admin_user(req: HttpRequest) -> Result<AdminUser, IdentityError> {
    match current_user(req).await? {
        Some(user) if user.is_admin() => Ok(AdminUser(user)),
        Some(_) => Err(AuthRedirect::admins_only("/").into()),
        None => Err(AuthRedirect::sign_in("/login").into()),
    }
}

/// The signed-in user, if there is one.
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
    type Error = IdentityError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = current_user(req).await?;
            Ok::<_, IdentityError>(MaybeUser(user))
        })
    }
}

/// A signed-in user; anonymous requests are sent to `/login`.
pub struct SignedIn(pub User);

impl FromRequest for SignedIn {
    type Error = IdentityError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(signed_in(req.clone()))
    }
}

impl Deref for SignedIn {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A signed-in admin or super-admin; anyone else is sent home.
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = IdentityError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(admin_user(req.clone()))
    }
}

impl Deref for AdminUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
