use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use std::ops::Deref;

use crate::extractors::AuthRedirect;
use crate::models::user_model::Role;
use crate::storefront::StorefrontState;
use crate::utils::auth::Claims;
use crate::utils::session::{Flash, SESSION_COOKIE};

/// The storefront trusts the role cached in the session token.
fn claims(req: &HttpRequest) -> Option<Claims> {
    let state = req.app_data::<web::Data<StorefrontState>>()?;
    let cookie = req.cookie(SESSION_COOKIE)?;
    state.sessions.read(cookie.value())
}

fn to_sign_in() -> AuthRedirect {
    AuthRedirect {
        location: "/sign",
        flash: Flash::warning("Please sign in to continue."),
    }
}

fn require(req: &HttpRequest, allowed: fn(Role) -> bool) -> Result<Claims, AuthRedirect> {
    match claims(req) {
        Some(claims) if allowed(claims.role()) => Ok(claims),
        _ => Err(to_sign_in()),
    }
}

/// Session claims of whoever is browsing, if signed in.
pub struct Visitor(pub Option<Claims>);

impl FromRequest for Visitor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Visitor(claims(req))))
    }
}

/// Admin or super-admin.
pub struct Staff(pub Claims);

impl FromRequest for Staff {
    type Error = AuthRedirect;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(require(req, |role| role.is_admin()).map(Staff))
    }
}

/// The super-admin only.
pub struct Owner(pub Claims);

impl FromRequest for Owner {
    type Error = AuthRedirect;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(require(req, |role| role.is_super_admin()).map(Owner))
    }
}

impl Deref for Owner {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
