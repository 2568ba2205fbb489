use actix_web::http::header;
use actix_web::{get, post, route, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::extractors::{MaybeUser, SignedIn};
use crate::handlers::fail;
use crate::models::auth_model::{RegisterForm, SignInForm};
use crate::services::identity;
use crate::state::AppState;
use crate::utils::session::{redirect, removal_cookie, render, session_cookie, Flash, SESSION_COOKIE};

#[get("/register")]
pub async fn register_page(req: HttpRequest, user: MaybeUser) -> HttpResponse {
    render(&req, &json!({ "user": user.0 }))
}

#[post("/register")]
pub async fn register(state: web::Data<AppState>, form: web::Form<RegisterForm>) -> HttpResponse {
    match identity::register(state.store.as_ref(), form.into_inner()).await {
        Ok(_) => redirect("/login", Flash::success("Account created! Please log in.")),
        Err(err) => fail(err, "/register"),
    }
}

#[get("/login")]
pub async fn login_page(req: HttpRequest, user: MaybeUser) -> HttpResponse {
    render(&req, &json!({ "user": user.0 }))
}

#[post("/login")]
pub async fn login(state: web::Data<AppState>, form: web::Form<SignInForm>) -> HttpResponse {
    let user = match identity::sign_in(state.store.as_ref(), form.into_inner()).await {
        Ok(user) => user,
        Err(AppError::Unauthenticated(msg)) => return redirect("/login", Flash::error(msg)),
        Err(err) => return fail(err, "/login"),
    };

    match state.sessions.issue(user.id, user.role) {
        Ok(token) => HttpResponse::Found()
            .insert_header((header::LOCATION, "/"))
            .cookie(session_cookie(token, state.sessions.ttl_hours()))
            .finish(),
        Err(err) => fail(err, "/login"),
    }
}

#[route("/logout", method = "GET", method = "POST")]
pub async fn logout(user: SignedIn) -> HttpResponse {
    log::info!("User {} signed out", user.id);
    let mut response = redirect("/login", Flash::success("You have been logged out."));
    if let Err(err) = response.add_cookie(&removal_cookie(SESSION_COOKIE)) {
        log::warn!("Could not clear session cookie: {err}");
    }
    response
}
