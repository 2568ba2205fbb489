use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::fail;
use crate::storefront::extractors::{Owner, Staff, Visitor};
use crate::storefront::service::{self, AccountForm, Assignment, CategoryForm, INVALID_CREDENTIALS};
use crate::storefront::StorefrontState;
use crate::utils::session::{redirect, removal_cookie, render, session_cookie, Flash, SESSION_COOKIE};

#[get("/")]
pub async fn home(
    req: HttpRequest,
    state: web::Data<StorefrontState>,
    visitor: Visitor,
) -> AppResult<HttpResponse> {
    let listed = service::list_categories(state.store.as_ref()).await?;
    let session = visitor
        .0
        .map(|claims| json!({ "user_id": claims.user_id(), "role": claims.role() }));

    Ok(render(
        &req,
        &json!({ "categories": listed, "session": session }),
    ))
}

#[get("/sign")]
pub async fn sign_page(req: HttpRequest) -> HttpResponse {
    render(&req, &json!({}))
}

#[post("/sign")]
pub async fn sign(state: web::Data<StorefrontState>, form: web::Form<AccountForm>) -> HttpResponse {
    let account = match service::sign_in(state.store.as_ref(), form.into_inner()).await {
        Ok(account) => account,
        Err(AppError::Unauthenticated(_)) => {
            return redirect("/sign", Flash::danger(INVALID_CREDENTIALS))
        }
        Err(err) => return fail(err, "/sign"),
    };

    match state.sessions.issue(account.id, account.role) {
        Ok(token) => {
            let mut response = redirect("/", Flash::success("Signed in successfully!"));
            if let Err(err) =
                response.add_cookie(&session_cookie(token, state.sessions.ttl_hours()))
            {
                return fail(AppError::Internal(err.to_string()), "/sign");
            }
            response
        }
        Err(err) => fail(err, "/sign"),
    }
}

#[get("/register")]
pub async fn register_page(req: HttpRequest) -> HttpResponse {
    render(&req, &json!({}))
}

#[post("/register")]
pub async fn register(
    state: web::Data<StorefrontState>,
    form: web::Form<AccountForm>,
) -> HttpResponse {
    match service::register(state.store.as_ref(), form.into_inner()).await {
        Ok(_) => redirect("/sign", Flash::success("Registration successful! Please sign in.")),
        Err(err) => fail(err, "/register"),
    }
}

#[get("/payment")]
pub async fn payment(req: HttpRequest) -> HttpResponse {
    render(&req, &json!({}))
}

#[get("/categories")]
pub async fn categories(
    req: HttpRequest,
    state: web::Data<StorefrontState>,
    _staff: Staff,
) -> AppResult<HttpResponse> {
    let listed = service::list_categories(state.store.as_ref()).await?;
    Ok(render(&req, &json!({ "categories": listed })))
}

/// Adds a category and answers with the updated listing.
#[post("/categories")]
pub async fn create_category(
    req: HttpRequest,
    state: web::Data<StorefrontState>,
    _staff: Staff,
    form: web::Form<CategoryForm>,
) -> HttpResponse {
    let store = state.store.as_ref();
    let created = match service::create_category(store, form.into_inner()).await {
        Ok(category) => category,
        Err(err) => return fail(err, "/categories"),
    };

    match service::list_categories(store).await {
        Ok(listed) => render(
            &req,
            &json!({ "created": created, "categories": listed }),
        ),
        Err(err) => fail(err, "/categories"),
    }
}

#[get("/users")]
pub async fn users(
    req: HttpRequest,
    state: web::Data<StorefrontState>,
    _owner: Owner,
) -> AppResult<HttpResponse> {
    let accounts = service::list_accounts(state.store.as_ref()).await?;
    Ok(render(&req, &json!({ "users": accounts })))
}

#[post("/assign_admin/{id}")]
pub async fn assign_admin(
    state: web::Data<StorefrontState>,
    owner: Owner,
    path: web::Path<i32>,
) -> HttpResponse {
    let id = path.into_inner();
    match service::assign_admin(state.store.as_ref(), id).await {
        Ok(Assignment::Promoted(_)) => {
            log::info!("Account {id} promoted by {}", owner.sub);
            redirect("/users", Flash::success("User promoted to admin."))
        }
        Ok(Assignment::Unchanged(account)) => redirect(
            "/users",
            Flash::warning(format!(
                "User '{}' already has administrative rights.",
                account.email
            )),
        ),
        Err(err) => fail(err, "/users"),
    }
}

#[get("/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(removal_cookie(SESSION_COOKIE))
        .finish()
}

/// Every route of the storefront application.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(sign_page)
        .service(sign)
        .service(register_page)
        .service(register)
        .service(payment)
        .service(categories)
        .service(create_category)
        .service(users)
        .service(assign_admin)
        .service(logout);
}
