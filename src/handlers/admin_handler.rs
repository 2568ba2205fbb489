use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::AppResult;
use crate::extractors::AdminUser;
use crate::handlers::fail;
use crate::services::admin::{self, EditUserForm, RoleChange};
use crate::services::cart;
use crate::state::AppState;
use crate::utils::session::{redirect, render, Flash};

const DASHBOARD: &str = "/admin/dashboard";

#[get("/admin/dashboard")]
pub async fn dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
    admin: AdminUser,
) -> AppResult<HttpResponse> {
    let store = state.store.as_ref();
    let view = admin::dashboard(store).await?;
    let cart_count = cart::count(store, Some(&admin.0)).await?;

    Ok(render(
        &req,
        &json!({
            "user": admin.0,
            "cart_count": cart_count,
            "users": view.users,
            "customers": view.customers,
            "total_users": view.total_users,
            "total_orders": view.total_orders,
            "burger": view.catalog.burger,
            "pizza": view.catalog.pizza,
            "taco": view.catalog.taco,
            "dessert": view.catalog.dessert,
        }),
    ))
}

#[get("/customers")]
pub async fn customers(
    req: HttpRequest,
    state: web::Data<AppState>,
    _admin: AdminUser,
) -> AppResult<HttpResponse> {
    let orders = admin::list_orders(state.store.as_ref()).await?;
    Ok(render(&req, &json!({ "customers": orders })))
}

#[get("/admin/edit_user/{id}")]
pub async fn edit_user_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<i32>,
) -> HttpResponse {
    match admin::user_for_edit(state.store.as_ref(), &admin, path.into_inner()).await {
        Ok(target) => render(&req, &json!({ "user": admin.0, "users": target })),
        Err(err) => fail(err, DASHBOARD),
    }
}

#[post("/admin/edit_user/{id}")]
pub async fn edit_user(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<i32>,
    form: web::Form<EditUserForm>,
) -> HttpResponse {
    let id = path.into_inner();
    match admin::edit_user(state.store.as_ref(), &admin, id, form.into_inner()).await {
        Ok(user) => redirect(
            DASHBOARD,
            Flash::success(format!("User '{}' info updated successfully!", user.email)),
        ),
        Err(err) => fail(err, &format!("/admin/edit_user/{id}")),
    }
}

#[post("/admin/promote_user/{id}")]
pub async fn promote_user(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<i32>,
) -> HttpResponse {
    match admin::promote_to_admin(state.store.as_ref(), &admin, path.into_inner()).await {
        Ok(RoleChange::Changed(user)) => redirect(
            DASHBOARD,
            Flash::success(format!("User '{}' promoted to admin.", user.email)),
        ),
        Ok(RoleChange::Unchanged(user)) => redirect(
            DASHBOARD,
            Flash::warning(format!("User '{}' is already an admin.", user.email)),
        ),
        Err(err) => fail(err, DASHBOARD),
    }
}

#[post("/admin/demote_user/{id}")]
pub async fn demote_user(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<i32>,
) -> HttpResponse {
    match admin::demote_from_admin(state.store.as_ref(), &admin, path.into_inner()).await {
        Ok(RoleChange::Changed(user)) => redirect(
            DASHBOARD,
            Flash::success(format!(
                "User '{}' demoted successfully (admin privileges removed).",
                user.email
            )),
        ),
        Ok(RoleChange::Unchanged(user)) => redirect(
            DASHBOARD,
            Flash::warning(format!("User '{}' is not an admin.", user.email)),
        ),
        Err(err) => fail(err, DASHBOARD),
    }
}

#[post("/admin/delete_user/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<i32>,
) -> HttpResponse {
    match admin::delete_user(state.store.as_ref(), &admin, path.into_inner()).await {
        Ok(user) => redirect(
            DASHBOARD,
            Flash::success(format!("User '{}' deleted successfully!", user.email)),
        ),
        Err(err) => fail(err, DASHBOARD),
    }
}
