use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::extractors::{AdminUser, MaybeUser};
use crate::handlers::fail;
use crate::models::product_model::Category;
use crate::services::catalog::{self, parse_category, ProductForm};
use crate::services::cart;
use crate::state::AppState;
use crate::utils::session::{redirect, render, Flash};

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[get("/")]
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: MaybeUser,
) -> AppResult<HttpResponse> {
    let user = user.0;
    let cart_count = cart::count(state.store.as_ref(), user.as_ref()).await?;

    Ok(render(
        &req,
        &json!({
            "username": user.as_ref().map(|u| u.username.clone()),
            "user": user,
            "cart_count": cart_count,
        }),
    ))
}

#[get("/categories")]
pub async fn categories(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: MaybeUser,
    query: web::Query<CategoryQuery>,
) -> HttpResponse {
    let filter = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(value) => match parse_category(value, "Invalid product category.") {
            Ok(category) => Some(category),
            Err(err) => return fail(err, "/"),
        },
        None => None,
    };

    let store = state.store.as_ref();
    let view = match catalog::catalog(store, filter).await {
        Ok(view) => view,
        Err(err) => return fail(err, "/"),
    };
    let cart_count = match cart::count(store, user.0.as_ref()).await {
        Ok(count) => count,
        Err(err) => return fail(err, "/"),
    };

    render(
        &req,
        &json!({
            "user": user.0,
            "cart_count": cart_count,
            "burger": view.burger,
            "pizza": view.pizza,
            "taco": view.taco,
            "dessert": view.dessert,
        }),
    )
}

#[get("/add_product")]
pub async fn add_product_page(req: HttpRequest, admin: AdminUser) -> HttpResponse {
    render(
        &req,
        &json!({
            "user": admin.0,
            "categories": Category::ALL.map(|c| c.as_str()),
        }),
    )
}

#[post("/add_product")]
pub async fn add_product(
    state: web::Data<AppState>,
    _admin: AdminUser,
    form: web::Form<ProductForm>,
) -> HttpResponse {
    match catalog::create_product(state.store.as_ref(), form.into_inner()).await {
        Ok(_) => redirect("/admin/dashboard", Flash::success("Product added successfully!")),
        Err(err) => fail(err, "/add_product"),
    }
}

#[post("/admin/delete_product/{category}/{id}")]
pub async fn delete_product(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<(String, i32)>,
) -> HttpResponse {
    let (category, id) = path.into_inner();
    match catalog::delete_product(state.store.as_ref(), &category, id).await {
        Ok(product) => redirect(
            "/admin/dashboard",
            Flash::success(format!(
                "{} '{}' deleted successfully!",
                product.category.as_str(),
                product.name
            )),
        ),
        Err(err) => fail(err, "/admin/dashboard"),
    }
}
