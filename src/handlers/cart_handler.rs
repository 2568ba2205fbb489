use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extractors::SignedIn;
use crate::handlers::fail;
use crate::services::cart::{self, AddToCartForm};
use crate::state::AppState;
use crate::utils::session::{redirect, render, Flash};

/// AJAX callers (the cart overlay) get JSON instead of a redirect.
fn is_programmatic(req: &HttpRequest) -> bool {
    let ajax = req
        .headers()
        .get("X-Requested-With")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "XMLHttpRequest");
    let json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    ajax || json
}

#[get("/cart")]
pub async fn cart_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: SignedIn,
) -> AppResult<HttpResponse> {
    let snapshot = cart::snapshot(state.store.as_ref(), &user).await?;

    Ok(render(
        &req,
        &json!({
            "email": user.email,
            "cart_count": snapshot.count,
            "cart": snapshot,
            "paystack_public_key": state.paystack_public_key,
        }),
    ))
}

#[get("/api/cart_data")]
pub async fn cart_data(state: web::Data<AppState>, user: SignedIn) -> AppResult<HttpResponse> {
    let snapshot = cart::snapshot(state.store.as_ref(), &user).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/add_to_cart")]
pub async fn add_to_cart(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: SignedIn,
    form: web::Form<AddToCartForm>,
) -> HttpResponse {
    let back_to = req
        .headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("/categories");

    match cart::add_item(state.store.as_ref(), &user, form.into_inner()).await {
        Ok(item) => redirect(
            back_to,
            Flash::success(format!("{} added to cart!", item.product_name)),
        ),
        Err(err) => fail(err, back_to),
    }
}

#[post("/remove_item/{id}")]
pub async fn remove_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: SignedIn,
    path: web::Path<i32>,
) -> HttpResponse {
    let result = cart::remove_item(state.store.as_ref(), &user, path.into_inner()).await;

    if is_programmatic(&req) {
        return match result {
            Ok(new_count) => HttpResponse::Ok().json(json!({
                "status": "success",
                "message": "Item removed.",
                "new_count": new_count,
            })),
            Err(AppError::NotFound(_)) => HttpResponse::NotFound().json(json!({
                "status": "error",
                "message": "Item not found.",
            })),
            Err(err) => fail(err, "/cart"),
        };
    }

    match result {
        Ok(_) => redirect("/cart", Flash::success("Item removed from cart.")),
        Err(AppError::NotFound(message)) => redirect("/cart", Flash::error(message)),
        Err(err) => fail(err, "/cart"),
    }
}
