use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::cart_model::{CartItem, CartSnapshot, NewCartItem};
use crate::models::user_model::User;
use crate::services::catalog::parse_price;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartForm {
    pub product_name: String,
    pub price: String,
    #[serde(default)]
    pub quantity: Option<String>,
}

fn parse_quantity(value: Option<&str>) -> AppResult<i32> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("1");
    match value.parse::<i32>() {
        Ok(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(AppError::Validation(
            "Quantity must be a whole number of at least 1.".to_string(),
        )),
    }
}

pub async fn add_item(store: &dyn Store, user: &User, form: AddToCartForm) -> AppResult<CartItem> {
    let product_name = form.product_name.trim();
    if product_name.is_empty() {
        return Err(AppError::Validation("Product name is required.".to_string()));
    }
    let price = parse_price(&form.price)?;
    let quantity = parse_quantity(form.quantity.as_deref())?;

    store
        .add_cart_item(
            user.cart_id,
            NewCartItem {
                product_name: product_name.to_string(),
                price,
                quantity,
            },
        )
        .await
}

/// Returns the number of lines left in the caller's cart.
pub async fn remove_item(store: &dyn Store, user: &User, item_id: i32) -> AppResult<usize> {
    if !store.remove_cart_item(user.cart_id, item_id).await? {
        return Err(AppError::NotFound("Item not found in your cart.".to_string()));
    }
    Ok(store.load_cart(user.cart_id).await?.count())
}

pub async fn snapshot(store: &dyn Store, user: &User) -> AppResult<CartSnapshot> {
    let cart = store.load_cart(user.cart_id).await?;
    Ok(CartSnapshot::from(&cart))
}

pub async fn count(store: &dyn Store, user: Option<&User>) -> AppResult<usize> {
    match user {
        Some(user) => Ok(store.load_cart(user.cart_id).await?.count()),
        None => Ok(0),
    }
}
