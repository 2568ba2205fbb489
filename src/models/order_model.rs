use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::cart_model::CartItem;

/// Immutable record of one paid checkout, stored in `customers`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub email: String,
    pub phone: String,
    pub product: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub email: String,
    pub phone: String,
    pub product: String,
    pub quantity: i32,
}

impl OrderDraft {
    /// `quantity` is the number of distinct lines, not the units bought.
    pub fn from_items(email: &str, phone: &str, items: &[CartItem]) -> Self {
        let product = items
            .iter()
            .map(|item| {
                format!(
                    "{} x{} (${})",
                    item.product_name,
                    item.quantity,
                    display_price(item.price)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            email: email.to_string(),
            phone: phone.to_string(),
            product,
            quantity: items.len() as i32,
        }
    }
}

/// Shortest decimal that reads back as `price`, with at least one fractional digit.
pub fn display_price(price: f64) -> String {
    if price.is_finite() && price.fract() == 0.0 {
        format!("{price:.1}")
    } else {
        price.to_string()
    }
}
