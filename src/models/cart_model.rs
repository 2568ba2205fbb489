use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_name: String,
    pub price: f64,
    pub quantity: i32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

pub const QUANTITY_TOO_LARGE: &str = "That quantity is too large for one cart line.";

#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub product_name: String,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: i32,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One row of the cart as the page and `/api/cart_data` show it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub total: f64,
    pub count: usize,
}

impl CartSnapshot {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0.0,
            count: 0,
        }
    }
}

impl From<&Cart> for CartSnapshot {
    fn from(cart: &Cart) -> Self {
        let items = cart
            .items
            .iter()
            .map(|item| CartLine {
                id: item.id,
                name: item.product_name.clone(),
                price: item.price,
                quantity: item.quantity,
                subtotal: round2(item.line_total()),
            })
            .collect();

        Self {
            items,
            total: round2(cart.total_cost()),
            count: cart.count(),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
