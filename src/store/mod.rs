//! Persistence seam for the food app.
//!
//! Every method is one atomic unit against the store: the Postgres
//! implementation wraps multi-row changes in a transaction, the in-memory
//! one holds a single lock for the whole call.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::cart_model::{Cart, CartItem, NewCartItem};
use crate::models::order_model::Order;
use crate::models::product_model::{Category, NewProduct, Product};
use crate::models::user_model::{NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: i32) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Inserts the user and its empty cart together.
    async fn create_user_with_cart(&self, user: NewUser) -> AppResult<User>;

    /// Persists `phone`, `email` and `role` of an existing user.
    async fn update_user(&self, user: &User) -> AppResult<()>;

    /// Deletes the cart's items, the cart, then the user. False if no such user.
    async fn delete_user_with_cart(&self, id: i32) -> AppResult<bool>;

    /// Newest first, optionally limited to one category.
    async fn list_products(&self, category: Option<Category>) -> AppResult<Vec<Product>>;
    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;
    /// Returns the deleted product, or None when `id` is not in `category`.
    async fn delete_product(&self, category: Category, id: i32) -> AppResult<Option<Product>>;

    async fn load_cart(&self, cart_id: i32) -> AppResult<Cart>;

    /// Increments the quantity of the line with the same product name, or
    /// inserts a new line.
    async fn add_cart_item(&self, cart_id: i32, item: NewCartItem) -> AppResult<CartItem>;

    /// False when the item does not exist or belongs to another cart.
    async fn remove_cart_item(&self, cart_id: i32, item_id: i32) -> AppResult<bool>;

    /// Records one sale summarizing the cart and empties it. Returns None,
    /// writing nothing, when the cart is already empty.
    async fn complete_checkout(
        &self,
        cart_id: i32,
        email: &str,
        phone: &str,
    ) -> AppResult<Option<Order>>;

    /// Newest first.
    async fn list_orders(&self) -> AppResult<Vec<Order>>;
}
