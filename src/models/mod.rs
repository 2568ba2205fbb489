pub mod auth_model;
pub mod cart_model;
pub mod order_model;
pub mod product_model;
pub mod user_model;
