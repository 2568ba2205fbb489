pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod identity;
