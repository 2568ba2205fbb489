pub mod auth;
pub mod paystack;
pub mod session;
