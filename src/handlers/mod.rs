use actix_web::{web, HttpResponse, ResponseError};

use crate::error::AppError;
use crate::utils::session::redirect;

pub mod admin_handler;
pub mod auth_handler;
pub mod cart_handler;
pub mod catalog_handler;
pub mod checkout_handler;

/// Turns a failed form submission into a redirect back to `back_to` with the
/// error as a flash message. Missing rows stay a real `404`.
pub(crate) fn fail(err: AppError, back_to: &str) -> HttpResponse {
    match err {
        AppError::NotFound(_) => err.error_response(),
        err => {
            if err.is_server_error() {
                log::error!("{} while handling form for {back_to}: {err:?}", err.error_code());
            }
            redirect(back_to, err.flash())
        }
    }
}

/// Every route of the food-ordering application.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth_handler::register_page)
        .service(auth_handler::register)
        .service(auth_handler::login_page)
        .service(auth_handler::login)
        .service(auth_handler::logout)
        .service(catalog_handler::index)
        .service(catalog_handler::categories)
        .service(catalog_handler::add_product_page)
        .service(catalog_handler::add_product)
        .service(catalog_handler::delete_product)
        .service(cart_handler::cart_page)
        .service(cart_handler::cart_data)
        .service(cart_handler::add_to_cart)
        .service(cart_handler::remove_item)
        .service(checkout_handler::pay)
        .service(checkout_handler::payment_callback)
        .service(admin_handler::dashboard)
        .service(admin_handler::customers)
        .service(admin_handler::edit_user_page)
        .service(admin_handler::edit_user)
        .service(admin_handler::promote_user)
        .service(admin_handler::demote_user)
        .service(admin_handler::delete_user);
}
