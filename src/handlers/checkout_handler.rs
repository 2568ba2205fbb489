use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::extractors::SignedIn;
use crate::handlers::fail;
use crate::services::checkout::{self, CallbackOutcome};
use crate::state::AppState;
use crate::utils::session::{redirect, Flash};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub reference: Option<String>,
}

fn callback_url(req: &HttpRequest, state: &AppState) -> String {
    match &state.app_base_url {
        Some(base) => format!("{base}/payment/callback"),
        None => {
            let info = req.connection_info();
            format!("{}://{}/payment/callback", info.scheme(), info.host())
        }
    }
}

#[post("/pay")]
pub async fn pay(req: HttpRequest, state: web::Data<AppState>, user: SignedIn) -> HttpResponse {
    let callback = callback_url(&req, &state);
    match checkout::initiate_payment(
        state.store.as_ref(),
        state.gateway.as_ref(),
        &user,
        callback,
    )
    .await
    {
        Ok(checkout_url) => HttpResponse::Found()
            .insert_header((header::LOCATION, checkout_url))
            .finish(),
        Err(err) => fail(err, "/cart"),
    }
}

#[get("/payment/callback")]
pub async fn payment_callback(
    state: web::Data<AppState>,
    user: SignedIn,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let outcome = checkout::handle_callback(
        state.store.as_ref(),
        state.gateway.as_ref(),
        &user,
        query.reference.as_deref(),
    )
    .await;

    match outcome {
        Ok(CallbackOutcome::Recorded(_)) => redirect(
            "/cart",
            Flash::success("Payment successful! Your order has been placed. 🎉"),
        ),
        Ok(CallbackOutcome::NothingToRecord) => redirect(
            "/cart",
            Flash::warning("Nothing to record: this payment has already been processed."),
        ),
        Err(err) => fail(err, "/cart"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::utils::auth::SessionKeys;
    use crate::utils::paystack::{InitializeTransaction, PaymentGateway};
    use async_trait::async_trait;
    use actix_web::test::TestRequest;
    use std::sync::Arc;

    struct NoGateway;

    #[async_trait]
    impl PaymentGateway for NoGateway {
        async fn initialize(&self, _: &InitializeTransaction) -> crate::error::AppResult<String> {
            unreachable!()
        }

        async fn verify(&self, _: &str) -> crate::error::AppResult<bool> {
            unreachable!()
        }
    }

    fn state(app_base_url: Option<&str>) -> AppState {
        AppState {
            store: Arc::new(InMemoryStore::new()),
            gateway: Arc::new(NoGateway),
            sessions: SessionKeys::new("secret", 1),
            paystack_public_key: "pk_test".to_string(),
            app_base_url: app_base_url.map(str::to_string),
        }
    }

    #[test]
    fn callback_url_prefers_configured_origin() {
        let req = TestRequest::default()
            .insert_header((header::HOST, "shop.local:8080"))
            .to_http_request();

        assert_eq!(
            callback_url(&req, &state(Some("https://food.example"))),
            "https://food.example/payment/callback"
        );
        assert_eq!(
            callback_url(&req, &state(None)),
            "http://shop.local:8080/payment/callback"
        );
    }
}
