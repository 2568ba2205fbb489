#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::TestRequest;
use actix_web::web;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dinehub::error::{AppError, AppResult};
use dinehub::models::user_model::Role;
use dinehub::state::AppState;
use dinehub::store::{InMemoryStore, Store};
use dinehub::utils::auth::{hash_password, SessionKeys};
use dinehub::utils::paystack::{InitializeTransaction, PaymentGateway};
use dinehub::utils::session::{Flash, FLASH_COOKIE, SESSION_COOKIE};

pub const CHECKOUT_URL: &str = "https://checkout.paystack.test/abc123";

/// Gateway double whose answers are set by the test.
#[derive(Default)]
pub struct ScriptedGateway {
    pub refuse_initialize: AtomicBool,
    pub verified: AtomicBool,
    pub initialized: Mutex<Vec<InitializeTransaction>>,
    pub verifications: AtomicUsize,
}

impl ScriptedGateway {
    pub fn verifying(verified: bool) -> Self {
        let gateway = Self::default();
        gateway.verified.store(verified, Ordering::SeqCst);
        gateway
    }

    pub fn initialized(&self) -> Vec<InitializeTransaction> {
        self.initialized.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize(&self, request: &InitializeTransaction) -> AppResult<String> {
        if self.refuse_initialize.load(Ordering::SeqCst) {
            return Err(AppError::Gateway(
                "Payment initialization failed. Try again.".to_string(),
            ));
        }
        self.initialized.lock().unwrap().push(request.clone());
        Ok(CHECKOUT_URL.to_string())
    }

    async fn verify(&self, _reference: &str) -> AppResult<bool> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        Ok(self.verified.load(Ordering::SeqCst))
    }
}

pub struct FoodHarness {
    pub state: web::Data<AppState>,
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<ScriptedGateway>,
}

pub fn food_harness(gateway: ScriptedGateway) -> FoodHarness {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(gateway);
    let state = web::Data::new(AppState {
        store: store.clone(),
        gateway: gateway.clone(),
        sessions: SessionKeys::new("integration-secret", 1),
        paystack_public_key: "pk_test_123".to_string(),
        app_base_url: Some("http://food.test".to_string()),
    });
    FoodHarness {
        state,
        store,
        gateway,
    }
}

pub fn register_request(username: &str, email: &str, phone: &str) -> TestRequest {
    TestRequest::post().uri("/register").set_form([
        ("usr", username),
        ("phone", phone),
        ("email", email),
        ("password", "p1"),
        ("rep_password", "p1"),
    ])
}

pub fn login_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .set_form([("email", email), ("password", password)])
}

/// Registers straight through the store and gives the account a role.
pub async fn seed_user(store: &InMemoryStore, username: &str, role: Role) -> i32 {
    let mut user = store
        .create_user_with_cart(dinehub::models::user_model::NewUser {
            username: username.to_string(),
            phone: "07012345678".to_string(),
            email: format!("{username}@x.com"),
            password_hash: hash_password("p1").unwrap(),
        })
        .await
        .unwrap();
    if role != Role::User {
        user.role = role;
        store.update_user(&user).await.unwrap();
    }
    user.id
}

pub fn cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.into_owned())
}

pub fn session<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    cookie(resp, SESSION_COOKIE).expect("response should set the session cookie")
}

pub fn flash<B>(resp: &ServiceResponse<B>) -> Option<Flash> {
    cookie(resp, FLASH_COOKIE).and_then(|cookie| Flash::decode(cookie.value()))
}

pub fn flash_message<B>(resp: &ServiceResponse<B>) -> String {
    flash(resp).map(|flash| flash.message).unwrap_or_default()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
