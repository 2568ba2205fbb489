use std::sync::Arc;

use crate::store::Store;
use crate::utils::auth::SessionKeys;
use crate::utils::paystack::PaymentGateway;

/// Shared by every request of the food app through `web::Data`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub sessions: SessionKeys,
    pub paystack_public_key: String,
    pub app_base_url: Option<String>,
}
