use crate::error::{AppError, AppResult};
use crate::models::order_model::Order;
use crate::models::user_model::User;
use crate::store::Store;
use crate::utils::paystack::{InitializeTransaction, PaymentGateway};

/// What a verified callback did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Recorded(Order),
    /// Verified, but the cart was already empty (e.g. a replayed callback).
    NothingToRecord,
}

/// Gateway amount in minor units; fractions of a minor unit are truncated.
pub fn to_minor_units(total: f64) -> i64 {
    (total * 100.0) as i64
}

fn is_valid_reference(reference: &str) -> bool {
    reference
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'='))
}

/// Returns the gateway checkout URL to send the customer to.
pub async fn initiate_payment(
    store: &dyn Store,
    gateway: &dyn PaymentGateway,
    user: &User,
    callback_url: String,
) -> AppResult<String> {
    let cart = store.load_cart(user.cart_id).await?;
    let total = cart.total_cost();
    if cart.is_empty() || total <= 0.0 {
        return Err(AppError::Validation("Your cart is empty.".to_string()));
    }

    let request = InitializeTransaction {
        email: user.email.clone(),
        amount: to_minor_units(total),
        callback_url,
    };
    let url = gateway.initialize(&request).await?;

    log::info!(
        "Payment of {} initialized for user {}",
        request.amount,
        user.id
    );
    Ok(url)
}

pub async fn handle_callback(
    store: &dyn Store,
    gateway: &dyn PaymentGateway,
    user: &User,
    reference: Option<&str>,
) -> AppResult<CallbackOutcome> {
    let reference = reference.map(str::trim).unwrap_or_default();
    if reference.is_empty() {
        return Err(AppError::Validation("Payment reference missing.".to_string()));
    }
    if !is_valid_reference(reference) {
        return Err(AppError::Validation("Invalid payment reference.".to_string()));
    }

    if !gateway.verify(reference).await? {
        log::warn!("Payment {reference} for user {} not successful", user.id);
        return Err(AppError::Gateway("Payment failed or cancelled.".to_string()));
    }

    match store
        .complete_checkout(user.cart_id, &user.email, &user.phone)
        .await?
    {
        Some(order) => {
            log::info!(
                "Recorded sale {} for user {} (reference {reference})",
                order.id,
                user.id
            );
            Ok(CallbackOutcome::Recorded(order))
        }
        None => {
            log::warn!("Payment {reference} verified but cart of user {} is empty", user.id);
            Ok(CallbackOutcome::NothingToRecord)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cart_model::NewCartItem;
    use crate::models::user_model::NewUser;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGateway {
        refuse: bool,
        verified: bool,
        initialized: Mutex<Vec<InitializeTransaction>>,
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn initialize(&self, request: &InitializeTransaction) -> AppResult<String> {
            if self.refuse {
                return Err(AppError::Gateway(
                    "Payment initialization failed. Try again.".to_string(),
                ));
            }
            self.initialized.lock().unwrap().push(request.clone());
            Ok("https://checkout.test/abc".to_string())
        }

        async fn verify(&self, _reference: &str) -> AppResult<bool> {
            Ok(self.verified)
        }
    }

    async fn customer_with(store: &InMemoryStore, lines: &[(&str, f64, i32)]) -> User {
        let user = store
            .create_user_with_cart(NewUser {
                username: "alice".to_string(),
                phone: "07012345678".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        for (name, price, quantity) in lines {
            store
                .add_cart_item(
                    user.cart_id,
                    NewCartItem {
                        product_name: name.to_string(),
                        price: *price,
                        quantity: *quantity,
                    },
                )
                .await
                .unwrap();
        }
        user
    }

    #[test]
    fn minor_units_truncate() {
        assert_eq!(to_minor_units(23.5), 2350);
        assert_eq!(to_minor_units(0.0), 0);
        assert_eq!(to_minor_units(19.999), 1999);
    }

    #[test]
    fn references_are_plain_tokens() {
        assert!(is_valid_reference("T123-abc_9.x="));
        assert!(!is_valid_reference("../bank"));
        assert!(!is_valid_reference("abc?x=1"));
    }

    #[tokio::test]
    async fn empty_cart_never_reaches_gateway() {
        let store = InMemoryStore::new();
        let gateway = FakeGateway::default();
        let user = customer_with(&store, &[]).await;

        let err = initiate_payment(&store, &gateway, &user, "http://cb".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(gateway.initialized.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn free_cart_is_treated_as_empty() {
        let store = InMemoryStore::new();
        let gateway = FakeGateway::default();
        let user = customer_with(&store, &[("Water", 0.0, 1)]).await;

        assert!(initiate_payment(&store, &gateway, &user, "http://cb".into())
            .await
            .is_err());
        assert!(gateway.initialized.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_receives_total_in_minor_units() {
        let store = InMemoryStore::new();
        let gateway = FakeGateway::default();
        let user = customer_with(&store, &[("Pizza", 10.0, 2), ("Taco", 3.5, 1)]).await;

        let url = initiate_payment(&store, &gateway, &user, "http://shop/payment/callback".into())
            .await
            .unwrap();
        assert_eq!(url, "https://checkout.test/abc");

        let sent = gateway.initialized.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            [InitializeTransaction {
                email: "alice@x.com".to_string(),
                amount: 2350,
                callback_url: "http://shop/payment/callback".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn refused_initialization_changes_nothing() {
        let store = InMemoryStore::new();
        let gateway = FakeGateway {
            refuse: true,
            ..Default::default()
        };
        let user = customer_with(&store, &[("Pizza", 10.0, 1)]).await;

        assert!(matches!(
            initiate_payment(&store, &gateway, &user, "http://cb".into()).await,
            Err(AppError::Gateway(_))
        ));
        assert_eq!(store.load_cart(user.cart_id).await.unwrap().count(), 1);
    }

    #[tokio::test]
    async fn verified_callback_records_once() {
        let store = InMemoryStore::new();
        let gateway = FakeGateway {
            verified: true,
            ..Default::default()
        };
        let user = customer_with(&store, &[("Pizza", 10.0, 2), ("Taco", 3.5, 1)]).await;

        let outcome = handle_callback(&store, &gateway, &user, Some("ref-1"))
            .await
            .unwrap();
        let CallbackOutcome::Recorded(order) = outcome else {
            panic!("expected a recorded order");
        };
        assert_eq!(order.product, "Pizza x2 ($10.0), Taco x1 ($3.5)");
        assert_eq!(order.quantity, 2);
        assert_eq!(order.phone, "07012345678");
        assert!(store.load_cart(user.cart_id).await.unwrap().is_empty());

        let replay = handle_callback(&store, &gateway, &user, Some("ref-1"))
            .await
            .unwrap();
        assert_eq!(replay, CallbackOutcome::NothingToRecord);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_or_missing_reference_changes_nothing() {
        let store = InMemoryStore::new();
        let gateway = FakeGateway::default();
        let user = customer_with(&store, &[("Pizza", 10.0, 1)]).await;

        assert!(matches!(
            handle_callback(&store, &gateway, &user, None).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            handle_callback(&store, &gateway, &user, Some("ref-2")).await,
            Err(AppError::Gateway(_))
        ));
        assert_eq!(store.load_cart(user.cart_id).await.unwrap().count(), 1);
        assert!(store.list_orders().await.unwrap().is_empty());
    }
}
