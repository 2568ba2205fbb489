use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use crate::error::{AppError, AppResult};
use crate::models::cart_model::{Cart, CartItem, NewCartItem, QUANTITY_TOO_LARGE};
use crate::models::order_model::{Order, OrderDraft};
use crate::models::product_model::{Category, NewProduct, Product};
use crate::models::user_model::{NewUser, Role, User};
use crate::store::Store;

/// Store kept in process memory. One mutex guards all tables, so every
/// call observes and leaves a consistent state.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    carts: Vec<(i32, i32)>, // (cart id, user id)
    items: Vec<CartItem>,
    products: Vec<Product>,
    orders: Vec<Order>,
    next_id: i32,
    next_user_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("in-memory store poisoned".to_string()))
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i32)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.lock()?.users.clone())
    }

    async fn create_user_with_cart(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Validation("Email already exists.".to_string()));
        }
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Validation("User already exists.".to_string()));
        }

        // Users are numbered on their own so the first one is id 1.
        state.next_user_id += 1;
        let id = state.next_user_id;
        let cart_id = state.next_id();
        state.carts.push((cart_id, id));

        let created = User {
            id,
            username: user.username,
            phone: user.phone,
            email: user.email,
            password_hash: user.password_hash,
            role: Role::User,
            cart_id,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        let mut state = self.lock()?;
        if state
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Validation("Email already exists.".to_string()));
        }
        if user.role.is_super_admin()
            && state
                .users
                .iter()
                .any(|u| u.id != user.id && u.role.is_super_admin())
        {
            return Err(AppError::Internal("a super-admin already exists".to_string()));
        }
        if let Some(existing) = state.users.iter_mut().find(|u| u.id == user.id) {
            existing.phone = user.phone.clone();
            existing.email = user.email.clone();
            existing.role = user.role;
        }
        Ok(())
    }

    async fn delete_user_with_cart(&self, id: i32) -> AppResult<bool> {
        let mut state = self.lock()?;
        let Some(position) = state.users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        let cart_ids: Vec<i32> = state
            .carts
            .iter()
            .filter(|(_, owner)| *owner == id)
            .map(|(cart_id, _)| *cart_id)
            .collect();
        state.items.retain(|item| !cart_ids.contains(&item.cart_id));
        state.carts.retain(|(_, owner)| *owner != id);
        state.users.remove(position);
        Ok(true)
    }

    async fn list_products(&self, category: Option<Category>) -> AppResult<Vec<Product>> {
        let state = self.lock()?;
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        newest_first(&mut products, |p| (p.created_at, p.id));
        Ok(products)
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let mut state = self.lock()?;
        let created = Product {
            id: state.next_id(),
            category: product.category,
            name: product.name,
            image_url: product.image_url,
            price: product.price,
            created_at: Utc::now(),
        };
        state.products.push(created.clone());
        Ok(created)
    }

    async fn delete_product(&self, category: Category, id: i32) -> AppResult<Option<Product>> {
        let mut state = self.lock()?;
        let position = state
            .products
            .iter()
            .position(|p| p.id == id && p.category == category);
        Ok(position.map(|i| state.products.remove(i)))
    }

    async fn load_cart(&self, cart_id: i32) -> AppResult<Cart> {
        let state = self.lock()?;
        let items = state
            .items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect();
        Ok(Cart { id: cart_id, items })
    }

    async fn add_cart_item(&self, cart_id: i32, item: NewCartItem) -> AppResult<CartItem> {
        let mut state = self.lock()?;
        if let Some(existing) = state
            .items
            .iter_mut()
            .find(|line| line.cart_id == cart_id && line.product_name == item.product_name)
        {
            existing.quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or_else(|| AppError::Validation(QUANTITY_TOO_LARGE.to_string()))?;
            return Ok(existing.clone());
        }

        let line = CartItem {
            id: state.next_id(),
            cart_id,
            product_name: item.product_name,
            price: item.price,
            quantity: item.quantity,
        };
        state.items.push(line.clone());
        Ok(line)
    }

    async fn remove_cart_item(&self, cart_id: i32, item_id: i32) -> AppResult<bool> {
        let mut state = self.lock()?;
        let before = state.items.len();
        state
            .items
            .retain(|item| !(item.id == item_id && item.cart_id == cart_id));
        Ok(state.items.len() < before)
    }

    async fn complete_checkout(
        &self,
        cart_id: i32,
        email: &str,
        phone: &str,
    ) -> AppResult<Option<Order>> {
        let mut state = self.lock()?;
        let items: Vec<CartItem> = state
            .items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect();
        if items.is_empty() {
            return Ok(None);
        }

        let draft = OrderDraft::from_items(email, phone, &items);
        let order = Order {
            id: state.next_id(),
            email: draft.email,
            phone: draft.phone,
            product: draft.product,
            quantity: draft.quantity,
            created_at: Utc::now(),
        };
        state.orders.push(order.clone());
        state.items.retain(|item| item.cart_id != cart_id);
        Ok(Some(order))
    }

    async fn list_orders(&self) -> AppResult<Vec<Order>> {
        let mut orders = self.lock()?.orders.clone();
        newest_first(&mut orders, |o| (o.created_at, o.id));
        Ok(orders)
    }
}
