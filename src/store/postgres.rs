use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::{is_numeric_overflow, is_unique_violation, AppError, AppResult};
use crate::models::cart_model::{Cart, CartItem, NewCartItem, QUANTITY_TOO_LARGE};
use crate::models::order_model::{Order, OrderDraft};
use crate::models::product_model::{Category, NewProduct, Product, ProductRow};
use crate::models::user_model::{NewUser, Role, User, UserRow};
use crate::store::Store;

const USER_COLUMNS: &str = "SELECT u.id, u.username, u.phone, u.email, u.password, u.role, c.id AS cart_id \
     FROM users u JOIN cart c ON c.user_id = u.id";

const ITEM_COLUMNS: &str = "id, cart_id, product_name, price, quantity";

const ORDER_COLUMNS: &str = "id, email, phone, product, quantity, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations/food").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_user(&self, filter: &str, bind: UserKey<'_>) -> AppResult<Option<User>> {
        let sql = format!("{USER_COLUMNS} WHERE {filter}");
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let row = match bind {
            UserKey::Id(id) => query.bind(id).fetch_optional(&self.pool).await?,
            UserKey::Text(value) => query.bind(value).fetch_optional(&self.pool).await?,
        };
        row.map(User::try_from).transpose()
    }
}

enum UserKey<'a> {
    Id(i32),
    Text(&'a str),
}

fn duplicate_user(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        let message = match &err {
            sqlx::Error::Database(db_err)
                if db_err.constraint().is_some_and(|c| c.contains("username")) =>
            {
                "User already exists."
            }
            _ => "Email already exists.",
        };
        AppError::Validation(message.to_string())
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        self.fetch_user("u.id = $1", UserKey::Id(id)).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.fetch_user("u.email = $1", UserKey::Text(email)).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.fetch_user("u.username = $1", UserKey::Text(username))
            .await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let sql = format!("{USER_COLUMNS} ORDER BY u.id");
        sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn create_user_with_cart(&self, user: NewUser) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO users (username, phone, email, password, role) \
             VALUES ($1, $2, $3, $4, 'user') RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_user)?;

        let (cart_id,): (i32,) =
            sqlx::query_as("INSERT INTO cart (user_id) VALUES ($1) RETURNING id")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(User {
            id,
            username: user.username,
            phone: user.phone,
            email: user.email,
            password_hash: user.password_hash,
            role: Role::User,
            cart_id,
        })
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        sqlx::query("UPDATE users SET phone = $1, email = $2, role = $3 WHERE id = $4")
            .bind(&user.phone)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(duplicate_user)?;
        Ok(())
    }

    async fn delete_user_with_cart(&self, id: i32) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM cart_item WHERE cart_id IN (SELECT id FROM cart WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn list_products(&self, category: Option<Category>) -> AppResult<Vec<Product>> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ProductRow>(
                    "SELECT id, category, name, image, price, created_at FROM products \
                     WHERE category = $1 ORDER BY created_at DESC, id DESC",
                )
                .bind(category.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(
                    "SELECT id, category, name, image, price, created_at FROM products \
                     ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (category, name, image, price) VALUES ($1, $2, $3, $4) \
             RETURNING id, category, name, image, price, created_at",
        )
        .bind(product.category.as_str())
        .bind(&product.name)
        .bind(&product.image_url)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await?;
        Product::try_from(row)
    }

    async fn delete_product(&self, category: Category, id: i32) -> AppResult<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(
            "DELETE FROM products WHERE id = $1 AND category = $2 \
             RETURNING id, category, name, image, price, created_at",
        )
        .bind(id)
        .bind(category.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    async fn load_cart(&self, cart_id: i32) -> AppResult<Cart> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM cart_item WHERE cart_id = $1 ORDER BY id"
        ))
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Cart { id: cart_id, items })
    }

    async fn add_cart_item(&self, cart_id: i32, item: NewCartItem) -> AppResult<CartItem> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM cart_item WHERE cart_id = $1 AND product_name = $2 ORDER BY id LIMIT 1",
        )
        .bind(cart_id)
        .bind(&item.product_name)
        .fetch_optional(&mut *tx)
        .await?;

        let merged = match existing {
            Some((id,)) => sqlx::query_as::<_, CartItem>(&format!(
                "UPDATE cart_item SET quantity = quantity + $1 WHERE id = $2 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(item.quantity)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|err| {
                if is_numeric_overflow(&err) {
                    AppError::Validation(QUANTITY_TOO_LARGE.to_string())
                } else {
                    AppError::Database(err)
                }
            })?,
            None => None,
        };

        // The matched line may have been cleared by a checkout since it was read.
        let line = match merged {
            Some(line) => line,
            None => {
                sqlx::query_as::<_, CartItem>(&format!(
                    "INSERT INTO cart_item (cart_id, product_name, price, quantity) \
                     VALUES ($1, $2, $3, $4) RETURNING {ITEM_COLUMNS}"
                ))
                .bind(cart_id)
                .bind(&item.product_name)
                .bind(item.price)
                .bind(item.quantity)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(line)
    }

    async fn remove_cart_item(&self, cart_id: i32, item_id: i32) -> AppResult<bool> {
        let removed = sqlx::query("DELETE FROM cart_item WHERE id = $1 AND cart_id = $2")
            .bind(item_id)
            .bind(cart_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    async fn complete_checkout(
        &self,
        cart_id: i32,
        email: &str,
        phone: &str,
    ) -> AppResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        // Locked lines are the ones summarized and cleared; lines added while
        // the order is written stay in the cart.
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM cart_item WHERE cart_id = $1 ORDER BY id FOR UPDATE"
        ))
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if items.is_empty() {
            tx.rollback().await?;
            return Ok(None);
        }

        let draft = OrderDraft::from_items(email, phone, &items);
        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO customers (email, phone, product, quantity) VALUES ($1, $2, $3, $4) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.product)
        .bind(draft.quantity)
        .fetch_one(&mut *tx)
        .await?;

        let ids: Vec<i32> = items.iter().map(|item| item.id).collect();
        sqlx::query("DELETE FROM cart_item WHERE cart_id = $1 AND id = ANY($2)")
            .bind(cart_id)
            .bind(ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(order))
    }

    async fn list_orders(&self) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM customers ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}
