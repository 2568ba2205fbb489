use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::product_model::{CatalogView, Category, NewProduct, Product};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub category: String,
    pub name: String,
    pub image_url: String,
    pub price: String,
}

pub fn parse_category(value: &str, message: &str) -> AppResult<Category> {
    value
        .parse()
        .map_err(|_| AppError::Validation(message.to_string()))
}

/// Non-negative, finite decimal.
pub fn parse_price(value: &str) -> AppResult<f64> {
    match value.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(AppError::Validation(
            "Invalid price entered. Must be a non-negative number.".to_string(),
        )),
    }
}

pub async fn list_products(store: &dyn Store, category: Option<Category>) -> AppResult<Vec<Product>> {
    store.list_products(category).await
}

pub async fn catalog(store: &dyn Store, category: Option<Category>) -> AppResult<CatalogView> {
    Ok(CatalogView::group(store.list_products(category).await?))
}

pub async fn create_product(store: &dyn Store, form: ProductForm) -> AppResult<Product> {
    let category = parse_category(&form.category, "Invalid product category selected.")?;
    let price = parse_price(&form.price)?;
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Product name is required.".to_string()));
    }

    let product = store
        .create_product(NewProduct {
            category,
            name: name.to_string(),
            image_url: form.image_url.trim().to_string(),
            price,
        })
        .await?;

    log::info!("Added {} '{}' ({})", category.as_str(), product.name, product.id);
    Ok(product)
}

pub async fn delete_product(store: &dyn Store, category: &str, id: i32) -> AppResult<Product> {
    let category = parse_category(category, "Invalid product category.")?;
    let product = store
        .delete_product(category, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

    log::info!("Deleted {} '{}' ({})", category.as_str(), product.name, product.id);
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn form(category: &str, name: &str, price: &str) -> ProductForm {
        ProductForm {
            category: category.to_string(),
            name: name.to_string(),
            image_url: "https://img.example/p.jpg".to_string(),
            price: price.to_string(),
        }
    }

    #[test]
    fn price_must_be_a_non_negative_number() {
        assert_eq!(parse_price("4.50").unwrap(), 4.5);
        assert_eq!(parse_price("0").unwrap(), 0.0);
        assert!(parse_price("-1").is_err());
        assert!(parse_price("ten").is_err());
        assert!(parse_price("NaN").is_err());
        assert!(parse_price("inf").is_err());
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let store = InMemoryStore::new();
        assert!(create_product(&store, form("Sushi", "Roll", "5")).await.is_err());
        assert!(create_product(&store, form("Pizza", "Margherita", "-5"))
            .await
            .is_err());
        assert!(create_product(&store, form("Pizza", "Margherita", "abc"))
            .await
            .is_err());
        assert!(list_products(&store, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_filterable() {
        let store = InMemoryStore::new();
        let first = create_product(&store, form("Pizza", "Margherita", "9.5"))
            .await
            .unwrap();
        create_product(&store, form("Taco", "Al Pastor", "3.5"))
            .await
            .unwrap();
        let third = create_product(&store, form("Pizza", "Pepperoni", "11"))
            .await
            .unwrap();

        let pizzas = list_products(&store, Some(Category::Pizza)).await.unwrap();
        assert_eq!(
            pizzas.iter().map(|p| p.id).collect::<Vec<_>>(),
            [third.id, first.id]
        );

        let view = catalog(&store, None).await.unwrap();
        assert_eq!(view.pizza.len(), 2);
        assert_eq!(view.taco.len(), 1);
    }

    #[tokio::test]
    async fn delete_checks_category_and_existence() {
        let store = InMemoryStore::new();
        let taco = create_product(&store, form("Taco", "Al Pastor", "3.5"))
            .await
            .unwrap();

        assert!(matches!(
            delete_product(&store, "Sushi", taco.id).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            delete_product(&store, "Pizza", taco.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(
            delete_product(&store, "Taco", taco.id).await.unwrap().id,
            taco.id
        );
        assert!(matches!(
            delete_product(&store, "Taco", taco.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
