use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Burger,
    Pizza,
    Taco,
    Dessert,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Burger,
        Category::Pizza,
        Category::Taco,
        Category::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Burger => "Burger",
            Category::Pizza => "Pizza",
            Category::Taco => "Taco",
            Category::Dessert => "Dessert",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i32,
    pub category: Category,
    pub name: String,
    pub image_url: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category: Category,
    pub name: String,
    pub image_url: String,
    pub price: f64,
}

#[derive(FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub category: String,
    pub name: String,
    pub image: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|_| AppError::Internal(format!("unknown category '{}'", row.category)))?;
        Ok(Product {
            id: row.id,
            category,
            name: row.name,
            image_url: row.image,
            price: row.price,
            created_at: row.created_at,
        })
    }
}

/// Catalog page layout: one newest-first list per category.
#[derive(Debug, Default, Serialize)]
pub struct CatalogView {
    pub burger: Vec<Product>,
    pub pizza: Vec<Product>,
    pub taco: Vec<Product>,
    pub dessert: Vec<Product>,
}

impl CatalogView {
    /// Keeps the incoming order within each category.
    pub fn group(products: Vec<Product>) -> Self {
        let mut view = CatalogView::default();
        for product in products {
            match product.category {
                Category::Burger => view.burger.push(product),
                Category::Pizza => view.pizza.push(product),
                Category::Taco => view.taco.push(product),
                Category::Dessert => view.dessert.push(product),
            }
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_exact() {
        assert_eq!("Pizza".parse::<Category>(), Ok(Category::Pizza));
        assert!("pizza".parse::<Category>().is_err());
        assert!("Sushi".parse::<Category>().is_err());
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn grouping_preserves_order() {
        let now = Utc::now();
        let product = |id, category| Product {
            id,
            category,
            name: format!("item {id}"),
            image_url: String::new(),
            price: 1.0,
            created_at: now,
        };
        let view = CatalogView::group(vec![
            product(3, Category::Taco),
            product(2, Category::Burger),
            product(1, Category::Taco),
        ]);
        assert_eq!(view.taco.iter().map(|p| p.id).collect::<Vec<_>>(), [3, 1]);
        assert_eq!(view.burger.len(), 1);
        assert!(view.pizza.is_empty() && view.dessert.is_empty());
    }
}
