//! Catalog types: categories and products.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use tienda_core::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A category with the number of products filed under it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryWithCount {
    pub id: CategoryId,
    pub name: String,
    pub product_count: i64,
}

/// A catalog product, joined with its category name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Price in minor currency units.
    pub price: Price,
    pub stock: i32,
    pub category_id: CategoryId,
    pub category_name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether any units are available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Listing filter for the public catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
}

/// Validated product fields, ready to insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub category_id: CategoryId,
    pub image_url: Option<String>,
}

/// Raw admin product form. Numbers arrive as text so bad input can be
/// reported field by field instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub image_url: String,
}

impl ProductForm {
    /// Pre-fill the form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            category_id: product.category_id.to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }

    /// Validate into a [`ProductInput`], collecting every problem.
    ///
    /// Category existence is checked by the database foreign key.
    ///
    /// # Errors
    ///
    /// Returns the list of user-facing error messages.
    pub fn validate(&self) -> Result<ProductInput, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("El nombre es obligatorio".to_owned());
        }

        let price = self.price.parse::<Price>().ok();
        if price.is_none() {
            errors.push("El precio debe ser un entero mayor o igual a cero".to_owned());
        }

        let stock = self.stock.trim().parse::<i32>().ok().filter(|s| *s >= 0);
        if stock.is_none() {
            errors.push("El stock debe ser un entero mayor o igual a cero".to_owned());
        }

        let category_id = self.category_id.parse::<CategoryId>().ok();
        if category_id.is_none() {
            errors.push("Selecciona una categoría".to_owned());
        }

        let image_url = self.image_url.trim();
        let image_url = if image_url.is_empty() {
            None
        } else if is_acceptable_image_url(image_url) {
            Some(image_url.to_owned())
        } else {
            errors.push("La URL de la imagen debe empezar por http://, https:// o /".to_owned());
            None
        };

        match (price, stock, category_id) {
            (Some(price), Some(stock), Some(category_id)) if errors.is_empty() => {
                Ok(ProductInput {
                    name: name.to_owned(),
                    description: self.description.trim().to_owned(),
                    price,
                    stock,
                    category_id,
                    image_url,
                })
            }
            _ => Err(errors),
        }
    }
}

fn is_acceptable_image_url(url: &str) -> bool {
    if url.starts_with('/') {
        return !url.starts_with("//");
    }
    url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "  Zapatilla Runner Pro ".to_owned(),
            description: "Ligera y rápida para correr".to_owned(),
            price: "299000".to_owned(),
            stock: "20".to_owned(),
            category_id: "1".to_owned(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let input = form().validate().unwrap();
        assert_eq!(input.name, "Zapatilla Runner Pro");
        assert_eq!(input.price.minor_units(), 299_000);
        assert_eq!(input.stock, 20);
        assert_eq!(input.category_id, CategoryId::new(1));
        assert_eq!(input.image_url, None);
    }

    #[test]
    fn test_collects_all_errors() {
        let bad = ProductForm {
            name: "   ".to_owned(),
            price: "-1".to_owned(),
            stock: "many".to_owned(),
            category_id: String::new(),
            image_url: "javascript:alert(1)".to_owned(),
            ..ProductForm::default()
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_negative_stock_rejected() {
        let bad = ProductForm {
            stock: "-3".to_owned(),
            ..form()
        };
        assert_eq!(bad.validate().unwrap_err().len(), 1);
    }

    #[test]
    fn test_image_urls() {
        assert!(is_acceptable_image_url("https://cdn.example.com/a.png"));
        assert!(is_acceptable_image_url("http://cdn.example.com/a.png"));
        assert!(is_acceptable_image_url("/static/img/a.png"));
        assert!(!is_acceptable_image_url("//evil.example.com/a.png"));
        assert!(!is_acceptable_image_url("ftp://example.com/a.png"));
        assert!(!is_acceptable_image_url("not a url"));
    }

    #[test]
    fn test_image_url_kept_when_valid() {
        let with_image = ProductForm {
            image_url: " https://cdn.example.com/runner.png ".to_owned(),
            ..form()
        };
        assert_eq!(
            with_image.validate().unwrap().image_url.as_deref(),
            Some("https://cdn.example.com/runner.png")
        );
    }
}
