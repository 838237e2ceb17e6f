//! Public catalog: product listing with category filter and search, and
//! product detail.

use std::borrow::Borrow;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use tienda_core::{CategoryId, ProductId};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::AppError;
use crate::extract::Path;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{Category, Product, ProductFilter};
use crate::state::AppState;

/// Catalog query parameters. Both are optional and tolerate garbage.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

impl CatalogQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self
                .category
                .as_deref()
                .and_then(|c| c.parse::<CategoryId>().ok()),
            search: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "public/index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub selected_category: Option<CategoryId>,
    pub search: String,
}

impl IndexTemplate {
    fn is_selected<C: Borrow<CategoryId>>(&self, id: C) -> bool {
        self.selected_category == Some(*id.borrow())
    }
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "public/product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub product: Product,
}

/// Product listing.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.filter();
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(IndexTemplate {
        page,
        products,
        categories,
        selected_category: filter.category,
        search: filter.search.unwrap_or_default(),
    })
}

/// Product detail page.
#[instrument(skip(state, page))]
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate { page, product })
}
