//! Admin product management: list, create, edit, delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{info, instrument};

use tienda_core::ProductId;

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::AppError;
use crate::extract::{Form, Path};
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, push_flash};
use crate::models::{Category, CurrentUser, FlashLevel, Product, ProductFilter, ProductForm};
use crate::state::AppState;

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductsTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub page: PageContext,
    /// `None` when creating.
    pub product_id: Option<ProductId>,
    pub form: ProductForm,
    pub categories: Vec<Category>,
}

impl ProductFormTemplate {
    fn action(&self) -> String {
        self.product_id.map_or_else(
            || "/admin/products/new".to_owned(),
            |id| format!("/admin/products/{id}/edit"),
        )
    }

    fn is_selected(&self, category: &Category) -> bool {
        self.form.category_id.trim() == category.id.to_string()
    }
}

/// All products, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let products = ProductRepository::new(state.pool())
        .list(&ProductFilter::default())
        .await?;
    Ok(ProductsTemplate { page, products })
}

/// Empty creation form.
pub async fn new_page(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(ProductFormTemplate {
        page,
        product_id: None,
        form: ProductForm::default(),
        categories,
    })
}

/// Create a product.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return rerender(&state, &session, admin, None, form, errors).await,
    };

    match ProductRepository::new(state.pool()).create(&input).await {
        Ok(id) => {
            info!(product_id = %id, "Product created");
            push_flash(&session, FlashLevel::Success, format!("Producto \"{}\" creado", input.name)).await;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            let errors = vec!["La categoría no existe".to_owned()];
            rerender(&state, &session, admin, None, form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Edit form pre-filled with the product.
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(ProductFormTemplate {
        page,
        product_id: Some(id),
        form: ProductForm::from_product(&product),
        categories,
    })
}

/// Save product edits.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return rerender(&state, &session, admin, Some(id), form, errors).await,
    };

    match ProductRepository::new(state.pool()).update(id, &input).await {
        Ok(()) => {
            info!("Product updated");
            push_flash(&session, FlashLevel::Success, format!("Producto \"{}\" actualizado", input.name)).await;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("product {id}"))),
        Err(RepositoryError::Conflict(_)) => {
            let errors = vec!["La categoría no existe".to_owned()];
            rerender(&state, &session, admin, Some(id), form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product. Past orders keep their snapshot lines.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    match ProductRepository::new(state.pool()).delete(id).await {
        Ok(()) => {
            info!("Product deleted");
            push_flash(&session, FlashLevel::Info, "Producto eliminado").await;
        }
        Err(RepositoryError::NotFound) => {
            push_flash(&session, FlashLevel::Warning, "El producto ya no existe").await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin/products"))
}

/// Show the form again with the submitted values and their errors.
async fn rerender(
    state: &AppState,
    session: &Session,
    admin: CurrentUser,
    product_id: Option<ProductId>,
    form: ProductForm,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let mut page = PageContext::load(state, session, Some(admin)).await;
    for error in errors {
        page.flash(FlashLevel::Danger, error);
    }
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(ProductFormTemplate {
        page,
        product_id,
        form,
        categories,
    }
    .into_response())
}
