//! Admin category management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use tienda_core::CategoryId;

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::AppError;
use crate::extract::{Form, Path};
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, push_flash};
use crate::models::{CategoryWithCount, FlashLevel};
use crate::state::AppState;

/// New category form.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

/// Category list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories.html")]
pub struct CategoriesTemplate {
    pub page: PageContext,
    pub categories: Vec<CategoryWithCount>,
}

/// Categories with product counts.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;
    Ok(CategoriesTemplate { page, categories })
}

/// Create a category.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        push_flash(&session, FlashLevel::Warning, "El nombre de la categoría es obligatorio").await;
        return Ok(Redirect::to("/admin/categories"));
    }

    match CategoryRepository::new(state.pool()).create(name).await {
        Ok(category) => {
            info!(category_id = %category.id, "Category created");
            push_flash(&session, FlashLevel::Success, format!("Categoría \"{}\" creada", category.name)).await;
        }
        Err(RepositoryError::Conflict(_)) => {
            push_flash(&session, FlashLevel::Warning, "Ya existe una categoría con ese nombre").await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin/categories"))
}

/// Delete an unused category.
#[instrument(skip_all, fields(admin_id = %admin.id, category_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Redirect, AppError> {
    match CategoryRepository::new(state.pool()).delete(id).await {
        Ok(()) => {
            info!("Category deleted");
            push_flash(&session, FlashLevel::Info, "Categoría eliminada").await;
        }
        Err(RepositoryError::Conflict(_)) => {
            push_flash(
                &session,
                FlashLevel::Warning,
                "No se puede eliminar una categoría con productos",
            )
            .await;
        }
        Err(RepositoryError::NotFound) => {
            push_flash(&session, FlashLevel::Warning, "La categoría ya no existe").await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin/categories"))
}
