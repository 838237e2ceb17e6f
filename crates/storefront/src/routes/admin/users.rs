//! Admin user management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use tienda_core::{UserId, UserRole};

use crate::db::{RepositoryError, UserRepository};
use crate::error::AppError;
use crate::extract::{Form, Path};
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, push_flash};
use crate::models::{FlashLevel, User};
use crate::state::AppState;

/// Role change form.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub page: PageContext,
    pub users: Vec<User>,
}

/// All users, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(UsersTemplate { page, users })
}

/// Change a user's role. Admins cannot demote themselves.
#[instrument(skip_all, fields(admin_id = %admin.id, user_id = %id))]
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<UserId>,
    Form(form): Form<RoleForm>,
) -> Result<Redirect, AppError> {
    let Ok(role) = form.role.parse::<UserRole>() else {
        push_flash(&session, FlashLevel::Warning, "Rol inválido").await;
        return Ok(Redirect::to("/admin/users"));
    };

    if id == admin.id && !role.is_admin() {
        push_flash(&session, FlashLevel::Warning, "No puedes quitarte el rol de administrador").await;
        return Ok(Redirect::to("/admin/users"));
    }

    match UserRepository::new(state.pool()).set_role(id, role).await {
        Ok(user) => {
            info!(role = %role, "User role changed");
            push_flash(&session, FlashLevel::Success, format!("{} ahora es {role}", user.email)).await;
        }
        Err(RepositoryError::NotFound) => {
            push_flash(&session, FlashLevel::Warning, "El usuario no existe").await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin/users"))
}
