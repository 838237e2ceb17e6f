//! Authentication route handlers: login, registration, logout and profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::extract::Form;
use crate::filters;
use crate::middleware::{
    OptionalAuth, PageContext, RequireAuth, login_user, logout_user, push_flash,
};
use crate::models::{FlashLevel, User};
use crate::services::auth::{AuthError, AuthService, safe_redirect_target};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile form data. A missing `name` keeps the current one.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: Option<String>,
}

/// `?next=` on the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub next: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub profile: User,
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(page: PageContext, Query(query): Query<NextQuery>) -> impl IntoResponse {
    LoginTemplate {
        page,
        email: String::new(),
        next: query.next,
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            login_user(&session, &user).await?;
            info!(user_id = %user.id, "User logged in");
            push_flash(&session, FlashLevel::Success, format!("Bienvenido, {}!", user.name)).await;
            let target = safe_redirect_target(form.next.as_deref());
            Ok(Redirect::to(target).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            warn!("Login failed");
            let mut page = PageContext::load(&state, &session, user).await;
            page.flash(FlashLevel::Danger, "Correo o contraseña incorrectos");
            Ok(LoginTemplate {
                page,
                email: form.email.trim().to_owned(),
                next: form.next,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out and return to the catalog.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<Redirect, AppError> {
    logout_user(&session).await?;
    info!("User logged out");
    push_flash(&session, FlashLevel::Info, "Sesión cerrada.").await;
    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(page: PageContext) -> impl IntoResponse {
    RegisterTemplate {
        page,
        name: String::new(),
        email: String::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.pool())
        .register(&form.name, &form.email, &form.password)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "User registered");
            push_flash(&session, FlashLevel::Success, "Registro exitoso. Inicia sesión.").await;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(e) => match e.user_message() {
            Some(message) => {
                let mut page = PageContext::load(&state, &session, user).await;
                page.flash(FlashLevel::Warning, message);
                Ok(RegisterTemplate {
                    page,
                    name: form.name.trim().to_owned(),
                    email: form.email.trim().to_owned(),
                }
                .into_response())
            }
            None => Err(e.into()),
        },
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Display the profile page.
pub async fn profile_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let profile = AuthService::new(state.pool()).get_user(user.id).await?;
    Ok(ProfileTemplate { page, profile })
}

/// Update the display name.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut page: PageContext,
    Form(form): Form<ProfileForm>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthService::new(state.pool());

    let profile = match auth.update_profile(user.id, form.name.as_deref()).await {
        Ok(profile) => {
            page.flash(FlashLevel::Success, "Perfil actualizado");
            profile
        }
        Err(AuthError::BlankName) => {
            page.flash(FlashLevel::Warning, "El nombre no puede estar vacío");
            auth.get_user(user.id).await?
        }
        Err(e) => return Err(e.into()),
    };

    // The navigation bar shows the name resolved before the update.
    if let Some(current) = page.user.as_mut() {
        current.name.clone_from(&profile.name);
    }

    Ok(ProfileTemplate { page, profile })
}
