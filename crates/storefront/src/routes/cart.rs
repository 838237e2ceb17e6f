//! Cart route handlers.
//!
//! Every mutation is a form POST that redirects back to the page it came
//! from (the cart, or the product page) with a flash describing the result.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use tienda_core::ProductId;

use crate::db::{CartChange, CartRepository};
use crate::error::AppError;
use crate::extract::Form;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, push_flash};
use crate::models::{Cart, FlashLevel};
use crate::state::AppState;

fn default_quantity() -> i32 {
    1
}

/// Add-to-cart form.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Quantity update form.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Remove-line form.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub cart: Cart,
}

/// Show the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let lines = CartRepository::new(state.pool()).lines(user.id).await?;
    let cart = Cart::from_lines(lines)
        .map_err(|e| AppError::Internal(format!("cart total: {e}")))?;

    Ok(CartTemplate { page, cart })
}

/// Add units of a product to the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<AddForm>,
) -> Result<Redirect, AppError> {
    let change = CartRepository::new(state.pool())
        .add(user.id, form.product_id, form.quantity)
        .await?;

    if let CartChange::Saved { quantity } = change {
        info!(quantity, "Added to cart");
        push_flash(&session, FlashLevel::Success, "Producto agregado al carrito").await;
        return Ok(Redirect::to("/cart"));
    }

    flash_rejection(&session, change).await;
    Ok(Redirect::to(&format!("/products/{}", form.product_id)))
}

/// Set the quantity of a cart line; `0` removes it.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<UpdateForm>,
) -> Result<Redirect, AppError> {
    let change = CartRepository::new(state.pool())
        .set_quantity(user.id, form.product_id, form.quantity)
        .await?;

    match change {
        CartChange::Saved { .. } => {
            push_flash(&session, FlashLevel::Success, "Carrito actualizado").await;
        }
        CartChange::Removed => {
            push_flash(&session, FlashLevel::Info, "Producto eliminado del carrito").await;
        }
        rejected => flash_rejection(&session, rejected).await,
    }

    Ok(Redirect::to("/cart"))
}

/// Remove a cart line.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<RemoveForm>,
) -> Result<Redirect, AppError> {
    CartRepository::new(state.pool())
        .remove(user.id, form.product_id)
        .await?;
    push_flash(&session, FlashLevel::Info, "Producto eliminado del carrito").await;
    Ok(Redirect::to("/cart"))
}

/// Warning for a change the cart refused.
fn rejection_message(change: CartChange) -> Option<String> {
    match change {
        CartChange::Saved { .. } | CartChange::Removed => None,
        CartChange::UnknownProduct => Some("El producto no existe".to_owned()),
        CartChange::InvalidQuantity => Some("La cantidad debe ser mayor que cero".to_owned()),
        CartChange::InsufficientStock { available } => Some(format!(
            "No hay suficiente stock (disponibles: {available})"
        )),
    }
}

async fn flash_rejection(session: &Session, change: CartChange) {
    if let Some(message) = rejection_message(change) {
        push_flash(session, FlashLevel::Warning, message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(rejection_message(CartChange::Saved { quantity: 2 }), None);
        assert_eq!(rejection_message(CartChange::Removed), None);
        assert_eq!(
            rejection_message(CartChange::InsufficientStock { available: 3 }).as_deref(),
            Some("No hay suficiente stock (disponibles: 3)")
        );
        assert!(rejection_message(CartChange::UnknownProduct).is_some());
        assert!(rejection_message(CartChange::InvalidQuantity).is_some());
    }
}
