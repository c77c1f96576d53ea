//! Cart view and cart mutations
//!
//! Quantities are never summed locally. Every cart mutation invalidates the
//! cart query, so [`CartView::current`] reads back what the server holds.

use crate::api::operations::{
    CartData, Checkout, GetCart, RemoveFromCart, RemoveFromCartVariables, UpdateCartItemQuantity,
    UpdateCartItemQuantityVariables,
};
use crate::api::NoVariables;
use crate::context::StorefrontContext;
use crate::error::{StorefrontResult, ValidationError};
use crate::flows::{Alert, FlowOutcome};
use crate::models::{Cart, CartItem, Money};
use crate::routes::Route;

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItem,
    pub image_url: String,
}

/// Cart ready for display
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total_items: i64,
    pub total_price: Option<Money>,
}

impl CartView {
    fn build(ctx: &StorefrontContext, data: CartData) -> Self {
        let cart = data.cart.unwrap_or_default();
        Self::from_cart(ctx, cart)
    }

    fn from_cart(ctx: &StorefrontContext, cart: Cart) -> Self {
        let lines = cart
            .items
            .into_iter()
            .map(|item| CartLine {
                image_url: ctx.image_url(item.product.image.as_deref()),
                item,
            })
            .collect();
        Self {
            lines,
            total_items: cart.total_items,
            total_price: cart.total_price,
        }
    }

    /// Fetch the cart from the API
    ///
    /// # Errors
    ///
    /// Returns an error if the cart query fails
    pub async fn load(ctx: &StorefrontContext) -> StorefrontResult<Self> {
        let data = ctx.api().query::<GetCart>(&NoVariables {}).await?;
        Ok(Self::build(ctx, data))
    }

    /// Cached cart if present, otherwise fetched
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is cached and the cart query fails
    pub async fn current(ctx: &StorefrontContext) -> StorefrontResult<Self> {
        match ctx.api().cached::<GetCart>(&NoVariables {}) {
            Some(data) => Ok(Self::build(ctx, data)),
            None => Self::load(ctx).await,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .filter(|line| line.item.product.id == product_id)
            .map(|line| line.item.quantity)
            .sum()
    }

    /// Set the quantity of a member cart item
    ///
    /// Quantities below 1 are ignored without calling the API.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ItemNotUpdatable`] for guest items, which
    /// have no server id, otherwise any API error
    pub async fn update_quantity(
        ctx: &StorefrontContext,
        item: &CartItem,
        quantity: i64,
    ) -> StorefrontResult<FlowOutcome> {
        if quantity < 1 {
            log::debug!("Ignoring quantity {quantity} for {}", item.product.id);
            return Ok(FlowOutcome::default());
        }
        let cart_item_id = item.id.clone().ok_or(ValidationError::ItemNotUpdatable)?;

        ctx.api()
            .mutate::<UpdateCartItemQuantity>(&UpdateCartItemQuantityVariables {
                cart_item_id,
                quantity,
            })
            .await?;
        Ok(FlowOutcome::default())
    }

    /// # Errors
    ///
    /// Returns any API error
    pub async fn remove(ctx: &StorefrontContext, product_id: &str) -> StorefrontResult<FlowOutcome> {
        ctx.api()
            .mutate::<RemoveFromCart>(&RemoveFromCartVariables {
                product_id: product_id.to_string(),
            })
            .await?;
        Ok(FlowOutcome::alert(Alert::success("Removed from Cart!", "")))
    }

    /// Place an order for the current cart
    ///
    /// # Errors
    ///
    /// Returns any API error
    pub async fn checkout(ctx: &StorefrontContext) -> StorefrontResult<FlowOutcome> {
        let data = ctx.api().mutate::<Checkout>(&NoVariables {}).await?;
        let text = match (data.checkout.message, data.checkout.order_id) {
            (Some(message), _) => message,
            (None, Some(order_id)) => format!("Order #{order_id} has been placed."),
            (None, None) => "Your order has been placed.".to_string(),
        };
        Ok(FlowOutcome::alert(Alert::success("Order Placed!", text)).then(Route::Products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorefrontError;
    use crate::models::{CartItemKind, CartProduct};
    use crate::testing::mock::MockTransport;
    use crate::testing::TestFixtures;
    use std::sync::Arc;

    fn guest_item() -> CartItem {
        CartItem {
            id: None,
            kind: CartItemKind::Guest,
            product: CartProduct {
                id: "5".to_string(),
                title: "Cap".to_string(),
                price: Money::new("10.00"),
                image: None,
            },
            quantity: 1,
            total_price: None,
        }
    }

    #[tokio::test]
    async fn test_quantity_below_one_is_ignored() {
        let transport = Arc::new(MockTransport::new());
        let ctx = TestFixtures::context_with(transport.clone());
        let mut item = guest_item();
        item.id = Some("3".to_string());

        let outcome = CartView::update_quantity(&ctx, &item, 0).await.unwrap();

        assert_eq!(outcome, FlowOutcome::default());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_guest_items_cannot_be_updated() {
        let transport = Arc::new(MockTransport::new());
        let ctx = TestFixtures::context_with(transport.clone());

        let err = CartView::update_quantity(&ctx, &guest_item(), 2)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StorefrontError::Validation(ValidationError::ItemNotUpdatable)
        ));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with_data("Cart", serde_json::json!({ "cart": null }));
        let ctx = TestFixtures::context_with(transport);

        let view = CartView::load(&ctx).await.unwrap();

        assert!(view.is_empty());
        assert_eq!(view.total_items, 0);
    }
}
