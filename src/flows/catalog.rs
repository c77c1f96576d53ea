//! Product list and product detail

use crate::api::operations::{
    AddToCart, AddToCartVariables, GetProduct, GetProducts, ProductVariables,
};
use crate::api::NoVariables;
use crate::context::StorefrontContext;
use crate::error::{StorefrontResult, ValidationError};
use crate::flows::{Alert, FlowOutcome};
use crate::models::Product;

/// Words kept from a description on the product list
pub const DESCRIPTION_WORDS: usize = 8;

/// Shorten `text` to its first [`DESCRIPTION_WORDS`] space-separated words
#[must_use]
pub fn truncate_description(text: &str) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    if words.len() <= DESCRIPTION_WORDS {
        return text.to_string();
    }
    format!("{}...", words[..DESCRIPTION_WORDS].join(" "))
}

/// Keep a requested quantity within `[1, stock]`
///
/// Anything above stock becomes the stock level; anything else that is out
/// of range (zero, negative) falls back to 1.
#[must_use]
pub fn clamp_quantity(requested: i64, stock: i64) -> i64 {
    if (1..=stock).contains(&requested) {
        requested
    } else if requested > stock {
        stock
    } else {
        1
    }
}

/// A product ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub product: Product,
    pub short_description: String,
    pub image_url: String,
}

impl ProductCard {
    fn new(ctx: &StorefrontContext, product: Product) -> Self {
        let short_description = truncate_description(product.description.as_deref().unwrap_or(""));
        let image_url = ctx.image_url(product.image.as_deref());
        Self {
            product,
            short_description,
            image_url,
        }
    }
}

async fn add_product(
    ctx: &StorefrontContext,
    product: &Product,
    quantity: i64,
) -> StorefrontResult<FlowOutcome> {
    if !product.in_stock() {
        return Err(ValidationError::OutOfStock {
            title: product.title.clone(),
        }
        .into());
    }
    if quantity < 1 {
        return Err(ValidationError::InvalidQuantity.into());
    }

    let data = ctx
        .api()
        .mutate::<AddToCart>(&AddToCartVariables {
            product_id: product.id.clone(),
            quantity,
        })
        .await?;
    log::debug!(
        "Added {quantity} x {} to cart, {} items total",
        product.id,
        data.add_to_cart.total_items.unwrap_or_default()
    );

    Ok(FlowOutcome::alert(Alert::success("Added to Cart!", "")))
}

pub struct ProductList;

impl ProductList {
    /// # Errors
    ///
    /// Returns an error if the product query fails
    pub async fn load(ctx: &StorefrontContext) -> StorefrontResult<Vec<ProductCard>> {
        let data = ctx.api().query::<GetProducts>(&NoVariables {}).await?;
        Ok(data
            .all_products
            .into_iter()
            .map(|product| ProductCard::new(ctx, product))
            .collect())
    }

    /// Add one unit of `product` to the cart
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-stock products, otherwise any
    /// API error
    pub async fn add_to_cart(
        ctx: &StorefrontContext,
        product: &Product,
    ) -> StorefrontResult<FlowOutcome> {
        add_product(ctx, product, 1).await
    }
}

/// Detail view state: the product and the chosen quantity
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub card: ProductCard,
    quantity: i64,
}

impl ProductDetail {
    /// Load a product by id; `Ok(None)` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the product query fails
    pub async fn load(ctx: &StorefrontContext, id: &str) -> StorefrontResult<Option<Self>> {
        let data = ctx
            .api()
            .query::<GetProduct>(&ProductVariables { id: id.to_string() })
            .await?;
        Ok(data.product.map(|product| Self {
            card: ProductCard::new(ctx, product),
            quantity: 1,
        }))
    }

    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Change the chosen quantity, clamped to the available stock
    pub fn set_quantity(&mut self, requested: i64) -> i64 {
        self.quantity = clamp_quantity(requested, self.card.product.stock);
        self.quantity
    }

    /// # Errors
    ///
    /// Returns a validation error for out-of-stock products, otherwise any
    /// API error
    pub async fn add_to_cart(&self, ctx: &StorefrontContext) -> StorefrontResult<FlowOutcome> {
        add_product(ctx, &self.card.product, self.quantity).await
    }
}
