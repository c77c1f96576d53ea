use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Catalog
// =============================================================================

/// Decimal amount exactly as the API renders it
///
/// The API serializes decimals as strings; plain JSON numbers are accepted
/// too and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MoneyRepr")]
pub struct Money(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Text(String),
    Number(serde_json::Number),
}

impl From<MoneyRepr> for Money {
    fn from(repr: MoneyRepr) -> Self {
        match repr {
            MoneyRepr::Text(text) => Self(text),
            MoneyRepr::Number(number) => Self(number.to_string()),
        }
    }
}

impl Money {
    #[must_use]
    pub fn new(amount: impl Into<String>) -> Self {
        Self(amount.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, for display math only
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Product {
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Product fields selected inside cart items
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartProduct {
    pub id: String,
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
}

/// Whether an item belongs to a signed-in user's cart or a guest cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartItemKind {
    Member,
    Guest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Server id, only present on member items
    pub id: Option<String>,
    pub kind: CartItemKind,
    pub product: CartProduct,
    pub quantity: i64,
    pub total_price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawCart")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_items: i64,
    pub total_price: Option<Money>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity held for `product_id`, as reported by the server
    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|item| item.product.id == product_id)
            .map(|item| item.quantity)
            .sum()
    }

    #[must_use]
    pub fn item_for_product(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCart {
    #[serde(default)]
    items: Vec<Option<serde_json::Value>>,
    #[serde(default)]
    total_items: Option<i64>,
    #[serde(default)]
    total_price: Option<Money>,
}

/// Cart items arrive as a union discriminated by `__typename`
#[derive(Deserialize)]
#[serde(tag = "__typename")]
enum RawCartItem {
    #[serde(rename = "CartItemType", rename_all = "camelCase")]
    Member {
        #[serde(default)]
        id: Option<String>,
        product: CartProduct,
        quantity: i64,
        #[serde(default)]
        total_price: Option<Money>,
    },
    #[serde(rename = "GuestCartItemType", rename_all = "camelCase")]
    Guest {
        product: CartProduct,
        quantity: i64,
        #[serde(default)]
        total_price: Option<Money>,
    },
    #[serde(other)]
    Unknown,
}

impl From<RawCart> for Cart {
    fn from(raw: RawCart) -> Self {
        let items: Vec<CartItem> = raw
            .items
            .into_iter()
            .flatten()
            // Entries that are not one of the two item types are dropped
            .filter_map(|value| serde_json::from_value::<RawCartItem>(value).ok())
            .filter_map(|item| match item {
                RawCartItem::Member {
                    id,
                    product,
                    quantity,
                    total_price,
                } => Some(CartItem {
                    id,
                    kind: CartItemKind::Member,
                    product,
                    quantity,
                    total_price,
                }),
                RawCartItem::Guest {
                    product,
                    quantity,
                    total_price,
                } => Some(CartItem {
                    id: None,
                    kind: CartItemKind::Guest,
                    product,
                    quantity,
                    total_price,
                }),
                RawCartItem::Unknown => None,
            })
            .collect();

        let total_items = raw
            .total_items
            .unwrap_or_else(|| items.iter().map(|item| item.quantity).sum());

        Self {
            items,
            total_items,
            total_price: raw.total_price,
        }
    }
}

// =============================================================================
// Mutation payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuccessPayload {
    #[serde(default)]
    pub success: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenPayload {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartChangePayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_items: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartItemRef {
    pub id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemPayload {
    #[serde(default)]
    pub cart_item: Option<CartItemRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}
