//! Every GraphQL operation the storefront issues

use serde::{Deserialize, Serialize};

use crate::api::graphql::{Mutation, NoVariables, Operation, Query, QueryKey};
use crate::models::{
    Cart, CartChangePayload, CheckoutPayload, LoginPayload, Product, RefreshTokenPayload,
    RegisterPayload, SuccessPayload, UpdateCartItemPayload,
};

// =============================================================================
// Account
// =============================================================================

pub struct Login;

#[derive(Debug, Clone, Serialize)]
pub struct LoginVariables {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub login: LoginPayload,
}

impl Operation for Login {
    const NAME: &'static str = "Login";
    const DOCUMENT: &'static str = r"mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password) {
    accessToken
    success
  }
}";
    type Variables = LoginVariables;
    type Data = LoginData;
}

impl Mutation for Login {
    // Session-scoped queries are refreshed once the new token is committed
    const INVALIDATES: &'static [QueryKey] = &[];
}

pub struct Register;

#[derive(Debug, Clone, Serialize)]
pub struct RegisterVariables {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterData {
    pub register: RegisterPayload,
}

impl Operation for Register {
    const NAME: &'static str = "Register";
    const DOCUMENT: &'static str = r"mutation Register($email: String!, $password1: String!, $password2: String!) {
  register(email: $email, password1: $password1, password2: $password2) {
    userId
    email
    message
    success
  }
}";
    type Variables = RegisterVariables;
    type Data = RegisterData;
}

impl Mutation for Register {
    const INVALIDATES: &'static [QueryKey] = &[];
}

pub struct Logout;

#[derive(Debug, Deserialize)]
pub struct LogoutData {
    pub logout: SuccessPayload,
}

impl Operation for Logout {
    const NAME: &'static str = "Logout";
    const DOCUMENT: &'static str = r"mutation Logout {
  logout {
    success
  }
}";
    type Variables = NoVariables;
    type Data = LogoutData;
}

impl Mutation for Logout {
    const INVALIDATES: &'static [QueryKey] = &[];
}

pub struct RefreshToken;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenData {
    pub refresh_token: RefreshTokenPayload,
}

impl Operation for RefreshToken {
    const NAME: &'static str = "RefreshToken";
    const DOCUMENT: &'static str = r"mutation RefreshToken {
  refreshToken {
    accessToken
  }
}";
    type Variables = NoVariables;
    type Data = RefreshTokenData;
}

impl Mutation for RefreshToken {
    const INVALIDATES: &'static [QueryKey] = &[];
}

pub struct ActivateAccount;

#[derive(Debug, Clone, Serialize)]
pub struct TokenVariables {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateAccountData {
    pub activate_account: SuccessPayload,
}

impl Operation for ActivateAccount {
    const NAME: &'static str = "ActivateAccount";
    const DOCUMENT: &'static str = r"mutation ActivateAccount($token: String!) {
  activateAccount(token: $token) {
    success
  }
}";
    type Variables = TokenVariables;
    type Data = ActivateAccountData;
}

impl Mutation for ActivateAccount {
    const INVALIDATES: &'static [QueryKey] = &[];
}

pub struct ForgotPassword;

#[derive(Debug, Clone, Serialize)]
pub struct EmailVariables {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordData {
    pub forgot_password: SuccessPayload,
}

impl Operation for ForgotPassword {
    const NAME: &'static str = "ForgotPassword";
    const DOCUMENT: &'static str = r"mutation ForgotPassword($email: String!) {
  forgotPassword(email: $email) {
    success
  }
}";
    type Variables = EmailVariables;
    type Data = ForgotPasswordData;
}

impl Mutation for ForgotPassword {
    const INVALIDATES: &'static [QueryKey] = &[];
}

pub struct ResetPassword;

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordVariables {
    pub token: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordData {
    pub reset_password: SuccessPayload,
}

impl Operation for ResetPassword {
    const NAME: &'static str = "ResetPassword";
    const DOCUMENT: &'static str = r"mutation ResetPassword($token: String!, $password1: String!, $password2: String!) {
  resetPassword(token: $token, password1: $password1, password2: $password2) {
    success
  }
}";
    type Variables = ResetPasswordVariables;
    type Data = ResetPasswordData;
}

impl Mutation for ResetPassword {
    const INVALIDATES: &'static [QueryKey] = &[];
}

// =============================================================================
// Catalog
// =============================================================================

pub struct GetProducts;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsData {
    #[serde(default)]
    pub all_products: Vec<Product>,
}

impl Operation for GetProducts {
    const NAME: &'static str = "GetProducts";
    const DOCUMENT: &'static str = r"query GetProducts {
  allProducts {
    id
    title
    price
    description
    image
    stock
    category {
      id
      name
    }
  }
}";
    type Variables = NoVariables;
    type Data = ProductsData;
}

impl Query for GetProducts {
    const KEY: QueryKey = QueryKey::Products;
}

pub struct GetProduct;

#[derive(Debug, Clone, Serialize)]
pub struct ProductVariables {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product: Option<Product>,
}

impl Operation for GetProduct {
    const NAME: &'static str = "GetProduct";
    const DOCUMENT: &'static str = r"query GetProduct($id: ID!) {
  product(id: $id) {
    id
    title
    price
    description
    image
    stock
    category {
      id
      name
    }
  }
}";
    type Variables = ProductVariables;
    type Data = ProductData;
}

impl Query for GetProduct {
    const KEY: QueryKey = QueryKey::Product;
}

// =============================================================================
// Cart
// =============================================================================

pub struct GetCart;

#[derive(Debug, Deserialize)]
pub struct CartData {
    pub cart: Option<Cart>,
}

impl Operation for GetCart {
    const NAME: &'static str = "Cart";
    const DOCUMENT: &'static str = r"query Cart {
  cart {
    items {
      ... on CartItemType {
        id
        product {
          id
          title
          price
          image
          __typename
        }
        quantity
        totalPrice
        __typename
      }
      ... on GuestCartItemType {
        product {
          id
          title
          price
          image
          __typename
        }
        quantity
        totalPrice
        __typename
      }
      __typename
    }
    totalItems
    totalPrice
  }
}";
    type Variables = NoVariables;
    type Data = CartData;
}

impl Query for GetCart {
    const KEY: QueryKey = QueryKey::Cart;
}

pub struct AddToCart;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartVariables {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartData {
    pub add_to_cart: CartChangePayload,
}

impl Operation for AddToCart {
    const NAME: &'static str = "AddToCart";
    const DOCUMENT: &'static str = r"mutation AddToCart($productId: ID!, $quantity: Int!) {
  addToCart(productId: $productId, quantity: $quantity) {
    message
    totalItems
  }
}";
    type Variables = AddToCartVariables;
    type Data = AddToCartData;
}

impl Mutation for AddToCart {
    const INVALIDATES: &'static [QueryKey] = &[QueryKey::Cart];
}

pub struct UpdateCartItemQuantity;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemQuantityVariables {
    pub cart_item_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemQuantityData {
    pub update_cart_item_quantity: UpdateCartItemPayload,
}

impl Operation for UpdateCartItemQuantity {
    const NAME: &'static str = "UpdateCartItemQuantity";
    const DOCUMENT: &'static str = r"mutation UpdateCartItemQuantity($cartItemId: ID!, $quantity: Int!) {
  updateCartItemQuantity(cartItemId: $cartItemId, quantity: $quantity) {
    cartItem {
      id
      quantity
    }
  }
}";
    type Variables = UpdateCartItemQuantityVariables;
    type Data = UpdateCartItemQuantityData;
}

impl Mutation for UpdateCartItemQuantity {
    const INVALIDATES: &'static [QueryKey] = &[QueryKey::Cart];
}

pub struct RemoveFromCart;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartVariables {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartData {
    pub remove_from_cart: CartChangePayload,
}

impl Operation for RemoveFromCart {
    const NAME: &'static str = "RemoveFromCart";
    const DOCUMENT: &'static str = r"mutation RemoveFromCart($productId: ID!) {
  removeFromCart(productId: $productId) {
    message
    totalItems
  }
}";
    type Variables = RemoveFromCartVariables;
    type Data = RemoveFromCartData;
}

impl Mutation for RemoveFromCart {
    const INVALIDATES: &'static [QueryKey] = &[QueryKey::Cart];
}

pub struct Checkout;

#[derive(Debug, Deserialize)]
pub struct CheckoutData {
    pub checkout: CheckoutPayload,
}

impl Operation for Checkout {
    const NAME: &'static str = "Checkout";
    const DOCUMENT: &'static str = r"mutation Checkout {
  checkout {
    orderId
    message
  }
}";
    type Variables = NoVariables;
    type Data = CheckoutData;
}

impl Mutation for Checkout {
    // Stock levels change with every order
    const INVALIDATES: &'static [QueryKey] =
        &[QueryKey::Cart, QueryKey::Products, QueryKey::Product];
}
