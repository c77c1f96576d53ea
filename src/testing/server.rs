//! In-memory shop backend
//!
//! [`FakeShopServer`] answers the storefront's GraphQL operations from
//! local state. Carts are aggregated server-side: adding a product already
//! in the cart raises its quantity. Signing in is modelled the way the
//! real API does it with its refresh cookie: the server remembers who
//! logged in last until `Logout`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};

use crate::api::{GraphQLRequest, GraphQLResponse, GraphQLTransport};
use crate::error::ApiError;
use crate::testing::TestFixtures;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShopProduct {
    id: String,
    title: String,
    price: String,
    description: String,
    image: Option<String>,
    stock: i64,
}

#[derive(Debug, Clone)]
struct ShopUser {
    id: i64,
    email: String,
    password: String,
    active: bool,
}

#[derive(Debug, Clone)]
struct CartLine {
    item_id: i64,
    product_id: String,
    quantity: i64,
}

#[derive(Debug, Default)]
struct ShopState {
    products: Vec<ShopProduct>,
    users: Vec<ShopUser>,
    member_carts: Vec<(i64, Vec<CartLine>)>,
    guest_cart: Vec<CartLine>,
    signed_in: Option<i64>,
    next_item_id: i64,
    next_order_id: i64,
    requests: Vec<GraphQLRequest>,
}

type Reply = Result<Value, String>;

fn string_var(variables: &Value, name: &str) -> Result<String, String> {
    match variables.get(name) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        _ => Err(format!("Variable \"${name}\" of required type was not provided.")),
    }
}

fn int_var(variables: &Value, name: &str) -> Result<i64, String> {
    variables
        .get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("Variable \"${name}\" of required type was not provided."))
}

fn format_price(amount: f64) -> String {
    format!("{amount:.2}")
}

impl ShopState {
    fn product(&self, id: &str) -> Option<&ShopProduct> {
        self.products.iter().find(|product| product.id == id)
    }

    fn user_by_email(&mut self, email: &str) -> Option<&mut ShopUser> {
        self.users
            .iter_mut()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }

    fn cart_mut(&mut self) -> &mut Vec<CartLine> {
        let Some(user_id) = self.signed_in else {
            return &mut self.guest_cart;
        };
        let index = match self.member_carts.iter().position(|(id, _)| *id == user_id) {
            Some(index) => index,
            None => {
                self.member_carts.push((user_id, Vec::new()));
                self.member_carts.len() - 1
            }
        };
        &mut self.member_carts[index].1
    }

    fn cart(&self) -> Vec<CartLine> {
        match self.signed_in {
            Some(user_id) => self
                .member_carts
                .iter()
                .find(|(id, _)| *id == user_id)
                .map(|(_, lines)| lines.clone())
                .unwrap_or_default(),
            None => self.guest_cart.clone(),
        }
    }

    fn total_items(&self) -> i64 {
        self.cart().iter().map(|line| line.quantity).sum()
    }

    fn execute(&mut self, request: &GraphQLRequest) -> Reply {
        let vars = &request.variables;
        match request.operation_name.as_str() {
            "Register" => self.register(
                &string_var(vars, "email")?,
                &string_var(vars, "password1")?,
                &string_var(vars, "password2")?,
            ),
            "ActivateAccount" => self.activate(&string_var(vars, "token")?),
            "Login" => self.login(&string_var(vars, "email")?, &string_var(vars, "password")?),
            "Logout" => {
                self.signed_in = None;
                Ok(json!({ "logout": { "success": true } }))
            }
            "RefreshToken" => self.refresh(),
            "ForgotPassword" => Ok(json!({ "forgotPassword": { "success": true } })),
            "ResetPassword" => self.reset_password(
                &string_var(vars, "token")?,
                &string_var(vars, "password1")?,
                &string_var(vars, "password2")?,
            ),
            "GetProducts" => Ok(json!({ "allProducts": self.products })),
            "GetProduct" => {
                let id = string_var(vars, "id")?;
                Ok(json!({ "product": self.product(&id) }))
            }
            "Cart" => Ok(json!({ "cart": self.render_cart() })),
            "AddToCart" => {
                self.add_to_cart(&string_var(vars, "productId")?, int_var(vars, "quantity")?)
            }
            "UpdateCartItemQuantity" => self.update_quantity(
                &string_var(vars, "cartItemId")?,
                int_var(vars, "quantity")?,
            ),
            "RemoveFromCart" => self.remove_from_cart(&string_var(vars, "productId")?),
            "Checkout" => self.checkout(),
            other => Err(format!("Cannot query field \"{other}\" on type \"Query\".")),
        }
    }

    fn register(&mut self, email: &str, password1: &str, password2: &str) -> Reply {
        if self.user_by_email(email).is_some() {
            return Err("A user with that email already exists.".to_string());
        }
        if password1 != password2 {
            return Err("Passwords do not match".to_string());
        }
        let id = i64::try_from(self.users.len()).unwrap_or(i64::MAX) + 1;
        self.users.push(ShopUser {
            id,
            email: email.to_string(),
            password: password1.to_string(),
            active: false,
        });
        Ok(json!({ "register": {
            "userId": id,
            "email": email,
            "message": "Registration successful. Check your email to activate your account.",
            "success": true
        }}))
    }

    fn activate(&mut self, token: &str) -> Reply {
        let user = self
            .users
            .iter_mut()
            .find(|user| FakeShopServer::activation_token_for(user.id) == token)
            .ok_or_else(|| "Invalid or expired activation token".to_string())?;
        user.active = true;
        Ok(json!({ "activateAccount": { "success": true } }))
    }

    fn login(&mut self, email: &str, password: &str) -> Reply {
        let user = self
            .user_by_email(email)
            .filter(|user| user.password == password)
            .cloned()
            .ok_or_else(|| "Invalid credentials".to_string())?;
        if !user.active {
            return Err("Please activate your account first".to_string());
        }

        // Guest lines move into the member cart on login
        let guest_lines = std::mem::take(&mut self.guest_cart);
        self.signed_in = Some(user.id);
        for line in guest_lines {
            self.merge_line(&line.product_id, line.quantity);
        }

        Ok(json!({ "login": {
            "accessToken": TestFixtures::access_token(user.id, &user.email),
            "success": true
        }}))
    }

    fn refresh(&self) -> Reply {
        let user_id = self
            .signed_in
            .ok_or_else(|| "Refresh token not found".to_string())?;
        let email = self
            .users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.email.clone())
            .unwrap_or_default();
        Ok(json!({ "refreshToken": {
            "accessToken": TestFixtures::access_token(user_id, &email)
        }}))
    }

    fn reset_password(&mut self, token: &str, password1: &str, password2: &str) -> Reply {
        if password1 != password2 {
            return Err("Passwords do not match".to_string());
        }
        let user = self
            .users
            .iter_mut()
            .find(|user| FakeShopServer::reset_token_for(user.id) == token)
            .ok_or_else(|| "Invalid or expired reset token".to_string())?;
        user.password = password1.to_string();
        Ok(json!({ "resetPassword": { "success": true } }))
    }

    fn merge_line(&mut self, product_id: &str, quantity: i64) {
        self.next_item_id += 1;
        let item_id = self.next_item_id;
        let cart = self.cart_mut();
        match cart.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity += quantity,
            None => cart.push(CartLine {
                item_id,
                product_id: product_id.to_string(),
                quantity,
            }),
        }
    }

    fn add_to_cart(&mut self, product_id: &str, quantity: i64) -> Reply {
        let stock = self
            .product(product_id)
            .map(|product| product.stock)
            .ok_or_else(|| "Product not found".to_string())?;
        if quantity < 1 {
            return Err("Quantity must be positive".to_string());
        }
        let held = self
            .cart()
            .iter()
            .filter(|line| line.product_id == product_id)
            .map(|line| line.quantity)
            .sum::<i64>();
        if held + quantity > stock {
            return Err("Not enough stock available".to_string());
        }

        self.merge_line(product_id, quantity);
        Ok(json!({ "addToCart": {
            "message": "Product added to cart",
            "totalItems": self.total_items()
        }}))
    }

    fn update_quantity(&mut self, cart_item_id: &str, quantity: i64) -> Reply {
        if self.signed_in.is_none() {
            return Err("Authentication required".to_string());
        }
        let line = self
            .cart_mut()
            .iter_mut()
            .find(|line| line.item_id.to_string() == cart_item_id)
            .ok_or_else(|| "Cart item not found".to_string())?;
        line.quantity = quantity;
        let (id, quantity) = (line.item_id, line.quantity);
        Ok(json!({ "updateCartItemQuantity": {
            "cartItem": { "id": id.to_string(), "quantity": quantity }
        }}))
    }

    fn remove_from_cart(&mut self, product_id: &str) -> Reply {
        let cart = self.cart_mut();
        let before = cart.len();
        cart.retain(|line| line.product_id != product_id);
        if cart.len() == before {
            return Err("Product not in cart".to_string());
        }
        Ok(json!({ "removeFromCart": {
            "message": "Product removed from cart",
            "totalItems": self.total_items()
        }}))
    }

    fn checkout(&mut self) -> Reply {
        if self.signed_in.is_none() {
            return Err("Authentication required".to_string());
        }
        let lines = std::mem::take(self.cart_mut());
        if lines.is_empty() {
            return Err("Cart is empty".to_string());
        }
        for line in &lines {
            if let Some(product) = self
                .products
                .iter_mut()
                .find(|product| product.id == line.product_id)
            {
                product.stock -= line.quantity;
            }
        }
        self.next_order_id += 1;
        Ok(json!({ "checkout": {
            "orderId": self.next_order_id,
            "message": "Order placed successfully"
        }}))
    }

    fn render_cart(&self) -> Value {
        let member = self.signed_in.is_some();
        let mut total = 0.0;
        let items: Vec<Value> = self
            .cart()
            .iter()
            .filter_map(|line| {
                let product = self.product(&line.product_id)?;
                #[allow(clippy::cast_precision_loss)]
                let line_total = product.price.parse::<f64>().unwrap_or(0.0) * line.quantity as f64;
                total += line_total;
                let product_json = json!({
                    "id": product.id,
                    "title": product.title,
                    "price": product.price,
                    "image": product.image,
                    "__typename": "ProductType"
                });
                Some(if member {
                    json!({
                        "__typename": "CartItemType",
                        "id": line.item_id.to_string(),
                        "product": product_json,
                        "quantity": line.quantity,
                        "totalPrice": format_price(line_total)
                    })
                } else {
                    json!({
                        "__typename": "GuestCartItemType",
                        "product": product_json,
                        "quantity": line.quantity,
                        "totalPrice": format_price(line_total)
                    })
                })
            })
            .collect();

        json!({
            "items": items,
            "totalItems": self.total_items(),
            "totalPrice": format_price(total)
        })
    }
}

/// GraphQL transport backed by an in-memory shop
#[derive(Default)]
pub struct FakeShopServer {
    state: Mutex<ShopState>,
}

impl FakeShopServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Server preloaded with a small catalog
    ///
    /// Product `1` (Desk Lamp) has stock 5, product `2` (Coffee Mug) has
    /// stock 10 and product `3` (Wool Scarf) is out of stock.
    #[must_use]
    pub fn with_catalog() -> Self {
        let server = Self::new();
        server.add_product("1", "Desk Lamp", "30.00", 5);
        server.add_product("2", "Coffee Mug", "4.50", 10);
        server.add_product("3", "Wool Scarf", "22.00", 0);
        server
    }

    fn state(&self) -> MutexGuard<'_, ShopState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn add_product(&self, id: &str, title: &str, price: &str, stock: i64) {
        self.state().products.push(ShopProduct {
            id: id.to_string(),
            title: title.to_string(),
            price: price.to_string(),
            description: format!("A {} picked for everyday use in any home or office", title.to_lowercase()),
            image: Some(format!("products/{id}.png")),
            stock,
        });
    }

    /// Create an activated account
    pub fn add_active_user(&self, email: &str, password: &str) -> i64 {
        let mut state = self.state();
        let id = i64::try_from(state.users.len()).unwrap_or(i64::MAX) + 1;
        state.users.push(ShopUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
            active: true,
        });
        id
    }

    /// Token the activation email would carry for `user_id`
    #[must_use]
    pub fn activation_token_for(user_id: i64) -> String {
        format!("activate-{user_id}")
    }

    /// Token the reset email would carry for `user_id`
    #[must_use]
    pub fn reset_token_for(user_id: i64) -> String {
        format!("reset-{user_id}")
    }

    #[must_use]
    pub fn user_id(&self, email: &str) -> Option<i64> {
        self.state().user_by_email(email).map(|user| user.id)
    }

    #[must_use]
    pub fn is_active(&self, email: &str) -> bool {
        self.state().user_by_email(email).is_some_and(|user| user.active)
    }

    #[must_use]
    pub fn stock_of(&self, product_id: &str) -> Option<i64> {
        self.state().product(product_id).map(|product| product.stock)
    }

    #[must_use]
    pub fn signed_in(&self) -> Option<i64> {
        self.state().signed_in
    }

    #[must_use]
    pub fn operation_names(&self) -> Vec<String> {
        self.state()
            .requests
            .iter()
            .map(|request| request.operation_name.clone())
            .collect()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }
}

#[async_trait]
impl GraphQLTransport for FakeShopServer {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, ApiError> {
        let mut state = self.state();
        state.requests.push(request.clone());
        Ok(match state.execute(request) {
            Ok(data) => GraphQLResponse::data(data),
            Err(message) => GraphQLResponse::error(message),
        })
    }
}
