//! Screen flows
//!
//! Each flow maps one user action to validation, a GraphQL call and the
//! resulting session change. A flow never renders; it returns a
//! [`FlowOutcome`] holding the alert to show and where to navigate next.
//!
//! # Modules
//!
//! - [`auth`] - Login, register, activation and password reset forms
//! - [`navbar`] - Cart-aware navigation bar and logout
//! - [`catalog`] - Product list and product detail
//! - [`cart`] - Cart view, quantity updates, removal and checkout

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod navbar;

use crate::error::{StorefrontError, StorefrontResult};
use crate::routes::Route;

pub use auth::{ActivateAccount, ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
pub use cart::{CartLine, CartView};
pub use catalog::{clamp_quantity, truncate_description, ProductCard, ProductDetail, ProductList};
pub use navbar::{Navbar, NavbarView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Error,
}

/// Message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub text: String,
}

impl Alert {
    #[must_use]
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Success,
            title: title.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Error,
            title: title.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == AlertLevel::Error
    }
}

/// Result of a completed user action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowOutcome {
    pub alert: Option<Alert>,
    pub redirect: Option<Route>,
}

impl FlowOutcome {
    #[must_use]
    pub fn alert(alert: Alert) -> Self {
        Self {
            alert: Some(alert),
            redirect: None,
        }
    }

    #[must_use]
    pub fn redirect(route: Route) -> Self {
        Self {
            alert: None,
            redirect: Some(route),
        }
    }

    #[must_use]
    pub fn then(mut self, route: Route) -> Self {
        self.redirect = Some(route);
        self
    }

    /// Collapse a flow result into what the UI shows; failures never redirect
    #[must_use]
    pub fn from_result(result: StorefrontResult<Self>) -> Self {
        result.unwrap_or_else(|e| Self::failure(&e))
    }

    #[must_use]
    pub fn failure(error: &StorefrontError) -> Self {
        Self::alert(error.to_alert())
    }
}
