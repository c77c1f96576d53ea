//! Route table of the storefront
//!
//! Flows report where the user goes next as a [`Route`]; rendering and
//! navigation belong to the embedding UI.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Products,
    ProductDetail { id: String },
    Cart,
    Login,
    Register,
    Activate { token: String },
    ForgotPassword,
    ResetPassword { token: String },
}

impl Route {
    /// Match a path against the route table
    ///
    /// A trailing slash and query string are ignored. Unknown paths return
    /// `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Self::Home),
            ["products"] => Some(Self::Products),
            ["products", id] => Some(Self::ProductDetail { id: (*id).to_string() }),
            ["cart"] => Some(Self::Cart),
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["activate", token] => Some(Self::Activate {
                token: (*token).to_string(),
            }),
            ["forgot-password"] => Some(Self::ForgotPassword),
            ["reset-password", token] => Some(Self::ResetPassword {
                token: (*token).to_string(),
            }),
            _ => None,
        }
    }

    /// Routes that only make sense for a signed-out visitor
    #[must_use]
    pub fn is_auth_page(&self) -> bool {
        matches!(
            self,
            Self::Login
                | Self::Register
                | Self::Activate { .. }
                | Self::ForgotPassword
                | Self::ResetPassword { .. }
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Products => f.write_str("/products"),
            Self::ProductDetail { id } => write!(f, "/products/{id}"),
            Self::Cart => f.write_str("/cart"),
            Self::Login => f.write_str("/login"),
            Self::Register => f.write_str("/register"),
            Self::Activate { token } => write!(f, "/activate/{token}"),
            Self::ForgotPassword => f.write_str("/forgot-password"),
            Self::ResetPassword { token } => write!(f, "/reset-password/{token}"),
        }
    }
}
