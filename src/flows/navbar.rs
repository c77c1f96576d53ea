//! Cart-aware navigation bar

use crate::context::StorefrontContext;
use crate::flows::cart::CartView;
use crate::flows::FlowOutcome;
use crate::routes::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarView {
    /// Email of the signed-in user
    pub user_email: Option<String>,
    pub cart_items: i64,
    pub links: Vec<Route>,
}

impl NavbarView {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user_email.is_some()
    }
}

pub struct Navbar;

impl Navbar {
    /// Build the navbar for the current session
    ///
    /// The cart count comes from the cached cart when available. A failed
    /// cart fetch shows zero rather than failing the navbar.
    pub async fn load(ctx: &StorefrontContext) -> NavbarView {
        let cart_items = match CartView::current(ctx).await {
            Ok(cart) => cart.total_items,
            Err(e) => {
                log::warn!("Navbar could not load cart: {e}");
                0
            }
        };

        let session = ctx.session().session();
        let user_email = session
            .user()
            .and_then(|user| user.display_name())
            .map(ToString::to_string);

        let links = if session.is_authenticated() {
            vec![Route::Products, Route::Cart]
        } else {
            vec![Route::Products, Route::Cart, Route::Login, Route::Register]
        };

        NavbarView {
            user_email,
            cart_items,
            links,
        }
    }

    /// Sign out and return to the login page
    pub async fn logout(ctx: &StorefrontContext) -> FlowOutcome {
        ctx.session().logout().await;
        ctx.session_changed().await;
        FlowOutcome::redirect(Route::Login)
    }
}
