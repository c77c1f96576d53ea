#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the shopfront client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod api;
pub mod context;
pub mod error;
pub mod flows;
pub mod models;
pub mod routes;
pub mod session;
pub mod settings;
pub mod utils;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use api::{ApiClient, QueryKey};
pub use context::StorefrontContext;
pub use error::{ApiError, MalformedTokenError, StorefrontError, StorefrontResult, ValidationError};
pub use flows::{Alert, AlertLevel, FlowOutcome};
pub use routes::Route;
pub use session::{SessionManager, SessionState, UserClaims};
pub use settings::StorefrontSettings;
