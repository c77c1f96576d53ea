//! Testing utilities for the storefront client
//!
//! Compiled for unit tests and behind the `testing` feature for the
//! integration tests under `tests/`.
//!
//! ## Organization
//!
//! - [`fixtures`] - Tokens, products, settings and ready-made contexts
//! - [`mock`] - Scripted GraphQL transport and session remote
//! - [`server`] - In-memory shop backend with server-side cart aggregation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopfront::testing::{FakeShopServer, TestFixtures};
//!
//! let server = Arc::new(FakeShopServer::with_catalog());
//! let ctx = TestFixtures::context_with(server.clone());
//! ```

pub mod fixtures;
pub mod mock;
pub mod server;

pub use fixtures::TestFixtures;
pub use mock::{MockSessionRemote, MockTransport};
pub use server::FakeShopServer;

/// Common test constants
pub mod constants {
    /// Default test email address
    pub const TEST_EMAIL: &str = "test@example.com";

    /// Password accepted by every form validator
    pub const TEST_PASSWORD: &str = "secret1";

    /// Signature segment of fixture tokens; never verified client-side
    pub const TEST_SIGNATURE: &str = "dGVzdC1zaWduYXR1cmU";

    /// Lifetime of fixture access tokens in seconds
    pub const TEST_TOKEN_LIFETIME_SECS: i64 = 3600;
}
