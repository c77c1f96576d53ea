//! Session Management Module
//!
//! Client-side access token lifecycle: where the token is kept, how it is
//! decoded, and the manager that ties both to the API.
//!
//! # Modules
//!
//! - [`cookie`] - Token storage backed by a cookie record
//! - [`token_processor`] - Unverified JWT payload decoding
//! - [`manager`] - Login, logout and refresh with observable state

pub mod cookie;
pub mod manager;
pub mod token_processor;

pub use cookie::{CookieTokenStorage, TokenCookieOptions, TokenStorage, TOKEN_COOKIE_NAME};
pub use manager::{Session, SessionManager, SessionRemote, SessionState};
pub use token_processor::{decode_token, UserClaims};
