//! Validation Module
//!
//! Client-side checks that run before any remote call.
//!
//! # Modules
//!
//! - [`core`] - Field-level checks (required, matching, length)
//! - [`forms`] - One validator per account form

pub mod core;
pub mod forms;

pub use core::MIN_PASSWORD_LENGTH;
pub use forms::{FormValidator, LoginInput, RegisterInput, ResetPasswordInput};
