//! Account forms
//!
//! Validation runs first; a validation failure never reaches the API.
//! Registration does not sign the user in: the account must be activated
//! from the emailed link first.

use crate::api::operations::{
    ActivateAccount as ActivateAccountMutation, EmailVariables, ForgotPassword, Login,
    LoginVariables, Register, RegisterVariables, ResetPassword, ResetPasswordVariables,
    TokenVariables,
};
use crate::api::Operation;
use crate::context::StorefrontContext;
use crate::error::{ApiError, StorefrontResult};
use crate::flows::{Alert, FlowOutcome};
use crate::routes::Route;
use crate::validation::FormValidator;

/// Treat an explicit `success: false` as a rejection
fn ensure_success(success: Option<bool>, fallback: &str) -> Result<(), ApiError> {
    if success == Some(false) {
        return Err(ApiError::operation(fallback));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Authenticate and start a session
    ///
    /// # Errors
    ///
    /// Returns validation, API, or malformed token errors. A malformed token
    /// leaves the session anonymous.
    pub async fn submit(&self, ctx: &StorefrontContext) -> StorefrontResult<FlowOutcome> {
        let input = FormValidator::validate_login(&self.email, &self.password)?;

        let data = ctx
            .api()
            .mutate::<Login>(&LoginVariables {
                email: input.email,
                password: input.password,
            })
            .await?;
        let token = data
            .login
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::MissingData {
                operation: Login::NAME.to_string(),
            })?;

        ctx.session().login(&token).await?;
        ctx.session_changed().await;

        Ok(FlowOutcome::alert(Alert::success("Success", "Logged in!")).then(Route::Home))
    }
}

/// Email plus password and confirmation
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns validation or API errors
    pub async fn submit(&self, ctx: &StorefrontContext) -> StorefrontResult<FlowOutcome> {
        let input =
            FormValidator::validate_register(&self.email, &self.password1, &self.password2)?;

        let data = ctx
            .api()
            .mutate::<Register>(&RegisterVariables {
                email: input.email,
                password1: input.password1,
                password2: input.password2,
            })
            .await?;
        if data.register.success == Some(false) {
            let message = data
                .register
                .message
                .unwrap_or_else(|| "Failed to register. Please try again.".to_string());
            return Err(ApiError::operation(message).into());
        }

        log::info!("Registered account {}", self.email.trim());
        Ok(FlowOutcome::alert(Alert::success(
            "Success",
            "Registration successful! Please check your email to activate your account.",
        ))
        .then(Route::Login))
    }
}

/// Activation triggered by visiting `/activate/:token`
#[derive(Debug, Clone, Default)]
pub struct ActivateAccount {
    pub token: Option<String>,
}

impl ActivateAccount {
    #[must_use]
    pub fn from_route(route: &Route) -> Self {
        match route {
            Route::Activate { token } => Self {
                token: Some(token.clone()),
            },
            _ => Self::default(),
        }
    }

    /// # Errors
    ///
    /// Returns a validation error without calling the API when the link has
    /// no token, otherwise any API error
    pub async fn submit(&self, ctx: &StorefrontContext) -> StorefrontResult<FlowOutcome> {
        let token = FormValidator::validate_activation_token(self.token.as_deref())?;

        let data = ctx
            .api()
            .mutate::<ActivateAccountMutation>(&TokenVariables { token })
            .await?;
        ensure_success(data.activate_account.success, "Account activation failed")?;

        Ok(FlowOutcome::alert(Alert::success(
            "Success",
            "Account activated successfully! You can now log in.",
        ))
        .then(Route::Login))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    /// # Errors
    ///
    /// Returns validation or API errors
    pub async fn submit(&self, ctx: &StorefrontContext) -> StorefrontResult<FlowOutcome> {
        let email = FormValidator::validate_forgot_password(&self.email)?;

        let data = ctx
            .api()
            .mutate::<ForgotPassword>(&EmailVariables { email })
            .await?;
        ensure_success(data.forgot_password.success, "Failed to send reset email")?;

        Ok(FlowOutcome::alert(Alert::success(
            "Email Sent!",
            "Check your inbox for the password reset link. It may take a few minutes.",
        ))
        .then(Route::Login))
    }
}

/// New password form reached from `/reset-password/:token`
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub token: Option<String>,
    pub password1: String,
    pub password2: String,
}

impl ResetPasswordForm {
    #[must_use]
    pub fn for_route(route: &Route, password1: &str, password2: &str) -> Self {
        let token = match route {
            Route::ResetPassword { token } => Some(token.clone()),
            _ => None,
        };
        Self {
            token,
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns validation or API errors
    pub async fn submit(&self, ctx: &StorefrontContext) -> StorefrontResult<FlowOutcome> {
        let input = FormValidator::validate_reset_password(
            self.token.as_deref(),
            &self.password1,
            &self.password2,
        )?;

        let data = ctx
            .api()
            .mutate::<ResetPassword>(&ResetPasswordVariables {
                token: input.token,
                password1: input.password1,
                password2: input.password2,
            })
            .await?;
        ensure_success(data.reset_password.success, "Failed to reset password")?;

        Ok(FlowOutcome::alert(Alert::success(
            "Password Reset Successful!",
            "Your password has been updated. You can now log in with your new password.",
        ))
        .then(Route::Login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::operations::GetCart;
    use crate::api::NoVariables;
    use crate::error::{StorefrontError, ValidationError};
    use crate::testing::mock::MockTransport;
    use crate::testing::TestFixtures;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_login_starts_session_and_refreshes_cart() {
        let transport = Arc::new(MockTransport::new());
        let token = TestFixtures::access_token(4, "a@b.com");
        let cart = |quantity: i64| {
            json!({ "cart": { "items": [{
                "__typename": "CartItemType",
                "id": "1",
                "product": { "id": "9", "title": "Mug", "price": "4.00" },
                "quantity": quantity
            }] } })
        };
        transport.respond_with_data("Cart", cart(1));
        transport.respond_with_data(
            "Login",
            json!({ "login": { "accessToken": token, "success": true } }),
        );
        transport.respond_with_data("Cart", cart(3));
        let ctx = TestFixtures::context_with(transport.clone());
        ctx.api().query::<GetCart>(&NoVariables {}).await.unwrap();

        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        let outcome = form.submit(&ctx).await.unwrap();

        assert_eq!(outcome.redirect, Some(Route::Home));
        assert_eq!(outcome.alert.unwrap().text, "Logged in!");
        assert_eq!(ctx.session().token(), Some(token));
        assert_eq!(transport.operation_names(), vec!["Cart", "Login", "Cart"]);
        let cached = ctx.api().cached::<GetCart>(&NoVariables {}).unwrap();
        assert_eq!(cached.cart.unwrap().quantity_of("9"), 3);
    }

    #[tokio::test]
    async fn test_login_rejection_surfaces_message() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with_error("Login", "Invalid credentials");
        let ctx = TestFixtures::context_with(transport);

        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "wrong".to_string(),
        };
        let err = form.submit(&ctx).await.unwrap_err();

        assert_eq!(err.to_alert().text, "Invalid credentials");
        assert!(!ctx.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_with_malformed_token_stays_anonymous() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with_data(
            "Login",
            json!({ "login": { "accessToken": "not.a-token", "success": true } }),
        );
        let ctx = TestFixtures::context_with(transport);

        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        let err = form.submit(&ctx).await.unwrap_err();

        assert!(matches!(err, StorefrontError::MalformedToken(_)));
        assert!(!ctx.session().is_authenticated());
        assert_eq!(ctx.session().storage().get(), None);
    }

    #[tokio::test]
    async fn test_activation_without_token_skips_api() {
        let transport = Arc::new(MockTransport::new());
        let ctx = TestFixtures::context_with(transport.clone());

        let err = ActivateAccount { token: None }.submit(&ctx).await.unwrap_err();

        assert!(matches!(
            err,
            StorefrontError::Validation(ValidationError::MissingActivationToken)
        ));
        assert_eq!(err.to_alert().text, "Invalid activation link");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_forgot_password_redirects_to_login() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with_data("ForgotPassword", json!({ "forgotPassword": { "success": true } }));
        let ctx = TestFixtures::context_with(transport);

        let outcome = ForgotPasswordForm {
            email: "a@b.com".to_string(),
        }
        .submit(&ctx)
        .await
        .unwrap();

        assert_eq!(outcome.alert.unwrap().title, "Email Sent!");
        assert_eq!(outcome.redirect, Some(Route::Login));
    }

    #[tokio::test]
    async fn test_explicit_failure_flag_is_an_error() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with_data("ResetPassword", json!({ "resetPassword": { "success": false } }));
        let ctx = TestFixtures::context_with(transport);

        let form = ResetPasswordForm::for_route(
            &Route::ResetPassword {
                token: "t0k".to_string(),
            },
            "secret1",
            "secret1",
        );
        let err = form.submit(&ctx).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to reset password");
    }
}
