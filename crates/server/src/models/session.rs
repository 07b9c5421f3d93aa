//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use violet_pages_core::UserId;

use super::User;
use crate::error::AppError;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Display name, if chosen.
    pub name: Option<String>,
    /// Onboarding flag at the time the session was last refreshed.
    pub setup_completed: bool,
}

impl CurrentUser {
    /// Require that the user has finished onboarding.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if profile setup is incomplete.
    pub fn ensure_onboarded(&self) -> Result<(), AppError> {
        if self.setup_completed {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Finish setting up your profile first".to_string(),
            ))
        }
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            setup_completed: user.setup_completed,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for Google OAuth state (CSRF protection).
    pub const GOOGLE_OAUTH_STATE: &str = "google_oauth_state";

    /// Key for the PKCE code verifier of the pending Google sign-in.
    pub const GOOGLE_PKCE_VERIFIER: &str = "google_pkce_verifier";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_onboarded() {
        let mut user = CurrentUser {
            id: UserId::new(1),
            name: None,
            setup_completed: false,
        };
        assert!(matches!(user.ensure_onboarded(), Err(AppError::Forbidden(_))));

        user.setup_completed = true;
        assert!(user.ensure_onboarded().is_ok());
    }
}
