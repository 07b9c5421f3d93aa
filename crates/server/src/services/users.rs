//! Profile rules.

use violet_pages_core::UserId;

use super::ServiceError;
use crate::models::{User, UserUpdate};

/// Check that `caller` may delete the account `target`.
///
/// # Errors
///
/// - `ServiceError::BadRequest` if the account does not exist
/// - `ServiceError::Forbidden` if it is someone else's account
pub fn authorize_deletion(target: Option<&User>, caller: UserId) -> Result<(), ServiceError> {
    let user = target.ok_or_else(|| ServiceError::BadRequest("User does not exist".to_string()))?;
    if user.id != caller {
        return Err(ServiceError::Forbidden(
            "You can only delete your own account".to_string(),
        ));
    }
    Ok(())
}

/// Check that an update leaves the profile in a valid state.
///
/// Onboarding can only be marked complete once the user has a display
/// name, either already saved or part of this update.
///
/// # Errors
///
/// Returns `ServiceError::BadRequest` when completing setup without a name.
pub fn validate_update(current: &User, update: &UserUpdate) -> Result<(), ServiceError> {
    if update.setup_completed == Some(true) && update.name.is_none() && current.name.is_none() {
        return Err(ServiceError::BadRequest(
            "Choose a display name to finish setup".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use violet_pages_core::DisplayName;

    use super::*;

    fn user(id: i32) -> User {
        User {
            id: UserId::new(id),
            google_subject: format!("sub-{id}"),
            email: format!("u{id}@example.com"),
            name: None,
            image: None,
            description: None,
            setup_completed: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_user_is_bad_request() {
        assert!(matches!(
            authorize_deletion(None, UserId::new(1)),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let target = user(2);
        assert!(matches!(
            authorize_deletion(Some(&target), UserId::new(1)),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn test_self_deletion_allowed() {
        let target = user(1);
        assert!(authorize_deletion(Some(&target), UserId::new(1)).is_ok());
    }

    #[test]
    fn test_setup_requires_a_name() {
        let update = UserUpdate {
            setup_completed: Some(true),
            ..UserUpdate::default()
        };
        assert!(matches!(
            validate_update(&user(1), &update),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn test_setup_with_name_in_update() {
        let update = UserUpdate {
            name: Some(DisplayName::parse("ada").unwrap()),
            setup_completed: Some(true),
            ..UserUpdate::default()
        };
        assert!(validate_update(&user(1), &update).is_ok());
    }

    #[test]
    fn test_setup_with_existing_name() {
        let mut current = user(1);
        current.name = Some("ada".to_string());
        let update = UserUpdate {
            setup_completed: Some(true),
            ..UserUpdate::default()
        };
        assert!(validate_update(&current, &update).is_ok());
    }
}
