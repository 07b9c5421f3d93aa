//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use violet_pages_core::{DisplayName, UserId};

use super::List;

/// A registered user.
///
/// The Google subject and email never leave the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(skip_serializing)]
    pub google_subject: String,
    #[serde(skip_serializing)]
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    /// Set once the user has saved a display name during onboarding.
    pub setup_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity asserted by Google at sign-in.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Stable subject identifier (`sub` claim).
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Partial profile update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<DisplayName>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub setup_completed: Option<bool>,
}

/// Public subset of a user shown on profile pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub id: UserId,
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl From<&User> for ProfileUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            image: user.image.clone(),
            description: user.description.clone(),
        }
    }
}

/// A public profile: the user and their public lists.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: ProfileUser,
    pub lists: Vec<List>,
}

/// List counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInfo {
    pub total_lists: usize,
    pub public_lists: usize,
    pub private_lists: usize,
}

impl ListInfo {
    /// Count public and private lists.
    #[must_use]
    pub fn from_lists(lists: &[List]) -> Self {
        let public_lists = lists.iter().filter(|l| l.is_public).count();
        Self {
            total_lists: lists.len(),
            public_lists,
            private_lists: lists.len() - public_lists,
        }
    }
}
