//! Domain models.
//!
//! These types represent validated domain objects separate from database row
//! types. JSON field names are camelCase on the wire.

pub mod book;
pub mod list;
pub mod search;
pub mod session;
pub mod user;

pub use book::{Book, BookWithAuthors};
pub use list::{List, ListChanges, ListDetail, ListMembership, ListWithBooks, NewList};
pub use search::Search;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{GoogleIdentity, ListInfo, ProfileUser, User, UserProfile, UserUpdate};
