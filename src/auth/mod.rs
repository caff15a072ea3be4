pub mod identity;
pub mod sessions;
pub mod token;

pub use identity::{IdentityProvider, SignInRequest};

/// Signed-in user as seen by the rest of the app. Only `id` matters for
/// ownership; the rest is shown in the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub email: String,
}
