//! Cache key layout shared by the sync engine and the auth component.

/// Serialized fixture collection from the last successful fetch
pub const UPCOMING_MATCHES: &str = "upcoming_matches";

/// Serialized prediction map keyed by fixture id
pub const USER_PREDICTIONS: &str = "user_predictions";

/// Bearer token, owned by the auth component
pub const ACCESS_TOKEN: &str = "access_token";

/// Signed-in user id, owned by the auth component
pub const USER_ID: &str = "user_id";

/// Signed-in username, owned by the auth component
pub const USERNAME: &str = "username";

/// Serialized user profile, owned by the auth component
pub const USER_PROFILE: &str = "user_profile";
