//! User identity

use serde::{Deserialize, Serialize};

/// Profile of the authenticated user
///
/// Owned exclusively by the session; replaced whole on profile update or
/// refresh, never mutated field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

fn default_role() -> String {
    String::from("user")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_user() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": 7,
            "email": "alice@example.com",
            "username": "alice"
        }))
        .unwrap();
        assert_eq!(profile.role, "user");
        assert_eq!(profile.full_name, None);
    }
}
