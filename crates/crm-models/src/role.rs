//! Account role
//!
//! Roles are stored as free text. Parsing never fails: tags outside the
//! known set (including the legacy `user` tag) are kept verbatim in
//! [`Role::Unrecognized`] and resolve like any non-privileged role.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Client,
    Unrecognized(String),
}

impl Role {
    /// Parse an optional stored role; blank means no role
    pub fn parse_optional(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.trim().is_empty()).map(Role::from)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Client => "client",
            Role::Unrecognized(tag) => tag,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role is one of the assignable roles
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Role::Unrecognized(_))
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        match raw {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "staff" => Role::Staff,
            "client" => Role::Client,
            other => Role::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("manager"), Role::Manager);
        assert_eq!(Role::from("staff"), Role::Staff);
        assert_eq!(Role::from("client"), Role::Client);
    }

    #[test]
    fn test_legacy_and_unknown_tags_are_kept() {
        let legacy = Role::from("user");
        assert_eq!(legacy, Role::Unrecognized("user".to_string()));
        assert_eq!(legacy.to_string(), "user");
        assert!(!legacy.is_recognized());

        // Tags are case-sensitive
        assert_eq!(Role::from("Admin"), Role::Unrecognized("Admin".to_string()));
    }

    #[test]
    fn test_blank_role_is_absent() {
        assert_eq!(Role::parse_optional(None), None);
        assert_eq!(Role::parse_optional(Some("")), None);
        assert_eq!(Role::parse_optional(Some("  ")), None);
        assert_eq!(Role::parse_optional(Some("staff")), Some(Role::Staff));
    }

    #[test]
    fn test_serde_round_trips_tag() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"manager\"");
        let role: Role = serde_json::from_str("\"auditor\"").unwrap();
        assert_eq!(role, Role::Unrecognized("auditor".to_string()));
    }
}
