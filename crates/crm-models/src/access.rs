//! Access levels and per-module permission maps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Level of access to a module, ordered `None < Read < Write`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    None,
    Read,
    Write,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
        }
    }

    /// Lenient parse: anything unrecognised is `None`
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "read" => AccessLevel::Read,
            "write" => AccessLevel::Write,
            _ => AccessLevel::None,
        }
    }

    pub fn allows_read(&self) -> bool {
        *self >= AccessLevel::Read
    }

    pub fn allows_write(&self) -> bool {
        *self == AccessLevel::Write
    }
}

/// Stored per-user grants, keyed by module id
///
/// Missing keys mean [`AccessLevel::None`]. Unknown level strings in stored
/// JSON also read as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ModulePermissions(BTreeMap<String, AccessLevel>);

impl ModulePermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, module: impl Into<String>, level: AccessLevel) -> Self {
        self.0.insert(module.into(), level);
        self
    }

    pub fn set(&mut self, module: impl Into<String>, level: AccessLevel) {
        self.0.insert(module.into(), level);
    }

    /// Level stored for a module, `None` when absent
    pub fn level(&self, module: &str) -> AccessLevel {
        self.0.get(module).copied().unwrap_or_default()
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AccessLevel)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Decode from a stored JSON column; non-object values give an empty map
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut map = BTreeMap::new();
        if let Some(obj) = value.as_object() {
            for (module, level) in obj {
                let level = level.as_str().map(AccessLevel::parse_lenient).unwrap_or_default();
                map.insert(module.clone(), level);
            }
        }
        Self(map)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.as_str().to_string())))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ModulePermissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

impl FromIterator<(String, AccessLevel)> for ModulePermissions {
    fn from_iter<I: IntoIterator<Item = (String, AccessLevel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ordering() {
        assert!(AccessLevel::None < AccessLevel::Read);
        assert!(AccessLevel::Read < AccessLevel::Write);
        assert!(AccessLevel::Write.allows_read());
        assert!(!AccessLevel::Read.allows_write());
    }

    #[test]
    fn test_missing_module_is_none() {
        let perms = ModulePermissions::new().with("leads", AccessLevel::Read);
        assert_eq!(perms.level("leads"), AccessLevel::Read);
        assert_eq!(perms.level("customers"), AccessLevel::None);
    }

    #[test]
    fn test_lenient_json_decode() {
        let perms: ModulePermissions =
            serde_json::from_value(json!({"leads": "write", "logs": "admin", "projects": 3}))
                .unwrap();
        assert_eq!(perms.level("leads"), AccessLevel::Write);
        assert_eq!(perms.level("logs"), AccessLevel::None);
        assert_eq!(perms.level("projects"), AccessLevel::None);

        let empty: ModulePermissions = serde_json::from_value(json!(null)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_to_json() {
        let perms = ModulePermissions::new().with("customers", AccessLevel::Read);
        assert_eq!(perms.to_json(), json!({"customers": "read"}));
    }
}
