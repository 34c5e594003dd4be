//! Module registry
//!
//! Module ids are open strings. The registry lists the ids the application
//! knows about; it is consulted when permissions are administered, never
//! when they are resolved.

pub const LEADS: &str = "leads";
/// The clients module is stored under the `customers` id
pub const CLIENTS: &str = "customers";
pub const PROJECTS: &str = "projects";
pub const LOGS: &str = "logs";
pub const SETTINGS: &str = "settings";
pub const USERS: &str = "users";

pub const ALL: &[&str] = &[LEADS, CLIENTS, PROJECTS, LOGS, SETTINGS, USERS];

/// Modules a manager never has access to
pub const MANAGER_DENIED: &[&str] = &[USERS, SETTINGS];

pub fn is_known_module(id: &str) -> bool {
    ALL.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_modules() {
        assert!(is_known_module("leads"));
        assert!(is_known_module("customers"));
        assert!(!is_known_module("clients"));
        assert!(!is_known_module("reports"));
    }
}
