use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of roles the directory can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Publisher,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Publisher => "publisher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "administrator" => Ok(Role::Administrator),
            "publisher" => Ok(Role::Publisher),
            other => Err(anyhow::anyhow!(
                "unknown role '{}'; expected administrator/publisher",
                other
            )),
        }
    }
}

/// Roles held by one user; empty for a plain user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Returns `true` if the role was not already held
    pub fn grant(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Parse role names such as those found in configuration
    pub fn parse<I, S>(names: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|name| name.as_ref().parse()).collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Role::as_str).collect();
        f.write_str(&names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_parse_case_insensitively() {
        assert_eq!("Administrator".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!(" publisher ".parse::<Role>().unwrap(), Role::Publisher);
        assert!("editor".parse::<Role>().is_err());
    }

    #[test]
    fn role_set_parse_rejects_unknown_names() {
        let roles = RoleSet::parse(["publisher", "administrator"]).unwrap();
        assert!(roles.contains(Role::Administrator));
        assert!(roles.contains(Role::Publisher));
        assert_eq!(roles.to_string(), "administrator,publisher");

        let err = RoleSet::parse(["publisher", "root"]).unwrap_err();
        assert!(err.to_string().contains("unknown role 'root'"));
    }

    #[test]
    fn grant_reports_new_roles_only() {
        let mut roles = RoleSet::new();
        assert!(roles.grant(Role::Publisher));
        assert!(!roles.grant(Role::Publisher));
        assert!(!roles.is_empty());
    }
}
