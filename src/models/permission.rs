use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, de, ser};

/// One side of a permission: a concrete name or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Matches anything.
    Any,
    /// Matches exactly this name.
    Named(String),
}

impl Scope {
    /// Whether this scope grants the given concrete scope.
    fn grants(&self, other: &Scope) -> bool {
        match self {
            Scope::Any => true,
            Scope::Named(name) => matches!(other, Scope::Named(o) if o == name),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Any => f.write_str("*"),
            Scope::Named(name) => f.write_str(name),
        }
    }
}

/// A `(resource, action)` permission pair, possibly wildcarded.
///
/// Parsed and validated once at construction instead of on every check:
/// the textual form is `resource:action`, e.g. `certificate:sign` or
/// `template:*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: Scope,
    pub action: Scope,
}

impl Permission {
    /// The universal wildcard `*:*`.
    pub fn wildcard() -> Self {
        Self {
            resource: Scope::Any,
            action: Scope::Any,
        }
    }

    /// Whether this (possibly wildcarded) permission grants `required`.
    ///
    /// # Arguments
    ///
    /// * `required` - The concrete permission being checked.
    pub fn grants(&self, required: &Permission) -> bool {
        self.resource.grants(&required.resource) && self.action.grants(&required.action)
    }
}

fn parse_scope(part: &str) -> Result<Scope, String> {
    if part == "*" {
        return Ok(Scope::Any);
    }
    if part.is_empty() {
        return Err("Permission segments cannot be empty".to_string());
    }
    if !part
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(format!("Invalid permission segment: {}", part));
    }
    Ok(Scope::Named(part.to_string()))
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (resource, action) = match (parts.next(), parts.next(), parts.next()) {
            (Some(r), Some(a), None) => (r, a),
            _ => return Err(format!("Permission must be 'resource:action', got '{}'", s)),
        };

        Ok(Self {
            resource: parse_scope(resource)?,
            action: parse_scope(action)?,
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

impl ser::Serialize for Permission {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Permission {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_forms() {
        assert_eq!("*:*".parse::<Permission>().unwrap(), Permission::wildcard());
        let p: Permission = "certificate:sign".parse().unwrap();
        assert_eq!(p.resource, Scope::Named("certificate".to_string()));
        assert_eq!(p.action, Scope::Named("sign".to_string()));
        assert!("template:*".parse::<Permission>().is_ok());
        assert!("*:read".parse::<Permission>().is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<Permission>().is_err());
        assert!("certificate".parse::<Permission>().is_err());
        assert!("a:b:c".parse::<Permission>().is_err());
        assert!(":action".parse::<Permission>().is_err());
        assert!("res:".parse::<Permission>().is_err());
        assert!("Res:Action".parse::<Permission>().is_err());
    }

    #[test]
    fn test_wildcard_matching() {
        let required: Permission = "certificate:sign".parse().unwrap();

        for granted in ["*:*", "certificate:*", "*:sign", "certificate:sign"] {
            let granted: Permission = granted.parse().unwrap();
            assert!(granted.grants(&required), "{} should grant", granted);
        }

        for granted in ["certificate:read", "template:*", "*:read"] {
            let granted: Permission = granted.parse().unwrap();
            assert!(!granted.grants(&required), "{} should not grant", granted);
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let p: Permission = "template:*".parse().unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"template:*\"");
        assert_eq!(serde_json::from_str::<Permission>(&json).unwrap(), p);
    }
}
