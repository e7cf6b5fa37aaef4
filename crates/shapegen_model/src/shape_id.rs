//! Absolute shape identifiers (`namespace#Name` with an optional `$member`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelError;

/// Absolute identifier of a shape or member.
///
/// Ordering is namespace, then name, then member. A member-less id sorts before any of its members, so sorted
/// walks visit a container before its members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId {
    namespace: String,
    name: String,
    member: Option<String>,
}

impl ShapeId {
    /// Build an id from already-validated parts.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            member: None,
        }
    }

    /// Parse `namespace#Name` or `namespace#Name$member`.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidShapeId(text.to_string());

        let (namespace, rest) = text.split_once('#').ok_or_else(invalid)?;
        let (name, member) = match rest.split_once('$') {
            Some((name, member)) => (name, Some(member)),
            None => (rest, None),
        };

        if namespace.is_empty() || !namespace.split('.').all(is_identifier) {
            return Err(invalid());
        }
        if !is_identifier(name) {
            return Err(invalid());
        }
        if let Some(member) = member {
            if !is_identifier(member) {
                return Err(invalid());
            }
        }

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            member: member.map(str::to_string),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// The id of a member of this shape.
    pub fn with_member(&self, member: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.into()),
        }
    }

    /// The containing shape id (drops any `$member`).
    pub fn without_member(&self) -> Self {
        Self::new(self.namespace.clone(), self.name.clone())
    }
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.name)?;
        if let Some(member) = &self.member {
            write!(f, "${member}")?;
        }
        Ok(())
    }
}

impl FromStr for ShapeId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ShapeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ShapeId::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shape_id() {
        let id = ShapeId::parse("example.weather#Forecast").unwrap();
        assert_eq!(id.namespace(), "example.weather");
        assert_eq!(id.name(), "Forecast");
        assert_eq!(id.member(), None);
    }

    #[test]
    fn test_parse_member_id() {
        let id = ShapeId::parse("example.weather#Forecast$chance").unwrap();
        assert_eq!(id.member(), Some("chance"));
        assert_eq!(id.to_string(), "example.weather#Forecast$chance");
        assert_eq!(id.without_member().to_string(), "example.weather#Forecast");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["Forecast", "#Forecast", "ns#", "ns#1abc", "ns..x#A", "ns#A$", "ns#A$b$c"] {
            assert!(ShapeId::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_container_sorts_before_members() {
        let container = ShapeId::parse("a#B").unwrap();
        let member = container.with_member("c");
        assert!(container < member);
    }
}
