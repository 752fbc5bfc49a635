//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Driver identifier (opaque, issued by the identity collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    /// Creates a new DriverId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("driver_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a passenger profile in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerId(Uuid);

impl PassengerId {
    /// Creates a new random PassengerId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PassengerId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PassengerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PassengerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_id_rejects_empty_string() {
        assert!(DriverId::new("").is_err());
    }

    #[test]
    fn driver_id_accepts_opaque_values() {
        let id = DriverId::new("drv_8f2k1").unwrap();
        assert_eq!(id.as_str(), "drv_8f2k1");
    }

    #[test]
    fn driver_id_serializes_transparently() {
        let id = DriverId::new("drv_1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"drv_1\"");
    }

    #[test]
    fn passenger_id_roundtrips_through_string() {
        let id = PassengerId::new();
        let parsed: PassengerId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn passenger_ids_are_unique() {
        assert_ne!(PassengerId::new(), PassengerId::new());
    }
}
