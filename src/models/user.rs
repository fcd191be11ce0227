use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Elderly,
    Caregiver,
    #[serde(other)]
    Unrecognized,
}

impl Role {
    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "elderly" => Role::Elderly,
            "caregiver" => Role::Caregiver,
            _ => Role::Unrecognized,
        }
    }
}

/// The user on whose behalf a request runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: Uuid,
    pub role: Role,
    pub bearer_token: Option<String>,
}

impl ActingUser {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role, bearer_token: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConnectedElderly {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Connection {
    pub id: Uuid,
    pub elderly_id: Uuid,
    pub caregiver_id: Uuid,
    pub status: String,
    #[serde(default)]
    pub elderly_name: Option<String>,
    #[serde(default)]
    pub caregiver_name: Option<String>,
}

impl Connection {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("Caregiver"), Role::Caregiver);
        assert_eq!(Role::parse(" elderly "), Role::Elderly);
        assert_eq!(Role::parse("admin"), Role::Unrecognized);
    }

    #[test]
    fn test_unknown_role_deserializes_as_unrecognized() {
        let role: Role = serde_json::from_str("\"nurse\"").unwrap();
        assert_eq!(role, Role::Unrecognized);
    }
}
