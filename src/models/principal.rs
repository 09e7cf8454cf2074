use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access level a principal holds. Stored in Postgres as `principal_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "principal_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A stored account row.
///
/// Carries credential material (`password_hash`, `salt`), so it deliberately
/// does not implement `Serialize`. Hand out [`Principal::sanitized`] or
/// [`Principal::public`] views instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub role: Role,
    pub device_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a principal; credential material is already derived.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub role: Role,
}

/// What the caller may see about their own account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub device_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What anyone else may see, embedded in conversations and support requests.
/// Strips the push token on top of the credential fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub fn sanitized(&self) -> Profile {
        Profile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            device_token: self.device_token.clone(),
            created_at: self.created_at,
        }
    }

    pub fn public(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "deadbeef".to_string(),
            salt: "cafe".to_string(),
            role: Role::User,
            device_token: Some("expo-token".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sanitized_profile_never_carries_credentials() {
        let json = serde_json::to_value(sample().sanitized()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(!keys.contains(&"passwordHash"));
        assert!(!keys.contains(&"salt"));
        assert!(keys.contains(&"deviceToken"));
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn public_profile_also_drops_device_token() {
        let json = serde_json::to_value(sample().public()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("deviceToken"));
        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("salt"));
        assert!(obj.contains_key("email"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
