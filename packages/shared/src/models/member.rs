use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "member_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    User,
    Admin,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::User => "USER",
            MemberRole::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: MemberRole,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a member row; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub role: MemberRole,
}

impl NewMember {
    pub fn new(email: &str, username: &str, password_hash: Option<String>) -> Self {
        NewMember {
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
            role: MemberRole::User,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_member_defaults_to_user_role() {
        let member = NewMember::new("a@b.com", "alice", None);
        assert_eq!(member.role, MemberRole::User);
        assert!(member.password_hash.is_none());
    }

    #[test]
    fn test_member_serialization_hides_credentials() {
        let member = Member {
            id: 7,
            email: "a@b.com".to_string(),
            username: "alice".to_string(),
            password_hash: Some("$argon2id$secret".to_string()),
            role: MemberRole::Admin,
            refresh_token: Some("opaque".to_string()),
            refresh_token_expiry: Some(Utc::now()),
            created_at: Utc::now(),
        };

        let serialized = serde_json::to_string(&member).unwrap();
        assert!(serialized.contains("\"role\":\"ADMIN\""));
        assert!(!serialized.contains("argon2"));
        assert!(!serialized.contains("opaque"));
        assert!(serialized.contains("\"createdAt\""));
        assert!(!serialized.contains("created_at"));
    }
}
