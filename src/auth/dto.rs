use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// User as exposed to clients, field names matching the frontend contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_pic: String,
    pub cover_image: String,
    pub bio: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            profile_pic: u.profile_pic,
            cover_image: u.cover_image,
            bio: u.bio,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImageResponse {
    pub message: String,
    pub cover_image: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            profile_pic: "https://cdn.example.com/profile/a.jpg".into(),
            cover_image: String::new(),
            bio: "writes about compilers".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn public_user_uses_camel_case_and_drops_hash() {
        let public: PublicUser = sample_user().into();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("profilePic").is_some());
        assert!(json.get("coverImage").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("profile_pic").is_none());
    }

    #[test]
    fn change_password_request_accepts_camel_case() {
        let req: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword": "old-pass", "newPassword": "new-pass"}"#,
        )
        .unwrap();
        assert_eq!(req.current_password, "old-pass");
        assert_eq!(req.new_password, "new-pass");
    }

    #[test]
    fn login_request_defaults_missing_fields_to_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.email.is_empty());
        assert!(req.password.is_empty());
    }
}
