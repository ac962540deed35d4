use serde::{Deserialize, Serialize};

use crate::auth::repo::{NewProfile, Profile};

/// Request body for account registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub profile: NewProfile,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_password: String,
}

/// Response returned after register, login or password reset.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: Profile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::UserType;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn register_request_accepts_flat_body() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{
                "email": "a@b.com",
                "password": "Secret1!",
                "first_name": "A",
                "last_name": "B",
                "user_type": "candidate",
                "gender": "f"
            }"#,
        )
        .expect("deserialize register body");
        assert_eq!(req.email, "a@b.com");
        assert_eq!(req.profile.user_type, UserType::Candidate);
        assert_eq!(req.profile.gender, "f");
    }

    #[test]
    fn missing_email_defaults_to_empty() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"password": "x"}"#).expect("deserialize login body");
        assert!(req.email.is_empty());
    }

    #[test]
    fn auth_response_has_the_wire_shape() {
        let response = AuthResponse {
            success: true,
            token: "jwt".into(),
            user: Profile {
                id: Uuid::new_v4(),
                email: "a@b.com".into(),
                credential_id: Uuid::new_v4(),
                first_name: "A".into(),
                last_name: "B".into(),
                user_type: UserType::Candidate,
                gender: "f".into(),
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
        };
        let json = serde_json::to_value(&response).expect("serialize auth response");
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["token"], serde_json::json!("jwt"));
        assert_eq!(json["user"]["email"], serde_json::json!("a@b.com"));
    }
}
