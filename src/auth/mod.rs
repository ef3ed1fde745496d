pub mod authenticator;
pub mod extractors;
pub mod guard;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export the pieces handlers use all the time.
pub use authenticator::authenticate;
pub use extractors::BearerToken;
pub use password::{hash_password, verify_password};
pub use token::{TokenService, DEFAULT_TOKEN_TTL_MINUTES};

/// OAuth2-style login form. The field is called `username` on the wire but
/// carries the user's email address, which is the canonical identity key.
///
/// Deliberately not validated: a malformed address goes through the same
/// authentication path as a wrong password and gets the same generic 401.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_accepts_oauth2_field_names() {
        let form: LoginForm =
            serde_json::from_str(r#"{"username": "alice@example.com", "password": "password123"}"#)
                .unwrap();
        assert_eq!(form.username, "alice@example.com");
    }

    #[test]
    fn test_token_response_type() {
        let response = TokenResponse::bearer("abc.def.ghi".to_string());
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.access_token, "abc.def.ghi");
    }
}
