use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// Extracts the raw bearer token from the `Authorization` header.
///
/// Only the transport concern lives here; handlers pass the extracted token
/// to the access guard, which does the actual validation and user loading.
/// A missing or non-Bearer header is rejected up front with a 401.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token {
            Some(token) if !token.is_empty() => ready(Ok(BearerToken(token.to_string()))),
            _ => {
                let err = AppError::Unauthorized("Not authenticated.".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_bearer_token_extraction() {
        let req = test::TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();

        let mut payload = Payload::None;
        let extracted = BearerToken::from_request(&req, &mut payload).await;
        assert_eq!(extracted.unwrap().0, "abc.def.ghi");
    }

    #[actix_rt::test]
    async fn test_missing_header_is_unauthorized() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let result = BearerToken::from_request(&req, &mut payload).await;
        let err = result.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get("WWW-Authenticate").unwrap(), "Bearer");
    }

    #[actix_rt::test]
    async fn test_non_bearer_scheme_is_rejected() {
        let req = test::TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();

        let mut payload = Payload::None;
        let result = BearerToken::from_request(&req, &mut payload).await;
        assert!(result.is_err());
    }
}
