/// Request extractors
///
/// [`ValidJson`] deserializes a JSON body and runs its `validator` rules.
/// Both failure kinds become [`ApiError`] 400 responses with the standard
/// error body, instead of axum's plain-text rejections.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has passed validation
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header, http::StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Login {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 1, message = "Password is required"))]
        password: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ValidJson(login) = ValidJson::<Login>::from_request(
            json_request(r#"{"email":"a@example.com","password":"x"}"#),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(login.email, "a@example.com");
        assert_eq!(login.password, "x");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = ValidJson::<Login>::from_request(json_request(r#"{"email":"a@example.com"}"#), &())
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failed_rule_is_validation_error() {
        let err = ValidJson::<Login>::from_request(
            json_request(r#"{"email":"not-an-email","password":""}"#),
            &(),
        )
        .await
        .unwrap_err();

        match err {
            ApiError::ValidationError(details) => assert_eq!(details.len(), 2),
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }
}
