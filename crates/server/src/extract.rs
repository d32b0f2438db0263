use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::errors::JsonApiError;

/// `Json` body extractor whose rejections come back as `JsonApiError`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{header, StatusCode}};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Input {
        #[allow(dead_code)]
        username: Option<String>,
    }

    fn post(body: Body, json: bool) -> Request {
        let mut builder = Request::builder().method("POST").uri("/api/reviews");
        if json {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        builder.body(body).unwrap()
    }

    async fn reject(req: Request) -> JsonApiError {
        match ApiJson::<Input>::from_request(req, &()).await {
            Ok(_) => panic!("body should have been rejected"),
            Err(e) => e,
        }
    }

    #[tokio::test]
    async fn bad_bodies_become_validation_errors() {
        let cases = [
            post(Body::empty(), false),
            post(Body::from("{ nope"), true),
            post(Body::from(r#"{"username":5}"#), true),
        ];
        for req in cases {
            let err = reject(req).await;
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.error, "Validation Error");
            // serde's wording is not echoed back
            assert!(!err.message.unwrap_or_default().contains("invalid type"));
        }
    }

    #[tokio::test]
    async fn good_body_is_extracted() {
        let ApiJson(input) = ApiJson::<Input>::from_request(post(Body::from(r#"{"username":"bob"}"#), true), &())
            .await
            .unwrap_or_else(|e| panic!("rejected: {e:?}"));
        assert_eq!(input.username.as_deref(), Some("bob"));
    }
}
