//! Verification endpoint served by the identity-owning service.
//!
//! Dependent services call this with the `Token` header they received and get
//! an [`AuthOutcome`] back. Domain outcomes are always `200` with the outcome
//! in the body; only a verifier failure is answered with `500`, which the
//! caller treats as a transport failure.
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::AuthError;
use crate::middleware::extract_token;
use crate::outcome::{AuthOutcome, PROTOCOL_HEADER, PROTOCOL_VERSION};
use crate::resolver::Authenticator;

/// `GET /auth` handler. Mount it on a public route; it authenticates by itself.
pub async fn verify_token(State(auth): State<Authenticator>, headers: HeaderMap) -> Response {
    let resolution = match extract_token(&headers) {
        Ok(token) => auth.resolve(token).await,
        Err(err) => Err(err),
    };

    match AuthOutcome::from_resolution(&resolution) {
        Some(outcome) => (
            StatusCode::OK,
            [(PROTOCOL_HEADER, HeaderValue::from(u16::from(PROTOCOL_VERSION)))],
            Json(outcome),
        )
            .into_response(),
        None => AuthError::VerifierTransportFailure.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, body::to_bytes, http::Request, routing::get};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::resolver::IdentityResolver;
    use crate::subject::SubjectId;

    struct Fixed(Result<SubjectId, AuthError>);

    #[async_trait::async_trait]
    impl IdentityResolver for Fixed {
        async fn resolve(&self, _token: &str) -> Result<SubjectId, AuthError> {
            self.0
        }
    }

    fn app(result: Result<SubjectId, AuthError>) -> Router {
        let auth = Authenticator::new(std::sync::Arc::new(Fixed(result)));
        Router::new().route("/auth", get(verify_token)).with_state(auth)
    }

    async fn call(app: Router, token: Option<&str>) -> (StatusCode, HeaderMap, serde_json::Value) {
        let mut req = Request::builder().uri("/auth");
        if let Some(token) = token {
            req = req.header("token", token);
        }
        let response = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn ok_carries_subject_and_version() {
        let (status, headers, body) = call(app(Ok(SubjectId::new(7).unwrap())), Some("t")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["auth-protocol"], "1");
        assert_eq!(body, json!({"Status": 3, "ID": 7}));
    }

    #[tokio::test]
    async fn missing_token_is_reported_in_body() {
        let (status, _, body) = call(app(Ok(SubjectId::new(7).unwrap())), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"Status": 0, "ID": 0}));
    }

    #[tokio::test]
    async fn domain_rejections_are_200() {
        let (status, _, body) = call(app(Err(AuthError::NonIntegerSubject)), Some("t")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"Status": 1, "ID": 0}));

        let (status, _, body) = call(app(Err(AuthError::SubjectNotFound)), Some("t")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"Status": 2, "ID": 0}));
    }

    #[tokio::test]
    async fn verifier_failure_is_500() {
        let (status, headers, body) =
            call(app(Err(AuthError::VerifierTransportFailure)), Some("t")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(headers.get("auth-protocol").is_none());
        assert_eq!(body, json!({"message": "internal server error"}));
    }
}
