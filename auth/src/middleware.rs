//! Token check -> identity resolution -> `SubjectId` in request extensions.
//!
//! Per request:
//! 1. read the `Token` header (absent -> 401 `missing token`)
//! 2. resolve it with the configured strategy (local: signature, expiry,
//!    subject claim, existence; remote: one round trip to the owner)
//! 3. on success attach the subject as an extension and as the `Subject`
//!    header, then run the wrapped handler
//!
//! Any rejection short-circuits with `{"message": ...}` and its status code.
use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::resolver::{Authenticator, token_fingerprint};

/// Inbound bearer token header.
pub const TOKEN_HEADER: HeaderName = HeaderName::from_static("token");
/// Subject id propagated to downstream handlers after verification.
pub const SUBJECT_HEADER: HeaderName = HeaderName::from_static("subject");

/// Protect every route currently registered on `router`.
///
/// Routes added after this call are not wrapped, so public routes can be
/// merged in afterwards:
/// ```ignore
/// let protected = auth::middleware::apply(protected_routes(), authenticator);
/// let app = public_routes().merge(protected);
/// ```
pub fn apply<S>(router: Router<S>, auth: Authenticator) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(auth, authenticate))
}

/// Read the bearer token from the request headers.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(TOKEN_HEADER).ok_or(AuthError::MissingToken)?;
    let token = value
        .to_str()
        .map_err(|_| AuthError::InvalidSignatureOrExpiry)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

async fn authenticate(
    State(auth): State<Authenticator>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Only this middleware may set the subject.
    req.headers_mut().remove(SUBJECT_HEADER);

    let token = match extract_token(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(err) => {
            debug!(path = %req.uri().path(), "request without token");
            return Err(err);
        }
    };

    let subject = match auth.resolve(&token).await {
        Ok(subject) => subject,
        Err(err) => {
            if err != AuthError::VerifierTransportFailure {
                warn!(
                    path = %req.uri().path(),
                    token_fp = %token_fingerprint(&token),
                    reason = %err,
                    "authentication rejected"
                );
            }
            return Err(err);
        }
    };

    req.headers_mut()
        .insert(SUBJECT_HEADER, HeaderValue::from(subject.as_i64()));
    // read back by the AuthSubject extractor
    req.extensions_mut().insert(subject);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        map
    }

    #[test]
    fn token_header_is_read_case_insensitively() {
        let map = headers(&[("Token", "abc.def.ghi")]);
        assert_eq!(extract_token(&map), Ok("abc.def.ghi"));
    }

    #[test]
    fn absent_or_blank_is_missing() {
        assert_eq!(extract_token(&HeaderMap::new()), Err(AuthError::MissingToken));
        assert_eq!(
            extract_token(&headers(&[("token", "  ")])),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn authorization_header_is_not_a_token() {
        let map = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&map), Err(AuthError::MissingToken));
    }

    #[test]
    fn opaque_bytes_are_invalid() {
        let mut map = HeaderMap::new();
        map.insert(TOKEN_HEADER, HeaderValue::from_bytes(b"\xfa\xfb").unwrap());
        assert_eq!(extract_token(&map), Err(AuthError::InvalidSignatureOrExpiry));
    }
}
