use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request},
    http::{StatusCode, header},
    response::Response,
};
use tracing::debug;
use validator::{Validate, ValidationErrors};

use clientauth_auth::AuthError;
use clientauth_models::Credentials;

use crate::middleware::AuthEngine;

fn format_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().filter_map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .or_else(|| Some(format!("{} is invalid", field)))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Login values taken from a JSON body, a urlencoded form or the query
/// string, then validated.
///
/// Rejections go through the engine's `Unauthorized` hook. A request that
/// carries the superuser pair is let through whatever its other fields hold.
#[derive(Debug, Clone, Default)]
pub struct LoginCredentials(pub Credentials);

impl FromRequest<AuthEngine> for LoginCredentials {
    type Rejection = Response;

    async fn from_request(req: Request, engine: &AuthEngine) -> Result<Self, Self::Rejection> {
        let credentials = read_credentials(req).await.map_err(|reason| {
            debug!(%reason, "unreadable login values");
            engine.reject(&AuthError::MissingLoginValues)
        })?;

        if let Err(errors) = credentials.validate() {
            if !engine.is_superuser(&credentials) {
                return Err(engine.unauthorized(StatusCode::UNAUTHORIZED, &format_errors(&errors)));
            }
            debug!("superuser pair given, skipping login value checks");
        }

        Ok(LoginCredentials(credentials))
    }
}

async fn read_credentials(req: Request) -> Result<Credentials, String> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let from_query = Query::<Credentials>::try_from_uri(req.uri())
        .map(|Query(credentials)| credentials)
        .map_err(|rejection| rejection.body_text());

    if content_type.starts_with("application/json") {
        let Json(credentials) = Json::<Credentials>::from_request(req, &())
            .await
            .map_err(|rejection| rejection.body_text())?;
        Ok(fill_missing(credentials, from_query.ok()))
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(credentials) = Form::<Credentials>::from_request(req, &())
            .await
            .map_err(|rejection| rejection.body_text())?;
        Ok(fill_missing(credentials, from_query.ok()))
    } else {
        from_query
    }
}

/// Body values win; empty fields fall back to the query string.
fn fill_missing(mut credentials: Credentials, query: Option<Credentials>) -> Credentials {
    let Some(query) = query else {
        return credentials;
    };
    for (field, fallback) in [
        (&mut credentials.username, query.username),
        (&mut credentials.password, query.password),
        (&mut credentials.phone_number, query.phone_number),
        (&mut credentials.code, query.code),
    ] {
        if field.is_empty() {
            *field = fallback;
        }
    }
    credentials
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, content_type: Option<&str>, body: &str) -> Request {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_reads_query_parameters() {
        let req = request("/login?phone_number=15000000000&code=123456", None, "");
        let credentials = read_credentials(req).await.unwrap();
        assert_eq!(credentials.phone_number, "15000000000");
        assert_eq!(credentials.code, "123456");
    }

    #[tokio::test]
    async fn test_reads_json_body() {
        let req = request(
            "/login",
            Some("application/json"),
            r#"{"username":"admin","password":"s3cret"}"#,
        );
        let credentials = read_credentials(req).await.unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "s3cret");
    }

    #[tokio::test]
    async fn test_form_body_falls_back_to_query() {
        let req = request(
            "/login?code=123456",
            Some("application/x-www-form-urlencoded"),
            "phone_number=15000000000",
        );
        let credentials = read_credentials(req).await.unwrap();
        assert_eq!(credentials.phone_number, "15000000000");
        assert_eq!(credentials.code, "123456");
    }

    #[tokio::test]
    async fn test_rejects_broken_json() {
        let req = request("/login", Some("application/json"), "{not json");
        assert!(read_credentials(req).await.is_err());
    }

    #[test]
    fn test_format_errors_uses_message() {
        let credentials = Credentials::phone_and_code("12ab", "123456");
        let errors = credentials.validate().unwrap_err();
        assert_eq!(format_errors(&errors), "phone_number is invalid");
    }
}
