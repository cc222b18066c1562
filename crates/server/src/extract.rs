//! Request body extractors

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::de::DeserializeOwned;

/// Body accepted either as JSON or as `application/x-www-form-urlencoded`.
///
/// The `Content-Type` header picks the decoder; anything that is not a form
/// goes through [`Json`] and gets its usual rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOrForm<T>(pub T);

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self(value));
        }

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Self(value))
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Credentials {
        username: String,
        password: String,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::post("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_decodes_form_body() {
        let JsonOrForm(creds) = JsonOrForm::<Credentials>::from_request(
            request(
                "application/x-www-form-urlencoded; charset=UTF-8",
                "username=fred&password=p%40ss",
            ),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(creds.username, "fred");
        assert_eq!(creds.password, "p@ss");
    }

    #[tokio::test]
    async fn test_decodes_json_body() {
        let JsonOrForm(creds) = JsonOrForm::<Credentials>::from_request(
            request(
                "application/json",
                r#"{"username":"fred","password":"pw"}"#,
            ),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(creds.password, "pw");
    }

    #[tokio::test]
    async fn test_other_content_types_are_rejected() {
        let result =
            JsonOrForm::<Credentials>::from_request(request("text/plain", "fred:pw"), &()).await;

        let rejection = result.unwrap_err();
        assert!(rejection.status().is_client_error());
    }
}
