use actix_multipart::{form::MultipartForm, MultipartError};
use actix_web::{
    dev::{Payload, UrlEncoded},
    error::{PayloadError, UrlencodedError},
    http::{Method, StatusCode},
    FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use crate::{
    constants::FORM_BODY_LIMIT,
    entities::contact::{ContactForm, ContactFormUpload},
    errors::ContactError,
    middlewares::session::SessionId,
};

/// Extractor for the caller's session id, as resolved by `SessionMiddleware`.
/// Returns 500 if the middleware is not mounted.
/// Usage: Add `session: ContactSession` as a parameter to your handler function.
#[derive(Debug)]
pub struct ContactSession(pub String);

impl FromRequest for ContactSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<SessionId>() {
            Some(session) => ready(Ok(ContactSession(session.0.clone()))),
            None => {
                tracing::error!("SessionId missing, is SessionMiddleware mounted?");
                ready(Err(ContactError::Unexpected("Session unavailable".into()).into()))
            }
        }
    }
}

/// The posted contact form, read from an urlencoded or multipart body.
///
/// Non-POST requests and bodies of any other content type yield an empty form,
/// which validation then reports field by field. Oversized or unreadable bodies
/// are rejected with their own JSON error.
#[derive(Debug)]
pub struct ContactPayload(pub ContactForm);

impl FromRequest for ContactPayload {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if req.method() != Method::POST {
            return Box::pin(ready(Ok(ContactPayload(ContactForm::default()))));
        }

        if req.content_type().eq_ignore_ascii_case("multipart/form-data") {
            let upload = MultipartForm::<ContactFormUpload>::from_request(req, payload);
            return Box::pin(async move {
                match upload.await {
                    Ok(form) => Ok(ContactPayload(form.into_inner().into())),
                    Err(e) => Err(multipart_rejection(&e).into()),
                }
            });
        }

        let urlencoded = UrlEncoded::<ContactForm>::new(req, payload).limit(FORM_BODY_LIMIT);
        Box::pin(async move {
            match urlencoded.await {
                Ok(form) => Ok(ContactPayload(form)),
                Err(UrlencodedError::ContentType) => Ok(ContactPayload(ContactForm::default())),
                Err(e) => Err(urlencoded_rejection(e).into()),
            }
        })
    }
}

fn urlencoded_rejection(err: UrlencodedError) -> ContactError {
    match err {
        UrlencodedError::Overflow { .. } | UrlencodedError::Payload(PayloadError::Overflow) => {
            tracing::debug!("Contact form body over {} bytes", FORM_BODY_LIMIT);
            ContactError::PayloadTooLarge
        }
        other => {
            tracing::debug!("Unreadable contact form body: {}", other);
            ContactError::MalformedPayload(other.to_string())
        }
    }
}

fn multipart_rejection(err: &actix_web::Error) -> ContactError {
    let overflow = matches!(
        err.as_error::<MultipartError>(),
        Some(MultipartError::Payload(PayloadError::Overflow))
    ) || err.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE;

    if overflow {
        tracing::debug!("Multipart contact form over the configured limit");
        ContactError::PayloadTooLarge
    } else {
        tracing::debug!("Unreadable multipart contact form: {}", err);
        ContactError::MalformedPayload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_multipart::form::MultipartFormConfig;
    use actix_web::{http::header, test::TestRequest};

    const BOUNDARY: &str = "contact-boundary";

    fn multipart_body(fields: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn extract(request: TestRequest) -> Result<ContactForm, actix_web::Error> {
        let (req, mut payload) = request.to_http_parts();
        ContactPayload::from_request(&req, &mut payload).await.map(|p| p.0)
    }

    fn rejection(err: &actix_web::Error) -> Option<&ContactError> {
        err.as_error::<ContactError>()
    }

    #[actix_rt::test]
    async fn reads_urlencoded_form() {
        let form = extract(
            TestRequest::post()
                .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
                .set_payload("name=Jo+Visitor&email=jo%40example.com&subject=Hi&message=Hello"),
        )
        .await
        .unwrap();

        assert_eq!(form.name, "Jo Visitor");
        assert_eq!(form.email, "jo@example.com");
        assert_eq!(form.message, "Hello");
    }

    #[actix_rt::test]
    async fn accepts_messages_beyond_default_form_limit() {
        let message = "x".repeat(20_000);
        let form = extract(
            TestRequest::post()
                .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
                .set_payload(format!("name=Jo&email=jo%40example.com&subject=Hi&message={message}")),
        )
        .await
        .unwrap();

        assert_eq!(form.message.len(), 20_000);
        assert_eq!(form.name, "Jo");
    }

    #[actix_rt::test]
    async fn oversized_urlencoded_body_is_rejected() {
        let message = "x".repeat(FORM_BODY_LIMIT + 1);
        let err = extract(
            TestRequest::post()
                .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
                .set_payload(format!("message={message}")),
        )
        .await
        .unwrap_err();

        assert_eq!(rejection(&err), Some(&ContactError::PayloadTooLarge));
    }

    #[actix_rt::test]
    async fn missing_body_or_other_content_type_is_an_empty_form() {
        let form = extract(TestRequest::post()).await.unwrap();
        assert_eq!(form.name, "");

        let form = extract(
            TestRequest::post()
                .insert_header((header::CONTENT_TYPE, "application/json"))
                .set_payload(r#"{"name":"Jo"}"#),
        )
        .await
        .unwrap();
        assert_eq!(form.name, "");
    }

    #[actix_rt::test]
    async fn non_post_requests_skip_the_body() {
        let form = extract(
            TestRequest::get()
                .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
                .set_payload("name=Jo"),
        )
        .await
        .unwrap();

        assert_eq!(form.name, "");
    }

    #[actix_rt::test]
    async fn reads_multipart_form() {
        let body = multipart_body(&[
            ("name", "Jo Visitor"),
            ("email", "jo@example.com"),
            ("subject", "Hello"),
            ("message", "Sent with FormData"),
        ]);

        let form = extract(
            TestRequest::post()
                .insert_header((
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                ))
                .set_payload(body),
        )
        .await
        .unwrap();

        assert_eq!(form.name, "Jo Visitor");
        assert_eq!(form.subject, "Hello");
        assert_eq!(form.message, "Sent with FormData");
    }

    #[actix_rt::test]
    async fn multipart_missing_fields_are_empty() {
        let form = extract(
            TestRequest::post()
                .insert_header((
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                ))
                .set_payload(multipart_body(&[("name", "Jo")])),
        )
        .await
        .unwrap();

        assert_eq!(form.name, "Jo");
        assert_eq!(form.email, "");
        assert_eq!(form.message, "");
    }

    #[actix_rt::test]
    async fn oversized_multipart_body_is_rejected() {
        let message = "x".repeat(512);
        let err = extract(
            TestRequest::post()
                .app_data(MultipartFormConfig::default().total_limit(256).memory_limit(256))
                .insert_header((
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                ))
                .set_payload(multipart_body(&[("message", &message)])),
        )
        .await
        .unwrap_err();

        assert_eq!(rejection(&err), Some(&ContactError::PayloadTooLarge));
    }
}
