use actix_web::{
    http::header::{self, HeaderMap},
    web, HttpRequest, HttpResponse,
};

use crate::{
    entities::contact::{ContactReply, ContactRequest},
    errors::ContactError,
    use_cases::extractors::{ContactPayload, ContactSession},
    utils::get_client_ip::get_client_ip,
    AppState,
};

/// Accepts every method; the method gate lives in the use case so that
/// non-POST requests get the JSON 405 body.
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: ContactSession,
    ContactPayload(form): ContactPayload,
) -> Result<HttpResponse, ContactError> {
    let request = ContactRequest {
        method: req.method().clone(),
        form,
        client_ip: get_client_ip(&req, state.trust_x_forwarded_for),
        user_agent: header_value(req.headers(), header::USER_AGENT),
        requested_with: header_value(req.headers(), header::HeaderName::from_static("x-requested-with")),
        session_id: session.0,
    };

    match state.contact_handler.handle(request).await? {
        ContactReply::Json(body) => Ok(HttpResponse::Ok().json(body)),
        ContactReply::Redirect(location) => Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish()),
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
