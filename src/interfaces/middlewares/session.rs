use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};
use uuid::Uuid;

use crate::utils::valid_uuid::valid_uuid;

/// Opaque session identifier placed in request extensions by [`SessionMiddleware`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionId(pub String);

#[derive(Debug, Clone)]
struct SessionCookie {
    name: String,
    ttl_secs: u64,
}

/// Resolves the session cookie for every request, issuing a new id when the
/// cookie is missing or malformed.
#[derive(Clone)]
pub struct SessionMiddleware {
    cookie: Rc<SessionCookie>,
}

impl SessionMiddleware {
    pub fn new(cookie_name: impl Into<String>, ttl_secs: u64) -> Self {
        SessionMiddleware {
            cookie: Rc::new(SessionCookie {
                name: cookie_name.into(),
                ttl_secs,
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionMiddlewareService {
            service: Rc::new(service),
            cookie: Rc::clone(&self.cookie),
        })
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    cookie: Rc<SessionCookie>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = Rc::clone(&self.cookie);

        Box::pin(async move {
            let existing = req
                .cookie(&config.name)
                .and_then(|c| valid_uuid(c.value()));

            let (session_id, fresh) = match existing {
                Some(id) => (id, false),
                None => (Uuid::new_v4(), true),
            };

            req.extensions_mut().insert(SessionId(session_id.to_string()));

            let mut res = service.call(req).await?;

            if fresh {
                let cookie = Cookie::build(config.name.clone(), session_id.to_string())
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .max_age(CookieDuration::seconds(config.ttl_secs as i64))
                    .finish();
                res.response_mut().add_cookie(&cookie)?;
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    async fn echo_session(req: HttpRequest) -> HttpResponse {
        let id = req.extensions().get::<SessionId>().map(|s| s.0.clone()).unwrap_or_default();
        HttpResponse::Ok().body(id)
    }

    #[actix_rt::test]
    async fn issues_cookie_when_missing() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new("contact_session", 600))
                .route("/", web::get().to(echo_session)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        let cookie = res.response().cookies().find(|c| c.name() == "contact_session").unwrap().into_owned();
        assert!(valid_uuid(cookie.value()).is_some());
        assert_eq!(cookie.http_only(), Some(true));

        let body = test::read_body(res).await;
        assert_eq!(body, cookie.value().as_bytes());
    }

    #[actix_rt::test]
    async fn reuses_valid_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new("contact_session", 600))
                .route("/", web::get().to(echo_session)),
        )
        .await;
        let id = Uuid::new_v4().to_string();

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new("contact_session", id.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert!(res.response().cookies().next().is_none());
        assert_eq!(test::read_body(res).await, id.as_bytes());
    }

    #[actix_rt::test]
    async fn replaces_malformed_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new("contact_session", 600))
                .route("/", web::get().to(echo_session)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new("contact_session", "../../etc/passwd"))
            .to_request();
        let res = test::call_service(&app, req).await;

        let cookie = res.response().cookies().find(|c| c.name() == "contact_session").unwrap();
        assert_ne!(cookie.value(), "../../etc/passwd");
    }
}
