//! Request ID middleware - tags every request with an `X-Request-ID`.

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::{
    Error, HttpMessage,
    body::{BoxBody, EitherBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::middleware::error::problem_for;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client-supplied ids longer than this are replaced.
const MAX_INCOMING_LEN: usize = 128;

/// Reuses the caller's request id when it is sane, otherwise creates one.
/// The id lands in request extensions, the request span and the response.
/// Problem documents raised by handlers are re-rendered with the id and
/// the request path.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequestIdService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdService { service }))
    }
}

pub struct RequestIdService<S> {
    service: S,
}

fn incoming_id(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_INCOMING_LEN)
        .map(String::from)
}

/// Attach the request id and path to a problem document from this crate.
fn with_request_context<B>(
    res: ServiceResponse<B>,
    request_id: &str,
) -> ServiceResponse<EitherBody<B>> {
    let Some(problem) = res.response().error().and_then(problem_for) else {
        return res.map_into_left_body();
    };

    let problem = problem
        .with_instance(res.request().path())
        .with_request_id(request_id);
    let Ok(json) = serde_json::to_string(&problem) else {
        return res.map_into_left_body();
    };

    // Headers and the attached error stay; only the body is replaced.
    res.map_body(|_, _| BoxBody::new(json)).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for RequestIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = incoming_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut().insert(RequestId(request_id.clone()));

        let span = tracing::info_span!("request_id", request_id = %request_id);
        let fut = self.service.call(req);

        Box::pin(
            async move {
                let mut res = with_request_context(fut.await?, &request_id);

                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    res.headers_mut()
                        .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                }

                Ok(res)
            }
            .instrument(span),
        )
    }
}

/// The current request's id, stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, test, web};
    use serde_json::Value;

    use super::*;
    use crate::middleware::error::AppError;

    #[actix_web::test]
    async fn test_request_id_is_echoed_or_generated() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-Request-ID", "abc-123"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.headers().get("x-request-id").unwrap(), "abc-123");

        let req = test::TestRequest::get().uri("/").to_request();
        let res = test::call_service(&app, req).await;
        let generated = res.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(generated).is_ok());
    }

    #[actix_web::test]
    async fn test_handler_problem_carries_request_id_and_path() {
        let app = test::init_service(App::new().wrap(RequestIdMiddleware).route(
            "/posts/{id}",
            web::get().to(|| async {
                Err::<HttpResponse, _>(AppError::NotFound("Post with id 7 not found".into()))
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/posts/7")
            .insert_header(("X-Request-ID", "trace-42"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 404);
        assert_eq!(res.headers().get("x-request-id").unwrap(), "trace-42");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["request_id"], "trace-42");
        assert_eq!(body["instance"], "/posts/7");
        assert_eq!(body["detail"], "Post with id 7 not found");
    }

    #[actix_web::test]
    async fn test_successful_body_is_untouched() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("plain") })),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, web::Bytes::from_static(b"plain"));
    }
}
