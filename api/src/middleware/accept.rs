//! Content negotiation middleware.
//!
//! The service speaks exactly one media type. Requests whose `Accept` header
//! rules out `application/json` are answered with `406 Not Acceptable`
//! before they reach a handler; requests without an `Accept` header pass.

use std::future::{ready, Ready};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::dto::{ApiResponse, RequestError, ERR_INVALID_VALUE};

/// Returns true if the `Accept` header value admits `application/json`.
fn accepts_json(accept: &str) -> bool {
    accept.split(',').any(|entry| {
        let media_type = entry.split(';').next().unwrap_or("").trim();
        matches!(
            media_type,
            "application/json" | "application/*" | "*/*" | ""
        )
    })
}

/// Middleware factory enforcing JSON content negotiation.
pub struct AcceptJson;

impl<S, B> Transform<S, ServiceRequest> for AcceptJson
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AcceptJsonService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AcceptJsonService { service }))
    }
}

pub struct AcceptJsonService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AcceptJsonService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let acceptable = req
            .headers()
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .map_or(true, accepts_json);

        if !acceptable {
            let response = HttpResponse::NotAcceptable().json(ApiResponse::errors(vec![
                RequestError::header(ERR_INVALID_VALUE, "Accept"),
            ]));
            let (req, _) = req.into_parts();
            let res = ServiceResponse::new(req, response).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}
