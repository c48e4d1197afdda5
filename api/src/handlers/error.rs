//! The single place where kernel errors become wire responses.
//!
//! Handlers match the sentinels they expect inline; anything that reaches
//! these helpers is either a malformed request or a genuine server fault.

use actix_web::HttpResponse;

use tokens_core::errors::TokenError;

use crate::dto::{ApiResponse, RequestError, ERR_ACT_OF_GOD, ERR_INVALID_FORMAT};

/// 500 with the generic slug. Every unexpected failure funnels through here
/// so the cause lands in the logs and never on the wire.
pub fn act_of_god(err: &TokenError) -> HttpResponse {
    log::error!("unhandled error serving request: {err}");
    HttpResponse::InternalServerError()
        .json(ApiResponse::errors(vec![RequestError::new(ERR_ACT_OF_GOD)]))
}

/// 400 for a request body that did not decode as JSON.
pub fn invalid_format() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::errors(vec![RequestError::field(
        ERR_INVALID_FORMAT,
        "/",
    )]))
}
