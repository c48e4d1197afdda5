//! Handler for POST /{id}
//!
//! Validates a presented envelope and, when its identifier claim matches the
//! route, returns the live record. Every way an envelope can be bad reports
//! the same slug; a revoked or consumed record reports a conflict.

use actix_web::{web, HttpResponse};

use tokens_core::errors::TokenError;
use tokens_core::repositories::token::r#trait::TokenRepository;

use crate::dto::{
    ApiResponse, RefreshTokenDto, RequestError, ValidateTokenRequest, ERR_CONFLICT,
    ERR_INVALID_VALUE,
};
use crate::handlers::error::{act_of_god, invalid_format};

use super::AppState;

pub async fn validate_token<R: TokenRepository + 'static>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let id = path.into_inner();

    let Ok(request) = serde_json::from_slice::<ValidateTokenRequest>(&body) else {
        return invalid_format();
    };

    match state.service.validate(&request.token).await {
        Ok(record) => {
            if record.id != id {
                return HttpResponse::BadRequest().json(ApiResponse::errors(vec![
                    RequestError::param(ERR_INVALID_VALUE, "{id}"),
                ]));
            }
            HttpResponse::Ok().json(ApiResponse::token(RefreshTokenDto::from_record(&record)))
        }
        Err(TokenError::InvalidToken { .. }) => HttpResponse::BadRequest().json(
            ApiResponse::errors(vec![RequestError::new(ERR_INVALID_VALUE)]),
        ),
        Err(TokenError::TokenRevoked) | Err(TokenError::TokenUsed) => HttpResponse::BadRequest()
            .json(ApiResponse::errors(vec![RequestError::new(ERR_CONFLICT)])),
        Err(err) => act_of_god(&err),
    }
}
