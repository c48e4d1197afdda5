//! Handler for POST /
//!
//! Creates a token from the posted record, filling in the ID and creation
//! instant when absent, and returns the stored record together with its
//! signed envelope.

use actix_web::{web, HttpResponse};

use tokens_core::domain::entities::token::RefreshToken;
use tokens_core::errors::TokenError;
use tokens_core::repositories::token::r#trait::TokenRepository;

use crate::dto::{
    ApiResponse, RefreshTokenDto, RequestError, ERR_CONFLICT, ERR_MISSING,
};
use crate::handlers::error::{act_of_god, invalid_format};

use super::AppState;

pub async fn create_token<R: TokenRepository + 'static>(
    state: web::Data<AppState<R>>,
    body: web::Bytes,
) -> HttpResponse {
    let Ok(dto) = serde_json::from_slice::<RefreshTokenDto>(&body) else {
        return invalid_format();
    };

    let token = RefreshToken::from(dto).fill_defaults();

    let mut request_errors = Vec::new();
    if token.created_from.is_empty() {
        request_errors.push(RequestError::field(ERR_MISSING, "/createdFrom"));
    }
    if token.profile_id.is_empty() {
        request_errors.push(RequestError::field(ERR_MISSING, "/profileID"));
    }
    if token.client_id.is_empty() {
        request_errors.push(RequestError::field(ERR_MISSING, "/clientID"));
    }
    if !request_errors.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::errors(request_errors));
    }

    match state.service.repository().create_token(token.clone()).await {
        Ok(()) => {}
        Err(TokenError::TokenAlreadyExists) => {
            return HttpResponse::BadRequest().json(ApiResponse::errors(vec![
                RequestError::field(ERR_CONFLICT, "/id"),
            ]));
        }
        Err(err) => return act_of_god(&err),
    }

    let envelope = match state.service.create_jwt(&token) {
        Ok(envelope) => envelope,
        Err(err) => return act_of_god(&err),
    };

    HttpResponse::Created().json(ApiResponse::token(RefreshTokenDto::with_envelope(
        &token, envelope,
    )))
}
