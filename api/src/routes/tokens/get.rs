//! Handler for GET /{id}

use actix_web::{web, HttpResponse};

use tokens_core::errors::TokenError;
use tokens_core::repositories::token::r#trait::TokenRepository;

use crate::dto::{ApiResponse, RefreshTokenDto, RequestError, ERR_NOT_FOUND};
use crate::handlers::error::act_of_god;

use super::AppState;

pub async fn get_token<R: TokenRepository + 'static>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();

    match state.service.repository().get_token(&id).await {
        Ok(token) => HttpResponse::Ok().json(ApiResponse::token(RefreshTokenDto::from_record(
            &token,
        ))),
        Err(TokenError::TokenNotFound) => HttpResponse::NotFound().json(ApiResponse::errors(
            vec![RequestError::param(ERR_NOT_FOUND, "{id}")],
        )),
        Err(err) => act_of_god(&err),
    }
}
