//! Handler for PATCH /{id}
//!
//! Applies a revoke/use change to the record named by the route. The change
//! always carries the route ID as its filter, so the no-filter programming
//! error cannot originate here.

use actix_web::{web, HttpResponse};

use tokens_core::errors::TokenError;
use tokens_core::repositories::token::r#trait::TokenRepository;

use crate::dto::{
    ApiResponse, RefreshTokenChangeDto, RefreshTokenDto, RequestError, ERR_NOT_FOUND,
};
use crate::handlers::error::{act_of_god, invalid_format};

use super::AppState;

pub async fn update_token<R: TokenRepository + 'static>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let id = path.into_inner();

    let token = match state.service.repository().get_token(&id).await {
        Ok(token) => token,
        Err(TokenError::TokenNotFound) => {
            return HttpResponse::NotFound().json(ApiResponse::errors(vec![
                RequestError::param(ERR_NOT_FOUND, "{id}"),
            ]));
        }
        Err(err) => return act_of_god(&err),
    };

    let Ok(dto) = serde_json::from_slice::<RefreshTokenChangeDto>(&body) else {
        return invalid_format();
    };
    let change = dto.into_change(id);

    if let Err(err) = state.service.repository().update_tokens(change.clone()).await {
        return act_of_god(&err);
    }

    let updated = token.apply_change(&change);
    HttpResponse::Ok().json(ApiResponse::token(RefreshTokenDto::from_record(&updated)))
}
