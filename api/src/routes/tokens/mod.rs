//! Token route handlers.
//!
//! One module per endpoint:
//! - POST `/` creates a token from the posted record
//! - GET `/{id}` fetches a token
//! - PATCH `/{id}` applies revoke/use flags
//! - POST `/{id}` validates a presented envelope against the record

pub mod create;
pub mod get;
pub mod update;
pub mod validate;

use actix_web::web;

use tokens_core::repositories::token::r#trait::TokenRepository;
use tokens_core::services::token::TokenService;

/// Shared application state handed to every handler.
pub struct AppState<R: TokenRepository> {
    pub service: TokenService<R>,
}

/// Registers the token routes on a scope.
pub fn configure<R: TokenRepository + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create::create_token::<R>))
        .route("/", web::post().to(create::create_token::<R>))
        .route("/{id}", web::get().to(get::get_token::<R>))
        .route("/{id}", web::patch().to(update::update_token::<R>))
        .route("/{id}", web::post().to(validate::validate_token::<R>));
}
