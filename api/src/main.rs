use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use tokens_api::config::ApiConfig;
use tokens_api::middleware::accept::AcceptJson;
use tokens_api::routes::tokens::{configure, AppState};
use tokens_core::services::token::TokenService;
use tokens_infra::database::connection::{create_pool, DatabaseConfig};
use tokens_infra::database::postgres::PostgresTokenRepository;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ApiConfig::from_env();
    if config.database_url.is_empty() {
        error!("no PostgreSQL connection string set, refusing to start; set PG_DB");
        std::process::exit(1);
    }

    let pool = match create_pool(&DatabaseConfig::with_url(config.database_url.clone())).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("error connecting to PostgreSQL: {err}");
            std::process::exit(1);
        }
    };

    let repository = PostgresTokenRepository::new(pool);
    let service = match TokenService::new(repository, config.tokens.clone()) {
        Ok(service) => service,
        Err(err) => {
            error!("error setting up token service: {err}");
            std::process::exit(1);
        }
    };

    let state = web::Data::new(AppState { service });
    let base_path = config.base_path.clone();
    info!(
        "token service listening on {}:{} under {}",
        config.host, config.port, config.base_path,
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope(&base_path)
                    .configure(configure::<PostgresTokenRepository>)
                    .wrap(AcceptJson),
            )
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
