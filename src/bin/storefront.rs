use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use dinehub::config::Config;
use dinehub::storefront::handlers::routes;
use dinehub::storefront::{PgStorefrontStore, StorefrontState};
use dinehub::utils::auth::SessionKeys;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env(8081)?;

    let store =
        PgStorefrontStore::connect(&config.database_url, config.database_max_connections).await?;
    log::info!("Connected to PostgreSQL");
    store.migrate().await?;
    log::info!("Storefront database migrations applied");

    let state = web::Data::new(StorefrontState {
        store: Arc::new(store),
        sessions: SessionKeys::new(config.jwt_secret.clone(), config.session_ttl_hours),
    });

    let addr = config.bind_address();
    log::info!("Storefront listening on {addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
