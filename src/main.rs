use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use dinehub::config::{Config, PaystackConfig};
use dinehub::handlers::routes;
use dinehub::state::AppState;
use dinehub::store::PgStore;
use dinehub::utils::auth::SessionKeys;
use dinehub::utils::paystack::PaystackClient;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env(8080)?;
    let paystack = PaystackConfig::from_env()?;

    let store = PgStore::connect(&config.database_url, config.database_max_connections).await?;
    log::info!("Connected to PostgreSQL");
    store.migrate().await?;
    log::info!("Food database migrations applied");

    let state = web::Data::new(AppState {
        store: Arc::new(store),
        gateway: Arc::new(PaystackClient::new(&paystack)?),
        sessions: SessionKeys::new(config.jwt_secret.clone(), config.session_ttl_hours),
        paystack_public_key: paystack.public_key.clone(),
        app_base_url: paystack.app_base_url.clone(),
    });

    let addr = config.bind_address();
    log::info!("Food ordering app listening on {addr}");

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
