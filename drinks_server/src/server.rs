use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use drinks_engine::{RecipeApi, SqliteDatabase};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    helpers::{json_config, path_config},
    jwks::RemoteJwks,
    routes::{
        health,
        not_found,
        CreateDrinkRoute,
        DeleteDrinkRoute,
        DrinksDetailRoute,
        DrinksRoute,
        UpdateDrinkRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.reset_database {
        let seed = db.reset_with_seed().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
        info!("🚀️ Database reset. Seeded with drink #{} '{}'", seed.id, seed.title);
    }
    let keys = RemoteJwks::new(&config.auth).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Verifying tokens with keys from {}", keys.url());
    let verifier = TokenVerifier::new(Arc::new(keys), &config.auth);
    let srv = create_server_instance(config, db, verifier)?;
    srv.await.map_err(ServerError::from)
}

/// Builds the HTTP server. The token verifier (and therefore its key set cache) is shared by all workers.
pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    verifier: TokenVerifier,
) -> Result<Server, ServerError> {
    let verifier = web::Data::new(verifier);
    let srv = HttpServer::new(move || {
        let recipe_api = RecipeApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("drinks::access_log"))
            .app_data(web::Data::new(recipe_api))
            .app_data(verifier.clone())
            .app_data(json_config())
            .app_data(path_config())
            .service(health)
            .service(DrinksRoute::<SqliteDatabase>::new())
            .service(DrinksDetailRoute::<SqliteDatabase>::new())
            .service(CreateDrinkRoute::<SqliteDatabase>::new())
            .service(UpdateDrinkRoute::<SqliteDatabase>::new())
            .service(DeleteDrinkRoute::<SqliteDatabase>::new())
            .default_service(web::to(not_found))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
