use std::sync::Arc;

use actix_web::{
    get,
    middleware::{self, Logger},
    web, App, HttpServer, Responder,
};
use anyhow::Context;

mod blueprint;
mod db;
mod models;
mod routes;
mod util;

use blueprint::filters::FilterKind;
use blueprint::BlueprintService;
use db::{BlueprintStore, InMemoryStore, SqliteStore};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DB_PATH: &str = "blueprints.db";

#[get("/")]
async fn index() -> impl Responder {
    "ok"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let filter_kind: FilterKind = std::env::var("BLUEPRINTS_FILTER")
        .unwrap_or_else(|_| "identity".into())
        .parse()
        .map_err(anyhow::Error::msg)?;

    let backend = std::env::var("BLUEPRINTS_STORE").unwrap_or_else(|_| "memory".into());
    let store: Arc<dyn BlueprintStore> = match backend.as_str() {
        "sqlite" => {
            let path =
                std::env::var("BLUEPRINTS_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.into());
            log::info!("using sqlite store at {path}");
            Arc::new(
                SqliteStore::open(&path)
                    .await
                    .with_context(|| format!("opening sqlite store at {path}"))?,
            )
        }
        "memory" => {
            log::info!("using in-memory store");
            Arc::new(InMemoryStore::new())
        }
        other => anyhow::bail!("unknown store backend: {other}"),
    };
    log::info!("read filter: {filter_kind:?}");

    let service = web::Data::new(BlueprintService::new(store, filter_kind.into_filter()));

    let addr = std::env::var("BLUEPRINTS_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into());
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(service.clone())
            .configure(routes::v1::config)
            .service(index)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
