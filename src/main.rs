use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;
mod store;

use config::Args;
use store::Store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    let store = Store::open(&args.data_file)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    match store.load_document().await {
        Ok(doc) if doc.is_empty() => {
            tracing::info!(path = %store.path().display(), "session document is empty")
        }
        Ok(doc) => tracing::info!(
            path = %store.path().display(),
            users = doc.len(),
            "loaded session document"
        ),
        Err(e) => tracing::warn!("{e}; requests will fail until the file is repaired"),
    }
    let store = web::Data::new(store);
    let settings = args.settings();

    let http_server = HttpServer::new(move || {
        let settings = settings.clone();
        App::new()
            .app_data(store.clone())
            .configure(move |cfg| routes::configure(cfg, &settings))
    });

    tracing::info!("Listening on {}:{}", args.host, args.port);
    http_server.bind((args.host.as_str(), args.port))?.run().await
}
