use crate::error::{ErrorBody, StoreError};
use crate::store::Store;
use actix_files::{Files, NamedFile};
use actix_web::error::JsonPayloadError;
use actix_web::{error, get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const DEFAULT_USERNAME: &str = "guest";

/// Largest accepted `save_array` body, 64 MiB.
pub const DEFAULT_JSON_LIMIT: usize = 64 * 1024 * 1024;

/// Landing page locations and request limits.
#[derive(Clone, Debug)]
pub struct Settings {
    pub index: PathBuf,
    pub static_dir: PathBuf,
    pub json_limit: usize,
}

#[derive(Deserialize)]
struct SaveRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    array: Option<Vec<Value>>,
}

#[derive(Serialize)]
struct SaveResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct LoadResponse {
    array: Vec<Value>,
}

pub fn configure(cfg: &mut web::ServiceConfig, settings: &Settings) {
    cfg.app_data(json_config(settings.json_limit))
        .app_data(web::Data::new(settings.clone()))
        .service(index)
        .service(save_array)
        .service(load_array)
        .service(Files::new("/static", &settings.static_dir));
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let body = ErrorBody::new(err.to_string());
            let resp = match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    HttpResponse::PayloadTooLarge().json(body)
                }
                _ => HttpResponse::BadRequest().json(body),
            };
            error::InternalError::from_response(err, resp).into()
        })
}

#[get("/")]
async fn index(req: HttpRequest, settings: web::Data<Settings>) -> Result<HttpResponse, error::Error> {
    match NamedFile::open_async(&settings.index).await {
        Ok(file) => Ok(file.into_response(&req)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %settings.index.display(), "landing page missing");
            Ok(HttpResponse::NotFound().json(ErrorBody::new("landing page not found")))
        }
        Err(e) => Err(e.into()),
    }
}

#[post("/save_array")]
async fn save_array(
    body: web::Json<SaveRequest>,
    store: web::Data<Store>,
) -> Result<HttpResponse, StoreError> {
    let SaveRequest { username, array } = body.into_inner();
    let username = username.unwrap_or_else(|| DEFAULT_USERNAME.to_string());
    let array = array.unwrap_or_default();

    tracing::info!(%username, len = array.len(), "save_array");
    store.save_array(username, array).await.map_err(|e| {
        tracing::error!("save_array failed: {e}");
        e
    })?;

    Ok(HttpResponse::Ok().json(SaveResponse {
        status: "success",
        message: "Array saved!",
    }))
}

#[get("/load_array/{username}")]
async fn load_array(
    path: web::Path<String>,
    store: web::Data<Store>,
) -> Result<HttpResponse, StoreError> {
    let username = path.into_inner();
    tracing::info!(%username, "load_array");
    let array = store.load_array(&username).await.map_err(|e| {
        tracing::error!("load_array failed: {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(LoadResponse { array }))
}
