use crate::app_state::{AppConfig, AppState};
use crate::codec;
use crate::error::{TransferError, ValidationError};
use crate::image_buffer::{self, MAX_DIMENSION};
use crate::io_struct::TransferResponse;
use crate::orchestrator::TransferPath;
use crate::validate::{CONTENT_FIELD, STYLE_FIELD, TransferRequest, UploadedFile};
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, HttpServer, get, post, web};
use bytes::BytesMut;
use futures_util::StreamExt;
use serde_json::json;
use std::io::Write;
use std::sync::atomic::Ordering;
use std::time::Instant;

#[get("/")]
pub async fn service_info(_req: HttpRequest, app_state: web::Data<AppState>) -> HttpResponse {
    let backend_configured = app_state.orchestrator.has_backend();
    let (total, primary, fallback, rejected) = app_state.stats.snapshot();
    HttpResponse::Ok().json(json!({
        "service": "Style Transfer API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "backend_configured": backend_configured,
        "endpoints": {
            "health": "/health",
            "transfer": "/api/transfer",
            "preset_styles": "/api/preset-styles",
        },
        "requests": {
            "total": total,
            "primary": primary,
            "fallback": fallback,
            "rejected": rejected,
        },
    }))
}

#[get("/health")]
pub async fn health(_req: HttpRequest, app_state: web::Data<AppState>) -> HttpResponse {
    let backend_configured = app_state.orchestrator.has_backend();
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "backend_configured": backend_configured,
        "backend_status": if backend_configured {
            "configured"
        } else {
            "unconfigured (statistical fallback only)"
        },
    }))
}

#[get("/api/preset-styles")]
pub async fn preset_styles(_req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "styles": [
            {"id": "starry_night", "name": "Starry Night", "url": "/styles/starry_night.jpg"},
            {"id": "wave", "name": "The Great Wave", "url": "/styles/wave.jpg"},
            {"id": "mosaic", "name": "Mosaic", "url": "/styles/mosaic.jpg"},
        ],
    }))
}

#[post("/api/transfer")]
pub async fn transfer(
    _req: HttpRequest,
    payload: Multipart,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, TransferError> {
    let started = Instant::now();
    app_state.stats.total.fetch_add(1, Ordering::Relaxed);

    match run_transfer(payload, &app_state).await {
        Ok(result_image) => {
            let processing_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
            Ok(HttpResponse::Ok().json(TransferResponse {
                success: true,
                result_image,
                processing_time,
            }))
        }
        Err(e) => {
            app_state.stats.rejected.fetch_add(1, Ordering::Relaxed);
            Err(e)
        }
    }
}

/// Validator, codec, normalizer and orchestrator in sequence. Everything in
/// here is request-scoped; the only await point that leaves the process is
/// the orchestrator's backend attempt.
async fn run_transfer(payload: Multipart, app_state: &AppState) -> Result<String, TransferError> {
    let request = read_upload_fields(payload, app_state).await?;

    let content = codec::decode(CONTENT_FIELD, &request.content)?;
    let style = codec::decode(STYLE_FIELD, &request.style)?;

    let content = image_buffer::downscale(content, MAX_DIMENSION).map_err(TransferError::Internal)?;
    let style = image_buffer::downscale(style, MAX_DIMENSION).map_err(TransferError::Internal)?;

    let content = image_buffer::to_unit_float(&content);
    let style = image_buffer::to_unit_float(&style);

    let (output, path) = app_state.orchestrator.stylize(&content, &style).await;
    match path {
        TransferPath::Primary => app_state.stats.primary.fetch_add(1, Ordering::Relaxed),
        TransferPath::Fallback => app_state.stats.fallback.fetch_add(1, Ordering::Relaxed),
    };

    let output = image_buffer::to_byte_range(&output);
    codec::encode_data_uri(&output).map_err(TransferError::Internal)
}

/// Collect the two expected file fields, enforcing the byte ceiling while
/// streaming so an oversized upload never gets buffered whole. Unknown
/// fields are drained and ignored.
async fn read_upload_fields(
    mut payload: Multipart,
    app_state: &AppState,
) -> Result<TransferRequest, TransferError> {
    let mut content: Option<UploadedFile> = None;
    let mut style: Option<UploadedFile> = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| TransferError::Multipart(e.to_string()))?;
        let field_name = match field.name() {
            n if n == CONTENT_FIELD => Some(CONTENT_FIELD),
            n if n == STYLE_FIELD => Some(STYLE_FIELD),
            _ => None,
        };
        let Some(field_name) = field_name else {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| TransferError::Multipart(e.to_string()))?;
            }
            continue;
        };
        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_string();

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| TransferError::Multipart(e.to_string()))?;
            if data.len() + chunk.len() > app_state.constraint.max_bytes {
                return Err(ValidationError::PayloadTooLarge {
                    field: field_name,
                    limit_bytes: app_state.constraint.max_bytes,
                }
                .into());
            }
            data.extend_from_slice(&chunk);
        }

        let file = UploadedFile {
            filename,
            bytes: data.freeze(),
        };
        match field_name {
            CONTENT_FIELD => content = Some(file),
            _ => style = Some(file),
        }
    }

    app_state
        .constraint
        .validate(content, style)
        .map_err(TransferError::from)
}

pub async fn periodic_logging(app_state: AppState) {
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(app_state.log_interval)).await;
        let (total, primary, fallback, rejected) = app_state.stats.snapshot();
        log::info!(
            "Transfer stats: total={}, primary={}, fallback={}, rejected={}",
            total,
            primary,
            fallback,
            rejected
        );
    }
}

pub async fn startup(config: AppConfig, app_state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(app_state);

    println!("Starting server at {}:{}", config.host, config.port);

    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*")),
            )
            .app_data(app_state.clone())
            .service(service_info)
            .service(health)
            .service(preset_styles)
            .service(transfer)
    })
    .bind((config.host, config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
