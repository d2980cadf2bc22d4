use anyhow::Result;
use rocket::data::{Limits, ToByteUnit as _};
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::{post, routes, Build, Config, FromForm, Responder, Rocket};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt as _;

use crate::args::Args;
use crate::extract;
use crate::gemini_api::GeminiClient;
use crate::ledger::{self, JournalEntry};
use crate::sheets_api::SheetsClient;

pub async fn serve(args: Args) -> Result<()> {
    rocket(&args).launch().await?;
    Ok(())
}

pub fn rocket(args: &Args) -> Rocket<Build> {
    let config = Config {
        address: args.address,
        port: args.port,
        // Receipt scans routinely exceed rocket's 1MiB default.
        limits: Limits::default()
            .limit("file", 15.mebibytes())
            .limit("data-form", 60.mebibytes()),
        ..Config::default()
    };
    rocket::custom(config).mount("/api", routes![analyze, save])
}

#[derive(Serialize)]
pub struct ErrorBody {
    error: String,
}

#[derive(Responder)]
pub enum ApiError {
    #[response(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[response(status = 401)]
    Unauthorized(Json<ErrorBody>),
    #[response(status = 500)]
    Internal(Json<ErrorBody>),
}

impl ApiError {
    fn no_files() -> Self {
        ApiError::BadRequest(Json(ErrorBody {
            error: "No files uploaded".to_string(),
        }))
    }

    fn unauthorized() -> Self {
        ApiError::Unauthorized(Json(ErrorBody {
            error: "Missing configuration or authentication".to_string(),
        }))
    }

    fn internal(message: &str) -> Self {
        ApiError::Internal(Json(ErrorBody {
            error: message.to_string(),
        }))
    }
}

fn require(field: Option<String>) -> Result<String, ApiError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(ApiError::unauthorized)
}

#[derive(FromForm)]
pub struct AnalyzeUpload<'r> {
    gemini_api_key: Option<String>,
    spreadsheet_id: Option<String>,
    access_token: Option<String>,
    files: Vec<TempFile<'r>>,
}

/// Turns the uploaded documents into candidate entries, annotated with
/// `is_duplicate`. Documents are processed strictly in sequence; a failing
/// document contributes zero entries instead of failing the batch.
#[post("/analyze", data = "<upload>")]
async fn analyze(upload: Form<AnalyzeUpload<'_>>) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let AnalyzeUpload {
        gemini_api_key,
        spreadsheet_id,
        access_token,
        mut files,
    } = upload.into_inner();

    // An empty batch is a client error, rejected before any collaborator
    // is called.
    if files.is_empty() {
        return Err(ApiError::no_files());
    }

    // Configuration failures fail fast as well.
    let api_key = require(gemini_api_key)?;
    let spreadsheet_id = require(spreadsheet_id)?;
    let access_token = require(access_token)?;

    let store = SheetsClient::new(spreadsheet_id, access_token);
    let generator = GeminiClient::new(api_key);

    let history = ledger::load_history(&store).await;
    if let Some(reason) = history.degrade_reason() {
        log::warn!("Analyzing without history context: {reason}");
    }
    let index = ledger::build_duplicate_index(&store).await;
    if let Some(reason) = index.degrade_reason() {
        log::warn!("Analyzing without duplicate index: {reason}");
    }

    log::info!("Analyzing {} documents...", files.len());
    let mut results = Vec::new();
    for file in files.iter_mut() {
        let filename = file
            .raw_name()
            .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_string())
            .unwrap_or_default();
        let mime_type = file
            .content_type()
            .map(|content_type| content_type.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut bytes = Vec::new();
        let read = match file.open().await {
            Ok(mut reader) => reader.read_to_end(&mut bytes).await,
            Err(err) => Err(err),
        };
        if let Err(err) = read {
            log::warn!("Failed to read upload {filename:?}: {err}");
            continue;
        }

        let document = extract::normalize(&filename, &mime_type, bytes);
        let mut entries = extract::extract_entries(&generator, &document, history.value()).await;
        ledger::reconcile(&mut entries, index.value());
        results.extend(entries);
    }
    Ok(Json(results))
}

#[derive(Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    data: Vec<JournalEntry>,
    #[serde(default)]
    spreadsheet_id: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    message: String,
}

/// Commits confirmed entries to the ledger. Partial writes before a failure
/// point stay in place; the caller only sees a single success/failure signal.
#[post("/save", data = "<request>", format = "json")]
async fn save(request: Json<SaveRequest>) -> Result<Json<SaveResponse>, ApiError> {
    let request = request.into_inner();
    let spreadsheet_id = require(request.spreadsheet_id)?;
    let access_token = require(request.access_token)?;

    let store = SheetsClient::new(spreadsheet_id, access_token);
    match ledger::save_entries(&store, &request.data).await {
        Ok(()) => Ok(Json(SaveResponse {
            message: "Success".to_string(),
        })),
        Err(err) => {
            log::error!("Save failed: {err:#}");
            Err(ApiError::internal("Failed to save to sheets"))
        }
    }
}
