// src/api.rs
// JSON handlers. Anything that touches the network runs on the blocking pool.

use actix_web::{http::header, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::lexicon::Lexicon;
use crate::links;
use crate::memory::ShoppingListItem;
use crate::reporter::{ExportFormat, Reporter};
use crate::AppState;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 20;

// 1. Request Formats
#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct CompareRequest {
    pub product_name: String,
}

#[derive(Deserialize)]
pub struct LinksRequest {
    pub urls: Vec<String>,
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
}

// 2. Response Formats
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub search_api: bool,
    pub llm_api: bool,
    pub demo_mode: bool,
}

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub session_id: String,
    pub count: usize,
    pub items: Vec<ShoppingListItem>,
}

#[derive(Serialize)]
pub struct AddItemResponse {
    pub added: bool,
    pub count: usize,
}

fn required(value: &str, what: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ApiError::BadRequest(format!("{} must not be empty", what)))
    } else {
        Ok(value.to_string())
    }
}

fn session_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("session {}", id))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health))
        .route("/api/search", web::post().to(search))
        .route("/api/compare", web::post().to(compare))
        .route("/api/links", web::post().to(analyze_links))
        .route("/api/suggest", web::get().to(suggest))
        .route("/api/popular", web::get().to(popular))
        .route("/api/lexicon", web::get().to(language_help))
        .route("/api/sessions", web::post().to(create_session))
        .route("/api/sessions/{id}", web::delete().to(delete_session))
        .route("/api/sessions/{id}/list", web::get().to(get_list))
        .route("/api/sessions/{id}/list", web::post().to(add_item))
        .route("/api/sessions/{id}/list", web::delete().to(clear_list))
        .route("/api/sessions/{id}/list/{index}", web::delete().to(remove_item))
        .route("/api/sessions/{id}/export", web::get().to(export_list));
}

// GET /api/health
pub async fn health(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        search_api: data.config.has_search_key(),
        llm_api: data.config.has_llm_key(),
        demo_mode: !data.config.has_search_key(),
    })
}

// POST /api/search
pub async fn search(data: web::Data<AppState>, req: web::Json<SearchRequest>) -> Result<HttpResponse, ApiError> {
    let query = required(&req.query, "query")?;
    let limit = req.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    info!("🚀 API: search '{}' (limit {})", query, limit);

    let assistant = data.assistant.clone();
    let outcome = web::block(move || assistant.search_products(&query, limit)).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

// POST /api/compare
pub async fn compare(data: web::Data<AppState>, req: web::Json<CompareRequest>) -> Result<HttpResponse, ApiError> {
    let product_name = required(&req.product_name, "product_name")?;
    info!("🚀 API: compare '{}'", product_name);

    let aggregator = data.aggregator.clone();
    let report = web::block(move || aggregator.compare(&product_name)).await?;
    Ok(HttpResponse::Ok().json(report))
}

// POST /api/links
pub async fn analyze_links(data: web::Data<AppState>, req: web::Json<LinksRequest>) -> Result<HttpResponse, ApiError> {
    let urls = req.into_inner().urls;
    if urls.iter().all(|u| u.trim().is_empty()) {
        return Err(ApiError::BadRequest("at least one URL is required".to_string()));
    }

    let fetcher = data.fetcher.clone();
    let results = web::block(move || links::compare_links(fetcher.as_ref(), &urls)).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "results": results })))
}

// GET /api/suggest?q=
pub async fn suggest(data: web::Data<AppState>, query: web::Query<SuggestQuery>) -> HttpResponse {
    let partial = query.q.as_deref().unwrap_or("");
    let suggestions = data.assistant.normalizer().suggest(partial);
    HttpResponse::Ok().json(serde_json::json!({ "suggestions": suggestions }))
}

// GET /api/popular
pub async fn popular(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let assistant = data.assistant.clone();
    let queries = web::block(move || assistant.popular_queries()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "queries": queries })))
}

// GET /api/lexicon
pub async fn language_help() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "sections": Lexicon::shared().help() }))
}

// POST /api/sessions
pub async fn create_session(data: web::Data<AppState>) -> HttpResponse {
    let session_id = data.sessions.create();
    info!("🛒 API: new session {} ({} active)", session_id, data.sessions.len());
    HttpResponse::Created().json(SessionCreated { session_id })
}

// DELETE /api/sessions/{id}
pub async fn delete_session(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    data.sessions.remove(&id).ok_or_else(|| session_not_found(&id))?;
    info!("🛒 API: closed session {} ({} active)", id, data.sessions.len());
    Ok(HttpResponse::NoContent().finish())
}

// GET /api/sessions/{id}/list
pub async fn get_list(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let list = data.sessions.snapshot(&id).ok_or_else(|| session_not_found(&id))?;
    Ok(HttpResponse::Ok().json(ListResponse {
        count: list.len(),
        items: list.items().to_vec(),
        session_id: id,
    }))
}

// POST /api/sessions/{id}/list
pub async fn add_item(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddItemRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let title = required(&req.title, "title")?;
    let item = ShoppingListItem::new(&title, &req.description, &req.price, req.url.trim(), &req.source);

    let (added, count) = data
        .sessions
        .with_list(&id, |list| (list.add(item), list.len()))
        .ok_or_else(|| session_not_found(&id))?;
    Ok(HttpResponse::Ok().json(AddItemResponse { added, count }))
}

// DELETE /api/sessions/{id}/list/{index}
pub async fn remove_item(data: web::Data<AppState>, path: web::Path<(String, usize)>) -> Result<HttpResponse, ApiError> {
    let (id, index) = path.into_inner();
    let removed = data
        .sessions
        .with_list(&id, |list| list.remove(index))
        .ok_or_else(|| session_not_found(&id))?;

    match removed {
        Some(item) => Ok(HttpResponse::Ok().json(item)),
        None => Err(ApiError::NotFound(format!("item {}", index))),
    }
}

// DELETE /api/sessions/{id}/list
pub async fn clear_list(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    data.sessions
        .with_list(&id, |list| list.clear())
        .ok_or_else(|| session_not_found(&id))?;
    Ok(HttpResponse::NoContent().finish())
}

// GET /api/sessions/{id}/export?format=txt|csv
pub async fn export_list(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let format = ExportFormat::parse(query.format.as_deref())
        .ok_or_else(|| ApiError::BadRequest("format must be txt or csv".to_string()))?;
    let list = data.sessions.snapshot(&id).ok_or_else(|| session_not_found(&id))?;
    if list.is_empty() {
        return Err(ApiError::BadRequest("shopping list is empty".to_string()));
    }

    let body = match format {
        ExportFormat::Text => Reporter::export_text(list.items(), chrono::Local::now()),
        ExportFormat::Csv => Reporter::export_csv(list.items()).map_err(|e| ApiError::Internal(e.to_string()))?,
    };

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.file_name()),
        ))
        .body(body))
}
