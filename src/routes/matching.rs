use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use validator::Validate;
use crate::models::{
    CompareRequest, CompareResponse, EmbedItemRequest, EmbedItemResponse, ErrorResponse,
    FindMatchesRequest, HealthResponse, ItemRecord, MatchAllQuery, MatchesResponse, NewItem,
    RegisterItemRequest, RegisterItemResponse, StatsResponse, UnregisterResponse,
};
use crate::services::{MatchingEngine, MatchingError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchingEngine,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/stats", web::get().to(stats))
        .route("/matching/register", web::post().to(register_item))
        .route("/matching/items/{item_id}", web::get().to(get_item))
        .route("/matching/items/{item_id}", web::delete().to(unregister_item))
        .route("/matching/find", web::post().to(find_matches))
        .route("/matching/all", web::get().to(match_all))
        .route("/matching/compare", web::post().to(compare_items))
        .route("/embeddings/item", web::post().to(embed_item));
}

fn error_response(err: &MatchingError) -> HttpResponse {
    let body = match err {
        MatchingError::NotFound(_) => {
            ErrorResponse::new(StatusCode::NOT_FOUND, "Not found", err.to_string())
        }
        MatchingError::InvalidRequest(_) => {
            ErrorResponse::new(StatusCode::BAD_REQUEST, "Invalid request", err.to_string())
        }
    };
    body.error_response()
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    ErrorResponse::new(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
        .error_response()
}

fn decode_image(data: Option<&str>) -> Result<Option<Vec<u8>>, MatchingError> {
    data.map(|data| BASE64.decode(data))
        .transpose()
        .map_err(|e| MatchingError::InvalidRequest(format!("imageBase64 is not valid base64: {}", e)))
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Registry statistics
///
/// GET /matching/stats
async fn stats(state: web::Data<AppState>) -> impl Responder {
    let counts = state.engine.stats();
    HttpResponse::Ok().json(StatsResponse {
        total: counts.lost + counts.found,
        counts,
    })
}

/// Register an item
///
/// POST /matching/register
///
/// Request body with precomputed embeddings:
/// ```json
/// {
///   "itemId": "string",
///   "itemType": "LOST|FOUND",
///   "category": "string",
///   "title": "string",
///   "description": "string",
///   "userId": "string",
///   "textEmbedding": [0.1, ...],
///   "imageEmbedding": [0.1, ...],
///   "hasImage": true
/// }
/// ```
///
/// Without `textEmbedding` the embeddings are computed by the configured
/// embedding service; an optional `imageBase64` carries the photo.
async fn register_item(
    state: web::Data<AppState>,
    req: web::Json<RegisterItemRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for register request: {:?}", errors);
        return validation_error(errors);
    }

    let req = req.into_inner();

    let result = match req.text_embedding {
        Some(text_embedding) => {
            let record = ItemRecord {
                item_id: req.item_id,
                item_type: req.item_type,
                category: req.category,
                text_embedding,
                image_embedding: req.image_embedding,
                has_image: req.has_image,
                title: req.title,
                description: req.description,
                user_id: req.user_id,
            };
            let has_image = record.has_image;
            let item_id = record.item_id.clone();
            let item_type = record.item_type;
            state
                .engine
                .register(record)
                .map(|replaced| (item_id, item_type, has_image, replaced))
        }
        None => {
            let image = match decode_image(req.image_base64.as_deref()) {
                Ok(image) => image,
                Err(e) => return error_response(&e),
            };

            let item = NewItem {
                item_id: req.item_id,
                item_type: req.item_type,
                category: req.category,
                title: req.title,
                description: req.description,
                user_id: req.user_id,
            };

            state
                .engine
                .register_raw(item, image)
                .await
                .map(|(record, replaced)| (record.item_id, record.item_type, record.has_image, replaced))
        }
    };

    match result {
        Ok((item_id, item_type, has_image, replaced)) => {
            HttpResponse::Ok().json(RegisterItemResponse {
                success: true,
                item_id,
                item_type,
                has_image,
                replaced,
            })
        }
        Err(e) => {
            tracing::info!("Rejected registration: {}", e);
            error_response(&e)
        }
    }
}

/// Fetch a registered item
///
/// GET /matching/items/{itemId}
async fn get_item(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.engine.get(&path) {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => error_response(&e),
    }
}

/// Remove a registered item
///
/// DELETE /matching/items/{itemId}
///
/// Removing an unknown id is not an error; `existed` reports whether it was there.
async fn unregister_item(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let item_id = path.into_inner();
    let existed = state.engine.unregister(&item_id);

    HttpResponse::Ok().json(UnregisterResponse {
        success: true,
        item_id,
        existed,
    })
}

/// Find matches endpoint
///
/// POST /matching/find
///
/// Request body:
/// ```json
/// {
///   "itemId": "string",
///   "topK": 3,
///   "threshold": 0.6
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find request: {:?}", errors);
        return validation_error(errors);
    }

    tracing::info!("Finding matches for item: {}, topK: {:?}", req.item_id, req.top_k);

    match state.engine.find_matches_for(&req.item_id, req.top_k, req.threshold) {
        Ok(matches) => HttpResponse::Ok().json(MatchesResponse::new(&matches)),
        Err(e) => error_response(&e),
    }
}

/// Batch matching endpoint
///
/// GET /matching/all?topK={k}&threshold={t}
///
/// Without `topK` every above-threshold pair is returned; with it each lost
/// item contributes at most `topK` pairs.
async fn match_all(
    state: web::Data<AppState>,
    query: web::Query<MatchAllQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let matches = state.engine.match_all(query.top_k, query.threshold);
    HttpResponse::Ok().json(MatchesResponse::new(&matches))
}

/// Compute embeddings for an item without registering it
///
/// POST /embeddings/item
///
/// Request body:
/// ```json
/// {
///   "itemId": "string",
///   "itemType": "LOST|FOUND",
///   "title": "string",
///   "description": "string",
///   "category": "string",
///   "userId": "string",
///   "imageBase64": "optional"
/// }
/// ```
///
/// The reply carries `textEmbedding`, `imageEmbedding` (or `null`) and
/// `hasImage`, ready to be sent back to `/matching/register`.
async fn embed_item(
    state: web::Data<AppState>,
    req: web::Json<EmbedItemRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let req = req.into_inner();
    let image = match decode_image(req.image_base64.as_deref()) {
        Ok(image) => image,
        Err(e) => return error_response(&e),
    };

    let item = NewItem {
        item_id: req.item_id,
        item_type: req.item_type,
        category: req.category,
        title: req.title,
        description: req.description,
        user_id: req.user_id,
    };

    match state.engine.embed_item(item, image).await {
        Ok(record) => HttpResponse::Ok().json(EmbedItemResponse::from(record)),
        Err(e) => error_response(&e),
    }
}

/// Score two registered items
///
/// POST /matching/compare
async fn compare_items(
    state: web::Data<AppState>,
    req: web::Json<CompareRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.engine.compare(&req.lost_item_id, &req.found_item_id) {
        Ok(result) => HttpResponse::Ok().json(CompareResponse {
            success: true,
            result: (&result).into(),
        }),
        Err(e) => error_response(&e),
    }
}
