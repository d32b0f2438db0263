use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::{Health, ReviewAddressing};
use service::{persons::PersonService, reviews::ReviewService};

pub mod persons;
pub mod reviews;

/// Request bodies may carry inline media references; allow large payloads.
pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub persons: Arc<PersonService>,
    pub reviews: Arc<ReviewService>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn root() -> &'static str {
    "greetbook backend is running"
}

/// Build the full application router. The review routes depend on the
/// addressing mode the review service was configured with.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health));

    let person_routes = Router::new()
        .route("/api/persons", get(persons::list).post(persons::create))
        .route("/api/persons/:id", get(persons::get).delete(persons::delete))
        .route(
            "/api/persons/:id/custom-message",
            post(persons::set_custom_message).delete(persons::clear_custom_message),
        )
        .route("/api/persons/:id/gallery", post(persons::add_gallery_item))
        .route("/api/persons/:id/gallery/:index", delete(persons::remove_gallery_item))
        .route("/api/persons/:id/videos", post(persons::add_video))
        .route("/api/persons/:id/videos/:index", delete(persons::remove_video))
        .route("/api/persons/:id/voice", post(persons::set_voice).delete(persons::clear_voice));

    let mut review_routes = Router::new()
        .route("/api/reviews", get(reviews::list).post(reviews::create))
        .route(
            "/api/reviews/:key",
            get(reviews::by_username).put(reviews::update).delete(reviews::delete),
        );
    // owner-scoped paths need stable ids; the first segment is the username
    // but shares the `:key` name with the route above
    if state.reviews.addressing() == ReviewAddressing::ById {
        review_routes = review_routes.route(
            "/api/reviews/:key/:id",
            put(reviews::update_owned).delete(reviews::delete_owned),
        );
    }

    public
        .merge(person_routes)
        .merge(review_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
