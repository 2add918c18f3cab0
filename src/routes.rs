// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{notes, quiz, result, session, topic},
    session::session_middleware,
    state::AppState,
};

/// Assembles the main application router.
///
/// * Open routes: session creation only.
/// * Everything else requires a valid 'x-session-id' header, enforced by
///   the session middleware.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:5173".parse().unwrap(),
        "http://127.0.0.1:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static("x-session-id"),
        ]);

    let open_routes = Router::new().route("/session", post(session::create_session));

    let session_routes = Router::new()
        .route("/session/me", get(session::current_session))
        .route("/topic/explain", post(topic::explain_topic))
        .route("/topic", put(topic::set_topic).get(topic::get_topic))
        .route("/notes", get(notes::list_notes).post(notes::save_note))
        .route("/notes/{id}", delete(notes::delete_note))
        .route("/notes/{id}/load", post(notes::load_note))
        .route("/quiz/generate", post(quiz::generate_quiz))
        .route("/quiz", get(quiz::get_quiz))
        .route("/quiz/answers/{index}", put(quiz::set_answer))
        .route("/quiz/status", get(quiz::quiz_status))
        .route("/quiz/submit", post(quiz::submit_quiz))
        .route("/result", get(result::get_result))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .nest("/api", open_routes.merge(session_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
