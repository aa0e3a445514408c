pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::lookups::handlers::handle_lookup;
use crate::places::handlers::handle_autocomplete;
use crate::profile::handlers;
use crate::profile::models::{
    About, BasicDetails, EducationRecord, PersonalDetails, Skills, WorkRecord,
};
use crate::state::AppState;

/// Multipart framing allowance on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.upload_max_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/profile/completion",
            get(handlers::handle_completion),
        )
        // Single-valued sections
        .route(
            "/api/v1/profile/basic",
            get(handlers::handle_get_section::<BasicDetails>)
                .put(handlers::handle_put_section::<BasicDetails>),
        )
        .route(
            "/api/v1/profile/about",
            get(handlers::handle_get_section::<About>)
                .put(handlers::handle_put_section::<About>),
        )
        .route(
            "/api/v1/profile/skills",
            get(handlers::handle_get_section::<Skills>)
                .put(handlers::handle_put_section::<Skills>),
        )
        .route(
            "/api/v1/profile/personal",
            get(handlers::handle_get_section::<PersonalDetails>)
                .put(handlers::handle_put_section::<PersonalDetails>),
        )
        // Education
        .route(
            "/api/v1/profile/education",
            get(handlers::handle_list_records::<EducationRecord>)
                .post(handlers::handle_create_record::<EducationRecord>),
        )
        .route(
            "/api/v1/profile/education/:index",
            put(handlers::handle_update_record::<EducationRecord>)
                .delete(handlers::handle_delete_record::<EducationRecord>),
        )
        .route(
            "/api/v1/profile/education/:index/document",
            post(handlers::handle_attach_file::<EducationRecord>)
                .delete(handlers::handle_detach_file::<EducationRecord>),
        )
        // Work experience
        .route(
            "/api/v1/profile/work",
            get(handlers::handle_list_records::<WorkRecord>)
                .post(handlers::handle_create_record::<WorkRecord>),
        )
        .route(
            "/api/v1/profile/work/:index",
            put(handlers::handle_update_record::<WorkRecord>)
                .delete(handlers::handle_delete_record::<WorkRecord>),
        )
        .route(
            "/api/v1/profile/work/:index/certificate",
            post(handlers::handle_attach_file::<WorkRecord>)
                .delete(handlers::handle_detach_file::<WorkRecord>),
        )
        // Lookups and places
        .route("/api/v1/lookups/:kind", get(handle_lookup))
        .route("/api/v1/places/autocomplete", get(handle_autocomplete))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
