// Route exports
pub mod matching;

use actix_web::web;

/// Mount the matching routes at the root, where existing clients call them,
/// and mirror them under `/api/v1`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matching::configure),
    )
    .configure(matching::configure);
}
