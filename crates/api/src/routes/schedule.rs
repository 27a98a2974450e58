use axum::{
    Router,
    routing::get,
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schedule",
            get(handlers::schedule::list_schedule).post(handlers::schedule::create_schedule),
        )
        .route(
            "/api/schedule/grouped",
            get(handlers::schedule::grouped_schedule),
        )
        .route(
            "/api/schedule/:id",
            get(handlers::schedule::get_schedule)
                .patch(handlers::schedule::update_schedule)
                .delete(handlers::schedule::delete_schedule),
        )
}
