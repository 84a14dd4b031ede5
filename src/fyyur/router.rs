use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use super::error::not_found;
use super::handlers::{
    artists, create_artist_form, create_artist_submission, create_show_form,
    create_show_submission, create_venue_form, create_venue_submission, delete_venue, edit_artist,
    edit_artist_submission, edit_venue, edit_venue_submission, index, search_artists,
    search_venues, show_artist, show_venue, shows, venues, FyyurState,
};
use super::store::FyyurStore;
use crate::constants::FYYUR_APP;
use crate::server::with_service_routes;

pub fn fyyur_router(store: Arc<dyn FyyurStore>) -> Router {
    let site = Router::new()
        .route("/", get(index))
        .route("/venues", get(venues))
        .route("/venues/search", post(search_venues))
        .route(
            "/venues/create",
            get(create_venue_form).post(create_venue_submission),
        )
        .route("/venues/:id", get(show_venue).delete(delete_venue))
        .route(
            "/venues/:id/edit",
            get(edit_venue).post(edit_venue_submission),
        )
        .route("/artists", get(artists))
        .route("/artists/search", post(search_artists))
        .route(
            "/artists/create",
            get(create_artist_form).post(create_artist_submission),
        )
        .route("/artists/:id", get(show_artist))
        .route(
            "/artists/:id/edit",
            get(edit_artist).post(edit_artist_submission),
        )
        .route("/shows", get(shows))
        .route(
            "/shows/create",
            get(create_show_form).post(create_show_submission),
        )
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found)
        .with_state(FyyurState { store });

    with_service_routes(site, FYYUR_APP)
}
