use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{Local, NaiveDateTime};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::error::{render_page, PageError};
use super::forms::{ArtistFormValues, FormData, ShowFormValues, VenueFormValues};
use super::store::FyyurStore;
use super::templates::{
    ArtistFormTemplate, ArtistPageTemplate, ArtistsTemplate, HomeTemplate, SearchTemplate,
    ShowFormTemplate, ShowsTemplate, VenueFormTemplate, VenuePageTemplate, VenuesTemplate,
};
use crate::error::AppError;

#[derive(Clone)]
pub struct FyyurState {
    pub store: Arc<dyn FyyurStore>,
}

type Pairs = Form<Vec<(String, String)>>;

/// Shows are stored as naive local times, so "now" is local too.
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn id_param(path: Result<Path<i64>, PathRejection>) -> Result<i64, PageError> {
    path.map(|Path(id)| id).map_err(|_| PageError::NotFound)
}

fn ok_page<T: askama::Template>(template: &T) -> Response {
    render_page(StatusCode::OK, template)
}

fn home_with(message: String) -> Response {
    ok_page(&HomeTemplate {
        messages: vec![message],
    })
}

pub async fn index() -> Response {
    ok_page(&HomeTemplate { messages: vec![] })
}

//  Venues
//  ----------------------------------------------------------------

pub async fn venues(State(state): State<FyyurState>) -> Result<Response, PageError> {
    let areas = state.store.venue_areas(now()).await?;
    Ok(ok_page(&VenuesTemplate { areas }))
}

pub async fn search_venues(
    State(state): State<FyyurState>,
    Form(pairs): Pairs,
) -> Result<Response, PageError> {
    let search_term = FormData::from(pairs).text("search_term");
    let results = state.store.search_venues(&search_term, now()).await?;
    info!("Venue search '{}' matched {}", search_term, results.len());
    Ok(ok_page(&SearchTemplate {
        kind: "venues",
        base: "/venues",
        search_term,
        results,
    }))
}

pub async fn show_venue(
    State(state): State<FyyurState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, PageError> {
    let id = id_param(path)?;
    let detail = state
        .store
        .venue_detail(id, now())
        .await?
        .ok_or(PageError::NotFound)?;
    Ok(ok_page(&VenuePageTemplate {
        venue: detail.venue,
        past_shows: detail.past_shows,
        upcoming_shows: detail.upcoming_shows,
    }))
}

pub async fn create_venue_form() -> Response {
    ok_page(&VenueFormTemplate::new(
        "List a new venue".into(),
        "/venues/create".into(),
        VenueFormValues::default(),
        vec![],
    ))
}

pub async fn create_venue_submission(
    State(state): State<FyyurState>,
    Form(pairs): Pairs,
) -> Response {
    let values = VenueFormValues::from_form(&FormData::from(pairs));
    let venue = match values.validate() {
        Ok(venue) => venue,
        Err(errors) => {
            warn!("Rejected venue form: {:?}", errors);
            let template = VenueFormTemplate::new(
                "List a new venue".into(),
                "/venues/create".into(),
                values,
                errors,
            );
            return render_page(StatusCode::UNPROCESSABLE_ENTITY, &template);
        }
    };

    match state.store.create_venue(&venue).await {
        Ok(id) => {
            info!("Listed venue {} ({})", venue.name, id);
            home_with(format!("Venue {} was successfully listed!", venue.name))
        }
        Err(e) => {
            error!("Failed to list venue {}: {}", venue.name, e);
            home_with(format!(
                "An error occurred. Venue {} could not be listed.",
                venue.name
            ))
        }
    }
}

pub async fn delete_venue(
    State(state): State<FyyurState>,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": 404, "message": "resource not found"})),
        )
            .into_response()
    };
    let Ok(Path(id)) = path else {
        return not_found();
    };

    match state.store.delete_venue(id).await {
        Ok(venue) => {
            info!("Deleted venue {} ({})", venue.name, id);
            Json(json!({"success": true})).into_response()
        }
        Err(AppError::NotFound(_)) => not_found(),
        Err(e) => {
            error!("Failed to delete venue {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": 500, "message": "internal server error"})),
            )
                .into_response()
        }
    }
}

pub async fn edit_venue(
    State(state): State<FyyurState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, PageError> {
    let id = id_param(path)?;
    let venue = state.store.venue(id).await?.ok_or(PageError::NotFound)?;
    Ok(ok_page(&VenueFormTemplate::new(
        format!("Edit venue {}", venue.name),
        format!("/venues/{id}/edit"),
        VenueFormValues::from_venue(&venue),
        vec![],
    )))
}

pub async fn edit_venue_submission(
    State(state): State<FyyurState>,
    path: Result<Path<i64>, PathRejection>,
    Form(pairs): Pairs,
) -> Result<Response, PageError> {
    let id = id_param(path)?;
    let values = VenueFormValues::from_form(&FormData::from(pairs));
    let venue = match values.validate() {
        Ok(venue) => venue,
        Err(errors) => {
            let template = VenueFormTemplate::new(
                format!("Edit venue {}", values.name),
                format!("/venues/{id}/edit"),
                values,
                errors,
            );
            return Ok(render_page(StatusCode::UNPROCESSABLE_ENTITY, &template));
        }
    };

    state.store.update_venue(id, &venue).await?;
    info!("Updated venue {}", id);
    Ok(Redirect::to(&format!("/venues/{id}")).into_response())
}

//  Artists
//  ----------------------------------------------------------------

pub async fn artists(State(state): State<FyyurState>) -> Result<Response, PageError> {
    let artists = state.store.artists(now()).await?;
    Ok(ok_page(&ArtistsTemplate { artists }))
}

pub async fn search_artists(
    State(state): State<FyyurState>,
    Form(pairs): Pairs,
) -> Result<Response, PageError> {
    let search_term = FormData::from(pairs).text("search_term");
    let results = state.store.search_artists(&search_term, now()).await?;
    info!("Artist search '{}' matched {}", search_term, results.len());
    Ok(ok_page(&SearchTemplate {
        kind: "artists",
        base: "/artists",
        search_term,
        results,
    }))
}

pub async fn show_artist(
    State(state): State<FyyurState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, PageError> {
    let id = id_param(path)?;
    let detail = state
        .store
        .artist_detail(id, now())
        .await?
        .ok_or(PageError::NotFound)?;
    Ok(ok_page(&ArtistPageTemplate {
        artist: detail.artist,
        past_shows: detail.past_shows,
        upcoming_shows: detail.upcoming_shows,
    }))
}

pub async fn create_artist_form() -> Response {
    ok_page(&ArtistFormTemplate::new(
        "List a new artist".into(),
        "/artists/create".into(),
        ArtistFormValues::default(),
        vec![],
    ))
}

pub async fn create_artist_submission(
    State(state): State<FyyurState>,
    Form(pairs): Pairs,
) -> Response {
    let values = ArtistFormValues::from_form(&FormData::from(pairs));
    let artist = match values.validate() {
        Ok(artist) => artist,
        Err(errors) => {
            warn!("Rejected artist form: {:?}", errors);
            let template = ArtistFormTemplate::new(
                "List a new artist".into(),
                "/artists/create".into(),
                values,
                errors,
            );
            return render_page(StatusCode::UNPROCESSABLE_ENTITY, &template);
        }
    };

    match state.store.create_artist(&artist).await {
        Ok(id) => {
            info!("Listed artist {} ({})", artist.name, id);
            home_with(format!("Artist {} was successfully listed!", artist.name))
        }
        Err(e) => {
            error!("Failed to list artist {}: {}", artist.name, e);
            home_with(format!(
                "An error occurred. Artist {} could not be listed.",
                artist.name
            ))
        }
    }
}

pub async fn edit_artist(
    State(state): State<FyyurState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, PageError> {
    let id = id_param(path)?;
    let artist = state.store.artist(id).await?.ok_or(PageError::NotFound)?;
    Ok(ok_page(&ArtistFormTemplate::new(
        format!("Edit artist {}", artist.name),
        format!("/artists/{id}/edit"),
        ArtistFormValues::from_artist(&artist),
        vec![],
    )))
}

pub async fn edit_artist_submission(
    State(state): State<FyyurState>,
    path: Result<Path<i64>, PathRejection>,
    Form(pairs): Pairs,
) -> Result<Response, PageError> {
    let id = id_param(path)?;
    let values = ArtistFormValues::from_form(&FormData::from(pairs));
    let artist = match values.validate() {
        Ok(artist) => artist,
        Err(errors) => {
            let template = ArtistFormTemplate::new(
                format!("Edit artist {}", values.name),
                format!("/artists/{id}/edit"),
                values,
                errors,
            );
            return Ok(render_page(StatusCode::UNPROCESSABLE_ENTITY, &template));
        }
    };

    state.store.update_artist(id, &artist).await?;
    info!("Updated artist {}", id);
    Ok(Redirect::to(&format!("/artists/{id}")).into_response())
}

//  Shows
//  ----------------------------------------------------------------

pub async fn shows(State(state): State<FyyurState>) -> Result<Response, PageError> {
    let shows = state.store.shows().await?;
    Ok(ok_page(&ShowsTemplate { shows }))
}

pub async fn create_show_form() -> Response {
    ok_page(&ShowFormTemplate {
        values: ShowFormValues::default(),
        errors: vec![],
    })
}

pub async fn create_show_submission(
    State(state): State<FyyurState>,
    Form(pairs): Pairs,
) -> Response {
    let values = ShowFormValues::from_form(&FormData::from(pairs));
    let show = match values.validate() {
        Ok(show) => show,
        Err(errors) => {
            warn!("Rejected show form: {:?}", errors);
            let template = ShowFormTemplate { values, errors };
            return render_page(StatusCode::UNPROCESSABLE_ENTITY, &template);
        }
    };

    match state.store.create_show(&show).await {
        Ok(id) => {
            info!(
                "Listed show {} (artist {} at venue {})",
                id, show.artist_id, show.venue_id
            );
            home_with("Show was successfully listed!".to_string())
        }
        Err(e) => {
            error!("Failed to list show: {}", e);
            home_with("An error occurred. Show could not be listed.".to_string())
        }
    }
}
