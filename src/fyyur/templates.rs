use askama::Template;

use super::forms::{ArtistFormValues, ShowFormValues, VenueFormValues};
use super::models::{Appearance, Artist, ShowListing, Summary, Venue, VenueArea};
use crate::constants::{GENRES, STATES};

/// One `<option>` in a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

pub fn select_options(all: &[&'static str], chosen: &[String]) -> Vec<SelectOption> {
    all.iter()
        .map(|&value| SelectOption {
            value,
            selected: chosen.iter().any(|c| c == value),
        })
        .collect()
}

pub fn state_options(chosen: &str) -> Vec<SelectOption> {
    select_options(STATES, &[chosen.to_string()])
}

pub fn genre_options(chosen: &[String]) -> Vec<SelectOption> {
    select_options(GENRES, chosen)
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub messages: Vec<String>,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesTemplate {
    pub areas: Vec<VenueArea>,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsTemplate {
    pub artists: Vec<Summary>,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsTemplate {
    pub shows: Vec<ShowListing>,
}

/// Search results for either venues (`base = "/venues"`) or artists.
#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub kind: &'static str,
    pub base: &'static str,
    pub search_term: String,
    pub results: Vec<Summary>,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct VenuePageTemplate {
    pub venue: Venue,
    pub past_shows: Vec<Appearance>,
    pub upcoming_shows: Vec<Appearance>,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ArtistPageTemplate {
    pub artist: Artist,
    pub past_shows: Vec<Appearance>,
    pub upcoming_shows: Vec<Appearance>,
}

#[derive(Template)]
#[template(path = "forms/venue.html")]
pub struct VenueFormTemplate {
    pub heading: String,
    pub action: String,
    pub values: VenueFormValues,
    pub state_options: Vec<SelectOption>,
    pub genre_options: Vec<SelectOption>,
    pub errors: Vec<String>,
}

impl VenueFormTemplate {
    pub fn new(heading: String, action: String, values: VenueFormValues, errors: Vec<String>) -> Self {
        Self {
            state_options: state_options(&values.state),
            genre_options: genre_options(&values.genres),
            heading,
            action,
            values,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/artist.html")]
pub struct ArtistFormTemplate {
    pub heading: String,
    pub action: String,
    pub values: ArtistFormValues,
    pub state_options: Vec<SelectOption>,
    pub genre_options: Vec<SelectOption>,
    pub errors: Vec<String>,
}

impl ArtistFormTemplate {
    pub fn new(heading: String, action: String, values: ArtistFormValues, errors: Vec<String>) -> Self {
        Self {
            state_options: state_options(&values.state),
            genre_options: genre_options(&values.genres),
            heading,
            action,
            values,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/show.html")]
pub struct ShowFormTemplate {
    pub values: ShowFormValues,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate;

#[derive(Template)]
#[template(path = "errors/500.html")]
pub struct ServerErrorTemplate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chosen_genres_are_selected() {
        let options = genre_options(&["Jazz".to_string(), "Folk".to_string()]);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["Folk", "Jazz"]);
        assert_eq!(options.len(), GENRES.len());
    }

    #[test]
    fn home_renders_flash_messages_escaped() {
        let html = HomeTemplate {
            messages: vec!["Venue <Hop> was successfully listed!".into()],
        }
        .render()
        .unwrap();
        assert!(html.contains("Venue &lt;Hop&gt; was successfully listed!"));
    }

    #[test]
    fn search_page_shows_result_count() {
        let html = SearchTemplate {
            kind: "venues",
            base: "/venues",
            search_term: "hop".into(),
            results: vec![Summary {
                id: 1,
                name: "The Musical Hop".into(),
                num_upcoming_shows: 0,
            }],
        }
        .render()
        .unwrap();
        assert!(html.contains("Number of search results for \"hop\": 1"));
        assert!(html.contains("href=\"/venues/1\""));
    }
}
