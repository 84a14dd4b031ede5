//! Form bodies for venues, artists and shows.
//!
//! Browsers post `application/x-www-form-urlencoded` with one `genres` pair per
//! selected option, so bodies are read as raw pairs and picked apart here.
//! Each entity has a `*FormValues` struct holding exactly what the user typed
//! (so a rejected form can be re-rendered as entered) and a `validate` step
//! producing the typed record.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{Artist, NewArtist, NewShow, NewVenue, Venue};
use crate::constants::{GENRES, SHOW_TIME_FORMATS, STATES};

const PHONE_PATTERN: &str = r"^\d{3}-\d{3}-\d{4}$";

static PHONE: Lazy<Regex> = Lazy::new(|| compile(PHONE_PATTERN));

/// Built-in patterns are literals; one that fails to compile is a bug, not a user error.
fn compile(pattern: &'static str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Raw `(key, value)` pairs in body order.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl FormData {
    /// First value for `key`, trimmed; "" when absent.
    pub fn text(&self, key: &str) -> String {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Every non-blank value for `key`, in order.
    pub fn all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.trim().to_string())
            .collect()
    }

    /// Checkbox semantics: present with y/on/true/1.
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.text(key).to_ascii_lowercase().as_str(),
            "y" | "yes" | "on" | "true" | "1"
        )
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn require(errors: &mut Vec<String>, label: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{label} is required."));
    }
}

fn check_state(errors: &mut Vec<String>, state: &str) {
    if !state.is_empty() && !STATES.contains(&state) {
        errors.push(format!("'{state}' is not a valid state."));
    }
}

fn check_genres(errors: &mut Vec<String>, genres: &[String]) {
    for genre in genres {
        if !GENRES.contains(&genre.as_str()) {
            errors.push(format!("'{genre}' is not a valid genre."));
        }
    }
}

fn check_phone(errors: &mut Vec<String>, phone: &str) {
    if !phone.is_empty() && !PHONE.is_match(phone) {
        errors.push("Phone must look like xxx-xxx-xxxx.".to_string());
    }
}

fn check_link(errors: &mut Vec<String>, label: &str, link: &str) {
    if !link.is_empty() && !(link.starts_with("http://") || link.starts_with("https://")) {
        errors.push(format!("{label} must be an http(s) URL."));
    }
}

fn check_links(errors: &mut Vec<String>, image: &str, facebook: &str, website: &str) {
    check_link(errors, "Image link", image);
    check_link(errors, "Facebook link", facebook);
    check_link(errors, "Website", website);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueFormValues {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueFormValues {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            city: form.text("city"),
            state: form.text("state"),
            address: form.text("address"),
            phone: form.text("phone"),
            genres: form.all("genres"),
            image_link: form.text("image_link"),
            facebook_link: form.text("facebook_link"),
            website: form.text("website"),
            seeking_talent: form.flag("seeking_talent"),
            seeking_description: form.text("seeking_description"),
        }
    }

    pub fn from_venue(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone().to_string(),
            genres: venue.genres.clone(),
            image_link: venue.image_link().to_string(),
            facebook_link: venue.facebook_link().to_string(),
            website: venue.website().to_string(),
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description().to_string(),
        }
    }

    pub fn validate(&self) -> Result<NewVenue, Vec<String>> {
        let mut errors = Vec::new();
        require(&mut errors, "Name", &self.name);
        require(&mut errors, "City", &self.city);
        require(&mut errors, "State", &self.state);
        require(&mut errors, "Address", &self.address);
        check_state(&mut errors, &self.state);
        check_phone(&mut errors, &self.phone);
        check_genres(&mut errors, &self.genres);
        check_links(&mut errors, &self.image_link, &self.facebook_link, &self.website);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewVenue {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            address: self.address.clone(),
            phone: optional(&self.phone),
            genres: self.genres.clone(),
            image_link: optional(&self.image_link),
            facebook_link: optional(&self.facebook_link),
            website: optional(&self.website),
            seeking_talent: self.seeking_talent,
            seeking_description: optional(&self.seeking_description),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistFormValues {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistFormValues {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            city: form.text("city"),
            state: form.text("state"),
            phone: form.text("phone"),
            genres: form.all("genres"),
            image_link: form.text("image_link"),
            facebook_link: form.text("facebook_link"),
            website: form.text("website"),
            seeking_venue: form.flag("seeking_venue"),
            seeking_description: form.text("seeking_description"),
        }
    }

    pub fn from_artist(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            phone: artist.phone().to_string(),
            genres: artist.genres.clone(),
            image_link: artist.image_link().to_string(),
            facebook_link: artist.facebook_link().to_string(),
            website: artist.website().to_string(),
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description().to_string(),
        }
    }

    pub fn validate(&self) -> Result<NewArtist, Vec<String>> {
        let mut errors = Vec::new();
        require(&mut errors, "Name", &self.name);
        require(&mut errors, "City", &self.city);
        require(&mut errors, "State", &self.state);
        check_state(&mut errors, &self.state);
        check_phone(&mut errors, &self.phone);
        check_genres(&mut errors, &self.genres);
        check_links(&mut errors, &self.image_link, &self.facebook_link, &self.website);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewArtist {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            phone: optional(&self.phone),
            genres: self.genres.clone(),
            image_link: optional(&self.image_link),
            facebook_link: optional(&self.facebook_link),
            website: optional(&self.website),
            seeking_venue: self.seeking_venue,
            seeking_description: optional(&self.seeking_description),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowFormValues {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    SHOW_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

impl ShowFormValues {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            artist_id: form.text("artist_id"),
            venue_id: form.text("venue_id"),
            start_time: form.text("start_time"),
        }
    }

    pub fn validate(&self) -> Result<NewShow, Vec<String>> {
        let mut errors = Vec::new();
        let artist_id = self.artist_id.parse::<i64>().ok();
        if artist_id.is_none() {
            errors.push("Artist ID must be a number.".to_string());
        }
        let venue_id = self.venue_id.parse::<i64>().ok();
        if venue_id.is_none() {
            errors.push("Venue ID must be a number.".to_string());
        }
        let start_time = parse_start_time(&self.start_time);
        if start_time.is_none() {
            errors.push("Start time must look like YYYY-MM-DD HH:MM:SS.".to_string());
        }

        match (artist_id, venue_id, start_time) {
            (Some(artist_id), Some(venue_id), Some(start_time)) if errors.is_empty() => {
                Ok(NewShow {
                    venue_id,
                    artist_id,
                    start_time,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::from(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn repeated_genres_are_collected_in_order() {
        let data = form(&[("genres", "Jazz"), ("name", "x"), ("genres", "Folk"), ("genres", " ")]);
        assert_eq!(data.all("genres"), vec!["Jazz", "Folk"]);
    }

    #[test]
    fn valid_venue_form_becomes_new_venue() {
        let data = form(&[
            ("name", " The Crocodile "),
            ("city", "Seattle"),
            ("state", "WA"),
            ("address", "2505 1st Ave"),
            ("phone", "206-441-4618"),
            ("genres", "Rock n Roll"),
            ("genres", "Punk"),
            ("seeking_talent", "y"),
            ("website", ""),
        ]);
        let venue = VenueFormValues::from_form(&data).validate().unwrap();
        assert_eq!(venue.name, "The Crocodile");
        assert_eq!(venue.genres, vec!["Rock n Roll", "Punk"]);
        assert!(venue.seeking_talent);
        assert_eq!(venue.website, None);
    }

    #[test]
    fn invalid_venue_form_reports_every_problem() {
        let data = form(&[
            ("city", "Seattle"),
            ("state", "ZZ"),
            ("address", "2505 1st Ave"),
            ("phone", "2064414618"),
            ("genres", "Polka"),
            ("facebook_link", "facebook.com/croc"),
        ]);
        let errors = VenueFormValues::from_form(&data).validate().unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
    }

    #[test]
    fn phone_numbers_must_be_dashed_groups() {
        let mut errors = Vec::new();
        check_phone(&mut errors, "326-123-5000");
        assert!(errors.is_empty());

        for bad in ["3261235000", "326-123-500", "(326) 123-5000", "326-123-5000x"] {
            let mut errors = Vec::new();
            check_phone(&mut errors, bad);
            assert_eq!(errors.len(), 1, "{bad}");
        }
    }

    #[test]
    fn artist_form_does_not_need_an_address() {
        let data = form(&[("name", "Matt Quevedo"), ("city", "New York"), ("state", "NY")]);
        let artist = ArtistFormValues::from_form(&data).validate().unwrap();
        assert!(!artist.seeking_venue);
        assert!(artist.genres.is_empty());
    }

    #[test]
    fn show_form_accepts_datetime_local_format() {
        let data = form(&[
            ("artist_id", "4"),
            ("venue_id", "1"),
            ("start_time", "2031-02-03T19:30"),
        ]);
        let show = ShowFormValues::from_form(&data).validate().unwrap();
        assert_eq!(show.artist_id, 4);
        assert_eq!(show.start_time.format("%H:%M").to_string(), "19:30");
    }

    #[test]
    fn show_form_rejects_garbage() {
        let data = form(&[("artist_id", "four"), ("venue_id", "1"), ("start_time", "soon")]);
        let errors = ShowFormValues::from_form(&data).validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
