use chrono::NaiveDateTime;

use crate::constants::SHOW_TIME_DISPLAY;

/// Storage format for `shows.start_time`; sorts lexicographically in time order.
pub const DB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

/// Templates want plain strings; absent optional columns render as "".
macro_rules! optional_text {
    ($ty:ty: $($field:ident),+) => {
        impl $ty {
            $(
                pub fn $field(&self) -> &str {
                    self.$field.as_deref().unwrap_or("")
                }
            )+
        }
    };
}

optional_text!(Venue: phone, image_link, facebook_link, website, seeking_description);
optional_text!(Artist: phone, image_link, facebook_link, website, seeking_description);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtist {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShow {
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: NaiveDateTime,
}

/// A venue or artist in a list, with how many of its shows are still ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: i64,
}

/// Venues sharing a city and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<Summary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

/// One show seen from a venue or artist page: the other party plus the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    pub id: i64,
    pub name: String,
    pub image_link: String,
    pub start_time: String,
}

#[derive(Debug, Clone)]
pub struct VenueDetail {
    pub venue: Venue,
    pub past_shows: Vec<Appearance>,
    pub upcoming_shows: Vec<Appearance>,
}

#[derive(Debug, Clone)]
pub struct ArtistDetail {
    pub artist: Artist,
    pub past_shows: Vec<Appearance>,
    pub upcoming_shows: Vec<Appearance>,
}

pub fn display_time(at: &NaiveDateTime) -> String {
    at.format(SHOW_TIME_DISPLAY).to_string()
}

/// Split dated appearances around `now`. A show starting exactly now is neither past nor upcoming.
pub fn split_shows(
    shows: Vec<(NaiveDateTime, Appearance)>,
    now: NaiveDateTime,
) -> (Vec<Appearance>, Vec<Appearance>) {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for (at, appearance) in shows {
        if at < now {
            past.push(appearance);
        } else if at > now {
            upcoming.push(appearance);
        }
    }
    (past, upcoming)
}

/// Group summaries already sorted by (state, city) into areas.
pub fn group_areas(rows: Vec<(String, String, Summary)>) -> Vec<VenueArea> {
    let mut areas: Vec<VenueArea> = Vec::new();
    for (city, state, summary) in rows {
        match areas.last_mut() {
            Some(area) if area.city == city && area.state == state => area.venues.push(summary),
            _ => areas.push(VenueArea {
                city,
                state,
                venues: vec![summary],
            }),
        }
    }
    areas
}
