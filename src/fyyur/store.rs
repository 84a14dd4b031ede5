use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Mutex;
use tracing::debug;

use super::models::{
    display_time, group_areas, split_shows, Appearance, Artist, ArtistDetail, NewArtist, NewShow,
    NewVenue, ShowListing, Summary, Venue, VenueArea, VenueDetail, DB_TIME_FORMAT,
};
use crate::db::matches_term;
use crate::error::{AppError, Result};

/// Storage trait for venues, artists and shows
#[async_trait]
pub trait FyyurStore: Send + Sync {
    // Venue operations
    async fn venue_areas(&self, now: NaiveDateTime) -> Result<Vec<VenueArea>>;
    async fn search_venues(&self, term: &str, now: NaiveDateTime) -> Result<Vec<Summary>>;
    async fn venue(&self, id: i64) -> Result<Option<Venue>>;
    async fn venue_detail(&self, id: i64, now: NaiveDateTime) -> Result<Option<VenueDetail>>;
    async fn create_venue(&self, venue: &NewVenue) -> Result<i64>;
    async fn update_venue(&self, id: i64, venue: &NewVenue) -> Result<()>;
    /// Deletes the venue and its shows; returns the deleted row.
    async fn delete_venue(&self, id: i64) -> Result<Venue>;

    // Artist operations
    async fn artists(&self, now: NaiveDateTime) -> Result<Vec<Summary>>;
    async fn search_artists(&self, term: &str, now: NaiveDateTime) -> Result<Vec<Summary>>;
    async fn artist(&self, id: i64) -> Result<Option<Artist>>;
    async fn artist_detail(&self, id: i64, now: NaiveDateTime) -> Result<Option<ArtistDetail>>;
    async fn create_artist(&self, artist: &NewArtist) -> Result<i64>;
    async fn update_artist(&self, id: i64, artist: &NewArtist) -> Result<()>;

    // Show operations
    /// Every show, latest start time first.
    async fn shows(&self) -> Result<Vec<ShowListing>>;
    async fn create_show(&self, show: &NewShow) -> Result<i64>;
}

pub struct SqliteFyyurStore {
    conn: Mutex<Connection>,
}

const VENUE_COLUMNS: &str = "id, name, city, state, address, phone, genres, image_link, \
     facebook_link, website, seeking_talent, seeking_description";
const ARTIST_COLUMNS: &str = "id, name, city, state, phone, genres, image_link, \
     facebook_link, website, seeking_venue, seeking_description";

fn genres_from(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn time_from(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DB_TIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn venue_from_row(row: &Row<'_>) -> rusqlite::Result<Venue> {
    Ok(Venue {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        state: row.get(3)?,
        address: row.get(4)?,
        phone: row.get(5)?,
        genres: genres_from(row, 6)?,
        image_link: row.get(7)?,
        facebook_link: row.get(8)?,
        website: row.get(9)?,
        seeking_talent: row.get(10)?,
        seeking_description: row.get(11)?,
    })
}

fn artist_from_row(row: &Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        state: row.get(3)?,
        phone: row.get(4)?,
        genres: genres_from(row, 5)?,
        image_link: row.get(6)?,
        facebook_link: row.get(7)?,
        website: row.get(8)?,
        seeking_venue: row.get(9)?,
        seeking_description: row.get(10)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<Summary> {
    Ok(Summary {
        id: row.get(0)?,
        name: row.get(1)?,
        num_upcoming_shows: row.get(2)?,
    })
}

/// `(start_time, counterpart)` pairs; columns are id, name, image_link, start_time.
fn appearance_from_row(row: &Row<'_>) -> rusqlite::Result<(NaiveDateTime, Appearance)> {
    let at = time_from(row, 3)?;
    let image_link: Option<String> = row.get(2)?;
    Ok((
        at,
        Appearance {
            id: row.get(0)?,
            name: row.get(1)?,
            image_link: image_link.unwrap_or_default(),
            start_time: display_time(&at),
        },
    ))
}

fn db_time(at: &NaiveDateTime) -> String {
    at.format(DB_TIME_FORMAT).to_string()
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>> {
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl SqliteFyyurStore {
    /// Wrap a connection that already has the Fyyur schema.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().map_err(|_| AppError::lock_poisoned())?;
        f(&mut conn)
    }

    /// Name search shared by venues and artists. `table` is never user input.
    fn search(&self, table: &str, side: &str, term: &str, now: NaiveDateTime) -> Result<Vec<Summary>> {
        let sql = format!(
            "SELECT t.id, t.name,
                    (SELECT COUNT(*) FROM shows s WHERE s.{side} = t.id AND s.start_time > ?1)
             FROM {table} t
             ORDER BY t.name"
        );
        let mut summaries = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![db_time(&now)], summary_from_row)?;
            collect(rows)
        })?;
        summaries.retain(|s| matches_term(&s.name, term));
        Ok(summaries)
    }
}

#[async_trait]
impl FyyurStore for SqliteFyyurStore {
    async fn venue_areas(&self, now: NaiveDateTime) -> Result<Vec<VenueArea>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT v.city, v.state, v.id, v.name,
                        (SELECT COUNT(*) FROM shows s WHERE s.venue_id = v.id AND s.start_time > ?1)
                 FROM venues v
                 ORDER BY v.state, v.city, v.name",
            )?;
            let rows = stmt.query_map(params![db_time(&now)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    Summary {
                        id: row.get(2)?,
                        name: row.get(3)?,
                        num_upcoming_shows: row.get(4)?,
                    },
                ))
            })?;
            collect(rows)
        })?;
        Ok(group_areas(rows))
    }

    async fn search_venues(&self, term: &str, now: NaiveDateTime) -> Result<Vec<Summary>> {
        self.search("venues", "venue_id", term, now)
    }

    async fn venue(&self, id: i64) -> Result<Option<Venue>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = ?1"),
                    params![id],
                    venue_from_row,
                )
                .optional()?)
        })
    }

    async fn venue_detail(&self, id: i64, now: NaiveDateTime) -> Result<Option<VenueDetail>> {
        let Some(venue) = self.venue(id).await? else {
            return Ok(None);
        };
        let shows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.name, a.image_link, s.start_time
                 FROM shows s JOIN artists a ON a.id = s.artist_id
                 WHERE s.venue_id = ?1
                 ORDER BY s.start_time",
            )?;
            let rows = stmt.query_map(params![id], appearance_from_row)?;
            collect(rows)
        })?;
        let (past_shows, upcoming_shows) = split_shows(shows, now);
        Ok(Some(VenueDetail {
            venue,
            past_shows,
            upcoming_shows,
        }))
    }

    async fn create_venue(&self, venue: &NewVenue) -> Result<i64> {
        let genres = serde_json::to_string(&venue.genres)?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO venues (name, city, state, address, phone, genres, image_link,
                                     facebook_link, website, seeking_talent, seeking_description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    venue.name,
                    venue.city,
                    venue.state,
                    venue.address,
                    venue.phone,
                    genres,
                    venue.image_link,
                    venue.facebook_link,
                    venue.website,
                    venue.seeking_talent,
                    venue.seeking_description,
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            debug!("Created venue: {} with id {}", venue.name, id);
            Ok(id)
        })
    }

    async fn update_venue(&self, id: i64, venue: &NewVenue) -> Result<()> {
        let genres = serde_json::to_string(&venue.genres)?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE venues SET name = ?2, city = ?3, state = ?4, address = ?5, phone = ?6,
                        genres = ?7, image_link = ?8, facebook_link = ?9, website = ?10,
                        seeking_talent = ?11, seeking_description = ?12
                 WHERE id = ?1",
                params![
                    id,
                    venue.name,
                    venue.city,
                    venue.state,
                    venue.address,
                    venue.phone,
                    genres,
                    venue.image_link,
                    venue.facebook_link,
                    venue.website,
                    venue.seeking_talent,
                    venue.seeking_description,
                ],
            )?;
            if changed == 0 {
                return Err(AppError::NotFound(format!("venue {id}")));
            }
            tx.commit()?;
            debug!("Updated venue {}", id);
            Ok(())
        })
    }

    async fn delete_venue(&self, id: i64) -> Result<Venue> {
        let venue = self
            .venue(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("venue {id}")))?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM venues WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(())
        })?;
        debug!("Deleted venue: {} with id {}", venue.name, id);
        Ok(venue)
    }

    async fn artists(&self, now: NaiveDateTime) -> Result<Vec<Summary>> {
        // The empty term matches every name.
        self.search("artists", "artist_id", "", now)
    }

    async fn search_artists(&self, term: &str, now: NaiveDateTime) -> Result<Vec<Summary>> {
        self.search("artists", "artist_id", term, now)
    }

    async fn artist(&self, id: i64) -> Result<Option<Artist>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ?1"),
                    params![id],
                    artist_from_row,
                )
                .optional()?)
        })
    }

    async fn artist_detail(&self, id: i64, now: NaiveDateTime) -> Result<Option<ArtistDetail>> {
        let Some(artist) = self.artist(id).await? else {
            return Ok(None);
        };
        let shows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT v.id, v.name, v.image_link, s.start_time
                 FROM shows s JOIN venues v ON v.id = s.venue_id
                 WHERE s.artist_id = ?1
                 ORDER BY s.start_time",
            )?;
            let rows = stmt.query_map(params![id], appearance_from_row)?;
            collect(rows)
        })?;
        let (past_shows, upcoming_shows) = split_shows(shows, now);
        Ok(Some(ArtistDetail {
            artist,
            past_shows,
            upcoming_shows,
        }))
    }

    async fn create_artist(&self, artist: &NewArtist) -> Result<i64> {
        let genres = serde_json::to_string(&artist.genres)?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO artists (name, city, state, phone, genres, image_link,
                                      facebook_link, website, seeking_venue, seeking_description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    artist.name,
                    artist.city,
                    artist.state,
                    artist.phone,
                    genres,
                    artist.image_link,
                    artist.facebook_link,
                    artist.website,
                    artist.seeking_venue,
                    artist.seeking_description,
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            debug!("Created artist: {} with id {}", artist.name, id);
            Ok(id)
        })
    }

    async fn update_artist(&self, id: i64, artist: &NewArtist) -> Result<()> {
        let genres = serde_json::to_string(&artist.genres)?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE artists SET name = ?2, city = ?3, state = ?4, phone = ?5, genres = ?6,
                        image_link = ?7, facebook_link = ?8, website = ?9,
                        seeking_venue = ?10, seeking_description = ?11
                 WHERE id = ?1",
                params![
                    id,
                    artist.name,
                    artist.city,
                    artist.state,
                    artist.phone,
                    genres,
                    artist.image_link,
                    artist.facebook_link,
                    artist.website,
                    artist.seeking_venue,
                    artist.seeking_description,
                ],
            )?;
            if changed == 0 {
                return Err(AppError::NotFound(format!("artist {id}")));
            }
            tx.commit()?;
            debug!("Updated artist {}", id);
            Ok(())
        })
    }

    async fn shows(&self) -> Result<Vec<ShowListing>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT v.id, v.name, a.id, a.name, a.image_link, s.start_time
                 FROM shows s
                 JOIN venues v ON v.id = s.venue_id
                 JOIN artists a ON a.id = s.artist_id
                 ORDER BY s.start_time DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                let image_link: Option<String> = row.get(4)?;
                Ok(ShowListing {
                    venue_id: row.get(0)?,
                    venue_name: row.get(1)?,
                    artist_id: row.get(2)?,
                    artist_name: row.get(3)?,
                    artist_image_link: image_link.unwrap_or_default(),
                    start_time: display_time(&time_from(row, 5)?),
                })
            })?;
            collect(rows)
        })
    }

    async fn create_show(&self, show: &NewShow) -> Result<i64> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            // Unknown venue or artist ids fail the foreign-key constraint here.
            tx.execute(
                "INSERT INTO shows (venue_id, artist_id, start_time) VALUES (?1, ?2, ?3)",
                params![show.venue_id, show.artist_id, db_time(&show.start_time)],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            debug!(
                "Created show {} (venue {}, artist {})",
                id, show.venue_id, show.artist_id
            );
            Ok(id)
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::{prepare, AppKind};
    use chrono::NaiveDate;

    pub(crate) fn seeded_store() -> SqliteFyyurStore {
        SqliteFyyurStore::new(prepare(":memory:", AppKind::Fyyur, true).unwrap())
    }

    /// Between the seeded past (2019) and upcoming (2035) shows.
    pub(crate) fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn new_venue(name: &str) -> NewVenue {
        NewVenue {
            name: name.to_string(),
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            address: "1 Pike St".to_string(),
            phone: Some("206-555-0100".to_string()),
            genres: vec!["Jazz".to_string(), "Blues".to_string()],
            image_link: None,
            facebook_link: None,
            website: None,
            seeking_talent: true,
            seeking_description: Some("Weeknight openers".to_string()),
        }
    }

    #[tokio::test]
    async fn venues_group_by_city_and_count_upcoming_shows() {
        let store = seeded_store();
        let areas = store.venue_areas(now()).await.unwrap();
        assert_eq!(areas.len(), 2);

        let sf = areas.iter().find(|a| a.city == "San Francisco").unwrap();
        assert_eq!(sf.venues.len(), 2);
        let park_square = sf.venues.iter().find(|v| v.id == 3).unwrap();
        assert_eq!(park_square.num_upcoming_shows, 3);
        let hop = sf.venues.iter().find(|v| v.id == 1).unwrap();
        assert_eq!(hop.num_upcoming_shows, 0);
    }

    #[tokio::test]
    async fn venue_search_is_case_insensitive_substring() {
        let store = seeded_store();
        let hop = store.search_venues("hOp", now()).await.unwrap();
        assert_eq!(hop.len(), 1);
        assert_eq!(hop[0].name, "The Musical Hop");

        let music = store.search_venues("Music", now()).await.unwrap();
        let names: Vec<_> = music.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Park Square Live Music & Coffee", "The Musical Hop"]);
    }

    #[tokio::test]
    async fn search_folds_accented_capitals() {
        let store = seeded_store();
        let id = store.create_venue(&new_venue("CAFÉ ÉTOILE")).await.unwrap();
        let hits = store.search_venues("café", now()).await.unwrap();
        assert_eq!(hits.iter().map(|s| s.id).collect::<Vec<_>>(), vec![id]);
    }

    #[tokio::test]
    async fn artists_are_listed_by_name() {
        let store = seeded_store();
        let artists = store.artists(now()).await.unwrap();
        let names: Vec<_> = artists.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"]);
        assert_eq!(artists[2].num_upcoming_shows, 3);
    }

    #[tokio::test]
    async fn artist_search_matches_examples() {
        let store = seeded_store();
        assert_eq!(store.search_artists("A", now()).await.unwrap().len(), 3);
        let band = store.search_artists("band", now()).await.unwrap();
        assert_eq!(band.len(), 1);
        assert_eq!(band[0].name, "The Wild Sax Band");
        assert!(store.search_artists("%", now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn venue_detail_splits_past_and_upcoming() {
        let store = seeded_store();
        let detail = store.venue_detail(3, now()).await.unwrap().unwrap();
        assert_eq!(detail.venue.genres.len(), 4);
        assert_eq!(detail.past_shows.len(), 1);
        assert_eq!(detail.past_shows[0].name, "Matt Quevedo");
        assert_eq!(detail.upcoming_shows.len(), 3);
        assert!(store.venue_detail(999, now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn artist_detail_lists_venues() {
        let store = seeded_store();
        let detail = store.artist_detail(4, now()).await.unwrap().unwrap();
        assert_eq!(detail.past_shows.len(), 1);
        assert_eq!(detail.past_shows[0].name, "The Musical Hop");
        assert!(detail.upcoming_shows.is_empty());
    }

    #[tokio::test]
    async fn create_update_and_delete_venue() {
        let store = seeded_store();
        let id = store.create_venue(&new_venue("The Crocodile")).await.unwrap();
        let venue = store.venue(id).await.unwrap().unwrap();
        assert_eq!(venue.genres, vec!["Jazz", "Blues"]);
        assert!(venue.seeking_talent);

        let mut changed = new_venue("The Crocodile Cafe");
        changed.genres = vec!["Punk".to_string()];
        store.update_venue(id, &changed).await.unwrap();
        let venue = store.venue(id).await.unwrap().unwrap();
        assert_eq!(venue.name, "The Crocodile Cafe");
        assert_eq!(venue.genres, vec!["Punk"]);

        let deleted = store.delete_venue(id).await.unwrap();
        assert_eq!(deleted.name, "The Crocodile Cafe");
        assert!(matches!(
            store.delete_venue(id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            store.update_venue(id, &changed).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn deleting_a_venue_removes_its_shows() {
        let store = seeded_store();
        let before = store.shows().await.unwrap().len();
        store.delete_venue(3).await.unwrap();
        assert_eq!(store.shows().await.unwrap().len(), before - 4);
    }

    #[tokio::test]
    async fn shows_are_latest_first() {
        let store = seeded_store();
        let shows = store.shows().await.unwrap();
        assert_eq!(shows.len(), 5);
        assert_eq!(shows[0].start_time, "04/15/2035, 20:00");
        assert_eq!(shows.last().unwrap().start_time, "05/21/2019, 21:30");
    }

    #[tokio::test]
    async fn show_for_unknown_artist_is_rejected() {
        let store = seeded_store();
        let show = NewShow {
            venue_id: 1,
            artist_id: 999,
            start_time: now(),
        };
        assert!(matches!(
            store.create_show(&show).await.unwrap_err(),
            AppError::Database(_)
        ));
        assert_eq!(store.shows().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn new_show_appears_in_artist_upcoming_shows() {
        let store = seeded_store();
        let start_time = NaiveDate::from_ymd_opt(2031, 7, 4)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap();
        store
            .create_show(&NewShow {
                venue_id: 2,
                artist_id: 5,
                start_time,
            })
            .await
            .unwrap();
        let detail = store.artist_detail(5, now()).await.unwrap().unwrap();
        assert_eq!(detail.upcoming_shows.len(), 1);
        assert_eq!(detail.upcoming_shows[0].name, "The Dueling Pianos Bar");
    }
}
