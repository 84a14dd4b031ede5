/// Application name constants to ensure consistency across the codebase
pub const FYYUR_APP: &str = "fyyur";
pub const TRIVIA_APP: &str = "trivia";

pub const DEFAULT_FYYUR_PORT: u16 = 5000;
pub const DEFAULT_TRIVIA_PORT: u16 = 5001;

/// Trivia questions returned per page by `GET /questions`
pub const QUESTIONS_PER_PAGE: usize = 10;

/// Quiz category id meaning "all categories"
pub const ALL_CATEGORIES: i64 = 0;

/// Accepted `start_time` formats for new shows (HTML `datetime-local` included)
pub const SHOW_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Display format for show start times on list pages
pub const SHOW_TIME_DISPLAY: &str = "%m/%d/%Y, %H:%M";

pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Swing",
    "Other",
];
