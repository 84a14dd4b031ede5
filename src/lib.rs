pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;

// The two web applications
pub mod fyyur;
pub mod trivia;
