pub mod api;
pub mod codeforces;
pub mod config;
pub mod db;
pub mod error;
pub mod mailer;
pub mod models;
pub mod services;
pub mod state;
