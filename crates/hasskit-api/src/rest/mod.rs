// Bearer-authenticated REST API (`/api/...`)

mod calendars;
pub mod client;
mod history;
pub mod models;
mod states;
mod system;

pub use client::HassClient;
pub use history::{HistoryQuery, LogbookQuery};
