pub mod admin;
pub mod api;
pub mod browser;
pub mod dashboard;
pub mod logging;
pub mod notify;
pub mod settings;
pub mod timers;
