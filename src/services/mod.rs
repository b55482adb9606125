pub mod auth;
pub mod formatter;
pub mod prompt;
pub mod providers;
