mod client;
pub mod credentials;
pub mod models;
pub mod token;

pub use client::GoogleCalendarClient;
pub use credentials::ClientSecret;
pub use models::{CalendarEvent, CalendarListEntry};
pub use token::{Token, TokenManager, TokenStore};
