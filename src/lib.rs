pub mod bar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod google_calendar;
pub mod startup;
pub mod utils;
