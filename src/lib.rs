//! Terminal choropleth of Indonesian province populations by year.

pub mod api;
pub mod app;
pub mod braille;
pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod layout;
pub mod map;
pub mod panels;
pub mod ui;
