pub mod app;
pub mod config;
pub mod core;
pub mod headless;
pub mod models;
pub mod ui;
