pub mod progress_bar;
pub mod spinner;
pub mod status_bar;
