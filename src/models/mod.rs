pub mod error;
pub mod progress;
pub mod record;
pub mod size;
pub mod snapshot;
