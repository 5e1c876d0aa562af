pub mod events;
pub mod orchestrator;
pub mod progress;
pub mod reader;
pub mod scanner;
pub mod session;
