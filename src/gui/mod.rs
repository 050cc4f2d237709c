pub mod application;
pub mod state;
pub mod style;
pub mod types;
