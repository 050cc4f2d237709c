pub mod connection;
pub mod constants;
pub mod ports;
pub mod types;
