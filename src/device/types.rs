use crate::device::constants::DEFAULT_BAUD_RATE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub port: String,
    pub baud_rate: u32,
}

impl ConnectionParams {
    pub fn new(port: impl Into<String>) -> Self {
        ConnectionParams {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Line(String),
    Error(String), // sent at most once, the reader stops afterwards
    Stopped,
}
