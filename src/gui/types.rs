use iced::{Event};

use crate::device::types::{DeviceEvent};

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    RefreshPorts,
    PortsRefreshed(Result<Vec<String>, String>),
    PortSelected(String),
    ConnectionToggled,
    DeviceEvent(DeviceEvent),
}
