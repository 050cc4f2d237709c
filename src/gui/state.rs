use std::collections::VecDeque;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::device::types::{ConnectionParams, DeviceEvent};
use crate::error::ConnectError;
use crate::telemetry::parse::parse_line;
use crate::telemetry::types::{HeaterState, Telemetry};

/**
 * Maximum number of entries kept in the log pane; the oldest entries are dropped first.
 */
pub const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: u64,
    pub params: ConnectionParams,
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone)]
pub enum LinkState {
    Idle,
    Connected(Session),
    // cancel requested, waiting for the reader thread to be joined
    Disconnecting(Session),
}

#[derive(Debug)]
pub struct Dashboard {
    ports: Vec<String>,
    selected_port: Option<String>,
    link: LinkState,
    // latest successfully parsed line
    telemetry: Option<Telemetry>,
    log: VecDeque<String>,
    next_session_id: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Dashboard {
            ports: Vec::new(),
            selected_port: None,
            link: LinkState::Idle,
            telemetry: None,
            log: VecDeque::new(),
            next_session_id: 0,
        }
    }
}

impl Dashboard {
    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    pub fn selected_port(&self) -> Option<&String> {
        self.selected_port.as_ref()
    }

    pub fn link(&self) -> &LinkState {
        &self.link
    }

    pub fn telemetry(&self) -> Option<&Telemetry> {
        self.telemetry.as_ref()
    }

    pub fn log(&self) -> impl Iterator<Item = &String> {
        self.log.iter()
    }

    /// Port selection and refresh are only available while idle.
    pub fn controls_enabled(&self) -> bool {
        matches!(self.link, LinkState::Idle)
    }

    /// The position of the connect/disconnect toggle.
    pub fn is_toggled(&self) -> bool {
        !matches!(self.link, LinkState::Idle)
    }

    /// The session whose reader is still running (or still being stopped).
    pub fn session(&self) -> Option<&Session> {
        match &self.link {
            LinkState::Idle => None,
            LinkState::Connected(session) | LinkState::Disconnecting(session) => Some(session),
        }
    }

    pub fn push_log(&mut self, entry: impl Into<String>) {
        if self.log.len() >= LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(entry.into());
    }

    /// Replaces the port list. The selection survives if the port is still present, otherwise
    /// the first port is selected.
    pub fn set_ports(&mut self, ports: Vec<String>) {
        if !self.controls_enabled() {
            return;
        }

        let keep_selection = match &self.selected_port {
            Some(port) => ports.contains(port),
            None => false,
        };

        if !keep_selection {
            self.selected_port = ports.first().cloned();
        }
        self.ports = ports;
    }

    pub fn select_port(&mut self, port: String) {
        if self.controls_enabled() {
            self.selected_port = Some(port);
        }
    }

    pub fn toggle_connection(&mut self, parent_cancel: &CancellationToken) {
        match self.link {
            LinkState::Idle => {
                // a missing port has already been reported in the log
                let _ = self.connect(parent_cancel);
            },
            LinkState::Connected(_) => self.disconnect(),
            LinkState::Disconnecting(_) => {},
        }
    }

    /// Starts a new session. The reader itself is started by the subscription that watches
    /// `session()`.
    pub fn connect(&mut self, parent_cancel: &CancellationToken) -> Result<Session, ConnectError> {
        if !matches!(self.link, LinkState::Idle) {
            return Err(ConnectError::AlreadyConnected);
        }

        let port = match self.selected_port.clone().filter(|port| !port.is_empty()) {
            Some(port) => port,
            None => {
                self.push_log("Select a serial port!");
                return Err(ConnectError::NoPortSelected);
            },
        };

        let session = Session {
            id: self.next_session_id,
            params: ConnectionParams::new(port.as_str()),
            cancel: parent_cancel.child_token(),
        };
        self.next_session_id += 1;

        info!("Connecting to {} (session {})", port, session.id);
        self.push_log(format!("Connecting to {}...", port));
        self.link = LinkState::Connected(session.clone());
        Ok(session)
    }

    /// Asks the reader to stop. Controls stay disabled until the reader reports that it stopped.
    pub fn disconnect(&mut self) {
        let session = match &self.link {
            LinkState::Connected(session) => session.clone(),
            _ => return,
        };

        info!("Disconnecting session {}", session.id);
        session.cancel.cancel();
        self.link = LinkState::Disconnecting(session);
    }

    pub fn handle_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Line(line) => self.on_line(line),
            DeviceEvent::Error(message) => {
                warn!("Serial reader error: {}", message);
                self.push_log(format!("ERROR: {}", message));
                self.disconnect();
            },
            DeviceEvent::Stopped => {
                if let Some(id) = self.session().map(|session| session.id) {
                    info!("Session {} stopped", id);
                    self.link = LinkState::Idle;
                    self.push_log("Disconnected.");
                }
            },
        }
    }

    pub fn on_line(&mut self, line: String) {
        let telemetry = parse_line(&line);
        self.push_log(line);

        if let Some(telemetry) = telemetry {
            debug!(
                "Reading: {:?} °C, {:?} %, {:?} g, heater {}",
                telemetry.temperature_value(),
                telemetry.humidity_value(),
                telemetry.weight_value(),
                telemetry.heater,
            );
            self.telemetry = Some(telemetry);
        }
    }

    pub fn temperature_text(&self) -> String {
        match self.telemetry() {
            Some(telemetry) => format!("{} °C", telemetry.temperature),
            None => "--- °C".to_string(),
        }
    }

    pub fn humidity_text(&self) -> String {
        match self.telemetry() {
            Some(telemetry) => format!("{} %", telemetry.humidity),
            None => "--- %".to_string(),
        }
    }

    pub fn weight_text(&self) -> String {
        match self.telemetry() {
            Some(telemetry) => format!("{} g", telemetry.weight),
            None => "--- g".to_string(),
        }
    }

    pub fn heater(&self) -> HeaterState {
        match self.telemetry() {
            Some(telemetry) => telemetry.heater,
            None => HeaterState::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOT_LINE: &str = "T: 85.0 C | H: 20.0 % | Peso: 150 | Aquecedor: ON";

    fn dashboard_with_ports() -> Dashboard {
        let mut dashboard = Dashboard::default();
        dashboard.set_ports(vec!["/dev/ttyACM0".to_string(), "/dev/ttyUSB0".to_string()]);
        dashboard
    }

    fn connected_dashboard(parent: &CancellationToken) -> Dashboard {
        let mut dashboard = dashboard_with_ports();
        dashboard.connect(parent).unwrap();
        dashboard
    }

    fn display(dashboard: &Dashboard) -> (String, String, String, HeaterState) {
        (
            dashboard.temperature_text(),
            dashboard.humidity_text(),
            dashboard.weight_text(),
            dashboard.heater(),
        )
    }

    #[test]
    fn starts_idle_with_placeholders() {
        let dashboard = Dashboard::default();

        assert!(dashboard.controls_enabled());
        assert!(!dashboard.is_toggled());
        assert!(dashboard.session().is_none());
        assert_eq!(display(&dashboard), (
            "--- °C".to_string(),
            "--- %".to_string(),
            "--- g".to_string(),
            HeaterState::Off,
        ));
    }

    #[test]
    fn matching_line_updates_every_field() {
        let mut dashboard = Dashboard::default();
        dashboard.on_line(HOT_LINE.to_string());

        assert_eq!(display(&dashboard), (
            "85.0 °C".to_string(),
            "20.0 %".to_string(),
            "150 g".to_string(),
            HeaterState::On,
        ));
        assert_eq!(dashboard.telemetry().unwrap().weight_value(), Some(150.0));
        assert_eq!(dashboard.log().collect::<Vec<_>>(), vec![HOT_LINE]);
    }

    #[test]
    fn non_numeric_fields_are_shown_verbatim() {
        let mut dashboard = Dashboard::default();
        dashboard.on_line("T: 1.2.3 C | H: 20.0 % | Peso: - | Aquecedor: OFF".to_string());

        assert_eq!(dashboard.temperature_text(), "1.2.3 °C");
        assert_eq!(dashboard.weight_text(), "- g");
        assert_eq!(dashboard.telemetry().unwrap().temperature_value(), None);
        assert_eq!(dashboard.telemetry().unwrap().humidity_value(), Some(20.0));
    }

    #[test]
    fn unparseable_line_is_only_logged() {
        let mut dashboard = Dashboard::default();
        dashboard.on_line(HOT_LINE.to_string());
        let before = display(&dashboard);

        dashboard.on_line("garbage line".to_string());

        assert_eq!(display(&dashboard), before);
        assert_eq!(dashboard.log().count(), 2);
        assert_eq!(dashboard.log().last().unwrap(), "garbage line");
    }

    #[test]
    fn newest_line_replaces_previous_reading() {
        let mut dashboard = Dashboard::default();
        dashboard.on_line(HOT_LINE.to_string());
        dashboard.on_line("T: 60.2 C | H: 31.5 % | Peso: -2 | Aquecedor: OFF".to_string());

        assert_eq!(display(&dashboard), (
            "60.2 °C".to_string(),
            "31.5 %".to_string(),
            "-2 g".to_string(),
            HeaterState::Off,
        ));
    }

    #[test]
    fn connect_without_port_keeps_toggle_off() {
        let parent = CancellationToken::new();
        let mut dashboard = Dashboard::default();

        assert_eq!(dashboard.connect(&parent).unwrap_err(), ConnectError::NoPortSelected);
        assert!(!dashboard.is_toggled());
        assert!(dashboard.session().is_none());
        assert!(dashboard.controls_enabled());
        assert_eq!(dashboard.log().collect::<Vec<_>>(), vec!["Select a serial port!"]);

        dashboard.toggle_connection(&parent);
        assert!(!dashboard.is_toggled());
    }

    #[test]
    fn connect_disables_controls() {
        let parent = CancellationToken::new();
        let mut dashboard = dashboard_with_ports();

        let session = dashboard.connect(&parent).unwrap();
        assert_eq!(session.params, ConnectionParams::new("/dev/ttyACM0"));
        assert_eq!(session.params.baud_rate, 115_200);

        assert!(dashboard.is_toggled());
        assert!(!dashboard.controls_enabled());
        assert_eq!(dashboard.log().last().unwrap(), "Connecting to /dev/ttyACM0...");
        assert_eq!(dashboard.connect(&parent).unwrap_err(), ConnectError::AlreadyConnected);
    }

    #[test]
    fn controls_are_frozen_while_connected() {
        let parent = CancellationToken::new();
        let mut dashboard = connected_dashboard(&parent);

        dashboard.select_port("/dev/ttyUSB0".to_string());
        dashboard.set_ports(Vec::new());

        assert_eq!(dashboard.selected_port().unwrap(), "/dev/ttyACM0");
        assert_eq!(dashboard.ports().len(), 2);
    }

    #[test]
    fn disconnect_waits_for_reader_to_stop() {
        let parent = CancellationToken::new();
        let mut dashboard = connected_dashboard(&parent);
        let cancel = dashboard.session().unwrap().cancel.clone();

        dashboard.toggle_connection(&parent);
        assert!(cancel.is_cancelled());
        assert!(matches!(dashboard.link(), LinkState::Disconnecting(_)));
        assert!(!dashboard.controls_enabled());

        // pressing the toggle again while stopping does nothing
        dashboard.toggle_connection(&parent);
        assert!(matches!(dashboard.link(), LinkState::Disconnecting(_)));

        dashboard.handle_event(DeviceEvent::Stopped);
        assert!(dashboard.controls_enabled());
        assert!(!dashboard.is_toggled());
        assert!(dashboard.session().is_none());
        assert_eq!(dashboard.log().last().unwrap(), "Disconnected.");
    }

    #[test]
    fn reader_error_forces_disconnect() {
        let parent = CancellationToken::new();
        let mut dashboard = connected_dashboard(&parent);
        let cancel = dashboard.session().unwrap().cancel.clone();

        dashboard.handle_event(DeviceEvent::Error("Broken pipe".to_string()));
        assert!(cancel.is_cancelled());
        assert!(matches!(dashboard.link(), LinkState::Disconnecting(_)));
        assert_eq!(dashboard.log().last().unwrap(), "ERROR: Broken pipe");

        dashboard.handle_event(DeviceEvent::Stopped);
        assert!(dashboard.controls_enabled());
    }

    #[test]
    fn sessions_get_fresh_ids_and_tokens() {
        let parent = CancellationToken::new();
        let mut dashboard = connected_dashboard(&parent);
        let first = dashboard.session().unwrap().clone();

        dashboard.disconnect();
        dashboard.handle_event(DeviceEvent::Stopped);
        let second = dashboard.connect(&parent).unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
    }

    #[test]
    fn parent_cancel_reaches_session() {
        let parent = CancellationToken::new();
        let dashboard = connected_dashboard(&parent);

        parent.cancel();
        assert!(dashboard.session().unwrap().cancel.is_cancelled());
    }

    #[test]
    fn stray_stop_while_idle_is_ignored() {
        let mut dashboard = Dashboard::default();
        dashboard.handle_event(DeviceEvent::Stopped);

        assert!(dashboard.controls_enabled());
        assert_eq!(dashboard.log().count(), 0);
    }

    #[test]
    fn refresh_keeps_or_replaces_selection() {
        let mut dashboard = dashboard_with_ports();
        assert_eq!(dashboard.selected_port().unwrap(), "/dev/ttyACM0");

        dashboard.select_port("/dev/ttyUSB0".to_string());
        dashboard.set_ports(vec!["/dev/ttyS0".to_string(), "/dev/ttyUSB0".to_string()]);
        assert_eq!(dashboard.selected_port().unwrap(), "/dev/ttyUSB0");

        dashboard.set_ports(vec!["/dev/ttyS0".to_string()]);
        assert_eq!(dashboard.selected_port().unwrap(), "/dev/ttyS0");

        dashboard.set_ports(Vec::new());
        assert!(dashboard.selected_port().is_none());
    }

    #[test]
    fn log_is_bounded() {
        let mut dashboard = Dashboard::default();
        for index in 0..LOG_CAPACITY + 10 {
            dashboard.push_log(format!("line {}", index));
        }

        assert_eq!(dashboard.log().count(), LOG_CAPACITY);
        assert_eq!(dashboard.log().next().unwrap(), "line 10");
    }
}
