use iced::{Alignment, Application, Color, Command, Element, Length, Settings, Size, Subscription, executor, window};
use iced::event::{self, Event};
use iced::font::{self, Font};
use iced::theme::{self, Theme};
use iced::widget::{
    Column, PickList, button, column, container, row, scrollable, text,
};
use iced::widget::scrollable::RelativeOffset;
use iced::window::icon;
use log::{info, warn};
use tokio_util::sync::{CancellationToken};

use crate::device::connection::serial_reader_subscription;
use crate::device::ports::list_ports;
use crate::error::AppRunError;
use crate::gui::state::{Dashboard, LinkState};
use crate::gui::style::{CardStyleSheet, LogStyleSheet, HUMIDITY_COLOR, TEMPERATURE_COLOR, WEIGHT_COLOR, heater_color};
use crate::gui::types::Message;

const BOLD_FONT: Font = Font {
    weight: font::Weight::Bold,
    ..Font::DEFAULT
};

fn log_scrollable_id() -> scrollable::Id {
    scrollable::Id::new("serial-log")
}

pub struct DryerMonitor {
    // this token is cancelled upon exit, every session token is a child of it
    app_cancel: CancellationToken,
    dashboard: Dashboard,
}

impl DryerMonitor {
    fn before_close(&mut self) {
        self.dashboard.disconnect();
        self.app_cancel.cancel();
    }

    fn refresh_ports(&self) -> Command<Message> {
        let fut = async move {
            match list_ports().await {
                Ok(ports) => Ok(ports),
                Err(err) => {
                    warn!("Failed to list serial ports: {:?}", &err);
                    Err(format!("Failed to list serial ports: {}", &err))
                },
            }
        };

        Command::perform(fut, Message::PortsRefreshed)
    }

    fn scroll_log_to_end(&self) -> Command<Message> {
        scrollable::snap_to(log_scrollable_id(), RelativeOffset::END)
    }
}

impl Application for DryerMonitor {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ();

    fn new(_flags: ()) -> (DryerMonitor, Command<Self::Message>) {
        let app = DryerMonitor {
            app_cancel: CancellationToken::new(),
            dashboard: Dashboard::default(),
        };

        let command = app.refresh_ports();
        (app, command)
    }

    fn title(&self) -> String {
        String::from(concat!("Filament Dryer Monitor ", env!("CARGO_PKG_VERSION")))
    }

    fn update(&mut self, message: Message) -> Command<Self::Message> {
        match message {
            Message::EventOccurred(Event::Window(id, window::Event::CloseRequested)) => {
                info!("Close requested");
                self.before_close();
                return window::close(id);
            },
            Message::EventOccurred(_) => {},
            Message::RefreshPorts => {
                if self.dashboard.controls_enabled() {
                    return self.refresh_ports();
                }
            },
            Message::PortsRefreshed(Ok(ports)) => {
                info!("Found {} serial port(s)", ports.len());
                self.dashboard.set_ports(ports);
            },
            Message::PortsRefreshed(Err(error_message)) => {
                self.dashboard.push_log(error_message);
                return self.scroll_log_to_end();
            },
            Message::PortSelected(port) => {
                self.dashboard.select_port(port);
            },
            Message::ConnectionToggled => {
                self.dashboard.toggle_connection(&self.app_cancel);
                return self.scroll_log_to_end();
            },
            Message::DeviceEvent(event) => {
                self.dashboard.handle_event(event);
                return self.scroll_log_to_end();
            },
        }

        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            event::listen().map(Message::EventOccurred),
        ];

        // the reader runs for as long as this subscription is returned
        if let Some(session) = self.dashboard.session() {
            subscriptions.push(
                serial_reader_subscription(
                    session.id,
                    session.params.clone(),
                    session.cancel.clone(),
                ).map(Message::DeviceEvent)
            );
        }

        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<Message> {
        let dashboard = &self.dashboard;
        let controls_enabled = dashboard.controls_enabled();

        let card = |title: &'static str, value: String, color: Color| -> Element<Message> {
            container(
                column![
                    text(title).size(14).font(BOLD_FONT),
                    text(value).size(28).font(BOLD_FONT),
                ].align_items(Alignment::Center).spacing(8),
            )
            .width(Length::Fill)
            .padding(16)
            .center_x()
            .style(theme::Container::Custom(Box::new(CardStyleSheet { background: color })))
            .into()
        };

        let port_selector: Element<Message> = if controls_enabled {
            PickList::new(
                dashboard.ports().to_vec(),
                dashboard.selected_port().cloned(),
                Message::PortSelected,
            )
            .placeholder("No serial port")
            .width(200)
            .into()
        }
        else {
            // a button without on_press is rendered disabled
            button(text(dashboard.selected_port().cloned().unwrap_or_default()))
                .style(theme::Button::Secondary)
                .width(200)
                .into()
        };

        let mut refresh_button = button(text("Refresh Ports"))
            .style(theme::Button::Secondary);
        if controls_enabled {
            refresh_button = refresh_button.on_press(Message::RefreshPorts);
        }

        let connect_button = if dashboard.is_toggled() {
            let disconnecting = matches!(dashboard.link(), LinkState::Disconnecting(_));
            let label = if disconnecting { "Disconnecting…" } else { "Disconnect" };
            let connect_button = button(text(label))
                .style(theme::Button::Destructive);

            // stays disabled until the reader reports that it stopped
            if disconnecting { connect_button } else { connect_button.on_press(Message::ConnectionToggled) }
        }
        else {
            button(text("Connect"))
                .style(theme::Button::Primary)
                .on_press(Message::ConnectionToggled)
        };

        let log_lines = Column::with_children(
            dashboard.log()
                .map(|entry| text(entry).font(Font::MONOSPACE).size(14))
                .map(Element::from)
        )
            .spacing(2)
            .width(Length::Fill);

        container(
            column![
                row![
                    text("Serial port:"),
                    port_selector,
                    refresh_button,
                    connect_button,
                ].align_items(Alignment::Center).spacing(10),

                row![
                    card("Temperature", dashboard.temperature_text(), TEMPERATURE_COLOR),
                    card("Humidity", dashboard.humidity_text(), HUMIDITY_COLOR),
                    card("Weight", dashboard.weight_text(), WEIGHT_COLOR),
                    card("Heater", dashboard.heater().to_string(), heater_color(dashboard.heater())),
                ].spacing(10),

                text("Serial log:"),

                container(
                    scrollable(log_lines.padding(8))
                        .id(log_scrollable_id())
                        .width(Length::Fill)
                        .height(Length::Fill),
                )
                .width(Length::Fill)
                .height(Length::Fill)
                .style(theme::Container::Custom(Box::new(LogStyleSheet))),
            ].spacing(15),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(20)
        .into()
    }
}

fn make_icon() -> icon::Icon {
    let bytes = include_bytes!(concat!(env!("OUT_DIR"), "/icon-32-rgba"));
    let bytes = bytes.to_vec();
    icon::from_rgba(bytes, 32, 32).expect("Failed to load window icon")
}

pub fn run_application() -> Result<(), AppRunError> {
    let mut settings = Settings::with_flags(());

    // handle exits ourselves (Event::CloseRequested)
    settings.id = Some("dryer-monitor".to_string());
    settings.window.exit_on_close_request = false;
    settings.window.size = Size::new(800.0, 500.0);
    settings.window.icon = Some(make_icon());

    // this function will call process::exit() unless there was a startup error
    DryerMonitor::run(settings)?;
    Ok(())
}
