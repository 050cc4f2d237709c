use std::any::Any;
use std::io;
use thiserror::Error;
use msgbox::IconType;
use std::fmt::Display;
use iced;
use futures::channel::mpsc::SendError;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum AppRunError {
    #[error("Failed to start application (iced): {source}")]
    Iced { #[from] source: iced::Error },
}

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Error communicating with serial port: {source}")]
    Serial { #[from] source: serialport::Error },

    #[error("Failed to read from serial port: {source}")]
    IOError { #[from] source: io::Error },

    #[error("The serial port stopped delivering data")]
    Disconnected,

    #[error("Failed to send DeviceEvent over mpsc channel: {source}")]
    SendError { #[from] source: SendError },

    #[error("Failed to join blocking task: {source}")]
    Join { #[from] source: JoinError },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("No serial port selected")]
    NoPortSelected,

    #[error("A connection is already active")]
    AlreadyConnected,
}

pub fn readable_thread_panic_error(error: &Box<dyn Any + Send + 'static>) -> String {
    let mut stringified = String::from("???");

    if let Some(s) = error.downcast_ref::<&str>() {
        stringified = format!("{}", s);
    }
    else if let Some(s) = error.downcast_ref::<String>() {
        stringified = format!("{}", s);
    }
    let type_id = (**error).type_id();

    format!("panic from thread: [{:?}]: [{}]", type_id, stringified)
}

pub fn error_msgbox<T: Display>(message: &'static str, error: &T) {
    let message = format!("{}: {}", message, error);
    eprintln!("{}", &message);
    if let Err(err) = msgbox::create(concat!("Filament Dryer Monitor ", env!("CARGO_PKG_VERSION")), &message, IconType::Error) {
        eprintln!("Failed to create msgbox: {:?}", err);
    }
}
