use std::convert::Infallible;
use std::io::{self, BufRead, BufReader};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use iced::subscription::{self, Subscription};
use futures::executor::block_on;
use futures::future::pending;
use futures::SinkExt;
use futures::channel::mpsc::Sender;
use log::{debug, error, info, warn};
use serialport::SerialPort;
use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;

use crate::device::constants::{EVENT_CHANNEL_SIZE, LINE_TERMINATOR, MAX_LINE_LENGTH, POLL_DELAY, READ_TIMEOUT};
use crate::device::types::{ConnectionParams, DeviceEvent};
use crate::error::{readable_thread_panic_error, DeviceError};

/// Where the reader loop gets its bytes from.
pub trait LineSource {
    /// True if bytes are waiting to be read.
    fn has_input(&mut self) -> Result<bool, DeviceError>;

    /// Appends bytes to `buf` up to and including the line terminator.
    /// Returns false if the read timed out before the terminator arrived; the bytes received so
    /// far stay in `buf`.
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool, DeviceError>;
}

pub struct SerialLineSource {
    reader: BufReader<Box<dyn SerialPort>>,
}

impl SerialLineSource {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        SerialLineSource { reader: BufReader::new(port) }
    }
}

impl LineSource for SerialLineSource {
    fn has_input(&mut self) -> Result<bool, DeviceError> {
        if !self.reader.buffer().is_empty() {
            return Ok(true);
        }

        Ok(self.reader.get_ref().bytes_to_read()? > 0)
    }

    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool, DeviceError> {
        match self.reader.read_until(LINE_TERMINATOR, buf) {
            Ok(0) => Err(DeviceError::Disconnected),
            Ok(_) => Ok(buf.last() == Some(&LINE_TERMINATOR)),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

pub fn open_port(params: &ConnectionParams) -> Result<Box<dyn SerialPort>, DeviceError> {
    info!("Opening serial port {} at {} baud", params.port, params.baud_rate);

    let port = serialport::new(params.port.as_str(), params.baud_rate)
        .timeout(Duration::from_millis(READ_TIMEOUT))
        .open()?;

    info!("Serial port {} opened", params.port);
    Ok(port)
}

/// Decodes a raw line, dropping invalid utf-8 sequences and surrounding whitespace.
/// Returns None if nothing is left.
pub fn decode_line(bytes: &[u8]) -> Option<String> {
    let mut decoded = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        decoded.push_str(chunk.valid());
    }

    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    }
    else {
        Some(trimmed.to_string())
    }
}

fn send_event(sender: &mut Sender<DeviceEvent>, event: DeviceEvent) -> Result<(), DeviceError> {
    // only blocks this thread if the GUI falls EVENT_CHANNEL_SIZE events behind
    block_on(sender.send(event))?;
    Ok(())
}

/// Forwards every non-empty line from `source` until `cancel` is triggered.
pub fn read_lines<S: LineSource>(
    source: &mut S,
    cancel: &CancellationToken,
    sender: &mut Sender<DeviceEvent>,
) -> Result<(), DeviceError> {
    let mut line: Vec<u8> = Vec::new();

    while !cancel.is_cancelled() {
        if !source.has_input()? {
            thread::sleep(Duration::from_millis(POLL_DELAY));
            continue;
        }

        if !source.read_line(&mut line)? {
            if line.len() > MAX_LINE_LENGTH {
                warn!("Dropping {} bytes received without a line terminator", line.len());
                line.clear();
            }
            else {
                debug!("Read timed out with {} bytes of a partial line", line.len());
            }
            continue;
        }

        if let Some(decoded) = decode_line(&line) {
            send_event(sender, DeviceEvent::Line(decoded))?;
        }
        line.clear();
    }

    Ok(())
}

fn run_reader(params: &ConnectionParams, cancel: &CancellationToken, sender: &mut Sender<DeviceEvent>) {
    let result = open_port(params).and_then(|port| {
        let mut source = SerialLineSource::new(port);
        read_lines(&mut source, cancel, sender)
        // the port is closed here, when `source` is dropped
    });

    match result {
        Ok(()) => info!("Serial port {} closed", params.port),
        Err(DeviceError::SendError { source }) => {
            warn!("Serial port {} closed, nobody is listening for events: {}", params.port, source);
        },
        Err(err) => {
            warn!("Serial port {} failed: {}", params.port, err);
            if let Err(err) = send_event(sender, DeviceEvent::Error(err.to_string())) {
                warn!("Failed to report serial port error: {}", err);
            }
        },
    }
}

/// Starts the reader thread. The thread owns the serial port until it returns.
pub fn spawn_reader(
    params: ConnectionParams,
    cancel: CancellationToken,
    mut sender: Sender<DeviceEvent>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("serial-reader".to_string())
        .spawn(move || run_reader(&params, &cancel, &mut sender))
}

async fn join_reader(handle: JoinHandle<()>, sender: &mut Sender<DeviceEvent>) -> Result<(), DeviceError> {
    info!("Waiting for serial reader to stop");

    if let Err(panic) = spawn_blocking(move || handle.join()).await? {
        let message = readable_thread_panic_error(&panic);
        error!("Serial reader crashed: {}", message);
        sender.send(DeviceEvent::Error(message)).await?;
    }

    info!("Serial reader stopped");
    Ok(())
}

async fn connect_serial(
    params: ConnectionParams,
    cancel: CancellationToken,
    mut sender: Sender<DeviceEvent>,
) -> Infallible {
    match spawn_reader(params, cancel, sender.clone()) {
        Ok(handle) => {
            if let Err(err) = join_reader(handle, &mut sender).await {
                error!("Failed to join serial reader: {}", err);
            }
        },
        Err(err) => {
            error!("Failed to start serial reader thread: {}", err);
            if let Err(err) = sender.send(DeviceEvent::Error(err.to_string())).await {
                warn!("Failed to report serial reader error: {}", err);
            }
        },
    }

    if let Err(err) = sender.send(DeviceEvent::Stopped).await {
        warn!("Failed to report that the serial reader stopped: {}", err);
    }

    // note: subscription::channel expects the future to never resolve (Infallible);
    // the GUI drops this subscription after receiving DeviceEvent::Stopped.
    pending().await
}

/// Runs one connection. Every session needs a distinct `session_id`, otherwise iced would keep
/// the subscription of the previous session alive.
pub fn serial_reader_subscription(
    session_id: u64,
    params: ConnectionParams,
    cancel: CancellationToken,
) -> Subscription<DeviceEvent> {
    struct SerialReader;

    subscription::channel(
        (std::any::TypeId::of::<SerialReader>(), session_id),
        EVENT_CHANNEL_SIZE,
        move |subscription_sender| connect_serial(params, cancel, subscription_sender),
    )
}
