use tokio::task::spawn_blocking;

use crate::error::DeviceError;

/// Names of the serial ports currently known to the OS, e.g. `/dev/ttyACM0` or `COM3`.
pub async fn list_ports() -> Result<Vec<String>, DeviceError> {
    let ports = spawn_blocking(serialport::available_ports).await??;

    Ok(ports.into_iter().map(|info| info.port_name).collect())
}
