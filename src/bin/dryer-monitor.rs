use log::info;
use dryer_monitor::{init_logging, run};
use dryer_monitor::error::{error_msgbox, AppRunError};

fn main() -> Result<(), AppRunError> {
    init_logging();
    info!(concat!("Filament Dryer Monitor ", env!("CARGO_PKG_VERSION")));

    match run() {
        Err(err) => {
            error_msgbox("Unexpected error", &err);
            Err(err)
        }
        Ok(_) => Ok(())
    }
}
