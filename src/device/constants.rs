/**
 * Baud rate used by the dryer firmware (USB CDC stdio).
 */
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/**
 * How long (milliseconds) a single read may block before the reader checks for a stop request.
 */
pub const READ_TIMEOUT: u64 = 1000;

/**
 * How long (milliseconds) to sleep when no bytes are waiting on the port.
 */
pub const POLL_DELAY: u64 = 10;

/**
 * Capacity of the channel carrying DeviceEvents from the reader thread to the GUI.
 */
pub const EVENT_CHANNEL_SIZE: usize = 64;

pub const LINE_TERMINATOR: u8 = b'\n';

/**
 * Longest partial line (bytes) kept while waiting for LINE_TERMINATOR; longer input is dropped.
 */
pub const MAX_LINE_LENGTH: usize = 4096;
