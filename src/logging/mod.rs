//! Logging infrastructure for structured console and file output.

mod logger;
mod memory;
mod subscriber;
mod tally;
mod types;
mod utils;

pub use logger::Logger;
pub use memory::MemoryLog;
pub use subscriber::{ConsoleOpts, init_subscriber};
pub use tally::Tally;
pub use types::{Level, Log, Severity};
pub use utils::supports_color;
