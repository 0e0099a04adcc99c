//!
//! This library provides communication with a Prema 6000 digital multimeter.
//!
//! <br>
//!
//! # Details
//!
//! - The DMM is attached by GPIB. A serial-to-GPIB controller speaking
//!   the `++` command set is supported, as is a direct serial line.
//!
//! - Basic setup and connection
//!
//!   ```no_run
//!   use prema6000ctrl::{Device, DEFAULT_BAUDRATE};
//!   #[tokio::main]
//!   async fn main() -> prema6000ctrl::Result<()> {
//!       let mut device = Device::new("/dev/ttyUSB0", DEFAULT_BAUDRATE)?;
//!       device.select_gpib_address(7).await?;
//!       println!("{}", device.status().await?);
//!       Ok(())
//!   }
//!   ```
//!
//! - Every `P0` answer carries the reading and the instrument state.
//!   [`status::decode_status`] turns such a line into a [`status::Status`]
//!   without any I/O.
//!
//! # Supported devices
//!
//!  * Prema 6000
//!

use std::time::Duration;

pub mod device;
pub mod measurement;
pub mod proto;
pub mod status;

pub use device::Device;
pub use proto::Result;

#[cfg(unix)]
pub const DEFAULT_TTY: &str = "/dev/ttyUSB0";
#[cfg(windows)]
pub const DEFAULT_TTY: &str = "COM1";

/// Default Baudrate of the serial line.
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Default time to wait for a status answer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);
