//! Output device the corrections are written to, typically a GNSS
//! receiver's serial port.

use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::fs::{File, OpenOptions};
use tracing::{info, warn};

pub type DeviceSink = File;

/// Opens `path` for reading and writing, non-blocking on unix. The device
/// is never created.
pub async fn open_device(path: impl AsRef<Path>) -> io::Result<DeviceSink> {
    let mut options = OpenOptions::new();
    options.read(true).write(true);
    #[cfg(unix)]
    options.custom_flags(libc::O_NONBLOCK);

    options.open(path).await
}

/// Keeps trying [`open_device`] every `retry_delay` until it succeeds.
pub async fn open_device_with_retry(path: impl AsRef<Path>, retry_delay: Duration) -> DeviceSink {
    let path = path.as_ref();
    loop {
        match open_device(path).await {
            Ok(device) => {
                info!(device = %path.display(), "output device opened");
                return device;
            }
            Err(e) => {
                warn!(
                    device = %path.display(),
                    error = %e,
                    delay_secs = retry_delay.as_secs_f64(),
                    "cannot open output device, retrying"
                );
                tokio::time::sleep(retry_delay).await;
            }
        }
    }
}
