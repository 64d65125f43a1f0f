use std::io;
use std::thread;
use std::time::Duration;

use thiserror::Error;

#[cfg(test)]
pub mod tests;
#[cfg(test)]
pub use tests::*;

pub mod serial_port;
pub use serial_port::*;

pub type ComResult<T> = Result<T, ComError>;

/// Transport failures, split by what the caller may do about them.
///
/// `Busy` is the one transient condition: the receiving end is not draining
/// its buffer and the same bytes can be offered again after a pause. Every
/// other failure ends the session.
#[derive(Debug, Error)]
pub enum ComError {
    #[error("transport busy")]
    Busy,
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

/// A byte channel to the cartridge.
///
/// `send` performs at most one underlying write and reports how many bytes
/// the transport accepted; partial writes are normal. `read_data` performs
/// one blocking read bounded by the transport's deadline and returns `None`
/// when the deadline elapses; a returned buffer is never empty.
pub trait Com {
    fn get_name(&self) -> &'static str;

    fn send(&mut self, buf: &[u8]) -> ComResult<usize>;
    fn read_data(&mut self) -> ComResult<Option<Vec<u8>>>;
}

/// Delay after each accepted chunk. The cart drains its input buffer slowly
/// and reports busy when the stream gets ahead of it.
const SEND_PACE: Duration = Duration::from_millis(1);

/// Delay before re-offering bytes the transport reported `Busy` for.
const BUSY_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Writes all of `buf`, absorbing short writes and transient backpressure.
///
/// `Busy` is retried without limit; a caller that needs a bound has to
/// impose an outer timeout. Any other error aborts immediately, leaving the
/// tail of the buffer unsent.
pub fn send_all(com: &mut dyn Com, buf: &[u8]) -> ComResult<()> {
    let mut sent = 0;
    while sent < buf.len() {
        match com.send(&buf[sent..]) {
            Ok(n) => {
                sent += n;
                thread::sleep(SEND_PACE);
            }
            Err(ComError::Busy) => {
                log::debug!("{} busy after {sent} bytes, retrying", com.get_name());
                thread::sleep(BUSY_RETRY_DELAY);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
