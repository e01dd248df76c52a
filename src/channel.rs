use core::time::Duration;

use embedded_io_async::Write;

/// An already-open duplex byte stream to the device.
///
/// The crate never opens, configures, or closes the physical serial line;
/// the caller supplies it ready to use (baud rate, parity and line discipline
/// already set) and tears it down after taking it back from
/// [`Ldm::close`](crate::Ldm::close).
///
/// The write side is plain [`embedded_io_async::Write`]. The read side must
/// support a per-call timeout, which the `embedded-io-async` `Read` trait
/// cannot express, so it is a method here:
///
/// * `Ok(n)` with `n > 0`: `n` bytes were received into `buf`.
/// * `Ok(0)`: nothing arrived before the timeout expired, or the stream hit
///   end-of-file. Both mean the device has stopped talking.
/// * `Err(_)`: the underlying transport failed.
///
/// A `timeout` of `None` blocks until at least one byte arrives or the
/// stream ends.
#[allow(async_fn_in_trait)]
pub trait Channel: Write {
    async fn read_with_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Option<Duration>,
    ) -> Result<usize, Self::Error>;
}
