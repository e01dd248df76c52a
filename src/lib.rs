#![cfg_attr(not(test), no_std)]

use log::{debug, error, warn};

mod channel;
pub use channel::*;

mod config;
pub use config::*;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod frame;
mod transport;

#[cfg(test)]
mod mock;

use frame::Frame;

/// Represents a serial laser distance module.
///
/// A session owns its channel exclusively for its whole lifetime and tracks
/// the two pieces of device state the protocol depends on: the address the
/// module answers on and whether it is awake. All operations are sequential;
/// `&mut self` receivers keep a second command from ever being in flight on
/// the same channel.
///
/// # Type Parameters
///
/// * `C`: The channel used to communicate with the module. See [`Channel`].
pub struct Ldm<C> {
    channel: C,
    address: u8,
    awake: bool,
}

/// Operating parameters reported by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceParams {
    /// The address the module answers on.
    pub address: u8,
    /// Ambient light level at the receiver.
    pub light_level: u8,
    /// Internal temperature.
    pub temperature: u8,
}

impl<C> Ldm<C>
where
    C: Channel,
{
    /// Opens a session on an already-configured channel.
    ///
    /// Queries the module's parameters on the reserved query address to learn
    /// its real address, then puts it to sleep until a caller wants readings.
    ///
    /// # Errors
    ///
    /// Any transport or protocol failure during the open sequence is returned
    /// and the channel is dropped with the half-built session.
    pub async fn open(mut channel: C) -> Result<Self, Error> {
        let params = query_params(&mut channel).await?;
        debug!(
            "module at {:02X}, light {}, temperature {}",
            params.address, params.light_level, params.temperature
        );
        let mut device = Ldm {
            channel,
            address: params.address,
            awake: true,
        };
        device.set_power(false).await?;
        Ok(device)
    }

    /// Ends the session and hands the channel back for teardown.
    ///
    /// If the module is awake it is put to sleep first, best effort: a
    /// failure is logged and the channel is returned regardless.
    pub async fn close(mut self) -> C {
        if self.awake {
            if let Err(e) = self.set_power(false).await {
                warn!("sleep on close failed: {:?}", e);
            }
        }
        self.channel
    }

    /// The address the session currently uses to talk to the module.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether the module was awake after the last successful power command.
    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Queries the module's address, light level and temperature.
    ///
    /// The query goes out on the reserved address `0xFA`, so it reaches the
    /// module regardless of what it is configured to answer on.
    pub async fn get_params(&mut self) -> Result<DeviceParams, Error> {
        query_params(&mut self.channel).await
    }

    /// Assigns the module a new address.
    ///
    /// Addresses with a `0xF` top nibble are reserved for query frames and
    /// are rejected locally without touching the wire. On success the session
    /// switches to the new address for all subsequent commands.
    pub async fn set_address(&mut self, address: u8) -> Result<(), Error> {
        if address & 0xF0 == 0xF0 {
            error!("address {:02X} is in the reserved range", address);
            return Err(Error::InvalidValue);
        }
        self.config(PARAM_ADDRESS, address).await?;
        self.address = address;
        Ok(())
    }

    /// Selects which edge of the housing distances are measured from.
    pub async fn set_base_position(&mut self, position: BasePosition) -> Result<(), Error> {
        self.config(PARAM_BASE_POSITION, position as u8).await
    }

    /// Sets the measuring range in meters.
    ///
    /// The hardware supports 5, 10, 30, 50 and 80 m; anything else is
    /// rejected locally without touching the wire.
    pub async fn set_range(&mut self, meters: u8) -> Result<(), Error> {
        if !RANGES.contains(&meters) {
            error!("unsupported range {} m", meters);
            return Err(Error::InvalidValue);
        }
        self.config(PARAM_RANGE, meters).await
    }

    /// Sets the measuring frequency in hertz.
    ///
    /// The hardware supports 5, 10 and 20 Hz; anything else is rejected
    /// locally without touching the wire.
    pub async fn set_frequency(&mut self, hz: u8) -> Result<(), Error> {
        if !FREQUENCIES.contains(&hz) {
            error!("unsupported frequency {} Hz", hz);
            return Err(Error::InvalidValue);
        }
        self.config(PARAM_FREQUENCY, hz).await
    }

    /// Sets the resolution measurements are reported with.
    pub async fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error> {
        self.config(PARAM_RESOLUTION, resolution as u8).await
    }

    /// Puts the module into low-power sleep.
    pub async fn sleep(&mut self) -> Result<(), Error> {
        self.set_power(false).await
    }

    /// Wakes the module so it can measure.
    pub async fn wakeup(&mut self) -> Result<(), Error> {
        self.set_power(true).await
    }

    /// Takes a single distance reading.
    ///
    /// The module must be awake. The reply embeds the reading as ASCII text;
    /// a successful decode yields the distance in meters (the sign comes from
    /// the text itself), while a device-side measurement failure surfaces as
    /// [`Error::DeviceFault`] with the module's own error code.
    pub async fn measure_once(&mut self) -> Result<f32, Error> {
        let mut request = Frame::new();
        request.push(self.address);
        request.push(CONTROL_ID);
        request.push(OP_MEASURE);
        request.push_checksum();

        let reply = transport::exchange(&mut self.channel, &request).await?;
        if reply.len() < MEASURE_REPLY_MIN_LEN || !reply.checksum_ok() {
            error!("measure: bad reply {:02X?}", reply.as_bytes());
            return Err(Error::MalformedReply);
        }
        let bytes = reply.as_bytes();
        // The payload sits between the 3-byte header and the trailing
        // checksum byte.
        decode_measurement(&bytes[3..bytes.len() - 1])
    }

    // Writes one configuration parameter. The module echoes a short frame on
    // acceptance and answers with a longer frame when it refuses the value.
    async fn config(&mut self, parameter: u8, value: u8) -> Result<(), Error> {
        let mut request = Frame::new();
        request.push(QUERY_ADDR);
        request.push(CONFIG_ID);
        request.push(parameter);
        request.push(value);
        request.push_checksum();

        let reply = transport::exchange(&mut self.channel, &request).await?;
        if !reply.checksum_ok() {
            error!(
                "config {:02X}: bad reply {:02X?}",
                parameter,
                reply.as_bytes()
            );
            return Err(Error::MalformedReply);
        }
        match reply.len() {
            CONFIG_ACK_LEN if reply.as_bytes()[1] == CONFIG_ID => Ok(()),
            CONFIG_NAK_LEN => Err(Error::DeviceRejected),
            _ => {
                error!(
                    "config {:02X}: unexpected reply {:02X?}",
                    parameter,
                    reply.as_bytes()
                );
                Err(Error::MalformedReply)
            }
        }
    }

    // Sleep and wakeup share one command; only the flag byte differs.
    async fn set_power(&mut self, awake: bool) -> Result<(), Error> {
        let mut request = Frame::new();
        request.push(self.address);
        request.push(CONTROL_ID);
        request.push(OP_POWER);
        request.push(awake as u8);
        request.push_checksum();

        let reply = transport::exchange(&mut self.channel, &request).await?;
        if reply.len() != POWER_REPLY_LEN || !reply.checksum_ok() {
            error!("power: bad reply {:02X?}", reply.as_bytes());
            return Err(Error::MalformedReply);
        }
        if reply.as_bytes()[3] != 0x01 {
            return Err(Error::DeviceRejected);
        }
        self.awake = awake;
        Ok(())
    }
}

// Sends the fixed parameter query and decodes the 7-byte reply. Free of the
// session type so the open sequence can run before one exists.
async fn query_params<C: Channel>(channel: &mut C) -> Result<DeviceParams, Error> {
    let request = Frame::from_bytes(&PARAMS_QUERY);
    let reply = transport::exchange(channel, &request).await?;
    if reply.len() != PARAMS_REPLY_LEN || !reply.checksum_ok() {
        error!("params query: bad reply {:02X?}", reply.as_bytes());
        return Err(Error::MalformedReply);
    }
    let bytes = reply.as_bytes();
    Ok(DeviceParams {
        address: bytes[3],
        light_level: bytes[4],
        temperature: bytes[5],
    })
}

// Decodes the ASCII payload of a measurement reply: either a decimal
// distance in meters, or "ERR--xx" / "ERR---xx" where the last two
// characters carry the module's fault code.
fn decode_measurement(payload: &[u8]) -> Result<f32, Error> {
    let text = core::str::from_utf8(payload).map_err(|_| Error::InvalidPayload)?;
    if payload.first() == Some(&b'E') {
        let code = text
            .len()
            .checked_sub(2)
            .and_then(|at| text.get(at..))
            .and_then(|digits| digits.parse::<u8>().ok())
            .ok_or(Error::InvalidPayload)?;
        return Err(Error::DeviceFault(code));
    }
    // The module pads short readings with leading spaces.
    text.trim().parse::<f32>().map_err(|_| Error::InvalidPayload)
}
