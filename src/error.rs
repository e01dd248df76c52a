#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Writing the request to the channel failed.
    WriteFailure,
    /// Reading from the channel failed.
    ReadFailure,
    /// The device sent nothing at all in response to a request.
    NoReply,
    /// The reply had the wrong length or a nonzero whole-frame checksum.
    MalformedReply,
    /// A well-formed reply in which the device refused the request.
    DeviceRejected,
    /// The supplied value is outside the set the device accepts; nothing was
    /// sent.
    InvalidValue,
    /// The ASCII payload of a measurement reply could not be decoded.
    InvalidPayload,
    /// The device reported a measurement fault with the given code.
    DeviceFault(u8),
}
