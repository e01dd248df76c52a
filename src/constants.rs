use core::time::Duration;

// QUERY_ADDR is the reserved address used for address-agnostic frames: the
// parameter query and every configuration command are sent to it. Device
// addresses with a 0xF_ top nibble are reserved for this range and can never
// be assigned to a module.
pub const QUERY_ADDR: u8 = 0xFA;

// CONFIG_ID is the command-class byte of a configuration write
// (`FA 04 <type> <value> <checksum>`). A successful reply echoes it at
// offset 1.
pub const CONFIG_ID: u8 = 0x04;

// CONTROL_ID is the command-class byte of query and action frames
// (parameter query, power control, measurement trigger).
pub const CONTROL_ID: u8 = 0x06;

// Opcodes following CONTROL_ID.
pub const OP_PARAMS: u8 = 0x01;
pub const OP_MEASURE: u8 = 0x02;
pub const OP_POWER: u8 = 0x05;

// Parameter type codes following CONFIG_ID.
pub const PARAM_ADDRESS: u8 = 0x01;
pub const PARAM_BASE_POSITION: u8 = 0x08;
pub const PARAM_RANGE: u8 = 0x09;
pub const PARAM_FREQUENCY: u8 = 0x0A;
pub const PARAM_RESOLUTION: u8 = 0x0C;

// PARAMS_QUERY is the one fixed, unchecksummed request in the protocol. The
// trailing 0xFF is a literal marker byte defined by the device documentation,
// not a computed checksum.
pub const PARAMS_QUERY: [u8; 4] = [QUERY_ADDR, CONTROL_ID, OP_PARAMS, 0xFF];

// Reply lengths. The module answers a configuration write with a short echo
// frame on acceptance and a longer frame when it refuses the value.
pub const PARAMS_REPLY_LEN: usize = 7;
pub const CONFIG_ACK_LEN: usize = 4;
pub const CONFIG_NAK_LEN: usize = 5;
pub const POWER_REPLY_LEN: usize = 5;
pub const MEASURE_REPLY_MIN_LEN: usize = 11;

/// Quiet gap that terminates a reply burst.
///
/// At 9600 baud one byte takes just over a millisecond on the wire, so the
/// module falling silent for 10 ms means the reply is complete. Only reads
/// after the first use this; the first read waits indefinitely for the reply
/// burst to start.
pub const INTER_BYTE_TIMEOUT: Duration = Duration::from_millis(10);
