use log::debug;

use crate::channel::Channel;
use crate::constants::INTER_BYTE_TIMEOUT;
use crate::error::Error;
use crate::frame::{Frame, FRAME_CAPACITY};

// One request/response exchange: put the request on the wire, then assemble
// whatever the device sends back into a single reply frame.
pub(crate) async fn exchange<C: Channel>(channel: &mut C, request: &Frame) -> Result<Frame, Error> {
    write_frame(channel, request).await?;
    read_frame(channel).await
}

// Writes every byte of the frame. A command that expects no reply is this
// half on its own.
pub(crate) async fn write_frame<C: Channel>(channel: &mut C, frame: &Frame) -> Result<(), Error> {
    debug!("W {:02X?}", frame.as_bytes());
    channel
        .write_all(frame.as_bytes())
        .await
        .map_err(|_| Error::WriteFailure)?;
    channel.flush().await.map_err(|_| Error::WriteFailure)
}

// Assembles one reply frame from a stream with unpredictable chunking. The
// device terminates each logical reply as a burst followed by a quiet gap, so
// reply length never has to be known up front: the first read waits for the
// burst to start with no deadline, every later read only waits out the
// inter-byte gap, and a zero-byte result (gap or EOF) ends the frame.
pub(crate) async fn read_frame<C: Channel>(channel: &mut C) -> Result<Frame, Error> {
    let mut buf = [0u8; FRAME_CAPACITY];
    let mut filled = 0;
    let mut timeout = None;

    while filled < buf.len() {
        let n = channel
            .read_with_timeout(&mut buf[filled..], timeout)
            .await
            .map_err(|_| Error::ReadFailure)?;
        if n == 0 {
            break;
        }
        filled += n;
        timeout = Some(INTER_BYTE_TIMEOUT);
    }

    if filled == 0 {
        return Err(Error::NoReply);
    }
    let reply = Frame::from_bytes(&buf[..filled]);
    debug!("R {:02X?}", reply.as_bytes());
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::mock::{MockChannel, Step};

    // An 11-byte measurement reply split across two reads must come back as
    // one frame, not a truncated one.
    #[test]
    fn assembles_fragmented_reply() {
        static REPLY: [u8; 11] = [
            0x80, 0x06, 0x82, b'1', b'2', b'3', b'.', b'4', b'5', b'6', 0x95,
        ];
        let mut channel = MockChannel::new([
            Step::Chunk(&REPLY[..1]),
            Step::Chunk(&REPLY[1..]),
            Step::Quiet,
        ]);

        let request = Frame::from_bytes(&[0x80, 0x06, 0x02, 0x78]);
        let frame = block_on(exchange(&mut channel, &request)).unwrap();
        assert_eq!(frame.as_bytes(), REPLY);
        assert_eq!(channel.written, request.as_bytes());
    }

    #[test]
    fn quiet_gap_ends_frame_after_first_chunk() {
        let mut channel = MockChannel::new([
            Step::Chunk(&[0xFA, 0x04, 0x01, 0x01]),
            Step::Quiet,
            Step::Chunk(&[0xDE, 0xAD]),
        ]);
        let frame = block_on(read_frame(&mut channel)).unwrap();
        assert_eq!(frame.as_bytes(), [0xFA, 0x04, 0x01, 0x01]);
        // The later bytes belong to the next exchange.
        assert_eq!(channel.steps.len(), 1);
    }

    #[test]
    fn silent_device_is_no_reply() {
        let mut channel = MockChannel::new([Step::Quiet]);
        assert_eq!(block_on(read_frame(&mut channel)), Err(Error::NoReply));
    }

    #[test]
    fn read_error_is_reported() {
        let mut channel = MockChannel::new([Step::Fail]);
        assert_eq!(block_on(read_frame(&mut channel)), Err(Error::ReadFailure));
    }

    #[test]
    fn write_error_is_reported() {
        let mut channel = MockChannel::new([]);
        channel.fail_writes = true;
        let request = Frame::from_bytes(&[0xFA, 0x06, 0x01, 0xFF]);
        assert_eq!(
            block_on(exchange(&mut channel, &request)),
            Err(Error::WriteFailure)
        );
    }

    #[test]
    fn first_read_blocks_then_short_timeouts() {
        let mut channel = MockChannel::new([
            Step::Chunk(&[0xAA]),
            Step::Chunk(&[0xBB]),
            Step::Quiet,
        ]);
        block_on(read_frame(&mut channel)).unwrap();
        assert_eq!(
            channel.timeouts,
            [None, Some(INTER_BYTE_TIMEOUT), Some(INTER_BYTE_TIMEOUT)]
        );
    }

    #[test]
    fn full_buffer_ends_accumulation() {
        static BIG: [u8; FRAME_CAPACITY] = [0x55; FRAME_CAPACITY];
        let mut channel = MockChannel::new([Step::Chunk(&BIG), Step::Chunk(&[0x66])]);
        let frame = block_on(read_frame(&mut channel)).unwrap();
        assert_eq!(frame.len(), FRAME_CAPACITY);
        // The extra chunk was never consumed.
        assert_eq!(channel.steps.len(), 1);
    }
}
