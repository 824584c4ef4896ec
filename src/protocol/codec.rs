//! Loop-handled framed reads/writes over a `TcpStream`, spec.md §4.1.
//!
//! Partial reads/writes are retried until fully satisfied; an
//! `Interrupted` error is retried; a zero-length read is a closed
//! connection, not an error.

use std::io::{Read, Write};

use crate::config::FRAME_HEADER_LEN;

use super::frame::{Frame, FrameError, RawHeader};

/// Read exactly `buf.len()` bytes, retrying on partial reads and
/// `Interrupted`. Returns [`FrameError::ConnectionClosed`] on EOF.
fn read_exact_loop<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(())
}

/// Write the entire buffer, retrying on partial writes and `Interrupted`.
fn write_all_loop<W: Write>(writer: &mut W, buf: &[u8]) -> Result<(), FrameError> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => written += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(())
}

/// Read one full frame. A bad magic or over-length header is a framing
/// error; the caller is responsible for closing the connection on any
/// `Err` other than a clean [`FrameError::ConnectionClosed`].
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Frame, FrameError> {
    let mut header_buf = [0u8; FRAME_HEADER_LEN];
    read_exact_loop(reader, &mut header_buf)?;
    let header = RawHeader::parse(&header_buf);

    Frame::validate_header(header.magic, header.payload_length)?;

    let mut payload = vec![0u8; header.payload_length as usize];
    read_exact_loop(reader, &mut payload)?;

    Frame::verify_checksum(&payload, header.checksum)?;

    Ok(Frame::new(header.msg_type, header.sequence_num, payload))
}

/// Write one full frame, filling in the checksum.
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<(), FrameError> {
    let bytes = frame.encode()?;
    write_all_loop(writer, &bytes)?;
    writer.flush().map_err(FrameError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_frame_roundtrips_with_write_frame() {
        let frame = Frame::new(0x0040, 7, b"1:2".to_vec());
        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).unwrap();
        assert_eq!(decoded.msg_type, 0x0040);
        assert_eq!(decoded.sequence_num, 7);
        assert_eq!(decoded.payload, b"1:2");
    }

    #[test]
    fn read_frame_on_empty_stream_is_connection_closed() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(matches!(
            read_frame(&mut cursor),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn read_frame_rejects_tampered_checksum() {
        let frame = Frame::new(1, 0, b"payload".to_vec());
        let mut buf = frame.encode().unwrap();
        let last = buf.len() - 1;
        buf[last] ^= 0xFF; // corrupt one payload byte
        let mut cursor = Cursor::new(buf);
        assert!(matches!(
            read_frame(&mut cursor),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }
}
