//! Frame header encode/decode and the CRC32 used to checksum payloads.
//!
//! Header layout (16 bytes, all integers little-endian):
//! `magic:u16 | msg_type:u16 | payload_length:u32 | sequence_num:u32 | checksum:u32`

use crate::config::{FRAME_HEADER_LEN, FRAME_MAGIC, MAX_PAYLOAD_LEN};

/// CRC32, reflected polynomial 0xEDB88320, init 0xFFFFFFFF, final xor
/// 0xFFFFFFFF — the classic CRC-32/ISO-HDLC variant `crc32fast` implements.
pub fn crc32(payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("bad magic: {0:#06x}")]
    BadMagic(u16),
    #[error("payload length {0} exceeds max {MAX_PAYLOAD_LEN}")]
    PayloadTooLarge(u32),
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("connection closed")]
    ConnectionClosed,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully decoded frame: header fields plus the payload bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    pub msg_type: u16,
    pub sequence_num: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(msg_type: u16, sequence_num: u32, payload: Vec<u8>) -> Self {
        Self {
            msg_type,
            sequence_num,
            payload,
        }
    }

    /// Encode this frame to its full wire representation (header + payload),
    /// computing the checksum over the payload.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        if self.payload.len() as u32 > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLarge(self.payload.len() as u32));
        }
        let checksum = crc32(&self.payload);
        let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&FRAME_MAGIC.to_le_bytes());
        buf.extend_from_slice(&self.msg_type.to_le_bytes());
        buf.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.sequence_num.to_le_bytes());
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }

    /// Validate a parsed header (magic + length bound). Does not check the
    /// payload checksum — callers validate that once the payload bytes are
    /// in hand, via [`verify_checksum`].
    pub fn validate_header(
        magic: u16,
        payload_length: u32,
    ) -> Result<(), FrameError> {
        if magic != FRAME_MAGIC {
            return Err(FrameError::BadMagic(magic));
        }
        if payload_length > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLarge(payload_length));
        }
        Ok(())
    }

    pub fn verify_checksum(payload: &[u8], expected: u32) -> Result<(), FrameError> {
        let actual = crc32(payload);
        if actual != expected {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RawHeader {
    pub magic: u16,
    pub msg_type: u16,
    pub payload_length: u32,
    pub sequence_num: u32,
    pub checksum: u32,
}

impl RawHeader {
    pub fn parse(buf: &[u8; FRAME_HEADER_LEN]) -> Self {
        Self {
            magic: u16::from_le_bytes([buf[0], buf[1]]),
            msg_type: u16::from_le_bytes([buf[2], buf[3]]),
            payload_length: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            sequence_num: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            checksum: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_known_vector() {
        // "123456789" is the standard CRC-32/ISO-HDLC check value 0xCBF43926.
        assert_eq!(crc32(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn encode_then_parse_header_roundtrips() {
        let frame = Frame::new(0x0001, 42, b"alice:hunter2".to_vec());
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes.len(), FRAME_HEADER_LEN + frame.payload.len());

        let mut header_buf = [0u8; FRAME_HEADER_LEN];
        header_buf.copy_from_slice(&bytes[..FRAME_HEADER_LEN]);
        let header = RawHeader::parse(&header_buf);

        assert_eq!(header.magic, FRAME_MAGIC);
        assert_eq!(header.msg_type, 0x0001);
        assert_eq!(header.payload_length, frame.payload.len() as u32);
        assert_eq!(header.sequence_num, 42);

        let payload = &bytes[FRAME_HEADER_LEN..];
        Frame::verify_checksum(payload, header.checksum).unwrap();
    }

    #[test]
    fn oversize_payload_is_rejected_on_encode() {
        let frame = Frame::new(1, 0, vec![0u8; MAX_PAYLOAD_LEN as usize + 1]);
        assert!(matches!(frame.encode(), Err(FrameError::PayloadTooLarge(_))));
    }

    #[test]
    fn validate_header_rejects_bad_magic() {
        assert!(matches!(
            Frame::validate_header(0x1234, 10),
            Err(FrameError::BadMagic(0x1234))
        ));
    }
}
