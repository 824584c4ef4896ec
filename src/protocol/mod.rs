//! Wire protocol: fixed 16-byte frame header + CRC32'd payload, spec.md §4.1.

pub mod codec;
pub mod frame;
pub mod msg_type;

pub use frame::{Frame, FrameError};
pub use msg_type::MsgType;
