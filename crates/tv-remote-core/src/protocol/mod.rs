//! Protocol module containing the TV control-channel message types and codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_event, encode_click, ProtocolError};
pub use messages::*;
