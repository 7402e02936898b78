//! Protocol module containing the wire packet layout, the codec, and the
//! encoder that pushes packets into a byte sink.

pub mod codec;
pub mod encoder;
pub mod packet;

pub use codec::{decode_packet, encode_event, PacketStreamDecoder, ProtocolError};
pub use encoder::{encode_and_send, ByteSink, IoSink, SinkError};
pub use packet::{PacketKind, WirePacket, PACKET_SIZE};
