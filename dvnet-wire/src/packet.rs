use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::{decode_digits, encode_digits, Address};

/// Width of the source address field in bytes.
pub const SOURCE_LEN: usize = 1;
/// Width of the zero-padded destination address field in bytes.
pub const DEST_LEN: usize = 2;
/// Width of the protocol tag field in bytes.
pub const PROTOCOL_LEN: usize = 1;
/// Total header width. Decoders skip exactly this many bytes to reach the
/// payload; the header is never scanned.
pub const HEADER_LEN: usize = SOURCE_LEN + DEST_LEN + PROTOCOL_LEN;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The input ends before the fixed-width header does.
    #[error("message too short for a packet header: {0} < {HEADER_LEN} bytes")]
    Truncated(usize),
    /// An address field holds a non-decimal byte.
    #[error("invalid byte {byte:#04x} in packet {field} field")]
    BadDigit {
        /// Name of the offending header field.
        field: &'static str,
        /// The byte that is not a decimal digit.
        byte: u8,
    },
    /// The protocol tag is none of the known values.
    #[error("unknown protocol tag {0:#04x}")]
    UnknownProtocol(u8),
    /// A field value does not fit its fixed-width wire encoding.
    #[error("{field} {value} does not fit {width} wire digit(s)")]
    Overflow {
        /// Name of the offending header field.
        field: &'static str,
        /// The value that does not fit.
        value: u16,
        /// The field width in digits.
        width: usize,
    },
}

/// The upper-layer protocol a packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Opaque application payload, wire tag `1`.
    Data,
    /// An encoded routing update, wire tag `2`.
    Control,
}

impl Protocol {
    /// Returns the wire tag byte for this protocol.
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Data => b'1',
            Self::Control => b'2',
        }
    }

    /// Parses a wire tag byte.
    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            b'1' => Ok(Self::Data),
            b'2' => Ok(Self::Control),
            other => Err(Error::UnknownProtocol(other)),
        }
    }
}

/// A network-layer packet: an immutable `(source, destination, protocol,
/// payload)` value.
///
/// The payload is opaque at this layer. For [`Protocol::Control`] packets it
/// is an encoded [`RoutingUpdate`](crate::update::RoutingUpdate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    source: Address,
    dest: Address,
    protocol: Protocol,
    payload: Bytes,
}

impl Packet {
    /// Creates a data packet.
    pub fn data(source: Address, dest: Address, payload: Bytes) -> Self {
        Self { source, dest, protocol: Protocol::Data, payload }
    }

    /// Creates a control packet carrying an encoded routing update.
    ///
    /// Control packets are consumed by the next router, so the destination
    /// field carries the reserved [`Address::CONTROL`].
    pub fn control(source: Address, payload: Bytes) -> Self {
        Self { source, dest: Address::CONTROL, protocol: Protocol::Control, payload }
    }

    /// Returns the address of the node that originated this packet.
    pub fn source(&self) -> Address {
        self.source
    }

    /// Returns the destination host address.
    pub fn dest(&self) -> Address {
        self.dest
    }

    /// Returns the protocol carried by this packet.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns a reference to the payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consumes the packet, returning its payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Encodes the packet into its wire representation.
    ///
    /// Fails with [`Error::Overflow`] when an address does not fit its
    /// fixed-width field; nothing is ever truncated.
    pub fn encode(&self) -> Result<Bytes, Error> {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());

        if !encode_digits(&mut buf, u16::from(self.source.get()), SOURCE_LEN) {
            return Err(Error::Overflow {
                field: "source address",
                value: u16::from(self.source.get()),
                width: SOURCE_LEN,
            });
        }
        if !encode_digits(&mut buf, u16::from(self.dest.get()), DEST_LEN) {
            return Err(Error::Overflow {
                field: "destination address",
                value: u16::from(self.dest.get()),
                width: DEST_LEN,
            });
        }
        buf.put_u8(self.protocol.tag());
        buf.extend_from_slice(&self.payload);

        Ok(buf.freeze())
    }

    /// Decodes a packet from its wire representation.
    ///
    /// The header is read positionally: exactly [`HEADER_LEN`] bytes,
    /// everything after is payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::Truncated(bytes.len()));
        }

        let source = decode_digits(&bytes[..SOURCE_LEN])
            .map_err(|byte| Error::BadDigit { field: "source address", byte })?;
        let dest = decode_digits(&bytes[SOURCE_LEN..SOURCE_LEN + DEST_LEN])
            .map_err(|byte| Error::BadDigit { field: "destination address", byte })?;
        let protocol = Protocol::from_tag(bytes[SOURCE_LEN + DEST_LEN])?;
        let payload = Bytes::copy_from_slice(&bytes[HEADER_LEN..]);

        Ok(Self {
            source: Address::new(source as u8),
            dest: Address::new(dest as u8),
            protocol,
            payload,
        })
    }
}
