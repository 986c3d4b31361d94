use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::{decode_digits, encode_digits, Address, Cost};

/// The on-wire marker for an unreachable interface or cost.
pub const UNREACHABLE: u8 = b'~';

/// Width of one `(destination, interface, cost)` triplet in bytes.
pub const TRIPLET_LEN: usize = DEST_LEN + VIA_LEN + COST_LEN;

const DEST_LEN: usize = 2;
const VIA_LEN: usize = 1;
const COST_LEN: usize = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The input is not a whole number of triplets.
    #[error("update length {0} is not a multiple of {TRIPLET_LEN}")]
    Ragged(usize),
    /// A triplet field holds a byte that is neither a digit nor the
    /// unreachable marker.
    #[error("invalid byte {byte:#04x} in update {field} field")]
    BadDigit {
        /// Name of the offending triplet field.
        field: &'static str,
        /// The offending byte.
        byte: u8,
    },
    /// A value does not fit its fixed-width wire encoding.
    #[error("{field} {value} does not fit the wire encoding")]
    Overflow {
        /// Name of the offending triplet field.
        field: &'static str,
        /// The value that does not fit.
        value: u16,
    },
}

/// One advertised route: the best cost the advertiser knows to a
/// destination, and the interface that route leaves through.
///
/// `via == None` marks a destination the advertiser cannot currently reach;
/// it encodes as the [`UNREACHABLE`] marker and pairs with an infinite
/// cost. The interface is informational: receivers derive their own out
/// interface from where the update arrived, never from this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteAdvert {
    /// The destination host address.
    pub destination: Address,
    /// The advertiser's outgoing interface for this route.
    pub via: Option<u8>,
    /// The advertiser's best known cost to the destination.
    pub cost: Cost,
}

/// A router's advertised distance vector.
///
/// Carries the advertiser's best cost per destination (the standard
/// distance-vector convention) rather than its full per-interface table.
/// The wire form is a sequence of fixed-width triplets, one per
/// destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingUpdate {
    entries: Vec<RouteAdvert>,
}

impl RoutingUpdate {
    /// Creates an update from a list of adverts.
    pub fn new(entries: Vec<RouteAdvert>) -> Self {
        Self { entries }
    }

    /// Returns the advertised routes.
    pub fn entries(&self) -> &[RouteAdvert] {
        &self.entries
    }

    /// Returns the number of advertised destinations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is advertised.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encodes the update into its wire representation.
    ///
    /// Values outside the representable range fail with [`Error::Overflow`]
    /// rather than truncating.
    pub fn encode(&self) -> Result<Bytes, Error> {
        let mut buf = BytesMut::with_capacity(self.entries.len() * TRIPLET_LEN);

        for entry in &self.entries {
            if !encode_digits(&mut buf, u16::from(entry.destination.get()), DEST_LEN) {
                return Err(Error::Overflow {
                    field: "destination",
                    value: u16::from(entry.destination.get()),
                });
            }

            match entry.via {
                Some(iface) => {
                    if !encode_digits(&mut buf, u16::from(iface), VIA_LEN) {
                        return Err(Error::Overflow {
                            field: "interface",
                            value: u16::from(iface),
                        });
                    }
                }
                None => buf.put_u8(UNREACHABLE),
            }

            if entry.cost.is_infinite() {
                buf.put_u8(UNREACHABLE);
            } else if !encode_digits(&mut buf, entry.cost.get(), COST_LEN) {
                return Err(Error::Overflow { field: "cost", value: entry.cost.get() });
            }
        }

        Ok(buf.freeze())
    }

    /// Decodes an update from its wire representation.
    ///
    /// The input must be a whole number of triplets; the unreachable marker
    /// decodes back to `via: None` / [`Cost::INFINITY`] exactly.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() % TRIPLET_LEN != 0 {
            return Err(Error::Ragged(bytes.len()));
        }

        let mut entries = Vec::with_capacity(bytes.len() / TRIPLET_LEN);

        for triplet in bytes.chunks_exact(TRIPLET_LEN) {
            let destination = decode_digits(&triplet[..DEST_LEN])
                .map_err(|byte| Error::BadDigit { field: "destination", byte })?;

            let via = match triplet[DEST_LEN] {
                UNREACHABLE => None,
                byte => Some(
                    decode_digits(&[byte])
                        .map_err(|byte| Error::BadDigit { field: "interface", byte })?
                        as u8,
                ),
            };

            let cost = match triplet[DEST_LEN + VIA_LEN] {
                UNREACHABLE => Cost::INFINITY,
                byte => Cost::new(
                    decode_digits(&[byte])
                        .map_err(|byte| Error::BadDigit { field: "cost", byte })?,
                ),
            };

            entries.push(RouteAdvert { destination: Address::new(destination as u8), via, cost });
        }

        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_round_trip() {
        let update = RoutingUpdate::new(vec![
            RouteAdvert { destination: Address::new(1), via: Some(1), cost: Cost::new(1) },
            RouteAdvert { destination: Address::new(2), via: Some(0), cost: Cost::new(3) },
        ]);

        let encoded = update.encode().unwrap();
        assert_eq!(&encoded[..], b"01110203");

        assert_eq!(RoutingUpdate::decode(&encoded).unwrap(), update);
    }

    #[test]
    fn unreachable_marker_round_trips_to_infinity() {
        let update = RoutingUpdate::new(vec![RouteAdvert {
            destination: Address::new(5),
            via: None,
            cost: Cost::INFINITY,
        }]);

        let encoded = update.encode().unwrap();
        assert_eq!(&encoded[..], b"05~~");

        let decoded = RoutingUpdate::decode(&encoded).unwrap();
        assert_eq!(decoded.entries()[0].via, None);
        assert_eq!(decoded.entries()[0].cost, Cost::INFINITY);
    }

    #[test]
    fn empty_update_round_trips() {
        let update = RoutingUpdate::default();
        let encoded = update.encode().unwrap();
        assert!(encoded.is_empty());
        assert_eq!(RoutingUpdate::decode(&encoded).unwrap(), update);
    }

    #[test]
    fn decode_rejects_ragged_input() {
        assert_eq!(RoutingUpdate::decode(b"0111"), Ok(RoutingUpdate::new(vec![RouteAdvert {
            destination: Address::new(1),
            via: Some(1),
            cost: Cost::new(1),
        }])));
        assert_eq!(RoutingUpdate::decode(b"01112"), Err(Error::Ragged(5)));
    }

    #[test]
    fn decode_rejects_bad_bytes() {
        assert!(matches!(
            RoutingUpdate::decode(b"0x11"),
            Err(Error::BadDigit { field: "destination", .. })
        ));
        assert!(matches!(
            RoutingUpdate::decode(b"01a1"),
            Err(Error::BadDigit { field: "interface", .. })
        ));
        assert!(matches!(
            RoutingUpdate::decode(b"011b"),
            Err(Error::BadDigit { field: "cost", .. })
        ));
    }

    #[test]
    fn encode_rejects_out_of_range_values() {
        let too_far = RoutingUpdate::new(vec![RouteAdvert {
            destination: Address::new(1),
            via: Some(1),
            cost: Cost::new(10),
        }]);
        assert!(matches!(too_far.encode(), Err(Error::Overflow { field: "cost", .. })));

        let bad_iface = RoutingUpdate::new(vec![RouteAdvert {
            destination: Address::new(1),
            via: Some(10),
            cost: Cost::new(1),
        }]);
        assert!(matches!(bad_iface.encode(), Err(Error::Overflow { field: "interface", .. })));

        let bad_dest = RoutingUpdate::new(vec![RouteAdvert {
            destination: Address::new(100),
            via: Some(1),
            cost: Cost::new(1),
        }]);
        assert!(matches!(bad_dest.encode(), Err(Error::Overflow { field: "destination", .. })));
    }
}
