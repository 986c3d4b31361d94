use std::collections::BTreeMap;

use dvnet_wire::{update::RouteAdvert, Address, Cost};

/// A router's distance-vector routing table: for every known destination,
/// the cost of reaching it through each interface it has been learned on.
///
/// Iteration is ordered (ascending destination, ascending interface), which
/// keeps forwarding tie-breaks and advert layout deterministic across runs.
/// A destination absent from the table and one whose every entry is
/// infinite are equivalent: neither can carry traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    routes: BTreeMap<Address, BTreeMap<u8, Cost>>,
}

impl RoutingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `cost` for reaching `dest` through `iface`, overwriting any
    /// previous entry. Used to seed direct-neighbor reachability at
    /// construction.
    pub fn insert(&mut self, dest: Address, iface: u8, cost: Cost) {
        self.routes.entry(dest).or_default().insert(iface, cost);
    }

    /// Bellman-Ford relaxation: adopts `cost` for `(dest, iface)` iff
    /// nothing is known there yet or the candidate is strictly smaller.
    /// Returns whether the table changed.
    pub fn relax(&mut self, dest: Address, iface: u8, cost: Cost) -> bool {
        let entry = self.routes.entry(dest).or_default();

        match entry.get(&iface) {
            Some(&current) if current <= cost => false,
            _ => {
                entry.insert(iface, cost);
                true
            }
        }
    }

    /// Returns the forwarding choice for `dest`: the interface with the
    /// strictly minimum cost, ties broken by the lowest interface index.
    ///
    /// `None` when the destination is unknown or every entry is infinite;
    /// a packet is never forwarded at infinite cost.
    pub fn best_route(&self, dest: Address) -> Option<(u8, Cost)> {
        self.routes
            .get(&dest)?
            .iter()
            .filter(|(_, cost)| !cost.is_infinite())
            .min_by_key(|(iface, cost)| (**cost, **iface))
            .map(|(iface, cost)| (*iface, *cost))
    }

    /// Returns the cost recorded for `(dest, iface)`, if any.
    pub fn cost(&self, dest: Address, iface: u8) -> Option<Cost> {
        self.routes.get(&dest)?.get(&iface).copied()
    }

    /// Returns the number of known destinations.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` when no destination is known.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over `(destination, interface, cost)` entries in table
    /// order. Diagnostics boundary; presentation layers render this.
    pub fn entries(&self) -> impl Iterator<Item = (Address, u8, Cost)> + '_ {
        self.routes.iter().flat_map(|(&dest, entries)| {
            entries.iter().map(move |(&iface, &cost)| (dest, iface, cost))
        })
    }

    /// Returns the vector this router advertises: its best cost per known
    /// destination.
    ///
    /// Unreachable destinations carry the marker, and a finite best cost
    /// beyond the wire range is advertised as unreachable too (bounded
    /// infinity) rather than failing the whole update.
    pub fn advertised(&self) -> Vec<RouteAdvert> {
        self.routes
            .keys()
            .map(|&dest| match self.best_route(dest) {
                Some((iface, cost)) if cost <= Cost::MAX_WIRE => {
                    RouteAdvert { destination: dest, via: Some(iface), cost }
                }
                _ => RouteAdvert { destination: dest, via: None, cost: Cost::INFINITY },
            })
            .collect()
    }
}
