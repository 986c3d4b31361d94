//! A small packet-switched network simulator with distance-vector routing.
//!
//! Hosts and routers exchange data and routing-control traffic over
//! point-to-point links; routers discover paths with a distributed
//! Bellman-Ford protocol. See [`dvnet_node`] for the nodes and the routing
//! engine, [`dvnet_wire`] for the wire formats and [`dvnet_sim`] for the
//! link layer and simulation harness.

pub use dvnet_common::{BoundedQueue, PushTimeout, QueueFull};
pub use dvnet_node::*;
pub use dvnet_sim::{Endpoint, Link, LinkLayer, SimError, Simulation, SimulationHandle};
pub use dvnet_wire as wire;
pub use dvnet_wire::{Address, Cost};
