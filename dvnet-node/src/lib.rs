//! Network nodes for the dvnet simulator.
//!
//! A [`Node`] is an addressable entity owning one or more [`Interface`]s
//! and a run loop: a [`Host`] originates and consumes data packets through
//! a single interface, a [`Router`] moves packets between several
//! interfaces and keeps its [`RoutingTable`] converged with its neighbors
//! through the distance-vector protocol.
//!
//! Nodes never touch each other directly. The only inter-node byte path is
//! the link layer draining one node's outbound queues into another's
//! inbound queues, so every type here is safe to drive from one task per
//! node plus one link-layer task.

mod host;
mod interface;
mod node;
mod router;
mod stats;
mod table;

pub use host::{Delivery, Host, HostOptions, SendError};
pub use interface::Interface;
pub use node::Node;
pub use router::{Router, RouterError, RouterOptions};
pub use stats::{HostStats, RouterStats};
pub use table::RoutingTable;
