use std::{fmt, sync::Arc};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::debug;

use dvnet_node::Node;
use dvnet_wire::Address;

use crate::{Endpoint, Link, LinkLayer};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// A node with this address is already registered. Addresses are
    /// unique for the life of the simulation.
    #[error("a node with address {0} is already registered")]
    DuplicateAddress(Address),
    /// A link references an address no registered node carries.
    #[error("no node with address {0}")]
    UnknownNode(Address),
    /// A link references an interface index the node does not have.
    #[error("node {addr} has no interface {iface}")]
    InvalidInterface {
        /// The node's address.
        addr: Address,
        /// The out-of-range interface index.
        iface: usize,
    },
}

/// A topology under construction: registered nodes plus the links wiring
/// their interfaces together.
///
/// [`start`](Simulation::start) consumes the topology and spawns one task
/// per node and one for the link layer, handing back a
/// [`SimulationHandle`] for cooperative shutdown.
#[derive(Default)]
pub struct Simulation {
    nodes: FxHashMap<Address, Arc<dyn Node>>,
    links: Vec<Link>,
}

impl Simulation {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node. Fails when its address is already taken.
    pub fn add_node(&mut self, node: Arc<dyn Node>) -> Result<(), SimError> {
        let addr = node.addr();

        if self.nodes.contains_key(&addr) {
            return Err(SimError::DuplicateAddress(addr));
        }

        debug!(%addr, interfaces = node.interfaces().len(), "registered node");
        self.nodes.insert(addr, node);
        Ok(())
    }

    /// Wires a directed link from one registered node's interface to
    /// another's. Endpoints are validated here so transfers never have to.
    pub fn link(&mut self, from: (Address, usize), to: (Address, usize)) -> Result<(), SimError> {
        let from = self.endpoint(from)?;
        let to = self.endpoint(to)?;

        debug!(?from, ?to, "wired link");
        self.links.push(Link::new(from, to));
        Ok(())
    }

    /// Wires a bidirectional connection: one link in each direction.
    pub fn link_duplex(
        &mut self,
        a: (Address, usize),
        b: (Address, usize),
    ) -> Result<(), SimError> {
        self.link(a, b)?;
        self.link(b, a)
    }

    fn endpoint(&self, (addr, iface): (Address, usize)) -> Result<Endpoint, SimError> {
        let node = self.nodes.get(&addr).ok_or(SimError::UnknownNode(addr))?;

        if node.interface(iface).is_none() {
            return Err(SimError::InvalidInterface { addr, iface });
        }

        Ok(Endpoint::new(Arc::clone(node), iface))
    }

    /// Spawns every node's run loop and the link layer, consuming the
    /// topology.
    pub fn start(self) -> SimulationHandle {
        let mut tasks = JoinSet::new();

        for node in self.nodes.values() {
            let node = Arc::clone(node);
            tasks.spawn(async move { node.run().await });
        }

        let link_layer = Arc::new(LinkLayer::new(self.links));
        let layer = Arc::clone(&link_layer);
        tasks.spawn(async move { layer.run().await });

        SimulationHandle { nodes: self.nodes, link_layer, tasks }
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .finish()
    }
}

/// A running simulation: the spawned tasks plus the handles needed to stop
/// them.
pub struct SimulationHandle {
    nodes: FxHashMap<Address, Arc<dyn Node>>,
    link_layer: Arc<LinkLayer>,
    tasks: JoinSet<()>,
}

impl SimulationHandle {
    /// Returns a registered node, for observation while the simulation
    /// runs.
    pub fn node(&self, addr: Address) -> Option<&Arc<dyn Node>> {
        self.nodes.get(&addr)
    }

    /// Requests a cooperative stop on every node and the link layer, then
    /// waits for all tasks to finish. Stop flags are observed within each
    /// loop's bounded park, so this always completes.
    pub async fn shutdown(mut self) {
        for node in self.nodes.values() {
            node.stop();
        }
        self.link_layer.stop();

        while self.tasks.join_next().await.is_some() {}
    }
}

impl fmt::Debug for SimulationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationHandle")
            .field("nodes", &self.nodes.len())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}
