use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::time;
use tracing::{info, warn};

use dvnet_node::Node;

/// One end of a link: a node and one of its interface indices.
#[derive(Clone)]
pub struct Endpoint {
    node: Arc<dyn Node>,
    iface: usize,
}

impl Endpoint {
    /// Creates an endpoint on `node`'s interface `iface`.
    pub fn new(node: Arc<dyn Node>, iface: usize) -> Self {
        Self { node, iface }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node.addr(), self.iface)
    }
}

/// A directed link between two interface endpoints. A bidirectional wire
/// is two links, one per direction.
#[derive(Debug)]
pub struct Link {
    from: Endpoint,
    to: Endpoint,
}

impl Link {
    /// Creates a directed link carrying traffic from `from` to `to`.
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }

    /// Moves at most one encoded packet across the link. Returns whether a
    /// packet was taken off the source queue.
    ///
    /// Non-blocking on both sides: a full inbound queue at the destination
    /// drops the packet with a warning, never a stall. This is the
    /// simulated equivalent of loss on the wire.
    pub fn transfer(&self) -> bool {
        let Some(message) = self
            .from
            .node
            .interface(self.from.iface)
            .and_then(|iface| iface.outbound().try_pop())
        else {
            return false;
        };

        let Some(to_iface) = self.to.node.interface(self.to.iface) else {
            // Unreachable for links built through `Simulation`, which
            // validates endpoints at registration.
            warn!(link = ?self, "destination interface missing, packet lost");
            return true;
        };

        if to_iface.inbound().try_push(message).is_err() {
            warn!(from = ?self.from, to = ?self.to, "inbound queue full, packet lost on link");
        }

        true
    }
}

/// The component that owns every link and moves bytes between nodes.
///
/// Runs as its own task, sweeping all links until stopped; this is the only
/// path by which bytes cross from one node to another.
#[derive(Debug)]
pub struct LinkLayer {
    links: Vec<Link>,
    stop: AtomicBool,
    idle_wait: Duration,
}

impl LinkLayer {
    /// Creates a link layer over `links`.
    pub fn new(links: Vec<Link>) -> Self {
        Self { links, stop: AtomicBool::new(false), idle_wait: Duration::from_millis(1) }
    }

    /// Sweeps every link once. Returns the number of packets moved.
    pub fn sweep(&self) -> usize {
        self.links.iter().filter(|link| link.transfer()).count()
    }

    /// Sweeps the links until [`stop`](Self::stop) is observed, parking
    /// briefly whenever a full sweep moved nothing.
    pub async fn run(&self) {
        info!(links = self.links.len(), "link layer up");

        while !self.stop.load(Ordering::Acquire) {
            if self.sweep() == 0 {
                time::sleep(self.idle_wait).await;
            }
        }

        info!("link layer stopped");
    }

    /// Requests a cooperative stop.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}
