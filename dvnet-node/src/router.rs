use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::time;
use tracing::{debug, info, warn};

use dvnet_wire::{
    packet::{self, Packet, Protocol},
    update::{self, RoutingUpdate},
    Address, Cost,
};

use crate::{Interface, Node, RouterStats, RoutingTable};

/// A per-packet failure inside a router. None of these is fatal to the run
/// loop: each is logged, counted and isolated to the offending packet.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The routing table has no usable entry for the destination.
    #[error("no route to {0}")]
    NoRoute(Address),
    /// A non-blocking send found the outbound queue at capacity.
    #[error("outbound queue full on interface {0}")]
    QueueFull(usize),
    /// A bounded blocking send timed out waiting for outbound capacity.
    #[error("packet lost on interface {0}: timed out waiting for queue capacity")]
    PacketLost(usize),
    /// The message failed to decode as a packet.
    #[error("malformed packet: {0}")]
    MalformedPacket(packet::Error),
    /// A control payload failed to decode as a routing update.
    #[error("malformed routing update: {0}")]
    MalformedUpdate(update::Error),
    /// The packet carries a protocol tag this router does not speak.
    #[error("protocol violation: unknown tag {0:#04x}")]
    ProtocolViolation(u8),
}

/// Options for a [`Router`].
#[derive(Debug, Clone)]
pub struct RouterOptions {
    queue_capacity: usize,
    forward_timeout: Duration,
    idle_wait: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            queue_capacity: 0,
            forward_timeout: Duration::from_millis(250),
            idle_wait: Duration::from_millis(5),
        }
    }
}

impl RouterOptions {
    /// Sets the interface queue capacity (`0` = unbounded).
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the bound on the blocking enqueue when forwarding. Expiry drops
    /// the packet as lost instead of suspending the router forever, which
    /// keeps shutdown live even when a queue never drains.
    pub fn forward_timeout(mut self, forward_timeout: Duration) -> Self {
        self.forward_timeout = forward_timeout;
        self
    }

    /// Sets how long the run loop sleeps after an empty sweep of the
    /// inbound queues before re-checking its stop flag.
    pub fn idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }
}

/// A multi-interface router running the distance-vector protocol.
///
/// Data packets are forwarded out the minimum-cost interface for their
/// destination; control packets carry neighbors' distance vectors and feed
/// the Bellman-Ford relaxation that keeps the [`RoutingTable`] converged.
/// The table is owned by this router and written only from its own loop;
/// observers get snapshots.
#[derive(Debug)]
pub struct Router {
    addr: Address,
    interfaces: Vec<Interface>,
    /// `c(x, neighbor)`: the fixed cost of the directly attached link, per
    /// interface.
    link_costs: Vec<Cost>,
    table: RwLock<RoutingTable>,
    stop: AtomicBool,
    stats: RouterStats,
    options: RouterOptions,
}

impl Router {
    /// Creates a router with one interface per entry of `link_costs`,
    /// seeded with the direct-neighbor reachability in `table`.
    pub fn new(
        addr: Address,
        link_costs: Vec<Cost>,
        table: RoutingTable,
        options: RouterOptions,
    ) -> Self {
        let interfaces =
            (0..link_costs.len()).map(|_| Interface::new(options.queue_capacity)).collect();

        Self {
            addr,
            interfaces,
            link_costs,
            table: RwLock::new(table),
            stop: AtomicBool::new(false),
            stats: RouterStats::default(),
            options,
        }
    }

    /// Returns the statistics for this router.
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Returns a snapshot of the routing table. Diagnostics boundary; the
    /// live table never leaves the router.
    pub fn table(&self) -> RoutingTable {
        self.table.read().clone()
    }

    /// Drains at most one message from each inbound queue, in interface
    /// order. Returns how many messages were processed.
    ///
    /// Every per-packet failure is counted and logged here; none ever
    /// escapes to the run loop.
    pub async fn process_queues(&self) -> usize {
        let mut processed = 0;

        for incoming in 0..self.interfaces.len() {
            let Some(bytes) = self.interfaces[incoming].inbound().try_pop() else {
                continue;
            };
            processed += 1;

            if let Err(err) = self.process_message(&bytes, incoming).await {
                match err {
                    RouterError::NoRoute(_) => self.stats.increment_no_route_drops(),
                    RouterError::QueueFull(_) => self.stats.increment_queue_full_drops(),
                    RouterError::PacketLost(_) => self.stats.increment_timeout_losses(),
                    RouterError::ProtocolViolation(_) => {
                        self.stats.increment_protocol_violations()
                    }
                    RouterError::MalformedPacket(_) | RouterError::MalformedUpdate(_) => {
                        self.stats.increment_malformed_drops()
                    }
                }
                warn!(router = %self.addr, iface = incoming, %err, "dropping packet");
            }
        }

        processed
    }

    async fn process_message(&self, bytes: &[u8], incoming: usize) -> Result<(), RouterError> {
        let packet = Packet::decode(bytes).map_err(|err| match err {
            packet::Error::UnknownProtocol(tag) => RouterError::ProtocolViolation(tag),
            other => RouterError::MalformedPacket(other),
        })?;

        match packet.protocol() {
            Protocol::Data => self.forward(packet, incoming).await,
            Protocol::Control => self.apply_update(&packet, incoming),
        }
    }

    /// Forwards a data packet out the minimum-cost interface for its
    /// destination (ties to the lowest interface index).
    ///
    /// The enqueue blocks until outbound capacity frees up, bounded by
    /// [`RouterOptions::forward_timeout`]; expiry reports the packet lost.
    async fn forward(&self, packet: Packet, incoming: usize) -> Result<(), RouterError> {
        let dest = packet.dest();

        let Some((out_iface, cost)) = self.table.read().best_route(dest) else {
            return Err(RouterError::NoRoute(dest));
        };
        let out_iface = usize::from(out_iface);

        let encoded = packet.encode().map_err(RouterError::MalformedPacket)?;

        debug!(
            router = %self.addr,
            %dest,
            incoming,
            outgoing = out_iface,
            %cost,
            "forwarding data packet"
        );

        match self.interfaces[out_iface]
            .outbound()
            .push(encoded, self.options.forward_timeout)
            .await
        {
            Ok(()) => {
                self.stats.increment_forwarded();
                Ok(())
            }
            Err(_) => Err(RouterError::PacketLost(out_iface)),
        }
    }

    /// Applies a neighbor's distance vector received on `incoming`.
    ///
    /// For every advertised destination `y` with cost `c`, the candidate
    /// cost through that neighbor is `c(x, neighbor) + c`; the table adopts
    /// strictly cheaper candidates. Any change floods this router's own
    /// vector to every neighbor, including the one that triggered the
    /// change. No split horizon: transient count-to-infinity is an accepted
    /// property of the baseline algorithm.
    fn apply_update(&self, packet: &Packet, incoming: usize) -> Result<(), RouterError> {
        let routing_update =
            RoutingUpdate::decode(packet.payload()).map_err(RouterError::MalformedUpdate)?;
        let link_cost = self.link_costs[incoming];

        let mut changed = false;
        {
            let mut table = self.table.write();
            for advert in routing_update.entries() {
                let candidate = link_cost.saturating_add(advert.cost);
                changed |= table.relax(advert.destination, incoming as u8, candidate);
            }
        }

        self.stats.increment_updates_applied();
        debug!(
            router = %self.addr,
            neighbor = %packet.source(),
            iface = incoming,
            routes = routing_update.len(),
            changed,
            "applied routing update"
        );

        if changed {
            self.broadcast_routes();
        }

        Ok(())
    }

    /// Serializes the current vector and enqueues it on interface `iface`.
    ///
    /// Non-blocking: a full outbound queue drops the update with
    /// [`RouterError::QueueFull`]. A dropped update is recovered by the
    /// next change-triggered flood, so this is routine, not fatal.
    pub fn send_routes(&self, iface: usize) -> Result<(), RouterError> {
        let routing_update = RoutingUpdate::new(self.table.read().advertised());
        let payload = routing_update.encode().map_err(RouterError::MalformedUpdate)?;

        let packet = Packet::control(self.addr, payload);
        let encoded = packet.encode().map_err(RouterError::MalformedPacket)?;

        debug!(
            router = %self.addr,
            iface,
            routes = routing_update.len(),
            "sending routing update"
        );

        match self.interfaces[iface].outbound().try_push(encoded) {
            Ok(()) => {
                self.stats.increment_updates_sent();
                Ok(())
            }
            Err(_) => Err(RouterError::QueueFull(iface)),
        }
    }

    /// Floods the current vector on every interface, the "send `Dx` to
    /// all neighbors" step of the textbook algorithm. Per-interface
    /// failures are counted and logged, never fatal.
    pub fn broadcast_routes(&self) {
        for iface in 0..self.interfaces.len() {
            if let Err(err) = self.send_routes(iface) {
                self.stats.increment_queue_full_drops();
                warn!(router = %self.addr, iface, %err, "dropping routing update");
            }
        }
    }
}

#[async_trait]
impl Node for Router {
    fn addr(&self) -> Address {
        self.addr
    }

    fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    async fn run(&self) {
        info!(router = %self.addr, interfaces = self.interfaces.len(), "router up");

        // Initialization step of the protocol: advertise the seed vector
        // to every neighbor before processing any traffic.
        self.broadcast_routes();

        while !self.stop.load(Ordering::Acquire) {
            if self.process_queues().await == 0 {
                time::sleep(self.options.idle_wait).await;
            }
        }

        info!(router = %self.addr, "router stopped");
    }

    fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}
