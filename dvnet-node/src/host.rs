use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use dvnet_wire::{
    packet::{self, Packet, Protocol},
    Address,
};

use crate::{HostStats, Interface, Node};

/// Capacity of the channel handing received payloads to the application.
const DEFAULT_DELIVERY_CAPACITY: usize = 1024;

/// Failure to hand a packet to the network. Routine: the caller decides
/// whether to retry, and the host has already logged and counted the drop.
#[derive(Debug, Error)]
pub enum SendError {
    /// The outbound queue was at capacity; the packet was dropped.
    #[error("outbound queue full (capacity {0})")]
    QueueFull(usize),
    /// The packet does not fit the wire encoding.
    #[error(transparent)]
    Encode(#[from] packet::Error),
}

/// Options for a [`Host`].
#[derive(Debug, Clone)]
pub struct HostOptions {
    queue_capacity: usize,
    idle_wait: Duration,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self { queue_capacity: 0, idle_wait: Duration::from_millis(5) }
    }
}

impl HostOptions {
    /// Sets the interface queue capacity (`0` = unbounded).
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets how long the run loop parks on an empty inbound queue before
    /// re-checking its stop flag.
    pub fn idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }
}

/// A payload that reached this host, tagged with the address that sent it.
/// This is the boundary with the application layer above the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Address of the originating node.
    pub source: Address,
    /// The payload, exactly as sent.
    pub payload: Bytes,
}

/// A network host: a node originating and consuming data packets through a
/// single interface.
///
/// Received payloads are handed to the application over the bounded channel
/// returned by [`Host::new`]; an application that stops draining it loses
/// packets (logged and counted) rather than stalling the node.
#[derive(Debug)]
pub struct Host {
    addr: Address,
    interfaces: [Interface; 1],
    stop: AtomicBool,
    deliveries: mpsc::Sender<Delivery>,
    stats: HostStats,
    options: HostOptions,
}

impl Host {
    /// Creates a host and the receiving end of its delivery channel.
    pub fn new(addr: Address, options: HostOptions) -> (Self, mpsc::Receiver<Delivery>) {
        let (deliveries, from_host) = mpsc::channel(DEFAULT_DELIVERY_CAPACITY);

        let host = Self {
            addr,
            interfaces: [Interface::new(options.queue_capacity)],
            stop: AtomicBool::new(false),
            deliveries,
            stats: HostStats::default(),
            options,
        };

        (host, from_host)
    }

    /// Returns the statistics for this host.
    pub fn stats(&self) -> &HostStats {
        &self.stats
    }

    /// Builds a data packet to `dest` and enqueues it for transmission.
    ///
    /// Non-blocking: when the outbound queue is at capacity the packet is
    /// dropped and [`SendError::QueueFull`] returned, never silently
    /// queued past the bound.
    pub fn send(&self, dest: Address, payload: Bytes) -> Result<(), SendError> {
        let packet = Packet::data(self.addr, dest, payload);
        let encoded = packet.encode()?;

        debug!(host = %self.addr, %dest, "sending data packet");

        if let Err(full) = self.interfaces[0].outbound().try_push(encoded) {
            warn!(host = %self.addr, %dest, "outbound queue full, dropping packet");
            self.stats.increment_send_drops();
            return Err(SendError::QueueFull(full.capacity));
        }

        self.stats.increment_sent();
        Ok(())
    }

    /// Drains at most one message from the inbound queue without blocking.
    /// Returns whether a message was processed.
    pub fn receive_tick(&self) -> bool {
        match self.interfaces[0].inbound().try_pop() {
            Some(bytes) => {
                self.process_inbound(&bytes);
                true
            }
            None => false,
        }
    }

    /// Decodes one inbound message and hands it up. Failures are logged,
    /// counted and isolated to the message.
    fn process_inbound(&self, bytes: &[u8]) {
        let packet = match Packet::decode(bytes) {
            Ok(packet) => packet,
            Err(err) => {
                warn!(host = %self.addr, %err, "dropping malformed packet");
                self.stats.increment_recv_drops();
                return;
            }
        };

        if packet.protocol() != Protocol::Data {
            // Routing traffic terminates at routers; a copy reaching a host
            // is harmless noise on a point-to-point link.
            debug!(host = %self.addr, source = %packet.source(), "ignoring control packet");
            return;
        }

        debug!(
            host = %self.addr,
            source = %packet.source(),
            len = packet.payload().len(),
            "received data packet"
        );

        let delivery = Delivery { source: packet.source(), payload: packet.into_payload() };

        if self.deliveries.try_send(delivery).is_err() {
            warn!(host = %self.addr, "application is not draining deliveries, dropping packet");
            self.stats.increment_recv_drops();
        } else {
            self.stats.increment_delivered();
        }
    }
}

#[async_trait]
impl Node for Host {
    fn addr(&self) -> Address {
        self.addr
    }

    fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    async fn run(&self) {
        info!(host = %self.addr, "host up");

        while !self.stop.load(Ordering::Acquire) {
            // Park until traffic arrives, bounded so the stop flag is
            // re-checked promptly.
            if let Some(bytes) = self.interfaces[0].inbound().pop_wait(self.options.idle_wait).await
            {
                self.process_inbound(&bytes);
            }
        }

        info!(host = %self.addr, "host stopped");
    }

    fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_enqueues_the_wire_encoding() {
        let (host, _deliveries) = Host::new(Address::new(1), HostOptions::default());

        host.send(Address::new(2), Bytes::from_static(b"hi")).unwrap();

        assert_eq!(
            host.interfaces()[0].outbound().snapshot(),
            vec![Bytes::from_static(b"1021hi")]
        );
        assert_eq!(host.stats().sent(), 1);
    }

    #[tokio::test]
    async fn send_surfaces_queue_full() {
        let (host, _deliveries) = Host::new(Address::new(1), HostOptions::default().queue_capacity(1));

        host.send(Address::new(2), Bytes::from_static(b"first")).unwrap();
        let err = host.send(Address::new(2), Bytes::from_static(b"second")).unwrap_err();

        assert!(matches!(err, SendError::QueueFull(1)));
        assert_eq!(host.stats().send_drops(), 1);
        assert_eq!(host.interfaces()[0].outbound().len(), 1, "first packet still queued");
    }

    #[tokio::test]
    async fn receive_tick_delivers_data_packets() {
        let (host, mut deliveries) = Host::new(Address::new(2), HostOptions::default());

        let packet = Packet::data(Address::new(1), Address::new(2), Bytes::from_static(b"payload"));
        host.interfaces()[0].inbound().try_push(packet.encode().unwrap()).unwrap();

        assert!(host.receive_tick());
        assert!(!host.receive_tick(), "queue drained");

        let delivery = deliveries.try_recv().unwrap();
        assert_eq!(delivery.source, Address::new(1));
        assert_eq!(delivery.payload, Bytes::from_static(b"payload"));
        assert_eq!(host.stats().delivered(), 1);
    }

    #[tokio::test]
    async fn malformed_inbound_is_isolated() {
        let (host, mut deliveries) = Host::new(Address::new(2), HostOptions::default());

        host.interfaces()[0].inbound().try_push(Bytes::from_static(b"xx")).unwrap();
        let packet = Packet::data(Address::new(1), Address::new(2), Bytes::from_static(b"ok"));
        host.interfaces()[0].inbound().try_push(packet.encode().unwrap()).unwrap();

        assert!(host.receive_tick(), "malformed message still consumes a tick");
        assert!(host.receive_tick());

        assert_eq!(host.stats().recv_drops(), 1);
        assert_eq!(deliveries.try_recv().unwrap().payload, Bytes::from_static(b"ok"));
    }
}
