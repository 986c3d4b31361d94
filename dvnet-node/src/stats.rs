use std::sync::atomic::{AtomicUsize, Ordering};

/// Statistics for a host. Shared between the host's run loop and
/// observers; plain counters, no locks.
#[derive(Debug, Default)]
pub struct HostStats {
    /// Data packets handed to the network.
    sent: AtomicUsize,
    /// Data packets delivered up to the application.
    delivered: AtomicUsize,
    /// Packets dropped because the outbound queue was at capacity.
    send_drops: AtomicUsize,
    /// Inbound messages dropped: malformed, or the application lagged.
    recv_drops: AtomicUsize,
}

impl HostStats {
    #[inline]
    pub(crate) fn increment_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_send_drops(&self) {
        self.send_drops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_recv_drops(&self) {
        self.recv_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Data packets handed to the network.
    #[inline]
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    /// Data packets delivered up to the application.
    #[inline]
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Packets dropped on a full outbound queue.
    #[inline]
    pub fn send_drops(&self) -> usize {
        self.send_drops.load(Ordering::Relaxed)
    }

    /// Inbound messages dropped before delivery.
    #[inline]
    pub fn recv_drops(&self) -> usize {
        self.recv_drops.load(Ordering::Relaxed)
    }
}

/// Statistics for a router. Every per-packet failure lands in exactly one
/// counter, so dropped traffic is observable without scraping logs.
#[derive(Debug, Default)]
pub struct RouterStats {
    /// Data packets re-encoded and queued out.
    forwarded: AtomicUsize,
    /// Data packets dropped for lack of a usable route.
    no_route_drops: AtomicUsize,
    /// Messages dropped on a full queue by a non-blocking send.
    queue_full_drops: AtomicUsize,
    /// Data packets lost waiting for outbound capacity.
    timeout_losses: AtomicUsize,
    /// Messages dropped because they failed to decode.
    malformed_drops: AtomicUsize,
    /// Messages dropped for an unknown protocol tag.
    protocol_violations: AtomicUsize,
    /// Routing updates applied from neighbors.
    updates_applied: AtomicUsize,
    /// Routing updates queued out to neighbors.
    updates_sent: AtomicUsize,
}

impl RouterStats {
    #[inline]
    pub(crate) fn increment_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_no_route_drops(&self) {
        self.no_route_drops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_queue_full_drops(&self) {
        self.queue_full_drops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_timeout_losses(&self) {
        self.timeout_losses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_malformed_drops(&self) {
        self.malformed_drops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_protocol_violations(&self) {
        self.protocol_violations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_updates_applied(&self) {
        self.updates_applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_updates_sent(&self) {
        self.updates_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Data packets re-encoded and queued out.
    #[inline]
    pub fn forwarded(&self) -> usize {
        self.forwarded.load(Ordering::Relaxed)
    }

    /// Data packets dropped for lack of a usable route.
    #[inline]
    pub fn no_route_drops(&self) -> usize {
        self.no_route_drops.load(Ordering::Relaxed)
    }

    /// Messages dropped on a full queue by a non-blocking send.
    #[inline]
    pub fn queue_full_drops(&self) -> usize {
        self.queue_full_drops.load(Ordering::Relaxed)
    }

    /// Data packets lost waiting for outbound capacity.
    #[inline]
    pub fn timeout_losses(&self) -> usize {
        self.timeout_losses.load(Ordering::Relaxed)
    }

    /// Messages dropped because they failed to decode.
    #[inline]
    pub fn malformed_drops(&self) -> usize {
        self.malformed_drops.load(Ordering::Relaxed)
    }

    /// Messages dropped for an unknown protocol tag.
    #[inline]
    pub fn protocol_violations(&self) -> usize {
        self.protocol_violations.load(Ordering::Relaxed)
    }

    /// Routing updates applied from neighbors.
    #[inline]
    pub fn updates_applied(&self) -> usize {
        self.updates_applied.load(Ordering::Relaxed)
    }

    /// Routing updates queued out to neighbors.
    #[inline]
    pub fn updates_sent(&self) -> usize {
        self.updates_sent.load(Ordering::Relaxed)
    }
}
