use bytes::Bytes;
use dvnet_common::BoundedQueue;

/// One link endpoint on a node: two independent bounded FIFO queues of
/// encoded packets.
///
/// The owning node pops `inbound` and pushes `outbound`; the link layer
/// holds the opposite rights on each queue. Both queues share one capacity,
/// fixed at construction (`0` = unbounded).
#[derive(Debug)]
pub struct Interface {
    inbound: BoundedQueue<Bytes>,
    outbound: BoundedQueue<Bytes>,
}

impl Interface {
    /// Creates an interface whose queues hold at most `capacity` messages
    /// each.
    pub fn new(capacity: usize) -> Self {
        Self { inbound: BoundedQueue::new(capacity), outbound: BoundedQueue::new(capacity) }
    }

    /// The queue of messages delivered to this node, filled by the link
    /// layer.
    pub fn inbound(&self) -> &BoundedQueue<Bytes> {
        &self.inbound
    }

    /// The queue of messages awaiting transmission, drained by the link
    /// layer.
    pub fn outbound(&self) -> &BoundedQueue<Bytes> {
        &self.outbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queues_are_independent() {
        let interface = Interface::new(1);

        interface.inbound().try_push(Bytes::from_static(b"in")).unwrap();
        interface.outbound().try_push(Bytes::from_static(b"out")).unwrap();

        assert_eq!(interface.inbound().try_pop(), Some(Bytes::from_static(b"in")));
        assert_eq!(interface.outbound().try_pop(), Some(Bytes::from_static(b"out")));
    }
}
