use async_trait::async_trait;
use dvnet_wire::Address;

use crate::Interface;

/// An addressable simulation entity owning interfaces and a run loop.
///
/// [`Host`](crate::Host) and [`Router`](crate::Router) are the two
/// implementations. The simulation harness drives each node as one
/// independent task calling [`run`](Node::run), and the link layer reaches
/// a node's queues through [`interfaces`](Node::interfaces).
#[async_trait]
pub trait Node: Send + Sync + 'static {
    /// The node's address, unique while the node is live.
    fn addr(&self) -> Address;

    /// The node's interfaces. The index is the interface number, stable
    /// for the node's lifetime.
    fn interfaces(&self) -> &[Interface];

    /// Returns the interface at `index`, if any.
    fn interface(&self, index: usize) -> Option<&Interface> {
        self.interfaces().get(index)
    }

    /// Runs the node's loop until [`stop`](Node::stop) is observed.
    ///
    /// Loops poll their queues and park for a bounded interval when idle,
    /// so the stop flag is always observed promptly.
    async fn run(&self);

    /// Requests a cooperative stop. Takes effect within one loop iteration
    /// (bounded by the node's idle wait and any in-flight queue timeout);
    /// nothing is ever killed mid-operation.
    fn stop(&self);
}
