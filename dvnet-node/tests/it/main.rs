//! Integration tests driving whole simulations end to end.

mod convergence;
mod forwarding;

mod helpers {
    use std::sync::Arc;

    use dvnet_node::{Delivery, Host, HostOptions, Node, Router, RouterOptions, RoutingTable};
    use dvnet_sim::Simulation;
    use dvnet_wire::{Address, Cost};
    use tokio::sync::mpsc;

    pub const HOST_1: Address = Address::new(1);
    pub const HOST_2: Address = Address::new(2);
    pub const ROUTER_A: Address = Address::new(3);
    pub const ROUTER_B: Address = Address::new(4);

    /// Everything the tests need to drive the two-router chain.
    pub struct Chain {
        pub sim: Simulation,
        pub host_1: Arc<Host>,
        pub deliveries_2: mpsc::Receiver<Delivery>,
        pub router_a: Arc<Router>,
        pub router_b: Arc<Router>,
    }

    /// Builds the classic chain with symmetric unit link costs:
    ///
    /// `host 1 -- (1) A (0) -- (1) B (0) -- host 2`
    ///
    /// Each router is seeded only with its directly attached host; the far
    /// host must be learned over the routing exchange.
    pub fn two_router_chain() -> Chain {
        let (host_1, _deliveries_1) = Host::new(HOST_1, HostOptions::default());
        let (host_2, deliveries_2) = Host::new(HOST_2, HostOptions::default());

        let mut table_a = RoutingTable::new();
        table_a.insert(HOST_1, 1, Cost::new(1));
        let router_a = Arc::new(Router::new(
            ROUTER_A,
            vec![Cost::new(1), Cost::new(1)],
            table_a,
            RouterOptions::default(),
        ));

        let mut table_b = RoutingTable::new();
        table_b.insert(HOST_2, 0, Cost::new(1));
        let router_b = Arc::new(Router::new(
            ROUTER_B,
            vec![Cost::new(1), Cost::new(1)],
            table_b,
            RouterOptions::default(),
        ));

        let host_1 = Arc::new(host_1);

        let mut sim = Simulation::new();
        sim.add_node(host_1.clone() as Arc<dyn Node>).unwrap();
        sim.add_node(Arc::new(host_2)).unwrap();
        sim.add_node(router_a.clone()).unwrap();
        sim.add_node(router_b.clone()).unwrap();

        sim.link_duplex((HOST_1, 0), (ROUTER_A, 1)).unwrap();
        sim.link_duplex((ROUTER_A, 0), (ROUTER_B, 1)).unwrap();
        sim.link_duplex((ROUTER_B, 0), (HOST_2, 0)).unwrap();

        Chain { sim, host_1, deliveries_2, router_a, router_b }
    }

    /// Polls `condition` until it holds, panicking after a few seconds.
    pub async fn wait_for(what: &str, mut condition: impl FnMut() -> bool) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {what}");
    }
}
