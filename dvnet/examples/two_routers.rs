//! The classic two-host, two-router chain:
//!
//! host 1 -- router A -- router B -- host 2
//!
//! Both routers start knowing only their directly attached host. After one
//! round of routing updates each reaches the far host at cost 2, and a
//! data packet crosses the whole chain.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use dvnet::{Address, Cost, Host, HostOptions, Router, RouterOptions, RoutingTable, Simulation};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let host_1 = Address::new(1);
    let host_2 = Address::new(2);
    let router_a = Address::new(3);
    let router_b = Address::new(4);

    let (h1, _deliveries_1) = Host::new(host_1, HostOptions::default());
    let (h2, mut deliveries_2) = Host::new(host_2, HostOptions::default());

    // Router A: interface 0 faces router B, interface 1 faces host 1.
    let mut table_a = RoutingTable::new();
    table_a.insert(host_1, 1, Cost::new(1));
    let a = Arc::new(Router::new(
        router_a,
        vec![Cost::new(1), Cost::new(1)],
        table_a,
        RouterOptions::default(),
    ));

    // Router B: interface 0 faces host 2, interface 1 faces router A.
    let mut table_b = RoutingTable::new();
    table_b.insert(host_2, 0, Cost::new(1));
    let b = Arc::new(Router::new(
        router_b,
        vec![Cost::new(1), Cost::new(1)],
        table_b,
        RouterOptions::default(),
    ));

    let h1 = Arc::new(h1);

    let mut sim = Simulation::new();
    sim.add_node(h1.clone()).unwrap();
    sim.add_node(Arc::new(h2)).unwrap();
    sim.add_node(a.clone()).unwrap();
    sim.add_node(b.clone()).unwrap();

    sim.link_duplex((host_1, 0), (router_a, 1)).unwrap();
    sim.link_duplex((router_a, 0), (router_b, 1)).unwrap();
    sim.link_duplex((router_b, 0), (host_2, 0)).unwrap();

    let handle = sim.start();

    // Give the routing exchange a moment to converge.
    tokio::time::sleep(Duration::from_millis(100)).await;

    h1.send(host_2, Bytes::from_static(b"hello across two hops")).unwrap();

    let delivery = deliveries_2.recv().await.unwrap();
    println!("host {host_2} received {:?} from host {}", delivery.payload, delivery.source);

    for (name, router) in [("A", &a), ("B", &b)] {
        println!("router {name} routing table:");
        for (dest, iface, cost) in router.table().entries() {
            println!("  to {dest} via interface {iface} at cost {cost}");
        }
    }

    handle.shutdown().await;
}
