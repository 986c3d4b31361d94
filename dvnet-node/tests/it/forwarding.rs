use std::time::Duration;

use bytes::Bytes;
use dvnet_wire::Address;
use tokio::time::timeout;

use crate::helpers::{self, HOST_1, HOST_2};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unroutable_traffic_is_dropped_without_stalling_the_network() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut chain = helpers::two_router_chain();
    let router_a = chain.router_a.clone();
    let handle = chain.sim.start();

    helpers::wait_for("convergence", || router_a.table().best_route(HOST_2).is_some()).await;

    // Nobody advertises address 9: router A drops this at the table
    // lookup.
    chain.host_1.send(Address::new(9), Bytes::from_static(b"void")).unwrap();
    helpers::wait_for("the unroutable packet to be dropped", || {
        router_a.stats().no_route_drops() >= 1
    })
    .await;

    // The drop is isolated: routable traffic still flows.
    chain.host_1.send(HOST_2, Bytes::from_static(b"still works")).unwrap();
    let delivery = timeout(Duration::from_secs(5), chain.deliveries_2.recv())
        .await
        .expect("delivery timed out")
        .expect("delivery channel closed");
    assert_eq!(delivery.payload, Bytes::from_static(b"still works"));

    handle.shutdown().await;
}
