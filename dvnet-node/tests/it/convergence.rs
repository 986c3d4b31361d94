use std::time::Duration;

use bytes::Bytes;
use dvnet_wire::Cost;
use tokio::time::timeout;

use crate::helpers::{self, HOST_1, HOST_2};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn routers_converge_to_cost_two_paths() {
    let _ = tracing_subscriber::fmt::try_init();

    let chain = helpers::two_router_chain();
    let (router_a, router_b) = (chain.router_a.clone(), chain.router_b.clone());
    let handle = chain.sim.start();

    // After one full exchange, A reaches host 2 at cost 2 through the
    // interface facing B, and B reaches host 1 symmetrically.
    helpers::wait_for("router A to learn host 2", || {
        router_a.table().best_route(HOST_2) == Some((0, Cost::new(2)))
    })
    .await;
    helpers::wait_for("router B to learn host 1", || {
        router_b.table().best_route(HOST_1) == Some((1, Cost::new(2)))
    })
    .await;

    // Directly attached hosts stay at their seeded cost.
    assert_eq!(router_a.table().best_route(HOST_1), Some((1, Cost::new(1))));
    assert_eq!(router_b.table().best_route(HOST_2), Some((0, Cost::new(1))));

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn data_crosses_the_converged_chain_intact() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut chain = helpers::two_router_chain();
    let router_a = chain.router_a.clone();
    let handle = chain.sim.start();

    helpers::wait_for("convergence", || router_a.table().best_route(HOST_2).is_some()).await;

    let payload = Bytes::from_static(b"payload across two hops");
    chain.host_1.send(HOST_2, payload.clone()).unwrap();

    let delivery = timeout(Duration::from_secs(5), chain.deliveries_2.recv())
        .await
        .expect("delivery timed out")
        .expect("delivery channel closed");

    assert_eq!(delivery.source, HOST_1);
    assert_eq!(delivery.payload, payload);

    assert!(router_a.stats().forwarded() >= 1);

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn payloads_arrive_in_send_order() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut chain = helpers::two_router_chain();
    let router_a = chain.router_a.clone();
    let handle = chain.sim.start();

    helpers::wait_for("convergence", || router_a.table().best_route(HOST_2).is_some()).await;

    for i in 0..5u8 {
        chain.host_1.send(HOST_2, Bytes::from(vec![i])).unwrap();
    }

    // One path and FIFO queues end to end: order is preserved.
    for i in 0..5u8 {
        let delivery = timeout(Duration::from_secs(5), chain.deliveries_2.recv())
            .await
            .expect("delivery timed out")
            .expect("delivery channel closed");
        assert_eq!(delivery.payload, Bytes::from(vec![i]));
    }

    handle.shutdown().await;
}
