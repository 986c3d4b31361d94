use std::hint::black_box;

use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::Rng;

use dvnet::{
    wire::{
        packet::Packet,
        update::{RouteAdvert, RoutingUpdate},
    },
    Address, Cost,
};

fn packet_codec(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut payload = vec![0u8; 512];
    rng.fill(&mut payload[..]);

    let packet = Packet::data(Address::new(1), Address::new(42), Bytes::from(payload));
    let encoded = packet.encode().unwrap();

    c.bench_function("packet_encode", |b| b.iter(|| black_box(&packet).encode().unwrap()));
    c.bench_function("packet_decode", |b| b.iter(|| Packet::decode(black_box(&encoded)).unwrap()));
}

fn update_codec(c: &mut Criterion) {
    let update = RoutingUpdate::new(
        (0..16u8)
            .map(|i| RouteAdvert {
                destination: Address::new(i),
                via: Some(i % 4),
                cost: Cost::new(u16::from(i % 10)),
            })
            .collect(),
    );
    let encoded = update.encode().unwrap();

    c.bench_function("update_encode", |b| b.iter(|| black_box(&update).encode().unwrap()));
    c.bench_function("update_decode", |b| {
        b.iter(|| RoutingUpdate::decode(black_box(&encoded)).unwrap())
    });
}

criterion_group!(benches, packet_codec, update_codec);
criterion_main!(benches);
