use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use stun_kit_codec::{
    Decoder,
    message::builder::{BindingRequestOptions, binding_request},
};

fn criterion_benchmark(c: &mut Criterion) {
    let transaction_id = [
        0x6cu8, 0x46, 0x62, 0x54, 0x75, 0x4b, 0x44, 0x51, 0x46, 0x48, 0x4c, 0x71,
    ];

    let mut bytes = BytesMut::with_capacity(1280);
    binding_request(
        &mut bytes,
        &transaction_id,
        &BindingRequestOptions {
            software: Some("stun-kit"),
            username: Some("panda"),
            key: Some(b"raspberry"),
            integrity: true,
            fingerprint: true,
            ..Default::default()
        },
    )
    .unwrap();

    let sample = bytes.freeze();
    let mut decoder = Decoder::default();

    let mut stun_criterion = c.benchmark_group("stun");

    stun_criterion.throughput(Throughput::Elements(1));
    stun_criterion.bench_function("decode_binding_request", |bencher| {
        bencher.iter(|| {
            decoder.decode(&sample).unwrap();
        })
    });

    stun_criterion.bench_function("encode_binding_request", |bencher| {
        let mut bytes = BytesMut::with_capacity(1280);
        bencher.iter(|| {
            binding_request(
                &mut bytes,
                &transaction_id,
                &BindingRequestOptions {
                    software: Some("stun-kit"),
                    fingerprint: true,
                    ..Default::default()
                },
            )
            .unwrap();
        })
    });

    stun_criterion.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
