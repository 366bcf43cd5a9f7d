use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use flipbook_core::{AnimatorGraph, Clip, ClipLibrary, Config, Frame, FrameAnimator, NodeConfig};

fn walk_clip() -> Clip {
    Clip::new(
        "Walk",
        (0..8)
            .map(|i| {
                let frame = Frame::new(i).with_speed(if i % 2 == 0 { 1.0 } else { 1.5 });
                if i % 4 == 1 {
                    frame.with_trigger("footstep")
                } else {
                    frame
                }
            })
            .collect(),
    )
    .with_frame_rate(12.0)
}

fn single_animator(c: &mut Criterion) {
    let clip = walk_clip().into_ref();
    let mut anim = FrameAnimator::with_seed(ClipLibrary::new(), 1);
    anim.on_trigger(|name| {
        black_box(name);
    });
    anim.play(&clip).unwrap();

    c.bench_function("animator_tick_60hz", |b| {
        b.iter(|| anim.tick(black_box(1.0 / 60.0)))
    });
}

fn graph_tick_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_tick_all");
    for &layers in &[4usize, 32, 256] {
        let clip = walk_clip().into_ref();
        let mut graph = AnimatorGraph::new(Config {
            rng_seed: Some(7),
            ..Config::default()
        });
        let root = graph.add_frame_node(
            "root",
            ClipLibrary::from_refs([clip.clone()]).unwrap(),
            NodeConfig::default(),
        );
        let peers = (0..layers)
            .map(|i| {
                graph.add_frame_node(
                    &format!("layer{i}"),
                    ClipLibrary::new(),
                    NodeConfig::default(),
                )
            })
            .collect();
        graph.set_shared(root, peers).unwrap();
        graph.play_clip(root, &clip).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, _| {
            b.iter(|| {
                let out = graph.tick_all(black_box(1.0 / 60.0));
                black_box(out.events.len());
                graph.drain_outputs();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, single_animator, graph_tick_all);
criterion_main!(benches);
