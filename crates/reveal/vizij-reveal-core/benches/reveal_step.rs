use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vizij_reveal_core::{
    AttachCfg, Engine, Inputs, Rect, StyleSnapshot, Transition, TriggerPolicy,
};

/// A long page of `n` repeat-mode cards, each with two staggered children.
fn build_page(n: usize) -> Engine {
    let mut engine = Engine::default();
    engine
        .define_variant(
            "card",
            StyleSnapshot::new().with("opacity", 0.0).with("y", 40.0),
            StyleSnapshot::new().with("opacity", 1.0).with("y", 0.0),
            Transition {
                duration: Some(0.6),
                stagger_children: 0.1,
                ..Transition::default()
            },
        )
        .expect("variant");
    for i in 0..n {
        let handle = format!("card-{i}");
        let bounds = Rect::new(0.0, i as f32 * 240.0, 1200.0, 200.0);
        engine
            .attach(
                &handle,
                AttachCfg::new("card", bounds).with_policy(TriggerPolicy::repeat(0.5)),
            )
            .expect("attach");
        for c in 0..2 {
            engine
                .attach_child(&handle, &format!("{handle}-{c}"), "card".into())
                .expect("attach child");
        }
    }
    engine
}

fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal_scroll_step");
    for n in [50usize, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut engine = build_page(n);
            let page_height = n as f32 * 240.0;
            let mut y = 0.0f32;
            b.iter(|| {
                y = (y + 37.0) % page_height;
                let out = engine.update(1.0 / 60.0, Inputs::with_viewport(Rect::new(0.0, y, 1200.0, 800.0)));
                black_box(out.frames.len());
            });
        });
    }
    group.finish();
}

fn bench_idle(c: &mut Criterion) {
    let mut engine = build_page(500);
    engine.update(0.0, Inputs::with_viewport(Rect::new(0.0, 0.0, 1200.0, 800.0)));
    c.bench_function("reveal_idle_step_500", |b| {
        b.iter(|| {
            let out = engine.update(1.0 / 60.0, Inputs::default());
            black_box(out.frames.len());
        });
    });
}

criterion_group!(benches, bench_scroll, bench_idle);
criterion_main!(benches);
