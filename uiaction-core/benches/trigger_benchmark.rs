use std::hint::black_box;
use std::sync::Once;

use criterion::{Criterion, criterion_group, criterion_main};

use uiaction_core::{
    ActionId, ActionMapping, ActionRegistry, config::RegistryConfig, controller::UiQueue,
};

static INIT: Once = Once::new();

fn init_tracing_once() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
    });
}

fn registry() -> (ActionRegistry, UiQueue) {
    let registry = ActionRegistry::new(&RegistryConfig::default());
    let (queue, sender) = UiQueue::new();
    registry.set_dispatch_function(sender);
    registry.register_actions([
        ActionMapping::new(ActionId::WarpModeToggle, |_| {}),
        ActionMapping::new(ActionId::ResetHard, |_| {}).blocks(),
        ActionMapping::new(ActionId::FullscreenToggle, |_| {}).uithread(),
    ]);
    (registry, queue)
}

fn bench_trigger(c: &mut Criterion) {
    init_tracing_once();
    let (registry, queue) = registry();

    let mut group = c.benchmark_group("trigger");

    group.bench_function("plain", |b| {
        b.iter(|| black_box(registry.trigger(black_box(ActionId::WarpModeToggle))));
    });

    // Never finished, so every trigger after the first is dropped.
    registry.trigger(ActionId::ResetHard);
    group.bench_function("dropped_busy", |b| {
        b.iter(|| black_box(registry.trigger(black_box(ActionId::ResetHard))));
    });

    group.bench_function("dispatch_and_drain", |b| {
        b.iter(|| {
            registry.trigger(ActionId::FullscreenToggle);
            black_box(queue.run_pending())
        });
    });

    group.bench_function("by_name", |b| {
        b.iter(|| black_box(registry.trigger_by_name(black_box("warp-mode-toggle"))));
    });

    group.finish();
}

criterion_group!(benches, bench_trigger);
criterion_main!(benches);
