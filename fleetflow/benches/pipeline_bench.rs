//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fleetflow::context::ContextRecord;
use fleetflow::tools::{agent_chain, maintenance_flow, FailureHorizon, MaintenanceRequest};

fn pipeline_benchmark(c: &mut Criterion) {
    let Ok(rt) = tokio::runtime::Builder::new_current_thread().build() else {
        return;
    };

    let Ok(flow) = maintenance_flow(FailureHorizon::Fixed(6)) else {
        return;
    };
    c.bench_function("maintenance_flow", |b| {
        b.iter(|| {
            let initial = MaintenanceRequest::new("TRUCK-22").into_record();
            black_box(rt.block_on(flow.run(initial)))
        });
    });

    let Ok(chain) = agent_chain() else {
        return;
    };
    c.bench_function("agent_chain", |b| {
        b.iter(|| {
            let initial = ContextRecord::new().with("vehicle_id", "TRUCK-22");
            black_box(rt.block_on(chain.run(initial)))
        });
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
