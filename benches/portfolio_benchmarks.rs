//! Performance benchmarks for the Roster Cost Engine.
//!
//! Measures project costing and portfolio evaluation over a synthetic store:
//! - Single project cost, cold and with a warm attendance cache
//! - Sequential portfolio over 10, 50 and 200 projects
//! - Concurrent portfolio on the blocking pool
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use roster_cost_engine::config::{EngineConfig, OverAllocationPolicy};
use roster_cost_engine::engine::CostEngine;
use roster_cost_engine::models::{
    CostSharingEdge, EntryUpdate, Percentage, Period, Project, ProjectId, ShiftCode, Staff, StaffId,
};
use roster_cost_engine::store::{MemoryStore, RosterStore};

const STAFF_PER_PROJECT: usize = 20;

fn period() -> Period {
    Period::new(2025, 1).expect("valid period")
}

/// Builds `projects` projects with a full month of entries per staff member.
/// Each project shares 10% of its cost with the next one in a ring.
fn build_store(projects: usize) -> MemoryStore {
    let store = MemoryStore::new();
    let codes = [
        ShiftCode::Morning,
        ShiftCode::Afternoon,
        ShiftCode::Night,
        ShiftCode::Off,
        ShiftCode::Absent,
        ShiftCode::SickLeave,
        ShiftCode::Late,
    ];

    for p in 0..projects {
        let project_id = format!("prj_{:04}", p);
        store
            .add_project(Project::new(project_id.as_str(), format!("Project {}", p)))
            .expect("add project");
        let roster = store
            .get_or_create_roster(&ProjectId::new(project_id.as_str()), period())
            .expect("create roster");

        let mut entries = Vec::with_capacity(STAFF_PER_PROJECT * 31);
        for s in 0..STAFF_PER_PROJECT {
            let staff_id = format!("{}_stf_{:02}", project_id, s);
            store
                .add_staff(Staff::new(
                    staff_id.as_str(),
                    project_id.as_str(),
                    format!("Staff {}", s),
                    Decimal::new(400 + s as i64 * 5, 0),
                ))
                .expect("add staff");
            for day in 1..=31u32 {
                let update = EntryUpdate {
                    staff_id: StaffId::new(staff_id.as_str()),
                    day,
                    shift_code: codes[(day as usize + s) % codes.len()],
                    notes: None,
                };
                entries.push(update.into_entry(&roster.id));
            }
        }
        store.upsert_entries(entries).expect("write entries");
    }

    if projects > 1 {
        for p in 0..projects {
            let edge = CostSharingEdge::new(
                format!("prj_{:04}", p),
                format!("prj_{:04}", (p + 1) % projects),
                Percentage::new(Decimal::new(10, 0)).expect("valid percentage"),
            );
            store
                .add_sharing_edge(edge, OverAllocationPolicy::Warn)
                .expect("add edge");
        }
    }
    store
}

fn build_engine(projects: usize, cache: bool) -> Arc<CostEngine> {
    let mut config = EngineConfig::default();
    config.cache.enabled = cache;
    Arc::new(CostEngine::new(Arc::new(build_store(projects)), config).expect("valid config"))
}

/// Benchmark: Original cost of one project with 20 staff.
fn bench_project_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_cost");
    let project_id = ProjectId::new("prj_0000");

    let cold = build_engine(1, false);
    group.bench_function("uncached", |b| {
        b.iter(|| black_box(cold.compute_project_cost(&project_id, period()).unwrap()))
    });

    let warm = build_engine(1, true);
    warm.compute_project_cost(&project_id, period()).unwrap();
    group.bench_function("cached", |b| {
        b.iter(|| black_box(warm.compute_project_cost(&project_id, period()).unwrap()))
    });

    group.finish();
}

/// Benchmark: Sequential portfolio at increasing project counts.
fn bench_portfolio_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_sequential");
    group.sample_size(20);

    for projects in [10usize, 50, 200] {
        let engine = build_engine(projects, true);
        group.throughput(Throughput::Elements(projects as u64));
        group.bench_with_input(BenchmarkId::new("projects", projects), &projects, |b, _| {
            b.iter(|| black_box(engine.compute_portfolio(period()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark: Concurrent portfolio on the blocking pool.
fn bench_portfolio_concurrent(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("portfolio_concurrent");
    group.sample_size(20);

    for projects in [50usize, 200] {
        let engine = build_engine(projects, true);
        group.throughput(Throughput::Elements(projects as u64));
        group.bench_with_input(BenchmarkId::new("projects", projects), &projects, |b, _| {
            b.to_async(&rt).iter(|| {
                let engine = Arc::clone(&engine);
                async move {
                    black_box(engine.compute_portfolio_concurrent(period()).await.unwrap())
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_project_cost,
    bench_portfolio_sequential,
    bench_portfolio_concurrent,
);
criterion_main!(benches);
