//! Benchmarks for the outline cleaning pipeline.
//!
//! ```bash
//! cargo bench -p glims-outlines
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{polygon, Geometry, MultiPolygon, Polygon};
use glims_outlines::{CleanConfig, OutlineCleaner, OutlineTable, Value};

fn square(x: f64, y: f64) -> Polygon<f64> {
    polygon![
        (x: x, y: y),
        (x: x + 0.01, y: y),
        (x: x + 0.01, y: y + 0.01),
        (x: x, y: y + 0.01),
        (x: x, y: y),
    ]
}

/// Synthetic table: every tenth row is multi-part, every seventh repeats its predecessor.
fn synthetic_table(rows: usize) -> OutlineTable {
    let mut table = OutlineTable::default();
    for i in 0..rows {
        let x = (i % 100) as f64 * 0.02;
        let y = (i / 100) as f64 * 0.02;
        let geometry: Geometry<f64> = if i % 10 == 0 {
            MultiPolygon::new(vec![square(x, y), square(x + 0.011, y)]).into()
        } else {
            square(x, y).into()
        };
        let id = if i % 7 == 0 && i > 0 { i - 1 } else { i };
        table.insert(
            Some(geometry),
            [
                ("line_type", Value::from("glac_bound")),
                ("glac_id", Value::from(format!("G{:06}", id))),
                ("area", Value::from(0.5)),
                ("anlys_time", Value::from("2004-08-15T00:00:00")),
                ("surge_type", Value::from("0")),
            ],
        );
    }
    table
}

fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean");
    let cleaner = OutlineCleaner::new(CleanConfig::default());

    for rows in [100usize, 1_000, 10_000].iter() {
        let table = synthetic_table(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter(|| black_box(cleaner.clean(table)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clean);
criterion_main!(benches);
