//! Criterion comparison of single-row SELECT latency for raw `rusqlite` vs. the
//! one-line helpers, plus the cost of rendering builder statements. Both lookup
//! variants hit the same in-memory dataset in the same id order.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sql_oneline::prelude::*;
use sql_oneline::test_utils::scattered_ids;

/// Resolve how many rows to seed and look up per iteration.
fn lookup_row_count() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1000)
}

fn seed(conn: &rusqlite::Connection, row_count: usize) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE users (user_id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL);",
    )?;
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare("INSERT INTO users (user_id, name, age) VALUES (?1, ?2, ?3)")?;
        for id in 1..=row_count as i64 {
            stmt.execute(rusqlite::params![id, format!("name-{id}"), id % 90])?;
        }
    }
    tx.commit()
}

fn benchmark_lookups(c: &mut Criterion) {
    let row_count = lookup_row_count();
    let ids = scattered_ids(row_count);

    let raw = rusqlite::Connection::open_in_memory().expect("open sqlite");
    seed(&raw, row_count).expect("seed sqlite");
    let mut conn = SqliteConnection::new(raw);

    let mut group = c.benchmark_group("sqlite_single_row_lookup");
    group.throughput(Throughput::Elements(ids.len() as u64));

    group.bench_function(BenchmarkId::new("rusqlite", ids.len()), |b| {
        b.iter(|| {
            for &id in &ids {
                let name: String = conn
                    .raw()
                    .query_row("SELECT name FROM users WHERE user_id = ?1", [id], |row| row.get(0))
                    .expect("query row");
                black_box(name);
            }
        });
    });

    group.bench_function(BenchmarkId::new("get_string", ids.len()), |b| {
        b.iter(|| {
            for &id in &ids {
                let name = get_string(&mut conn, "SELECT name FROM users WHERE user_id=?", &params![id]);
                black_box(name);
            }
        });
    });

    group.bench_function(BenchmarkId::new("get_int", ids.len()), |b| {
        b.iter(|| {
            for &id in &ids {
                black_box(get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![id]));
            }
        });
    });

    group.finish();
}

fn benchmark_rendering(c: &mut Criterion) {
    let columns: ColumnValues = (0..16).map(|i| (format!("col_{i}"), i)).collect();

    let mut group = c.benchmark_group("builder_rendering");
    group.bench_function("render_insert_16_columns", |b| {
        b.iter(|| black_box(render_insert(black_box("users"), &columns)));
    });
    group.bench_function("render_update_16_columns", |b| {
        b.iter(|| black_box(render_update(black_box("users"), &columns, "user_id", 1234_i64)));
    });
    group.finish();
}

criterion_group!(benches, benchmark_lookups, benchmark_rendering);
criterion_main!(benches);
