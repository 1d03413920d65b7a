//! 最新版本分区选择性能基准测试

use chrono::{Duration, NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use release_tracker::services::resolution::latest_per_partition;
use release_tracker::storage::{Branch, Method, Update, UpdateType};

/// 构造 `devices` 台设备、每台 `per_device` 条记录的工作集
fn create_working_set(devices: usize, per_device: usize) -> Vec<Update> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut rows = Vec::with_capacity(devices * per_device);
    let mut id = 0;
    for d in 0..devices {
        for r in 0..per_device {
            id += 1;
            rows.push(Update {
                id,
                codename: format!("device{}", d),
                version: format!("V{}.{}", r, d),
                android: "13".to_string(),
                branch: if r % 3 == 0 { Branch::StableBeta } else { Branch::Stable },
                update_type: UpdateType::Full,
                method: if r % 2 == 0 { Method::Recovery } else { Method::Fastboot },
                size: Some(3_000_000_000),
                md5: None,
                filename: format!("device{}_{}.zip", d, r),
                link: "https://example.com/rom.zip".to_string(),
                changelog: String::new(),
                date: Some(base + Duration::days((r * 7 + d % 5) as i64)),
                inserted_on: Utc::now(),
            });
        }
    }
    rows
}

fn bench_latest_per_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition/latest_per_partition");

    for (devices, per_device) in [(100, 10), (1000, 10), (1000, 100)] {
        let rows = create_working_set(devices, per_device);
        group.throughput(Throughput::Elements(rows.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("codename", rows.len()),
            &rows,
            |b, rows| {
                b.iter(|| latest_per_partition(rows.clone(), |u| u.codename.clone()));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("codename_method_branch", rows.len()),
            &rows,
            |b, rows| {
                b.iter(|| {
                    latest_per_partition(rows.clone(), |u| {
                        (u.codename.clone(), u.method, u.branch.clone())
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_latest_per_partition);
criterion_main!(benches);
