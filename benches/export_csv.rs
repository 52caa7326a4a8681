//! This bench test renders a large page of requirements, including text that
//! needs quoting, as CSV.

#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use non_empty_string::NonEmptyString;
use reqdash::{Category, Requirement, Status, export};

/// Generates requirements with a mix of plain and quoted text
fn requirements(count: u64) -> Vec<Requirement> {
    let date = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    (1..=count)
        .map(|id| {
            let text = if id % 3 == 0 {
                format!("The operator shall confirm \"stop\" commands, case {id}")
            } else {
                format!("The system shall log event {id}, including its source")
            };
            Requirement::new(id, NonEmptyString::new(text).unwrap(), date)
                .with_status(Status::ALL[usize::try_from(id).unwrap() % Status::ALL.len()])
                .with_categories([Category::Functional, Category::Security])
                .with_author("bench")
                .with_estimated_time(2.5)
        })
        .collect()
}

fn export_csv(c: &mut Criterion) {
    let requirements = requirements(1_000);
    c.bench_function("export 1000 requirements", |b| {
        b.iter(|| export::to_csv(std::hint::black_box(&requirements)));
    });
}

criterion_group!(benches, export_csv);
criterion_main!(benches);
