//! Benchmarks for field normalization.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jobflow::pipeline::{resolve_date, salary_bounds, split_qualifications, Normalizer};
use jobflow::scrape::{DetailEnrichment, JobRecord, ListingSummary};

fn table(rows: usize) -> Vec<JobRecord> {
    let salaries = [
        "NGN\n\n100,000 - 150,000",
        "Confidential",
        "NGN\n\nLess than 75,000",
        "NGN\n\nCommission Only",
    ];
    (0..rows)
        .map(|i| {
            JobRecord::new(
                ListingSummary {
                    job_url: format!("/listings/job-{i}"),
                    date_posted_raw: format!("{} days", i % 30),
                    ..Default::default()
                },
                DetailEnrichment {
                    salary_raw: salaries[i % salaries.len()].to_string(),
                    details_raw: vec![
                        "Minimum Qualification: BSc".into(),
                        "Experience Level: Mid level".into(),
                        "Experience Length: 3 years".into(),
                    ],
                    ..Default::default()
                },
            )
        })
        .collect()
}

fn normalize_benchmark(c: &mut Criterion) {
    let as_of = NaiveDate::from_ymd_opt(2024, 7, 25).expect("valid date");

    c.bench_function("resolve_date", |b| {
        b.iter(|| resolve_date(black_box("12 weeks"), as_of))
    });

    c.bench_function("salary_bounds", |b| {
        b.iter(|| salary_bounds(black_box("NGN\n\n1,250,000 - 1,500,000")))
    });

    c.bench_function("split_qualifications", |b| {
        b.iter(|| {
            split_qualifications(black_box(
                "Minimum Qualification: BSc;Experience Level: Mid level;Experience Length: 3 years",
            ))
        })
    });

    let records = table(1_000);
    let normalizer = Normalizer::new(as_of);
    c.bench_function("normalize_table_1000", |b| {
        b.iter(|| normalizer.normalize_table(black_box(records.clone())))
    });
}

criterion_group!(benches, normalize_benchmark);
criterion_main!(benches);
