use cinerec::algorithms::{
    aggregate, rank_by_popularity, CorrelationMatrix, UserItemMatrix,
};
use cinerec::RatingObservation;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Deterministic synthetic ratings: 500 users over 100 titles, roughly two
/// thirds dense, ratings on the 1-5 scale.
fn synthetic_observations() -> Vec<RatingObservation> {
    let mut observations = Vec::new();
    for user in 0..500u32 {
        for title in 0..100u32 {
            if (user + title) % 3 == 0 {
                continue;
            }
            let rating = 1.0 + ((user * 7 + title * 13) % 5) as f64;
            observations.push(RatingObservation::new(user, format!("Title {title}"), rating));
        }
    }
    observations
}

fn benchmark_matrix_build(c: &mut Criterion) {
    let observations = synthetic_observations();

    c.bench_function("matrix_build", |b| {
        b.iter(|| {
            black_box(UserItemMatrix::from_observations(&observations));
        });
    });
}

fn benchmark_correlation(c: &mut Criterion) {
    let observations = synthetic_observations();
    let matrix = UserItemMatrix::from_observations(&observations);

    c.bench_function("correlation_build", |b| {
        b.iter(|| {
            black_box(CorrelationMatrix::from_matrix(&matrix));
        });
    });
}

fn benchmark_popularity(c: &mut Criterion) {
    let observations = synthetic_observations();

    c.bench_function("popularity_rank", |b| {
        b.iter(|| {
            black_box(rank_by_popularity(&observations, 50, 5));
        });
    });
}

fn benchmark_aggregation(c: &mut Criterion) {
    let observations = synthetic_observations();
    let matrix = UserItemMatrix::from_observations(&observations);
    let correlations = CorrelationMatrix::from_matrix(&matrix);
    let seeds = vec![
        "Title 1".to_string(),
        "Title 2".to_string(),
        "Title 3".to_string(),
    ];

    c.bench_function("aggregate_seeds", |b| {
        b.iter(|| {
            black_box(aggregate(&correlations, &seeds, 5));
        });
    });
}

criterion_group!(
    benches,
    benchmark_matrix_build,
    benchmark_correlation,
    benchmark_popularity,
    benchmark_aggregation
);
criterion_main!(benches);
