use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crm_dashboard::crm::filters::closing_deals;
use crm_dashboard::crm::pagination::Paginator;
use crm_dashboard::crm::records::Deal;

const STAGES: [&str; 8] = [
    "Prospecting",
    "Qualification",
    "Needs Analysis",
    "Proposal/Price Quote",
    "Negotiation/Review",
    "Close",
    "Closed Won",
    "Closed Lost",
];

fn build_deals(count: usize) -> Vec<Deal> {
    (0..count)
        .map(|i| Deal {
            id: i as i64,
            name: format!("Deal {i:05}"),
            stage: STAGES[i % STAGES.len()].to_string(),
            amount: Some((i % 97) as f64 * 125.0),
            probability: Some((i % 100) as u8),
            account_name: Some(format!("Account {}", i % 40)),
            close_date: None,
        })
        .collect()
}

fn bench_closing_deals(c: &mut Criterion) {
    let deals = build_deals(25_000);

    c.bench_function("closing_deals_filter", |b| {
        b.iter(|| black_box(closing_deals(black_box(&deals)).len()))
    });

    let filtered = closing_deals(&deals);
    c.bench_function("closing_deals_walk_pages", |b| {
        b.iter(|| {
            let mut pager = Paginator::default();
            let mut seen = 0;
            loop {
                seen += pager.items(black_box(&filtered)).len();
                if !pager.has_next(filtered.len()) {
                    break;
                }
                pager.next(filtered.len());
            }
            black_box(seen)
        })
    });
}

criterion_group!(benches, bench_closing_deals);
criterion_main!(benches);
