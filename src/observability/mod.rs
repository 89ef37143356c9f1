// Observability: metrics counters for fetches, venues and aggregation

pub mod metrics;
