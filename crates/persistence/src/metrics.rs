//! Query latency and connection pool metrics.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Times one named repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_group");
/// let result = query.fetch_optional(&pool).await;
/// timer.finish(result.is_ok());
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time labelled with the query and its outcome.
    pub fn finish(self, succeeded: bool) {
        let outcome = outcome_label(succeeded);
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());

        if !succeeded {
            counter!("database_query_errors_total", "query" => self.query).increment(1);
        }
    }
}

fn outcome_label(succeeded: bool) -> &'static str {
    if succeeded {
        "ok"
    } else {
        "error"
    }
}

/// Publishes pool occupancy. The server calls this on an interval.
pub fn record_pool_metrics(pool: &PgPool) {
    let open = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_open").set(open as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_in_use").set(open.saturating_sub(idle) as f64);
}
