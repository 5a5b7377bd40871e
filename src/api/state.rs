use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::aggregator::Aggregator;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub metrics: Arc<Metrics>,
    /// Cancelled on server shutdown; each request derives a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(aggregator: Aggregator, shutdown: CancellationToken) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            metrics: Arc::new(Metrics::new()),
            shutdown,
        }
    }
}
