use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Request accounting for one client session.
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_response_time: Duration,
    pub requests_by_operation: HashMap<String, OperationMetrics>,
}

#[derive(Debug, Clone)]
pub struct OperationMetrics {
    pub request_count: u64,
    pub error_count: u64,
    pub max_response_time: Duration,
}

#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub operation: String,
    pub response_time: Duration,
    pub success: bool,
}

impl SessionMetrics {
    pub fn average_response_time(&self) -> Duration {
        if self.total_requests == 0 {
            Duration::from_millis(0)
        } else {
            self.total_response_time / self.total_requests as u32
        }
    }
}

impl OperationMetrics {
    fn new() -> Self {
        Self {
            request_count: 0,
            error_count: 0,
            max_response_time: Duration::from_millis(0),
        }
    }

    fn update(&mut self, metrics: &RequestMetrics) {
        self.request_count += 1;
        if !metrics.success {
            self.error_count += 1;
        }
        if metrics.response_time > self.max_response_time {
            self.max_response_time = metrics.response_time;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<SessionMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_request(&self, request_metrics: RequestMetrics) {
        let mut metrics = self.metrics.write().await;

        metrics.total_requests += 1;
        metrics.total_response_time += request_metrics.response_time;
        if request_metrics.success {
            metrics.successful_requests += 1;
        } else {
            metrics.failed_requests += 1;
        }

        metrics
            .requests_by_operation
            .entry(request_metrics.operation.clone())
            .or_insert_with(OperationMetrics::new)
            .update(&request_metrics);
    }

    pub async fn get_metrics(&self) -> SessionMetrics {
        self.metrics.read().await.clone()
    }
}
