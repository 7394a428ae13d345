use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::orchestrator::TransferOrchestrator;
use crate::strategy::NeuralStyleBackend;
use crate::validate::UploadConstraint;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the stylization backend. Unset means every request takes
    /// the statistical fallback.
    pub backend_url: Option<String>,
    /// Ceiling on one backend call, in seconds.
    pub backend_timeout: u64,
    pub log_interval: u64,
    pub max_upload_bytes: usize,
}

/// Process-wide request counters for the periodic log line and GET /.
#[derive(Debug, Default)]
pub struct TransferStats {
    pub total: AtomicU64,
    pub primary: AtomicU64,
    pub fallback: AtomicU64,
    pub rejected: AtomicU64,
}

impl TransferStats {
    pub fn snapshot(&self) -> (u64, u64, u64, u64) {
        (
            self.total.load(Ordering::Relaxed),
            self.primary.load(Ordering::Relaxed),
            self.fallback.load(Ordering::Relaxed),
            self.rejected.load(Ordering::Relaxed),
        )
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: TransferOrchestrator,
    pub constraint: UploadConstraint,
    pub stats: Arc<TransferStats>,
    pub log_interval: u64,
}

impl AppState {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let backend = match &config.backend_url {
            Some(url) => {
                let client = reqwest::Client::builder()
                    .timeout(std::time::Duration::from_secs(config.backend_timeout))
                    .build()?;
                Some(NeuralStyleBackend::new(client, url.clone()))
            }
            None => None,
        };
        Ok(AppState {
            orchestrator: TransferOrchestrator::new(backend),
            constraint: UploadConstraint {
                max_bytes: config.max_upload_bytes,
                ..UploadConstraint::default()
            },
            stats: Arc::new(TransferStats::default()),
            log_interval: config.log_interval,
        })
    }
}
