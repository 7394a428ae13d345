use crate::image_buffer::FloatImage;
use crate::strategy::{NeuralStyleBackend, StatisticalTransfer, StyleTransferStrategy};

/// Which strategy produced the output. Counted and logged, never exposed in
/// the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPath {
    Primary,
    Fallback,
}

/// Sequences the primary attempt and the statistical fallback. The backend
/// handle is injected at construction; `None` forces the fallback path.
#[derive(Debug, Clone)]
pub struct TransferOrchestrator {
    backend: Option<NeuralStyleBackend>,
    fallback: StatisticalTransfer,
}

impl TransferOrchestrator {
    pub fn new(backend: Option<NeuralStyleBackend>) -> Self {
        TransferOrchestrator {
            backend,
            fallback: StatisticalTransfer,
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Always reaches an output once both inputs have decoded: any backend
    /// failure is logged and recovered by the statistical engine, which
    /// cannot fail on well-formed buffers.
    pub async fn stylize(
        &self,
        content: &FloatImage,
        style: &FloatImage,
    ) -> (FloatImage, TransferPath) {
        if let Some(backend) = &self.backend {
            match backend.transfer(content, style).await {
                Ok(output) => return (output, TransferPath::Primary),
                Err(e) => {
                    log::warn!("stylization backend failed, using statistical fallback: {e}");
                }
            }
        }
        (self.fallback.recolor(content, style), TransferPath::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_image(v: f32) -> FloatImage {
        FloatImage {
            width: 2,
            height: 2,
            data: vec![v; 12],
        }
    }

    #[tokio::test]
    async fn missing_backend_forces_the_fallback_path() {
        let orchestrator = TransferOrchestrator::new(None);
        let content = tiny_image(0.25);
        let style = tiny_image(0.75);

        let (output, path) = orchestrator.stylize(&content, &style).await;

        assert_eq!(path, TransferPath::Fallback);
        assert_eq!(output, StatisticalTransfer.recolor(&content, &style));
    }

    #[tokio::test]
    async fn unreachable_backend_is_recovered_transparently() {
        // Nothing listens on this port; the transport error must stay
        // internal and the statistical result must come back instead.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(250))
            .build()
            .unwrap();
        let backend = NeuralStyleBackend::new(client, "http://127.0.0.1:9".to_string());
        let orchestrator = TransferOrchestrator::new(Some(backend));
        let content = tiny_image(0.25);
        let style = tiny_image(0.75);

        let (output, path) = orchestrator.stylize(&content, &style).await;

        assert_eq!(path, TransferPath::Fallback);
        assert_eq!(output, StatisticalTransfer.recolor(&content, &style));
    }
}
