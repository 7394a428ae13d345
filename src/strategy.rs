use crate::color::{self, AB_RANGE, L_RANGE};
use crate::error::BackendError;
use crate::image_buffer::{FloatImage, resample_nearest};
use crate::io_struct::{
    PredictInputs, PredictRequest, PredictResponse, image_from_tensor, tensor_from_image,
};

/// Guards the gain division when a content channel has zero variance.
pub const VARIANCE_EPSILON: f32 = 1e-8;

/// One way of turning a content/style pair into a stylized image. Both
/// buffers are unit-float RGB; implementations must not mutate them.
#[allow(async_fn_in_trait)]
pub trait StyleTransferStrategy {
    async fn transfer(
        &self,
        content: &FloatImage,
        style: &FloatImage,
    ) -> Result<FloatImage, BackendError>;
}

/// Client for the external neural stylization service.
#[derive(Debug, Clone)]
pub struct NeuralStyleBackend {
    client: reqwest::Client,
    url: String,
}

impl NeuralStyleBackend {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        NeuralStyleBackend { client, url }
    }

    fn predict_url(&self) -> String {
        format!(
            "{}/v1/models/style_transfer:predict",
            self.url.trim_end_matches('/')
        )
    }
}

impl StyleTransferStrategy for NeuralStyleBackend {
    /// One best-effort attempt. The client carries the timeout ceiling;
    /// every failure mode comes back as a [`BackendError`] for the
    /// orchestrator to recover from.
    async fn transfer(
        &self,
        content: &FloatImage,
        style: &FloatImage,
    ) -> Result<FloatImage, BackendError> {
        let request = PredictRequest {
            inputs: PredictInputs {
                placeholder: tensor_from_image(content),
                placeholder_1: tensor_from_image(style),
            },
        };
        let response = self
            .client
            .post(self.predict_url())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        image_from_tensor(&body.outputs, (content.width, content.height))
    }
}

/// Deterministic recoloring: match the content's per-channel LAB statistics
/// to the style's. Needs no model and holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalTransfer;

impl StatisticalTransfer {
    /// Pure function of its two inputs. Never fails for well-formed
    /// buffers: zero-variance channels are handled by the epsilon guard.
    pub fn recolor(&self, content: &FloatImage, style: &FloatImage) -> FloatImage {
        let style = resample_nearest(style, content.width, content.height);

        let (content_l, content_a, content_b) = color::lab_planes_from_rgb(&content.data);
        let (style_l, style_a, style_b) = color::lab_planes_from_rgb(&style.data);

        let out_l = match_channel(&content_l, &style_l, L_RANGE);
        let out_a = match_channel(&content_a, &style_a, AB_RANGE);
        let out_b = match_channel(&content_b, &style_b, AB_RANGE);

        FloatImage {
            width: content.width,
            height: content.height,
            data: color::rgb_from_lab_planes(&out_l, &out_a, &out_b),
        }
    }
}

impl StyleTransferStrategy for StatisticalTransfer {
    async fn transfer(
        &self,
        content: &FloatImage,
        style: &FloatImage,
    ) -> Result<FloatImage, BackendError> {
        Ok(self.recolor(content, style))
    }
}

/// Shift one channel so its mean and spread match the style's, clipped to
/// the channel's valid range.
fn match_channel(content: &[f32], style: &[f32], range: (f32, f32)) -> Vec<f32> {
    let c = color::channel_stats(content);
    let s = color::channel_stats(style);
    let gain = s.std / (c.std + VARIANCE_EPSILON);
    content
        .iter()
        .map(|&v| ((v - c.mean) * gain + s.mean).clamp(range.0, range.1))
        .collect()
}
