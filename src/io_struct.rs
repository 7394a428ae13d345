use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::image_buffer::FloatImage;

/// Success envelope for POST /api/transfer.
#[derive(Debug, Deserialize, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub result_image: String,
    /// Seconds, rounded to two decimals.
    pub processing_time: f64,
}

/// Failure envelope shared by every error status.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// batch x height x width x channel, values in `[0, 1]`, batch always 1.
pub type Tensor = Vec<Vec<Vec<Vec<f32>>>>;

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictRequest {
    pub inputs: PredictInputs,
}

/// Input key names fixed by the stylization backend's serving signature.
#[derive(Debug, Deserialize, Serialize)]
pub struct PredictInputs {
    pub placeholder: Tensor,
    pub placeholder_1: Tensor,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictResponse {
    pub outputs: Tensor,
}

/// Wrap an image into the backend's tensor layout, adding the batch axis.
pub fn tensor_from_image(image: &FloatImage) -> Tensor {
    let width = image.width as usize;
    let mut rows = Vec::with_capacity(image.height as usize);
    for y in 0..image.height as usize {
        let mut row = Vec::with_capacity(width);
        for x in 0..width {
            let i = (y * width + x) * 3;
            row.push(image.data[i..i + 3].to_vec());
        }
        rows.push(row);
    }
    vec![rows]
}

/// Strip the batch axis and rebuild an image, checking the tensor against
/// the expected content dimensions. Any deviation is a backend failure.
pub fn image_from_tensor(tensor: &Tensor, expected: (u32, u32)) -> Result<FloatImage, BackendError> {
    let (width, height) = expected;
    let got = tensor_dimensions(tensor);
    if tensor.len() != 1 || got != (width, height) {
        return Err(BackendError::ShapeMismatch {
            expected: (width, height),
            got,
        });
    }
    let rows = &tensor[0];
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for row in rows {
        if row.len() != width as usize {
            return Err(BackendError::ShapeMismatch {
                expected: (width, height),
                got: (row.len() as u32, height),
            });
        }
        for pixel in row {
            if pixel.len() != 3 {
                return Err(BackendError::MalformedResponse(format!(
                    "pixel has {} channels, expected 3",
                    pixel.len()
                )));
            }
            data.extend_from_slice(pixel);
        }
    }
    Ok(FloatImage {
        width,
        height,
        data,
    })
}

fn tensor_dimensions(tensor: &Tensor) -> (u32, u32) {
    let rows = match tensor.first() {
        Some(rows) => rows,
        None => return (0, 0),
    };
    let width = rows.first().map(|row| row.len()).unwrap_or(0);
    (width as u32, rows.len() as u32)
}
