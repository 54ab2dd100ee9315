//! Frame to tensor conversion for the hand landmark model.

use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use ndarray::Array4;
use rayon::prelude::*;

use crate::types::Frame;

/// Side length of the model's square input.
pub const INPUT_SIZE: u32 = 224;
/// Landmarks per hand in the model output.
pub const NUM_LANDMARKS: usize = 21;

/// How the source frame was scaled and padded into the model input, kept
/// around to map landmark coordinates back to source pixels.
#[derive(Clone, Copy, Debug)]
pub struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
    orig_w: u32,
    orig_h: u32,
}

impl Letterbox {
    fn for_frame(width: u32, height: u32) -> Self {
        let scale = INPUT_SIZE as f32 / (width.max(height) as f32);
        let new_w = scaled_side(width, scale);
        let new_h = scaled_side(height, scale);
        Self {
            scale,
            pad_x: (((INPUT_SIZE as i64 - new_w as i64) / 2).max(0)) as f32,
            pad_y: (((INPUT_SIZE as i64 - new_h as i64) / 2).max(0)) as f32,
            orig_w: width,
            orig_h: height,
        }
    }

    /// Maps a model-input coordinate back to a source-frame pixel, clamped
    /// to the frame bounds.
    pub fn unproject(&self, x: f32, y: f32) -> (f32, f32) {
        let px = (x - self.pad_x) / self.scale;
        let py = (y - self.pad_y) / self.scale;
        (
            px.clamp(0.0, (self.orig_w.saturating_sub(1)) as f32),
            py.clamp(0.0, (self.orig_h.saturating_sub(1)) as f32),
        )
    }
}

fn scaled_side(side: u32, scale: f32) -> u32 {
    (side as f32 * scale).round().max(1.0) as u32
}

/// Letterboxes the frame into a normalized NHWC tensor of shape
/// `(1, INPUT_SIZE, INPUT_SIZE, 3)`.
pub fn prepare_frame(frame: &Frame) -> Result<(Array4<f32>, Letterbox)> {
    let expected_len = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.rgba.len() != expected_len {
        return Err(anyhow!(
            "frame buffer size mismatch: got {}, expected {}",
            frame.rgba.len(),
            expected_len
        ));
    }

    let letterbox = Letterbox::for_frame(frame.width, frame.height);
    let new_w = scaled_side(frame.width, letterbox.scale);
    let new_h = scaled_side(frame.height, letterbox.scale);

    let src_image = fir::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.rgba.clone(),
        fir::PixelType::U8x4,
    )?;
    let mut dst_image = fir::images::Image::new(new_w, new_h, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&resize_options))
        .context("fast resize failed")?;
    let resized = dst_image.into_vec();

    // Paste the resized frame onto a black square canvas.
    let side = INPUT_SIZE as usize;
    let pad_x = letterbox.pad_x as usize;
    let pad_y = letterbox.pad_y as usize;
    let mut canvas = vec![0u8; side * side * 4];
    let dst_stride = side * 4;
    let src_stride = new_w as usize * 4;
    for row in 0..(new_h as usize) {
        let dst_offset = (pad_y + row) * dst_stride + pad_x * 4;
        let src_offset = row * src_stride;
        canvas[dst_offset..dst_offset + src_stride]
            .copy_from_slice(&resized[src_offset..src_offset + src_stride]);
    }

    let normalized: Vec<f32> = canvas
        .par_chunks_exact(4)
        .flat_map_iter(|px| {
            [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            ]
        })
        .collect();
    let input = Array4::<f32>::from_shape_vec((1, side, side, 3), normalized)
        .map_err(|err| anyhow!("failed to build input tensor: {err}"))?;

    Ok((input, letterbox))
}

/// Splits the flat model output into `[x, y, z]` triples, one per landmark,
/// in model-input coordinates.
pub fn decode_landmarks(flat: &[f32]) -> Result<[[f32; 3]; NUM_LANDMARKS]> {
    if flat.len() < NUM_LANDMARKS * 3 {
        return Err(anyhow!(
            "unexpected landmarks length: got {}, need {}",
            flat.len(),
            NUM_LANDMARKS * 3
        ));
    }

    let mut landmarks = [[0.0f32; 3]; NUM_LANDMARKS];
    for (slot, chunk) in landmarks.iter_mut().zip(flat.chunks_exact(3)) {
        slot.copy_from_slice(chunk);
    }
    Ok(landmarks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(
            vec![value; (width * height * 4) as usize],
            width,
            height,
        )
    }

    #[test]
    fn test_prepare_frame_letterboxes_landscape_input() {
        let frame = solid_frame(640, 480, 255);
        let (input, letterbox) = prepare_frame(&frame).unwrap();
        assert_eq!(input.shape(), &[1, 224, 224, 3]);

        // 640x480 scales to 224x168 with 28px bands above and below.
        assert_eq!(input[[0, 0, 112, 0]], 0.0);
        assert_eq!(input[[0, 112, 112, 0]], 1.0);
        assert_eq!(input[[0, 223, 112, 0]], 0.0);

        let (x, y) = letterbox.unproject(112.0, 112.0);
        assert!((x - 320.0).abs() < 1.0);
        assert!((y - 240.0).abs() < 1.0);
    }

    #[test]
    fn test_prepare_frame_rejects_short_buffer() {
        let mut frame = solid_frame(8, 8, 0);
        frame.rgba.truncate(10);
        assert!(prepare_frame(&frame).is_err());
    }

    #[test]
    fn test_unproject_clamps_to_frame_bounds() {
        let frame = solid_frame(100, 224, 0);
        let (_, letterbox) = prepare_frame(&frame).unwrap();
        let (x, y) = letterbox.unproject(-50.0, 500.0);
        assert_eq!(x, 0.0);
        assert_eq!(y, 223.0);
    }

    #[test]
    fn test_decode_landmarks_round_trip() {
        let mut flat = Vec::new();
        for i in 0..NUM_LANDMARKS {
            flat.extend_from_slice(&[i as f32, i as f32 + 0.5, 0.0]);
        }
        let landmarks = decode_landmarks(&flat).unwrap();
        assert_eq!(landmarks[0], [0.0, 0.5, 0.0]);
        assert_eq!(landmarks[20], [20.0, 20.5, 0.0]);
    }

    #[test]
    fn test_decode_landmarks_rejects_short_output() {
        assert!(decode_landmarks(&[0.0; 10]).is_err());
    }
}
