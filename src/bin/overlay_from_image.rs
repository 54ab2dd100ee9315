//! Runs hand pose estimation on a single image and writes an annotated copy.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use image::{Rgba, RgbaImage};
use pose_overlay::{
    Frame, HandOverlayConfig,
    model_download::{default_model_path, ensure_model_available},
    skeleton::{HAND_BONES, HandJoint},
    vision::{HandObservation, HandPoseEstimator, OrtHandPoseEstimator},
};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: overlay_from_image <input> [output] [model]"))?;
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("overlay.png"));
    let model_path = args.next().map(PathBuf::from).unwrap_or_else(default_model_path);

    let image = image::open(&input_path)
        .with_context(|| format!("failed to open image {}", input_path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let frame = Frame::new(image.as_raw().clone(), width, height);

    ensure_model_available(&model_path)?;
    let mut estimator = OrtHandPoseEstimator::new(&model_path)?;

    println!(
        "Running inference with model {} on {}",
        model_path.display(),
        input_path.display()
    );
    let observation = estimator.estimate(&frame).context("inference failed")?;
    let Some(observation) = observation else {
        println!("No hand found in {}", input_path.display());
        return Ok(());
    };

    let mut canvas = image;
    let threshold = HandOverlayConfig::default().confidence_threshold;
    let drawn = draw_hand(&mut canvas, &observation, threshold);
    println!("Drew {} of {} bone segments", drawn, HAND_BONES.len());

    canvas
        .save(&output_path)
        .with_context(|| format!("failed to save {}", output_path.display()))?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

/// Draws the confidence-gated skeleton onto the image. Returns the number of
/// bone segments that passed the gate.
fn draw_hand(image: &mut RgbaImage, observation: &HandObservation, threshold: f32) -> usize {
    let bone_color = Rgba([255, 255, 255, 255]);
    let mut drawn = 0;
    for &(a, b) in HAND_BONES.iter() {
        let (Some(pa), Some(pb)) = (observation.point(a), observation.point(b)) else {
            continue;
        };
        if pa.confidence <= threshold || pb.confidence <= threshold {
            continue;
        }
        draw_line(image, (pa.x, pa.y), (pb.x, pb.y), bone_color);
        drawn += 1;
    }

    let marker_color = Rgba([56, 163, 255, 255]);
    for joint in HandJoint::ALL {
        let Some(point) = observation.point(joint) else { continue };
        if point.confidence <= threshold {
            continue;
        }
        draw_circle(image, (point.x as i32, point.y as i32), 3, marker_color);
    }

    drawn
}

fn draw_line(image: &mut RgbaImage, p0: (f32, f32), p1: (f32, f32), color: Rgba<u8>) {
    let (mut x0, mut y0) = (p0.0 as i32, p0.1 as i32);
    let (x1, y1) = (p1.0 as i32, p1.1 as i32);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_safe(image, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(image: &mut RgbaImage, center: (i32, i32), radius: i32, color: Rgba<u8>) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(image, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(image: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux < image.width() && uy < image.height() {
        image.put_pixel(ux, uy, color);
    }
}
