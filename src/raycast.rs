//! Image-space to world-space resolution for hand markers.

use crate::geom::Vec3;

/// Resolves a 2D image point to a 3D position on the estimated surface.
/// `None` is a miss; callers are expected to carry on without a hit.
pub trait SurfaceRaycaster: Send + 'static {
    fn cast(&self, x: f32, y: f32) -> Option<Vec3>;
}

/// Pinhole intrinsics for [`PlaneRaycaster`]. The camera sits at the origin
/// looking down -Z, with +X to the image right and +Y up.
#[derive(Clone, Copy, Debug)]
pub struct PlaneRaycasterConfig {
    /// Focal length in pixels.
    pub focal_px: f32,
    pub image_width: u32,
    pub image_height: u32,
    /// Distance of the assumed surface plane in front of the camera, meters.
    pub plane_distance: f32,
}

impl Default for PlaneRaycasterConfig {
    fn default() -> Self {
        Self {
            focal_px: 600.0,
            image_width: 640,
            image_height: 480,
            plane_distance: 0.5,
        }
    }
}

/// Intersects pixel rays with a fixed plane parallel to the image. A stand-in
/// for depth-sensing hit tests: every pixel inside the frame resolves, pixels
/// outside the frame miss.
pub struct PlaneRaycaster {
    cfg: PlaneRaycasterConfig,
}

impl PlaneRaycaster {
    pub fn new(cfg: PlaneRaycasterConfig) -> Self {
        Self { cfg }
    }

    pub fn for_image(width: u32, height: u32) -> Self {
        Self::new(PlaneRaycasterConfig {
            image_width: width,
            image_height: height,
            ..PlaneRaycasterConfig::default()
        })
    }
}

impl SurfaceRaycaster for PlaneRaycaster {
    fn cast(&self, x: f32, y: f32) -> Option<Vec3> {
        let cfg = &self.cfg;
        if x < 0.0 || y < 0.0 || x >= cfg.image_width as f32 || y >= cfg.image_height as f32 {
            return None;
        }

        let cx = cfg.image_width as f32 * 0.5;
        let cy = cfg.image_height as f32 * 0.5;
        // Unnormalized ray through the pixel; its z component is -1, so the
        // plane at z = -plane_distance is hit at t = plane_distance.
        let dir = Vec3::new((x - cx) / cfg.focal_px, (cy - y) / cfg.focal_px, -1.0);
        Some(dir * cfg.plane_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_pixel_hits_straight_ahead() {
        let caster = PlaneRaycaster::for_image(640, 480);
        let hit = caster.cast(320.0, 240.0).unwrap();
        assert_eq!(hit, Vec3::new(0.0, 0.0, -0.5));
    }

    #[test]
    fn test_offsets_follow_image_axes() {
        let caster = PlaneRaycaster::for_image(640, 480);
        let right = caster.cast(520.0, 240.0).unwrap();
        assert!(right.x > 0.0);
        assert_eq!(right.y, 0.0);
        let up = caster.cast(320.0, 40.0).unwrap();
        assert_eq!(up.x, 0.0);
        assert!(up.y > 0.0);
    }

    #[test]
    fn test_out_of_frame_pixels_miss() {
        let caster = PlaneRaycaster::for_image(640, 480);
        assert!(caster.cast(-1.0, 240.0).is_none());
        assert!(caster.cast(320.0, 480.0).is_none());
        assert!(caster.cast(640.0, 0.0).is_none());
    }

    #[test]
    fn test_hits_land_on_the_plane() {
        let caster = PlaneRaycaster::new(PlaneRaycasterConfig {
            plane_distance: 2.0,
            ..PlaneRaycasterConfig::default()
        });
        let hit = caster.cast(100.0, 100.0).unwrap();
        assert_eq!(hit.z, -2.0);
    }
}
