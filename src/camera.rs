//! Camera and pointer picking
//!
//! Pointer positions become world-space rays which are tested against the
//! blocks (vertical cylinders) and against the horizontal plane a dragged
//! block slides along.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

const PARALLEL_EPSILON: f32 = 1e-6;

/// A world-space ray with normalized direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Intersect with the horizontal plane at height `y`
    ///
    /// Returns None if the ray is parallel to the plane or the plane is behind it.
    pub fn intersect_plane_y(&self, y: f32) -> Option<Vec3> {
        if self.dir.y.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (y - self.origin.y) / self.dir.y;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Distance along the ray to a capped cylinder standing on the Y axis
    ///
    /// `center` is the middle of the cylinder; it extends `half_height`
    /// above and below. Returns the nearest non-negative hit distance.
    pub fn intersect_vertical_cylinder(
        &self,
        center: Vec3,
        radius: f32,
        half_height: f32,
    ) -> Option<f32> {
        let oc = self.origin - center;
        let d = self.dir;
        let r2 = radius * radius;
        let mut best: Option<f32> = None;
        let mut consider = |t: f32| {
            if t >= 0.0 && best.is_none_or(|b| t < b) {
                best = Some(t);
            }
        };

        // Side wall: solve |(oc + d t).xz| = r
        let a = d.x * d.x + d.z * d.z;
        if a > PARALLEL_EPSILON {
            let b = 2.0 * (oc.x * d.x + oc.z * d.z);
            let c = oc.x * oc.x + oc.z * oc.z - r2;
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let sq = disc.sqrt();
                for t in [(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)] {
                    if (oc.y + d.y * t).abs() <= half_height {
                        consider(t);
                    }
                }
            }
        }

        // Caps
        if d.y.abs() > PARALLEL_EPSILON {
            for cap in [half_height, -half_height] {
                let t = (cap - oc.y) / d.y;
                let p = oc + d * t;
                if p.x * p.x + p.z * p.z <= r2 {
                    consider(t);
                }
            }
        }

        best
    }
}

/// Perspective camera looking at the cylinder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::from_array(CAMERA_POSITION),
            target: Vec3::from_array(CAMERA_TARGET),
            fov_y: CAMERA_FOV_DEGREES.to_radians(),
            aspect: aspect.max(f32::EPSILON),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the eye through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let through = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, through - self.position)
    }

    /// Ray through a pixel of a `width` x `height` viewport
    pub fn ray_from_screen(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        self.ray_from_ndc(screen_to_ndc(x, y, width, height))
    }

    /// Project a world point into NDC (None when behind the camera)
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }
}

/// Convert a pixel position to normalized device coordinates (Y up)
#[inline]
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        (x / width.max(1.0)) * 2.0 - 1.0,
        -(y / height.max(1.0)) * 2.0 + 1.0,
    )
}

/// Convert NDC back to a pixel position
#[inline]
pub fn ndc_to_screen(ndc: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_looks_down_negative_z() {
        let camera = Camera::new(16.0 / 9.0);
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        assert!((ray.origin - Vec3::new(0.0, 10.0, 40.0)).length() < 1e-5);
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_project_inverts_ray() {
        let camera = Camera::new(1.5);
        let ndc = Vec2::new(0.3, -0.4);
        let ray = camera.ray_from_ndc(ndc);
        let p = camera.project(ray.at(25.0)).unwrap();
        assert!((p.truncate() - ndc).length() < 1e-3);
        // Point behind the eye
        assert!(camera.project(Vec3::new(0.0, 10.0, 80.0)).is_none());
    }

    #[test]
    fn test_set_aspect_ignores_empty_canvas() {
        let mut camera = Camera::new(1.0);
        camera.set_aspect(800.0, 400.0);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
        camera.set_aspect(0.0, 400.0);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
        // Edge of the screen still maps back onto the widened frustum
        let ray = camera.ray_from_screen(800.0, 200.0, 800.0, 400.0);
        let p = camera.project(ray.at(25.0)).unwrap();
        assert!((p.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_screen_ndc_round_trip() {
        let ndc = screen_to_ndc(200.0, 150.0, 800.0, 600.0);
        assert!((ndc - Vec2::new(-0.5, 0.5)).length() < 1e-6);
        let px = ndc_to_screen(ndc, 800.0, 600.0);
        assert!((px - Vec2::new(200.0, 150.0)).length() < 1e-3);
    }

    #[test]
    fn test_plane_intersection() {
        let ray = Ray::new(Vec3::new(1.0, 10.0, 2.0), Vec3::NEG_Y);
        let hit = ray.intersect_plane_y(2.5).unwrap();
        assert!((hit - Vec3::new(1.0, 2.5, 2.0)).length() < 1e-6);
        // Plane behind the ray
        assert!(ray.intersect_plane_y(20.0).is_none());
        // Parallel
        let flat = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(flat.intersect_plane_y(1.0).is_none());
    }

    #[test]
    fn test_cylinder_side_and_cap_hits() {
        let center = Vec3::new(0.0, 0.0, 9.0);
        // Head-on from +Z hits the side wall at z = 10.5
        let ray = Ray::new(Vec3::new(0.0, 0.0, 40.0), Vec3::NEG_Z);
        let t = ray.intersect_vertical_cylinder(center, 1.5, 1.0).unwrap();
        assert!((t - 29.5).abs() < 1e-4);

        // Straight down hits the top cap
        let ray = Ray::new(Vec3::new(0.5, 20.0, 9.0), Vec3::NEG_Y);
        let t = ray.intersect_vertical_cylinder(center, 1.5, 1.0).unwrap();
        assert!((ray.at(t).y - 1.0).abs() < 1e-4);

        // Passing above misses
        let ray = Ray::new(Vec3::new(0.0, 1.5, 40.0), Vec3::NEG_Z);
        assert!(ray.intersect_vertical_cylinder(center, 1.5, 1.0).is_none());

        // Passing beside misses
        let ray = Ray::new(Vec3::new(3.0, 0.0, 40.0), Vec3::NEG_Z);
        assert!(ray.intersect_vertical_cylinder(center, 1.5, 1.0).is_none());
    }
}
