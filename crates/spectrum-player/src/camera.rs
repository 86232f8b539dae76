use std::f32::consts::{PI, TAU};

use egui::{pos2, Pos2, Rect, Vec2};
use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point, `y` up.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_deg,
            near,
            far,
            aspect,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
        }
    }

    /// Follow the viewport so the scene is never stretched.
    pub fn fit(&mut self, viewport: Rect) {
        if viewport.height() > 0.0 {
            self.aspect = viewport.width() / viewport.height();
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let proj = Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        proj * view
    }

    /// Screen position of a world point, or `None` when it is behind the
    /// camera.
    pub fn project(&self, point: Vec3, viewport: Rect) -> Option<Pos2> {
        project_with(&self.view_projection(), point, viewport)
    }
}

/// Same as [`PerspectiveCamera::project`] with a precomputed matrix, for
/// projecting many points per frame.
pub fn project_with(view_projection: &Mat4, point: Vec3, viewport: Rect) -> Option<Pos2> {
    let clip = *view_projection * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let center = viewport.center();
    Some(pos2(
        center.x + ndc.x * viewport.width() / 2.0,
        center.y - ndc.y * viewport.height() / 2.0,
    ))
}

/// Mouse orbit around a target: primary drag rotates, scroll dollies,
/// secondary drag pans.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    radius: f32,
    // azimuth around +y, measured from +z
    theta: f32,
    // polar angle from +y
    phi: f32,
    pub rotate_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl OrbitControls {
    const POLE_EPS: f32 = 1e-4;

    pub fn new(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(1e-3);
        Self {
            target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            rotate_speed: 1.0,
            min_radius: 0.05,
            max_radius: 500.0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius * Vec3::new(sin_phi * self.theta.sin(), self.phi.cos(), sin_phi * self.theta.cos())
    }

    /// Drag by `delta` pixels; a drag across the full viewport height turns
    /// one full revolution.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.theta -= TAU * delta.x / viewport_height * self.rotate_speed;
        self.phi = (self.phi - TAU * delta.y / viewport_height * self.rotate_speed)
            .clamp(Self::POLE_EPS, PI - Self::POLE_EPS);
    }

    /// Positive `scroll` moves closer.
    pub fn dolly(&mut self, scroll: f32) {
        let scale = 0.95_f32.powf(scroll / 50.0);
        self.radius = (self.radius * scale).clamp(self.min_radius, self.max_radius);
    }

    /// Move the target in the view plane so the grabbed point follows the
    /// pointer.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32, fov_y_deg: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let units_per_px = 2.0 * self.radius * (fov_y_deg.to_radians() / 2.0).tan() / viewport_height;
        self.target += (-right * delta.x + up * delta.y) * units_per_px;
    }

    pub fn update(&self, camera: &mut PerspectiveCamera) {
        camera.position = self.position();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    #[test]
    fn target_lands_at_viewport_center() {
        let mut cam = PerspectiveCamera::new(75.0, 800.0 / 600.0, 0.1, 1000.0);
        cam.position = Vec3::new(-1.19, 0.40, 1.75);
        cam.target = Vec3::new(-0.35, -0.10, -0.52);
        let p = cam.project(cam.target, viewport()).unwrap();
        assert!((p.x - 400.0).abs() < 1e-2 && (p.y - 300.0).abs() < 1e-2, "{p:?}");
    }

    #[test]
    fn points_behind_are_rejected() {
        let cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        assert!(cam.project(Vec3::new(0.0, 0.0, 10.0), viewport()).is_none());
        assert!(cam.project(Vec3::new(0.0, 0.0, -10.0), viewport()).is_some());
    }

    #[test]
    fn up_is_up_on_screen() {
        let cam = PerspectiveCamera::new(75.0, 800.0 / 600.0, 0.1, 1000.0);
        let above = cam.project(Vec3::new(0.0, 1.0, 0.0), viewport()).unwrap();
        assert!(above.y < 300.0);
    }

    #[test]
    fn fit_tracks_viewport() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        cam.fit(Rect::from_min_size(Pos2::ZERO, egui::vec2(1200.0, 400.0)));
        assert_eq!(cam.aspect, 3.0);
    }

    #[test]
    fn orbit_round_trips_initial_position() {
        let start = Vec3::new(-1.194_309_5, 0.404_545_8, 1.746_450_5);
        let target = Vec3::new(-0.353_773_1, -0.104_303_06, -0.516_073_5);
        let controls = OrbitControls::new(start, target);
        assert!(controls.position().distance(start) < 1e-4);
    }

    #[test]
    fn rotate_keeps_distance_and_avoids_poles() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO);
        controls.rotate(egui::vec2(120.0, -5000.0), 600.0);
        let p = controls.position();
        assert!((p.length() - 3.0).abs() < 1e-4);
        assert!(p.y < 3.0);
    }

    #[test]
    fn dolly_in_and_clamp() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO);
        controls.dolly(50.0);
        assert!((controls.radius() - 1.9).abs() < 1e-5);
        controls.dolly(1e6);
        assert_eq!(controls.radius(), controls.min_radius);
    }

    #[test]
    fn pan_moves_target_sideways() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO);
        controls.pan(egui::vec2(100.0, 0.0), 600.0, 75.0);
        assert!(controls.target.x < 0.0);
        assert!(controls.target.y.abs() < 1e-6);
    }
}
