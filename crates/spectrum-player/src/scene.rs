use egui::epaint::Vertex;
use egui::{pos2, Color32, Mesh, Painter, PointerButton, Rect, Response, Shape, Stroke, TextureId, Ui};
use glam::{Mat4, Vec3};

use crate::bars::SpectrumBars;
use crate::camera::{project_with, OrbitControls, PerspectiveCamera};
use crate::config::PlayerConfig;

const GRID_CENTER_COLOR: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
const GRID_COLOR: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);

/// Camera, controls and the static helpers drawn around the bars.
pub struct Scene {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    grid: Vec<GridLine>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLine {
    pub from: Vec3,
    pub to: Vec3,
    pub center: bool,
}

impl Scene {
    pub fn new(config: &PlayerConfig) -> Self {
        let mut camera = PerspectiveCamera::new(config.fov_y_deg, 1.0, config.near, config.far);
        let controls = OrbitControls::new(config.camera_position.into(), config.camera_target.into());
        controls.update(&mut camera);
        Self {
            camera,
            controls,
            grid: grid_lines(config.grid_size, config.grid_divisions),
        }
    }

    /// Feed pointer input on the viewport into the orbit controls.
    pub fn handle_input(&mut self, ui: &Ui, response: &Response) {
        let height = response.rect.height();
        if response.dragged_by(PointerButton::Primary) {
            self.controls.rotate(response.drag_delta(), height);
        }
        if response.dragged_by(PointerButton::Secondary) {
            self.controls.pan(response.drag_delta(), height, self.camera.fov_y_deg);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.controls.dolly(scroll);
            }
        }
    }

    pub fn update(&mut self, viewport: Rect) {
        self.camera.fit(viewport);
        self.controls.update(&mut self.camera);
    }

    pub fn paint(&self, painter: &Painter, viewport: Rect, bars: Option<&SpectrumBars>, texture: Option<TextureId>) {
        let vp = self.camera.view_projection();

        for line in &self.grid {
            let (Some(a), Some(b)) = (
                project_with(&vp, line.from, viewport),
                project_with(&vp, line.to, viewport),
            ) else {
                continue;
            };
            let color = if line.center { GRID_CENTER_COLOR } else { GRID_COLOR };
            painter.line_segment([a, b], Stroke::new(1.0, color));
        }

        if let (Some(bars), Some(texture)) = (bars, texture) {
            let mesh = bar_mesh(bars, &vp, viewport, texture);
            if !mesh.is_empty() {
                painter.add(Shape::mesh(mesh));
            }
        }
    }
}

/// Square grid on the `y = 0` plane, `size` across, split into `divisions`
/// cells per side.
pub fn grid_lines(size: f32, divisions: u32) -> Vec<GridLine> {
    let half = size / 2.0;
    let step = size / divisions.max(1) as f32;
    let mid = divisions / 2;
    let mut lines = Vec::with_capacity(2 * (divisions as usize + 1));
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let center = divisions % 2 == 0 && i == mid;
        lines.push(GridLine {
            from: Vec3::new(-half, 0.0, k),
            to: Vec3::new(half, 0.0, k),
            center,
        });
        lines.push(GridLine {
            from: Vec3::new(k, 0.0, -half),
            to: Vec3::new(k, 0.0, half),
            center,
        });
    }
    lines
}

/// One textured quad per bar. Each quad's UVs are its clip rectangle, so
/// only that slice of the frame is visible; zero-height bars are skipped.
pub fn bar_mesh(bars: &SpectrumBars, view_projection: &Mat4, viewport: Rect, texture: TextureId) -> Mesh {
    let mut mesh = Mesh::with_texture(texture);
    let half_w = bars.bar_width() / 2.0;

    for bar in bars.bars() {
        if bar.height <= 0.0 {
            continue;
        }
        let cx = bars.center_x(bar.slot);
        let half_h = bars.full_height() * bar.height / 2.0;
        let corners = [
            Vec3::new(cx - half_w, half_h, 0.0),
            Vec3::new(cx + half_w, half_h, 0.0),
            Vec3::new(cx + half_w, -half_h, 0.0),
            Vec3::new(cx - half_w, -half_h, 0.0),
        ];
        let Some(screen) = project_quad(&corners, view_projection, viewport) else {
            continue;
        };

        // texture rows run top-down, clip rects bottom-up
        let clip = bar.clip;
        let uvs = [
            pos2(clip.min.x, 1.0 - clip.max.y),
            pos2(clip.max.x, 1.0 - clip.max.y),
            pos2(clip.max.x, 1.0 - clip.min.y),
            pos2(clip.min.x, 1.0 - clip.min.y),
        ];

        let base = mesh.vertices.len() as u32;
        for (pos, uv) in screen.into_iter().zip(uvs) {
            mesh.vertices.push(Vertex {
                pos,
                uv,
                color: Color32::WHITE,
            });
        }
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    mesh
}

fn project_quad(corners: &[Vec3; 4], view_projection: &Mat4, viewport: Rect) -> Option<[egui::Pos2; 4]> {
    let mut out = [egui::Pos2::ZERO; 4];
    for (slot, corner) in out.iter_mut().zip(corners) {
        *slot = project_with(view_projection, *corner, viewport)?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    fn front_camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        cam.position = Vec3::new(0.0, 0.0, 3.0);
        cam.target = Vec3::ZERO;
        cam
    }

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(600.0, 600.0))
    }

    #[test]
    fn grid_has_one_center_pair() {
        let lines = grid_lines(3.0, 10);
        assert_eq!(lines.len(), 22);
        assert_eq!(lines.iter().filter(|l| l.center).count(), 2);
        assert!(lines.iter().all(|l| l.from.y == 0.0 && l.to.y == 0.0));
    }

    #[test]
    fn mesh_skips_flat_bars_and_maps_clip_to_uv() {
        let mut bars = SpectrumBars::new(4, 4.0, 1.0, 0.0);
        bars.set_height(1, 0.5);
        bars.set_height(3, 1.0);
        let cam = front_camera();
        let mesh = bar_mesh(&bars, &cam.view_projection(), viewport(), TextureId::default());

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 12);

        let first = &mesh.vertices[..4];
        assert_eq!(first[0].uv, pos2(0.25, 0.25));
        assert_eq!(first[2].uv, pos2(0.5, 0.75));

        let last = &mesh.vertices[4..];
        assert_eq!(last[0].uv, pos2(0.75, 0.0));
        assert_eq!(last[2].uv, pos2(1.0, 1.0));
    }

    #[test]
    fn taller_bars_cover_more_screen() {
        let mut bars = SpectrumBars::new(2, 4.0, 1.0, 0.0);
        bars.set_height(0, 0.2);
        bars.set_height(1, 0.8);
        let cam = front_camera();
        let mesh = bar_mesh(&bars, &cam.view_projection(), viewport(), TextureId::default());
        let span = |q: &[Vertex]| q[3].pos.y - q[0].pos.y;
        assert!(span(&mesh.vertices[4..8]) > span(&mesh.vertices[0..4]));
        assert!(span(&mesh.vertices[0..4]) > 0.0);
    }
}
