use egui::{Pos2, Rect};
use glam::{Mat4, Vec3, Vec4};

use crate::camera::CameraState;

/// Smallest clip-space w that still projects to a finite position
const MIN_W: f32 = 1e-5;

/// World → screen mapping for one frame
pub struct Projector {
    view_proj: Mat4,
    rect: Rect,
}

impl Projector {
    pub fn new(state: &CameraState, rect: Rect) -> Self {
        Self {
            view_proj: state.view_projection(),
            rect,
        }
    }

    fn clip(&self, p: Vec3) -> Vec4 {
        self.view_proj * p.extend(1.0)
    }

    fn to_screen(&self, clip: Vec4) -> Pos2 {
        let ndc = clip.truncate() / clip.w;
        egui::pos2(
            self.rect.center().x + ndc.x * self.rect.width() * 0.5,
            self.rect.center().y - ndc.y * self.rect.height() * 0.5,
        )
    }

    /// Screen position of a point in front of the near plane
    pub fn point(&self, p: Vec3) -> Option<Pos2> {
        let c = self.clip(p);
        if c.z + c.w < 0.0 || c.w <= MIN_W {
            return None;
        }
        Some(self.to_screen(c))
    }

    /// Segment clipped against the near plane
    pub fn segment(&self, a: Vec3, b: Vec3) -> Option<[Pos2; 2]> {
        let mut ca = self.clip(a);
        let mut cb = self.clip(b);
        // Signed distance to the near plane in clip space (z = -w)
        let da = ca.z + ca.w;
        let db = cb.z + cb.w;
        if da < 0.0 && db < 0.0 {
            return None;
        }
        if da < 0.0 {
            ca = ca.lerp(cb, da / (da - db));
        } else if db < 0.0 {
            cb = cb.lerp(ca, db / (db - da));
        }
        if ca.w <= MIN_W || cb.w <= MIN_W {
            return None;
        }
        Some([self.to_screen(ca), self.to_screen(cb)])
    }

    /// Whether a counter-clockwise triangle faces the camera.
    /// `None` when part of it is behind the near plane.
    pub fn is_front_facing(&self, tri: &[Vec3; 3]) -> Option<bool> {
        let [a, b, c] = [self.point(tri[0])?, self.point(tri[1])?, self.point(tri[2])?];
        // Screen y points down, so counter-clockwise in NDC is negative here
        let area = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
        Some(area < 0.0)
    }
}
