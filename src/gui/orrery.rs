//! Orrery canvas rendering.
//!
//! Draws the system top-down: orbit guide circles around each body's
//! parent, bodies as filled circles colored by kind, and name labels.
//! The canvas owns the drag-pan and scroll-zoom interaction; all
//! position math is delegated to the core.

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use crate::core::body::{BodyKind, CelestialBody};
use crate::core::config::{ColorSettings, MAX_ZOOM, MIN_ZOOM};
use crate::core::system::SystemMap;

/// Pixels per metre at zoom 1. A 1.5e10 m orbit (roughly 0.1 AU) spans
/// 15 px, so an inner system fits the default window.
pub const BASE_SCALE: f64 = 1.0e-9;

/// Scroll-wheel zoom sensitivity (exponent per scroll unit).
const ZOOM_SPEED: f32 = 0.002;

/// Minimum zoom at which non-star labels are drawn.
const LABEL_MIN_ZOOM: f32 = 0.5;

/// Body dot radii in pixels.
const STAR_RADIUS: f32 = 8.0;
const PLANET_RADIUS: f32 = 5.0;
const MOON_RADIUS: f32 = 3.0;

/// Pan and zoom state for the orrery canvas.
///
/// The origin (system root anchor) sits at the canvas centre plus the
/// pan offset; zoom scales orbital distances only, never the origin.
#[derive(Debug, Clone, Copy)]
pub struct ViewState {
    /// Pan offset in pixels, applied to the canvas centre.
    pub pan: Vec2,
    /// Zoom multiplier on top of [`BASE_SCALE`].
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewState {
    /// The pan-adjusted canvas origin where root bodies anchor.
    pub fn origin(&self, canvas: Rect) -> Pos2 {
        canvas.center() + self.pan
    }

    /// Current metres-to-pixels factor.
    pub fn scale(&self) -> f64 {
        BASE_SCALE * self.zoom as f64
    }

    /// Zoom by a scroll delta, keeping the point under `pointer` fixed.
    pub fn zoom_about(&mut self, pointer: Pos2, canvas: Rect, scroll_delta: f32) {
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * (scroll_delta * ZOOM_SPEED).exp()).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == old_zoom {
            return;
        }
        let offset = pointer - self.origin(canvas);
        self.pan += offset * (1.0 - new_zoom / old_zoom);
        self.zoom = new_zoom;
    }

    /// Adjust the pan so `body_id` lands on the canvas centre at the
    /// given animation time.
    pub fn center_on(&mut self, map: &SystemMap, body_id: u64, canvas: Rect, elapsed_secs: f64) {
        let origin = self.origin(canvas);
        let (x, y) = map.resolve_position(
            body_id,
            (origin.x as f64, origin.y as f64),
            elapsed_secs,
            self.scale(),
        );
        self.pan += canvas.center() - Pos2::new(x as f32, y as f32);
    }
}

/// Renders the orrery for one frame.
pub struct OrreryRenderer<'a> {
    map: &'a SystemMap,
    colors: &'a ColorSettings,
    selected: Option<u64>,
    elapsed_secs: f64,
}

impl<'a> OrreryRenderer<'a> {
    pub fn new(
        map: &'a SystemMap,
        colors: &'a ColorSettings,
        selected: Option<u64>,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            map,
            colors,
            selected,
            elapsed_secs,
        }
    }

    /// Draw the canvas and handle pan/zoom input. Returns the canvas
    /// rect so the app can centre on tree selections.
    pub fn render(&self, ui: &mut egui::Ui, view: &mut ViewState) -> Rect {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas = response.rect;

        if response.dragged() {
            view.pan += response.drag_delta();
        }
        if let Some(pointer) = response.hover_pos() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                view.zoom_about(pointer, canvas, scroll);
            }
        }

        painter.rect_filled(canvas, 0.0, self.colors.background_color());

        if self.map.is_empty() {
            self.draw_placeholder(&painter, canvas);
            return canvas;
        }

        let origin = view.origin(canvas);
        let origin_f64 = (origin.x as f64, origin.y as f64);
        let scale = view.scale();

        // Stable draw order so overlapping dots do not flicker.
        let mut bodies: Vec<&CelestialBody> = self.map.bodies().collect();
        bodies.sort_by_key(|b| b.id);

        for body in &bodies {
            self.draw_orbit(&painter, body, origin_f64, scale);
        }
        for body in &bodies {
            self.draw_body(&painter, body, origin_f64, scale, view.zoom);
        }

        canvas
    }

    /// Orbit guide: a circle of the semi-major axis around the parent's
    /// resolved position. Schematic only, eccentricity is not drawn.
    fn draw_orbit(
        &self,
        painter: &egui::Painter,
        body: &CelestialBody,
        origin: (f64, f64),
        scale: f64,
    ) {
        let Some(parent) = body.parent.filter(|&p| p != 0) else {
            return;
        };
        if self.map.body(parent).is_none() {
            return;
        }
        let radius = (body.elements.semi_major_axis * scale) as f32;
        if radius < 1.0 {
            return;
        }
        let (px, py) = self
            .map
            .resolve_position(parent, origin, self.elapsed_secs, scale);
        painter.circle_stroke(
            Pos2::new(px as f32, py as f32),
            radius,
            Stroke::new(1.0, self.colors.orbit_color()),
        );
    }

    fn draw_body(
        &self,
        painter: &egui::Painter,
        body: &CelestialBody,
        origin: (f64, f64),
        scale: f64,
        zoom: f32,
    ) {
        let (x, y) = self
            .map
            .resolve_position(body.id, origin, self.elapsed_secs, scale);
        let pos = Pos2::new(x as f32, y as f32);

        let (radius, color) = match body.kind {
            BodyKind::Star => (STAR_RADIUS, self.colors.star_color()),
            BodyKind::Planet => (PLANET_RADIUS, self.colors.planet_color()),
            BodyKind::Moon => (MOON_RADIUS, self.colors.moon_color()),
        };
        painter.circle_filled(pos, radius, color);

        let selected = self.selected == Some(body.id);
        if selected {
            painter.circle_stroke(
                pos,
                radius + 3.0,
                Stroke::new(1.5, self.colors.selection_color()),
            );
        }

        let show_label = selected || body.kind == BodyKind::Star || zoom >= LABEL_MIN_ZOOM;
        if show_label {
            painter.text(
                pos + Vec2::new(radius + 4.0, 0.0),
                Align2::LEFT_CENTER,
                &body.name,
                FontId::proportional(12.0),
                self.colors.label_color(),
            );
        }
    }

    fn draw_placeholder(&self, painter: &egui::Painter, canvas: Rect) {
        painter.text(
            canvas.center(),
            Align2::CENTER_CENTER,
            "Waiting for scan events from the journal...",
            FontId::proportional(16.0),
            Color32::DARK_GRAY,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::journal::parse_line;

    fn canvas() -> Rect {
        Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(800.0, 600.0))
    }

    #[test]
    fn test_origin_is_centre_plus_pan() {
        let mut view = ViewState::default();
        assert_eq!(view.origin(canvas()), Pos2::new(400.0, 300.0));
        view.pan = Vec2::new(-50.0, 25.0);
        assert_eq!(view.origin(canvas()), Pos2::new(350.0, 325.0));
    }

    #[test]
    fn test_zoom_about_clamps() {
        let mut view = ViewState::default();
        view.zoom_about(Pos2::new(400.0, 300.0), canvas(), f32::MAX);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_about(Pos2::new(400.0, 300.0), canvas(), f32::MIN);
        assert_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_zoom_about_keeps_pointer_fixed() {
        let mut view = ViewState::default();
        let pointer = Pos2::new(500.0, 200.0);
        let before = pointer - view.origin(canvas());
        let zoom_before = view.zoom;

        view.zoom_about(pointer, canvas(), 120.0);

        let after = pointer - view.origin(canvas());
        let ratio = view.zoom / zoom_before;
        assert!((after.x - before.x * ratio).abs() < 1e-3);
        assert!((after.y - before.y * ratio).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_at_origin_does_not_pan() {
        let mut view = ViewState::default();
        view.zoom_about(view.origin(canvas()), canvas(), 120.0);
        assert_eq!(view.pan, Vec2::ZERO);
    }

    #[test]
    fn test_center_on_root_body() {
        let mut map = SystemMap::new();
        map.apply(
            parse_line(r#"{"event":"Scan","BodyID":1,"BodyName":"Star","StarType":"M"}"#)
                .unwrap()
                .unwrap(),
        );
        let mut view = ViewState {
            pan: Vec2::new(123.0, -45.0),
            zoom: 2.0,
        };
        view.center_on(&map, 1, canvas(), 0.0);

        // The root now resolves exactly to the canvas centre.
        let origin = view.origin(canvas());
        let pos = map.resolve_position(
            1,
            (origin.x as f64, origin.y as f64),
            0.0,
            view.scale(),
        );
        assert_eq!(pos, (400.0, 300.0));
    }

    #[test]
    fn test_center_on_orbiting_body() {
        let mut map = SystemMap::new();
        map.apply(
            parse_line(r#"{"event":"Scan","BodyID":1,"BodyName":"Star","StarType":"M"}"#)
                .unwrap()
                .unwrap(),
        );
        map.apply(
            parse_line(
                r#"{"event":"Scan","BodyID":2,"BodyName":"P","Parents":[{"Star":1}],"SemiMajorAxis":2.0e10,"OrbitalPeriod":1000}"#,
            )
            .unwrap()
            .unwrap(),
        );
        let mut view = ViewState::default();
        view.center_on(&map, 2, canvas(), 250.0);

        let origin = view.origin(canvas());
        let (x, y) = map.resolve_position(
            2,
            (origin.x as f64, origin.y as f64),
            250.0,
            view.scale(),
        );
        assert!((x - 400.0).abs() < 1e-3 && (y - 300.0).abs() < 1e-3);
    }
}
