use crate::{
    core::{
        constants::TILE_SIZE,
        geo::{LatLng, Point},
        map::Map as CoreMap,
    },
    input::InputEvent,
    widget::{surface::HeadlessBackend, MapWidget},
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2, Widget};

const MARKER_RADIUS: f32 = 7.0;

/// Paints a headless [`MapWidget`] and feeds clicks, drags and zoom back
/// into it.
pub struct MapView<'a> {
    widget: &'a mut MapWidget<HeadlessBackend>,
    size: Option<Vec2>,
    show_controls: bool,
    show_attribution: bool,
}

impl<'a> MapView<'a> {
    pub fn new(widget: &'a mut MapWidget<HeadlessBackend>) -> Self {
        Self {
            widget,
            size: None,
            show_controls: true,
            show_attribution: true,
        }
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.size = Some(size);
        self
    }

    pub fn controls(mut self, show: bool) -> Self {
        self.show_controls = show;
        self
    }

    pub fn attribution(mut self, show: bool) -> Self {
        self.show_attribution = show;
        self
    }
}

fn to_screen(map: &CoreMap, rect: Rect, lat_lng: &LatLng) -> Pos2 {
    let p = map.viewport.lat_lng_to_pixel(lat_lng);
    Pos2::new(rect.left() + p.x as f32, rect.top() + p.y as f32)
}

fn paint_grid(ui: &Ui, map: &CoreMap, rect: Rect) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, Color32::from_rgb(242, 239, 233));

    // Tile seams, so panning and zooming are visible without tile images
    let origin = map.viewport.project(&map.viewport.center, None);
    let tile = TILE_SIZE as f64;
    let left = origin.x - map.viewport.size.x / 2.0;
    let top = origin.y - map.viewport.size.y / 2.0;
    let stroke = Stroke::new(1.0, Color32::from_gray(220));

    let mut x = (left / tile).ceil() * tile - left;
    while x < map.viewport.size.x {
        let sx = rect.left() + x as f32;
        painter.line_segment([Pos2::new(sx, rect.top()), Pos2::new(sx, rect.bottom())], stroke);
        x += tile;
    }
    let mut y = (top / tile).ceil() * tile - top;
    while y < map.viewport.size.y {
        let sy = rect.top() + y as f32;
        painter.line_segment([Pos2::new(rect.left(), sy), Pos2::new(rect.right(), sy)], stroke);
        y += tile;
    }
}

fn paint_overlays(ui: &Ui, map: &CoreMap, rect: Rect) {
    let painter = ui.painter_at(rect);

    for line in map.polylines() {
        let style = line.style();
        let points: Vec<Pos2> = line
            .points()
            .iter()
            .map(|p| to_screen(map, rect, p))
            .collect();
        painter.add(egui::Shape::line(
            points,
            Stroke::new(
                style.width,
                Color32::from(style.color).gamma_multiply(style.opacity),
            ),
        ));
    }

    for marker in map.markers() {
        let at = to_screen(map, rect, &marker.position());
        painter.circle(
            at,
            MARKER_RADIUS,
            Color32::from_rgb(42, 129, 203),
            Stroke::new(2.0, Color32::WHITE),
        );
        if let Some(label) = marker.tooltip() {
            painter.text(
                at + Vec2::new(0.0, -MARKER_RADIUS - 4.0),
                Align2::CENTER_BOTTOM,
                label,
                FontId::proportional(12.0),
                Color32::BLACK,
            );
        }
    }
}

fn zoom_button(ui: &mut Ui, rect: Rect, text: &str) -> bool {
    let response = ui.allocate_rect(rect, Sense::click());
    ui.painter().rect_filled(
        rect,
        3.0,
        Color32::from_rgba_unmultiplied(255, 255, 255, 220),
    );
    ui.painter()
        .rect_stroke(rect, 3.0, Stroke::new(1.0, Color32::from_gray(100)));
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(16.0),
        Color32::BLACK,
    );
    response.clicked()
}

impl Widget for MapView<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let desired_size = self.size.unwrap_or_else(|| ui.available_size());
        let (rect, mut response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());

        let Some(map) = self.widget.surface_mut().engine_mut() else {
            ui.painter().rect_filled(rect, 0.0, Color32::from_gray(200));
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Map unavailable",
                FontId::proportional(14.0),
                Color32::from_gray(80),
            );
            return response;
        };

        if let Err(e) = map.handle_input(InputEvent::Resize {
            size: Point::new(rect.width() as f64, rect.height() as f64),
        }) {
            log::warn!("map resize failed: {e}");
        }

        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.5 {
                if let Err(e) = map.handle_input(InputEvent::Drag {
                    delta: Point::new(delta.x as f64, delta.y as f64),
                }) {
                    log::warn!("map pan failed: {e}");
                }
                response.mark_changed();
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                let step = if scroll > 0.0 { 1.0 } else { -1.0 };
                let center = map.viewport.center;
                if let Err(e) = map.set_view(center, (map.zoom() + step).round()) {
                    log::warn!("map zoom failed: {e}");
                }
                response.mark_changed();
            }
        }

        paint_grid(ui, map, rect);
        paint_overlays(ui, map, rect);

        if self.show_attribution {
            if let Some(tiles) = map.tile_layer() {
                ui.painter().text(
                    rect.left_bottom() + Vec2::new(5.0, -5.0),
                    Align2::LEFT_BOTTOM,
                    tiles.attribution(),
                    FontId::proportional(10.0),
                    Color32::from_gray(120),
                );
            }
        }

        let clicked_at = if response.clicked() {
            response.interact_pointer_pos().map(|pos| {
                map.viewport.pixel_to_lat_lng(&Point::new(
                    (pos.x - rect.left()) as f64,
                    (pos.y - rect.top()) as f64,
                ))
            })
        } else {
            None
        };

        if self.show_controls {
            let zoom = map.zoom();
            let center = map.viewport.center;
            let zoom_in_rect = Rect::from_min_size(
                rect.right_top() + Vec2::new(-40.0, 10.0),
                Vec2::splat(30.0),
            );
            let zoom_out_rect = Rect::from_min_size(
                rect.right_top() + Vec2::new(-40.0, 45.0),
                Vec2::splat(30.0),
            );
            if zoom_button(ui, zoom_in_rect, "+") {
                if let Err(e) = map.set_view(center, zoom + 1.0) {
                    log::warn!("map zoom in failed: {e}");
                }
                response.mark_changed();
            }
            if zoom_button(ui, zoom_out_rect, "−") {
                if let Err(e) = map.set_view(center, zoom - 1.0) {
                    log::warn!("map zoom out failed: {e}");
                }
                response.mark_changed();
            }
        }

        if let Some(at) = clicked_at {
            if self.widget.click_and_spawn(at).is_some() {
                response.mark_changed();
            }
        }

        response
    }
}
