//! Overlay rasterization: routes, symbols, labels, and free text.
//!
//! The same routine serves the interactive canvas (selection highlight,
//! route vertex handles, phase/group captions) and the flattened export,
//! which draws only what belongs on paper.

use crate::fonts;
use crate::symbols::SymbolImageCache;
use resvg::usvg;
use sibelplan_core::camera::ViewTransform;
use sibelplan_core::inventory::Inventory;
use sibelplan_core::objects::{AnnotationObject, ObjectId, RouteObject, SymbolObject, TextObject};
use sibelplan_core::store::PageObjects;
use tiny_skia::{
    LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

const SELECTED_RGB: (u8, u8, u8) = (0x22, 0xc5, 0x5e);
const ROUTE_RGB: (u8, u8, u8) = (0x38, 0xbd, 0xf8);
const TEXT_RGB: (u8, u8, u8) = (0xe5, 0xe7, 0xeb);
const LABEL_RGB: (u8, u8, u8) = (0xcb, 0xd5, 0xe1);
const SECONDARY_RGB: (u8, u8, u8) = (0x94, 0xa3, 0xb8);

const ROUTE_STROKE_WIDTH: f32 = 5.0;
const ROUTE_VERTEX_RADIUS: f32 = 5.0;
const SELECTION_STROKE_WIDTH: f32 = 3.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const LABEL_OFFSET: f64 = 16.0;
const SECONDARY_FONT_SIZE: f64 = 10.0;
const SECONDARY_OFFSET: f64 = 30.0;

/// Text is rasterized above its display size so zooming in stays legible.
const TEXT_RASTER_SCALE: f32 = 2.0;

/// What the overlay is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    /// On-screen editing: selection highlight, route vertex handles, and
    /// phase/group captions are drawn.
    Interactive { selection: Option<ObjectId> },
    /// Flattened output: editing aids are omitted.
    Export,
}

impl RenderMode {
    fn selection(&self) -> Option<ObjectId> {
        match self {
            RenderMode::Interactive { selection } => *selection,
            RenderMode::Export => None,
        }
    }

    fn is_export(&self) -> bool {
        matches!(self, RenderMode::Export)
    }
}

fn solid_paint((r, g, b): (u8, u8, u8)) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);
    paint.anti_alias = true;
    paint
}

fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Combine a symbol's label and circuit the way the detail panel shows them:
/// `label (circuit)`, degrading gracefully when either is empty and never
/// repeating a circuit the label already carries.
pub fn format_circuit_label(label: &str, circuit: &str) -> String {
    if circuit.is_empty() {
        return label.to_string();
    }
    if label.is_empty() {
        return format!("({circuit})");
    }
    if label.contains(&format!("({circuit})")) {
        return label.to_string();
    }
    format!("{label} ({circuit})")
}

/// Draw one page's annotations onto `target` through the view transform.
///
/// Symbols whose image is not in the cache are skipped (they still count in
/// the returned inventory). The target is not cleared first, so the caller
/// can composite directly over a rendered plan page.
pub fn render_overlay(
    target: &mut Pixmap,
    page: &PageObjects,
    camera: &ViewTransform,
    cache: &SymbolImageCache,
    mode: RenderMode,
) -> Inventory {
    let cam = Transform::from_row(
        camera.zoom as f32,
        0.0,
        0.0,
        camera.zoom as f32,
        camera.pan.x as f32,
        camera.pan.y as f32,
    );

    for obj in &page.objects {
        let selected = mode.selection() == Some(obj.id());
        match obj {
            AnnotationObject::Route(route) => draw_route(target, route, selected, mode, cam),
            AnnotationObject::Symbol(sym) => draw_symbol(target, sym, cache, selected, mode, cam),
            AnnotationObject::Text(text) => draw_text_object(target, text, selected, cam),
        }
    }

    Inventory::for_page(page)
}

fn draw_route(target: &mut Pixmap, route: &RouteObject, selected: bool, mode: RenderMode, cam: Transform) {
    let color = if selected { SELECTED_RGB } else { ROUTE_RGB };
    let paint = solid_paint(color);

    if route.points.len() >= 2 {
        let mut pb = PathBuilder::new();
        pb.move_to(route.points[0].x as f32, route.points[0].y as f32);
        for p in &route.points[1..] {
            pb.line_to(p.x as f32, p.y as f32);
        }
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: ROUTE_STROKE_WIDTH,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            target.stroke_path(&path, &paint, &stroke, cam, None);
        }
    }

    // Vertex handles are an editing aid only.
    if !mode.is_export() {
        for p in &route.points {
            if let Some(circle) =
                PathBuilder::from_circle(p.x as f32, p.y as f32, ROUTE_VERTEX_RADIUS)
            {
                target.fill_path(&circle, &paint, tiny_skia::FillRule::Winding, cam, None);
            }
        }
    }
}

fn draw_symbol(
    target: &mut Pixmap,
    sym: &SymbolObject,
    cache: &SymbolImageCache,
    selected: bool,
    mode: RenderMode,
    cam: Transform,
) {
    let (w, h) = (sym.w as f32, sym.h as f32);
    let place = Transform::from_rotate(sym.rot as f32)
        .post_translate(sym.x as f32, sym.y as f32)
        .post_concat(cam);

    if let Some(img) = cache.get(&sym.symbol_id) {
        let fit = Transform::from_scale(w / img.width() as f32, h / img.height() as f32)
            .post_translate(-w / 2.0, -h / 2.0)
            .post_concat(place);
        target.draw_pixmap(0, 0, img.as_ref(), &PixmapPaint::default(), fit, None);
    } else {
        log::warn!("no cached image for symbol {}", sym.symbol_id);
    }

    if selected && !mode.is_export() {
        if let Some(rect) = Rect::from_xywh(-w / 2.0, -h / 2.0, w, h) {
            let path = PathBuilder::from_rect(rect);
            let stroke = Stroke {
                width: SELECTION_STROKE_WIDTH,
                ..Default::default()
            };
            target.stroke_path(&path, &solid_paint(SELECTED_RGB), &stroke, place, None);
        }
    }

    let label = format_circuit_label(&sym.label, &sym.circuit);
    if !label.is_empty() {
        draw_text(
            target,
            sym.x,
            sym.y + sym.h / 2.0 + LABEL_OFFSET,
            &label,
            LABEL_FONT_SIZE,
            LABEL_RGB,
            false,
            true,
            cam,
        );
    }

    // Phase/group captions only show while editing.
    if !mode.is_export() && (!sym.phase.is_empty() || !sym.group.is_empty()) {
        let caption = [sym.phase.as_str(), sym.group.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" · ");
        draw_text(
            target,
            sym.x,
            sym.y + sym.h / 2.0 + SECONDARY_OFFSET,
            &caption,
            SECONDARY_FONT_SIZE,
            SECONDARY_RGB,
            false,
            true,
            cam,
        );
    }
}

fn draw_text_object(target: &mut Pixmap, text: &TextObject, selected: bool, cam: Transform) {
    let color = if selected { SELECTED_RGB } else { TEXT_RGB };
    draw_text(target, text.x, text.y, &text.text, text.size, color, true, false, cam);
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Rasterize `text` through SVG and composite it anchored at the first
/// line's left (or center) baseline, like canvas `fillText`. Newlines break
/// lines with a 1.2em advance.
#[allow(clippy::too_many_arguments)]
fn draw_text(
    target: &mut Pixmap,
    x: f64,
    y: f64,
    text: &str,
    size: f64,
    color: (u8, u8, u8),
    bold: bool,
    centered: bool,
    cam: Transform,
) {
    let lines: Vec<&str> = text.split('\n').collect();
    let est_width = lines
        .iter()
        .map(|l| sibelplan_core::objects::text_extent(l, size).0)
        .fold(0.0f64, f64::max);
    // Generous box: the 0.6em-per-char estimate undershoots wide glyphs.
    let box_w = (est_width * 1.5 + size).max(size);
    let box_h = size * 1.2 * lines.len() as f64 + size * 0.5;

    let anchor_x = if centered { box_w / 2.0 } else { size * 0.1 };
    let weight = if bold { "bold" } else { "normal" };
    let anchor = if centered { "middle" } else { "start" };
    let fill = hex(color);

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{box_w}" height="{box_h}">"#
    );
    for (i, line) in lines.iter().enumerate() {
        let line_y = size + i as f64 * size * 1.2;
        svg.push_str(&format!(
            r#"<text x="{anchor_x}" y="{line_y}" font-family="sans-serif" font-size="{size}" font-weight="{weight}" text-anchor="{anchor}" fill="{fill}">{}</text>"#,
            escape_xml(line)
        ));
    }
    svg.push_str("</svg>");

    let mut options = usvg::Options::default();
    options.fontdb = fonts::shared_fontdb();
    let Ok(tree) = usvg::Tree::from_str(&svg, &options) else {
        log::warn!("failed to lay out text {text:?}");
        return;
    };

    let raster_w = (box_w * f64::from(TEXT_RASTER_SCALE)).ceil() as u32;
    let raster_h = (box_h * f64::from(TEXT_RASTER_SCALE)).ceil() as u32;
    let Some(mut raster) = Pixmap::new(raster_w.max(1), raster_h.max(1)) else {
        return;
    };
    resvg::render(
        &tree,
        Transform::from_scale(TEXT_RASTER_SCALE, TEXT_RASTER_SCALE),
        &mut raster.as_mut(),
    );

    // Pixmap origin relative to the (x, y) baseline anchor, in world units.
    let dx = if centered { -box_w / 2.0 } else { 0.0 };
    let dy = -size;
    let place = Transform::from_scale(1.0 / TEXT_RASTER_SCALE, 1.0 / TEXT_RASTER_SCALE)
        .post_translate((x + dx) as f32, (y + dy) as f32)
        .post_concat(cam);
    target.draw_pixmap(0, 0, raster.as_ref(), &PixmapPaint::default(), place, None);
}
