//! Annotation object model: symbols, evacuation routes, and text labels.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for annotation objects.
pub type ObjectId = Uuid;

/// World-space tolerance for hitting a route polyline.
pub const ROUTE_HIT_TOLERANCE: f64 = 10.0;

/// Discrete rotation step for symbols, in degrees.
pub const ROTATION_STEP_DEG: f64 = 90.0;

/// Default font size for newly placed text labels, in points.
pub const DEFAULT_TEXT_SIZE: f64 = 18.0;

/// A placed emergency-lighting symbol.
///
/// `x`/`y` is the world-space center of the `w`×`h` bounding box. `rot` is
/// visual only; hit-testing always uses the axis-aligned box (a documented
/// simplification, not a bug).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolObject {
    pub id: ObjectId,
    #[serde(rename = "symbolId")]
    pub symbol_id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub rot: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub circuit: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub group: String,
}

/// A single vertex of a route polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub x: f64,
    pub y: f64,
}

impl RoutePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for RoutePoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// A user-drawn evacuation path. Always has at least one point; a route with
/// zero points is invalid and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteObject {
    pub id: ObjectId,
    pub points: Vec<RoutePoint>,
}

/// A free-standing text label, anchored baseline-left at `x`/`y`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextObject {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub size: f64,
}

/// The annotation object union, discriminated by `type` in persisted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationObject {
    Symbol(SymbolObject),
    Route(RouteObject),
    Text(TextObject),
}

impl AnnotationObject {
    /// Create a symbol at a world-space center point.
    pub fn symbol(symbol_id: &str, center: Point, w: f64, h: f64, circuit: &str) -> Self {
        Self::Symbol(SymbolObject {
            id: Uuid::new_v4(),
            symbol_id: symbol_id.to_string(),
            x: center.x,
            y: center.y,
            w,
            h,
            rot: 0.0,
            label: String::new(),
            circuit: circuit.to_string(),
            phase: String::new(),
            group: String::new(),
        })
    }

    /// Create a route with a single starting point.
    pub fn route(start: Point) -> Self {
        Self::Route(RouteObject {
            id: Uuid::new_v4(),
            points: vec![start.into()],
        })
    }

    /// Create a text label anchored baseline-left at `pos`.
    pub fn text(pos: Point, content: &str, size: f64) -> Self {
        Self::Text(TextObject {
            id: Uuid::new_v4(),
            x: pos.x,
            y: pos.y,
            text: content.to_string(),
            size,
        })
    }

    pub fn id(&self) -> ObjectId {
        match self {
            AnnotationObject::Symbol(s) => s.id,
            AnnotationObject::Route(r) => r.id,
            AnnotationObject::Text(t) => t.id,
        }
    }

    /// The anchor point used for drag tracking: center for symbols,
    /// baseline-left for text, first vertex for routes.
    pub fn origin(&self) -> Point {
        match self {
            AnnotationObject::Symbol(s) => Point::new(s.x, s.y),
            AnnotationObject::Text(t) => Point::new(t.x, t.y),
            AnnotationObject::Route(r) => r
                .points
                .first()
                .map(|p| p.to_point())
                .unwrap_or(Point::ZERO),
        }
    }

    /// Move the anchor point to `pos`. Routes are moved with [`translate`]
    /// instead, since all vertices shift together.
    ///
    /// [`translate`]: AnnotationObject::translate
    pub fn set_origin(&mut self, pos: Point) {
        match self {
            AnnotationObject::Symbol(s) => {
                s.x = pos.x;
                s.y = pos.y;
            }
            AnnotationObject::Text(t) => {
                t.x = pos.x;
                t.y = pos.y;
            }
            AnnotationObject::Route(r) => {
                if let Some(first) = r.points.first().copied() {
                    let delta = pos - first.to_point();
                    self.translate(delta);
                }
            }
        }
    }

    /// Translate the whole object by a world-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            AnnotationObject::Symbol(s) => {
                s.x += delta.x;
                s.y += delta.y;
            }
            AnnotationObject::Text(t) => {
                t.x += delta.x;
                t.y += delta.y;
            }
            AnnotationObject::Route(r) => {
                for p in &mut r.points {
                    p.x += delta.x;
                    p.y += delta.y;
                }
            }
        }
    }

    /// World-space bounding box.
    pub fn bounds(&self) -> Rect {
        match self {
            AnnotationObject::Symbol(s) => Rect::new(
                s.x - s.w / 2.0,
                s.y - s.h / 2.0,
                s.x + s.w / 2.0,
                s.y + s.h / 2.0,
            ),
            AnnotationObject::Text(t) => {
                let (w, h) = text_extent(&t.text, t.size);
                Rect::new(t.x, t.y - h, t.x + w, t.y)
            }
            AnnotationObject::Route(r) => {
                let mut rect: Option<Rect> = None;
                for p in &r.points {
                    let pt = Rect::from_origin_size(p.to_point(), (0.0, 0.0));
                    rect = Some(match rect {
                        Some(acc) => acc.union(pt),
                        None => pt,
                    });
                }
                rect.unwrap_or(Rect::ZERO)
            }
        }
    }

    /// Test whether a world-space point hits this object.
    ///
    /// Symbols use their axis-aligned box regardless of rotation; text uses
    /// an approximate box anchored at the baseline; routes hit within
    /// [`ROUTE_HIT_TOLERANCE`] of any segment.
    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            AnnotationObject::Symbol(_) | AnnotationObject::Text(_) => {
                self.bounds().contains(point)
            }
            AnnotationObject::Route(r) => {
                let pts: Vec<Point> = r.points.iter().map(|p| p.to_point()).collect();
                point_to_polyline_dist(point, &pts) < ROUTE_HIT_TOLERANCE
            }
        }
    }

    pub fn as_symbol(&self) -> Option<&SymbolObject> {
        match self {
            AnnotationObject::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol_mut(&mut self) -> Option<&mut SymbolObject> {
        match self {
            AnnotationObject::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_route(&self) -> bool {
        matches!(self, AnnotationObject::Route(_))
    }
}

/// Approximate extent of a text label: width from character count, height
/// from a 1.2 line factor. Matches the hit box used on the drawing surface.
pub fn text_extent(text: &str, size: f64) -> (f64, f64) {
    let w = text.chars().count() as f64 * size * 0.6;
    let h = size * 1.2;
    (w, h)
}

/// Distance from a point to a line segment (a→b), clamping the projection
/// parameter to [0, 1].
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected
/// segments). Returns infinity for fewer than two points.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_distance_clamps_projection() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        // Beyond segment end: distance to endpoint, not the infinite line.
        assert!((point_to_segment_dist(Point::new(15.0, 0.0), a, b) - 5.0).abs() < 1e-12);
        // Perpendicular foot inside the segment.
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-12);
        // Degenerate segment.
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_symbol_hit_ignores_rotation() {
        let mut obj = AnnotationObject::symbol("NL", Point::new(100.0, 100.0), 90.0, 60.0, "");
        if let AnnotationObject::Symbol(s) = &mut obj {
            s.rot = 90.0;
        }
        // Inside the unrotated 90x60 box even though the visual is rotated.
        assert!(obj.hit_test(Point::new(140.0, 110.0)));
        assert!(!obj.hit_test(Point::new(150.0, 100.0)));
    }

    #[test]
    fn test_text_hit_box_is_baseline_anchored() {
        let obj = AnnotationObject::text(Point::new(50.0, 200.0), "Hallo", 18.0);
        // Above the baseline, inside the approximate box.
        assert!(obj.hit_test(Point::new(60.0, 190.0)));
        // Below the baseline is outside.
        assert!(!obj.hit_test(Point::new(60.0, 205.0)));
    }

    #[test]
    fn test_route_hit_within_tolerance() {
        let mut obj = AnnotationObject::route(Point::new(0.0, 0.0));
        if let AnnotationObject::Route(r) = &mut obj {
            r.points.push(RoutePoint::new(100.0, 0.0));
        }
        assert!(obj.hit_test(Point::new(50.0, 8.0)));
        assert!(!obj.hit_test(Point::new(50.0, 12.0)));
    }

    #[test]
    fn test_single_point_route_is_unhittable() {
        let obj = AnnotationObject::route(Point::new(10.0, 10.0));
        assert!(!obj.hit_test(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_route_translate_moves_all_points() {
        let mut obj = AnnotationObject::route(Point::new(0.0, 0.0));
        if let AnnotationObject::Route(r) = &mut obj {
            r.points.push(RoutePoint::new(10.0, 10.0));
        }
        obj.translate(Vec2::new(5.0, -5.0));
        if let AnnotationObject::Route(r) = &obj {
            assert_eq!(r.points[0], RoutePoint::new(5.0, -5.0));
            assert_eq!(r.points[1], RoutePoint::new(15.0, 5.0));
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_serde_tagged_by_type() {
        let obj = AnnotationObject::text(Point::new(1.0, 2.0), "X", 18.0);
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["type"], "text");
        let back: AnnotationObject = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), obj.id());
    }
}
