//! Pointer tools and the interaction state machine.

use crate::objects::ObjectId;
use crate::session::EditorSession;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Two route-tool taps closer together than this end the route in progress.
pub const DOUBLE_TAP_MS: u64 = 320;

/// The active pointer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Route,
    Symbol,
    Text,
}

/// One pointer event in logical screen pixels.
///
/// `time_ms` is a monotonic timestamp supplied by the caller; the controller
/// never reads a clock itself, which keeps tap timing testable.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub position: Point,
    pub time_ms: u64,
}

impl PointerInput {
    pub fn new(position: Point, time_ms: u64) -> Self {
        Self { position, time_ms }
    }
}

/// What a pointer-down did, so the caller can update status text or open a
/// text prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    None,
    Selected(ObjectId),
    SelectionCleared,
    RouteStarted(ObjectId),
    RoutePointAdded(ObjectId),
    RouteFinished(ObjectId),
    /// The text tool wants input; the caller prompts and then calls
    /// [`EditorSession::place_text`] with this world position.
    NeedsText {
        world: Point,
    },
    SymbolPlaced(ObjectId),
}

#[derive(Debug, Clone, Copy)]
enum DragState {
    None,
    /// Dragging the selected object. `grab` is the world offset from the
    /// object origin to the grab point; routes translate by deltas instead.
    Object { grab: Vec2, last_world: Point },
    Pan { start_screen: Point, start_pan: Vec2 },
}

/// Routes pointer events to the session according to the active tool.
#[derive(Debug)]
pub struct InteractionController {
    tool: ToolKind,
    drag: DragState,
    drawing_route: Option<ObjectId>,
    last_tap_ms: Option<u64>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            tool: ToolKind::Select,
            drag: DragState::None,
            drawing_route: None,
            last_tap_ms: None,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools. Leaving the route tool abandons the route in progress
    /// (the drawn vertices stay).
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != ToolKind::Route {
            self.drawing_route = None;
            self.last_tap_ms = None;
        }
        self.tool = tool;
        self.drag = DragState::None;
    }

    /// Abort any drag or route in progress. Callers pair this with page
    /// changes and project loads, where a half-drawn route must not carry
    /// over.
    pub fn cancel(&mut self) {
        self.drag = DragState::None;
        self.drawing_route = None;
        self.last_tap_ms = None;
    }

    pub fn pointer_down(
        &mut self,
        session: &mut EditorSession,
        input: PointerInput,
    ) -> PointerOutcome {
        let world = session.camera.screen_to_world(input.position);

        if self.tool == ToolKind::Route {
            let dt = self.last_tap_ms.map(|t| input.time_ms.saturating_sub(t));
            self.last_tap_ms = Some(input.time_ms);
            if let (Some(dt), Some(route_id)) = (dt, self.drawing_route) {
                if dt < DOUBLE_TAP_MS {
                    self.drawing_route = None;
                    return PointerOutcome::RouteFinished(route_id);
                }
            }
        }

        match self.tool {
            ToolKind::Select => match session.store.hit_test(session.page_index, world) {
                Some(id) => {
                    session.store.bring_to_front(session.page_index, id);
                    session.select(Some(id));
                    let grab = match session.selected_object() {
                        Some(obj) if !obj.is_route() => world - obj.origin(),
                        _ => Vec2::ZERO,
                    };
                    self.drag = DragState::Object {
                        grab,
                        last_world: world,
                    };
                    PointerOutcome::Selected(id)
                }
                None => {
                    session.select(None);
                    PointerOutcome::SelectionCleared
                }
            },
            ToolKind::Pan => {
                self.drag = DragState::Pan {
                    start_screen: input.position,
                    start_pan: session.camera.pan,
                };
                PointerOutcome::None
            }
            ToolKind::Text => PointerOutcome::NeedsText { world },
            ToolKind::Route => match self.drawing_route {
                None => {
                    let id = session.start_route(world);
                    self.drawing_route = Some(id);
                    PointerOutcome::RouteStarted(id)
                }
                Some(id) => {
                    session.append_route_point(id, world);
                    PointerOutcome::RoutePointAdded(id)
                }
            },
            ToolKind::Symbol => match session.place_symbol(world) {
                Some(id) => PointerOutcome::SymbolPlaced(id),
                None => PointerOutcome::None,
            },
        }
    }

    pub fn pointer_move(&mut self, session: &mut EditorSession, input: PointerInput) {
        match self.drag {
            DragState::None => {}
            DragState::Pan {
                start_screen,
                start_pan,
            } => {
                let delta = input.position - start_screen;
                session.camera.pan = start_pan + delta * session.camera.surface_scale;
            }
            DragState::Object { grab, last_world } => {
                let world = session.camera.screen_to_world(input.position);
                let Some(id) = session.selected_id() else {
                    return;
                };
                let Some(obj) = session.store.find_mut(session.page_index, id) else {
                    return;
                };
                if obj.is_route() {
                    obj.translate(world - last_world);
                } else {
                    obj.set_origin(world - grab);
                }
                self.drag = DragState::Object {
                    grab,
                    last_world: world,
                };
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::AnnotationObject;

    fn session() -> EditorSession {
        let mut s = EditorSession::new();
        s.open_document(1);
        s
    }

    fn tap(x: f64, y: f64, t: u64) -> PointerInput {
        PointerInput::new(Point::new(x, y), t)
    }

    #[test]
    fn test_symbol_tool_places_at_world_point() {
        let mut s = session();
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Symbol);

        let outcome = ctl.pointer_down(&mut s, tap(100.0, 50.0, 0));
        let PointerOutcome::SymbolPlaced(id) = outcome else {
            panic!("expected placement, got {outcome:?}");
        };
        let sym = s.store.find(0, id).unwrap().as_symbol().unwrap();
        assert_eq!((sym.x, sym.y), (100.0, 50.0));
    }

    #[test]
    fn test_select_hits_and_clears() {
        let mut s = session();
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Symbol);
        ctl.pointer_down(&mut s, tap(100.0, 100.0, 0));
        ctl.set_tool(ToolKind::Select);

        let outcome = ctl.pointer_down(&mut s, tap(100.0, 100.0, 100));
        assert!(matches!(outcome, PointerOutcome::Selected(_)));

        let outcome = ctl.pointer_down(&mut s, tap(900.0, 900.0, 200));
        assert_eq!(outcome, PointerOutcome::SelectionCleared);
        assert_eq!(s.selected_id(), None);
    }

    #[test]
    fn test_select_drag_moves_symbol() {
        let mut s = session();
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Symbol);
        ctl.pointer_down(&mut s, tap(100.0, 100.0, 0));
        ctl.set_tool(ToolKind::Select);

        // Grab off-center; the grab offset must be preserved while dragging.
        ctl.pointer_down(&mut s, tap(110.0, 105.0, 100));
        ctl.pointer_move(&mut s, tap(210.0, 155.0, 120));
        ctl.pointer_up();

        let sym = s.selected_object().unwrap().as_symbol().unwrap();
        assert_eq!((sym.x, sym.y), (200.0, 150.0));
    }

    #[test]
    fn test_route_double_tap_finishes() {
        let mut s = session();
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Route);

        let start = ctl.pointer_down(&mut s, tap(0.0, 0.0, 1000));
        let PointerOutcome::RouteStarted(id) = start else {
            panic!("expected route start");
        };
        assert!(matches!(
            ctl.pointer_down(&mut s, tap(100.0, 0.0, 2000)),
            PointerOutcome::RoutePointAdded(_)
        ));
        assert!(matches!(
            ctl.pointer_down(&mut s, tap(100.0, 100.0, 3000)),
            PointerOutcome::RoutePointAdded(_)
        ));
        // Fourth tap lands within the double-tap window and ends the route
        // without appending a vertex.
        assert_eq!(
            ctl.pointer_down(&mut s, tap(100.0, 100.0, 3100)),
            PointerOutcome::RouteFinished(id)
        );

        let AnnotationObject::Route(route) = s.store.find(0, id).unwrap() else {
            panic!("not a route");
        };
        assert_eq!(route.points.len(), 3);
    }

    #[test]
    fn test_slow_route_taps_keep_appending() {
        let mut s = session();
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Route);
        ctl.pointer_down(&mut s, tap(0.0, 0.0, 0));
        assert!(matches!(
            ctl.pointer_down(&mut s, tap(50.0, 0.0, 500)),
            PointerOutcome::RoutePointAdded(_)
        ));
        assert!(matches!(
            ctl.pointer_down(&mut s, tap(50.0, 50.0, 1000)),
            PointerOutcome::RoutePointAdded(_)
        ));
    }

    #[test]
    fn test_tool_switch_abandons_route() {
        let mut s = session();
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Route);
        ctl.pointer_down(&mut s, tap(0.0, 0.0, 0));
        ctl.set_tool(ToolKind::Select);
        ctl.set_tool(ToolKind::Route);

        // A new tap starts a fresh route rather than extending the old one.
        assert!(matches!(
            ctl.pointer_down(&mut s, tap(10.0, 10.0, 100)),
            PointerOutcome::RouteStarted(_)
        ));
    }

    #[test]
    fn test_pan_drag_scales_with_surface() {
        let mut s = session();
        s.camera.surface_scale = 2.0;
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Pan);

        ctl.pointer_down(&mut s, tap(10.0, 10.0, 0));
        ctl.pointer_move(&mut s, tap(30.0, 25.0, 20));
        assert_eq!(s.camera.pan, Vec2::new(40.0, 30.0));
    }

    #[test]
    fn test_text_tool_requests_input() {
        let mut s = session();
        let mut ctl = InteractionController::new();
        ctl.set_tool(ToolKind::Text);
        let outcome = ctl.pointer_down(&mut s, tap(40.0, 60.0, 0));
        assert_eq!(
            outcome,
            PointerOutcome::NeedsText {
                world: Point::new(40.0, 60.0)
            }
        );
        // Nothing placed until the caller supplies the text.
        assert!(s.current_page().is_none() || s.current_page().unwrap().objects.is_empty());
    }
}
