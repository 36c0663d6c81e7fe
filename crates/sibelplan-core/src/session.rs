//! Editor session: the mutable state behind one open plan document.

use crate::camera::ViewTransform;
use crate::catalog::{SymbolCatalog, DEFAULT_SYMBOL_ID};
use crate::circuits::CircuitRegistry;
use crate::objects::{AnnotationObject, ObjectId, DEFAULT_TEXT_SIZE, ROTATION_STEP_DEG};
use crate::store::{AnnotationStore, PageObjects};
use kurbo::Point;
use std::collections::HashMap;
use thiserror::Error;

/// Scale factor applied when rasterizing source pages.
pub const DEFAULT_RENDER_SCALE: f64 = 1.25;

/// Legend anchor position and font size, in world units.
const LEGEND_ORIGIN: (f64, f64) = (40.0, 60.0);
const LEGEND_TEXT_SIZE: f64 = 14.0;

/// A user action rejected for a stateful reason rather than an I/O failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserInputError {
    #[error("circuit name must not be empty")]
    EmptyCircuitName,
    #[error("no object is selected")]
    NoSelection,
    #[error("only symbols can be assigned a circuit")]
    NotASymbol,
}

/// All editor state for one open document.
///
/// The session owns the annotation store, circuit registry, view transform
/// and selection. It is deliberately free of I/O; rendering and persistence
/// live in sibling crates and operate on references into it.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub store: AnnotationStore,
    pub circuits: CircuitRegistry,
    pub catalog: SymbolCatalog,
    pub camera: ViewTransform,
    pub page_index: usize,
    pub page_count: usize,
    pub render_scale: f64,
    pub active_symbol_id: String,
    selected: Option<ObjectId>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            store: AnnotationStore::new(),
            circuits: CircuitRegistry::new(),
            catalog: SymbolCatalog::builtin(),
            camera: ViewTransform::new(),
            page_index: 0,
            page_count: 0,
            render_scale: DEFAULT_RENDER_SCALE,
            active_symbol_id: DEFAULT_SYMBOL_ID.to_string(),
            selected: None,
        }
    }

    /// Start over with a freshly opened source document.
    ///
    /// Drops all annotations, returns to the first page and resets the view.
    pub fn open_document(&mut self, page_count: usize) {
        self.store = AnnotationStore::new();
        self.page_count = page_count;
        self.page_index = 0;
        self.selected = None;
        self.camera.reset();
        log::info!("opened document with {page_count} pages");
    }

    pub fn current_page(&self) -> Option<&PageObjects> {
        self.store.page(self.page_index)
    }

    /// Switch to a page, clamped to the document. Selection does not carry
    /// across pages and the view resets.
    pub fn set_page(&mut self, index: usize) {
        let clamped = if self.page_count == 0 {
            0
        } else {
            index.min(self.page_count - 1)
        };
        if clamped != self.page_index {
            self.page_index = clamped;
            self.selected = None;
            self.camera.reset();
        }
    }

    pub fn select(&mut self, id: Option<ObjectId>) {
        self.selected = id;
    }

    pub fn selected_id(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&AnnotationObject> {
        self.store.find(self.page_index, self.selected?)
    }

    fn selected_object_mut(&mut self) -> Option<&mut AnnotationObject> {
        self.store.find_mut(self.page_index, self.selected?)
    }

    /// Place the active catalog symbol centered at a world point and select
    /// it. Returns `None` if the active id is not in the catalog.
    pub fn place_symbol(&mut self, world: Point) -> Option<ObjectId> {
        let def = self.catalog.get(&self.active_symbol_id)?;
        let (w, h) = def.size.dims();
        let symbol_id = def.id;
        let circuit = self.circuits.active().to_string();
        let id = self.store.insert(
            self.page_index,
            AnnotationObject::symbol(symbol_id, world, w, h, &circuit),
        );
        self.selected = Some(id);
        Some(id)
    }

    /// Place a text label at a world point. Empty or whitespace-only text is
    /// discarded.
    pub fn place_text(&mut self, world: Point, text: &str) -> Option<ObjectId> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.store.insert(
            self.page_index,
            AnnotationObject::text(world, text, DEFAULT_TEXT_SIZE),
        );
        self.selected = Some(id);
        Some(id)
    }

    /// Begin a new evacuation route at a world point and select it.
    pub fn start_route(&mut self, world: Point) -> ObjectId {
        let id = self.store.insert(self.page_index, AnnotationObject::route(world));
        self.selected = Some(id);
        id
    }

    /// Append a vertex to a route in progress.
    pub fn append_route_point(&mut self, id: ObjectId, world: Point) {
        if let Some(AnnotationObject::Route(route)) = self.store.find_mut(self.page_index, id) {
            route.points.push(world.into());
        }
    }

    pub fn set_label(&mut self, label: &str) -> Result<(), UserInputError> {
        self.with_selected_symbol(|s| s.label = label.to_string())
    }

    pub fn set_phase(&mut self, phase: &str) -> Result<(), UserInputError> {
        self.with_selected_symbol(|s| s.phase = phase.to_string())
    }

    pub fn set_group(&mut self, group: &str) -> Result<(), UserInputError> {
        self.with_selected_symbol(|s| s.group = group.to_string())
    }

    /// Rotate the selected symbol a quarter turn clockwise.
    pub fn rotate_selected(&mut self) -> Result<(), UserInputError> {
        self.with_selected_symbol(|s| s.rot = (s.rot + ROTATION_STEP_DEG) % 360.0)
    }

    fn with_selected_symbol(
        &mut self,
        f: impl FnOnce(&mut crate::objects::SymbolObject),
    ) -> Result<(), UserInputError> {
        let obj = self
            .selected_object_mut()
            .ok_or(UserInputError::NoSelection)?;
        let sym = obj.as_symbol_mut().ok_or(UserInputError::NotASymbol)?;
        f(sym);
        Ok(())
    }

    /// Remove the selected object from the current page.
    pub fn delete_selected(&mut self) -> Option<AnnotationObject> {
        let id = self.selected.take()?;
        self.store.remove(self.page_index, id)
    }

    /// Assign a circuit to the selected symbol and make it the active one.
    pub fn assign_circuit(&mut self, circuit: &str) -> Result<(), UserInputError> {
        self.with_selected_symbol(|s| s.circuit = circuit.to_string())?;
        if !self.circuits.set_active(circuit) {
            self.circuits.add(circuit);
        }
        Ok(())
    }

    /// Register a new circuit name and make it active.
    pub fn add_circuit(&mut self, name: &str) -> Result<(), UserInputError> {
        if name.trim().is_empty() {
            return Err(UserInputError::EmptyCircuitName);
        }
        self.circuits.add(name);
        Ok(())
    }

    /// Relabel every symbol on the current page as `{kind}-{nn}`, numbering
    /// separately per (kind, circuit) pair in z-order.
    pub fn auto_label(&mut self) {
        let active = self.circuits.active().to_string();
        let kinds: HashMap<String, &'static str> = self
            .catalog
            .iter()
            .map(|d| (d.id.to_string(), d.kind.as_str()))
            .collect();

        let page = self.store.get_or_create_page(self.page_index);
        let mut counters: HashMap<(String, String), u32> = HashMap::new();
        for obj in &mut page.objects {
            let Some(sym) = obj.as_symbol_mut() else {
                continue;
            };
            let kind = kinds.get(&sym.symbol_id).copied().unwrap_or("SYM");
            let circuit = if sym.circuit.is_empty() {
                if active.is_empty() { "—" } else { &active }
            } else {
                &sym.circuit
            };
            let n = counters
                .entry((kind.to_string(), circuit.to_string()))
                .or_insert(0);
            *n += 1;
            sym.label = format!("{kind}-{n:02}");
        }
    }

    /// Append a legend text object summarizing per-circuit counts on the
    /// current page. Each call appends a fresh legend.
    pub fn add_legend(&mut self) -> ObjectId {
        let inv = self
            .current_page()
            .map(crate::inventory::Inventory::for_page)
            .unwrap_or_default();
        let mut text = String::from("Legende Sicherheitsbeleuchtung\n");
        if inv.by_circuit.is_empty() {
            text.push('—');
        } else {
            let lines: Vec<String> = inv
                .by_circuit
                .iter()
                .map(|(c, n)| format!("{c}: {n} Leuchten"))
                .collect();
            text.push_str(&lines.join("\n"));
        }
        let id = self.store.insert(
            self.page_index,
            AnnotationObject::text(
                Point::new(LEGEND_ORIGIN.0, LEGEND_ORIGIN.1),
                &text,
                LEGEND_TEXT_SIZE,
            ),
        );
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_doc(pages: usize) -> EditorSession {
        let mut s = EditorSession::new();
        s.open_document(pages);
        s
    }

    #[test]
    fn test_place_symbol_uses_active_id_and_circuit() {
        let mut s = session_with_doc(1);
        s.circuits.add("SB-3");
        let id = s.place_symbol(Point::new(100.0, 200.0)).unwrap();
        assert_eq!(s.selected_id(), Some(id));

        let sym = s.selected_object().unwrap().as_symbol().unwrap();
        assert_eq!(sym.symbol_id, "RZ_RIGHT");
        assert_eq!(sym.circuit, "SB-3");
        assert_eq!((sym.w, sym.h), (90.0, 60.0));
        assert_eq!((sym.x, sym.y), (100.0, 200.0));
    }

    #[test]
    fn test_place_symbol_compact_footprint() {
        let mut s = session_with_doc(1);
        s.active_symbol_id = "CUBE_LEFT".to_string();
        s.place_symbol(Point::new(0.0, 0.0)).unwrap();
        let sym = s.selected_object().unwrap().as_symbol().unwrap();
        assert_eq!((sym.w, sym.h), (70.0, 70.0));
    }

    #[test]
    fn test_place_symbol_unknown_id() {
        let mut s = session_with_doc(1);
        s.active_symbol_id = "MISSING".to_string();
        assert!(s.place_symbol(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_place_text_rejects_blank() {
        let mut s = session_with_doc(1);
        assert!(s.place_text(Point::new(0.0, 0.0), "   ").is_none());
        assert!(s.place_text(Point::new(0.0, 0.0), "Fluchtweg").is_some());
    }

    #[test]
    fn test_detail_edits_require_symbol_selection() {
        let mut s = session_with_doc(1);
        assert_eq!(s.set_label("A"), Err(UserInputError::NoSelection));

        let id = s.start_route(Point::new(0.0, 0.0));
        s.select(Some(id));
        assert_eq!(s.set_phase("L1"), Err(UserInputError::NotASymbol));

        s.place_symbol(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(s.set_label("NL-01"), Ok(()));
        assert_eq!(s.set_phase("L1"), Ok(()));
        assert_eq!(s.set_group("G2"), Ok(()));
        let sym = s.selected_object().unwrap().as_symbol().unwrap();
        assert_eq!(sym.label, "NL-01");
        assert_eq!(sym.phase, "L1");
        assert_eq!(sym.group, "G2");
    }

    #[test]
    fn test_rotate_wraps() {
        let mut s = session_with_doc(1);
        s.place_symbol(Point::new(0.0, 0.0)).unwrap();
        for _ in 0..4 {
            s.rotate_selected().unwrap();
        }
        let sym = s.selected_object().unwrap().as_symbol().unwrap();
        assert_eq!(sym.rot, 0.0);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut s = session_with_doc(1);
        s.place_symbol(Point::new(0.0, 0.0)).unwrap();
        assert!(s.delete_selected().is_some());
        assert_eq!(s.selected_id(), None);
        assert!(s.current_page().unwrap().objects.is_empty());
        assert!(s.delete_selected().is_none());
    }

    #[test]
    fn test_assign_circuit_registers_and_activates() {
        let mut s = session_with_doc(1);
        s.place_symbol(Point::new(0.0, 0.0)).unwrap();
        s.assign_circuit("SB-7").unwrap();
        assert_eq!(s.circuits.active(), "SB-7");
        assert!(s.circuits.contains("SB-7"));
        let sym = s.selected_object().unwrap().as_symbol().unwrap();
        assert_eq!(sym.circuit, "SB-7");
    }

    #[test]
    fn test_add_circuit_rejects_empty() {
        let mut s = session_with_doc(1);
        assert_eq!(s.add_circuit("  "), Err(UserInputError::EmptyCircuitName));
        assert_eq!(s.add_circuit("SB-2"), Ok(()));
        assert_eq!(s.circuits.active(), "SB-2");
    }

    #[test]
    fn test_auto_label_numbers_per_kind_and_circuit() {
        let mut s = session_with_doc(1);
        s.active_symbol_id = "NL".to_string();
        for i in 0..3 {
            s.place_symbol(Point::new(i as f64 * 50.0, 0.0)).unwrap();
        }
        s.active_symbol_id = "EL".to_string();
        s.place_symbol(Point::new(300.0, 0.0)).unwrap();

        s.auto_label();
        let labels: Vec<String> = s
            .current_page()
            .unwrap()
            .symbols()
            .map(|sym| sym.label.clone())
            .collect();
        assert_eq!(labels, vec!["NL-01", "NL-02", "NL-03", "EL-01"]);
    }

    #[test]
    fn test_legend_counts_by_circuit() {
        let mut s = session_with_doc(1);
        s.place_symbol(Point::new(0.0, 0.0)).unwrap();
        s.place_symbol(Point::new(50.0, 0.0)).unwrap();
        let id = s.add_legend();

        let obj = s.store.find(0, id).unwrap();
        let AnnotationObject::Text(t) = obj else {
            panic!("legend is not a text object");
        };
        assert_eq!((t.x, t.y), (40.0, 60.0));
        assert_eq!(t.size, 14.0);
        assert_eq!(t.text, "Legende Sicherheitsbeleuchtung\nSB-1: 2 Leuchten");
    }

    #[test]
    fn test_legend_on_empty_page() {
        let mut s = session_with_doc(1);
        let id = s.add_legend();
        let AnnotationObject::Text(t) = s.store.find(0, id).unwrap() else {
            panic!("legend is not a text object");
        };
        assert_eq!(t.text, "Legende Sicherheitsbeleuchtung\n—");
    }

    #[test]
    fn test_set_page_clamps_and_resets() {
        let mut s = session_with_doc(3);
        s.place_symbol(Point::new(0.0, 0.0)).unwrap();
        s.camera.zoom = 2.0;
        s.set_page(99);
        assert_eq!(s.page_index, 2);
        assert_eq!(s.selected_id(), None);
        assert!((s.camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_open_document_resets_everything() {
        let mut s = session_with_doc(2);
        s.place_symbol(Point::new(0.0, 0.0)).unwrap();
        s.set_page(1);
        s.open_document(5);
        assert_eq!(s.page_index, 0);
        assert_eq!(s.page_count, 5);
        assert!(s.store.pages.is_empty());
        assert_eq!(s.selected_id(), None);
    }
}
