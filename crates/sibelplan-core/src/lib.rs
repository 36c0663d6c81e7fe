//! SibelPlan Core Library
//!
//! Annotation model and interaction logic for annotating fire/life-safety
//! floor plans with emergency-lighting symbols, evacuation routes, and text
//! labels. Rendering and export live in the companion crates; this crate is
//! UI-agnostic and owns the per-page object store, the view transform, the
//! tool state machine, and project persistence.

pub mod camera;
pub mod catalog;
pub mod circuits;
pub mod inventory;
pub mod objects;
pub mod project;
pub mod session;
pub mod store;
pub mod tools;

pub use camera::ViewTransform;
pub use catalog::{SizeClass, SymbolCatalog, SymbolDef, SymbolKind, DEFAULT_SYMBOL_ID};
pub use circuits::CircuitRegistry;
pub use inventory::{Inventory, UNASSIGNED_CIRCUIT};
pub use objects::{AnnotationObject, ObjectId, RoutePoint, SymbolObject, TextObject};
pub use project::{ProjectDocument, ProjectError, PROJECT_FILENAME, PROJECT_VERSION};
pub use session::{EditorSession, UserInputError};
pub use store::{AnnotationStore, PageObjects};
pub use tools::{InteractionController, PointerInput, PointerOutcome, ToolKind, DOUBLE_TAP_MS};
