//! SibelPlan Rendering
//!
//! CPU rasterization for the annotation editor: SVG symbol images, the
//! annotation overlay (routes, symbols, labels, text), and access to the
//! source PDF's page bitmaps. Everything renders into `tiny_skia::Pixmap`s
//! so the same code path serves the interactive canvas and the flattened
//! PDF export.

pub mod assets;
mod fonts;
pub mod scene;
pub mod source;
pub mod symbols;

pub use assets::{AssetError, AssetSource, BoxFuture, FileAssetSource, MemoryAssetSource};
pub use scene::{render_overlay, RenderMode};
pub use source::{BlankSourceDocument, SourceDocument, SourceError};
pub use symbols::SymbolImageCache;

#[cfg(feature = "pdfium")]
pub use source::PdfiumSourceDocument;
