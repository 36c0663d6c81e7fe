//! Symbol image cache: fetch SVG assets, merge arrow overlays, rasterize.

use crate::assets::{AssetError, AssetSource};
use resvg::usvg;
use sibelplan_core::catalog::SymbolCatalog;
use std::collections::HashMap;
use tiny_skia::Pixmap;

/// Symbols are rasterized above their placement size so they stay sharp when
/// zoomed in.
pub const RASTER_SCALE: f32 = 2.0;

/// Strip the outer `<svg …>` element, keeping the drawable content.
fn extract_inner(svg: &str) -> &str {
    let Some(open) = svg.find("<svg") else {
        return svg;
    };
    let Some(open_end) = svg[open..].find('>') else {
        return svg;
    };
    let start = open + open_end + 1;
    let end = svg.rfind("</svg>").unwrap_or(svg.len());
    if start <= end {
        &svg[start..end]
    } else {
        svg
    }
}

/// Splice the overlay's content into the base document as a trailing group,
/// so the arrow draws over the sign body.
fn merge_overlay(base: &str, overlay: &str) -> String {
    let inner = extract_inner(overlay);
    match base.rfind("</svg>") {
        Some(pos) => format!("{}  <g>{}</g>\n</svg>", &base[..pos], inner),
        None => base.to_string(),
    }
}

fn rasterize(reference: &str, svg: &str) -> Result<Pixmap, AssetError> {
    let parse_err = |message: String| AssetError::Parse {
        reference: reference.to_string(),
        message,
    };

    let mut options = usvg::Options::default();
    if svg.contains("<text") || svg.contains("font-family") {
        options.fontdb = crate::fonts::shared_fontdb();
    }
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| parse_err(e.to_string()))?;

    let size = tree.size();
    let width = (size.width() * RASTER_SCALE).ceil() as u32;
    let height = (size.height() * RASTER_SCALE).ceil() as u32;
    let mut pixmap = Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| parse_err("zero-sized SVG".to_string()))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(RASTER_SCALE, RASTER_SCALE),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// Rasterized catalog symbols, keyed by symbol id.
///
/// The cache is filled once per process from an [`AssetSource`]; rendering
/// skips any symbol whose image is missing rather than failing the frame.
#[derive(Default)]
pub struct SymbolImageCache {
    images: HashMap<String, Pixmap>,
    ready: bool,
}

impl SymbolImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn get(&self, symbol_id: &str) -> Option<&Pixmap> {
        self.images.get(symbol_id)
    }

    /// Fetch and rasterize every catalog symbol not already cached.
    ///
    /// Fails fast on the first broken asset; already-built images survive so
    /// a retry only refetches what is missing.
    pub async fn ensure_ready(
        &mut self,
        catalog: &SymbolCatalog,
        source: &dyn AssetSource,
    ) -> Result<(), AssetError> {
        for def in catalog.iter() {
            if self.images.contains_key(def.id) {
                continue;
            }
            let base = source.fetch(def.base).await?;
            let svg = match def.overlay {
                Some(overlay_ref) => {
                    let overlay = source.fetch(overlay_ref).await?;
                    merge_overlay(&base, &overlay)
                }
                None => base,
            };
            let pixmap = rasterize(def.id, &svg)?;
            log::debug!("rasterized symbol {} ({}x{})", def.id, pixmap.width(), pixmap.height());
            self.images.insert(def.id.to_string(), pixmap);
        }
        self.ready = true;
        Ok(())
    }
}
