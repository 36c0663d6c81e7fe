//! Shared system font database for SVG text rasterization.

use resvg::usvg::fontdb;
use std::sync::{Arc, OnceLock};

static FONTDB: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

/// System fonts, loaded once per process. Scanning font directories is slow
/// enough to matter when text is rasterized per frame.
pub(crate) fn shared_fontdb() -> Arc<fontdb::Database> {
    FONTDB
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}
