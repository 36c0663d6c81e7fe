//! Flattened PDF export: each page rasterized with its annotations baked in.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use sibelplan_core::camera::ViewTransform;
use sibelplan_core::store::{AnnotationStore, PageObjects};
use sibelplan_render::scene::{render_overlay, RenderMode};
use sibelplan_render::source::{SourceDocument, SourceError};
use sibelplan_render::symbols::SymbolImageCache;
use std::io::Write;
use thiserror::Error;
use tiny_skia::Pixmap;

/// Suggested download filename for the export.
pub const EXPORT_PDF_FILENAME: &str = "sicherheitsbeleuchtung_annotiert.pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("source document error: {0}")]
    Source(#[from] SourceError),
    #[error("pdf assembly error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("image encoding error: {0}")]
    Encode(#[from] std::io::Error),
}

/// Assembles a PDF out of full-page bitmap images.
struct PdfBuilder {
    doc: Document,
    pages_id: lopdf::ObjectId,
    page_ids: Vec<Object>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Append one page holding the pixmap as a lossless FlateDecode image,
    /// scaled to fill the page exactly.
    fn add_image_page(&mut self, pixmap: &Pixmap) -> Result<(), ExportError> {
        let (w, h) = (pixmap.width(), pixmap.height());

        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&rgb)?;
        let compressed = encoder.finish()?;

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(w),
                "Height" => i64::from(h),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compressed,
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        i64::from(w).into(),
                        0.into(),
                        0.into(),
                        i64::from(h).into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        });

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(), 0.into(),
                i64::from(w).into(), i64::from(h).into(),
            ],
        });
        self.page_ids.push(page_id.into());
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let count = self.page_ids.len() as i64;
        self.doc.set_object(
            self.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Count" => count,
                "Kids" => self.page_ids,
            },
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        // Image streams carry their own FlateDecode filter; compressing the
        // document again would mangle them.
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Render every source page at `render_scale`, draw its annotations over it
/// in export mode, and assemble the result into a new PDF.
///
/// Pages without annotations are exported as-is, so the output always has
/// the same page count as the source.
pub async fn export_annotated_pdf(
    source: &dyn SourceDocument,
    store: &AnnotationStore,
    cache: &SymbolImageCache,
    render_scale: f64,
) -> Result<Vec<u8>, ExportError> {
    let mut builder = PdfBuilder::new();
    let camera = ViewTransform::new();
    let empty = PageObjects::default();

    for index in 0..source.page_count() {
        let mut pixmap = source.render_page(index, render_scale).await?;
        let page = store.page(index).unwrap_or(&empty);
        render_overlay(&mut pixmap, page, &camera, cache, RenderMode::Export);
        builder.add_image_page(&pixmap)?;
        log::debug!(
            "exported page {}/{} ({}x{})",
            index + 1,
            source.page_count(),
            pixmap.width(),
            pixmap.height()
        );
    }

    builder.finish()
}
