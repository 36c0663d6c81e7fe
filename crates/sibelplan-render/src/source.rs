//! Access to the source plan document's page bitmaps.

use crate::assets::BoxFuture;
use thiserror::Error;
use tiny_skia::Pixmap;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no document is loaded")]
    NotLoaded,
    #[error("page {0} is out of range")]
    PageOutOfRange(usize),
    #[error("failed to render page {page}: {message}")]
    Render { page: usize, message: String },
}

/// A loaded plan document whose pages can be rasterized.
///
/// `scale` multiplies the page's native size; the editor renders at its
/// session render scale so annotations line up with what gets exported.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Pixel dimensions a page will rasterize to at the given scale.
    fn page_size(&self, index: usize, scale: f64) -> Result<(u32, u32), SourceError>;

    fn render_page(&self, index: usize, scale: f64) -> BoxFuture<'_, Result<Pixmap, SourceError>>;
}

/// White-sheet stand-in used in tests and when annotating without a PDF.
pub struct BlankSourceDocument {
    pages: usize,
    width: f64,
    height: f64,
}

impl BlankSourceDocument {
    /// A4 landscape at 72 dpi.
    pub fn a4(pages: usize) -> Self {
        Self::new(pages, 842.0, 595.0)
    }

    pub fn new(pages: usize, width: f64, height: f64) -> Self {
        Self {
            pages,
            width,
            height,
        }
    }

    fn check(&self, index: usize) -> Result<(), SourceError> {
        if index < self.pages {
            Ok(())
        } else {
            Err(SourceError::PageOutOfRange(index))
        }
    }
}

impl SourceDocument for BlankSourceDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn page_size(&self, index: usize, scale: f64) -> Result<(u32, u32), SourceError> {
        self.check(index)?;
        Ok((
            (self.width * scale).floor().max(1.0) as u32,
            (self.height * scale).floor().max(1.0) as u32,
        ))
    }

    fn render_page(&self, index: usize, scale: f64) -> BoxFuture<'_, Result<Pixmap, SourceError>> {
        let result = self.page_size(index, scale).and_then(|(w, h)| {
            let mut pixmap = Pixmap::new(w, h).ok_or(SourceError::Render {
                page: index,
                message: "empty page size".to_string(),
            })?;
            pixmap.fill(tiny_skia::Color::WHITE);
            Ok(pixmap)
        });
        Box::pin(async move { result })
    }
}

#[cfg(feature = "pdfium")]
pub use pdfium_backend::PdfiumSourceDocument;

#[cfg(feature = "pdfium")]
mod pdfium_backend {
    use super::{BoxFuture, SourceDocument, SourceError};
    use pdfium_render::prelude::*;
    use tiny_skia::Pixmap;

    /// Renders pages through pdfium.
    ///
    /// The document is re-opened from the held bytes per call; pdfium's
    /// document handle borrows the library, and keeping both in one struct
    /// would make it self-referential.
    pub struct PdfiumSourceDocument {
        pdfium: Pdfium,
        bytes: Vec<u8>,
        page_count: usize,
    }

    impl PdfiumSourceDocument {
        /// Bind to the system pdfium library and open the given PDF bytes.
        pub fn load(bytes: Vec<u8>) -> Result<Self, SourceError> {
            let pdfium = Pdfium::new(
                Pdfium::bind_to_system_library().map_err(|e| SourceError::Render {
                    page: 0,
                    message: format!("pdfium unavailable: {e}"),
                })?,
            );
            let page_count = {
                let doc = pdfium
                    .load_pdf_from_byte_slice(&bytes, None)
                    .map_err(|_| SourceError::NotLoaded)?;
                doc.pages().len() as usize
            };
            Ok(Self {
                pdfium,
                bytes,
                page_count,
            })
        }

        fn with_page<T>(
            &self,
            index: usize,
            f: impl FnOnce(&PdfPage) -> Result<T, PdfiumError>,
        ) -> Result<T, SourceError> {
            if index >= self.page_count {
                return Err(SourceError::PageOutOfRange(index));
            }
            let doc = self
                .pdfium
                .load_pdf_from_byte_slice(&self.bytes, None)
                .map_err(|_| SourceError::NotLoaded)?;
            let page = doc
                .pages()
                .get(index as u16)
                .map_err(|_| SourceError::PageOutOfRange(index))?;
            f(&page).map_err(|e| SourceError::Render {
                page: index,
                message: e.to_string(),
            })
        }
    }

    impl SourceDocument for PdfiumSourceDocument {
        fn page_count(&self) -> usize {
            self.page_count
        }

        fn page_size(&self, index: usize, scale: f64) -> Result<(u32, u32), SourceError> {
            self.with_page(index, |page| {
                let w = (f64::from(page.width().value) * scale).floor().max(1.0) as u32;
                let h = (f64::from(page.height().value) * scale).floor().max(1.0) as u32;
                Ok((w, h))
            })
        }

        fn render_page(
            &self,
            index: usize,
            scale: f64,
        ) -> BoxFuture<'_, Result<Pixmap, SourceError>> {
            let result = self.with_page(index, |page| {
                let config = PdfRenderConfig::new().scale_page_by_factor(scale as f32);
                let image = page.render_with_config(&config)?.as_image().into_rgba8();
                Ok(image)
            });
            let result = result.and_then(|image| {
                let (w, h) = image.dimensions();
                let mut pixmap = Pixmap::new(w, h).ok_or(SourceError::Render {
                    page: index,
                    message: "empty page size".to_string(),
                })?;
                for (src, dst) in image
                    .pixels()
                    .zip(pixmap.pixels_mut())
                {
                    let [r, g, b, _] = src.0;
                    // Page bitmaps are opaque; skip premultiplication.
                    *dst = tiny_skia::PremultipliedColorU8::from_rgba(r, g, b, 255)
                        .unwrap_or(tiny_skia::PremultipliedColorU8::TRANSPARENT);
                }
                Ok(pixmap)
            });
            Box::pin(async move { result })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::pin;
    use std::sync::Arc;
    use std::task::{Context, Poll, Wake, Waker};

    struct NoopWaker;
    impl Wake for NoopWaker {
        fn wake(self: Arc<Self>) {}
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        let waker = Waker::from(Arc::new(NoopWaker));
        let mut cx = Context::from_waker(&waker);
        let mut future = pin!(future);
        loop {
            if let Poll::Ready(out) = future.as_mut().poll(&mut cx) {
                return out;
            }
        }
    }

    #[test]
    fn test_blank_document_pages_are_white() {
        let doc = BlankSourceDocument::new(2, 100.0, 80.0);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_size(0, 1.25).unwrap(), (125, 100));

        let pixmap = block_on(doc.render_page(1, 1.0)).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (100, 80));
        let px = pixmap.pixel(50, 40).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 255, 255, 255));
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = BlankSourceDocument::a4(1);
        assert!(matches!(
            doc.page_size(1, 1.0),
            Err(SourceError::PageOutOfRange(1))
        ));
        assert!(block_on(doc.render_page(5, 1.0)).is_err());
    }
}
