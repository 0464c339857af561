//! lopdf-backed document access.

use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, trace, warn};

use super::raster::decode_image_stream;
use super::{PageSource, Result};
use crate::error::PdfError;

/// A loaded PDF document.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.page_count())
            .field("bytes", &self.raw_data.len())
            .finish()
    }
}

impl PdfDocument {
    /// Parse a document from bytes.
    ///
    /// Documents encrypted with an empty user password are decrypted; any
    /// other encryption is an error.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document =
            Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, raw_data })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }

    /// Resources of a page, following `/Parent` inheritance.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node_id = page_id;
        // Page trees are shallow; the bound guards against reference cycles.
        for _ in 0..32 {
            let node = self.document.get_object(node_id).ok()?.as_dict().ok()?;
            if let Ok(resources) = node.get(b"Resources") {
                if let Ok((_, Object::Dictionary(dict))) = self.document.dereference(resources) {
                    return Some(dict);
                }
            }
            node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    /// Image XObjects of a page with their object ids.
    fn page_image_objects(&self, page: u32) -> Vec<(Option<ObjectId>, DynamicImage)> {
        let Ok(page_id) = self.page_id(page) else {
            return Vec::new();
        };
        let Some(resources) = self.page_resources(page_id) else {
            return Vec::new();
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Vec::new();
        };
        let Ok((_, Object::Dictionary(xobjects))) = self.document.dereference(xobjects) else {
            return Vec::new();
        };

        let mut images = Vec::new();
        for (name, reference) in xobjects.iter() {
            let Ok((id, Object::Stream(stream))) = self.document.dereference(reference) else {
                continue;
            };
            match decode_image_stream(&self.document, stream) {
                Some(img) => {
                    trace!(
                        "Decoded image {} on page {}: {}x{}",
                        String::from_utf8_lossy(name),
                        page,
                        img.width(),
                        img.height()
                    );
                    images.push((id, img));
                }
                None => trace!("Skipped XObject {}", String::from_utf8_lossy(name)),
            }
        }
        images
    }

    /// Every decodable image stream in object order.
    fn all_image_objects(&self) -> Vec<DynamicImage> {
        self.document
            .objects
            .values()
            .filter_map(|object| match object {
                Object::Stream(stream) => decode_image_stream(&self.document, stream),
                _ => None,
            })
            .collect()
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn page_content(&self, page: u32) -> Result<Vec<u8>> {
        let page_id = self.page_id(page)?;
        self.document
            .get_page_content(page_id)
            .map_err(|e| PdfError::Parse(format!("page {}: {}", page, e)))
    }

    fn page_images(&self, page: u32) -> Vec<DynamicImage> {
        self.page_image_objects(page)
            .into_iter()
            .map(|(_, img)| img)
            .collect()
    }

    fn embedded_images(&self) -> Vec<DynamicImage> {
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut images = Vec::new();

        for page in 1..=self.page_count() {
            for (id, img) in self.page_image_objects(page) {
                if let Some(id) = id {
                    if !seen.insert(id) {
                        continue;
                    }
                }
                images.push(img);
            }
        }

        if images.is_empty() {
            debug!("No XObject images referenced by pages, scanning all objects");
            images = self.all_image_objects();
        }

        debug!("Found {} embedded images", images.len());
        images
    }

    fn text_layer(&self) -> Result<String> {
        let data = &self.raw_data;
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                warn!("Text layer extractor panicked");
                Err(PdfError::TextExtraction("extractor panicked".to_string()))
            }
        }
    }

    fn raw_bytes(&self) -> &[u8] {
        &self.raw_data
    }
}
