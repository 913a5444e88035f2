// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect existing PDF documents and concatenate several of them
// into one, using the `lopdf` crate.

use std::collections::HashMap;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Reads existing PDF files.
///
/// Wraps `lopdf::Document` with the handful of queries Bildwerk needs: page
/// count, page sizes, and page-order-preserving concatenation.
pub struct PdfReader {
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            BildwerkError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            BildwerkError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Width and height in points of every page, in page order, taken from
    /// each page's (possibly inherited) MediaBox.
    pub fn page_sizes_pt(&self) -> Result<Vec<(f32, f32)>> {
        self.document
            .get_pages()
            .values()
            .map(|&page_id| {
                let media_box = inherited_attribute(&self.document, page_id, b"MediaBox")
                    .ok_or_else(|| {
                        BildwerkError::Pdf(format!("page {:?} has no MediaBox", page_id))
                    })?;
                media_box_size(&self.document, &media_box)
            })
            .collect()
    }

    // -- Merging --------------------------------------------------------------

    /// Concatenate every page of every file in `paths`, in order.
    ///
    /// All inputs are validated before any of them is loaded: the list must be
    /// non-empty and each path must exist and carry a `.pdf` extension.
    #[instrument(skip_all, fields(inputs = paths.len()))]
    pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<u8>> {
        if paths.is_empty() {
            return Err(BildwerkError::EmptyDocument);
        }
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                return Err(BildwerkError::Pdf(format!(
                    "file not found: {}",
                    path.display()
                )));
            }
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                return Err(BildwerkError::Pdf(format!(
                    "not a PDF file: {}",
                    path.display()
                )));
            }
        }

        let readers = paths
            .iter()
            .map(|path| Self::open(path))
            .collect::<Result<Vec<_>>>()?;
        let documents: Vec<&Document> = readers.iter().map(|r| &r.document).collect();
        merge_documents(&documents)
    }

    /// Concatenate in-memory PDFs, in order.
    pub fn merge_bytes(inputs: &[&[u8]]) -> Result<Vec<u8>> {
        if inputs.is_empty() {
            return Err(BildwerkError::EmptyDocument);
        }
        let readers = inputs
            .iter()
            .map(|bytes| Self::from_bytes(bytes))
            .collect::<Result<Vec<_>>>()?;
        let documents: Vec<&Document> = readers.iter().map(|r| &r.document).collect();
        merge_documents(&documents)
    }
}

/// Build a fresh document whose page tree holds every source page in order.
fn merge_documents(sources: &[&Document]) -> Result<Vec<u8>> {
    let mut target = Document::with_version("1.5");
    let pages_id = target.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        let mut cloned: HashMap<ObjectId, ObjectId> = HashMap::new();
        // get_pages() is keyed by 1-based page number, so values come out in order.
        for &page_id in source.get_pages().values() {
            let new_page_id = clone_reference(source, &mut target, page_id, &mut cloned)?;

            let mut inherited = Vec::new();
            for key in INHERITABLE_KEYS {
                if let Some(value) = inherited_attribute(source, page_id, key) {
                    inherited.push((key, deep_clone_object(source, &mut target, &value, &mut cloned)?));
                }
            }

            if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(new_page_id) {
                for (key, value) in inherited {
                    if !page_dict.has(key) {
                        page_dict.set(key, value);
                    }
                }
                page_dict.set("Parent", Object::Reference(pages_id));
            }
            kids.push(Object::Reference(new_page_id));
        }
        debug!(document = index + 1, total_pages = kids.len(), "Document appended");
    }

    let count = kids.len() as i64;
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    target.save_to(&mut output).map_err(|err| {
        BildwerkError::Pdf(format!("failed to serialise merged PDF: {}", err))
    })?;

    info!(pages = count, output_bytes = output.len(), "Merge complete");
    Ok(output)
}

/// Look up `key` on a page, walking up /Parent links when the page itself
/// does not carry it.
fn inherited_attribute(document: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    // Bounded walk guards against malformed cyclic trees.
    for _ in 0..64 {
        let node = document.get_dictionary(current?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Width and height of a `[llx lly urx ury]` rectangle.
fn media_box_size(document: &Document, media_box: &Object) -> Result<(f32, f32)> {
    let resolved = resolve(document, media_box);
    let Object::Array(coords) = resolved else {
        return Err(BildwerkError::Pdf("MediaBox is not an array".to_string()));
    };
    let values = coords
        .iter()
        .map(|value| number(resolve(document, value)))
        .collect::<Option<Vec<f32>>>()
        .filter(|values| values.len() == 4)
        .ok_or_else(|| BildwerkError::Pdf("MediaBox must hold four numbers".to_string()))?;
    Ok(((values[2] - values[0]).abs(), (values[3] - values[1]).abs()))
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

/// Clone the object behind `source_id` into `target`, reusing an earlier
/// clone when the same object is reached twice.
fn clone_reference(
    source: &Document,
    target: &mut Document,
    source_id: ObjectId,
    cloned: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    if let Some(&existing) = cloned.get(&source_id) {
        return Ok(existing);
    }
    // Reserve the id first so cycles (e.g. annotation /P back-links) resolve.
    let new_id = target.new_object_id();
    cloned.insert(source_id, new_id);

    let object = source.get_object(source_id).map_err(|err| {
        BildwerkError::Pdf(format!("cannot read object {:?}: {}", source_id, err))
    })?;
    let copy = deep_clone_object(source, target, object, cloned)?;
    target.objects.insert(new_id, copy);
    Ok(new_id)
}

/// Deep-clone a single lopdf Object, re-homing references into `target`.
///
/// /Parent entries are dropped; the merged page tree sets its own.
fn deep_clone_object(
    source: &Document,
    target: &mut Document,
    object: &Object,
    cloned: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match object {
        Object::Dictionary(dict) => Ok(Object::Dictionary(clone_dictionary(
            source, target, dict, cloned,
        )?)),
        Object::Array(items) => {
            let mut new_items = Vec::with_capacity(items.len());
            for item in items {
                new_items.push(deep_clone_object(source, target, item, cloned)?);
            }
            Ok(Object::Array(new_items))
        }
        Object::Reference(ref_id) => match source.get_object(*ref_id) {
            Ok(_) => Ok(Object::Reference(clone_reference(
                source, target, *ref_id, cloned,
            )?)),
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                Ok(Object::Null)
            }
        },
        Object::Stream(stream) => {
            let mut copy = stream.clone();
            copy.dict = clone_dictionary(source, target, &stream.dict, cloned)?;
            Ok(Object::Stream(copy))
        }
        other => Ok(other.clone()),
    }
}

fn clone_dictionary(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
    cloned: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        if key == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), deep_clone_object(source, target, value, cloned)?);
    }
    Ok(new_dict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::PdfWriter;
    use bildwerk_core::PageFormat;
    use image::{Rgb, RgbImage};

    fn pdf_with_pages(format: PageFormat, count: u8) -> Vec<u8> {
        let (w, h) = format.dimensions_pt();
        let pages: Vec<RgbImage> = (0..count)
            .map(|i| RgbImage::from_pixel(w as u32, h as u32, Rgb([i, i, i])))
            .collect();
        PdfWriter::new(format).write_pages(&pages).unwrap()
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            PdfReader::from_bytes(b"not a pdf"),
            Err(BildwerkError::Pdf(_))
        ));
    }

    #[test]
    fn merge_bytes_concatenates_in_order() {
        let first = pdf_with_pages(PageFormat::A4, 2);
        let second = pdf_with_pages(PageFormat::Letter, 1);

        let merged = PdfReader::merge_bytes(&[&first, &second]).unwrap();
        let reader = PdfReader::from_bytes(&merged).unwrap();
        assert_eq!(reader.page_count(), 3);

        let sizes = reader.page_sizes_pt().unwrap();
        assert!((sizes[0].0 - 595.27).abs() < 0.5);
        assert!((sizes[1].0 - 595.27).abs() < 0.5);
        assert!((sizes[2].0 - 612.0).abs() < 0.5);
        assert!((sizes[2].1 - 792.0).abs() < 0.5);
    }

    #[test]
    fn merge_files_validates_inputs() {
        let empty: [&Path; 0] = [];
        assert!(matches!(
            PdfReader::merge_files(&empty),
            Err(BildwerkError::EmptyDocument)
        ));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        let err = PdfReader::merge_files(&[&missing]).err().unwrap();
        assert!(err.to_string().contains("missing.pdf"));

        let not_pdf = dir.path().join("notes.txt");
        std::fs::write(&not_pdf, "hello").unwrap();
        let err = PdfReader::merge_files(&[&not_pdf]).err().unwrap();
        assert!(err.to_string().contains("not a PDF"));
    }

    #[test]
    fn merge_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.PDF");
        std::fs::write(&a, pdf_with_pages(PageFormat::A5, 1)).unwrap();
        std::fs::write(&b, pdf_with_pages(PageFormat::A5, 2)).unwrap();

        let merged = PdfReader::merge_files(&[&a, &b]).unwrap();
        assert_eq!(PdfReader::from_bytes(&merged).unwrap().page_count(), 3);

        let reader = PdfReader::open(&a).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert!(reader.source_path().unwrap().ends_with("a.pdf"));
    }
}
