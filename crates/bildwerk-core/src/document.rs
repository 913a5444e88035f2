// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document model — the ordered image sequence, its page styling, and the
// currently focused entry.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::types::{ImageEntry, PageSpec};

/// An ordered collection of images rendered one per page.
///
/// Entry order is page order. It only changes through the explicit
/// mutation methods below, each of which keeps `focused` either `None`
/// (empty document) or a valid index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub page: PageSpec,
    #[serde(default)]
    entries: Vec<ImageEntry>,
    #[serde(skip)]
    focused: Option<usize>,
}

impl Document {
    pub fn new(page: PageSpec) -> Self {
        Self {
            page,
            entries: Vec::new(),
            focused: None,
        }
    }

    /// Build a document from existing entries, focusing the first one.
    pub fn with_entries(page: PageSpec, entries: Vec<ImageEntry>) -> Self {
        let focused = if entries.is_empty() { None } else { Some(0) };
        Self {
            page,
            entries,
            focused,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageEntry> {
        self.entries.get(index)
    }

    /// Mutable access for parameter edits. Does not affect ordering.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ImageEntry> {
        self.entries.get_mut(index)
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Focused index using the `-1 = nothing focused` convention.
    pub fn focused_index(&self) -> isize {
        self.focused.map_or(-1, |index| index as isize)
    }

    pub fn focused_entry(&self) -> Option<&ImageEntry> {
        self.focused.and_then(|index| self.entries.get(index))
    }

    pub fn focused_entry_mut(&mut self) -> Option<&mut ImageEntry> {
        self.focused.and_then(|index| self.entries.get_mut(index))
    }

    // -- Mutation -------------------------------------------------------------

    /// Focus `index` if it is valid. Returns false for an out-of-range index.
    pub fn focus(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.focused = Some(index);
            true
        } else {
            false
        }
    }

    /// Append an entry and focus it.
    pub fn add(&mut self, entry: ImageEntry) {
        self.entries.push(entry);
        self.focused = Some(self.entries.len() - 1);
    }

    /// Append several entries, focusing the first of the new ones.
    pub fn add_many(&mut self, entries: impl IntoIterator<Item = ImageEntry>) {
        let first_new = self.entries.len();
        self.entries.extend(entries);
        if self.entries.len() > first_new {
            self.focused = Some(first_new);
        }
    }

    /// Insert at `index` (clamped to the end) and focus the new entry.
    pub fn insert(&mut self, index: usize, entry: ImageEntry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        self.focused = Some(index);
    }

    /// Remove the entry at `index`.
    ///
    /// Focus stays on the entry it was on. When the focused entry itself is
    /// removed, focus moves to the entry now occupying its slot, or to the new
    /// last entry when the tail was removed.
    pub fn remove(&mut self, index: usize) -> Option<ImageEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.focused = match self.entries.len() {
            0 => None,
            len => {
                let focus = match self.focused {
                    Some(focus) if focus > index => focus - 1,
                    Some(focus) => focus,
                    None => index,
                };
                Some(focus.min(len - 1))
            }
        };
        debug!(index, remaining = self.entries.len(), "Entry removed");
        Some(removed)
    }

    /// Swap two entries. Out-of-range indices leave the document untouched.
    ///
    /// Focus follows the entry it was on.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        let len = self.entries.len();
        if a >= len || b >= len {
            return false;
        }
        if a == b {
            return true;
        }
        self.entries.swap(a, b);
        self.focused = self.focused.map(|focus| {
            if focus == a {
                b
            } else if focus == b {
                a
            } else {
                focus
            }
        });
        true
    }

    /// Swap `index` with the entry before it.
    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.swap(index, index - 1)
    }

    /// Swap `index` with the entry after it.
    pub fn move_down(&mut self, index: usize) -> bool {
        index + 1 < self.entries.len() && self.swap(index, index + 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.focused = None;
    }

    // -- Persistence ----------------------------------------------------------

    /// Load a project file. Relative image paths resolve against the
    /// project file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_default_page(path, &PageSpec::default())
    }

    /// Load a project file, using `default_page` when the file carries no
    /// `page` section of its own.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_with_default_page(
        path: impl AsRef<Path>,
        default_page: &PageSpec,
    ) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut value: serde_json::Value = serde_json::from_str(&raw)?;
        if let Some(object) = value.as_object_mut()
            && !object.contains_key("page")
        {
            debug!("Project has no page section, applying configured default");
            object.insert("page".into(), serde_json::to_value(default_page)?);
        }
        let mut document: Document = serde_json::from_value(value)?;

        if let Some(base) = path.parent() {
            for entry in &mut document.entries {
                entry.source = entry.source.resolved_against(base);
            }
        }
        document.focused = if document.entries.is_empty() {
            None
        } else {
            Some(0)
        };

        info!(
            entries = document.entries.len(),
            format = %document.page.format_name,
            "Project loaded"
        );
        Ok(document)
    }

    /// Write the document as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        info!("Saved project to {}", path.as_ref().display());
        Ok(())
    }
}
