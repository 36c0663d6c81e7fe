//! Per-page annotation store.

use crate::objects::{AnnotationObject, ObjectId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The ordered object sequence of one page.
///
/// Array order is z-order: the last element is visually topmost. Persistence
/// preserves this order exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageObjects {
    pub objects: Vec<AnnotationObject>,
}

impl PageObjects {
    /// Iterate symbols only, in z-order.
    pub fn symbols(&self) -> impl Iterator<Item = &crate::objects::SymbolObject> {
        self.objects.iter().filter_map(|o| o.as_symbol())
    }
}

/// Annotation objects for the whole document, keyed by zero-based page index.
///
/// Page records are created lazily on first access and never destroyed; an
/// unvisited page simply has no record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationStore {
    pub pages: BTreeMap<usize, PageObjects>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a page record, creating an empty one on first visit.
    pub fn get_or_create_page(&mut self, index: usize) -> &mut PageObjects {
        self.pages.entry(index).or_default()
    }

    /// Get a page record without creating it.
    pub fn page(&self, index: usize) -> Option<&PageObjects> {
        self.pages.get(&index)
    }

    /// Append an object to a page; it becomes topmost.
    pub fn insert(&mut self, page_index: usize, object: AnnotationObject) -> ObjectId {
        let id = object.id();
        self.get_or_create_page(page_index).objects.push(object);
        id
    }

    /// Remove an object from a page.
    pub fn remove(&mut self, page_index: usize, id: ObjectId) -> Option<AnnotationObject> {
        let page = self.pages.get_mut(&page_index)?;
        let idx = page.objects.iter().position(|o| o.id() == id)?;
        Some(page.objects.remove(idx))
    }

    pub fn find(&self, page_index: usize, id: ObjectId) -> Option<&AnnotationObject> {
        self.pages
            .get(&page_index)?
            .objects
            .iter()
            .find(|o| o.id() == id)
    }

    pub fn find_mut(&mut self, page_index: usize, id: ObjectId) -> Option<&mut AnnotationObject> {
        self.pages
            .get_mut(&page_index)?
            .objects
            .iter_mut()
            .find(|o| o.id() == id)
    }

    /// Move an object to the end of its page's sequence (topmost).
    /// Relative order of all other objects is unchanged.
    pub fn bring_to_front(&mut self, page_index: usize, id: ObjectId) -> bool {
        let Some(page) = self.pages.get_mut(&page_index) else {
            return false;
        };
        let Some(idx) = page.objects.iter().position(|o| o.id() == id) else {
            return false;
        };
        let obj = page.objects.remove(idx);
        page.objects.push(obj);
        true
    }

    /// Hit-test a world point against a page, topmost object first.
    /// Returns the first (visually topmost) match.
    pub fn hit_test(&self, page_index: usize, point: Point) -> Option<ObjectId> {
        self.pages
            .get(&page_index)?
            .objects
            .iter()
            .rev()
            .find(|o| o.hit_test(point))
            .map(|o| o.id())
    }
}
