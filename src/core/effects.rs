//! Display effects: modals, FAQ accordion, gallery filter, back-to-top and
//! scroll reveal. Pure state toggles.

use crate::core::navigation::Section;
use crate::domain::model::CategoryFilter;
use std::collections::BTreeSet;

/// Back-to-top shows once the page is scrolled further than this.
pub const BACK_TO_TOP_THRESHOLD: f64 = 300.0;
/// Fraction of a section that must be on screen before it animates in.
pub const REVEAL_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModalId {
    Program,
    Success,
}

#[derive(Debug, Clone, Default)]
pub struct Modals {
    active: BTreeSet<ModalId>,
}

impl Modals {
    pub fn open(&mut self, id: ModalId) {
        self.active.insert(id);
    }

    pub fn close(&mut self, id: ModalId) {
        self.active.remove(&id);
    }

    /// Close button or Escape.
    pub fn close_all(&mut self) {
        self.active.clear();
    }

    /// A click on the backdrop closes only that modal.
    pub fn backdrop_click(&mut self, id: ModalId) {
        self.close(id);
    }

    pub fn is_active(&self, id: ModalId) -> bool {
        self.active.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaqItem {
    pub question: String,
    pub open: bool,
}

/// At most one answer expanded at a time.
#[derive(Debug, Clone, Default)]
pub struct FaqAccordion {
    items: Vec<FaqItem>,
}

impl FaqAccordion {
    pub fn new(questions: &[&str]) -> Self {
        Self {
            items: questions
                .iter()
                .map(|q| FaqItem {
                    question: q.to_string(),
                    open: false,
                })
                .collect(),
        }
    }

    pub fn click(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        for (i, item) in self.items.iter_mut().enumerate() {
            if i == index {
                item.open = !item.open;
            } else {
                item.open = false;
            }
        }
    }

    pub fn open_index(&self) -> Option<usize> {
        self.items.iter().position(|item| item.open)
    }

    pub fn items(&self) -> &[FaqItem] {
        &self.items
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub category: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Gallery {
    items: Vec<GalleryItem>,
}

impl Gallery {
    pub fn new(categories: &[&str]) -> Self {
        Self {
            items: categories
                .iter()
                .map(|c| GalleryItem {
                    category: c.to_string(),
                    visible: true,
                })
                .collect(),
        }
    }

    /// Returns how many items remain visible.
    pub fn filter(&mut self, filter: &CategoryFilter) -> usize {
        for item in &mut self.items {
            item.visible = filter.matches(&item.category);
        }
        self.items.iter().filter(|item| item.visible).count()
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BackToTop {
    visible: bool,
}

impl BackToTop {
    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.visible = scroll_y > BACK_TO_TOP_THRESHOLD;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Adds `animate-in` to every section that is at least 10% on screen.
/// Returns ids of sections revealed by this call.
pub fn reveal_sections(sections: &mut [Section], scroll_y: f64, viewport: f64) -> Vec<String> {
    let mut revealed = Vec::new();
    for section in sections.iter_mut() {
        if !section.revealed && section.visible_ratio(scroll_y, viewport) >= REVEAL_THRESHOLD {
            section.revealed = true;
            revealed.push(section.id.clone());
        }
    }
    revealed
}
