//! Top navigation: mobile menu, link highlighting and the page sections the
//! highlight follows.

/// Offset added to the scroll position when picking the current section.
pub const NAV_SCROLL_OFFSET: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub top: f64,
    pub height: f64,
    /// Has received the `animate-in` class.
    pub revealed: bool,
}

impl Section {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
            revealed: false,
        }
    }

    pub fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }

    /// Share of this section inside the viewport `[scroll_y, scroll_y + viewport)`.
    pub fn visible_ratio(&self, scroll_y: f64, viewport: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let start = self.top.max(scroll_y);
        let end = (self.top + self.height).min(scroll_y + viewport);
        ((end - start).max(0.0) / self.height).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Navigation {
    menu_open: bool,
    links: Vec<NavLink>,
}

impl Navigation {
    pub fn new(section_ids: &[&str]) -> Self {
        Self {
            menu_open: false,
            links: section_ids
                .iter()
                .map(|id| NavLink {
                    href: format!("#{}", id),
                    active: false,
                })
                .collect(),
        }
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Value of the toggle button's `aria-expanded`.
    pub fn aria_expanded(&self) -> &'static str {
        if self.menu_open {
            "true"
        } else {
            "false"
        }
    }

    pub fn click_link(&mut self, href: &str) {
        self.menu_open = false;
        self.set_active(href);
    }

    pub fn escape(&mut self) {
        self.menu_open = false;
    }

    /// Marks the link of the section under `scroll_y + 100`. Leaves the
    /// current highlight alone when no section contains that point.
    pub fn highlight_for_scroll(&mut self, scroll_y: f64, sections: &[Section]) {
        let position = scroll_y + NAV_SCROLL_OFFSET;
        if let Some(section) = sections.iter().rev().find(|s| s.contains(position)) {
            let href = format!("#{}", section.id);
            self.set_active(&href);
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.active)
            .map(|link| link.href.as_str())
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    fn set_active(&mut self, href: &str) {
        for link in &mut self.links {
            link.active = link.href == href;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        vec![
            Section::new("home", 0.0, 600.0),
            Section::new("about", 600.0, 800.0),
            Section::new("programs", 1400.0, 1000.0),
        ]
    }

    #[test]
    fn nav_menu_toggle_and_escape() {
        let mut nav = Navigation::new(&["home", "about"]);
        nav.toggle_menu();
        assert!(nav.is_menu_open());
        assert_eq!(nav.aria_expanded(), "true");

        nav.escape();
        assert!(!nav.is_menu_open());
        assert_eq!(nav.aria_expanded(), "false");
    }

    #[test]
    fn nav_link_click_closes_menu_and_marks_active() {
        let mut nav = Navigation::new(&["home", "about"]);
        nav.toggle_menu();
        nav.click_link("#about");
        assert!(!nav.is_menu_open());
        assert_eq!(nav.active(), Some("#about"));
        assert_eq!(nav.links().iter().filter(|l| l.active).count(), 1);
    }

    #[test]
    fn nav_highlight_follows_scroll_offset() {
        let mut nav = Navigation::new(&["home", "about", "programs"]);
        let sections = sections();

        nav.highlight_for_scroll(0.0, &sections);
        assert_eq!(nav.active(), Some("#home"));

        // 510 + 100 lands inside "about"
        nav.highlight_for_scroll(510.0, &sections);
        assert_eq!(nav.active(), Some("#about"));

        // past the end of the page: keep the last highlight
        nav.highlight_for_scroll(5000.0, &sections);
        assert_eq!(nav.active(), Some("#about"));
    }
}
