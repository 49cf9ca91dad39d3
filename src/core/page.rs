//! In-memory model of the rendered home page: everything the scripts read
//! from or write to.

use crate::core::counters::{Counters, StatCounter};
use crate::core::effects::{BackToTop, FaqAccordion, Gallery, Modals};
use crate::core::navigation::{Navigation, Section};
use crate::core::forms::{Form, FormKind};
use crate::domain::model::{CategoryFilter, Language, Theme};
use std::collections::BTreeMap;

/// Element whose content is looked up by a translation key.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub key: String,
    pub text: String,
}

impl TextNode {
    fn new(key: &str, text: &str) -> Self {
        Self {
            key: key.to_string(),
            text: text.to_string(),
        }
    }
}

const SECTION_IDS: [&str; 7] = ["home", "about", "programs", "apply", "news", "faq", "contact"];

#[derive(Debug, Clone)]
pub struct Page {
    /// `data-theme` on the root element.
    pub theme: Theme,
    /// Highlighted language button.
    pub language: Language,
    pub loading_visible: bool,
    /// `data-i18n` elements.
    pub texts: Vec<TextNode>,
    /// `data-i18n-placeholder` inputs.
    pub placeholders: Vec<TextNode>,
    pub programs_grid: String,
    pub program_filter: CategoryFilter,
    pub news_grid: String,
    pub program_options: String,
    pub program_modal: String,
    pub modals: Modals,
    pub nav: Navigation,
    pub faq: FaqAccordion,
    pub gallery: Gallery,
    pub back_to_top: BackToTop,
    pub sections: Vec<Section>,
    /// Id of the section holding the stats counters.
    pub stats_section: String,
    pub counters: Counters,
    pub viewport_height: f64,
    pub footer_year: Option<i32>,
    pub inquiry_form: Form,
    pub application_form: Form,
    pub newsletter_form: Form,
}

impl Page {
    /// The college home page as shipped, in Kazakh.
    pub fn college_home() -> Self {
        let texts = vec![
            TextNode::new("nav.home", "Басты бет"),
            TextNode::new("nav.about", "Колледж туралы"),
            TextNode::new("nav.programs", "Мамандықтар"),
            TextNode::new("nav.apply", "Қабылдау"),
            TextNode::new("nav.news", "Жаңалықтар"),
            TextNode::new("nav.faq", "Сұрақтар"),
            TextNode::new("nav.contact", "Байланыс"),
            TextNode::new("hero.title", "ORDA колледжі"),
            TextNode::new("hero.subtitle", "Болашағыңызды бізбен бірге құрыңыз"),
            TextNode::new("programs.title", "Мамандықтар"),
            TextNode::new("apply.title", "Өтініш беру"),
            TextNode::new("news.title", "Соңғы жаңалықтар"),
            TextNode::new("footer.rights", "Барлық құқықтар қорғалған"),
        ];
        let placeholders = vec![
            TextNode::new("form.name", "Аты-жөніңіз"),
            TextNode::new("form.phone", "Телефон нөміріңіз"),
            TextNode::new("form.email", "Электрондық пошта"),
            TextNode::new("form.message", "Сұрағыңыз"),
            TextNode::new("chat.placeholder", "Хабарлама жазыңыз..."),
        ];

        let sections = SECTION_IDS
            .iter()
            .enumerate()
            .map(|(i, id)| Section::new(*id, i as f64 * 800.0, 800.0))
            .collect();

        Self {
            theme: Theme::default(),
            language: Language::default(),
            loading_visible: true,
            texts,
            placeholders,
            programs_grid: String::new(),
            program_filter: CategoryFilter::All,
            news_grid: String::new(),
            program_options: String::new(),
            program_modal: String::new(),
            modals: Modals::default(),
            nav: Navigation::new(&SECTION_IDS),
            faq: FaqAccordion::new(&[
                "Қабылдау қашан басталады?",
                "Гранттар бар ма?",
                "Жатақхана бар ма?",
                "Оқу ақысы қанша?",
            ]),
            gallery: Gallery::new(&["campus", "events", "sport", "campus", "events", "labs"]),
            back_to_top: BackToTop::default(),
            sections,
            stats_section: "about".to_string(),
            counters: Counters::new(vec![
                StatCounter::new("programs", 38),
                StatCounter::new("students", 2500),
                StatCounter::new("teachers", 150),
                StatCounter::new("employment", 92),
            ]),
            viewport_height: 900.0,
            footer_year: None,
            inquiry_form: Form::new(FormKind::Inquiry),
            application_form: Form::new(FormKind::Application),
            newsletter_form: Form::new(FormKind::Newsletter),
        }
    }

    /// Replaces the text of every node whose key has a non-empty entry.
    /// Nodes without an entry keep what they had. Returns how many changed.
    pub fn apply_translations(&mut self, dictionary: &BTreeMap<String, String>) -> usize {
        let mut updated = 0;
        for node in self.texts.iter_mut().chain(self.placeholders.iter_mut()) {
            if let Some(text) = dictionary.get(&node.key).filter(|t| !t.is_empty()) {
                node.text = text.clone();
                updated += 1;
            }
        }
        updated
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        find_text(&self.texts, key)
    }

    pub fn placeholder(&self, key: &str) -> Option<&str> {
        find_text(&self.placeholders, key)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::college_home()
    }
}

fn find_text<'a>(nodes: &'a [TextNode], key: &str) -> Option<&'a str> {
    nodes
        .iter()
        .find(|node| node.key == key)
        .map(|node| node.text.as_str())
}
