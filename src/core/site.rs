use crate::adapters::{DirSource, HttpSink, HttpSource, LogSink};
use crate::config::SiteConfig;
use crate::core::chatbot::{ChatWidget, PendingReply, Responder};
use crate::core::content::{
    program_detail, render_program_options, render_programs, ContentLoader, PROGRAM_SELECTED,
};
use crate::core::counters::COUNTER_THRESHOLD;
use crate::core::effects::{reveal_sections, ModalId};
use crate::core::forms::FormPipeline;
use crate::core::notify::Notifier;
use crate::core::page::Page;
use crate::core::preferences::PreferenceStore;
use crate::domain::model::{
    CategoryFilter, FormRecord, ItemId, Language, NewsItem, Program, Theme,
};
use crate::domain::ports::{ContentSource, KeyValueStore, SubmissionSink};
use crate::utils::error::Result;
use crate::utils::monitor::LoadTimer;
use chrono::Datelike;
use std::sync::Arc;
use std::time::Duration;

pub const ONLINE: &str = "Интернет қосылды";
pub const OFFLINE: &str = "Интернет қосылмаған. Кейбір функциялар шектеулі болады.";

pub fn build_source(config: &SiteConfig) -> Result<Arc<dyn ContentSource>> {
    if config.content_is_remote() {
        Ok(Arc::new(HttpSource::new(&config.content.base)?))
    } else {
        Ok(Arc::new(DirSource::new(&config.content.base)))
    }
}

pub fn build_sink(config: &SiteConfig) -> Arc<dyn SubmissionSink> {
    match &config.submission.endpoint {
        Some(endpoint) => Arc::new(HttpSink::new(endpoint.clone())),
        None => Arc::new(LogSink),
    }
}

/// Every component of the site, wired once at startup. Event handlers are
/// methods here; components only see the dependencies they were given.
pub struct Site<S: KeyValueStore + Clone> {
    page: Page,
    notifier: Notifier,
    content: ContentLoader,
    forms: FormPipeline<S>,
    prefs: PreferenceStore<S>,
    chat: ChatWidget,
    programs: Vec<Program>,
    news: Vec<NewsItem>,
    loading_delay: Duration,
    counter_duration: Duration,
    timer: LoadTimer,
}

impl<S: KeyValueStore + Clone> Site<S> {
    pub fn new(
        store: S,
        source: Arc<dyn ContentSource>,
        sink: Arc<dyn SubmissionSink>,
        config: &SiteConfig,
    ) -> Self {
        let notifier = Notifier::new(config.toast_timing());
        tracing::debug!("Content source: {}", source.describe());

        Self {
            page: Page::college_home(),
            content: ContentLoader::new(
                Arc::clone(&source),
                notifier.clone(),
                config.content_paths(),
            ),
            forms: FormPipeline::new(store.clone(), notifier.clone(), sink),
            prefs: PreferenceStore::new(
                store,
                source,
                notifier.clone(),
                config.content.translations_dir.clone(),
            ),
            chat: ChatWidget::new(Responder::default(), config.chat_delay()),
            notifier,
            programs: Vec::new(),
            news: Vec::new(),
            loading_delay: config.loading_delay(),
            counter_duration: config.counter_duration(),
            timer: LoadTimer::new(config.monitoring.enabled),
        }
    }

    /// Startup sequence. Individual failures degrade one feature only.
    pub async fn start(&mut self) {
        let loading_done = tokio::time::Instant::now() + self.loading_delay;

        self.page.footer_year = Some(chrono::Local::now().year());
        self.prefs.restore(&mut self.page).await;
        self.timer.log_phase("preferences");

        self.reload_programs().await;
        self.reload_news().await;
        self.timer.log_phase("content");

        tokio::time::sleep_until(loading_done).await;
        self.page.loading_visible = false;

        tracing::info!("🎓 ORDA College website loaded");
        self.timer.log_final();
    }

    pub async fn reload_programs(&mut self) -> bool {
        let Some(programs) = self.content.load_programs().await else {
            return false;
        };
        self.programs = programs;
        self.page.programs_grid = render_programs(&self.programs, &self.page.program_filter);
        self.page.program_options = render_program_options(&self.programs);
        true
    }

    pub async fn reload_news(&mut self) -> bool {
        let Some(news) = self.content.load_news().await else {
            return false;
        };
        self.page.news_grid = self.content.render_news(&news);
        self.news = news;
        true
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn news(&self) -> &[NewsItem] {
        &self.news
    }

    pub fn chat_widget(&self) -> &ChatWidget {
        &self.chat
    }

    pub fn forms(&self) -> &FormPipeline<S> {
        &self.forms
    }

    /// Filter button: re-render the grid and bring the section into view.
    pub fn filter_programs(&mut self, filter: &str) {
        self.page.program_filter = CategoryFilter::parse(filter);
        self.page.programs_grid = render_programs(&self.programs, &self.page.program_filter);
        self.page.nav.click_link("#programs");
    }

    /// "View" on a program card. Unknown ids are ignored.
    pub fn view_program(&mut self, id: &str) -> bool {
        match program_detail(&self.programs, &ItemId::new(id)) {
            Some(html) => {
                self.page.program_modal = html;
                self.page.modals.open(ModalId::Program);
                true
            }
            None => {
                tracing::debug!("No program with id {}", id);
                false
            }
        }
    }

    /// "Apply" inside the program modal.
    pub fn apply_for_program(&mut self, id: &str) {
        self.page.modals.close(ModalId::Program);
        self.page.nav.click_link("#apply");
        self.page.application_form.set("program", id);
        self.notifier.info(PROGRAM_SELECTED);
    }

    pub fn submit_inquiry(&mut self) -> Result<FormRecord> {
        self.forms.submit_inquiry(&mut self.page.inquiry_form)
    }

    pub fn submit_application(&mut self) -> Result<FormRecord> {
        let record = self.forms.submit_application(&mut self.page.application_form)?;
        self.page.modals.open(ModalId::Success);
        Ok(record)
    }

    pub fn subscribe(&mut self) -> Result<bool> {
        self.forms.subscribe(&mut self.page.newsletter_form)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.prefs.toggle_theme(&mut self.page)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.prefs.set_theme(&mut self.page, theme)
    }

    pub async fn set_language(&mut self, language: Language) -> Result<bool> {
        self.prefs.set_language(&mut self.page, language).await
    }

    pub fn toggle_chat(&mut self) {
        self.chat.toggle();
    }

    pub fn close_chat(&mut self) {
        self.chat.close();
    }

    /// Posts the message; the bot's line follows after the typing delay
    /// without holding up other handlers.
    pub fn chat(&mut self, message: &str) -> Option<PendingReply> {
        self.chat.send(message)
    }

    pub fn toggle_menu(&mut self) {
        self.page.nav.toggle_menu();
    }

    pub fn click_nav_link(&mut self, href: &str) {
        self.page.nav.click_link(href);
    }

    pub fn click_faq(&mut self, index: usize) {
        self.page.faq.click(index);
    }

    /// Gallery filter button. Returns how many items stay visible.
    pub fn filter_gallery(&mut self, filter: &str) -> usize {
        self.page.gallery.filter(&CategoryFilter::parse(filter))
    }

    /// A modal's close button.
    pub fn close_modals(&mut self) {
        self.page.modals.close_all();
    }

    pub fn click_backdrop(&mut self, id: ModalId) {
        self.page.modals.backdrop_click(id);
    }

    /// Scroll handler: nav highlight, back-to-top, section reveal, and the
    /// stats counters once their section is half on screen. The counters
    /// animate in the background.
    pub fn scroll_to(&mut self, scroll_y: f64) {
        let page = &mut self.page;
        page.nav.highlight_for_scroll(scroll_y, &page.sections);
        page.back_to_top.on_scroll(scroll_y);
        for id in reveal_sections(&mut page.sections, scroll_y, page.viewport_height) {
            tracing::debug!("Section '{}' animated in", id);
        }

        let stats_visible = page
            .sections
            .iter()
            .find(|section| section.id == page.stats_section)
            .is_some_and(|section| {
                section.visible_ratio(scroll_y, page.viewport_height) >= COUNTER_THRESHOLD
            });
        if !stats_visible {
            return;
        }

        let started = page.counters.start(self.counter_duration);
        if started > 0 {
            tracing::debug!("🔢 {} counters started", started);
        }
    }

    pub fn back_to_top(&mut self) {
        self.page.nav.highlight_for_scroll(0.0, &self.page.sections);
        self.page.back_to_top.on_scroll(0.0);
    }

    /// Escape closes the mobile menu and every modal.
    pub fn press_escape(&mut self) {
        self.page.nav.escape();
        self.page.modals.close_all();
    }

    /// Finishes background work that must not be lost, i.e. forwarded
    /// applications. Call before dropping the runtime.
    pub async fn shutdown(&self) {
        let forwarded = self.forms.flush().await;
        if forwarded > 0 {
            tracing::debug!("Waited for {} forwarded applications", forwarded);
        }
    }

    pub fn connectivity_changed(&self, online: bool) {
        if online {
            self.notifier.success(ONLINE);
        } else {
            self.notifier.warning(OFFLINE);
        }
    }
}
