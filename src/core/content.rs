use crate::core::notify::Notifier;
use crate::core::render::{join_map, Escaped};
use crate::domain::model::{CategoryFilter, ItemId, NewsItem, Program};
use crate::domain::ports::ContentSource;
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub const PROGRAMS_FAILED: &str = "Мамандықтарды жүктеу сәтсіз аяқталды";
pub const PROGRAM_SELECTED: &str = "Мамандық таңдалды. Өтініш формасына өтіңіз.";

const DEFAULT_STUDY_TYPE: &str = "Күндізгі";
const DEFAULT_STUDY_LANGUAGE: &str = "Қазақ/орыс";
const DEFAULT_PRICE: &str = "Ақылы/грант";

/// Where the loader finds its collections.
#[derive(Debug, Clone)]
pub struct ContentPaths {
    pub programs: String,
    pub news: String,
    /// How many news cards the home page shows.
    pub news_limit: usize,
}

impl Default for ContentPaths {
    fn default() -> Self {
        Self {
            programs: "data/programs.json".to_string(),
            news: "data/news.json".to_string(),
            news_limit: 3,
        }
    }
}

/// Fetches the static collections and turns them into markup.
pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
    notifier: Notifier,
    paths: ContentPaths,
}

impl ContentLoader {
    pub fn new(source: Arc<dyn ContentSource>, notifier: Notifier, paths: ContentPaths) -> Self {
        Self {
            source,
            notifier,
            paths,
        }
    }

    pub fn paths(&self) -> &ContentPaths {
        &self.paths
    }

    pub async fn load_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let value = self.source.fetch_json(path).await?;
        let items: Vec<T> = serde_json::from_value(value)?;
        tracing::debug!("Loaded {} items from {}", items.len(), path);
        Ok(items)
    }

    /// Program failures are the only content failures the visitor is told about.
    pub async fn load_programs(&self) -> Option<Vec<Program>> {
        match self.load_collection(&self.paths.programs).await {
            Ok(programs) => Some(programs),
            Err(e) => {
                tracing::error!("❌ Programs loading failed: {}", e);
                self.notifier.error(PROGRAMS_FAILED);
                None
            }
        }
    }

    pub async fn load_news(&self) -> Option<Vec<NewsItem>> {
        match self.load_collection(&self.paths.news).await {
            Ok(news) => Some(news),
            Err(e) => {
                tracing::error!("❌ News loading failed: {}", e);
                None
            }
        }
    }

    pub fn render_news(&self, news: &[NewsItem]) -> String {
        let shown = &news[..news.len().min(self.paths.news_limit)];
        join_map(shown, news_card)
    }
}

/// Programs whose category passes `filter`, in collection order.
pub fn filter_programs<'a>(programs: &'a [Program], filter: &CategoryFilter) -> Vec<&'a Program> {
    programs
        .iter()
        .filter(|program| filter.matches(&program.category))
        .collect()
}

/// Full replacement content for the programs grid.
pub fn render_programs(programs: &[Program], filter: &CategoryFilter) -> String {
    filter_programs(programs, filter)
        .into_iter()
        .map(program_card)
        .collect()
}

pub fn find_program<'a>(programs: &'a [Program], id: &ItemId) -> Option<&'a Program> {
    programs.iter().find(|program| &program.id == id)
}

/// Detail view for the program modal; `None` when the id is unknown.
pub fn program_detail(programs: &[Program], id: &ItemId) -> Option<String> {
    find_program(programs, id).map(program_modal)
}

/// `<option>` list for the application form's program selector.
pub fn render_program_options(programs: &[Program]) -> String {
    let mut html =
        String::from(r#"<option value="" selected disabled>Мамандықты таңдаңыз</option>"#);
    for program in programs {
        html.push_str(&format!(
            r#"<option value="{}">{} - {}</option>"#,
            Escaped(program.id.as_str()),
            Escaped(&program.code),
            Escaped(&program.title)
        ));
    }
    html
}

fn program_card(program: &Program) -> String {
    let features = join_map(&program.features, |feature| {
        format!(r#"<li><i class="fas fa-check"></i> {}</li>"#, Escaped(feature))
    });

    format!(
        r#"<div class="program-card" data-category="{category}"><div class="program-header"><div><h3 class="program-title">{title}</h3><div class="program-code">{code}</div></div><span class="program-duration">{duration}</span></div><div class="program-body"><p class="program-description">{description}</p><ul class="program-features">{features}</ul></div><div class="program-footer"><button class="btn btn-primary btn-block view-program" data-id="{id}"><i class="fas fa-eye"></i> Толығырақ</button></div></div>"#,
        category = Escaped(&program.category),
        title = Escaped(&program.title),
        code = Escaped(&program.code),
        duration = Escaped(&program.duration),
        description = Escaped(&program.description),
        features = features,
        id = Escaped(program.id.as_str()),
    )
}

fn program_modal(program: &Program) -> String {
    let curriculum = program
        .curriculum
        .as_deref()
        .map(|items| {
            join_map(items, |item| {
                format!(r#"<li><i class="fas fa-book"></i> {}</li>"#, Escaped(item))
            })
        })
        .unwrap_or_default();
    let careers = program
        .careers
        .as_deref()
        .map(|items| {
            join_map(items, |career| {
                format!(r#"<span class="career-tag">{}</span>"#, Escaped(career))
            })
        })
        .unwrap_or_default();

    format!(
        r#"<div class="program-modal"><div class="modal-header"><h2>{title}</h2><div class="badges"><span class="badge">{code}</span><span class="badge">{duration}</span><span class="badge">{category}</span></div></div><div class="modal-body"><div class="row"><div><h3>Сипаттама</h3><p>{description}</p><h3>Оқыту бағдарламасы</h3><ul class="curriculum">{curriculum}</ul><h3>Карьера мүмкіндіктері</h3><div class="careers">{careers}</div></div><div><div class="info-card"><h4>Негізгі ақпарат</h4><p><strong>Оқу мерзімі:</strong> {duration}</p><p><strong>Түрі:</strong> {study_type}</p><p><strong>Тілі:</strong> {language}</p><p><strong>Бағасы:</strong> {price}</p><button class="btn btn-primary btn-block apply-program" data-id="{id}"><i class="fas fa-paper-plane"></i> Осы мамандыққа өтініш беру</button></div></div></div></div></div>"#,
        title = Escaped(&program.title),
        code = Escaped(&program.code),
        duration = Escaped(&program.duration),
        category = Escaped(&program.category),
        description = Escaped(&program.description),
        curriculum = curriculum,
        careers = careers,
        study_type = Escaped(program.study_type.as_deref().unwrap_or(DEFAULT_STUDY_TYPE)),
        language = Escaped(program.language.as_deref().unwrap_or(DEFAULT_STUDY_LANGUAGE)),
        price = Escaped(program.price.as_deref().unwrap_or(DEFAULT_PRICE)),
        id = Escaped(program.id.as_str()),
    )
}

fn news_card(item: &NewsItem) -> String {
    format!(
        r#"<div class="news-card"><div class="news-image"><img src="{image}" alt="{title}" loading="lazy"></div><div class="news-content"><div class="news-date"><i class="far fa-calendar"></i> {date}</div><h3 class="news-title">{title}</h3><p class="news-excerpt">{excerpt}</p><a href="news.html?id={id}" class="btn btn-outline"><i class="fas fa-arrow-right"></i> Оқу</a></div></div>"#,
        image = Escaped(&item.image),
        title = Escaped(&item.title),
        date = Escaped(&item.date),
        excerpt = Escaped(&item.excerpt),
        id = Escaped(item.id.as_str()),
    )
}
