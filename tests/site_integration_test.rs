use httpmock::prelude::*;
use orda_site::core::chatbot::GRANTS_REPLY;
use orda_site::core::content::{PROGRAMS_FAILED, PROGRAM_SELECTED};
use orda_site::core::effects::ModalId;
use orda_site::core::site::{build_sink, build_source, OFFLINE, ONLINE};
use orda_site::domain::model::{Language, Severity, Theme};
use orda_site::domain::ports::KeyValueStore;
use orda_site::{FileStore, MemoryStore, Site, SiteConfig};
use std::time::Duration;
use tempfile::TempDir;

fn programs_json() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 1,
            "code": "06130100",
            "title": "Бағдарламалық қамтамасыз ету",
            "category": "it",
            "duration": "3 жыл 10 ай",
            "description": "Веб және мобильді әзірлеу",
            "features": ["Заманауи зертханалар", "Тағылымдама"],
            "curriculum": ["Алгоритмдер", "Деректер базасы"],
            "careers": ["Бағдарламашы"]
        },
        {
            "id": 2,
            "code": "04110100",
            "title": "Есеп және аудит",
            "category": "business",
            "duration": "2 жыл 10 ай",
            "description": "Бухгалтерлік есеп",
            "features": ["1С практикасы"],
            "price": "350 000 ₸"
        },
        {
            "id": "3",
            "code": "06120100",
            "title": "Ақпараттық қауіпсіздік",
            "category": "it",
            "duration": "3 жыл 10 ай",
            "description": "Желілерді қорғау",
            "features": []
        }
    ])
}

fn news_json() -> serde_json::Value {
    let items: Vec<serde_json::Value> = (1..=5)
        .map(|i| {
            serde_json::json!({
                "id": i,
                "title": format!("Жаңалық {}", i),
                "excerpt": "Қысқаша",
                "image": format!("images/news-{}.jpg", i),
                "date": "2026-09-01"
            })
        })
        .collect();
    serde_json::Value::Array(items)
}

fn config_for(server: &MockServer) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.content.base = server.base_url();
    config.timing.loading_ms = 10;
    config.timing.chat_delay_ms = 10;
    config
}

fn mock_content(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/data/programs.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(programs_json());
    });
    server.mock(|when, then| {
        when.method(GET).path("/data/news.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(news_json());
    });
    server.mock(|when, then| {
        when.method(GET).path("/translations/kk.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"nav.home": "Басты бет"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/translations/ru.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "nav.home": "Главная",
                "form.phone": "Номер телефона"
            }));
    });
}

fn site_with<S: KeyValueStore + Clone>(store: S, config: &SiteConfig) -> Site<S> {
    let source = build_source(config).unwrap();
    let sink = build_sink(config);
    Site::new(store, source, sink, config)
}

#[tokio::test]
async fn test_startup_renders_content_and_restores_language() {
    let server = MockServer::start();
    mock_content(&server);

    let store = MemoryStore::new();
    store.set("language", "ru").unwrap();
    store.set("theme", "dark").unwrap();

    let config = config_for(&server);
    let mut site = site_with(store, &config);
    site.start().await;

    let page = site.page();
    assert!(!page.loading_visible);
    assert_eq!(page.theme, Theme::Dark);
    assert_eq!(page.language, Language::Ru);
    assert_eq!(page.text("nav.home"), Some("Главная"));
    assert_eq!(page.placeholder("form.phone"), Some("Номер телефона"));
    assert!(page.footer_year.is_some());

    assert_eq!(site.programs().len(), 3);
    assert_eq!(page.programs_grid.matches(r#"class="program-card""#).count(), 3);
    assert_eq!(page.program_options.matches("<option").count(), 4);

    // five news items fetched, three rendered
    assert_eq!(site.news().len(), 5);
    assert_eq!(page.news_grid.matches(r#"class="news-card""#).count(), 3);
    assert!(!page.news_grid.contains("Жаңалық 4"));
}

#[tokio::test]
async fn test_program_failure_shows_error_and_keeps_news() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/data/programs.json");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/data/news.json");
        then.status(200).json_body(news_json());
    });
    // no translation mocks: locale fetch fails and is only logged

    let config = config_for(&server);
    let mut site = site_with(MemoryStore::new(), &config);
    site.start().await;

    let toast = site.notifier().current().unwrap();
    assert_eq!(toast.message, PROGRAMS_FAILED);
    assert_eq!(toast.severity, Severity::Error);
    assert!(site.page().programs_grid.is_empty());
    assert_eq!(site.page().news_grid.matches("news-card").count(), 3);
    assert_eq!(site.page().text("nav.home"), Some("Басты бет"));
}

#[tokio::test]
async fn test_news_failure_is_silent() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/data/programs.json");
        then.status(200).json_body(programs_json());
    });
    server.mock(|when, then| {
        when.method(GET).path("/data/news.json");
        then.status(200).body("not json");
    });

    let config = config_for(&server);
    let mut site = site_with(MemoryStore::new(), &config);
    site.start().await;

    assert!(site.page().news_grid.is_empty());
    assert!(site.notifier().current().is_none());
    assert_eq!(site.programs().len(), 3);
}

#[tokio::test]
async fn test_filter_view_and_apply_for_program() {
    let server = MockServer::start();
    mock_content(&server);
    let config = config_for(&server);
    let mut site = site_with(MemoryStore::new(), &config);
    site.start().await;

    site.filter_programs("it");
    let grid = &site.page().programs_grid;
    assert_eq!(grid.matches(r#"class="program-card""#).count(), 2);
    assert!(!grid.contains("Есеп және аудит"));
    assert_eq!(site.page().nav.active(), Some("#programs"));

    site.filter_programs("all");
    assert_eq!(site.page().programs_grid.matches(r#"class="program-card""#).count(), 3);

    // unknown id: nothing happens
    assert!(!site.view_program("99"));
    assert!(!site.page().modals.is_active(ModalId::Program));

    assert!(site.view_program("3"));
    assert!(site.page().modals.is_active(ModalId::Program));
    assert!(site.page().program_modal.contains("Ақпараттық қауіпсіздік"));

    site.apply_for_program("3");
    assert!(!site.page().modals.is_active(ModalId::Program));
    assert_eq!(site.page().application_form.get("program"), Some("3"));
    assert_eq!(site.notifier().current().unwrap().message, PROGRAM_SELECTED);
}

#[tokio::test]
async fn test_application_is_stored_and_forwarded() {
    let server = MockServer::start();
    mock_content(&server);
    let submit_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/applications")
            .json_body_partial(r#"{"fullName": "Aruzhan", "program": "1", "status": "new"}"#);
        then.status(201);
    });

    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("storage.json");

    let mut config = config_for(&server);
    config.submission.endpoint = Some(server.url("/api/applications"));
    let mut site = site_with(FileStore::new(&store_path), &config);
    site.start().await;

    let form = &mut site.page_mut().application_form;
    form.set("fullName", "Aruzhan");
    form.set("phone", "+7 (701) 555-11-22");
    form.set("program", "1");
    let record = site.submit_application().unwrap();

    assert!(site.page().modals.is_active(ModalId::Success));
    assert!(site.page().application_form.is_empty());

    // forwarding runs in the background until the site shuts down
    site.shutdown().await;
    submit_mock.assert();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    let applications: Vec<serde_json::Value> =
        serde_json::from_str(saved["applications"].as_str().unwrap()).unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0]["id"], serde_json::json!(record.id.unwrap()));
}

#[tokio::test]
async fn test_forwarding_failure_does_not_reach_user() {
    let server = MockServer::start();
    mock_content(&server);
    server.mock(|when, then| {
        when.method(POST).path("/api/applications");
        then.status(500);
    });

    let mut config = config_for(&server);
    config.submission.endpoint = Some(server.url("/api/applications"));
    let mut site = site_with(MemoryStore::new(), &config);
    site.start().await;

    let form = &mut site.page_mut().application_form;
    form.set("fullName", "Dias");
    form.set("phone", "+77015551122");
    form.set("program", "2");
    assert!(site.submit_application().is_ok());

    site.shutdown().await;
    assert_eq!(site.notifier().current().unwrap().severity, Severity::Success);
    assert_eq!(site.forms().applications().unwrap().len(), 1);
}

#[tokio::test]
async fn test_preferences_persist_across_sessions() {
    let server = MockServer::start();
    mock_content(&server);
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("storage.json");
    let config = config_for(&server);

    let mut site = site_with(FileStore::new(&store_path), &config);
    site.start().await;
    assert_eq!(site.page().theme, Theme::Light);
    site.toggle_theme().unwrap();
    assert!(site.set_language(Language::Ru).await.unwrap());

    let mut next = site_with(FileStore::new(&store_path), &config);
    next.start().await;
    assert_eq!(next.page().theme, Theme::Dark);
    assert_eq!(next.page().language, Language::Ru);
    assert_eq!(next.page().text("nav.home"), Some("Главная"));

    next.toggle_theme().unwrap();
    assert_eq!(
        FileStore::new(&store_path).get("theme").unwrap().as_deref(),
        Some("light")
    );
}

#[tokio::test]
async fn test_newsletter_dedup_across_sessions() {
    let server = MockServer::start();
    mock_content(&server);
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("storage.json");
    let config = config_for(&server);

    for _ in 0..2 {
        let mut site = site_with(FileStore::new(&store_path), &config);
        site.page_mut().newsletter_form.set("email", "user@example.com");
        site.subscribe().unwrap();
    }

    let site = site_with(FileStore::new(&store_path), &config);
    assert_eq!(site.forms().subscribers().unwrap(), vec!["user@example.com"]);
}

#[tokio::test]
async fn test_chat_and_connectivity_toasts() {
    let server = MockServer::start();
    mock_content(&server);
    let config = config_for(&server);
    let mut site = site_with(MemoryStore::new(), &config);

    site.toggle_chat();
    assert!(site.chat_widget().is_open());
    let pending = site.chat("тегін не гранты бар?").unwrap();
    assert_eq!(site.chat_widget().messages().len(), 1);

    // other handlers run while the bot is typing
    assert_eq!(site.toggle_theme().unwrap(), Theme::Dark);
    assert_eq!(pending.arrived().await, GRANTS_REPLY);
    assert_eq!(site.chat_widget().messages().len(), 2);

    site.connectivity_changed(false);
    site.connectivity_changed(true);
    let toast = site.notifier().current().unwrap();
    assert_eq!(toast.message, ONLINE);
    assert_ne!(toast.message, OFFLINE);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_effects_and_counters() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = SiteConfig::default();
    config.content.base = temp_dir.path().display().to_string();
    let mut site = site_with(MemoryStore::new(), &config);

    site.toggle_menu();
    assert!(site.page().nav.is_menu_open());
    site.page_mut().modals.open(ModalId::Success);
    site.press_escape();
    assert!(!site.page().nav.is_menu_open());
    assert!(!site.page().modals.is_active(ModalId::Success));

    site.scroll_to(0.0);
    assert!(!site.page().back_to_top.is_visible());
    assert!(site.page().counters.snapshot().iter().all(|c| !c.is_started()));

    // "about" (800..1600) is fully on screen
    let scrolled = tokio::time::Instant::now();
    site.scroll_to(800.0);
    assert_eq!(tokio::time::Instant::now(), scrolled);
    assert!(site.page().back_to_top.is_visible());
    assert_eq!(site.page().nav.active(), Some("#about"));
    assert!(site.page().section("about").unwrap().revealed);

    // the site keeps handling events while the counters run
    site.click_nav_link("#contact");
    assert_eq!(site.page().nav.active(), Some("#contact"));
    assert_eq!(site.page().counters.value("students"), Some(0));

    tokio::time::sleep(Duration::from_millis(2100)).await;
    let counters = site.page().counters.snapshot();
    assert!(counters.iter().all(|c| c.is_started() && c.value == c.target));

    site.back_to_top();
    assert!(!site.page().back_to_top.is_visible());
    assert_eq!(site.page().nav.active(), Some("#home"));
}

#[tokio::test]
async fn test_faq_gallery_and_modal_handlers() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = SiteConfig::default();
    config.content.base = temp_dir.path().display().to_string();
    let mut site = site_with(MemoryStore::new(), &config);

    site.click_faq(1);
    assert_eq!(site.page().faq.open_index(), Some(1));
    site.click_faq(0);
    assert_eq!(site.page().faq.open_index(), Some(0));

    assert_eq!(site.filter_gallery("campus"), 2);
    assert_eq!(site.filter_gallery("all"), site.page().gallery.items().len());

    site.page_mut().modals.open(ModalId::Program);
    site.page_mut().modals.open(ModalId::Success);
    site.click_backdrop(ModalId::Success);
    assert!(site.page().modals.is_active(ModalId::Program));
    assert!(!site.page().modals.is_active(ModalId::Success));
    site.close_modals();
    assert!(!site.page().modals.is_active(ModalId::Program));
}

#[test]
fn test_cli_exit_still_delivers_forwarded_application() {
    let server = MockServer::start();
    mock_content(&server);
    let submit_mock = server.mock(|when, then| {
        when.method(POST).path("/api/applications");
        then.status(201);
    });

    let mut config = config_for(&server);
    config.submission.endpoint = Some(server.url("/api/applications"));

    // same lifecycle as the binary: one runtime, dropped right after the command
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let mut site = site_with(MemoryStore::new(), &config);
        site.start().await;
        let form = &mut site.page_mut().application_form;
        form.set("fullName", "Aigerim");
        form.set("phone", "+77011234567");
        form.set("program", "2");
        site.submit_application().unwrap();
        site.shutdown().await;
    });
    drop(runtime);

    submit_mock.assert_hits(1);
}
