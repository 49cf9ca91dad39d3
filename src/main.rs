use clap::Parser;
use orda_site::config::{Command, ThemeAction};
use orda_site::core::site::{build_sink, build_source};
use orda_site::domain::model::{Language, Theme};
use orda_site::domain::ports::KeyValueStore;
use orda_site::utils::{logger, validation::Validate};
use orda_site::{CliConfig, FileStore, MemoryStore, Site, SiteConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = CliConfig::parse();

    let mut config = match &cli.config {
        Some(path) => match SiteConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                return Ok(ExitCode::FAILURE);
            }
        },
        None => SiteConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        return Ok(ExitCode::FAILURE);
    }
    if cli.verbose {
        tracing::debug!("Site config: {:?}", config);
    }

    let source = build_source(&config)?;
    let sink = build_sink(&config);

    let outcome = match config.storage.path.clone() {
        Some(path) => {
            let site = Site::new(FileStore::new(path), source, sink, &config);
            run(site, cli.command).await
        }
        None => {
            tracing::debug!("No storage path configured, using memory store");
            let site = Site::new(MemoryStore::new(), source, sink, &config);
            run(site, cli.command).await
        }
    };

    Ok(outcome)
}

async fn run<S: KeyValueStore + Clone>(mut site: Site<S>, command: Command) -> ExitCode {
    site.start().await;

    let accepted = match command {
        Command::Programs { category } => {
            site.filter_programs(&category);
            println!("{}", site.page().programs_grid);
            true
        }
        Command::Program { id } => {
            if site.view_program(&id) {
                println!("{}", site.page().program_modal);
            }
            true
        }
        Command::News => {
            println!("{}", site.page().news_grid);
            true
        }
        Command::Chat { message } => {
            if let Some(pending) = site.chat(&message) {
                println!("{}", pending.arrived().await);
            }
            true
        }
        Command::Inquiry { fields } => {
            for (name, value) in &fields {
                site.page_mut().inquiry_form.set(name, value);
            }
            site.submit_inquiry().is_ok()
        }
        Command::Apply {
            full_name,
            phone,
            program,
            fields,
        } => {
            let form = &mut site.page_mut().application_form;
            form.set("fullName", &full_name);
            form.set("phone", &phone);
            form.set("program", &program);
            for (name, value) in &fields {
                form.set(name, value);
            }
            match site.submit_application() {
                Ok(record) => {
                    println!("{}", record.id.unwrap_or_default());
                    true
                }
                Err(_) => false,
            }
        }
        Command::Subscribe { email } => {
            site.page_mut().newsletter_form.set("email", &email);
            site.subscribe().is_ok()
        }
        Command::Theme { action } => {
            let result = match action {
                ThemeAction::Show => Ok(()),
                ThemeAction::Toggle => site.toggle_theme().map(|_| ()),
                ThemeAction::Light => site.set_theme(Theme::Light),
                ThemeAction::Dark => site.set_theme(Theme::Dark),
            };
            println!("{}", site.page().theme.as_str());
            result.is_ok()
        }
        Command::Year => {
            if let Some(year) = site.page().footer_year {
                println!("© {} ORDA College", year);
            }
            true
        }
        Command::Language { code } => match Language::parse(&code) {
            Some(language) => site.set_language(language).await.is_ok(),
            None => {
                eprintln!("❌ Unsupported language '{}', use kk, ru or en", code);
                false
            }
        },
    };

    site.shutdown().await;

    if let Some(toast) = site.notifier().current() {
        eprintln!("🔔 [{}] {}", toast.severity.as_str(), toast.message);
    }

    if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
