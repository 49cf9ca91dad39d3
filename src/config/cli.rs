use crate::config::site_config::SiteConfig;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "orda-site")]
#[command(about = "Headless runner for the ORDA college website scripts")]
#[command(version)]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Web root with data/ and translations/ (URL or directory)
    #[arg(long)]
    pub content: Option<String>,

    /// JSON file used as the browser's local storage
    #[arg(long)]
    pub store: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render the programs grid
    Programs {
        /// Category to show, or "all"
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Render one program's detail view
    Program { id: String },
    /// Render the news cards
    News,
    /// Ask the chatbot
    Chat { message: String },
    /// Submit the consultation form
    Inquiry {
        /// Form field as name=value, repeatable
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Submit the application form
    Apply {
        #[arg(long, default_value = "")]
        full_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        program: String,
        /// Extra form field as name=value, repeatable
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Subscribe to the newsletter
    Subscribe { email: String },
    /// Show or change the theme
    Theme {
        #[arg(value_enum, default_value = "show")]
        action: ThemeAction,
    },
    /// Switch the site language (kk, ru, en)
    Language { code: String },
    /// Print the footer copyright year
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

impl CliConfig {
    /// Command-line flags win over the file.
    pub fn apply_overrides(&self, config: &mut SiteConfig) {
        if let Some(content) = &self.content {
            config.content.base = content.clone();
        }
        if let Some(store) = &self.store {
            config.storage.path = Some(store.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_apply_with_extra_fields() {
        let cli = CliConfig::try_parse_from([
            "orda-site",
            "--store",
            "state.json",
            "apply",
            "--full-name",
            "Aruzhan",
            "--phone",
            "+77001234567",
            "--program",
            "3",
            "--field",
            "email=a@b.kz",
        ])
        .unwrap();

        match &cli.command {
            Command::Apply {
                full_name, fields, ..
            } => {
                assert_eq!(full_name, "Aruzhan");
                assert_eq!(fields, &vec![("email".to_string(), "a@b.kz".to_string())]);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let mut config = SiteConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.storage.path.as_deref(), Some("state.json"));
        assert_eq!(config.content.base, ".");
    }

    #[test]
    fn rejects_malformed_field() {
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
        assert_eq!(
            parse_field("message=a=b").unwrap(),
            ("message".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn theme_defaults_to_show() {
        let cli = CliConfig::try_parse_from(["orda-site", "theme"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Theme {
                action: ThemeAction::Show
            }
        ));
    }
}
