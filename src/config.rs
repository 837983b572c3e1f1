use crate::cli::Cli;
use crate::error::ConfigError;
use crate::report::AcceptableCategories;
use crate::report::DEFAULT_ACCEPTABLE_CATEGORIES;
use crate::rules::source_order;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Serialized;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Settings file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "benchfilter.toml";

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "BENCHFILTER_";

// --- Default Values ---
fn default_database() -> PathBuf {
  PathBuf::from("benchmark_errors.csv")
}

fn default_acceptable_categories() -> Vec<String> {
  DEFAULT_ACCEPTABLE_CATEGORIES
    .iter()
    .map(|c| c.to_string())
    .collect()
}

/// Layered settings: defaults, then the settings file, then `BENCHFILTER_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub acceptable_categories: Vec<String>,
  pub default_database: PathBuf,
  pub legacy_bounds_rule: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Settings {
      acceptable_categories: default_acceptable_categories(),
      default_database: default_database(),
      legacy_bounds_rule: false,
    }
  }
}

impl Settings {
  /// Resolves settings. An explicit `config_file` must exist; the implicit
  /// `benchfilter.toml` is optional.
  pub fn resolve(config_file: Option<&Path>) -> Result<Self, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    match config_file {
      Some(path) => {
        if !path.exists() {
          return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        tracing::debug!(path = %path.display(), "Reading settings file");
        figment = if is_json(path) {
          figment.merge(Json::file(path))
        } else {
          figment.merge(Toml::file(path))
        };
      }
      None => figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
    }

    let settings = figment
      .merge(Env::prefixed(ENV_PREFIX).only(&[
        "acceptable_categories",
        "default_database",
        "legacy_bounds_rule",
      ]))
      .extract()?;
    Ok(settings)
  }
}

fn is_json(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Fully resolved configuration for one run.
#[derive(Debug)]
pub struct Config {
  /// Rule sources in matching order; the default database comes last.
  pub rule_sources: Vec<PathBuf>,
  pub acceptable: AcceptableCategories,
  pub legacy_bounds_rule: bool,
  pub report_json: Option<PathBuf>,
}

impl TryFrom<Cli> for Config {
  type Error = ConfigError;

  fn try_from(
    Cli {
      rule_files,
      config,
      acceptable,
      default_database,
      legacy_bounds_rule,
      report_json,
    }: Cli,
  ) -> Result<Self, Self::Error> {
    let settings = Settings::resolve(config.as_deref())?;

    let default_database = default_database.unwrap_or(settings.default_database);
    let acceptable = acceptable.unwrap_or(settings.acceptable_categories);

    Ok(Config {
      rule_sources: source_order(&rule_files, &default_database),
      acceptable: AcceptableCategories::new(acceptable),
      legacy_bounds_rule: legacy_bounds_rule || settings.legacy_bounds_rule,
      report_json,
    })
  }
}
