use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Classifies build errors against a rule database and decides whether a benchmark passed",
  after_help = "Usage: BUILD_COMMAND 2>&1 | benchfilter [RULE_FILES]...\n\
                Annotated build output goes to stderr, the summary to stdout."
)]
pub struct Cli {
  /// Rule databases (CSV or TOML), tried in order before the default database.
  /// Missing files are skipped.
  pub rule_files: Vec<PathBuf>,

  /// Settings file (TOML or JSON). Defaults to ./benchfilter.toml when present.
  #[arg(long, env = "BENCHFILTER_CONFIG")]
  pub config: Option<PathBuf>,

  /// Categories whose errors do not fail the benchmark. Replaces the configured set.
  /// Example: --acceptable ignore,bounds,inprogress
  #[arg(long, value_delimiter = ',')]
  pub acceptable: Option<Vec<String>>,

  /// Rule database consulted after all RULE_FILES.
  #[arg(long)]
  pub default_database: Option<PathBuf>,

  /// Append the built-in `unknown_bounds` rule before the fallback rule.
  #[arg(long)]
  pub legacy_bounds_rule: bool,

  /// Also write the summary as JSON to this path.
  #[arg(long)]
  pub report_json: Option<PathBuf>,
}
