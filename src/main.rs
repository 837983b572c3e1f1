// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use anyhow::Context;
use anyhow::Result;
use benchfilter::classifier::Classifier;
use benchfilter::cli::Cli;
use benchfilter::config::Config;
use benchfilter::logging::setup_tracing;
use benchfilter::report::Summary;
use benchfilter::rules::RuleDatabase;
use clap::Parser;
use std::io;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
  let _log_guard = setup_tracing()?;

  let cli = Cli::parse();
  let main_span = tracing::info_span!("benchfilter");
  let _enter = main_span.enter();

  let config = Config::try_from(cli).context("Failed to resolve configuration")?;

  tracing::info!(sources = ?config.rule_sources, "Loading rule database...");
  let database = RuleDatabase::load(&config.rule_sources, config.legacy_bounds_rule)
    .context("Failed to load rule database")?;
  tracing::info!(rules = database.len(), "Rule database loaded");

  let mut classifier = Classifier::new(&database);
  classifier
    .run(io::stdin().lock(), io::stderr())
    .context("Failed to filter build output")?;
  let tally = classifier.into_tally();

  let summary = Summary::build(&database, &tally, &config.acceptable);
  summary
    .write_report(&mut io::stdout().lock())
    .context("Failed to write summary")?;

  if let Some(path) = &config.report_json {
    summary
      .write_json(path)
      .with_context(|| format!("Failed to write JSON report to {}", path.display()))?;
  }

  Ok(summary.verdict().into())
}
