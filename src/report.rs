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
use crate::classifier::Tally;
use crate::error::FilterError;
use crate::rules::RuleDatabase;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Categories whose errors are known limitations rather than regressions.
pub const DEFAULT_ACCEPTABLE_CATEGORIES: [&str; 3] = ["ignore", "bounds", "inprogress"];

/// The set of categories that do not fail a benchmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptableCategories(HashSet<String>);

impl AcceptableCategories {
  pub fn new<I, S>(categories: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    AcceptableCategories(categories.into_iter().map(Into::into).collect())
  }

  pub fn contains(&self, category: &str) -> bool {
    self.0.contains(category)
  }
}

impl Default for AcceptableCategories {
  fn default() -> Self {
    AcceptableCategories::new(DEFAULT_ACCEPTABLE_CATEGORIES)
  }
}

/// One line of the summary: a tag that was seen at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
  /// The rule's category, or `"error"` when that category is not acceptable.
  pub category: String,
  pub tag: String,
  pub count: u64,
  pub note: String,
  pub acceptable: bool,
}

/// End-of-run summary built from the tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub entries: Vec<ReportEntry>,
  /// Error lines seen, acceptable or not.
  pub total_errors: u64,
  /// Error lines whose tag is bound to an unacceptable category.
  pub unacceptable: u64,
  pub passed: bool,
}

/// Pass/fail decision of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Pass,
  Fail { unacceptable: u64 },
}

impl Verdict {
  pub fn exit_code(self) -> u8 {
    match self {
      Verdict::Pass => 0,
      Verdict::Fail { .. } => 1,
    }
  }
}

impl From<Verdict> for ExitCode {
  fn from(verdict: Verdict) -> Self {
    ExitCode::from(verdict.exit_code())
  }
}

impl Summary {
  /// Walks the rules in database order. Each seen tag is reported once,
  /// under the category of the first rule carrying it.
  pub fn build(database: &RuleDatabase, tally: &Tally, acceptable: &AcceptableCategories) -> Self {
    let mut reported: HashSet<&str> = HashSet::new();
    let mut entries = Vec::new();
    let mut unacceptable = 0;

    for rule in database.iter() {
      let count = tally.count(&rule.tag);
      if count == 0 || !reported.insert(rule.tag.as_str()) {
        continue;
      }

      let is_acceptable = acceptable.contains(&rule.category);
      let category = if is_acceptable {
        rule.category.clone()
      } else {
        unacceptable += count;
        "error".to_string()
      };

      entries.push(ReportEntry {
        category,
        tag: rule.tag.clone(),
        count,
        note: rule.note.clone(),
        acceptable: is_acceptable,
      });
    }

    Summary {
      entries,
      total_errors: tally.total(),
      unacceptable,
      passed: unacceptable == 0,
    }
  }

  pub fn verdict(&self) -> Verdict {
    if self.unacceptable == 0 {
      Verdict::Pass
    } else {
      Verdict::Fail {
        unacceptable: self.unacceptable,
      }
    }
  }

  /// Writes the human-readable report.
  pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Encountered errors:")?;
    for entry in &self.entries {
      writeln!(
        out,
        "  ({}){}: {}     {}",
        entry.category, entry.tag, entry.count, entry.note
      )?;
    }

    match self.verdict() {
      Verdict::Pass => writeln!(out, "Benchmark succeeded - all errors acceptable")?,
      Verdict::Fail { unacceptable } => writeln!(
        out,
        "Benchmark failed - {} errors not acceptable",
        unacceptable
      )?,
    }
    out.flush()
  }

  /// Writes the summary as pretty JSON to `path`.
  pub fn write_json(&self, path: &Path) -> Result<(), FilterError> {
    let json = serde_json::to_string_pretty(self)?;
    fs::write(path, json)?;
    tracing::info!("JSON report written to {}", path.display());
    Ok(())
  }
}
