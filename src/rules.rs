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
use crate::error::RuleError;
use regex::bytes::Regex;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

/// Tag of the rule that catches every error no other rule claims.
pub const FALLBACK_TAG: &str = "UNKNOWN_ERROR";

/// Category of the fallback rule. It is never acceptable.
pub const FALLBACK_CATEGORY: &str = "error";

const FALLBACK_REGEX: &str = ".*";

const BUILTIN_ORIGIN: &str = "<built-in>";

/// A single classification rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct Rule {
  pub category: String,
  pub tag: String,
  pub note: String,
  pattern: Regex,
}

impl Rule {
  /// Compiles `regex` into a rule. `origin` names where the rule came from
  /// and only shows up in the error.
  pub fn new(
    category: impl Into<String>,
    tag: impl Into<String>,
    regex: &str,
    note: impl Into<String>,
    origin: &str,
  ) -> Result<Self, RuleError> {
    let tag = tag.into();
    let pattern = Regex::new(regex).map_err(|source| RuleError::InvalidPattern {
      origin: origin.to_string(),
      tag: tag.clone(),
      source,
    })?;

    Ok(Rule {
      category: category.into(),
      tag,
      note: note.into(),
      pattern,
    })
  }

  /// The source text of the rule's pattern.
  pub fn regex(&self) -> &str {
    self.pattern.as_str()
  }

  /// Tests the rule against the message part of an error line.
  pub fn is_match(&self, message: &[u8]) -> bool {
    self.pattern.is_match(message)
  }

  fn fallback() -> Result<Self, RuleError> {
    Rule::new(
      FALLBACK_CATEGORY,
      FALLBACK_TAG,
      FALLBACK_REGEX,
      "",
      BUILTIN_ORIGIN,
    )
  }

  /// Compatibility rule from the first version of the filter, which only
  /// knew about unknown bounds.
  fn legacy_bounds() -> Result<Self, RuleError> {
    Rule::new(
      "bounds",
      "unknown_bounds",
      "^expression has unknown bounds$",
      "",
      BUILTIN_ORIGIN,
    )
  }
}

/// `isError` column of the older database schema. CSV cells arrive as
/// inferred scalars, TOML values as real booleans.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IsError {
  Bool(bool),
  Int(i64),
  Text(String),
}

impl IsError {
  fn category(&self) -> &'static str {
    let truthy = match self {
      IsError::Bool(b) => *b,
      IsError::Int(i) => *i != 0,
      IsError::Text(s) => matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
      ),
    };
    if truthy { "error" } else { "ignore" }
  }
}

/// One row of a rule source, before its category is resolved.
#[derive(Debug, Deserialize)]
struct RawRule {
  #[serde(default)]
  category: Option<String>,
  #[serde(default, rename = "isError")]
  is_error: Option<IsError>,
  tag: String,
  regex: String,
  #[serde(default)]
  note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlRuleFile {
  #[serde(default, rename = "rule")]
  rules: Vec<RawRule>,
}

/// Rule row whose category is known, still holding the regex text.
struct PendingRule {
  category: String,
  tag: String,
  regex: String,
  note: String,
}

/// The ordered rule list. The fallback rule always sits behind the loaded
/// rules, so every error message finds a rule.
#[derive(Debug, Clone)]
pub struct RuleDatabase {
  rules: Vec<Rule>,
  fallback: Rule,
}

impl RuleDatabase {
  /// Loads rules from `sources` in order, optionally followed by the legacy
  /// bounds rule, then the fallback.
  ///
  /// Missing sources are skipped. A source that cannot be read or parsed
  /// contributes nothing. An invalid regex aborts the load.
  pub fn load<P: AsRef<Path>>(sources: &[P], legacy_bounds_rule: bool) -> Result<Self, RuleError> {
    let mut rules = Vec::new();

    for source in sources {
      let path = source.as_ref();
      let pending = match read_source(path) {
        Ok(Some(pending)) => pending,
        Ok(None) => {
          tracing::debug!(path = %path.display(), "Rule source not found. Skipping.");
          continue;
        }
        Err(e) => {
          tracing::warn!(error = %e, "Ignoring malformed rule source");
          continue;
        }
      };

      let origin = path.display().to_string();
      for PendingRule {
        category,
        tag,
        regex,
        note,
      } in pending
      {
        rules.push(Rule::new(category, tag, &regex, note, &origin)?);
      }
      tracing::debug!(path = %origin, total = rules.len(), "Loaded rule source");
    }

    if legacy_bounds_rule {
      rules.push(Rule::legacy_bounds()?);
    }

    Ok(RuleDatabase {
      rules,
      fallback: Rule::fallback()?,
    })
  }

  /// Builds a database from already compiled rules, appending the fallback.
  pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Result<Self, RuleError> {
    Ok(RuleDatabase {
      rules: rules.into_iter().collect(),
      fallback: Rule::fallback()?,
    })
  }

  /// All rules in matching order, fallback last.
  pub fn iter(&self) -> impl Iterator<Item = &Rule> {
    self.rules.iter().chain(std::iter::once(&self.fallback))
  }

  /// Number of rules, fallback included.
  pub fn len(&self) -> usize {
    self.rules.len() + 1
  }

  /// Always false: the fallback rule is part of every database.
  pub fn is_empty(&self) -> bool {
    false
  }

  /// The first rule whose pattern matches `message`.
  pub fn first_match(&self, message: &[u8]) -> &Rule {
    self
      .rules
      .iter()
      .find(|rule| rule.is_match(message))
      .unwrap_or(&self.fallback)
  }
}

/// Reads one source. `Ok(None)` means the file does not exist.
fn read_source(path: &Path) -> Result<Option<Vec<PendingRule>>, RuleError> {
  let content = match fs::read(path) {
    Ok(content) => content,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(RuleError::ReadSource {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  let raw = if is_toml(path) {
    parse_toml(path, &content)?
  } else {
    parse_csv(path, &content)?
  };

  raw
    .into_iter()
    .map(|row| resolve_category(path, row))
    .collect::<Result<Vec<_>, _>>()
    .map(Some)
}

fn is_toml(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn parse_csv(path: &Path, content: &[u8]) -> Result<Vec<RawRule>, RuleError> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .from_reader(content);

  let csv_error = |source| RuleError::Csv {
    path: path.to_path_buf(),
    source,
  };
  let has_category = reader
    .headers()
    .map_err(csv_error)?
    .iter()
    .any(|header| header == "category");

  let mut rows = reader
    .deserialize::<RawRule>()
    .collect::<Result<Vec<RawRule>, _>>()
    .map_err(csv_error)?;

  // csv reads a blank cell as `None`; under a `category` header it is the
  // empty category, not a missing one.
  if has_category {
    for row in &mut rows {
      row.category.get_or_insert_with(String::new);
    }
  }
  Ok(rows)
}

fn parse_toml(path: &Path, content: &[u8]) -> Result<Vec<RawRule>, RuleError> {
  let text = String::from_utf8_lossy(content);
  let file: TomlRuleFile = toml::from_str(&text).map_err(|source| RuleError::Toml {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(file.rules)
}

fn resolve_category(path: &Path, raw: RawRule) -> Result<PendingRule, RuleError> {
  let category = match (raw.category, &raw.is_error) {
    (Some(category), _) => category,
    (None, Some(is_error)) => is_error.category().to_string(),
    (None, None) => {
      return Err(RuleError::MissingCategory {
        path: path.to_path_buf(),
        tag: raw.tag,
      });
    }
  };

  Ok(PendingRule {
    category,
    tag: raw.tag,
    regex: raw.regex,
    note: raw.note.unwrap_or_default(),
  })
}

/// Paths to try, in order: explicit rule files, then the default database.
pub fn source_order(rule_files: &[PathBuf], default_database: &Path) -> Vec<PathBuf> {
  rule_files
    .iter()
    .cloned()
    .chain(std::iter::once(default_database.to_path_buf()))
    .collect()
}
