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
use std::path::PathBuf;
use thiserror::Error;

/// Errors from writing run output (src/report.rs).
#[derive(Error, Debug)]
pub enum FilterError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON serialization error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Errors related to loading rule sources (src/rules.rs).
///
/// Only `InvalidPattern` escapes `RuleDatabase::load`; the other variants
/// describe why a single source was dropped and are logged, not returned.
#[derive(Error, Debug)]
pub enum RuleError {
  #[error("Failed to read rule source: {path}")]
  ReadSource {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Malformed CSV rule source: {path}")]
  Csv {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("Malformed TOML rule source: {path}")]
  Toml {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("Rule '{tag}' in {path} has neither a 'category' nor an 'isError' value")]
  MissingCategory { path: PathBuf, tag: String },

  #[error("Invalid regex for rule '{tag}' from {origin}")]
  InvalidPattern {
    origin: String,
    tag: String,
    #[source]
    source: regex::Error,
  },
}

/// Errors related to configuration resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Config file not found: {0}")]
  FileNotFound(PathBuf),

  #[error("Failed to resolve settings")]
  Extract(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
  fn from(err: figment::Error) -> Self {
    ConfigError::Extract(Box::new(err))
  }
}
