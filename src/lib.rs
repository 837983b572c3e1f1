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

//! # Benchfilter
//!
//! `benchfilter` sits at the end of a benchmark build pipeline
//! (`BUILD_COMMAND 2>&1 | benchfilter`). It tags every `<file>: error: <message>`
//! line with the first matching rule from a rule database, echoes the build
//! output to stderr as it streams by, and exits non-zero when any error falls
//! outside the acceptable categories.
//!
//! ## Core Modules
//!
//! * [`rules`]: Loads the ordered rule database from CSV or TOML sources and
//!   appends the `UNKNOWN_ERROR` fallback rule.
//! * [`classifier`]: The streaming line classifier and the per-tag `Tally`.
//! * [`report`]: Builds the end-of-run `Summary` and the pass/fail `Verdict`.
//! * [`config`]: Layers defaults, the settings file, environment variables and
//!   CLI overrides into a `Config`.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod rules;
