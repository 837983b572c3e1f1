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
use crate::rules::Rule;
use crate::rules::RuleDatabase;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::io::BufRead;
use std::io::Write;

const ERROR_SEPARATOR: &[u8] = b": error: ";

/// A compiler diagnostic of the shape `<prefix>: error: <message>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLine<'a> {
  pub prefix: &'a [u8],
  pub message: &'a [u8],
}

impl<'a> ErrorLine<'a> {
  /// Splits `line` at the first `": error: "`. Returns `None` for lines
  /// that are not error diagnostics.
  pub fn parse(line: &'a [u8]) -> Option<Self> {
    let at = line
      .windows(ERROR_SEPARATOR.len())
      .position(|window| window == ERROR_SEPARATOR)?;

    Some(ErrorLine {
      prefix: &line[..at],
      message: &line[at + ERROR_SEPARATOR.len()..],
    })
  }

  /// Rebuilds the line with `tag` embedded in the separator:
  /// `<prefix>: error (<tag>): <message>`.
  pub fn annotate(&self, tag: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.prefix.len() + self.message.len() + tag.len() + 12);
    out.extend_from_slice(self.prefix);
    out.extend_from_slice(b": error (");
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(b"): ");
    out.extend_from_slice(self.message);
    out
  }
}

/// Per-tag count of classified error lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
  counts: HashMap<String, u64>,
}

impl Tally {
  /// A tally with every tag of `database` at zero.
  pub fn for_database(database: &RuleDatabase) -> Self {
    let counts = database
      .iter()
      .map(|rule| (rule.tag.clone(), 0))
      .collect();
    Tally { counts }
  }

  pub fn record(&mut self, tag: &str) {
    match self.counts.get_mut(tag) {
      Some(count) => *count += 1,
      None => {
        self.counts.insert(tag.to_string(), 1);
      }
    }
  }

  /// Count for `tag`; unknown tags count zero.
  pub fn count(&self, tag: &str) -> u64 {
    self.counts.get(tag).copied().unwrap_or(0)
  }

  /// Sum over all tags, i.e. the number of error lines seen.
  pub fn total(&self) -> u64 {
    self.counts.values().sum()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
    self.counts.iter().map(|(tag, count)| (tag.as_str(), *count))
  }
}

/// Outcome of classifying one line.
#[derive(Debug)]
pub enum Classified<'db> {
  /// Not an error diagnostic. The line is emitted as is.
  PassThrough,
  /// An error diagnostic claimed by `rule`; `annotated` replaces the line.
  Tagged { rule: &'db Rule, annotated: Vec<u8> },
}

/// Streams build output, tagging error lines against a rule database.
///
/// Owns the tally for one run. Create one classifier per input stream.
#[derive(Debug)]
pub struct Classifier<'db> {
  database: &'db RuleDatabase,
  tally: Tally,
  lines: u64,
}

impl<'db> Classifier<'db> {
  pub fn new(database: &'db RuleDatabase) -> Self {
    Classifier {
      database,
      tally: Tally::for_database(database),
      lines: 0,
    }
  }

  /// Classifies a single line (without its line terminator) and records
  /// the match in the tally.
  pub fn classify_line(&mut self, line: &[u8]) -> Classified<'db> {
    self.lines += 1;

    let Some(error_line) = ErrorLine::parse(line) else {
      return Classified::PassThrough;
    };

    let rule = self.database.first_match(error_line.message);
    self.tally.record(&rule.tag);
    tracing::trace!(tag = %rule.tag, "Classified error line");

    Classified::Tagged {
      rule,
      annotated: error_line.annotate(&rule.tag),
    }
  }

  /// Reads `input` to the end, writing every line to `diagnostics` as soon
  /// as it is classified.
  pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut diagnostics: W) -> io::Result<()> {
    let mut buf = Vec::new();
    let mut out = Vec::new();

    loop {
      buf.clear();
      if input.read_until(b'\n', &mut buf)? == 0 {
        break;
      }
      let line = strip_line_ending(&buf);

      out.clear();
      match self.classify_line(line) {
        Classified::PassThrough => out.extend_from_slice(line),
        Classified::Tagged { annotated, .. } => out.extend_from_slice(&annotated),
      }
      out.push(b'\n');

      diagnostics.write_all(&out)?;
      diagnostics.flush()?;
    }

    tracing::info!(
      lines = self.lines,
      errors = self.tally.total(),
      "Finished reading build output"
    );
    Ok(())
  }

  pub fn tally(&self) -> &Tally {
    &self.tally
  }

  /// Number of lines classified so far, error or not.
  pub fn lines(&self) -> u64 {
    self.lines
  }

  pub fn into_tally(self) -> Tally {
    self.tally
  }
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
  let line = buf.strip_suffix(b"\n").unwrap_or(buf);
  line.strip_suffix(b"\r").unwrap_or(line)
}
