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
use benchfilter::classifier::Classified;
use benchfilter::classifier::Classifier;
use benchfilter::classifier::ErrorLine;
use benchfilter::classifier::Tally;
use benchfilter::rules::FALLBACK_TAG;
use benchfilter::rules::Rule;
use benchfilter::rules::RuleDatabase;

fn database(rules: &[(&str, &str, &str)]) -> RuleDatabase {
  RuleDatabase::from_rules(
    rules
      .iter()
      .map(|(category, tag, regex)| Rule::new(*category, *tag, regex, "", "test").unwrap()),
  )
  .unwrap()
}

fn bounds_database() -> RuleDatabase {
  database(&[("bounds", "B1", "^expression has unknown bounds$")])
}

/// Runs `input` through a fresh classifier and returns the diagnostic
/// stream and the tally.
fn filter(database: &RuleDatabase, input: &[u8]) -> (Vec<u8>, Tally) {
  let mut classifier = Classifier::new(database);
  let mut diagnostics = Vec::new();
  classifier.run(input, &mut diagnostics).unwrap();
  (diagnostics, classifier.into_tally())
}

#[test]
fn test_error_line_splits_at_first_separator() {
  let line = ErrorLine::parse(b"a.c:1: error: b.c:2: error: nested").unwrap();

  assert_eq!(line.prefix, b"a.c:1");
  assert_eq!(line.message, b"b.c:2: error: nested");
}

#[test]
fn test_error_line_rejects_other_shapes() {
  assert!(ErrorLine::parse(b"a.c:1: warning: unused variable").is_none());
  assert!(ErrorLine::parse(b"error: linker failed").is_none());
  assert!(ErrorLine::parse(b"a.c:1: error:no space").is_none());
  assert!(ErrorLine::parse(b"").is_none());
}

#[test]
fn test_error_line_allows_empty_prefix_and_message() {
  let line = ErrorLine::parse(b": error: ").unwrap();

  assert_eq!(line.prefix, b"");
  assert_eq!(line.message, b"");
  assert_eq!(line.annotate("T"), b": error (T): ".to_vec());
}

#[test]
fn test_known_error_is_tagged() {
  let database = bounds_database();

  let (out, tally) = filter(&database, b"foo.c:10: error: expression has unknown bounds\n");

  assert_eq!(out, b"foo.c:10: error (B1): expression has unknown bounds\n".to_vec());
  assert_eq!(tally.count("B1"), 1);
  assert_eq!(tally.count(FALLBACK_TAG), 0);
}

#[test]
fn test_unknown_error_falls_back() {
  let database = bounds_database();

  let (out, tally) = filter(&database, b"foo.c:11: error: something else\n");

  assert_eq!(out, b"foo.c:11: error (UNKNOWN_ERROR): something else\n".to_vec());
  assert_eq!(tally.count(FALLBACK_TAG), 1);
  assert_eq!(tally.count("B1"), 0);
}

#[test]
fn test_rules_match_message_not_whole_line() {
  let database = database(&[("ignore", "PREFIXED", "^foo\\.c")]);

  let (_, tally) = filter(&database, b"foo.c:1: error: bar\n");

  assert_eq!(tally.count("PREFIXED"), 0);
  assert_eq!(tally.count(FALLBACK_TAG), 1);
}

#[test]
fn test_first_matching_rule_wins() {
  let database = database(&[
    ("ignore", "FIRST", "unknown"),
    ("error", "SECOND", "unknown bounds"),
  ]);

  let (out, tally) = filter(&database, b"x.c:3: error: expression has unknown bounds\n");

  assert_eq!(out, b"x.c:3: error (FIRST): expression has unknown bounds\n".to_vec());
  assert_eq!(tally.count("FIRST"), 1);
  assert_eq!(tally.count("SECOND"), 0);
}

#[test]
fn test_non_error_lines_pass_through() {
  let database = bounds_database();
  let input = b"[1/3] Building C object foo.o\nfoo.c:2: warning: unused\nmake: *** [all] Error 2\n";

  let (out, tally) = filter(&database, input);

  assert_eq!(out, input.to_vec());
  assert_eq!(tally.total(), 0);
}

#[test]
fn test_every_error_line_is_counted_once() {
  let database = database(&[
    ("bounds", "B1", "^expression has unknown bounds$"),
    ("ignore", "CAST", "^cast"),
  ]);
  let input = b"cc -c a.c\n\
a.c:1: error: expression has unknown bounds\n\
a.c:2: error: cast to checked pointer\n\
a.c:3: error: no idea\n\
a.c:4: error: expression has unknown bounds\n\
2 errors generated.\n";

  let (out, tally) = filter(&database, input);

  let expected = b"cc -c a.c\n\
a.c:1: error (B1): expression has unknown bounds\n\
a.c:2: error (CAST): cast to checked pointer\n\
a.c:3: error (UNKNOWN_ERROR): no idea\n\
a.c:4: error (B1): expression has unknown bounds\n\
2 errors generated.\n";
  assert_eq!(out, expected.to_vec());
  assert_eq!(tally.count("B1"), 2);
  assert_eq!(tally.count("CAST"), 1);
  assert_eq!(tally.count(FALLBACK_TAG), 1);
  assert_eq!(tally.total(), 4);
}

#[test]
fn test_separator_inside_message_is_preserved() {
  let database = bounds_database();

  let (out, _) = filter(&database, b"a.c:1: error: text with : error: inside\n");

  assert_eq!(out, b"a.c:1: error (UNKNOWN_ERROR): text with : error: inside\n".to_vec());
}

#[test]
fn test_crlf_and_missing_final_newline() {
  let database = bounds_database();

  let (out, tally) = filter(
    &database,
    b"a.c:1: error: expression has unknown bounds\r\nlast line",
  );

  assert_eq!(
    out,
    b"a.c:1: error (B1): expression has unknown bounds\nlast line\n".to_vec()
  );
  assert_eq!(tally.count("B1"), 1);
}

#[test]
fn test_invalid_utf8_passes_through_unchanged() {
  let database = bounds_database();
  let input = b"\xff\xfe garbage\na.c:1: error: bad \xc3 byte\n";

  let (out, tally) = filter(&database, input);

  assert_eq!(
    out,
    b"\xff\xfe garbage\na.c:1: error (UNKNOWN_ERROR): bad \xc3 byte\n".to_vec()
  );
  assert_eq!(tally.count(FALLBACK_TAG), 1);
}

#[test]
fn test_classify_line_reports_rule() {
  let database = bounds_database();
  let mut classifier = Classifier::new(&database);

  match classifier.classify_line(b"f.c:9: error: expression has unknown bounds") {
    Classified::Tagged { rule, annotated } => {
      assert_eq!(rule.tag, "B1");
      assert_eq!(rule.category, "bounds");
      assert_eq!(annotated, b"f.c:9: error (B1): expression has unknown bounds".to_vec());
    }
    Classified::PassThrough => panic!("expected a tagged line"),
  }
  assert!(matches!(
    classifier.classify_line(b"plain output"),
    Classified::PassThrough
  ));
  assert_eq!(classifier.lines(), 2);
  assert_eq!(classifier.tally().total(), 1);
}

#[test]
fn test_classifiers_do_not_share_state() {
  let database = bounds_database();

  let (_, first) = filter(&database, b"a.c:1: error: x\n");
  let (_, second) = filter(&database, b"plain\n");

  assert_eq!(first.total(), 1);
  assert_eq!(second.total(), 0);
}

#[test]
fn test_tally_starts_at_zero_for_every_tag() {
  let database = bounds_database();
  let tally = Tally::for_database(&database);

  let mut tags: Vec<(&str, u64)> = tally.iter().collect();
  tags.sort();
  assert_eq!(tags, vec![("B1", 0), (FALLBACK_TAG, 0)]);
}
