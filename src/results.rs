// Copyright 2025 Fernando Borretti
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

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::PathBuf;

use mdquiz_core::Question;
use mdquiz_core::QuestionHash;

use crate::error::Fallible;

/// Durable pass/fail ledger keyed by question identity.
///
/// The backing file is an append-only log, one `<digest>:<0|1>` entry per
/// line, replayed into a map on open. The last entry for a key wins.
pub struct ResultStore {
    path: PathBuf,
    entries: HashMap<QuestionHash, bool>,
}

impl ResultStore {
    /// Read the backing file without side effects. A missing or unreadable
    /// file is an empty store, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = HashMap::new();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                for (idx, line) in text.lines().enumerate() {
                    match parse_entry(line) {
                        Some((hash, passed)) => {
                            entries.insert(hash, passed);
                        }
                        None => {
                            log::warn!(
                                "Skipping malformed result line {}:{}: {:?}",
                                path.display(),
                                idx + 1,
                                line
                            );
                        }
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No result file at {}; starting fresh", path.display());
            }
            Err(e) => {
                log::warn!(
                    "Could not read result file {}: {}; treating it as empty",
                    path.display(),
                    e
                );
            }
        }
        ResultStore { path, entries }
    }

    /// Open the store for a session over `questions`. If every question
    /// already has a passing entry, the backing file is deleted so the next
    /// session starts over; the in-memory entries keep reflecting the deleted
    /// file for the rest of this run.
    pub fn load(path: impl Into<PathBuf>, questions: &[Question]) -> Fallible<Self> {
        let store = Self::open(path);
        if !questions.is_empty() && questions.iter().all(|q| store.has_passed(q)) {
            log::info!(
                "All {} questions passed. Removing {} so the next run starts over.",
                questions.len(),
                store.path.display()
            );
            std::fs::remove_file(&store.path)?;
        }
        Ok(store)
    }

    pub fn has_passed(&self, question: &Question) -> bool {
        self.passed(question.hash())
    }

    pub fn passed(&self, hash: QuestionHash) -> bool {
        self.entries.get(&hash).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an outcome: overwrite the in-memory entry and append a line to
    /// the backing file. A result that cannot be persisted is an error.
    pub fn record(&mut self, question: &Question, passed: bool) -> Fallible<()> {
        self.entries.insert(question.hash(), passed);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}:{}", question.hash(), passed as u8)?;
        Ok(())
    }
}

/// A line is an entry only if it is exactly two all-digit tokens separated by
/// a colon. Nonzero values count as passed.
fn parse_entry(line: &str) -> Option<(QuestionHash, bool)> {
    let mut tokens = line.split(':');
    let key = tokens.next()?;
    let value = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hash = QuestionHash::from_decimal(key).ok()?;
    let value: u64 = value.parse().ok()?;
    Some((hash, value != 0))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs::read_to_string;
    use std::fs::write;
    use std::path::Path;

    use tempfile::tempdir;

    use super::*;

    fn make_question(prompt: &str) -> Question {
        Question::new(
            prompt.to_string(),
            vec!["A".to_string(), "B".to_string()],
            BTreeSet::from([1]),
        )
        .unwrap()
    }

    fn results_path(dir: &Path) -> PathBuf {
        dir.join("results.txt")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = ResultStore::open(results_path(dir.path()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_then_reload() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        let question = make_question("Q1");

        let mut store = ResultStore::open(&path);
        store.record(&question, true)?;

        let reloaded = ResultStore::open(&path);
        assert!(reloaded.has_passed(&question));
        Ok(())
    }

    #[test]
    fn test_failed_outcome_round_trips() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        let question = make_question("Q1");

        let mut store = ResultStore::open(&path);
        store.record(&question, false)?;

        let reloaded = ResultStore::open(&path);
        assert!(!reloaded.has_passed(&question));
        assert_eq!(reloaded.len(), 1);
        Ok(())
    }

    #[test]
    fn test_malformed_lines_are_skipped() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        write(&path, "abc:1\n42:0\n").unwrap();

        let store = ResultStore::open(&path);
        assert_eq!(store.len(), 1);
        assert!(!store.passed(QuestionHash::from_decimal("42")?));
        Ok(())
    }

    #[test]
    fn test_extra_tokens_are_invalid() {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        write(&path, "1:2:3\n7:x\n:1\n7:\n").unwrap();

        let store = ResultStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_last_write_wins() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        write(&path, "7:0\n7:1\n").unwrap();

        let store = ResultStore::open(&path);
        assert_eq!(store.len(), 1);
        assert!(store.passed(QuestionHash::from_decimal("7")?));
        Ok(())
    }

    #[test]
    fn test_record_appends_without_rewriting() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        let q1 = make_question("Q1");
        let q2 = make_question("Q2");

        let mut store = ResultStore::open(&path);
        store.record(&q1, true)?;
        store.record(&q2, false)?;
        store.record(&q1, false)?;

        let text = read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{}:1", q1.hash()));
        assert_eq!(lines[2], format!("{}:0", q1.hash()));

        // Replaying the log takes the latest entry for the key.
        let reloaded = ResultStore::open(&path);
        assert!(!reloaded.has_passed(&q1));
        Ok(())
    }

    #[test]
    fn test_all_passed_removes_backing_file() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        let q1 = make_question("Q1");
        let q2 = make_question("Q2");

        let mut store = ResultStore::open(&path);
        store.record(&q1, true)?;
        store.record(&q2, true)?;

        let store = ResultStore::load(&path, &[q1.clone(), q2.clone()])?;
        assert!(!path.exists());
        // The in-memory copy still reflects the deleted file.
        assert!(store.has_passed(&q1));
        assert!(store.has_passed(&q2));

        // The next run starts clean.
        let fresh = ResultStore::load(&path, &[q1, q2])?;
        assert!(fresh.is_empty());
        Ok(())
    }

    #[test]
    fn test_no_sweep_while_any_question_is_open() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        let q1 = make_question("Q1");
        let q2 = make_question("Q2");

        let mut store = ResultStore::open(&path);
        store.record(&q1, true)?;
        store.record(&q2, false)?;

        ResultStore::load(&path, &[q1.clone(), q2.clone()])?;
        assert!(path.exists());

        // An unseen question keeps the file too.
        let q3 = make_question("Q3");
        ResultStore::load(&path, &[q1, q3])?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_no_sweep_for_empty_question_list() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = results_path(dir.path());
        write(&path, "7:1\n").unwrap();

        ResultStore::load(&path, &[])?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_record_failure_propagates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("results.txt");
        let question = make_question("Q1");

        let mut store = ResultStore::open(&path);
        assert!(store.record(&question, true).is_err());
    }
}
