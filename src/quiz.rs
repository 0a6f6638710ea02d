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

use mdquiz_core::Question;

use crate::error::Fallible;
use crate::prompter::Prompter;
use crate::results::ResultStore;

/// Tally for one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    /// Questions in the session list, including skipped ones.
    pub total: usize,
    /// Questions actually presented this run.
    pub answered: usize,
    /// Presented questions answered correctly.
    pub correct: usize,
    /// Questions skipped because they were already passed in an earlier run.
    pub skipped: usize,
}

impl Score {
    /// The final mark. Skipped questions were passed before, so they count as
    /// correct against the full list.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.correct + self.skipped) as f64 / self.total as f64
    }
}

/// Drives a list of questions through a prompter, one at a time, in list
/// order.
pub struct Quiz<P> {
    questions: Vec<Question>,
    prompter: P,
}

impl<P: Prompter> Quiz<P> {
    pub fn new(questions: Vec<Question>, prompter: P) -> Self {
        Quiz {
            questions,
            prompter,
        }
    }

    /// Ask every not-yet-passed question once, recording each outcome before
    /// moving to the next one.
    pub fn run(&mut self, results: &mut ResultStore) -> Fallible<Score> {
        let total = self.questions.len();
        let mut score = Score {
            total,
            ..Score::default()
        };
        for question in &self.questions {
            if results.has_passed(question) {
                log::debug!("Skipping already passed question {}", question.hash());
                score.skipped += 1;
                continue;
            }
            let passed = self.prompter.ask(question)?;
            results.record(question, passed)?;
            score.answered += 1;
            if passed {
                score.correct += 1;
            }
            log::info!(
                "Progress: {}/{} ({:.2}%)",
                score.answered,
                total,
                100.0 * score.answered as f64 / total as f64
            );
            log::info!(
                "Current score: {}/{} ({:.2}%)",
                score.correct,
                score.answered,
                100.0 * score.correct as f64 / score.answered as f64
            );
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs::read_to_string;

    use tempfile::tempdir;

    use super::*;

    /// A prompter that plays back scripted outcomes.
    struct ScriptedPrompter {
        outcomes: Vec<bool>,
        cursor: usize,
    }

    impl ScriptedPrompter {
        fn new(outcomes: &[bool]) -> Self {
            ScriptedPrompter {
                outcomes: outcomes.to_vec(),
                cursor: 0,
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, _question: &Question) -> Fallible<bool> {
            let outcome = self.outcomes[self.cursor];
            self.cursor += 1;
            Ok(outcome)
        }
    }

    fn make_question(prompt: &str) -> Question {
        Question::new(
            prompt.to_string(),
            vec!["A".to_string(), "B".to_string()],
            BTreeSet::from([1]),
        )
        .unwrap()
    }

    #[test]
    fn test_fresh_session_scores_half() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let q1 = make_question("Q1");
        let q2 = make_question("Q2");

        let mut store = ResultStore::load(&path, &[q1.clone(), q2.clone()])?;
        let mut quiz = Quiz::new(vec![q1.clone(), q2.clone()], ScriptedPrompter::new(&[true, false]));
        let score = quiz.run(&mut store)?;

        assert_eq!(
            score,
            Score {
                total: 2,
                answered: 2,
                correct: 1,
                skipped: 0
            }
        );
        assert_eq!(score.fraction(), 0.5);

        // Both outcomes were persisted.
        assert_eq!(read_to_string(&path).unwrap().lines().count(), 2);
        let reloaded = ResultStore::open(&path);
        assert!(reloaded.has_passed(&q1));
        assert!(!reloaded.has_passed(&q2));
        Ok(())
    }

    #[test]
    fn test_second_run_skips_passed_questions() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let q1 = make_question("Q1");
        let q2 = make_question("Q2");
        let questions = vec![q1, q2];

        let mut store = ResultStore::load(&path, &questions)?;
        let mut quiz = Quiz::new(questions.clone(), ScriptedPrompter::new(&[true, false]));
        quiz.run(&mut store)?;

        // Second run: only the failed question comes back.
        let mut store = ResultStore::load(&path, &questions)?;
        let mut quiz = Quiz::new(questions, ScriptedPrompter::new(&[true]));
        let score = quiz.run(&mut store)?;

        assert_eq!(
            score,
            Score {
                total: 2,
                answered: 1,
                correct: 1,
                skipped: 1
            }
        );
        assert_eq!(score.fraction(), 1.0);
        Ok(())
    }

    #[test]
    fn test_fully_mastered_session_asks_nothing() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let questions = vec![make_question("Q1"), make_question("Q2")];

        let mut store = ResultStore::open(&path);
        for question in &questions {
            store.record(question, true)?;
        }

        let mut quiz = Quiz::new(questions, ScriptedPrompter::new(&[]));
        let score = quiz.run(&mut store)?;

        assert_eq!(score.answered, 0);
        assert_eq!(score.skipped, 2);
        assert_eq!(score.fraction(), 1.0);
        Ok(())
    }

    #[test]
    fn test_outcome_is_recorded_before_the_next_question() -> Fallible<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        // The same question twice: the first answer records a pass, so the
        // second occurrence is skipped within the same run.
        let q = make_question("Q1");

        let mut store = ResultStore::open(&path);
        let mut quiz = Quiz::new(vec![q.clone(), q], ScriptedPrompter::new(&[true]));
        let score = quiz.run(&mut store)?;

        assert_eq!(score.answered, 1);
        assert_eq!(score.skipped, 1);
        Ok(())
    }

    #[test]
    fn test_empty_list_scores_full() {
        let score = Score::default();
        assert_eq!(score.fraction(), 1.0);
    }
}
