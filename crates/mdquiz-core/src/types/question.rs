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

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::question_hash::Hasher;
use crate::types::question_hash::QuestionHash;

/// A multiple-choice question.
///
/// Answers keep their source order; `correct_positions` holds zero-based
/// indices into `answers`. The content hash is computed once at construction
/// and is the question's identity for deduplication and the result store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt: String,
    answers: Vec<String>,
    correct_positions: BTreeSet<usize>,
    hash: QuestionHash,
}

impl Question {
    pub fn new(
        prompt: String,
        answers: Vec<String>,
        correct_positions: BTreeSet<usize>,
    ) -> Fallible<Self> {
        if answers.is_empty() {
            return fail("a question must have at least one answer option");
        }
        if correct_positions.is_empty() {
            return fail("a question must have at least one correct answer");
        }
        if let Some(&last) = correct_positions.iter().next_back() {
            if last >= answers.len() {
                return fail(format!(
                    "correct answer position {} is out of range for {} options",
                    last,
                    answers.len()
                ));
            }
        }
        let hash = content_hash(&prompt, &answers, &correct_positions);
        Ok(Question {
            prompt,
            answers,
            correct_positions,
            hash,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn correct_positions(&self) -> &BTreeSet<usize> {
        &self.correct_positions
    }

    pub fn hash(&self) -> QuestionHash {
        self.hash
    }
}

/// Fields are separated by a zero byte so that moving text between adjacent
/// fields cannot produce the same digest.
fn content_hash(
    prompt: &str,
    answers: &[String],
    correct_positions: &BTreeSet<usize>,
) -> QuestionHash {
    let mut hasher = Hasher::new();
    hasher.update(prompt.as_bytes());
    hasher.update(&[0]);
    for answer in answers {
        hasher.update(answer.as_bytes());
        hasher.update(&[0]);
    }
    let positions: Vec<String> = correct_positions.iter().map(|p| p.to_string()).collect();
    hasher.update(positions.join(",").as_bytes());
    hasher.finalize()
}
