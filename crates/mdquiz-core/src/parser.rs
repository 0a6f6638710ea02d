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
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::types::question::Question;

const HEADING_MARKER: &str = "### ";
const UNCHECKED_MARKER: &str = "- [ ] ";
const CHECKED_MARKER: &str = "- [x] ";

/// Parse the question section of a checklist Markdown document.
///
/// The text must begin at the first question heading; everything above it is
/// the caller's to discard.
pub fn parse_questions(source_path: &str, text: &str) -> Result<Vec<Question>, ParserError> {
    Parser::new(source_path.to_string()).parse(text)
}

pub struct Parser {
    source_path: String,
}

#[derive(Debug)]
pub struct ParserError {
    pub message: String,
    pub source_path: String,
    pub line_num: usize,
}

impl ParserError {
    fn new(message: impl Into<String>, source_path: String, line_num: usize) -> Self {
        ParserError {
            message: message.into(),
            source_path,
            line_num,
        }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Location: {}:{}",
            self.message,
            self.source_path,
            self.line_num + 1
        )
    }
}

impl Error for ParserError {}

enum Line {
    /// A `### ` heading; the payload is the prompt text.
    Heading(String),
    /// A `- [ ] ` option.
    Unchecked(String),
    /// A `- [x] ` option.
    Checked(String),
    /// Any other line; ignored inside a question block.
    Text,
}

impl Line {
    fn read(line: &str) -> Self {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(HEADING_MARKER) {
            Line::Heading(rest.trim().to_string())
        } else if let Some(rest) = line.strip_prefix(UNCHECKED_MARKER) {
            Line::Unchecked(rest.to_string())
        } else if let Some(rest) = line.strip_prefix(CHECKED_MARKER) {
            Line::Checked(rest.to_string())
        } else {
            Line::Text
        }
    }
}

enum State {
    /// Before the first heading.
    Initial,
    /// Accumulating options for the question whose heading is at `start_line`.
    InQuestion {
        prompt: String,
        answers: Vec<String>,
        correct_positions: BTreeSet<usize>,
        start_line: usize,
    },
}

impl Parser {
    pub fn new(source_path: String) -> Self {
        Parser { source_path }
    }

    /// Parse all the questions in the given text.
    pub fn parse(&self, text: &str) -> Result<Vec<Question>, ParserError> {
        let mut questions = Vec::new();
        let mut state = State::Initial;
        for (line_num, line) in text.lines().enumerate() {
            state = self.parse_line(state, Line::read(line), line_num, &mut questions)?;
        }
        self.finalize(state, &mut questions)?;

        // Repeated questions collapse to their first occurrence, keeping
        // document order.
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for question in questions {
            if seen.insert(question.hash()) {
                unique.push(question);
            }
        }
        Ok(unique)
    }

    fn parse_line(
        &self,
        state: State,
        line: Line,
        line_num: usize,
        questions: &mut Vec<Question>,
    ) -> Result<State, ParserError> {
        match state {
            State::Initial => match line {
                Line::Heading(prompt) => Ok(State::InQuestion {
                    prompt,
                    answers: Vec::new(),
                    correct_positions: BTreeSet::new(),
                    start_line: line_num,
                }),
                Line::Unchecked(_) | Line::Checked(_) => Err(ParserError::new(
                    "Found an answer option before any question heading.",
                    self.source_path.clone(),
                    line_num,
                )),
                Line::Text => Err(ParserError::new(
                    "Expected a question heading.",
                    self.source_path.clone(),
                    line_num,
                )),
            },
            State::InQuestion {
                prompt,
                mut answers,
                mut correct_positions,
                start_line,
            } => match line {
                Line::Heading(next_prompt) => {
                    // Finalize the previous question.
                    questions.push(self.build_question(
                        prompt,
                        answers,
                        correct_positions,
                        start_line,
                    )?);
                    // Start a new one.
                    Ok(State::InQuestion {
                        prompt: next_prompt,
                        answers: Vec::new(),
                        correct_positions: BTreeSet::new(),
                        start_line: line_num,
                    })
                }
                Line::Unchecked(text) => {
                    answers.push(text);
                    Ok(State::InQuestion {
                        prompt,
                        answers,
                        correct_positions,
                        start_line,
                    })
                }
                Line::Checked(text) => {
                    correct_positions.insert(answers.len());
                    answers.push(text);
                    Ok(State::InQuestion {
                        prompt,
                        answers,
                        correct_positions,
                        start_line,
                    })
                }
                Line::Text => Ok(State::InQuestion {
                    prompt,
                    answers,
                    correct_positions,
                    start_line,
                }),
            },
        }
    }

    fn finalize(&self, state: State, questions: &mut Vec<Question>) -> Result<(), ParserError> {
        match state {
            State::Initial => Err(ParserError::new(
                "No questions found.",
                self.source_path.clone(),
                0,
            )),
            State::InQuestion {
                prompt,
                answers,
                correct_positions,
                start_line,
            } => {
                questions.push(self.build_question(
                    prompt,
                    answers,
                    correct_positions,
                    start_line,
                )?);
                Ok(())
            }
        }
    }

    fn build_question(
        &self,
        prompt: String,
        answers: Vec<String>,
        correct_positions: BTreeSet<usize>,
        start_line: usize,
    ) -> Result<Question, ParserError> {
        if answers.is_empty() {
            return Err(ParserError::new(
                "Question has no answer options.",
                self.source_path.clone(),
                start_line,
            ));
        }
        if correct_positions.is_empty() {
            return Err(ParserError::new(
                "Question has no correct answer.",
                self.source_path.clone(),
                start_line,
            ));
        }
        Question::new(prompt, answers, correct_positions)
            .map_err(|e| ParserError::new(e.to_string(), self.source_path.clone(), start_line))
    }
}
