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
use std::io::BufRead;
use std::io::BufReader;
use std::io::Stdin;
use std::io::Stdout;
use std::io::Write;

use mdquiz_core::Question;
use mdquiz_core::TinyRng;
use mdquiz_core::markdown_to_plain;
use mdquiz_core::shuffle;

use crate::error::Fallible;
use crate::error::fail;

/// Shows one question and collects the user's response.
pub trait Prompter {
    /// Ask (show) a question and record the user's answer. Returns whether
    /// the response matched the correct answer set exactly.
    fn ask(&mut self, question: &Question) -> Fallible<bool>;
}

/// A terminal prompter that shuffles the answers for a question and labels
/// each with a random letter, so option positions give nothing away between
/// sessions.
pub struct ShufflePrompter<R, W> {
    rng: TinyRng,
    input: R,
    output: W,
}

impl ShufflePrompter<BufReader<Stdin>, Stdout> {
    pub fn new(rng: TinyRng) -> Self {
        log::info!(
            "Using shuffle prompter. Answers for each question will be shuffled and labeled \
             with random letters. Answer with the letters of every correct option, in any \
             order and case."
        );
        ShufflePrompter {
            rng,
            input: BufReader::new(std::io::stdin()),
            output: std::io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> ShufflePrompter<R, W> {
    pub fn with_io(rng: TinyRng, input: R, output: W) -> Self {
        ShufflePrompter { rng, input, output }
    }

    fn print_question(&mut self, question: &Question, letters: &[char]) -> Fallible<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", markdown_to_plain(question.prompt()))?;
        let mut order: Vec<usize> = (0..question.answers().len()).collect();
        shuffle(&mut order, &mut self.rng);
        for idx in order {
            writeln!(
                self.output,
                "({}) {}",
                letters[idx],
                markdown_to_plain(&question.answers()[idx])
            )?;
        }
        Ok(())
    }

    fn read_letters(&mut self) -> Fallible<BTreeSet<char>> {
        loop {
            write!(
                self.output,
                "Give all letters with correct answers, e.g. 'ABC' >>> "
            )?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return fail("input ended before an answer was given");
            }
            let letters: BTreeSet<char> = line
                .chars()
                .filter(|c| c.is_ascii_alphabetic())
                .map(|c| c.to_ascii_uppercase())
                .collect();
            if !letters.is_empty() {
                return Ok(letters);
            }
            writeln!(self.output, "No input recorded. Try again.")?;
        }
    }
}

impl<R: BufRead, W: Write> Prompter for ShufflePrompter<R, W> {
    fn ask(&mut self, question: &Question) -> Fallible<bool> {
        let letters = sample_letters(&mut self.rng, question.answers().len())?;
        self.print_question(question, &letters)?;

        let correct: BTreeSet<char> = question
            .correct_positions()
            .iter()
            .map(|&i| letters[i])
            .collect();
        let guessed = self.read_letters()?;

        if guessed == correct {
            writeln!(self.output, "That's correct!")?;
            return Ok(true);
        }
        let noun = if correct.len() > 1 {
            "answers were"
        } else {
            "answer was"
        };
        let correct: String = correct.into_iter().collect();
        writeln!(self.output, "Wrong! The correct {noun}: {correct}")?;
        Ok(false)
    }
}

/// Pick `n` distinct uppercase letters at random.
fn sample_letters(rng: &mut TinyRng, n: usize) -> Fallible<Vec<char>> {
    let mut alphabet: Vec<char> = ('A'..='Z').collect();
    if n > alphabet.len() {
        return fail(format!("cannot label {n} answers with single letters"));
    }
    shuffle(&mut alphabet, rng);
    alphabet.truncate(n);
    Ok(alphabet)
}
