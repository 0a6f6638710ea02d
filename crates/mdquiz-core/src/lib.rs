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

//! mdquiz-core: Core library for mdquiz, a checklist Markdown quiz runner.
//!
//! This library provides:
//! - Parsing checklist-style Markdown documents into questions
//! - The question model and its content-hash identity
//! - Markdown to plain-text rendering for terminal display
//! - A seedable RNG for shuffling

pub mod error;
pub mod markdown;
pub mod parser;
pub mod rng;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use markdown::markdown_to_plain;
pub use parser::{Parser, ParserError, parse_questions};
pub use rng::{TinyRng, shuffle};
pub use types::question::Question;
pub use types::question_hash::QuestionHash;
