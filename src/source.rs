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

use std::path::Path;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// Download the quiz document and cache it at `target`. One attempt, no
/// retries: a failed fetch fails the run.
pub async fn fetch_document(url: &str, target: &Path) -> Fallible<()> {
    log::debug!("Downloading questions from {url}");
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ErrorReport::new(format!("download failed: {e}")))?;
    let body = response
        .bytes()
        .await
        .map_err(|e| ErrorReport::new(format!("download failed: {e}")))?;
    tokio::fs::write(target, &body).await?;
    log::info!("Saved quiz document to {}", target.display());
    Ok(())
}

/// Cut the document down to the question section.
///
/// The marker is the exact text of the first question heading, compared after
/// trimming both sides; the returned text starts at that line. Everything
/// above it (table of contents, badges, prose) is preamble.
pub fn question_section(text: &str, first_question: &str) -> Fallible<String> {
    let marker = first_question.trim();
    let lines: Vec<&str> = text.lines().collect();
    match lines.iter().position(|line| line.trim() == marker) {
        Some(start) => Ok(lines[start..].join("\n")),
        None => fail(format!(
            "first question marker not found in document: {marker:?}"
        )),
    }
}
