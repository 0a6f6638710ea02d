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

mod cli;
mod error;
mod prompter;
mod quiz;
mod results;
mod source;

use std::process::exit;

use env_logger::Env;

use crate::cli::entrypoint;

#[tokio::main]
async fn main() {
    // Progress and score lines go through the logger, so they should be
    // visible without RUST_LOG set.
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(report) = entrypoint().await {
        eprintln!("{report}");
        exit(1);
    }
}
