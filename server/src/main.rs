// Rolodex
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Entry point to the contacts service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::error;
use rolodex_core::db::postgres::{PostgresDb, PostgresOptions};
use rolodex_github::GitHubOptions;
use rolodex_server::{ServiceOptions, init_logger, serve};
use std::error::Error;
use std::process;
use std::sync::Arc;

/// Prefix of the environment variables that configure the service.
const ENV_PREFIX: &str = "ROLODEX";

/// Prefix of the environment variables that configure access to GitHub.
const GITHUB_ENV_PREFIX: &str = "GITHUB";

/// Loads the configuration and runs the service until it is asked to stop.
async fn run() -> Result<(), Box<dyn Error>> {
    let opts = ServiceOptions::from_env(ENV_PREFIX)?;
    init_logger(opts.log_file.as_deref())?;

    let db_opts = PostgresOptions::from_env(opts.environment.db_prefix())?;
    let github_opts = GitHubOptions::from_env(GITHUB_ENV_PREFIX)?;

    let db = Arc::new(PostgresDb::connect(db_opts)?);
    serve(opts, db, github_opts).await
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("rolodex: {}", e);
        process::exit(1);
    }
}
