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

//! One-shot tool to prepare the database for the contacts service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{error, info};
use rolodex_core::clocks::SystemClock;
use rolodex_core::db::Db;
use rolodex_core::db::postgres::{PostgresDb, PostgresOptions};
use rolodex_server::{ServiceOptions, init_logger, migrate};
use std::error::Error;
use std::process;

/// Prefix of the environment variables that configure the service.
const ENV_PREFIX: &str = "ROLODEX";

/// Loads the configuration and migrates the database it points to.
async fn run() -> Result<(), Box<dyn Error>> {
    let opts = ServiceOptions::from_env(ENV_PREFIX)?;
    init_logger(opts.log_file.as_deref())?;

    let db_opts = PostgresOptions::from_env(opts.environment.db_prefix())?;
    info!("Connecting to database {:?}", db_opts);
    let db = PostgresDb::connect(db_opts)?;

    let result = migrate(&db, &SystemClock::default()).await;
    db.close().await;
    info!("Database connections closed");
    Ok(result?)
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Migration failed: {}", e);
        eprintln!("migrate: {}", e);
        process::exit(1);
    }
}
