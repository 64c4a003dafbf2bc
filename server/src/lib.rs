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

//! REST service to manage contacts and to look up GitHub user profiles.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{error, info};
use rolodex_core::clocks::{Clock, SystemClock};
use rolodex_core::db::{Db, DbError, DbResult};
use rolodex_core::env::{Environment, get_optional_var};
use rolodex_core::model::EmailAddress;
use rolodex_github::{GitHubClient, GitHubOptions};
use std::error::Error;
use std::fs::OpenOptions;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

pub(crate) mod db;
pub(crate) mod driver;
use driver::Driver;
pub(crate) mod model;
use model::ContactName;
mod rest;
use rest::{Views, app};

/// Port to listen on in development mode when not explicitly configured.
const DEFAULT_DEVELOPMENT_PORT: u16 = 8081;

/// Port to listen on in production mode when not explicitly configured.
const DEFAULT_PRODUCTION_PORT: u16 = 8082;

/// Options to configure the service.
#[derive(Debug, PartialEq)]
pub struct ServiceOptions {
    /// Deployment mode of the service.
    pub environment: Environment,

    /// Address to bind the listening socket to.
    pub bind_addr: IpAddr,

    /// Port to bind the listening socket to.
    pub port: u16,

    /// Directory with static assets to serve for paths that do not match any route.
    pub static_dir: Option<PathBuf>,

    /// File to append log lines to instead of printing them to stderr.
    pub log_file: Option<PathBuf>,
}

impl ServiceOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_ENV`, `<prefix>_BIND_ADDR`, `<prefix>_PORT`,
    /// `<prefix>_STATIC_DIR` and `<prefix>_LOG_FILE`, all of which are optional.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let environment = Environment::from_env(prefix)?;
        let default_port = if environment.is_production() {
            DEFAULT_PRODUCTION_PORT
        } else {
            DEFAULT_DEVELOPMENT_PORT
        };
        Ok(Self {
            environment,
            bind_addr: get_optional_var::<IpAddr>(prefix, "BIND_ADDR")?
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(default_port),
            static_dir: get_optional_var::<PathBuf>(prefix, "STATIC_DIR")?,
            log_file: get_optional_var::<PathBuf>(prefix, "LOG_FILE")?,
        })
    }
}

/// Sets up logging for the process, honoring `RUST_LOG` and defaulting to the `info` level.
///
/// If `log_file` is provided, log lines are appended to it instead of being printed to stderr.
pub fn init_logger(log_file: Option<&Path>) -> Result<(), String> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| format!("Cannot open log file {}: {}", path.display(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().map_err(|e| format!("Cannot initialize logging: {}", e))
}

/// Waits until the process is asked to terminate via Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl-C; shutting down"),
            Err(e) => error!("Cannot install Ctrl-C handler: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM; shutting down");
            }
            Err(e) => {
                error!("Cannot install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => (),
        () = terminate => (),
    }
}

/// Instantiates all resources to serve the application as configured by `opts`.
///
/// The service keeps running until it receives a termination signal, at which point it waits for
/// in-flight requests to complete and closes `db`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    opts: ServiceOptions,
    db: Arc<dyn Db + Send + Sync>,
    github_opts: GitHubOptions,
) -> Result<(), Box<dyn Error>> {
    let driver = Driver::new(
        db.clone(),
        Arc::new(SystemClock::default()),
        Arc::new(GitHubClient::new(github_opts)),
    );
    let app = app(driver, Views::new(opts.environment), opts.static_dir.as_deref());

    let addr = SocketAddr::new(opts.bind_addr, opts.port);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            db.close().await;
            return Err(format!("Cannot listen on {}: {}", addr, e).into());
        }
    };
    info!("Listening on {} in {:?} mode", addr, opts.environment);

    let result = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;
    db.close().await;
    info!("Database connections closed");
    Ok(result?)
}

/// Prepares `db` to be used by the service and verifies that it accepts writes.
///
/// This creates the schema if it is missing, ensures that the tables are visible, and then inserts
/// and deletes a throwaway contact.  The caller is responsible for closing `db` afterwards.
pub async fn migrate(
    db: &(dyn Db + Send + Sync),
    clock: &(dyn Clock + Send + Sync),
) -> DbResult<()> {
    let mut ex = db.ex().await?;

    info!("Creating contacts table if missing");
    db::init_schema(&mut ex).await?;

    info!("Verifying contacts table");
    if !db::has_contacts_table(&mut ex).await? {
        return Err(DbError::BackendError("contacts table missing after creation".to_owned()));
    }

    let now = clock.now_utc();
    let email = format!("test-{}@example.com", now.unix_timestamp_nanos() / 1_000_000);
    info!("Creating test contact {}", email);
    let contact =
        db::create_contact(&mut ex, ContactName::new("Test User")?, EmailAddress::new(email)?, now)
            .await?;

    info!("Deleting test contact {}", contact.id().as_i64());
    db::delete_contact(&mut ex, *contact.id()).await?;

    info!("Migration complete");
    Ok(())
}
