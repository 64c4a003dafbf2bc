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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::{Contact, ContactName};
use crate::rest::{Views, app};
use axum::Router;
use rolodex_core::clocks::testutils::SettableClock;
use rolodex_core::db::{Db, Executor};
use rolodex_core::model::EmailAddress;
use rolodex_github::MockProfileFetcher;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

/// Time at which all test contexts start.
const TEST_NOW: OffsetDateTime = datetime!(2023-06-01 10:00:00 UTC);

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the app.
    db: Arc<dyn Db + Send + Sync>,

    /// The remote profile fetcher backing the app.
    github: MockProfileFetcher,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app using an in-memory database, a fixed clock and a profile fetcher that
    /// knows about no tokens.
    pub(crate) async fn setup() -> Self {
        Self::setup_with(MockProfileFetcher::new()).await
    }

    /// Initializes the app like `setup` does but using the given profile fetcher.
    pub(crate) async fn setup_with(github: MockProfileFetcher) -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(rolodex_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(TEST_NOW));
        let driver = Driver::new(db.clone(), clock, Arc::new(github.clone()));
        let app = app(driver, Views::default(), None);
        Self { db, github, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Gets access to the profile fetcher used by the app.
    pub(crate) fn github(&self) -> &MockProfileFetcher {
        &self.github
    }

    /// Gets a direct executor against the database.
    async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Creates a contact by directly modifying the backing database.
    pub(crate) async fn create_contact(
        &self,
        name: &str,
        email: &str,
        created_at: OffsetDateTime,
    ) -> Contact {
        db::create_contact(
            &mut self.ex().await,
            ContactName::from(name),
            EmailAddress::from(email),
            created_at,
        )
        .await
        .unwrap()
    }

    /// Gets all contacts by directly querying the backing database.
    pub(crate) async fn get_contacts(&self) -> Vec<Contact> {
        db::get_contacts(&mut self.ex().await).await.unwrap()
    }

    /// Removes the contacts table so that any further access to it fails.
    pub(crate) async fn break_db(&self) {
        match &mut self.ex().await {
            Executor::Sqlite(ex) => {
                sqlx::query("DROP TABLE contacts").execute(ex.conn()).await.unwrap();
            }
            #[allow(unreachable_patterns)]
            _ => unreachable!(),
        }
    }
}
