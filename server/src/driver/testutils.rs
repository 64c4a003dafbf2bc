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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use rolodex_core::clocks::testutils::SettableClock;
use rolodex_core::db::{Db, Executor};
use rolodex_github::MockProfileFetcher;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

/// Time at which all test contexts start.
pub(crate) const TEST_NOW: OffsetDateTime = datetime!(2023-06-01 10:00:00 UTC);

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock backing the driver.
    clock: Arc<SettableClock>,

    /// The remote profile fetcher backing the driver.
    github: MockProfileFetcher,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database, a settable clock and a profile fetcher
    /// that knows about no tokens.
    pub(crate) async fn setup() -> Self {
        Self::setup_with(MockProfileFetcher::new()).await
    }

    /// Initializes the driver like `setup` does but using the given profile fetcher.
    pub(crate) async fn setup_with(github: MockProfileFetcher) -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(rolodex_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(TEST_NOW));
        let driver = Driver::new(db.clone(), clock.clone(), Arc::new(github.clone()));
        Self { db, clock, github, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets access to the clock used by the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Gets access to the profile fetcher used by the driver.
    pub(crate) fn github(&self) -> &MockProfileFetcher {
        &self.github
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }
}
