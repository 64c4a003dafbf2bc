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

//! Operations on one contact.

use crate::db;
use crate::driver::Driver;
use crate::model::{Contact, ContactId, NewContact};
use rolodex_core::db::DbError;
use rolodex_core::driver::{DriverError, DriverResult};

/// Expected rejections of the `create_contact` operation.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum CreateContactFailure {
    /// Another contact already uses the requested email address.
    #[error("Email already exists")]
    DuplicateEmail,
}

impl Driver {
    /// Creates a new contact out of the validated `contact` request.
    pub(crate) async fn create_contact(
        self,
        contact: NewContact,
    ) -> DriverResult<Contact, CreateContactFailure> {
        let (name, email) = contact.into_parts();
        let now = self.clock.now_utc();
        match db::create_contact(&mut self.db.ex().await?, name, email, now).await {
            Ok(contact) => Ok(contact),
            Err(DbError::AlreadyExists) => {
                Err(DriverError::Domain(CreateContactFailure::DuplicateEmail))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Gets the contact identified by `id`, if it exists.
    pub(crate) async fn get_contact(self, id: ContactId) -> DriverResult<Option<Contact>> {
        let contact = db::get_contact(&mut self.db.ex().await?, id).await?;
        Ok(contact)
    }
}
