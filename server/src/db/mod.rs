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

//! Database abstraction in terms of the operations needed by the server.

use crate::model::{Contact, ContactId, ContactName};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use rolodex_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use rolodex_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use rolodex_core::db::{DbError, DbResult, Executor};
use rolodex_core::model::EmailAddress;
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use time::OffsetDateTime;
#[cfg(feature = "postgres")]
use time::{PrimitiveDateTime, UtcOffset};


/// Initializes the database schema.  Safe to call on a database that already has it.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Converts a UTC timestamp into the zone-less representation used by the PostgreSQL schema.
#[cfg(feature = "postgres")]
fn to_primitive(ts: OffsetDateTime) -> PrimitiveDateTime {
    let ts = ts.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(ts.date(), ts.time())
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Contact {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
        let created_at: PrimitiveDateTime =
            row.try_get("createdAt").map_err(postgres::map_sqlx_error)?;
        let updated_at: PrimitiveDateTime =
            row.try_get("updatedAt").map_err(postgres::map_sqlx_error)?;

        Ok(Contact::new(
            ContactId::new(i64::from(id)),
            ContactName::new(name)?,
            EmailAddress::new(email)?,
            created_at.assume_utc(),
            updated_at.assume_utc(),
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Contact {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(Contact::new(
            ContactId::new(id),
            ContactName::new(name)?,
            EmailAddress::new(email)?,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

/// Creates a new contact with `name` and `email`, stamping it with `now` as both its creation and
/// update times.
///
/// Returns `DbError::AlreadyExists` if another contact already uses `email`.
pub async fn create_contact(
    ex: &mut Executor,
    name: ContactName,
    email: EmailAddress,
    now: OffsetDateTime,
) -> DbResult<Contact> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO contacts (name, email, \"createdAt\", \"updatedAt\")
                VALUES ($1, $2, $3, $3)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(name.as_str())
                .bind(email.as_str())
                .bind(to_primitive(now))
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
            i64::from(id)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (now_secs, now_nsecs) = unpack_timestamp(now)?;

            let query_str = "
                INSERT INTO contacts
                    (name, email, created_at_secs, created_at_nsecs,
                    updated_at_secs, updated_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(name.as_str())
                .bind(email.as_str())
                .bind(now_secs)
                .bind(now_nsecs)
                .bind(now_secs)
                .bind(now_nsecs)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Contact::new(ContactId::new(id), name, email, now, now))
}

/// Gets all contacts, newest first.  Contacts created at the same time are returned in descending
/// identifier order.
pub async fn get_contacts(ex: &mut Executor) -> DbResult<Vec<Contact>> {
    let mut contacts = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM contacts ORDER BY \"createdAt\" DESC, id DESC";
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                contacts.push(Contact::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM contacts
                ORDER BY created_at_secs DESC, created_at_nsecs DESC, id DESC";
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                contacts.push(Contact::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(contacts)
}

/// Gets the contact identified by `id`, or `None` if it does not exist.
pub async fn get_contact(ex: &mut Executor, id: ContactId) -> DbResult<Option<Contact>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM contacts WHERE id = $1";
            let maybe_row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            maybe_row.map(Contact::try_from).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM contacts WHERE id = ?";
            let maybe_row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            maybe_row.map(Contact::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes the contact identified by `id`.
///
/// Returns `DbError::NotFound` if the contact does not exist.
pub async fn delete_contact(ex: &mut Executor, id: ContactId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM contacts WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM contacts WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Checks whether the `contacts` table exists.
pub async fn has_contacts_table(ex: &mut Executor) -> DbResult<bool> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT to_regclass('contacts') IS NOT NULL AS present";
            let row = sqlx::query(query_str)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("present").map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM sqlite_master
                WHERE type = 'table' AND name = 'contacts'";
            let row = sqlx::query(query_str)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            let count: i64 = row.try_get("count").map_err(sqlite::map_sqlx_error)?;
            Ok(count > 0)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}


#[cfg(test)]
mod sqlite_tests {
    use super::tests::generate_db_tests;

    generate_db_tests!(Box::new(rolodex_core::db::sqlite::testutils::setup().await));
}
