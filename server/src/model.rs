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

//! High-level data types.

use derive_getters::Getters;
use rolodex_core::model::{EmailAddress, ModelResult, ValidationFailure};
#[cfg(test)]
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

/// Identifier of a contact, assigned by the database on creation.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(transparent)]
pub struct ContactId(i64);

impl ContactId {
    /// Wraps an identifier that is already known to be valid, such as one coming from the database.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parses an untrusted textual identifier, as received in a request path.
    ///
    /// The input must be a base-10 integer with an optional leading sign and nothing else around
    /// it, and it must fit in 64 bits.
    pub fn parse(raw: &str) -> ModelResult<Self> {
        match raw.parse::<i64>() {
            Ok(id) => Ok(Self(id)),
            Err(_) => Err(ValidationFailure::invalid_format("Invalid contact ID")),
        }
    }

    /// Returns the raw identifier.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

/// Name of a contact.  Any non-empty string is valid.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(transparent)]
pub struct ContactName(String);

impl ContactName {
    /// Creates a new contact name from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(ValidationFailure::missing_field("Contact name cannot be empty"));
        }
        Ok(Self(s))
    }

    /// Returns a string view of the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
impl From<&str> for ContactName {
    fn from(raw: &str) -> Self {
        Self::new(raw).expect("Hardcoded names for testing must be valid")
    }
}

/// Validated input to create a new contact.
#[derive(Debug, Getters, PartialEq)]
pub struct NewContact {
    /// Name of the contact.
    name: ContactName,

    /// Email address of the contact.
    email: EmailAddress,
}

impl NewContact {
    /// Creates a new contact request out of untrusted and possibly missing fields.
    ///
    /// Both fields are checked for presence before the format of the email is, so a missing name
    /// always wins over a malformed email.
    pub fn validate(name: Option<String>, email: Option<String>) -> ModelResult<Self> {
        let (name, email) = match (name, email) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => (name, email),
            _ => return Err(ValidationFailure::missing_field("Name and email are required")),
        };

        let name = ContactName::new(name)?;
        let email = EmailAddress::new(email)
            .map_err(|_| ValidationFailure::invalid_format("Invalid email format"))?;
        Ok(Self { name, email })
    }

    /// Breaks the request apart into its fields.
    pub fn into_parts(self) -> (ContactName, EmailAddress) {
        (self.name, self.email)
    }
}

/// A contact as stored in the database.
#[derive(Clone, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Identifier assigned by the database.
    id: ContactId,

    /// Name of the contact.
    name: ContactName,

    /// Email address of the contact.  Unique across all contacts.
    email: EmailAddress,

    /// Time when the contact was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time when the contact was last updated.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Contact {
    /// Creates a new contact from its parts.
    pub fn new(
        id: ContactId,
        name: ContactName,
        email: EmailAddress,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self { id, name, email, created_at, updated_at }
    }
}

/// Static information record served by the service.
#[derive(Clone, Debug, Getters, PartialEq, Serialize)]
pub struct Info {
    /// Name of the record.
    item: String,

    /// Values carried by the record.
    result: Vec<i64>,
}

impl Info {
    /// Creates a new information record.
    pub fn new<S: Into<String>>(item: S, result: Vec<i64>) -> Self {
        Self { item: item.into(), result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::model::ValidationReason;
    use time::macros::datetime;

    #[test]
    fn test_contact_id_parse_ok() {
        assert_eq!(ContactId::new(1), ContactId::parse("1").unwrap());
        assert_eq!(ContactId::new(-5), ContactId::parse("-5").unwrap());
        assert_eq!(ContactId::new(42), ContactId::parse("+42").unwrap());
        assert_eq!(ContactId::new(i64::MAX), ContactId::parse("9223372036854775807").unwrap());
    }

    #[test]
    fn test_contact_id_parse_error() {
        for raw in ["", "abc", "12abc", " 1", "1 ", "1.5", "9223372036854775808", "--1"] {
            let e = ContactId::parse(raw).unwrap_err();
            assert_eq!(ValidationReason::InvalidFormat, e.reason(), "Input was {:?}", raw);
            assert_eq!("Invalid contact ID", e.message());
        }
    }

    #[test]
    fn test_contact_name() {
        assert_eq!("Alice", ContactName::new("Alice").unwrap().as_str());
        assert_eq!(" ", ContactName::new(" ").unwrap().as_str());
        assert_eq!(ValidationReason::MissingField, ContactName::new("").unwrap_err().reason());
    }

    #[test]
    fn test_new_contact_ok() {
        let contact =
            NewContact::validate(Some("Alice".to_owned()), Some("a@b.com".to_owned())).unwrap();
        let (name, email) = contact.into_parts();
        assert_eq!(ContactName::from("Alice"), name);
        assert_eq!(EmailAddress::from("a@b.com"), email);
    }

    #[test]
    fn test_new_contact_missing_fields() {
        for (name, email) in [
            (None, None),
            (Some("Alice"), None),
            (None, Some("a@b.com")),
            (Some(""), Some("a@b.com")),
            (Some("Alice"), Some("")),
            (Some(""), Some("not an email")),
        ] {
            let e = NewContact::validate(name.map(str::to_owned), email.map(str::to_owned))
                .unwrap_err();
            assert_eq!(ValidationReason::MissingField, e.reason());
            assert_eq!("Name and email are required", e.message());
        }
    }

    #[test]
    fn test_new_contact_bad_email() {
        for email in ["foo", "foo@bar", "a b@c.com", "@b.com"] {
            let e = NewContact::validate(Some("Alice".to_owned()), Some(email.to_owned()))
                .unwrap_err();
            assert_eq!(ValidationReason::InvalidFormat, e.reason());
            assert_eq!("Invalid email format", e.message());
        }
    }

    #[test]
    fn test_contact_ser() {
        let contact = Contact::new(
            ContactId::new(7),
            ContactName::from("Alice"),
            EmailAddress::from("a@b.com"),
            datetime!(2023-06-01 10:00:00 UTC),
            datetime!(2023-06-01 10:00:00.5 UTC),
        );
        assert_eq!(
            serde_json::json!({
                "id": 7,
                "name": "Alice",
                "email": "a@b.com",
                "createdAt": "2023-06-01T10:00:00Z",
                "updatedAt": "2023-06-01T10:00:00.5Z",
            }),
            serde_json::to_value(&contact).unwrap()
        );
    }

    #[test]
    fn test_info_ser() {
        let info = Info::new("test", vec![7, -1]);
        assert_eq!(
            serde_json::json!({"item": "test", "result": [7, -1]}),
            serde_json::to_value(&info).unwrap()
        );
    }
}
