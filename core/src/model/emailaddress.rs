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

//! The `EmailAddress` data type.

use crate::model::{ModelResult, ValidationFailure};
use regex::Regex;
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Shape that all email addresses must have: a local part, an `@`, and a domain with at least one
/// dot in it.  None of the parts can contain whitespace or additional `@` characters.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Hardcoded regex must be valid")
});

/// Represents a correctly-formatted email address.
///
/// Email addresses are compared as case sensitive strings.  Uniqueness is enforced by the
/// database on the exact string we store.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new email address from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ValidationFailure::missing_field("Email address cannot be empty"));
        }

        // Validating email addresses for real is futile.  All we do is reject obvious typos.
        if !EMAIL_RE.is_match(&s) {
            return Err(ValidationFailure::invalid_format("Invalid email format"));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the email address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&str> for EmailAddress {
    fn from(raw_email: &str) -> Self {
        Self::new(raw_email).expect("Hardcoded email addresses for testing must be valid")
    }
}

/// Visitor to deserialize an `EmailAddress` from a string.
struct EmailAddressVisitor;

impl Visitor<'_> for EmailAddressVisitor {
    type Value = EmailAddress;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str(r#"an email address"#)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match EmailAddress::new(v) {
            Ok(email) => Ok(email),
            Err(e) => Err(E::custom(format!("{}", e))),
        }
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match EmailAddress::new(v) {
            Ok(email) => Ok(email),
            Err(e) => Err(E::custom(format!("{}", e))),
        }
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(EmailAddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationReason;
    use serde_test::{Token, assert_de_tokens_error, assert_tokens};

    #[test]
    fn test_emailaddress_ok() {
        assert_eq!("simple@example.com", EmailAddress::new("simple@example.com").unwrap().as_str());
        assert_eq!("a@b.com", EmailAddress::new("a@b.com").unwrap().as_str());
        assert_eq!("a!b+c@d.e.f", EmailAddress::new("a!b+c@d.e.f").unwrap().as_str());
        assert_eq!("a@b..c", EmailAddress::new("a@b..c").unwrap().as_str());
    }

    #[test]
    fn test_emailaddress_into() {
        assert_eq!(EmailAddress::new("a@example.com").unwrap(), "a@example.com".into());
    }

    #[test]
    fn test_emailaddress_empty() {
        let e = EmailAddress::new("").unwrap_err();
        assert_eq!(ValidationReason::MissingField, e.reason());
    }

    #[test]
    fn test_emailaddress_bad_format() {
        for raw in [
            " ",
            "foo",
            "foo@bar",
            "@example.com",
            "foo@.com",
            "foo@example.",
            "foo@@example.com",
            "foo@exa@mple.com",
            "foo bar@example.com",
            "foo@example .com",
            " foo@example.com",
            "foo@example.com\n",
        ] {
            let e = EmailAddress::new(raw).unwrap_err();
            assert_eq!(ValidationReason::InvalidFormat, e.reason(), "Input was {:?}", raw);
            assert_eq!("Invalid email format", e.message());
        }
    }

    #[test]
    fn test_emailaddress_case_sensitive() {
        assert_ne!(
            EmailAddress::new("foo@example.com").unwrap(),
            EmailAddress::new("Foo@example.com").unwrap()
        );
    }

    #[test]
    fn test_emailaddress_ser_de_ok() {
        let email = EmailAddress::new("HelloWorld@example.com").unwrap();
        assert_tokens(&email, &[Token::String("HelloWorld@example.com")]);
    }

    #[test]
    fn test_emailaddress_de_error() {
        assert_de_tokens_error::<EmailAddress>(
            &[Token::String("HelloWorld")],
            "Invalid email format",
        );
    }
}
