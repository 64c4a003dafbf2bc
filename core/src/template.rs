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

//! Trivial templating engine.

/// Errors raised while expanding a template.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// The same key was given more than one replacement value.
    #[error("Found two values for replacement {0}")]
    DuplicateKey(String),

    /// The template references a key that has no replacement value.
    #[error("No replacement for {0} but it must have been defined")]
    UnknownKey(String),

    /// The template ends in the middle of a `%key%` reference.
    #[error("Unterminated replacement {0}")]
    Unterminated(String),
}

/// Performs various named string replacements in `input` based on `replacements`.
///
/// The `input` string can have `%key%` strings in it where `key` must appear in `replacements` and
/// which will be replaced by its corresponding value.  Raw `%` characters can be escaped via `%%`
/// and nested expansions are not supported.
///
/// Values are inserted verbatim.  Callers that generate HTML must pass values through
/// `escape_html` first unless they are known to be safe markup.
pub fn apply(input: &str, replacements: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(input.len());
    let mut partial_key: Option<String> = None;
    for ch in input.chars() {
        if ch == '%' {
            match partial_key {
                Some(key) if key.is_empty() => {
                    output.push('%');
                    partial_key = None;
                }
                Some(key) => {
                    let mut values = replacements.iter().filter(|(k, _)| *k == key);
                    match (values.next(), values.next()) {
                        (Some((_, value)), None) => output.push_str(value),
                        (Some(_), Some(_)) => return Err(TemplateError::DuplicateKey(key)),
                        (None, _) => return Err(TemplateError::UnknownKey(key)),
                    }
                    partial_key = None;
                }
                None => partial_key = Some(String::new()),
            }
        } else {
            match partial_key.as_mut() {
                Some(k) => k.push(ch),
                None => output.push(ch),
            }
        }
    }
    match partial_key {
        Some(key) => Err(TemplateError::Unterminated(key)),
        None => Ok(output),
    }
}

/// Escapes the characters in `input` that have special meaning in HTML text and attributes.
pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            ch => output.push(ch),
        }
    }
    output
}
