/*
 *     Copyright 2025 The Vigil Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// MIN_LENGTH is the minimum number of characters of a strong password.
pub const MIN_LENGTH: usize = 8;

lazy_static! {
    /// LOWERCASE_REGEX matches a lowercase ascii letter.
    static ref LOWERCASE_REGEX: Regex = Regex::new(r"[a-z]").unwrap();

    /// UPPERCASE_REGEX matches an uppercase ascii letter.
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();

    /// DIGIT_REGEX matches a numeric digit.
    static ref DIGIT_REGEX: Regex = Regex::new(r"\d").unwrap();

    /// SPECIAL_REGEX matches an ascii punctuation character.
    static ref SPECIAL_REGEX: Regex = Regex::new(r"[!-/:-@\[-`{-~]").unwrap();
}

/// Violation is a password policy rule that a candidate password failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// TooShort indicates the password has fewer than the minimum characters.
    TooShort,

    /// MissingLowercase indicates the password has no lowercase letter.
    MissingLowercase,

    /// MissingUppercase indicates the password has no uppercase letter.
    MissingUppercase,

    /// MissingDigit indicates the password has no numeric digit.
    MissingDigit,

    /// MissingSpecial indicates the password has no special character.
    MissingSpecial,
}

/// Display implements the Display trait.
impl fmt::Display for Violation {
    /// fmt formats the violation as user facing feedback.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::TooShort => {
                write!(f, "Length must be at least {} characters.", MIN_LENGTH)
            }
            Violation::MissingLowercase => write!(f, "Missing a lowercase letter."),
            Violation::MissingUppercase => write!(f, "Missing an uppercase letter."),
            Violation::MissingDigit => write!(f, "Missing a numeric digit (0-9)."),
            Violation::MissingSpecial => {
                write!(f, "Missing a special character (e.g., !, @, #, $).")
            }
        }
    }
}

/// validate checks a candidate password against the password policy and
/// returns every violated rule in evaluation order. The length rule counts
/// characters, not bytes.
pub fn validate(password: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_LENGTH {
        violations.push(Violation::TooShort);
    }

    if !LOWERCASE_REGEX.is_match(password) {
        violations.push(Violation::MissingLowercase);
    }

    if !UPPERCASE_REGEX.is_match(password) {
        violations.push(Violation::MissingUppercase);
    }

    if !DIGIT_REGEX.is_match(password) {
        violations.push(Violation::MissingDigit);
    }

    if !SPECIAL_REGEX.is_match(password) {
        violations.push(Violation::MissingSpecial);
    }

    violations
}

/// is_strong returns true if a candidate password satisfies the password policy.
pub fn is_strong(password: &str) -> bool {
    validate(password).is_empty()
}
