//! crates/markethub_core/src/credentials.rs
//!
//! Lookups over the locally registered user table.

use crate::domain::LocalUserRecord;

/// Finds the record whose email or username equals `identifier`, ignoring case.
pub fn find_by_identifier<'a>(
    records: &'a [LocalUserRecord],
    identifier: &str,
) -> Option<&'a LocalUserRecord> {
    let identifier = identifier.trim();
    records.iter().find(|record| {
        record.email.eq_ignore_ascii_case(identifier)
            || record.username.eq_ignore_ascii_case(identifier)
    })
}

/// Whether `email` is already registered, ignoring case.
pub fn email_taken(records: &[LocalUserRecord], email: &str) -> bool {
    let email = email.trim();
    records.iter().any(|record| record.email.eq_ignore_ascii_case(email))
}

/// The username used when signup leaves it blank: the email's local part.
pub fn default_username(email: &str) -> String {
    email.trim().split('@').next().unwrap_or_default().to_lowercase()
}
