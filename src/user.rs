//! User accounts and the account store
//!
//! Account rows are comma-separated lines that have grown two optional
//! trailing fields over time: registration date, then status. Decoding
//! accepts all three generations; encoding always writes the full five-field
//! shape, so older rows upgrade on the next whole-file rewrite.
//!
//! Matching rules differ by operation and are documented on each one: the
//! duplicate check and keyed updates use exact comparison, while
//! authentication and the blocked check match the identifier
//! case-insensitively.

use crate::errors::{DomainError, DomainResult};
use crate::record::{split_fields, FlatRecord};
use crate::store::FlatFileStore;
use crate::validation::validate_registration_fields;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Storage format for registration dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Account standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    /// Account may authenticate and book
    Active,
    /// Account is locked out by an administrator
    Blocked,
}

impl UserStatus {
    /// Stored text for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Blocked => "Blocked",
        }
    }

    /// Parse stored text; anything other than "Blocked" is Active
    pub fn parse(text: &str) -> Self {
        match text {
            "Blocked" => UserStatus::Blocked,
            _ => UserStatus::Active,
        }
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name, no digits allowed
    pub username: String,
    /// Unique key across the store
    pub email: String,
    /// Stored as plaintext; hashing is out of scope for this store
    pub password: String,
    /// Day the account was created
    pub registration_date: NaiveDate,
    /// Account standing
    pub status: UserStatus,
}

impl User {
    /// Create an account dated today with Active status
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            registration_date: Local::now().date_naive(),
            status: UserStatus::Active,
        }
    }

    /// Case-insensitive match on username or email
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username.eq_ignore_ascii_case(identifier)
            || self.email.eq_ignore_ascii_case(identifier)
    }
}

impl FlatRecord for User {
    const DELIMITER: char = ',';
    const KIND: &'static str = "user";

    fn encode(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.username,
            self.email,
            self.password,
            self.registration_date.format(DATE_FORMAT),
            self.status.as_str()
        )
    }

    /// Decode any of the three row generations
    ///
    /// Three fields: registration date defaults to today at decode time and
    /// status to Active. Four fields: the stored date with Active status.
    /// Five or more fields: fully specified.
    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line, Self::DELIMITER);
        if fields.len() < 3 {
            return None;
        }

        let registration_date = match fields.get(3) {
            Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()?,
            None => Local::now().date_naive(),
        };
        let status = match fields.get(4) {
            Some(raw) => UserStatus::parse(raw),
            None => UserStatus::Active,
        };

        Some(User {
            username: fields[0].to_string(),
            email: fields[1].to_string(),
            password: fields[2].to_string(),
            registration_date,
            status,
        })
    }
}

/// Account store over the user file
#[derive(Debug, Clone)]
pub struct UserStore {
    store: FlatFileStore<User>,
}

impl UserStore {
    /// Create a store over the given user file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: FlatFileStore::new(path),
        }
    }

    /// Whether an account with this exact username or exact email exists
    pub fn exists(&self, username: &str, email: &str) -> DomainResult<bool> {
        Ok(self
            .store
            .find(|u| u.username == username || u.email == email)?
            .is_some())
    }

    /// Register a new account dated today with Active status
    ///
    /// Field rules are checked first and short-circuit; a colliding exact
    /// username or exact email fails with `DuplicateUser` before anything is
    /// written.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<User> {
        validate_registration_fields(username, email, password)?;
        if self.exists(username, email)? {
            return Err(DomainError::DuplicateUser(format!(
                "{username} / {email}"
            )));
        }

        let user = User::new(username, email, password);
        self.store.append(&user)?;
        info!(username, email, "registered account");
        Ok(user)
    }

    /// Check credentials
    ///
    /// The identifier matches username or email case-insensitively; the
    /// password comparison is exact. No lockout, no hashing.
    pub fn authenticate(&self, identifier: &str, password: &str) -> DomainResult<bool> {
        Ok(self
            .store
            .find(|u| u.matches_identifier(identifier) && u.password == password)?
            .is_some())
    }

    /// Whether the account matching the identifier is Blocked
    ///
    /// Case-insensitive identifier match. Rows persisted before the status
    /// column existed decode as Active and can never report Blocked.
    pub fn is_blocked(&self, identifier: &str) -> DomainResult<bool> {
        Ok(self
            .store
            .find(|u| u.matches_identifier(identifier))?
            .map(|u| u.status == UserStatus::Blocked)
            .unwrap_or(false))
    }

    /// Replace the password of the account with this exact email
    ///
    /// Registration date and status are preserved; the whole file is
    /// rewritten.
    pub fn reset_password(&self, email: &str, new_password: &str) -> DomainResult<()> {
        self.mutate_by_email(email, |user| {
            user.password = new_password.to_string();
        })
    }

    /// Replace username, email, and password of the exact `old_email` row
    ///
    /// Registration date and status are preserved. The replacement fields are
    /// validated before any mutation.
    pub fn update_profile(
        &self,
        old_email: &str,
        new_username: &str,
        new_email: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        validate_registration_fields(new_username, new_email, new_password)?;
        self.mutate_by_email(old_email, |user| {
            user.username = new_username.to_string();
            user.email = new_email.to_string();
            user.password = new_password.to_string();
        })
    }

    /// Set the status of the account with this exact email
    pub fn set_status(&self, email: &str, status: UserStatus) -> DomainResult<()> {
        self.mutate_by_email(email, |user| {
            user.status = status;
        })
    }

    /// Remove the account with this exact email
    ///
    /// The row is removed entirely; bookings referencing the account are left
    /// in place.
    pub fn delete(&self, email: &str) -> DomainResult<()> {
        let mut users = self.store.scan_all()?;
        let before = users.len();
        users.retain(|u| u.email != email);
        if users.len() == before {
            return Err(DomainError::NotFound(email.to_string()));
        }
        self.store.rewrite_all(&users)
    }

    /// First account whose username or email equals the identifier exactly
    pub fn get_by_identifier(&self, identifier: &str) -> DomainResult<Option<User>> {
        self.store
            .find(|u| u.username == identifier || u.email == identifier)
    }

    /// All accounts in file order
    pub fn list_all(&self) -> DomainResult<Vec<User>> {
        self.store.scan_all()
    }

    fn mutate_by_email<F>(&self, email: &str, mutate: F) -> DomainResult<()>
    where
        F: Fn(&mut User),
    {
        let mut users = self.store.scan_all()?;
        let mut found = false;
        for user in users.iter_mut() {
            if user.email == email {
                mutate(user);
                found = true;
            }
        }
        if !found {
            return Err(DomainError::NotFound(email.to_string()));
        }
        self.store.rewrite_all(&users)
    }
}

/// Static administrator identity
///
/// The administrator never appears in the user file and cannot register
/// through the normal sign-up path.
pub mod admin {
    /// Administrator login name
    pub const ADMIN_USERNAME: &str = "admin";
    /// Administrator email
    pub const ADMIN_EMAIL: &str = "admin@moviebooking.com";
    const ADMIN_PASSWORD: &str = "admin123";

    /// Exact-match check against the static administrator credentials
    pub fn is_admin(identifier: &str, password: &str) -> bool {
        (identifier == ADMIN_USERNAME || identifier == ADMIN_EMAIL)
            && password == ADMIN_PASSWORD
    }
}
