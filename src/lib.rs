//! # Cinema Domain
//!
//! Persistence and booking-workflow core for a movie ticket booking system.
//!
//! This crate provides the storage and domain logic behind the screens:
//! - **Flat Record Store**: generic scan/append/rewrite engine over delimited
//!   text files, one record per line
//! - **Record Codec**: schema-tolerant line encoding that accepts every
//!   historical row shape and writes the newest
//! - **User Store**: registration, authentication, status, profile updates
//! - **Movie Catalog**: position-indexed catalog with poster copy-in
//! - **Ticket Ledger**: append-only booking records with aggregate queries
//! - **Booking Workflow**: state machine accumulating seat/time/date
//!   selections and committing a ticket exactly once
//! - **Reporting**: read-only dashboard and table views over snapshots
//!
//! ## Design Principles
//!
//! 1. **Explicit Results**: every store and workflow operation returns
//!    `DomainResult`; expected failures are values, never panics
//! 2. **Tolerant Reads**: a malformed row is skipped, never fatal to a scan
//! 3. **Migration on Write**: rewrites upgrade old rows to the newest schema
//! 4. **Controlled State**: the booking session only moves through valid
//!    transitions and commits exactly once
//! 5. **Single Writer**: one synchronous caller at a time owns each file;
//!    there is no cross-process locking

#![warn(missing_docs)]

mod errors;
mod record;
mod store;
mod validation;

pub mod booking;
pub mod movie;
pub mod reporting;
pub mod ticket;
pub mod user;

// Re-export core types
pub use booking::{BookingDate, BookingSession, BookingState, StateTransition};
pub use errors::{DomainError, DomainResult};
pub use movie::{Movie, MovieCatalog, MovieDraft};
pub use record::FlatRecord;
pub use reporting::{DashboardSummary, UserActivityRow};
pub use store::FlatFileStore;
pub use ticket::{SeatType, Ticket, TicketLedger};
pub use user::{User, UserStatus, UserStore};
pub use validation::{
    is_valid_email, is_valid_password, is_valid_username, validate_forgot_password,
    validate_login, validate_signup,
};
