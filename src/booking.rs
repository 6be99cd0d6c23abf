//! Booking workflow state machine
//!
//! A session accumulates one user's selections against one movie and commits
//! a ticket on confirmation. Seat, showtime, and date selections arrive
//! independently and in any order; the session state tracks whether the
//! combination is complete enough to confirm.
//!
//! ```mermaid
//! stateDiagram-v2
//!     Idle --> Selecting: first input
//!     Selecting --> ReadyToConfirm: seats, time, and date chosen
//!     ReadyToConfirm --> Selecting: a selection removed
//!     ReadyToConfirm --> Confirmed: ticket appended
//! ```
//!
//! Confirmation appends to the ticket ledger exactly once. A failed append
//! leaves the session state untouched so the caller may retry; a session for
//! a different movie is a fresh session with nothing carried over.

use crate::errors::{DomainError, DomainResult};
use crate::movie::Movie;
use crate::ticket::{SeatType, Ticket, TicketLedger};
use chrono::{DateTime, Days, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

/// Display format for the show date on a ticket
const TICKET_DATE_FORMAT: &str = "%B %d, %Y";

/// States of a booking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingState {
    /// No input received yet
    Idle,
    /// At least one input received, selections incomplete
    Selecting,
    /// Seats, showtime, and date all chosen
    ReadyToConfirm,
    /// Ticket appended; terminal
    Confirmed,
}

impl BookingState {
    /// Name of this state for error messages and logging
    pub fn name(&self) -> &'static str {
        match self {
            BookingState::Idle => "Idle",
            BookingState::Selecting => "Selecting",
            BookingState::ReadyToConfirm => "ReadyToConfirm",
            BookingState::Confirmed => "Confirmed",
        }
    }

    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingState::Confirmed)
    }

    /// Check if a transition to the target state is valid
    pub fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (BookingState::Idle, BookingState::Selecting)
                | (BookingState::Selecting, BookingState::ReadyToConfirm)
                | (BookingState::ReadyToConfirm, BookingState::Selecting)
                | (BookingState::ReadyToConfirm, BookingState::Confirmed)
        )
    }
}

/// Show date choice, a fixed two-value set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingDate {
    /// The current calendar day
    Today,
    /// The next calendar day
    Tomorrow,
}

impl BookingDate {
    /// Render as the ticket's display-formatted date, resolved now
    pub fn display(&self) -> String {
        let day = match self {
            BookingDate::Today => Local::now().date_naive(),
            BookingDate::Tomorrow => Local::now()
                .date_naive()
                .checked_add_days(Days::new(1))
                .unwrap_or_else(|| Local::now().date_naive()),
        };
        day.format(TICKET_DATE_FORMAT).to_string()
    }
}

/// Record of one state transition within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state before the transition
    pub from: BookingState,
    /// The state after the transition
    pub to: BookingState,
    /// Unique identifier for this transition instance
    pub transition_id: Uuid,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// One user's in-progress booking against one movie
#[derive(Debug, Clone)]
pub struct BookingSession {
    session_id: Uuid,
    user_identifier: String,
    movie: Movie,
    seats: BTreeSet<String>,
    seat_type: SeatType,
    time: Option<String>,
    date: Option<BookingDate>,
    state: BookingState,
    history: Vec<StateTransition>,
}

impl BookingSession {
    /// Start a session for a movie with empty selections
    pub fn new(movie: Movie, user_identifier: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_identifier: user_identifier.into(),
            movie,
            seats: BTreeSet::new(),
            seat_type: SeatType::Standard,
            time: None,
            date: None,
            state: BookingState::Idle,
            history: Vec::new(),
        }
    }

    /// Session identifier
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The movie this session is bound to
    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    /// Current state
    pub fn state(&self) -> BookingState {
        self.state
    }

    /// Recorded state transitions, oldest first
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Currently selected seats, in sorted order
    pub fn seats(&self) -> impl Iterator<Item = &str> {
        self.seats.iter().map(String::as_str)
    }

    /// Number of selected seats
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// Currently chosen tier
    pub fn seat_type(&self) -> SeatType {
        self.seat_type
    }

    /// Currently chosen showtime label, if any
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    /// Currently chosen date, if any
    pub fn date(&self) -> Option<BookingDate> {
        self.date
    }

    /// Total price of the current selection
    ///
    /// Recomputed from scratch on every read, so it is always consistent
    /// with the seat set and tier.
    pub fn price(&self) -> u32 {
        self.seats.len() as u32 * self.seat_type.price_per_seat()
    }

    /// Whether every required selection has been made
    pub fn is_ready(&self) -> bool {
        !self.seats.is_empty() && self.time.is_some() && self.date.is_some()
    }

    /// Add or remove a seat; returns whether the seat is now selected
    pub fn toggle_seat(&mut self, label: impl Into<String>) -> DomainResult<bool> {
        self.ensure_open()?;
        let label = label.into();
        let selected = if self.seats.remove(&label) {
            false
        } else {
            self.seats.insert(label);
            true
        };
        self.refresh_state();
        Ok(selected)
    }

    /// Choose the showtime slot, deselecting any previous choice
    pub fn choose_time(&mut self, label: impl Into<String>) -> DomainResult<()> {
        self.ensure_open()?;
        self.time = Some(label.into());
        self.refresh_state();
        Ok(())
    }

    /// Choose the show date, replacing any previous choice
    pub fn choose_date(&mut self, date: BookingDate) -> DomainResult<()> {
        self.ensure_open()?;
        self.date = Some(date);
        self.refresh_state();
        Ok(())
    }

    /// Choose the price tier for the whole seat set
    pub fn choose_seat_type(&mut self, seat_type: SeatType) -> DomainResult<()> {
        self.ensure_open()?;
        self.seat_type = seat_type;
        self.refresh_state();
        Ok(())
    }

    /// Commit the booking: build the ticket and append it to the ledger
    ///
    /// Rejected with a validation error naming the first missing selection
    /// unless seats, showtime, and date are all chosen. On a failed append
    /// the error is returned and the session state is left untouched, so the
    /// caller may retry. On success the session transitions to Confirmed and
    /// accepts no further input.
    pub fn confirm(&mut self, ledger: &TicketLedger) -> DomainResult<Ticket> {
        if self.state.is_terminal() {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.name().to_string(),
                to: BookingState::Confirmed.name().to_string(),
            });
        }
        if self.seats.is_empty() {
            return Err(DomainError::validation("please select at least one seat"));
        }
        let Some(time) = self.time.clone() else {
            return Err(DomainError::validation("please select a showtime"));
        };
        let Some(date) = self.date else {
            return Err(DomainError::validation("please select a date"));
        };

        let ticket = Ticket {
            user_identifier: self.user_identifier.clone(),
            movie_name: self.movie.name.clone(),
            genre: self.movie.genre.clone(),
            language: self.movie.language.clone(),
            rating: self.movie.rating.clone(),
            date: date.display(),
            time,
            seats: self.seats_label(),
            seat_type: self.seat_type.label().to_string(),
            price: self.price().to_string(),
        };

        ledger.append(&ticket)?;
        self.transition_to(BookingState::Confirmed)?;
        info!(
            session = %self.session_id,
            user = %self.user_identifier,
            movie = %self.movie.name,
            price = %ticket.price,
            "booking confirmed"
        );
        Ok(ticket)
    }

    /// Sorted, ", "-joined seat labels as stored on the ticket
    pub fn seats_label(&self) -> String {
        self.seats
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.state.is_terminal() {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.name().to_string(),
                to: BookingState::Selecting.name().to_string(),
            });
        }
        Ok(())
    }

    /// Settle between Selecting and ReadyToConfirm after an input
    fn refresh_state(&mut self) {
        let target = if self.is_ready() {
            BookingState::ReadyToConfirm
        } else {
            BookingState::Selecting
        };
        if self.state != target && self.state.can_transition_to(&target) {
            // internal transitions are always legal by construction
            let _ = self.transition_to(target);
        }
    }

    fn transition_to(&mut self, target: BookingState) -> DomainResult<()> {
        if !self.state.can_transition_to(&target) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.name().to_string(),
                to: target.name().to_string(),
            });
        }
        self.history.push(StateTransition {
            from: self.state,
            to: target,
            transition_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        });
        self.state = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn movie() -> Movie {
        Movie {
            name: "Dune".to_string(),
            director: "Denis Villeneuve".to_string(),
            genre: "Sci-Fi".to_string(),
            language: "English".to_string(),
            duration: "155 min".to_string(),
            rating: "PG-13".to_string(),
            image_path: String::new(),
        }
    }

    fn ledger_in(dir: &TempDir) -> TicketLedger {
        TicketLedger::new(dir.path().join("ticket.txt"))
    }

    fn ready_session() -> BookingSession {
        let mut session = BookingSession::new(movie(), "bob@x.com");
        session.toggle_seat("A1").unwrap();
        session.toggle_seat("A2").unwrap();
        session.choose_time("8:30 PM").unwrap();
        session.choose_date(BookingDate::Today).unwrap();
        session
    }

    #[test]
    fn test_transition_table() {
        use BookingState::*;
        assert!(Idle.can_transition_to(&Selecting));
        assert!(Selecting.can_transition_to(&ReadyToConfirm));
        assert!(ReadyToConfirm.can_transition_to(&Selecting));
        assert!(ReadyToConfirm.can_transition_to(&Confirmed));

        assert!(!Idle.can_transition_to(&Confirmed));
        assert!(!Selecting.can_transition_to(&Confirmed));
        assert!(!Confirmed.can_transition_to(&Selecting));
        assert!(Confirmed.is_terminal());
    }

    #[test]
    fn test_selections_accumulate_in_any_order() {
        let mut session = BookingSession::new(movie(), "bob@x.com");
        assert_eq!(session.state(), BookingState::Idle);

        session.choose_date(BookingDate::Tomorrow).unwrap();
        assert_eq!(session.state(), BookingState::Selecting);

        session.choose_time("5:00 PM").unwrap();
        assert_eq!(session.state(), BookingState::Selecting);

        session.toggle_seat("B4").unwrap();
        assert_eq!(session.state(), BookingState::ReadyToConfirm);
    }

    #[test]
    fn test_toggle_removes_on_second_call() {
        let mut session = ready_session();
        assert_eq!(session.seat_count(), 2);

        assert!(!session.toggle_seat("A1").unwrap());
        assert_eq!(session.seat_count(), 1);
        assert_eq!(session.state(), BookingState::ReadyToConfirm);

        // removing the last seat drops the session back to Selecting
        assert!(!session.toggle_seat("A2").unwrap());
        assert_eq!(session.seat_count(), 0);
        assert_eq!(session.state(), BookingState::Selecting);
    }

    #[test]
    fn test_time_choice_is_exclusive() {
        let mut session = BookingSession::new(movie(), "bob@x.com");
        session.choose_time("10:00 AM").unwrap();
        session.choose_time("8:30 PM").unwrap();
        assert_eq!(session.time(), Some("8:30 PM"));
    }

    #[test]
    fn test_seats_label_is_sorted() {
        let mut session = BookingSession::new(movie(), "bob@x.com");
        session.toggle_seat("C3").unwrap();
        session.toggle_seat("A1").unwrap();
        session.toggle_seat("B2").unwrap();
        assert_eq!(session.seats_label(), "A1, B2, C3");
    }

    #[test_case(1, SeatType::Standard, 185)]
    #[test_case(2, SeatType::Luxury, 600)]
    #[test_case(3, SeatType::Reclinear, 675)]
    #[test_case(5, SeatType::Standard, 925)]
    fn test_price_law(seat_count: usize, tier: SeatType, expected: u32) {
        let mut session = BookingSession::new(movie(), "bob@x.com");
        for i in 0..seat_count {
            session.toggle_seat(format!("A{i}")).unwrap();
        }
        session.choose_seat_type(tier).unwrap();
        assert_eq!(session.price(), expected);
    }

    #[test]
    fn test_price_recomputed_on_tier_change() {
        let mut session = ready_session();
        assert_eq!(session.price(), 2 * 185);

        session.choose_seat_type(SeatType::Luxury).unwrap();
        assert_eq!(session.price(), 600);

        session.toggle_seat("A3").unwrap();
        assert_eq!(session.price(), 900);
    }

    #[test]
    fn test_confirm_rejects_missing_selections() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        // zero seats, time and date chosen
        let mut session = BookingSession::new(movie(), "bob@x.com");
        session.choose_time("8:30 PM").unwrap();
        session.choose_date(BookingDate::Today).unwrap();
        let err = session.confirm(&ledger).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: please select at least one seat"
        );

        // seats chosen, no time
        let mut session = BookingSession::new(movie(), "bob@x.com");
        session.toggle_seat("A1").unwrap();
        session.choose_date(BookingDate::Today).unwrap();
        let err = session.confirm(&ledger).unwrap_err();
        assert_eq!(err.to_string(), "validation error: please select a showtime");

        // seats and time chosen, no date
        let mut session = BookingSession::new(movie(), "bob@x.com");
        session.toggle_seat("A1").unwrap();
        session.choose_time("8:30 PM").unwrap();
        let err = session.confirm(&ledger).unwrap_err();
        assert_eq!(err.to_string(), "validation error: please select a date");

        // nothing was appended by any rejected confirm
        assert!(ledger.all_bookings().unwrap().is_empty());
    }

    #[test]
    fn test_confirm_builds_ticket_from_selections() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        let mut session = ready_session();
        session.choose_seat_type(SeatType::Luxury).unwrap();
        let ticket = session.confirm(&ledger).unwrap();

        assert_eq!(ticket.user_identifier, "bob@x.com");
        assert_eq!(ticket.movie_name, "Dune");
        assert_eq!(ticket.genre, "Sci-Fi");
        assert_eq!(ticket.language, "English");
        assert_eq!(ticket.rating, "PG-13");
        assert_eq!(ticket.time, "8:30 PM");
        assert_eq!(ticket.seats, "A1, A2");
        assert_eq!(ticket.seat_type, "Luxury Seat");
        assert_eq!(ticket.price, "600");
        assert_eq!(ticket.date, BookingDate::Today.display());

        assert_eq!(session.state(), BookingState::Confirmed);
        assert_eq!(ledger.all_bookings().unwrap().len(), 1);
    }

    #[test]
    fn test_confirmed_session_accepts_no_further_input() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        let mut session = ready_session();
        session.confirm(&ledger).unwrap();

        assert!(session.toggle_seat("A3").is_err());
        assert!(session.choose_time("10:00 AM").is_err());
        assert!(session.choose_date(BookingDate::Tomorrow).is_err());
        let err = session.confirm(&ledger).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));

        // no double append
        assert_eq!(ledger.all_bookings().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_append_keeps_state_for_retry() {
        let dir = TempDir::new().unwrap();
        // a directory at the ledger path makes every append fail
        let blocked_path = dir.path().join("ticket.txt");
        std::fs::create_dir(&blocked_path).unwrap();
        let broken = TicketLedger::new(&blocked_path);

        let mut session = ready_session();
        let err = session.confirm(&broken).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(session.state(), BookingState::ReadyToConfirm);

        // retry against a working ledger succeeds without re-entering inputs
        let working = TicketLedger::new(dir.path().join("retry.txt"));
        let ticket = session.confirm(&working).unwrap();
        assert_eq!(ticket.seats, "A1, A2");
        assert_eq!(session.state(), BookingState::Confirmed);
    }

    #[test]
    fn test_history_records_the_path_to_confirmed() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        let mut session = ready_session();
        session.confirm(&ledger).unwrap();

        let path: Vec<(BookingState, BookingState)> = session
            .history()
            .iter()
            .map(|t| (t.from, t.to))
            .collect();
        assert_eq!(
            path,
            vec![
                (BookingState::Idle, BookingState::Selecting),
                (BookingState::Selecting, BookingState::ReadyToConfirm),
                (BookingState::ReadyToConfirm, BookingState::Confirmed),
            ]
        );
    }

    #[test]
    fn test_new_session_for_other_movie_starts_empty() {
        let first = ready_session();
        assert_eq!(first.seat_count(), 2);

        let other = Movie {
            name: "Arrival".to_string(),
            ..movie()
        };
        let second = BookingSession::new(other, "bob@x.com");
        assert_eq!(second.seat_count(), 0);
        assert_eq!(second.time(), None);
        assert_eq!(second.date(), None);
        assert_eq!(second.price(), 0);
        assert_eq!(second.state(), BookingState::Idle);
    }
}
