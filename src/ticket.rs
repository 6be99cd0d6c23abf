//! Booking records and the append-only ticket ledger
//!
//! A ticket is a frozen snapshot of one completed booking: ten
//! semicolon-separated fields, written once and never updated or deleted.
//! Line position encodes insertion order, so the last line for a user is
//! their most recent booking. The aggregate queries are single full scans.

use crate::errors::DomainResult;
use crate::record::{split_fields, FlatRecord};
use crate::store::FlatFileStore;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Price tier of the selected seats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatType {
    /// Base tier
    Standard,
    /// Reclining seats
    Reclinear,
    /// Premium tier
    Luxury,
}

impl SeatType {
    /// Every tier, in ascending price order
    pub const ALL: [SeatType; 3] = [SeatType::Standard, SeatType::Reclinear, SeatType::Luxury];

    /// Price per seat in integer currency units
    pub fn price_per_seat(&self) -> u32 {
        match self {
            SeatType::Standard => 185,
            SeatType::Reclinear => 225,
            SeatType::Luxury => 300,
        }
    }

    /// Display label, stored verbatim in the ticket record
    pub fn label(&self) -> &'static str {
        match self {
            SeatType::Standard => "Standard Seat",
            SeatType::Reclinear => "Reclinear Seat",
            SeatType::Luxury => "Luxury Seat",
        }
    }
}

/// One completed booking
///
/// Every field is stored as text, including `price`, which is the frozen
/// total computed at booking time. The ledger never recomputes or
/// reinterprets a stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Username or email the booking was made under
    pub user_identifier: String,
    /// Movie title at booking time
    pub movie_name: String,
    /// Movie genre at booking time
    pub genre: String,
    /// Movie language at booking time
    pub language: String,
    /// Movie rating at booking time
    pub rating: String,
    /// Display-formatted show date, for example "August 04, 2026"
    pub date: String,
    /// Display label of the chosen showtime slot
    pub time: String,
    /// Sorted, ", "-joined seat labels, for example "A1, A2"
    pub seats: String,
    /// Label of the chosen price tier
    pub seat_type: String,
    /// Frozen total as an integer string
    pub price: String,
}

impl FlatRecord for Ticket {
    const DELIMITER: char = ';';
    const KIND: &'static str = "ticket";

    fn encode(&self) -> String {
        [
            self.user_identifier.as_str(),
            self.movie_name.as_str(),
            self.genre.as_str(),
            self.language.as_str(),
            self.rating.as_str(),
            self.date.as_str(),
            self.time.as_str(),
            self.seats.as_str(),
            self.seat_type.as_str(),
            self.price.as_str(),
        ]
        .join(";")
    }

    /// Exactly ten fields required; extra trailing fields are ignored
    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line, Self::DELIMITER);
        if fields.len() < 10 {
            return None;
        }
        Some(Ticket {
            user_identifier: fields[0].to_string(),
            movie_name: fields[1].to_string(),
            genre: fields[2].to_string(),
            language: fields[3].to_string(),
            rating: fields[4].to_string(),
            date: fields[5].to_string(),
            time: fields[6].to_string(),
            seats: fields[7].to_string(),
            seat_type: fields[8].to_string(),
            price: fields[9].to_string(),
        })
    }
}

/// Append-only store of bookings with aggregate queries
#[derive(Debug, Clone)]
pub struct TicketLedger {
    store: FlatFileStore<Ticket>,
}

impl TicketLedger {
    /// Create a ledger over the given booking file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: FlatFileStore::new(path),
        }
    }

    /// Append one booking; the only write operation on the ledger
    pub fn append(&self, ticket: &Ticket) -> DomainResult<()> {
        self.store.append(ticket)
    }

    /// Every booking in file order, oldest first
    pub fn all_bookings(&self) -> DomainResult<Vec<Ticket>> {
        self.store.scan_all()
    }

    /// Bookings whose user identifier matches case-insensitively
    pub fn bookings_for(&self, identifier: &str) -> DomainResult<Vec<Ticket>> {
        self.store
            .filter(|t| t.user_identifier.eq_ignore_ascii_case(identifier))
    }

    /// Booking count per user identifier
    ///
    /// Keys are case-sensitive, exactly as stored; first-seen file order is
    /// preserved.
    pub fn booking_counts(&self) -> DomainResult<IndexMap<String, u64>> {
        let mut counts: IndexMap<String, u64> = IndexMap::new();
        for ticket in self.store.scan_all()? {
            *counts
                .entry(ticket.user_identifier.trim().to_string())
                .or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Sum of every parseable price field
    ///
    /// Entries whose price fails integer parse are skipped silently.
    pub fn total_revenue(&self) -> DomainResult<i64> {
        Ok(self
            .store
            .scan_all()?
            .iter()
            .filter_map(|t| t.price.trim().parse::<i64>().ok())
            .sum())
    }

    /// Movie name of the identifier's most recent booking
    ///
    /// Valid because the ledger is append-only and never reordered: the last
    /// matching line is the newest.
    pub fn most_recent_movie(&self, identifier: &str) -> DomainResult<Option<String>> {
        Ok(self
            .bookings_for(identifier)?
            .last()
            .map(|t| t.movie_name.clone()))
    }

    /// Total spend across the identifier's bookings, unparseable prices skipped
    pub fn total_spent(&self, identifier: &str) -> DomainResult<i64> {
        Ok(self
            .bookings_for(identifier)?
            .iter()
            .filter_map(|t| t.price.trim().parse::<i64>().ok())
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn ticket(user: &str, movie: &str, price: &str) -> Ticket {
        Ticket {
            user_identifier: user.to_string(),
            movie_name: movie.to_string(),
            genre: "Sci-Fi".to_string(),
            language: "English".to_string(),
            rating: "PG-13".to_string(),
            date: "August 04, 2026".to_string(),
            time: "8:30 PM".to_string(),
            seats: "A1, A2".to_string(),
            seat_type: "Luxury Seat".to_string(),
            price: price.to_string(),
        }
    }

    fn ledger_in(dir: &TempDir) -> TicketLedger {
        TicketLedger::new(dir.path().join("ticket.txt"))
    }

    #[test]
    fn test_ticket_round_trip() {
        let original = ticket("bob@x.com", "Dune", "600");
        let decoded = Ticket::decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_short_line_is_skipped() {
        assert!(Ticket::decode("bob@x.com;Dune;Sci-Fi").is_none());
    }

    #[test]
    fn test_price_tiers() {
        assert_eq!(SeatType::Standard.price_per_seat(), 185);
        assert_eq!(SeatType::Reclinear.price_per_seat(), 225);
        assert_eq!(SeatType::Luxury.price_per_seat(), 300);
        assert_eq!(SeatType::Luxury.label(), "Luxury Seat");
    }

    #[test]
    fn test_append_only_growth() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        ledger.append(&ticket("bob@x.com", "Dune", "600")).unwrap();
        let first = ledger.all_bookings().unwrap();
        assert_eq!(first.len(), 1);

        ledger
            .append(&ticket("alice@x.com", "Arrival", "185"))
            .unwrap();
        let second = ledger.all_bookings().unwrap();
        assert_eq!(second.len(), 2);
        // prior entries unchanged, order preserved
        assert_eq!(second[0], first[0]);
        assert_eq!(second[1].movie_name, "Arrival");
    }

    #[test]
    fn test_bookings_for_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.append(&ticket("Bob@X.com", "Dune", "600")).unwrap();
        ledger.append(&ticket("alice@x.com", "Arrival", "185")).unwrap();

        assert_eq!(ledger.bookings_for("bob@x.com").unwrap().len(), 1);
        assert_eq!(ledger.bookings_for("BOB@X.COM").unwrap().len(), 1);
        assert!(ledger.bookings_for("carol@x.com").unwrap().is_empty());
    }

    #[test]
    fn test_booking_counts_keys_stay_as_stored() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.append(&ticket("Bob@X.com", "Dune", "600")).unwrap();
        ledger.append(&ticket("bob@x.com", "Dune", "300")).unwrap();
        ledger.append(&ticket("alice@x.com", "Arrival", "185")).unwrap();

        let counts = ledger.booking_counts().unwrap();
        // differing case produces distinct keys; the filter above does not
        assert_eq!(counts.get("Bob@X.com"), Some(&1));
        assert_eq!(counts.get("bob@x.com"), Some(&1));
        assert_eq!(counts.get("alice@x.com"), Some(&1));

        // first-seen order preserved
        let keys: Vec<&String> = counts.keys().collect();
        assert_eq!(keys, vec!["Bob@X.com", "bob@x.com", "alice@x.com"]);
    }

    #[test]
    fn test_total_revenue_skips_unparseable_prices() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.append(&ticket("bob@x.com", "Dune", "600")).unwrap();
        ledger.append(&ticket("bob@x.com", "Dune", "not-a-number")).unwrap();
        ledger.append(&ticket("alice@x.com", "Arrival", " 185 ")).unwrap();

        assert_eq!(ledger.total_revenue().unwrap(), 785);
    }

    #[test]
    fn test_most_recent_is_last_line() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        assert_eq!(ledger.most_recent_movie("bob@x.com").unwrap(), None);

        ledger.append(&ticket("bob@x.com", "Dune", "600")).unwrap();
        ledger.append(&ticket("bob@x.com", "Arrival", "185")).unwrap();
        ledger.append(&ticket("alice@x.com", "Alien", "300")).unwrap();

        assert_eq!(
            ledger.most_recent_movie("BOB@x.com").unwrap(),
            Some("Arrival".to_string())
        );
    }

    #[test]
    fn test_total_spent_per_user() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.append(&ticket("bob@x.com", "Dune", "600")).unwrap();
        ledger.append(&ticket("bob@x.com", "Arrival", "185")).unwrap();
        ledger.append(&ticket("alice@x.com", "Alien", "300")).unwrap();

        assert_eq!(ledger.total_spent("bob@x.com").unwrap(), 785);
        assert_eq!(ledger.total_spent("carol@x.com").unwrap(), 0);
    }
}
