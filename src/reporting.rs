// Copyright 2025 Cowboy AI, LLC.

//! Read-only aggregation over store snapshots
//!
//! Pure functions feeding dashboard counters and table views. Callers pass
//! in snapshots they scanned themselves; nothing here touches a file, so the
//! same snapshot can be summarized, searched, and sorted without re-reading.

use crate::movie::Movie;
use crate::ticket::Ticket;
use crate::user::{User, UserStatus};
use serde::{Deserialize, Serialize};

/// Top-level dashboard counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Number of registered accounts
    pub total_users: usize,
    /// Number of catalog entries
    pub total_movies: usize,
    /// Number of bookings in the ledger
    pub total_bookings: usize,
    /// Sum of every parseable booking price
    pub total_revenue: i64,
}

/// Build the dashboard counters from store snapshots
pub fn summarize(users: &[User], movies: &[Movie], tickets: &[Ticket]) -> DashboardSummary {
    DashboardSummary {
        total_users: users.len(),
        total_movies: movies.len(),
        total_bookings: tickets.len(),
        total_revenue: tickets
            .iter()
            .filter_map(|t| t.price.trim().parse::<i64>().ok())
            .sum(),
    }
}

/// One row of the per-user activity table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivityRow {
    /// Account display name
    pub username: String,
    /// Account email
    pub email: String,
    /// Account standing
    pub status: UserStatus,
    /// Number of bookings made under this account
    pub bookings: u64,
    /// Total spend across those bookings, unparseable prices skipped
    pub total_spent: i64,
    /// Movie name of the newest booking, if any
    pub most_recent_movie: Option<String>,
}

/// Build a per-user activity row for every account, in snapshot order
///
/// A ticket belongs to an account when its stored identifier matches the
/// account's username or email case-insensitively, the same rule the ledger
/// uses for per-user queries.
pub fn user_activity(users: &[User], tickets: &[Ticket]) -> Vec<UserActivityRow> {
    users
        .iter()
        .map(|user| {
            let mine: Vec<&Ticket> = tickets
                .iter()
                .filter(|t| user.matches_identifier(&t.user_identifier))
                .collect();
            UserActivityRow {
                username: user.username.clone(),
                email: user.email.clone(),
                status: user.status,
                bookings: mine.len() as u64,
                total_spent: mine
                    .iter()
                    .filter_map(|t| t.price.trim().parse::<i64>().ok())
                    .sum(),
                most_recent_movie: mine.last().map(|t| t.movie_name.clone()),
            }
        })
        .collect()
}

/// Accounts whose username or email contains the term, case-insensitively
pub fn search_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let needle = term.to_ascii_lowercase();
    users
        .iter()
        .filter(|u| {
            u.username.to_ascii_lowercase().contains(&needle)
                || u.email.to_ascii_lowercase().contains(&needle)
        })
        .collect()
}

/// Catalog entries whose name, director, or genre contains the term
pub fn search_movies<'a>(movies: &'a [Movie], term: &str) -> Vec<&'a Movie> {
    let needle = term.to_ascii_lowercase();
    movies
        .iter()
        .filter(|m| {
            m.name.to_ascii_lowercase().contains(&needle)
                || m.director.to_ascii_lowercase().contains(&needle)
                || m.genre.to_ascii_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort of a catalog snapshot by title
pub fn sort_movies_by_name(movies: &mut [Movie]) {
    movies.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));
}

/// Stable sort of an account snapshot by registration date, oldest first
pub fn sort_users_by_registration(users: &mut [User]) {
    users.sort_by_key(|u| u.registration_date);
}
