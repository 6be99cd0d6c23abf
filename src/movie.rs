// Copyright 2025 Cowboy AI, LLC.

//! Movie catalog and its backing store
//!
//! Movies have no stable identifier: a row is addressed by its position in
//! the catalog, which matches its line position in the file. The in-memory
//! list loaded by [`MovieCatalog::load_all`] is the source of truth for
//! position-indexed mutations, and every mutation rewrites the file
//! immediately so list order and file order never diverge.

use crate::errors::{DomainError, DomainResult};
use crate::record::{split_fields, FlatRecord};
use crate::store::FlatFileStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Title shown to users
    pub name: String,
    /// Director credit
    pub director: String,
    /// Genre classification, free text
    pub genre: String,
    /// Audio language
    pub language: String,
    /// Running time, free text such as "120 min"
    pub duration: String,
    /// Audience rating classification, free text
    pub rating: String,
    /// Path of the copied poster, empty when no poster was supplied
    pub image_path: String,
}

impl FlatRecord for Movie {
    const DELIMITER: char = ',';
    const KIND: &'static str = "movie";

    fn encode(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.name,
            self.director,
            self.genre,
            self.language,
            self.duration,
            self.rating,
            self.image_path
        )
    }

    /// Six required fields; the seventh (poster path) is optional
    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line, Self::DELIMITER);
        if fields.len() < 6 {
            return None;
        }
        Some(Movie {
            name: fields[0].to_string(),
            director: fields[1].to_string(),
            genre: fields[2].to_string(),
            language: fields[3].to_string(),
            duration: fields[4].to_string(),
            rating: fields[5].to_string(),
            image_path: fields.get(6).unwrap_or(&"").to_string(),
        })
    }
}

/// Input for adding or updating a catalog entry
///
/// Genre, language, and rating arrive from fixed selection lists and are
/// `None` until the caller has picked one; validation rejects a missing pick.
#[derive(Debug, Clone, Default)]
pub struct MovieDraft {
    /// Title, required
    pub name: String,
    /// Director credit, required
    pub director: String,
    /// Genre pick, required
    pub genre: Option<String>,
    /// Language pick, required
    pub language: Option<String>,
    /// Running time, required
    pub duration: String,
    /// Rating pick, required
    pub rating: Option<String>,
    /// Poster file to copy in, if one was chosen
    pub poster_source: Option<PathBuf>,
}

impl MovieDraft {
    /// All-or-nothing field validation; the first failing field aborts
    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("movie name is required"));
        }
        if self.director.trim().is_empty() {
            return Err(DomainError::validation("director is required"));
        }
        if self.genre.is_none() {
            return Err(DomainError::validation("genre is required"));
        }
        if self.language.is_none() {
            return Err(DomainError::validation("language is required"));
        }
        if self.duration.trim().is_empty() {
            return Err(DomainError::validation("duration is required"));
        }
        if self.rating.is_none() {
            return Err(DomainError::validation("rating is required"));
        }
        Ok(())
    }
}

/// Catalog store with position-indexed mutations
#[derive(Debug)]
pub struct MovieCatalog {
    store: FlatFileStore<Movie>,
    poster_dir: PathBuf,
    movies: Vec<Movie>,
}

impl MovieCatalog {
    /// Create a catalog over the movie file, with a poster directory
    pub fn new(path: impl Into<PathBuf>, poster_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: FlatFileStore::new(path),
            poster_dir: poster_dir.into(),
            movies: Vec::new(),
        }
    }

    /// Scan the file into the in-memory list and return a view of it
    ///
    /// The loaded list is the single source of truth for the position-indexed
    /// mutations until the next `load_all`.
    pub fn load_all(&mut self) -> DomainResult<&[Movie]> {
        self.movies = self.store.scan_all()?;
        Ok(&self.movies)
    }

    /// Current in-memory list
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Number of entries in the in-memory list
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Whether the in-memory list is empty
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Validate and append a new entry, persisting immediately
    pub fn add(&mut self, draft: MovieDraft) -> DomainResult<()> {
        draft.validate()?;
        let movie = self.build(draft, String::new());
        self.movies.push(movie);
        self.persist()
    }

    /// Validate and overwrite the entry at `index`, persisting immediately
    ///
    /// All fields are replaced. When the draft carries no new poster the
    /// existing poster path is kept.
    pub fn update_at(&mut self, index: usize, draft: MovieDraft) -> DomainResult<()> {
        draft.validate()?;
        if index >= self.movies.len() {
            return Err(DomainError::NotFound(format!("movie at row {index}")));
        }
        let existing_path = self.movies[index].image_path.clone();
        self.movies[index] = self.build(draft, existing_path);
        self.persist()
    }

    /// Remove the entry at `index`, persisting immediately
    pub fn remove_at(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.movies.len() {
            return Err(DomainError::NotFound(format!("movie at row {index}")));
        }
        self.movies.remove(index);
        self.persist()
    }

    fn build(&self, draft: MovieDraft, existing_image_path: String) -> Movie {
        let image_path = match &draft.poster_source {
            Some(source) => self.copy_poster(source),
            None => existing_image_path,
        };
        Movie {
            name: draft.name.trim().to_string(),
            director: draft.director.trim().to_string(),
            genre: draft.genre.unwrap_or_default(),
            language: draft.language.unwrap_or_default(),
            duration: draft.duration.trim().to_string(),
            rating: draft.rating.unwrap_or_default(),
            image_path,
        }
    }

    /// Copy a poster into the poster directory under its original filename
    ///
    /// A name collision overwrites the previous poster. Failure degrades to
    /// an empty path and never aborts the movie save.
    fn copy_poster(&self, source: &Path) -> String {
        let Some(file_name) = source.file_name() else {
            warn!(source = %source.display(), "poster source has no filename");
            return String::new();
        };
        let dest = self.poster_dir.join(file_name);

        let copied = fs::create_dir_all(&self.poster_dir)
            .and_then(|_| fs::copy(source, &dest));
        match copied {
            Ok(_) => dest.display().to_string(),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "poster copy failed");
                String::new()
            }
        }
    }

    /// Rewrite the file from the in-memory list
    ///
    /// Every mutation already persists, so calling this is only needed to
    /// force a rewrite of rows loaded from an older file, which upgrades
    /// them to the newest schema.
    pub fn persist(&self) -> DomainResult<()> {
        self.store.rewrite_all(&self.movies)
    }
}
