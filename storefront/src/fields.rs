//! Scalar fields of the movie entry form and their validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Lowest accepted IMDb rating
pub const IMDB_MIN: f64 = 0.0;

/// Highest accepted IMDb rating
pub const IMDB_MAX: f64 = 10.0;

/// Text fields of the movie form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovieField {
    /// Movie title
    Name,
    /// Poster image URL
    PosterUrl,
    /// Category (e.g. "Now Playing")
    Category,
    /// Genre
    Genre,
    /// Director
    Director,
    /// Producer
    Producer,
    /// Synopsis
    Synopsis,
    /// Trailer URL
    TrailerUrl,
    /// IMDb rating
    Imdb,
    /// MPAA rating
    Mpaa,
}

impl MovieField {
    /// Every text field, in form order. [`MovieField::Imdb`] is numeric and not listed.
    pub const TEXT: [Self; 9] = [
        Self::Name,
        Self::PosterUrl,
        Self::Category,
        Self::Genre,
        Self::Director,
        Self::Producer,
        Self::Synopsis,
        Self::TrailerUrl,
        Self::Mpaa,
    ];

    /// Human label used in "is required" messages
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Name => "Movie name",
            Self::PosterUrl => "Poster URL",
            Self::Category => "Category",
            Self::Genre => "Genre",
            Self::Director => "Director",
            Self::Producer => "Producer",
            Self::Synopsis => "Synopsis",
            Self::TrailerUrl => "Trailer URL",
            Self::Imdb => "IMDb",
            Self::Mpaa => "MPAA rating",
        }
    }

    /// Whether the field must hold a well-formed URL
    #[must_use]
    pub const fn is_url(&self) -> bool {
        matches!(self, Self::PosterUrl | Self::TrailerUrl)
    }
}

impl std::fmt::Display for MovieField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failure for a single field
#[derive(Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldError {
    /// Text field empty after trimming
    #[error("{0} is required")]
    Required(MovieField),

    /// URL field that does not parse
    #[error("Invalid URL")]
    InvalidUrl,

    /// Rating below [`IMDB_MIN`]
    #[error("IMDb must be at least 0")]
    RatingTooLow,

    /// Rating above [`IMDB_MAX`], or not a finite number
    #[error("IMDb must be at most 10")]
    RatingTooHigh,
}

/// Per-field validation errors, keyed and ordered by field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<MovieField, FieldError>);

impl FieldErrors {
    /// No errors
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Whether every field passed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The error reported for `field`, if any
    #[must_use]
    pub fn get(&self, field: MovieField) -> Option<&FieldError> {
        self.0.get(&field)
    }

    /// Fields with an error, in form order
    pub fn iter(&self) -> impl Iterator<Item = (&MovieField, &FieldError)> {
        self.0.iter()
    }

    fn insert(&mut self, field: MovieField, error: FieldError) {
        self.0.insert(field, error);
    }

    /// Drops the error of a field that has just been edited
    pub fn clear(&mut self, field: MovieField) {
        self.0.remove(&field);
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, error) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {error}")?;
        }
        Ok(())
    }
}

/// Values typed into the scalar fields of the movie form
///
/// Text is stored verbatim; trimming happens at validation and payload time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieFields {
    /// Movie title
    pub name: String,
    /// Poster URL
    pub url: String,
    /// Category
    pub category: String,
    /// Genre
    pub genre: String,
    /// Director
    pub director: String,
    /// Producer
    pub producer: String,
    /// Synopsis
    pub synopsis: String,
    /// Trailer URL
    pub trailer_url: String,
    /// IMDb rating
    pub imdb: f64,
    /// MPAA rating
    pub mpaa: String,
}

impl Default for MovieFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            category: String::new(),
            genre: String::new(),
            director: String::new(),
            producer: String::new(),
            synopsis: String::new(),
            trailer_url: String::new(),
            imdb: 0.0,
            mpaa: String::new(),
        }
    }
}

impl MovieFields {
    fn slot(&mut self, field: MovieField) -> Option<&mut String> {
        match field {
            MovieField::Name => Some(&mut self.name),
            MovieField::PosterUrl => Some(&mut self.url),
            MovieField::Category => Some(&mut self.category),
            MovieField::Genre => Some(&mut self.genre),
            MovieField::Director => Some(&mut self.director),
            MovieField::Producer => Some(&mut self.producer),
            MovieField::Synopsis => Some(&mut self.synopsis),
            MovieField::TrailerUrl => Some(&mut self.trailer_url),
            MovieField::Mpaa => Some(&mut self.mpaa),
            MovieField::Imdb => None,
        }
    }

    /// Current text of a text field; `None` for [`MovieField::Imdb`]
    #[must_use]
    pub fn text(&self, field: MovieField) -> Option<&str> {
        let value = match field {
            MovieField::Name => &self.name,
            MovieField::PosterUrl => &self.url,
            MovieField::Category => &self.category,
            MovieField::Genre => &self.genre,
            MovieField::Director => &self.director,
            MovieField::Producer => &self.producer,
            MovieField::Synopsis => &self.synopsis,
            MovieField::TrailerUrl => &self.trailer_url,
            MovieField::Mpaa => &self.mpaa,
            MovieField::Imdb => return None,
        };
        Some(value)
    }

    /// Replaces a text field verbatim
    ///
    /// Returns `false` when `field` is not a text field.
    pub fn set_text(&mut self, field: MovieField, value: String) -> bool {
        match self.slot(field) {
            Some(slot) => {
                *slot = value;
                true
            },
            None => false,
        }
    }

    /// Checks every field, collecting all failures at once
    ///
    /// # Errors
    ///
    /// Returns the failing fields with one error each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for field in MovieField::TEXT {
            let value = self.text(field).unwrap_or_default().trim();
            if value.is_empty() {
                errors.insert(field, FieldError::Required(field));
            } else if field.is_url() && url::Url::parse(value).is_err() {
                errors.insert(field, FieldError::InvalidUrl);
            }
        }

        if let Err(error) = validate_rating(self.imdb) {
            errors.insert(MovieField::Imdb, error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Checks an IMDb rating against the closed range `[0, 10]`
///
/// # Errors
///
/// Returns [`FieldError::RatingTooLow`] or [`FieldError::RatingTooHigh`].
pub fn validate_rating(rating: f64) -> Result<(), FieldError> {
    if !rating.is_finite() {
        return Err(FieldError::RatingTooHigh);
    }
    if rating < IMDB_MIN {
        return Err(FieldError::RatingTooLow);
    }
    if rating > IMDB_MAX {
        return Err(FieldError::RatingTooHigh);
    }
    Ok(())
}
