//! Wire shape handed to the submission sink.

use crate::fields::MovieFields;
use crate::roster::RosterState;
use crate::schedule::ScheduleState;
use crate::types::CalendarDate;
use serde::{Deserialize, Serialize};

/// One show date in the payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowDatePayload {
    /// Calendar day, serialized as `YYYY-MM-DD`
    pub date: CalendarDate,
    /// Show times on that day, in insertion order
    pub times: Vec<String>,
}

/// A movie ready for the catalog backend
///
/// `showtime` repeats the times of every `showdate` entry in the same order;
/// `reviews` always starts empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePayload {
    /// Movie title
    pub name: String,
    /// Poster URL
    pub url: String,
    /// Category
    pub category: String,
    /// Genre
    pub genre: String,
    /// Cast, in roster order
    pub cast: Vec<String>,
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
    /// Show dates with their times
    pub showdate: Vec<ShowDatePayload>,
    /// Times of each show date, parallel to `showdate`
    pub showtime: Vec<Vec<String>>,
    /// Reviews
    pub reviews: Vec<String>,
}

impl MoviePayload {
    /// Builds the payload from already-validated editor state
    #[must_use]
    pub fn assemble(fields: &MovieFields, roster: &RosterState, schedule: &ScheduleState) -> Self {
        let showdate: Vec<ShowDatePayload> = schedule
            .groups
            .iter()
            .map(|group| ShowDatePayload {
                date: group.date,
                times: group.times.clone(),
            })
            .collect();
        let showtime = showdate.iter().map(|show| show.times.clone()).collect();

        Self {
            name: fields.name.trim().to_string(),
            url: fields.url.trim().to_string(),
            category: fields.category.trim().to_string(),
            genre: fields.genre.trim().to_string(),
            cast: roster.entries.clone(),
            director: fields.director.trim().to_string(),
            producer: fields.producer.trim().to_string(),
            synopsis: fields.synopsis.trim().to_string(),
            trailer_url: fields.trailer_url.trim().to_string(),
            imdb: fields.imdb,
            mpaa: fields.mpaa.trim().to_string(),
            showdate,
            showtime,
            reviews: Vec::new(),
        }
    }

    /// Number of individual shows across all dates
    #[must_use]
    pub fn show_count(&self) -> usize {
        self.showtime.iter().map(Vec::len).sum()
    }
}
