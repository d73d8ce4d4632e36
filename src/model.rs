//! Domain model - the persisted workout document

use chrono::Local;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::i18n::{Language, Text};

/// Workout letters, assigned by position
pub const LETTERS: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Maximum number of workouts `AddWorkout` will create
pub const MAX_WORKOUTS: usize = 10;

pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REPS: &str = "12";
pub const DEFAULT_REST_SECS: u32 = 60;

/// Letter for the workout at `index`, wrapping after J
pub fn letter_for(index: usize) -> char {
    LETTERS[index % LETTERS.len()]
}

/// Fresh collision-resistant identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingGoal {
    #[default]
    Bodybuilding,
    Hypertrophy,
    Resistance,
}

impl TrainingGoal {
    pub fn all() -> &'static [TrainingGoal] {
        &[
            TrainingGoal::Bodybuilding,
            TrainingGoal::Hypertrophy,
            TrainingGoal::Resistance,
        ]
    }
}

/// Root of the persisted document.
///
/// Every field carries a default so documents written by older versions
/// (for instance without `evolutionGallery`) still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub goal: TrainingGoal,
    pub start_date: String,
    pub end_date: String,
    pub workouts: Vec<Workout>,
    pub evolution_gallery: Vec<EvolutionPhoto>,
    pub language: Language,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            goal: TrainingGoal::default(),
            start_date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            end_date: String::new(),
            workouts: Vec::new(),
            evolution_gallery: Vec::new(),
            language: Language::default(),
        }
    }
}

impl AppState {
    pub fn workout(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Repair a freshly loaded document.
    ///
    /// Letters follow position, blank names and reps take the stock values
    /// and set counts obey the same bounds as an edit.
    pub fn normalize(&mut self) {
        let name = self.language.t(Text::Exercise);
        for (i, workout) in self.workouts.iter_mut().enumerate() {
            workout.letter = letter_for(i);
            for ex in &mut workout.exercises {
                if ex.name.trim().is_empty() {
                    ex.name = name.to_string();
                }
                if ex.reps.trim().is_empty() {
                    ex.reps = DEFAULT_REPS.to_string();
                }
                if ex.sets == 0 {
                    ex.sets = DEFAULT_SETS;
                }
                ex.apply(&ExercisePatch::default());
            }
        }
    }

    /// Resolve a workout by letter (case-insensitive) or by id
    pub fn find_workout(&self, reference: &str) -> Option<&Workout> {
        let mut chars = reference.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let letter = c.to_ascii_uppercase();
            if let Some(w) = self.workouts.iter().find(|w| w.letter == letter) {
                return Some(w);
            }
        }
        self.workout(reference)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Workout {
    pub id: String,
    pub letter: char,
    pub exercises: Vec<Exercise>,
    pub general_observation: String,
}

impl Default for Workout {
    fn default() -> Self {
        Self::new(letter_for(0))
    }
}

impl Workout {
    pub fn new(letter: char) -> Self {
        Self {
            id: new_id(),
            letter,
            exercises: Vec::new(),
            general_observation: String::new(),
        }
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub weight: String,
    pub observation: String,
    pub is_completed: bool,
    pub completed_sets: u32,
    pub rest_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Stock exercise with no name; [`AppState::normalize`] names it on load
impl Default for Exercise {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Exercise {
    /// New exercise with the stock targets (3 x 12, 60 s rest)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS.to_string(),
            weight: String::new(),
            observation: String::new(),
            is_completed: false,
            completed_sets: 0,
            rest_time: DEFAULT_REST_SECS,
            photo: None,
        }
    }

    /// Apply a partial update, then restore the completion invariants
    pub fn apply(&mut self, patch: &ExercisePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(sets) = patch.sets {
            // Keep at least one set.
            self.sets = sets.max(1);
        }
        if let Some(reps) = &patch.reps {
            self.reps = reps.clone();
        }
        if let Some(weight) = &patch.weight {
            self.weight = weight.clone();
        }
        if let Some(observation) = &patch.observation {
            self.observation = observation.clone();
        }
        if let Some(rest) = patch.rest_time {
            self.rest_time = rest;
        }
        if let Some(completed) = patch.completed_sets {
            self.completed_sets = completed;
        }
        if let Some(photo) = &patch.photo {
            self.photo = photo.clone();
        }
        self.completed_sets = self.completed_sets.min(self.sets);
        self.is_completed = self.completed_sets >= self.sets;
    }
}

/// Partial exercise update; `None` leaves the field untouched.
///
/// `photo: Some(None)` clears the photo. `is_completed` is derived and
/// cannot be set directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub observation: Option<String>,
    pub rest_time: Option<u32>,
    pub completed_sets: Option<u32>,
    pub photo: Option<Option<String>>,
}

/// Parse a numeric field the way the input boxes do: anything that is not
/// a leading integer becomes 0.
pub fn parse_seconds(input: &str) -> u32 {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionPhoto {
    pub id: String,
    pub date: String,
    pub data_url: String,
}
