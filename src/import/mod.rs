//! Import module - turning free text into exercises
//!
//! The text interpretation itself is delegated to an external service;
//! this module only defines the candidate records it returns and the
//! bookkeeping around a pending request.

pub mod gemini;

pub use gemini::GeminiParser;

use serde::{Deserialize, Serialize};

use crate::i18n::{Language, Text};
use crate::model::{DEFAULT_REPS, DEFAULT_REST_SECS, DEFAULT_SETS, Exercise, new_id};

/// Exercise as proposed by the import service. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseCandidate {
    pub name: Option<String>,
    pub sets: Option<f64>,
    pub reps: Option<String>,
    pub rest_time: Option<f64>,
    pub observation: Option<String>,
}

impl ExerciseCandidate {
    /// Build an exercise, filling empty or zero fields with defaults.
    ///
    /// Weight and progress always start blank, whatever the candidate says.
    pub fn into_exercise(self, language: Language) -> Exercise {
        Exercise {
            id: new_id(),
            name: non_empty(self.name).unwrap_or_else(|| language.t(Text::Exercise).to_string()),
            sets: positive(self.sets).unwrap_or(DEFAULT_SETS),
            reps: non_empty(self.reps).unwrap_or_else(|| DEFAULT_REPS.to_string()),
            weight: String::new(),
            observation: self.observation.unwrap_or_default(),
            is_completed: false,
            completed_sets: 0,
            rest_time: positive(self.rest_time).unwrap_or(DEFAULT_REST_SECS),
            photo: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn positive(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.round().min(u32::MAX as f64) as u32)
}

/// Text → exercise candidates.
///
/// Implementations never fail: any problem is logged and reported as an
/// empty list.
pub trait ExerciseParser {
    fn parse(&self, text: &str) -> impl Future<Output = Vec<ExerciseCandidate>> + Send;
}

/// Where the imported exercises go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Append to an existing workout
    Workout(String),
    /// Create a new workout holding only the imported exercises
    NewWorkout,
}

impl ImportTarget {
    pub fn workout_id(&self) -> Option<String> {
        match self {
            ImportTarget::Workout(id) => Some(id.clone()),
            ImportTarget::NewWorkout => None,
        }
    }
}

/// Ticket identifying one submitted import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket(u64);

/// Tracks the import dialog and its single in-flight request.
///
/// Requests cannot be cancelled, so a result is only accepted when the
/// dialog that submitted it is still open.
#[derive(Debug, Default)]
pub struct ImportTracker {
    generation: u64,
    open: Option<ImportTarget>,
    pending: Option<ImportTicket>,
}

impl ImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog for a target, replacing any previous dialog
    pub fn open(&mut self, target: ImportTarget) {
        self.generation += 1;
        self.open = Some(target);
        self.pending = None;
    }

    /// Close the dialog; an outstanding result will be discarded
    pub fn close(&mut self) {
        self.generation += 1;
        self.open = None;
        self.pending = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn target(&self) -> Option<&ImportTarget> {
        self.open.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.pending.is_some()
    }

    /// Mark the dialog as processing. Returns `None` for blank text, when
    /// no dialog is open, or while a request is already pending.
    pub fn submit(&mut self, text: &str) -> Option<ImportTicket> {
        if text.trim().is_empty() || self.open.is_none() || self.pending.is_some() {
            return None;
        }
        let ticket = ImportTicket(self.generation);
        self.pending = Some(ticket);
        Some(ticket)
    }

    /// Accept a finished request. Returns the target to import into and
    /// closes the dialog, or `None` if the result is stale.
    pub fn complete(&mut self, ticket: ImportTicket) -> Option<ImportTarget> {
        if self.pending != Some(ticket) {
            return None;
        }
        let target = self.open.take();
        self.pending = None;
        self.generation += 1;
        target
    }
}
