//! Pure state transitions
//!
//! Every operation takes the current `Model` by value and returns the next
//! one. Unknown ids are ignored, so no transition can fail.

use tracing::info;

use crate::i18n::{Language, Text};
use crate::import::ExerciseCandidate;
use crate::model::{
    AppState, EvolutionPhoto, Exercise, ExercisePatch, MAX_WORKOUTS, TrainingGoal, Workout,
    letter_for,
};

/// Persisted document plus the workout currently on screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub state: AppState,
    pub viewed: Option<String>,
}

impl Model {
    pub fn new(state: AppState) -> Self {
        Self { state, viewed: None }
    }

    pub fn viewed_workout(&self) -> Option<&Workout> {
        self.viewed.as_deref().and_then(|id| self.state.workout(id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddWorkout,
    DeleteWorkout { workout_id: String },
    AddExercise { workout_id: String },
    UpdateExercise { workout_id: String, exercise_id: String, patch: ExercisePatch },
    DeleteExercise { workout_id: String, exercise_id: String },
    UpdateWorkoutObservation { workout_id: String, text: String },
    ImportExercises { workout_id: Option<String>, candidates: Vec<ExerciseCandidate> },
    AddEvolutionPhoto(EvolutionPhoto),
    RemoveEvolutionPhoto { photo_id: String },
    SetGoal(TrainingGoal),
    SetStartDate(String),
    SetEndDate(String),
    SetLanguage(Language),
    ViewWorkout(Option<String>),
}

pub fn reduce(model: Model, action: Action) -> Model {
    match action {
        Action::AddWorkout => add_workout(model),
        Action::DeleteWorkout { workout_id } => delete_workout(model, &workout_id),
        Action::AddExercise { workout_id } => add_exercise(model, &workout_id),
        Action::UpdateExercise { workout_id, exercise_id, patch } => {
            update_exercise(model, &workout_id, &exercise_id, &patch)
        }
        Action::DeleteExercise { workout_id, exercise_id } => {
            delete_exercise(model, &workout_id, &exercise_id)
        }
        Action::UpdateWorkoutObservation { workout_id, text } => {
            update_workout_observation(model, &workout_id, text)
        }
        Action::ImportExercises { workout_id, candidates } => {
            import_exercises(model, workout_id.as_deref(), candidates)
        }
        Action::AddEvolutionPhoto(photo) => add_evolution_photo(model, photo),
        Action::RemoveEvolutionPhoto { photo_id } => remove_evolution_photo(model, &photo_id),
        Action::SetGoal(goal) => {
            let mut model = model;
            model.state.goal = goal;
            model
        }
        Action::SetStartDate(date) => {
            let mut model = model;
            model.state.start_date = date;
            model
        }
        Action::SetEndDate(date) => {
            let mut model = model;
            model.state.end_date = date;
            model
        }
        Action::SetLanguage(language) => {
            let mut model = model;
            model.state.language = language;
            model
        }
        Action::ViewWorkout(id) => view_workout(model, id),
    }
}

fn with_workout(mut model: Model, workout_id: &str, f: impl FnOnce(&mut Workout)) -> Model {
    if let Some(w) = model.state.workouts.iter_mut().find(|w| w.id == workout_id) {
        f(w);
    }
    model
}

fn relabel(workouts: &mut [Workout]) {
    for (i, w) in workouts.iter_mut().enumerate() {
        w.letter = letter_for(i);
    }
}

/// Append an empty workout and show it; no-op once ten exist
pub fn add_workout(mut model: Model) -> Model {
    let count = model.state.workouts.len();
    if count >= MAX_WORKOUTS {
        return model;
    }
    let workout = Workout::new(letter_for(count));
    info!("Added workout {}", workout.letter);
    model.viewed = Some(workout.id.clone());
    model.state.workouts.push(workout);
    model
}

/// Remove a workout and relabel the rest A, B, C... by position
pub fn delete_workout(mut model: Model, workout_id: &str) -> Model {
    let before = model.state.workouts.len();
    model.state.workouts.retain(|w| w.id != workout_id);
    if model.state.workouts.len() == before {
        return model;
    }
    relabel(&mut model.state.workouts);
    if model.viewed.as_deref() == Some(workout_id) {
        model.viewed = None;
    }
    info!("Deleted workout {}, {} left", workout_id, model.state.workouts.len());
    model
}

pub fn add_exercise(model: Model, workout_id: &str) -> Model {
    let name = model.state.language.t(Text::NewExercise);
    with_workout(model, workout_id, |w| w.exercises.push(Exercise::new(name)))
}

pub fn update_exercise(
    model: Model,
    workout_id: &str,
    exercise_id: &str,
    patch: &ExercisePatch,
) -> Model {
    with_workout(model, workout_id, |w| {
        if let Some(e) = w.exercises.iter_mut().find(|e| e.id == exercise_id) {
            e.apply(patch);
        }
    })
}

pub fn delete_exercise(model: Model, workout_id: &str, exercise_id: &str) -> Model {
    with_workout(model, workout_id, |w| w.exercises.retain(|e| e.id != exercise_id))
}

pub fn update_workout_observation(model: Model, workout_id: &str, text: String) -> Model {
    with_workout(model, workout_id, |w| w.general_observation = text)
}

/// Turn candidates into exercises and append them.
///
/// Without a target a new workout is created (its letter wraps after J)
/// and becomes the viewed one. An empty candidate list changes nothing.
pub fn import_exercises(
    mut model: Model,
    workout_id: Option<&str>,
    candidates: Vec<ExerciseCandidate>,
) -> Model {
    if candidates.is_empty() {
        return model;
    }
    let language = model.state.language;
    let exercises: Vec<Exercise> = candidates
        .into_iter()
        .map(|c| c.into_exercise(language))
        .collect();
    info!("Importing {} exercises", exercises.len());

    match workout_id {
        Some(id) => with_workout(model, id, |w| w.exercises.extend(exercises)),
        None => {
            let mut workout = Workout::new(letter_for(model.state.workouts.len()));
            workout.exercises = exercises;
            model.viewed = Some(workout.id.clone());
            model.state.workouts.push(workout);
            model
        }
    }
}

/// Newest photo first
pub fn add_evolution_photo(mut model: Model, photo: EvolutionPhoto) -> Model {
    model.state.evolution_gallery.insert(0, photo);
    model
}

pub fn remove_evolution_photo(mut model: Model, photo_id: &str) -> Model {
    model.state.evolution_gallery.retain(|p| p.id != photo_id);
    model
}

/// Switch the viewed workout; ids that do not exist clear the view
pub fn view_workout(mut model: Model, workout_id: Option<String>) -> Model {
    model.viewed = workout_id.filter(|id| model.state.workout(id).is_some());
    model
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(model: &Model) -> String {
        model.state.workouts.iter().map(|w| w.letter).collect()
    }

    fn model_with_workouts(n: usize) -> Model {
        (0..n).fold(Model::default(), |m, _| add_workout(m))
    }

    fn squat() -> ExerciseCandidate {
        ExerciseCandidate {
            name: Some("Squat".into()),
            sets: Some(4.0),
            reps: Some("8".into()),
            rest_time: Some(90.0),
            observation: Some("heavy".into()),
        }
    }

    #[test]
    fn test_add_workout_assigns_letters_and_views() {
        let model = model_with_workouts(3);
        assert_eq!(letters(&model), "ABC");
        assert_eq!(model.viewed.as_deref(), Some(model.state.workouts[2].id.as_str()));
        let w = &model.state.workouts[0];
        assert!(w.exercises.is_empty());
        assert_eq!(w.general_observation, "");
    }

    #[test]
    fn test_add_workout_caps_at_ten() {
        let model = model_with_workouts(10);
        assert_eq!(letters(&model), "ABCDEFGHIJ");
        let viewed = model.viewed.clone();

        let model = add_workout(model);
        assert_eq!(model.state.workouts.len(), 10);
        assert_eq!(model.viewed, viewed);
    }

    #[test]
    fn test_delete_relabels_contiguously() {
        let model = model_with_workouts(5);
        let b = model.state.workouts[1].id.clone();
        let d = model.state.workouts[3].id.clone();
        let e = model.state.workouts[4].id.clone();

        let model = delete_workout(model, &b);
        assert_eq!(letters(&model), "ABCD");
        let model = delete_workout(model, &d);
        assert_eq!(letters(&model), "ABC");
        // old E keeps its id and becomes C
        assert_eq!(model.state.workouts[2].id, e);
        assert_eq!(model.state.workouts[2].letter, 'C');
    }

    #[test]
    fn test_letters_stay_contiguous_over_mixed_sequence() {
        let mut model = Model::default();
        for step in 0..40 {
            if step % 3 == 2 && !model.state.workouts.is_empty() {
                let idx = step % model.state.workouts.len();
                let id = model.state.workouts[idx].id.clone();
                model = delete_workout(model, &id);
            } else {
                model = add_workout(model);
            }
            let expected: String = "ABCDEFGHIJ".chars().take(model.state.workouts.len()).collect();
            assert_eq!(letters(&model), expected);
            assert!(model.state.workouts.len() <= MAX_WORKOUTS);
        }
    }

    #[test]
    fn test_delete_viewed_clears_view() {
        let model = model_with_workouts(2);
        let a = model.state.workouts[0].id.clone();
        let b = model.state.workouts[1].id.clone();
        assert_eq!(model.viewed.as_deref(), Some(b.as_str()));

        let model = delete_workout(model, &a);
        assert_eq!(model.viewed.as_deref(), Some(b.as_str()));

        let model = delete_workout(model, &b);
        assert_eq!(model.viewed, None);
    }

    #[test]
    fn test_delete_unknown_workout_is_noop() {
        let model = model_with_workouts(2);
        let next = delete_workout(model.clone(), "missing");
        assert_eq!(next, model);
    }

    #[test]
    fn test_add_exercise_defaults() {
        let model = model_with_workouts(1);
        let id = model.state.workouts[0].id.clone();
        let model = add_exercise(model, &id);
        let ex = &model.state.workouts[0].exercises[0];
        assert_eq!(ex.name, "Novo Exercício");
        assert_eq!((ex.sets, ex.reps.as_str(), ex.rest_time), (3, "12", 60));
        assert_eq!(ex.completed_sets, 0);
        assert!(!ex.is_completed);

        let unchanged = add_exercise(model.clone(), "missing");
        assert_eq!(unchanged, model);
    }

    #[test]
    fn test_update_and_delete_exercise() {
        let model = model_with_workouts(1);
        let wid = model.state.workouts[0].id.clone();
        let model = add_exercise(add_exercise(model, &wid), &wid);
        let first = model.state.workouts[0].exercises[0].id.clone();
        let second = model.state.workouts[0].exercises[1].id.clone();

        let patch = ExercisePatch {
            weight: Some("20kg".into()),
            completed_sets: Some(3),
            ..Default::default()
        };
        let model = update_exercise(model, &wid, &first, &patch);
        let ex = &model.state.workouts[0].exercises[0];
        assert_eq!(ex.weight, "20kg");
        assert_eq!(ex.name, "Novo Exercício");
        assert!(ex.is_completed);

        let same = update_exercise(model.clone(), &wid, "missing", &patch);
        assert_eq!(same, model);

        let model = delete_exercise(model, &wid, &first);
        assert_eq!(model.state.workouts[0].exercises.len(), 1);
        assert_eq!(model.state.workouts[0].exercises[0].id, second);
    }

    #[test]
    fn test_update_workout_observation() {
        let model = model_with_workouts(1);
        let wid = model.state.workouts[0].id.clone();
        let model = update_workout_observation(model, &wid, "foco em costas".into());
        assert_eq!(model.state.workouts[0].general_observation, "foco em costas");
    }

    #[test]
    fn test_import_empty_is_noop() {
        let model = model_with_workouts(2);
        let next = import_exercises(model.clone(), None, vec![]);
        assert_eq!(next, model);
    }

    #[test]
    fn test_import_into_new_workout() {
        let model = import_exercises(Model::default(), None, vec![squat()]);
        assert_eq!(model.state.workouts.len(), 1);
        let w = &model.state.workouts[0];
        assert_eq!(w.letter, 'A');
        assert_eq!(model.viewed.as_deref(), Some(w.id.as_str()));
        assert_eq!(w.exercises.len(), 1);
        let ex = &w.exercises[0];
        assert_eq!(ex.name, "Squat");
        assert_eq!(ex.sets, 4);
        assert_eq!(ex.reps, "8");
        assert_eq!(ex.rest_time, 90);
        assert_eq!(ex.observation, "heavy");
        assert_eq!(ex.completed_sets, 0);
        assert!(!ex.is_completed);
        assert_eq!(ex.weight, "");
    }

    #[test]
    fn test_import_into_existing_workout() {
        let model = model_with_workouts(2);
        let a = model.state.workouts[0].id.clone();
        let viewed = model.viewed.clone();
        let model = add_exercise(model, &a);

        let model = import_exercises(model, Some(&a), vec![squat(), ExerciseCandidate::default()]);
        assert_eq!(model.state.workouts.len(), 2);
        assert_eq!(model.state.workouts[0].exercises.len(), 3);
        assert_eq!(model.state.workouts[0].exercises[2].name, "Exercício");
        assert_eq!(model.viewed, viewed);
    }

    #[test]
    fn test_import_new_workout_letter_wraps() {
        let model = model_with_workouts(10);
        let model = import_exercises(model, None, vec![squat()]);
        assert_eq!(model.state.workouts.len(), 11);
        assert_eq!(model.state.workouts[10].letter, 'A');
    }

    #[test]
    fn test_gallery_newest_first() {
        let photo = |id: &str| EvolutionPhoto {
            id: id.into(),
            date: "01/02/2026".into(),
            data_url: "data:image/png;base64,AA==".into(),
        };
        let model = add_evolution_photo(Model::default(), photo("old"));
        let model = add_evolution_photo(model, photo("new"));
        let ids: Vec<_> = model.state.evolution_gallery.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);

        let model = remove_evolution_photo(model, "old");
        let model = remove_evolution_photo(model, "missing");
        assert_eq!(model.state.evolution_gallery.len(), 1);
        assert_eq!(model.state.evolution_gallery[0].id, "new");
    }

    #[test]
    fn test_settings_actions() {
        let model = reduce(Model::default(), Action::SetGoal(TrainingGoal::Resistance));
        let model = reduce(model, Action::SetLanguage(Language::Es));
        let model = reduce(model, Action::SetStartDate("2026-01-05".into()));
        let model = reduce(model, Action::SetEndDate("2026-02-05".into()));
        assert_eq!(model.state.goal, TrainingGoal::Resistance);
        assert_eq!(model.state.language, Language::Es);
        assert_eq!(model.state.start_date, "2026-01-05");
        assert_eq!(model.state.end_date, "2026-02-05");

        let model = add_exercise(add_workout(model), "missing");
        let wid = model.state.workouts[0].id.clone();
        let model = add_exercise(model, &wid);
        assert_eq!(model.state.workouts[0].exercises[0].name, "Nuevo Ejercicio");
    }

    #[test]
    fn test_view_workout_ignores_unknown_ids() {
        let model = model_with_workouts(2);
        let a = model.state.workouts[0].id.clone();
        let model = reduce(model, Action::ViewWorkout(Some(a.clone())));
        assert_eq!(model.viewed.as_deref(), Some(a.as_str()));
        let model = reduce(model, Action::ViewWorkout(Some("missing".into())));
        assert_eq!(model.viewed, None);
    }
}
