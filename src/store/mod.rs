//! Store module - owns the state and persists every change

pub mod reducer;
pub mod sets;

pub use reducer::{Action, Model, reduce};
pub use sets::{SetToggle, toggle_set};

use anyhow::Result;
use tracing::debug;

use crate::model::{AppState, Workout};
use crate::storage::{Storage, load_state, save_state};

/// Single owner of the application state.
///
/// Transitions are the pure functions in [`reducer`]; the store runs them
/// and writes the document back whenever it changed.
pub struct Store<S: Storage> {
    model: Model,
    storage: S,
    key: String,
    saved: AppState,
}

impl<S: Storage> Store<S> {
    /// Load the document under `key` (or start fresh)
    pub fn open(storage: S, key: &str) -> Result<Self> {
        let state = load_state(&storage, key)?;
        let saved = state.clone();
        Ok(Self {
            model: Model::new(state),
            storage,
            key: key.to_string(),
            saved,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.model.state
    }

    pub fn viewed(&self) -> Option<&Workout> {
        self.model.viewed_workout()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        debug!("Dispatch {:?}", action);
        let model = std::mem::take(&mut self.model);
        self.model = reduce(model, action);
        self.persist()
    }

    /// Click a set marker and store the new progress.
    ///
    /// Returns what happened so the caller can arm the rest timer; `None`
    /// when the workout, exercise or marker does not exist.
    pub fn toggle_set(
        &mut self,
        workout_id: &str,
        exercise_id: &str,
        index: u32,
    ) -> Result<Option<SetToggle>> {
        let toggle = self
            .model
            .state
            .workout(workout_id)
            .and_then(|w| w.exercise(exercise_id))
            .and_then(|e| toggle_set(e, index));

        if let Some(t) = toggle {
            self.dispatch(Action::UpdateExercise {
                workout_id: workout_id.to_string(),
                exercise_id: exercise_id.to_string(),
                patch: t.patch(),
            })?;
        }
        Ok(toggle)
    }

    fn persist(&mut self) -> Result<()> {
        if self.model.state != self.saved {
            save_state(&self.storage, &self.key, &self.model.state)?;
            self.saved = self.model.state.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, STATE_KEY};

    fn stored(store: &Store<MemoryStorage>) -> Option<AppState> {
        store
            .storage()
            .get(STATE_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_every_change_is_persisted() {
        let mut store = Store::open(MemoryStorage::new(), STATE_KEY).unwrap();
        assert!(stored(&store).is_none());

        store.dispatch(Action::AddWorkout).unwrap();
        let wid = store.state().workouts[0].id.clone();
        store.dispatch(Action::AddExercise { workout_id: wid }).unwrap();

        let saved = stored(&store).unwrap();
        assert_eq!(&saved, store.state());
        assert_eq!(saved.workouts[0].exercises.len(), 1);
    }

    #[test]
    fn test_view_changes_are_not_persisted() {
        let mut store = Store::open(MemoryStorage::new(), STATE_KEY).unwrap();
        store.dispatch(Action::ViewWorkout(None)).unwrap();
        assert!(stored(&store).is_none());
    }

    /// Counts writes on top of an in-memory store
    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        writes: std::cell::Cell<usize>,
    }

    impl Storage for CountingStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_unchanged_document_is_not_rewritten() {
        let mut store = Store::open(CountingStorage::default(), STATE_KEY).unwrap();
        store.dispatch(Action::AddWorkout).unwrap();
        assert_eq!(store.storage().writes.get(), 1);

        let wid = store.state().workouts[0].id.clone();
        store.dispatch(Action::ViewWorkout(Some(wid))).unwrap();
        store.dispatch(Action::DeleteWorkout { workout_id: "missing".into() }).unwrap();
        store.dispatch(Action::ImportExercises { workout_id: None, candidates: Vec::new() }).unwrap();
        assert_eq!(store.storage().writes.get(), 1);

        store.dispatch(Action::SetEndDate("2026-12-20".into())).unwrap();
        assert_eq!(store.storage().writes.get(), 2);
        let raw = store.storage().get(STATE_KEY).unwrap().unwrap();
        assert!(raw.contains("2026-12-20"));
    }

    #[test]
    fn test_reopen_restores_state() {
        let mut store = Store::open(MemoryStorage::new(), STATE_KEY).unwrap();
        store.dispatch(Action::AddWorkout).unwrap();
        store.dispatch(Action::AddWorkout).unwrap();
        let raw = store.storage().get(STATE_KEY).unwrap().unwrap();

        let reopened = Store::open(MemoryStorage::with(STATE_KEY, &raw), STATE_KEY).unwrap();
        assert_eq!(reopened.state(), store.state());
        assert!(reopened.viewed().is_none());
    }

    #[test]
    fn test_toggle_set_through_store() {
        let mut store = Store::open(MemoryStorage::new(), STATE_KEY).unwrap();
        store.dispatch(Action::AddWorkout).unwrap();
        let wid = store.state().workouts[0].id.clone();
        store.dispatch(Action::AddExercise { workout_id: wid.clone() }).unwrap();
        let eid = store.state().workouts[0].exercises[0].id.clone();

        let t = store.toggle_set(&wid, &eid, 0).unwrap().unwrap();
        assert!(t.arm_rest);
        assert_eq!(stored(&store).unwrap().workouts[0].exercises[0].completed_sets, 1);

        let t = store.toggle_set(&wid, &eid, 2).unwrap().unwrap();
        assert!(t.is_completed);
        assert!(store.state().workouts[0].exercises[0].is_completed);

        assert!(store.toggle_set(&wid, "missing", 0).unwrap().is_none());
        assert!(store.toggle_set(&wid, &eid, 7).unwrap().is_none());
    }
}
