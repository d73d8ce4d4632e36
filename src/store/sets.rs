//! Set markers on an exercise row

use crate::model::{Exercise, ExercisePatch};

/// Outcome of clicking a set marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetToggle {
    pub completed_sets: u32,
    pub is_completed: bool,
    /// Progress went up without finishing the exercise: start resting
    pub arm_rest: bool,
}

impl SetToggle {
    pub fn patch(&self) -> ExercisePatch {
        ExercisePatch {
            completed_sets: Some(self.completed_sets),
            ..Default::default()
        }
    }
}

/// Click on marker `index` (0-based).
///
/// Clicking the last completed marker steps back to `index`; any other
/// marker completes everything up to and including it. Markers past the
/// target count do not exist and return `None`.
pub fn toggle_set(exercise: &Exercise, index: u32) -> Option<SetToggle> {
    if index >= exercise.sets {
        return None;
    }
    let completed_sets = if index + 1 == exercise.completed_sets {
        index
    } else {
        index + 1
    };
    let is_completed = completed_sets >= exercise.sets;
    Some(SetToggle {
        completed_sets,
        is_completed,
        arm_rest: completed_sets > exercise.completed_sets && !is_completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(ex: &mut Exercise, index: u32) -> SetToggle {
        let toggle = toggle_set(ex, index).unwrap();
        ex.apply(&toggle.patch());
        assert_eq!(ex.is_completed, toggle.is_completed);
        toggle
    }

    #[test]
    fn test_click_sequence() {
        let mut ex = Exercise::new("Supino");
        assert_eq!(ex.sets, 3);

        let t = click(&mut ex, 0);
        assert_eq!(ex.completed_sets, 1);
        assert!(t.arm_rest);

        let t = click(&mut ex, 0);
        assert_eq!(ex.completed_sets, 0);
        assert!(!t.arm_rest);

        let t = click(&mut ex, 2);
        assert_eq!(ex.completed_sets, 3);
        assert!(ex.is_completed);
        assert!(!t.arm_rest);
    }

    #[test]
    fn test_last_marker_alternates() {
        let mut ex = Exercise::new("Remada");
        click(&mut ex, 1);
        assert_eq!(ex.completed_sets, 2);
        click(&mut ex, 1);
        assert_eq!(ex.completed_sets, 1);
        click(&mut ex, 1);
        assert_eq!(ex.completed_sets, 2);
    }

    #[test]
    fn test_clicking_earlier_marker_lowers_progress() {
        let mut ex = Exercise::new("Agachamento");
        ex.sets = 5;
        click(&mut ex, 3);
        assert_eq!(ex.completed_sets, 4);

        let t = click(&mut ex, 1);
        assert_eq!(ex.completed_sets, 2);
        assert!(!t.arm_rest);
    }

    #[test]
    fn test_uncompleting_clears_flag() {
        let mut ex = Exercise::new("Rosca");
        click(&mut ex, 2);
        assert!(ex.is_completed);
        click(&mut ex, 2);
        assert_eq!(ex.completed_sets, 2);
        assert!(!ex.is_completed);
    }

    #[test]
    fn test_out_of_range_marker() {
        let ex = Exercise::new("Elevação");
        assert!(toggle_set(&ex, 3).is_none());
    }
}
