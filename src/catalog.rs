// ABOUTME: Built-in exercise catalog: 12 exercises across strength, cardio, and yoga
// ABOUTME: Read-only after construction; fetched once at screen load by the UI layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Exercise Catalog
//!
//! The catalog is the engine's source of truth for exercise metadata:
//! display strings, category/difficulty tags, per-rep calorie rates, and the
//! landmark triples whose joint angles drive classification.

use crate::errors::{AppError, AppResult};
use crate::models::landmark::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ANKLE,
    RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::models::{Difficulty, ExerciseCategory, ExerciseDefinition};

const LEFT_ELBOW_JOINT: [usize; 3] = [LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST];
const RIGHT_ELBOW_JOINT: [usize; 3] = [RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST];
const LEFT_KNEE_JOINT: [usize; 3] = [LEFT_HIP, LEFT_KNEE, LEFT_ANKLE];
const RIGHT_KNEE_JOINT: [usize; 3] = [RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE];
const TORSO_JOINT: [usize; 3] = [LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE];

/// The built-in exercise library
#[derive(Debug, Clone)]
pub struct Catalog {
    exercises: Vec<ExerciseDefinition>,
}

impl Catalog {
    /// Build the catalog of built-in exercises
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            exercises: builtin_exercises(),
        }
    }

    /// All exercises, in catalog order
    #[must_use]
    pub fn list(&self) -> &[ExerciseDefinition] {
        &self.exercises
    }

    /// Exercises in one category
    #[must_use]
    pub fn list_by_category(&self, category: ExerciseCategory) -> Vec<&ExerciseDefinition> {
        self.exercises
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Look up one exercise by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id.
    pub fn get(&self, id: &str) -> AppResult<&ExerciseDefinition> {
        self.exercises
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::not_found(format!("exercise '{id}'")))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::too_many_arguments)] // catalog rows read best as one flat call
fn exercise(
    id: &str,
    name: &str,
    description: &str,
    category: ExerciseCategory,
    difficulty: Difficulty,
    target_muscles: &[&str],
    form_tips: &[&str],
    calories_per_rep: f64,
    angle_joints: Vec<[usize; 3]>,
) -> ExerciseDefinition {
    ExerciseDefinition {
        id: id.to_owned(),
        name: name.to_owned(),
        description: description.to_owned(),
        category,
        difficulty,
        target_muscles: target_muscles.iter().map(|&m| m.to_owned()).collect(),
        form_tips: form_tips.iter().map(|&t| t.to_owned()).collect(),
        calories_per_rep,
        angle_joints,
    }
}

// Long function: catalog data, one entry per built-in exercise
fn builtin_exercises() -> Vec<ExerciseDefinition> {
    vec![
        // Strength
        exercise(
            "push-ups",
            "Push-Ups",
            "Classic upper-body press from a plank position",
            ExerciseCategory::Strength,
            Difficulty::Beginner,
            &["chest", "triceps", "shoulders", "core"],
            &[
                "Keep your body in a straight line from head to heels",
                "Lower until your elbows pass 90 degrees",
                "Keep elbows at roughly 45 degrees from your torso",
            ],
            0.5,
            vec![LEFT_ELBOW_JOINT, RIGHT_ELBOW_JOINT, TORSO_JOINT],
        ),
        exercise(
            "squats",
            "Squats",
            "Hip-hinge squat to parallel or below",
            ExerciseCategory::Strength,
            Difficulty::Beginner,
            &["quadriceps", "glutes", "hamstrings"],
            &[
                "Keep your weight on your heels",
                "Keep knees tracking over your toes, not past them",
                "Drive up through your hips",
            ],
            0.7,
            vec![LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT],
        ),
        exercise(
            "lunges",
            "Lunges",
            "Alternating forward lunges",
            ExerciseCategory::Strength,
            Difficulty::Intermediate,
            &["quadriceps", "glutes", "calves"],
            &[
                "Step far enough that your front knee stays over your ankle",
                "Keep your torso upright",
                "Lower your back knee toward the floor",
            ],
            0.6,
            vec![LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT],
        ),
        exercise(
            "plank",
            "Plank Hold",
            "Isometric core hold, counted in held intervals",
            ExerciseCategory::Strength,
            Difficulty::Intermediate,
            &["core", "shoulders", "back"],
            &[
                "Keep hips level with your shoulders",
                "Brace your core the whole time",
                "Breathe steadily",
            ],
            3.0,
            vec![TORSO_JOINT],
        ),
        // Cardio
        exercise(
            "jumping-jacks",
            "Jumping Jacks",
            "Full-body jump with arm raise and leg spread",
            ExerciseCategory::Cardio,
            Difficulty::Beginner,
            &["calves", "shoulders", "core"],
            &[
                "Land softly on the balls of your feet",
                "Swing your arms fully overhead",
                "Keep a steady rhythm",
            ],
            0.3,
            vec![LEFT_ELBOW_JOINT, RIGHT_ELBOW_JOINT],
        ),
        exercise(
            "high-knees",
            "High Knees",
            "Running in place, knees driven above hip height",
            ExerciseCategory::Cardio,
            Difficulty::Beginner,
            &["hip flexors", "quadriceps", "calves"],
            &[
                "Drive each knee above hip height",
                "Stay on the balls of your feet",
                "Pump your arms",
            ],
            0.25,
            vec![LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT],
        ),
        exercise(
            "burpees",
            "Burpees",
            "Squat thrust into a jump, full-body conditioning",
            ExerciseCategory::Cardio,
            Difficulty::Advanced,
            &["full body"],
            &[
                "Keep your core tight in the plank phase",
                "Jump your feet back in close to your hands",
                "Finish each rep with a full extension",
            ],
            1.0,
            vec![LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT, TORSO_JOINT],
        ),
        exercise(
            "mountain-climbers",
            "Mountain Climbers",
            "Alternating knee drives from a plank",
            ExerciseCategory::Cardio,
            Difficulty::Intermediate,
            &["core", "shoulders", "hip flexors"],
            &[
                "Keep your hips low and level",
                "Drive knees toward your chest",
                "Keep your shoulders over your wrists",
            ],
            0.4,
            vec![LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT, TORSO_JOINT],
        ),
        // Yoga
        exercise(
            "downward-dog",
            "Downward Dog",
            "Inverted V hold, counted in held intervals",
            ExerciseCategory::Yoga,
            Difficulty::Beginner,
            &["hamstrings", "shoulders", "calves"],
            &[
                "Press your heels toward the floor",
                "Keep your spine long",
                "Spread your fingers wide",
            ],
            0.8,
            vec![TORSO_JOINT],
        ),
        exercise(
            "warrior-pose",
            "Warrior Pose",
            "Lunging standing pose, counted in held intervals",
            ExerciseCategory::Yoga,
            Difficulty::Intermediate,
            &["quadriceps", "glutes", "shoulders"],
            &[
                "Bend your front knee to 90 degrees",
                "Keep your back leg straight and strong",
                "Reach actively through both arms",
            ],
            0.5,
            vec![LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT],
        ),
        exercise(
            "tree-pose",
            "Tree Pose",
            "Single-leg balance hold",
            ExerciseCategory::Yoga,
            Difficulty::Beginner,
            &["core", "calves", "ankles"],
            &[
                "Fix your gaze on one point",
                "Press your foot into your inner thigh, never the knee",
                "Grow tall through the crown of your head",
            ],
            0.4,
            vec![LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT],
        ),
        exercise(
            "child-pose",
            "Child's Pose",
            "Restorative kneeling fold",
            ExerciseCategory::Yoga,
            Difficulty::Beginner,
            &["back", "hips"],
            &[
                "Sink your hips toward your heels",
                "Let your forehead rest down",
                "Breathe into your lower back",
            ],
            0.3,
            vec![TORSO_JOINT],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_twelve_exercises_across_three_categories() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.list().len(), 12);
        assert_eq!(
            catalog.list_by_category(ExerciseCategory::Strength).len(),
            4
        );
        assert_eq!(catalog.list_by_category(ExerciseCategory::Cardio).len(), 4);
        assert_eq!(catalog.list_by_category(ExerciseCategory::Yoga).len(), 4);
    }

    #[test]
    fn lookup_resolves_known_ids_and_rejects_unknown() {
        let catalog = Catalog::builtin();
        assert!(catalog.get("push-ups").is_ok());
        assert!(catalog.get("swimming").is_err());
    }
}
