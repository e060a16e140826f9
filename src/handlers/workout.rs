use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::models::{Exercise, PersonalRecord, Workout, WorkoutExercise, WorkoutSet};

fn exercise(id: &str, name: &str, category: &str, muscles: &[&str]) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        muscle_groups: muscles.iter().map(|m| m.to_string()).collect(),
    }
}

pub fn default_catalog() -> Vec<Exercise> {
    vec![
        exercise("1", "Bench Press", "Chest", &["Chest", "Triceps", "Shoulders"]),
        exercise("2", "Squat", "Legs", &["Quadriceps", "Glutes", "Hamstrings"]),
        exercise("3", "Deadlift", "Back", &["Back", "Hamstrings", "Glutes"]),
        exercise("4", "Pull-ups", "Back", &["Back", "Biceps"]),
        exercise("5", "Overhead Press", "Shoulders", &["Shoulders", "Triceps"]),
    ]
}

/// Epley estimate; a single rep is its own max.
pub fn estimated_one_rep_max(weight: u32, reps: u32) -> f64 {
    let weight = weight as f64;
    if reps <= 1 {
        weight
    } else {
        (weight * (1.0 + reps as f64 / 30.0) * 10.0).round() / 10.0
    }
}

/// Integer prefix of a form field ("185 lb" -> 185).
pub fn parse_whole_number(input: &str) -> Option<u32> {
    let digits: String = input.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub fn total_sets(workout: &Workout) -> usize {
    workout.exercises.iter().map(|e| e.sets.len()).sum()
}

/// Whole minutes elapsed; unfinished workouts are measured up to `now`.
pub fn duration_minutes(workout: &Workout, now: DateTime<Utc>) -> i64 {
    let end = workout.end_time.unwrap_or(now);
    (end - workout.start_time).num_minutes()
}

#[derive(Default)]
struct WorkoutState {
    current: Option<Workout>,
    history: Vec<Workout>,
    records: Vec<PersonalRecord>,
}

pub struct WorkoutHandler {
    catalog: Vec<Exercise>,
    state: Mutex<WorkoutState>,
    next_id: AtomicU64,
}

impl WorkoutHandler {
    pub fn new(catalog: Vec<Exercise>) -> Self {
        Self {
            catalog,
            state: Mutex::new(WorkoutState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn catalog(&self) -> &[Exercise] {
        &self.catalog
    }

    pub async fn start_workout(&self, name: &str) -> Result<Workout> {
        let mut state = self.state.lock().await;
        if let Some(current) = &state.current {
            anyhow::bail!("Workout '{}' is already in progress", current.name);
        }

        let name = if name.trim().is_empty() { "New Workout" } else { name.trim() };
        let workout = Workout {
            id: self.next_id(),
            name: name.to_string(),
            exercises: Vec::new(),
            start_time: Utc::now(),
            end_time: None,
            notes: None,
        };
        state.current = Some(workout.clone());

        log::info!("🏋️ Started workout: {}", workout.name);
        Ok(workout)
    }

    /// Adds a catalog exercise; returns the id of the new workout entry.
    pub async fn add_exercise(&self, exercise_id: &str) -> Result<u64> {
        let exercise = self
            .catalog
            .iter()
            .find(|e| e.id == exercise_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown exercise: {}", exercise_id))?;

        let mut state = self.state.lock().await;
        let workout = state
            .current
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("No workout in progress"))?;

        let id = self.next_id();
        log::info!("➕ Added exercise: {}", exercise.name);
        workout.exercises.push(WorkoutExercise {
            id,
            exercise,
            sets: Vec::new(),
            notes: None,
        });
        Ok(id)
    }

    pub async fn add_set(&self, workout_exercise_id: u64, weight: u32, reps: u32) -> Result<WorkoutSet> {
        let mut state = self.state.lock().await;
        let WorkoutState { current, records, .. } = &mut *state;

        let workout = current
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("No workout in progress"))?;
        let entry = workout
            .exercises
            .iter_mut()
            .find(|e| e.id == workout_exercise_id)
            .ok_or_else(|| anyhow::anyhow!("Exercise {} is not part of this workout", workout_exercise_id))?;

        let set = WorkoutSet {
            id: self.next_id(),
            reps,
            weight,
            rest_time: None,
            completed: true,
        };
        entry.sets.push(set.clone());
        log::debug!("📝 Added set to {}: {} x {}", entry.exercise.name, weight, reps);

        let one_rep_max = estimated_one_rep_max(weight, reps);
        let existing = records.iter_mut().find(|r| r.exercise_id == entry.exercise.id);
        match existing {
            Some(record) if record.one_rep_max >= one_rep_max => {}
            Some(record) => {
                log::info!("🏆 New PR on {}: {} (was {})", entry.exercise.name, one_rep_max, record.one_rep_max);
                record.weight = weight;
                record.reps = reps;
                record.one_rep_max = one_rep_max;
                record.date = Utc::now();
            }
            None => records.push(PersonalRecord {
                exercise_id: entry.exercise.id.clone(),
                exercise_name: entry.exercise.name.clone(),
                weight,
                reps,
                date: Utc::now(),
                one_rep_max,
            }),
        }

        Ok(set)
    }

    /// Form-input variant of `add_set`; both fields are required.
    pub async fn add_set_from_input(&self, workout_exercise_id: u64, weight: &str, reps: &str) -> Result<WorkoutSet> {
        let weight = parse_whole_number(weight).ok_or_else(|| anyhow::anyhow!("Weight is required"))?;
        let reps = parse_whole_number(reps).ok_or_else(|| anyhow::anyhow!("Reps are required"))?;
        self.add_set(workout_exercise_id, weight, reps).await
    }

    pub async fn finish_workout(&self) -> Result<Workout> {
        let mut state = self.state.lock().await;
        let mut workout = state
            .current
            .take()
            .ok_or_else(|| anyhow::anyhow!("No workout in progress"))?;

        workout.end_time = Some(Utc::now());
        log::info!(
            "✅ Finished workout {}: {} sets in {} min",
            workout.name,
            total_sets(&workout),
            duration_minutes(&workout, Utc::now())
        );

        state.history.push(workout.clone());
        Ok(workout)
    }

    pub async fn current(&self) -> Option<Workout> {
        self.state.lock().await.current.clone()
    }

    pub async fn history(&self) -> Vec<Workout> {
        self.state.lock().await.history.clone()
    }

    pub async fn personal_records(&self) -> Vec<PersonalRecord> {
        self.state.lock().await.records.clone()
    }
}

impl Default for WorkoutHandler {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}
