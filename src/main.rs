//! gympro - Personal workout tracker

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gympro::gallery;
use gympro::i18n::{Language, Text};
use gympro::import::ExerciseParser;
use gympro::model::{ExercisePatch, TrainingGoal, parse_seconds};
use gympro::storage::{FileStorage, STATE_KEY};
use gympro::timer::format_clock;
use gympro::tui::App;
use gympro::{Action, Config, Store};

#[derive(Parser)]
#[command(name = "gympro")]
#[command(author, version, about = "Personal workout tracker")]
struct Cli {
    /// Directory for the stored state and log file
    #[arg(long, global = true, env = "GYMPRO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Import service key (API_KEY is also accepted)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Import service model
    #[arg(long, global = true, env = "GYMPRO_MODEL")]
    model: Option<String>,

    /// Import service base URL
    #[arg(long, global = true, env = "GYMPRO_API_BASE")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Print goal, dates and all workouts
    Show,

    /// Workout management
    #[command(subcommand, visible_alias = "w")]
    Workout(WorkoutCmd),

    /// Exercise management
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),

    /// Import exercises from free text
    Import {
        /// Workout text, e.g. "supino 4x10 descanso 90s"
        text: Vec<String>,

        /// Read the text from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Append to this workout (letter or id) instead of creating one
        #[arg(short, long)]
        workout: Option<String>,
    },

    /// Evolution gallery
    #[command(subcommand)]
    Photo(PhotoCmd),

    /// Set the training goal
    Goal { goal: TrainingGoal },

    /// Set the program dates (YYYY-MM-DD)
    Dates {
        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,
    },

    /// Set the interface language
    Language { language: Language },
}

#[derive(Subcommand)]
enum WorkoutCmd {
    /// Add an empty workout
    Add,

    /// Delete a workout; the others are relabeled
    Delete { workout: String },

    /// Set the general observation
    Note { workout: String, text: String },
}

#[derive(Subcommand)]
enum ExerciseCmd {
    /// Add an exercise with default targets
    Add { workout: String },

    /// Change fields of an exercise
    Edit {
        workout: String,

        /// 1-based position in the workout
        exercise: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        sets: Option<String>,

        #[arg(long)]
        reps: Option<String>,

        #[arg(long)]
        weight: Option<String>,

        /// Rest time in seconds
        #[arg(long)]
        rest: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Delete an exercise
    Delete { workout: String, exercise: usize },

    /// Click a set marker (1-based)
    Toggle {
        workout: String,
        exercise: usize,
        set: u32,
    },

    /// Attach or clear the exercise photo
    Photo {
        workout: String,
        exercise: usize,

        /// Image file to embed
        file: Option<PathBuf>,

        #[arg(long, conflicts_with = "file")]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum PhotoCmd {
    /// Add a progress photo dated today
    Add { file: PathBuf },

    /// List progress photos, newest first
    List,

    /// Remove a photo by position
    Remove { index: usize },

    /// Save a photo as Evolution_<date>.png
    Export {
        index: usize,

        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let api_key = cli.api_key.or_else(|| std::env::var("API_KEY").ok());
    let config = Config::new(cli.data_dir, api_key, cli.model, cli.api_base)?;
    let command = cli.command.unwrap_or(Commands::Tui);

    init_tracing(&config, matches!(command, Commands::Tui))?;

    let mut store = Store::open(config.storage()?, STATE_KEY)?;
    let lang = store.state().language;

    match command {
        Commands::Tui => {
            let mut app = App::new(store, config.parser()?, std::env::current_dir()?);
            app.run()?;
        }

        Commands::Show => print_state(&store),

        Commands::Workout(cmd) => match cmd {
            WorkoutCmd::Add => {
                let before = store.state().workouts.len();
                store.dispatch(Action::AddWorkout)?;
                match store.state().workouts.get(before) {
                    Some(w) => println!("{} {} ({})", lang.t(Text::AddWorkout), w.letter, w.id),
                    None => println!("Limit of 10 workouts reached"),
                }
            }
            WorkoutCmd::Delete { workout } => {
                let workout_id = workout_id(&store, &workout)?;
                store.dispatch(Action::DeleteWorkout { workout_id })?;
                let letters: String = store.state().workouts.iter().map(|w| w.letter).collect();
                println!("Deleted. Workouts: {}", if letters.is_empty() { "-" } else { letters.as_str() });
            }
            WorkoutCmd::Note { workout, text } => {
                let workout_id = workout_id(&store, &workout)?;
                store.dispatch(Action::UpdateWorkoutObservation { workout_id, text })?;
            }
        },

        Commands::Exercise(cmd) => handle_exercise(&mut store, cmd)?,

        Commands::Import { text, file, workout } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => text.join(" "),
            };
            if text.trim().is_empty() {
                return Err(anyhow!("Nothing to import"));
            }
            let target = workout.map(|w| workout_id(&store, &w)).transpose()?;

            println!("{}", lang.t(Text::Processing));
            let candidates = config.parser()?.parse(&text).await;
            if candidates.is_empty() {
                println!("{}", lang.t(Text::NothingImported));
                return Ok(());
            }
            let count = candidates.len();
            store.dispatch(Action::ImportExercises { workout_id: target.clone(), candidates })?;
            let letter = match target {
                Some(id) => store.state().workout(&id).map(|w| w.letter),
                None => store.viewed().map(|w| w.letter),
            };
            println!(
                "Imported {} exercises into {} {}",
                count,
                lang.t(Text::Workout),
                letter.unwrap_or('?')
            );
        }

        Commands::Photo(cmd) => match cmd {
            PhotoCmd::Add { file } => {
                let photo = gallery::capture(&file, lang, Local::now().date_naive())?;
                println!("Added photo {}", photo.date);
                store.dispatch(Action::AddEvolutionPhoto(photo))?;
            }
            PhotoCmd::List => {
                let gallery = &store.state().evolution_gallery;
                if gallery.is_empty() {
                    println!("{}", lang.t(Text::NoPhotos));
                }
                for (i, p) in gallery.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, p.date);
                }
            }
            PhotoCmd::Remove { index } => {
                let photo_id = photo_at(&store, index)?.id.clone();
                store.dispatch(Action::RemoveEvolutionPhoto { photo_id })?;
            }
            PhotoCmd::Export { index, dir } => {
                let path = gallery::export(photo_at(&store, index)?, &dir)?;
                println!("{} → {}", lang.t(Text::Download), path.display());
            }
        },

        Commands::Goal { goal } => store.dispatch(Action::SetGoal(goal))?,

        Commands::Dates { start, end } => {
            if let Some(date) = start {
                store.dispatch(Action::SetStartDate(date))?;
            }
            if let Some(date) = end {
                store.dispatch(Action::SetEndDate(date))?;
            }
        }

        Commands::Language { language } => store.dispatch(Action::SetLanguage(language))?,
    }

    Ok(())
}

/// Logs go to stderr, or to the log file while the dashboard owns the screen
fn init_tracing(config: &Config, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if to_file {
        std::fs::create_dir_all(&config.data_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())
            .with_context(|| format!("Failed to open {}", config.log_path().display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn workout_id(store: &Store<FileStorage>, reference: &str) -> Result<String> {
    store
        .state()
        .find_workout(reference)
        .map(|w| w.id.clone())
        .ok_or_else(|| anyhow!("Workout `{}` not found", reference))
}

fn exercise_ids(store: &Store<FileStorage>, workout: &str, position: usize) -> Result<(String, String)> {
    let w = store
        .state()
        .find_workout(workout)
        .ok_or_else(|| anyhow!("Workout `{}` not found", workout))?;
    let ex = position
        .checked_sub(1)
        .and_then(|i| w.exercises.get(i))
        .ok_or_else(|| anyhow!("Workout {} has no exercise {}", w.letter, position))?;
    Ok((w.id.clone(), ex.id.clone()))
}

fn photo_at(store: &Store<FileStorage>, index: usize) -> Result<&gympro::model::EvolutionPhoto> {
    index
        .checked_sub(1)
        .and_then(|i| store.state().evolution_gallery.get(i))
        .ok_or_else(|| anyhow!("No photo {}", index))
}

fn handle_exercise(store: &mut Store<FileStorage>, cmd: ExerciseCmd) -> Result<()> {
    match cmd {
        ExerciseCmd::Add { workout } => {
            let workout_id = workout_id(store, &workout)?;
            store.dispatch(Action::AddExercise { workout_id })?;
        }
        ExerciseCmd::Edit { workout, exercise, name, sets, reps, weight, rest, note } => {
            let (workout_id, exercise_id) = exercise_ids(store, &workout, exercise)?;
            let patch = ExercisePatch {
                name,
                sets: sets.as_deref().map(parse_seconds),
                reps,
                weight,
                observation: note,
                rest_time: rest.as_deref().map(parse_seconds),
                ..Default::default()
            };
            store.dispatch(Action::UpdateExercise { workout_id, exercise_id, patch })?;
        }
        ExerciseCmd::Delete { workout, exercise } => {
            let (workout_id, exercise_id) = exercise_ids(store, &workout, exercise)?;
            store.dispatch(Action::DeleteExercise { workout_id, exercise_id })?;
        }
        ExerciseCmd::Toggle { workout, exercise, set } => {
            let (workout_id, exercise_id) = exercise_ids(store, &workout, exercise)?;
            let index = set.checked_sub(1).ok_or_else(|| anyhow!("Set numbers start at 1"))?;
            let lang = store.state().language;
            match store.toggle_set(&workout_id, &exercise_id, index)? {
                Some(t) => {
                    let total = store
                        .state()
                        .workout(&workout_id)
                        .and_then(|w| w.exercise(&exercise_id))
                        .map(|e| (e.sets, e.rest_time));
                    if let Some((sets, rest)) = total {
                        print!("{}: {}/{}", lang.t(Text::Sets), t.completed_sets, sets);
                        if t.is_completed {
                            print!(" - {}", lang.t(Text::Completed));
                        } else if t.arm_rest {
                            print!(" - {} {}", lang.t(Text::Rest), format_clock(rest));
                        }
                        println!();
                    }
                }
                None => return Err(anyhow!("Exercise has no set {}", set)),
            }
        }
        ExerciseCmd::Photo { workout, exercise, file, clear } => {
            let (workout_id, exercise_id) = exercise_ids(store, &workout, exercise)?;
            let photo = match (file, clear) {
                (Some(path), _) => Some(gallery::data_url_from_file(&path)?),
                (None, true) => None,
                (None, false) => return Err(anyhow!("Give an image file or --clear")),
            };
            store.dispatch(Action::UpdateExercise {
                workout_id,
                exercise_id,
                patch: ExercisePatch { photo: Some(photo), ..Default::default() },
            })?;
        }
    }
    Ok(())
}

fn print_state(store: &Store<FileStorage>) {
    let state = store.state();
    let lang = state.language;

    println!("{}", lang.t(Text::Title));
    println!("{:-<60}", "");
    println!("{}: {}", lang.t(Text::Goal), lang.goal(state.goal));
    println!(
        "{}: {}  {}: {}",
        lang.t(Text::StartDate),
        state.start_date,
        lang.t(Text::EndDate),
        if state.end_date.is_empty() { "-" } else { state.end_date.as_str() }
    );
    println!("{}: {} photos", lang.t(Text::Evolution), state.evolution_gallery.len());

    if state.workouts.is_empty() {
        println!("\n{}", lang.t(Text::NoWorkouts));
        return;
    }

    for w in &state.workouts {
        println!("\n{} {}", lang.t(Text::Workout), w.letter);
        println!("{:-<60}", "");
        if w.exercises.is_empty() {
            println!("  {}", lang.t(Text::NoExercises));
        }
        for (i, e) in w.exercises.iter().enumerate() {
            let markers: String = (0..e.sets)
                .map(|s| if s < e.completed_sets { '●' } else { '○' })
                .collect();
            println!(
                "{:>3}. {:24} {}x{:6} {:8} {} {} {}{}",
                i + 1,
                e.name,
                e.sets,
                e.reps,
                if e.weight.is_empty() { "-" } else { e.weight.as_str() },
                markers,
                format_clock(e.rest_time),
                if e.is_completed { "✔ " } else { "" },
                e.observation,
            );
        }
        if !w.general_observation.is_empty() {
            println!("  {}: {}", lang.t(Text::Observation), w.general_observation);
        }
    }
}
