//! TUI module - Terminal dashboard with ratatui

use std::io::{Stdout, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
};
use tracing::{info, warn};

use crate::gallery;
use crate::i18n::{Language, Text};
use crate::import::{ExerciseCandidate, ExerciseParser, GeminiParser, ImportTarget, ImportTicket, ImportTracker};
use crate::model::{Exercise, ExercisePatch, TrainingGoal, Workout, parse_seconds};
use crate::storage::FileStorage;
use crate::store::{Action, Store};
use crate::timer::{TimerBoard, format_clock};

type Tui = Terminal<CrosstermBackend<Stdout>>;
type ImportResult = (ImportTicket, Vec<ExerciseCandidate>);

const TICK: Duration = Duration::from_secs(1);
const REST_STEP: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Workout,
    Gallery,
}

/// Line being typed in the input box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    StartDate,
    EndDate,
    WorkoutNote,
    Name,
    Reps,
    Sets,
    Weight,
    Rest,
    ExerciseNote,
    ExercisePhoto,
    SetMarker,
    GalleryPhoto,
    ImportText,
}

impl Field {
    fn label(&self, lang: Language) -> &'static str {
        match self {
            Field::StartDate => lang.t(Text::StartDate),
            Field::EndDate => lang.t(Text::EndDate),
            Field::WorkoutNote | Field::ExerciseNote => lang.t(Text::Observation),
            Field::Name => lang.t(Text::Exercise),
            Field::Reps => "Reps",
            Field::Sets | Field::SetMarker => lang.t(Text::Sets),
            Field::Weight => "Kg",
            Field::Rest => lang.t(Text::Rest),
            Field::ExercisePhoto | Field::GalleryPhoto => lang.t(Text::Photo),
            Field::ImportText => lang.t(Text::PasteTextPrompt),
        }
    }
}

/// App state for TUI
pub struct App {
    store: Store<FileStorage>,
    parser: GeminiParser,
    timers: TimerBoard,
    imports: ImportTracker,
    results_tx: Sender<ImportResult>,
    results_rx: Receiver<ImportResult>,
    screen: Screen,
    home: ListState,
    rows: TableState,
    photos: ListState,
    input: Option<(Field, String)>,
    status: Option<String>,
    export_dir: PathBuf,
    last_tick: Instant,
    should_quit: bool,
}

impl App {
    pub fn new(store: Store<FileStorage>, parser: GeminiParser, export_dir: PathBuf) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        let mut home = ListState::default();
        if !store.state().workouts.is_empty() {
            home.select(Some(0));
        }
        Self {
            store,
            parser,
            timers: TimerBoard::new(),
            imports: ImportTracker::new(),
            results_tx,
            results_rx,
            screen: Screen::Home,
            home,
            rows: TableState::default(),
            photos: ListState::default(),
            input: None,
            status: None,
            export_dir,
            last_tick: Instant::now(),
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.main_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn main_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            self.collect_imports()?;
            while self.last_tick.elapsed() >= TICK {
                self.timers.tick();
                self.last_tick += TICK;
            }
        }
        Ok(())
    }

    fn lang(&self) -> Language {
        self.store.state().language
    }

    fn viewed(&self) -> Option<&Workout> {
        self.store.viewed()
    }

    fn selected_exercise(&self) -> Option<(String, &Exercise)> {
        let workout = self.viewed()?;
        let ex = workout.exercises.get(self.rows.selected()?)?;
        Some((workout.id.clone(), ex))
    }

    fn prune_timers(&mut self) {
        let state = self.store.state();
        self.timers.retain(|id| {
            state.workouts.iter().any(|w| w.exercise(id).is_some())
        });
    }

    // Rendering

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        match self.screen {
            Screen::Home => self.render_home(frame, chunks[1]),
            Screen::Workout => self.render_workout(frame, chunks[1]),
            Screen::Gallery => self.render_gallery(frame, chunks[1]),
        }
        self.render_footer(frame, chunks[2]);

        if self.imports.is_open() {
            self.render_import(frame, area);
        } else if let Some((field, buffer)) = &self.input {
            let popup = centered(area, 60, 3);
            let input = Paragraph::new(buffer.as_str())
                .block(Block::default().borders(Borders::ALL).title(field.label(self.lang())));
            frame.render_widget(Clear, popup);
            frame.render_widget(input, popup);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let lang = self.lang();
        let state = self.store.state();
        let title = match (self.screen, self.viewed()) {
            (Screen::Workout, Some(w)) => format!("{} › {} {}", lang.t(Text::Title), lang.t(Text::Workout), w.letter),
            (Screen::Gallery, _) => format!("{} › {}", lang.t(Text::Title), lang.t(Text::Evolution)),
            _ => lang.t(Text::Title).to_string(),
        };
        let end = if state.end_date.is_empty() { "-" } else { state.end_date.as_str() };
        let info = Line::from(vec![
            Span::styled(format!("{}: ", lang.t(Text::Goal)), Style::default().fg(Color::DarkGray)),
            Span::raw(lang.goal(state.goal)),
            Span::styled(format!("  {}: ", lang.t(Text::StartDate)), Style::default().fg(Color::DarkGray)),
            Span::raw(state.start_date.as_str()),
            Span::styled(format!("  {}: ", lang.t(Text::EndDate)), Style::default().fg(Color::DarkGray)),
            Span::raw(end),
            Span::styled(format!("  {}: ", lang.t(Text::Language)), Style::default().fg(Color::DarkGray)),
            Span::raw(lang.code().to_uppercase()),
        ]);
        let header = Paragraph::new(vec![Line::from(title).style(Style::default().fg(Color::Cyan).bold()), info])
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_home(&mut self, frame: &mut Frame, area: Rect) {
        let lang = self.lang();
        let workouts = &self.store.state().workouts;
        if workouts.is_empty() {
            let empty = Paragraph::new(lang.t(Text::NoWorkouts))
                .style(Style::default().fg(Color::DarkGray).italic())
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = workouts
            .iter()
            .map(|w| {
                let done = w.exercises.iter().filter(|e| e.is_completed).count();
                ListItem::new(format!(
                    " {}  {} {}   {}/{} {}",
                    w.letter,
                    lang.t(Text::Workout),
                    w.letter,
                    done,
                    w.exercises.len(),
                    lang.t(Text::Completed).to_lowercase(),
                ))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(lang.t(Text::Workout)))
            .highlight_style(Style::default().fg(Color::Blue).bold())
            .highlight_symbol("▶");
        frame.render_stateful_widget(list, area, &mut self.home);
    }

    fn render_workout(&mut self, frame: &mut Frame, area: Rect) {
        let lang = self.lang();
        let Some(workout) = self.store.viewed() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(3)])
            .split(area);

        let rows: Vec<Row> = workout
            .exercises
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let timers = self.timers.get(&e.id);
                let markers: Vec<Span> = (0..e.sets)
                    .map(|s| {
                        if s < e.completed_sets {
                            Span::styled(format!("[{}]", s + 1), Style::default().fg(Color::Blue).bold())
                        } else {
                            Span::styled(format!(" {} ", s + 1), Style::default().fg(Color::DarkGray))
                        }
                    })
                    .collect();
                let stopwatch = format!(
                    "{} {}",
                    if timers.elapsed.is_running() { "⏸" } else { "▶" },
                    format_clock(timers.elapsed.elapsed())
                );
                let rest = if timers.rest.is_resting() {
                    Cell::from(format_clock(timers.rest.remaining())).style(Style::default().fg(Color::LightRed))
                } else {
                    Cell::from(format_clock(e.rest_time))
                };
                let style = if e.is_completed {
                    Style::default().fg(Color::Green)
                } else if i % 2 == 0 {
                    Style::default()
                } else {
                    Style::default().bg(Color::Rgb(30, 36, 48))
                };
                Row::new(vec![
                    Cell::from(e.name.clone()),
                    Cell::from(format!("{}x{}", e.sets, e.reps)),
                    Cell::from(e.weight.clone()),
                    Cell::from(Line::from(markers)),
                    Cell::from(stopwatch),
                    rest,
                    Cell::from(if e.photo.is_some() { "📷" } else { "" }),
                    Cell::from(e.observation.clone()),
                ])
                .style(style)
            })
            .collect();

        let title = if workout.exercises.is_empty() {
            lang.t(Text::NoExercises).to_string()
        } else {
            format!("{} {}", lang.t(Text::Workout), workout.letter)
        };
        let table = Table::new(
            rows,
            [
                Constraint::Length(22),
                Constraint::Length(9),
                Constraint::Length(8),
                Constraint::Length(20),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Min(10),
            ],
        )
        .header(
            Row::new(vec![
                lang.t(Text::Exercise),
                lang.t(Text::Sets),
                "Kg",
                "",
                lang.t(Text::Timer),
                lang.t(Text::Rest),
                "",
                lang.t(Text::Observation),
            ])
            .style(Style::default().bold()),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_stateful_widget(table, chunks[0], &mut self.rows);

        let note = Paragraph::new(workout.general_observation.as_str())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(lang.t(Text::Observation)));
        frame.render_widget(note, chunks[1]);
    }

    fn render_gallery(&mut self, frame: &mut Frame, area: Rect) {
        let lang = self.lang();
        let gallery = &self.store.state().evolution_gallery;
        if gallery.is_empty() {
            let empty = Paragraph::new(lang.t(Text::NoPhotos))
                .style(Style::default().fg(Color::DarkGray).italic())
                .block(Block::default().borders(Borders::ALL).title(lang.t(Text::Gallery)));
            frame.render_widget(empty, area);
            return;
        }
        let items: Vec<ListItem> = gallery
            .iter()
            .map(|p| ListItem::new(format!(" {}  ({} KB)", p.date, p.data_url.len() * 3 / 4 / 1024)))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(lang.t(Text::Gallery)))
            .highlight_style(Style::default().fg(Color::Blue).bold())
            .highlight_symbol("▶");
        frame.render_stateful_widget(list, area, &mut self.photos);
    }

    fn render_import(&self, frame: &mut Frame, area: Rect) {
        let lang = self.lang();
        let popup = centered(area, 70, 8);
        let (title, style) = if self.imports.is_processing() {
            (lang.t(Text::Processing), Style::default().fg(Color::Yellow))
        } else {
            (lang.t(Text::ImportText), Style::default())
        };
        let text = self.input.as_ref().map(|(_, b)| b.as_str()).unwrap_or_default();
        let body = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title).title_bottom(format!(
                "Enter: {}  Esc: {}",
                lang.t(Text::Process),
                lang.t(Text::Cancel)
            )));
        frame.render_widget(Clear, popup);
        frame.render_widget(body, popup);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let keys = match self.screen {
            Screen::Home => "q: quit | a: add | d: delete | enter: open | i: import | g: gallery | o: goal | l: language | s/e: dates",
            Screen::Workout => "esc: back | n: add | x: delete | 1-9/s: set | t/r: timer | p: rest | +/-: rest time | i: import | o: note | e/u/w/m/z/b: edit | f/X: photo",
            Screen::Gallery => "esc: back | a: add photo | x: remove | s: save to disk",
        };
        let text = match &self.status {
            Some(status) => format!("{}  |  {}", status, keys),
            None => keys.to_string(),
        };
        let footer = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }

    // Events

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.status = None;
            if self.input.is_some() {
                self.handle_input(key)?;
            } else {
                match self.screen {
                    Screen::Home => self.handle_home(key)?,
                    Screen::Workout => self.handle_workout(key)?,
                    Screen::Gallery => self.handle_gallery(key)?,
                }
            }
        }
        Ok(())
    }

    fn handle_home(&mut self, key: KeyEvent) -> Result<()> {
        let count = self.store.state().workouts.len();
        let selected = self.home.selected().and_then(|i| self.store.state().workouts.get(i)).map(|w| w.id.clone());
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => select_next(&mut self.home, count),
            KeyCode::Up | KeyCode::Char('k') => select_prev(&mut self.home),
            KeyCode::Char('a') => {
                self.store.dispatch(Action::AddWorkout)?;
                self.open_viewed();
            }
            KeyCode::Char('d') => {
                if let Some(workout_id) = selected {
                    self.store.dispatch(Action::DeleteWorkout { workout_id })?;
                    self.prune_timers();
                    let count = self.store.state().workouts.len();
                    self.home.select(if count == 0 { None } else { Some(self.home.selected().unwrap_or(0).min(count - 1)) });
                }
            }
            KeyCode::Enter => {
                if let Some(id) = selected {
                    self.store.dispatch(Action::ViewWorkout(Some(id)))?;
                    self.open_viewed();
                }
            }
            KeyCode::Char('i') => self.open_import(ImportTarget::NewWorkout),
            KeyCode::Char('g') => {
                self.screen = Screen::Gallery;
                let has_photos = !self.store.state().evolution_gallery.is_empty();
                self.photos.select(has_photos.then_some(0));
            }
            KeyCode::Char('o') => {
                let goals = TrainingGoal::all();
                let current = goals.iter().position(|g| *g == self.store.state().goal).unwrap_or(0);
                self.store.dispatch(Action::SetGoal(goals[(current + 1) % goals.len()]))?;
            }
            KeyCode::Char('l') => {
                let next = self.lang().next();
                self.store.dispatch(Action::SetLanguage(next))?;
            }
            KeyCode::Char('s') => self.input = Some((Field::StartDate, self.store.state().start_date.clone())),
            KeyCode::Char('e') => self.input = Some((Field::EndDate, self.store.state().end_date.clone())),
            _ => {}
        }
        Ok(())
    }

    fn handle_workout(&mut self, key: KeyEvent) -> Result<()> {
        let Some(workout) = self.viewed() else {
            self.screen = Screen::Home;
            return Ok(());
        };
        let workout_id = workout.id.clone();
        let count = workout.exercises.len();

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.store.dispatch(Action::ViewWorkout(None))?;
                self.screen = Screen::Home;
            }
            KeyCode::Down | KeyCode::Char('j') => select_next_row(&mut self.rows, count),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.rows.selected().unwrap_or(0);
                self.rows.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Char('n') => {
                self.store.dispatch(Action::AddExercise { workout_id })?;
                self.rows.select(Some(count));
            }
            KeyCode::Char('x') => {
                if let Some((workout_id, ex)) = self.selected_exercise() {
                    let exercise_id = ex.id.clone();
                    self.store.dispatch(Action::DeleteExercise { workout_id, exercise_id })?;
                    self.prune_timers();
                    let count = count.saturating_sub(1);
                    if count == 0 {
                        self.rows.select(None);
                    } else {
                        self.rows.select(Some(self.rows.selected().unwrap_or(0).min(count - 1)));
                    }
                }
            }
            KeyCode::Char(c @ '1'..='9') => self.click_set(c as u32 - '1' as u32)?,
            KeyCode::Char('s') => {
                if self.selected_exercise().is_some() {
                    self.input = Some((Field::SetMarker, String::new()));
                }
            }
            KeyCode::Char('t') => {
                if let Some((_, ex)) = self.selected_exercise() {
                    let id = ex.id.clone();
                    self.timers.row(&id).elapsed.toggle();
                }
            }
            KeyCode::Char('r') => {
                if let Some((_, ex)) = self.selected_exercise() {
                    let id = ex.id.clone();
                    self.timers.row(&id).elapsed.reset();
                }
            }
            KeyCode::Char('p') => {
                if let Some((_, ex)) = self.selected_exercise() {
                    let (id, rest_time) = (ex.id.clone(), ex.rest_time);
                    self.timers.row(&id).rest.toggle(rest_time);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('-') => {
                if let Some((workout_id, ex)) = self.selected_exercise() {
                    let rest = if key.code == KeyCode::Char('+') {
                        ex.rest_time.saturating_add(REST_STEP)
                    } else {
                        ex.rest_time.saturating_sub(REST_STEP)
                    };
                    let exercise_id = ex.id.clone();
                    self.store.dispatch(Action::UpdateExercise {
                        workout_id,
                        exercise_id,
                        patch: ExercisePatch { rest_time: Some(rest), ..Default::default() },
                    })?;
                }
            }
            KeyCode::Char('i') => self.open_import(ImportTarget::Workout(workout_id)),
            KeyCode::Char('o') => {
                let note = self.viewed().map(|w| w.general_observation.clone()).unwrap_or_default();
                self.input = Some((Field::WorkoutNote, note));
            }
            KeyCode::Char(c @ ('e' | 'u' | 'w' | 'm' | 'z' | 'b' | 'f')) => self.edit_exercise(c),
            KeyCode::Char('X') => {
                if let Some((workout_id, ex)) = self.selected_exercise() {
                    let exercise_id = ex.id.clone();
                    self.store.dispatch(Action::UpdateExercise {
                        workout_id,
                        exercise_id,
                        patch: ExercisePatch { photo: Some(None), ..Default::default() },
                    })?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Click set marker `index` of the selected exercise, arming its rest
    /// timer when progress went up without finishing the exercise
    fn click_set(&mut self, index: u32) -> Result<()> {
        let Some((workout_id, ex)) = self.selected_exercise() else {
            return Ok(());
        };
        let exercise_id = ex.id.clone();
        let rest_time = ex.rest_time;
        match self.store.toggle_set(&workout_id, &exercise_id, index)? {
            Some(toggle) if toggle.arm_rest => self.timers.row(&exercise_id).rest.start(rest_time),
            Some(_) => {}
            None => self.status = Some(format!("{} {}?", self.lang().t(Text::Sets), index + 1)),
        }
        Ok(())
    }

    /// Open the input box for one field of the selected exercise
    fn edit_exercise(&mut self, key: char) {
        let Some((_, ex)) = self.selected_exercise() else {
            return;
        };
        let (field, value) = match key {
            'e' => (Field::Name, ex.name.clone()),
            'u' => (Field::Reps, ex.reps.clone()),
            'w' => (Field::Weight, ex.weight.clone()),
            'm' => (Field::Rest, ex.rest_time.to_string()),
            'z' => (Field::Sets, ex.sets.to_string()),
            'b' => (Field::ExerciseNote, ex.observation.clone()),
            _ => (Field::ExercisePhoto, String::new()),
        };
        self.input = Some((field, value));
    }

    fn handle_gallery(&mut self, key: KeyEvent) -> Result<()> {
        let photos = &self.store.state().evolution_gallery;
        let count = photos.len();
        let selected = self.photos.selected().and_then(|i| photos.get(i)).cloned();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Home,
            KeyCode::Down | KeyCode::Char('j') => select_next(&mut self.photos, count),
            KeyCode::Up | KeyCode::Char('k') => select_prev(&mut self.photos),
            KeyCode::Char('a') => self.input = Some((Field::GalleryPhoto, String::new())),
            KeyCode::Char('x') => {
                if let Some(photo) = selected {
                    self.store.dispatch(Action::RemoveEvolutionPhoto { photo_id: photo.id })?;
                    let count = count - 1;
                    self.photos.select(if count == 0 { None } else { Some(self.photos.selected().unwrap_or(0).min(count - 1)) });
                }
            }
            KeyCode::Char('s') => {
                if let Some(photo) = selected {
                    self.status = Some(match gallery::export(&photo, &self.export_dir) {
                        Ok(path) => format!("{} → {}", self.lang().t(Text::Download), path.display()),
                        Err(e) => format!("{:#}", e),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_input(&mut self, key: KeyEvent) -> Result<()> {
        let Some((field, buffer)) = self.input.as_mut() else {
            return Ok(());
        };
        let field = *field;
        match key.code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => {
                self.input = None;
                if field == Field::ImportText {
                    self.imports.close();
                }
            }
            KeyCode::Enter if field == Field::ImportText => {
                let text = buffer.clone();
                self.submit_import(text);
            }
            KeyCode::Enter => {
                let value = buffer.clone();
                self.input = None;
                self.commit(field, value)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply a finished input line
    fn commit(&mut self, field: Field, value: String) -> Result<()> {
        match field {
            Field::WorkoutNote => {
                if let Some(w) = self.viewed() {
                    let workout_id = w.id.clone();
                    self.store.dispatch(Action::UpdateWorkoutObservation { workout_id, text: value })?;
                }
            }
            Field::GalleryPhoto => {
                let today = Local::now().date_naive();
                match gallery::capture(Path::new(value.trim()), self.lang(), today) {
                    Ok(photo) => {
                        self.store.dispatch(Action::AddEvolutionPhoto(photo))?;
                        self.photos.select(Some(0));
                    }
                    Err(e) => self.status = Some(format!("{:#}", e)),
                }
            }
            Field::StartDate => self.store.dispatch(Action::SetStartDate(value.trim().to_string()))?,
            Field::EndDate => self.store.dispatch(Action::SetEndDate(value.trim().to_string()))?,
            Field::ImportText => {}
            Field::SetMarker => match parse_seconds(&value).checked_sub(1) {
                Some(index) => self.click_set(index)?,
                None => self.status = Some(format!("{} {}?", self.lang().t(Text::Sets), value.trim())),
            },
            _ => {
                let Some((workout_id, ex)) = self.selected_exercise() else {
                    return Ok(());
                };
                let exercise_id = ex.id.clone();
                let mut patch = ExercisePatch::default();
                match field {
                    Field::Name => patch.name = Some(value),
                    Field::Reps => patch.reps = Some(value),
                    Field::Weight => patch.weight = Some(value),
                    Field::ExerciseNote => patch.observation = Some(value),
                    Field::Rest => patch.rest_time = Some(parse_seconds(&value)),
                    Field::Sets => patch.sets = Some(parse_seconds(&value)),
                    Field::ExercisePhoto => match gallery::data_url_from_file(Path::new(value.trim())) {
                        Ok(url) => patch.photo = Some(Some(url)),
                        Err(e) => {
                            self.status = Some(format!("{:#}", e));
                            return Ok(());
                        }
                    },
                    _ => {}
                }
                self.store.dispatch(Action::UpdateExercise { workout_id, exercise_id, patch })?;
            }
        }
        Ok(())
    }

    // Import

    fn open_import(&mut self, target: ImportTarget) {
        self.imports.open(target);
        self.input = Some((Field::ImportText, String::new()));
    }

    fn submit_import(&mut self, text: String) {
        let Some(ticket) = self.imports.submit(&text) else {
            return;
        };
        info!("Submitting {} characters for import", text.len());
        let parser = self.parser.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let candidates = parser.parse(&text).await;
            let _ = tx.send((ticket, candidates));
        });
    }

    fn collect_imports(&mut self) -> Result<()> {
        while let Ok((ticket, candidates)) = self.results_rx.try_recv() {
            let Some(target) = self.imports.complete(ticket) else {
                warn!("Discarding import result for a closed dialog");
                continue;
            };
            self.input = None;
            if candidates.is_empty() {
                self.status = Some(self.lang().t(Text::NothingImported).to_string());
                continue;
            }
            let workout_id = target.workout_id();
            self.store.dispatch(Action::ImportExercises { workout_id: workout_id.clone(), candidates })?;
            if workout_id.is_none() {
                self.open_viewed();
            }
        }
        Ok(())
    }

    fn open_viewed(&mut self) {
        if let Some(index) = self
            .viewed()
            .and_then(|v| self.store.state().workouts.iter().position(|w| w.id == v.id))
        {
            self.home.select(Some(index));
            self.screen = Screen::Workout;
            let has_rows = self.viewed().is_some_and(|w| !w.exercises.is_empty());
            self.rows.select(has_rows.then_some(0));
        }
    }
}

fn select_next(state: &mut ListState, count: usize) {
    if count == 0 {
        return;
    }
    let i = state.selected().map_or(0, |i| (i + 1).min(count - 1));
    state.select(Some(i));
}

fn select_prev(state: &mut ListState) {
    let i = state.selected().unwrap_or(0);
    state.select(Some(i.saturating_sub(1)));
}

fn select_next_row(state: &mut TableState, count: usize) {
    if count == 0 {
        return;
    }
    let i = state.selected().map_or(0, |i| (i + 1).min(count - 1));
    state.select(Some(i));
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height: height.min(area.height),
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use crate::import::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
    use crate::storage::STATE_KEY;

    fn press(app: &mut App, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        if app.input.is_some() {
            app.handle_input(key).unwrap();
        } else {
            app.handle_workout(key).unwrap();
        }
    }

    fn app_with_exercise(sets: u32) -> (App, PathBuf) {
        let dir = std::env::temp_dir().join(format!("gympro-tui-{}", uuid::Uuid::new_v4()));
        let mut store = Store::open(FileStorage::open(&dir).unwrap(), STATE_KEY).unwrap();
        store.dispatch(Action::AddWorkout).unwrap();
        let workout_id = store.state().workouts[0].id.clone();
        store.dispatch(Action::AddExercise { workout_id: workout_id.clone() }).unwrap();
        let exercise_id = store.state().workouts[0].exercises[0].id.clone();
        store
            .dispatch(Action::UpdateExercise {
                workout_id,
                exercise_id,
                patch: ExercisePatch { sets: Some(sets), ..Default::default() },
            })
            .unwrap();

        let parser = GeminiParser::new(DEFAULT_API_BASE, DEFAULT_MODEL, None).unwrap();
        let mut app = App::new(store, parser, dir.clone());
        app.open_viewed();
        (app, dir)
    }

    fn exercise(app: &App) -> &Exercise {
        &app.store.state().workouts[0].exercises[0]
    }

    #[test]
    fn test_marker_past_nine_is_reachable() {
        let (mut app, dir) = app_with_exercise(12);
        assert_eq!(app.screen, Screen::Workout);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);

        assert!(app.input.is_none());
        assert_eq!(exercise(&app).completed_sets, 11);
        assert!(!exercise(&app).is_completed);
        let id = exercise(&app).id.clone();
        assert!(app.timers.get(&id).rest.is_resting());

        press(&mut app, KeyCode::Char('s'));
        for c in "12".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(exercise(&app).is_completed);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_digit_keys_click_markers() {
        let (mut app, dir) = app_with_exercise(3);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(exercise(&app).completed_sets, 2);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('9'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(exercise(&app).completed_sets, 2);
        assert!(app.status.is_some());

        std::fs::remove_dir_all(&dir).ok();
    }
}
