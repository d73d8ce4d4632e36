//! Interface strings in Portuguese, English and Spanish

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::model::TrainingGoal;

#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Pt,
    En,
    Es,
}

/// Translatable labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Title,
    Goal,
    StartDate,
    EndDate,
    AddWorkout,
    ImportText,
    PasteTextPrompt,
    Cancel,
    Process,
    Processing,
    Workout,
    Observation,
    Rest,
    Sets,
    Completed,
    Photo,
    Timer,
    Language,
    NoWorkouts,
    NoExercises,
    Gallery,
    Evolution,
    Download,
    NoPhotos,
    NothingImported,
    NewExercise,
    Exercise,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Next language in the pt → en → es cycle
    pub fn next(&self) -> Self {
        match self {
            Language::Pt => Language::En,
            Language::En => Language::Es,
            Language::Es => Language::Pt,
        }
    }

    /// Capture-date label: dd/mm/yyyy in Portuguese, m/d/yyyy otherwise
    pub fn format_date(&self, date: NaiveDate) -> String {
        match self {
            Language::Pt => date.format("%d/%m/%Y").to_string(),
            Language::En | Language::Es => date.format("%-m/%-d/%Y").to_string(),
        }
    }

    pub fn goal(&self, goal: TrainingGoal) -> &'static str {
        match (self, goal) {
            (Language::Pt, TrainingGoal::Bodybuilding) => "Fisiculturismo",
            (Language::Pt, TrainingGoal::Hypertrophy) => "Hipertrofia",
            (Language::Pt, TrainingGoal::Resistance) => "Resistência",
            (Language::En, TrainingGoal::Bodybuilding) => "Bodybuilding",
            (Language::En, TrainingGoal::Hypertrophy) => "Hypertrophy",
            (Language::En, TrainingGoal::Resistance) => "Endurance",
            (Language::Es, TrainingGoal::Bodybuilding) => "Culturismo",
            (Language::Es, TrainingGoal::Hypertrophy) => "Hipertrofia",
            (Language::Es, TrainingGoal::Resistance) => "Resistencia",
        }
    }

    pub fn t(&self, key: Text) -> &'static str {
        match self {
            Language::Pt => pt(key),
            Language::En => en(key),
            Language::Es => es(key),
        }
    }
}

fn pt(key: Text) -> &'static str {
    match key {
        Text::Title => "GymPro",
        Text::Goal => "Objetivo",
        Text::StartDate => "Início",
        Text::EndDate => "Fim",
        Text::AddWorkout => "Adicionar treino",
        Text::ImportText => "Importar texto",
        Text::PasteTextPrompt => "Cole o texto do seu treino",
        Text::Cancel => "Cancelar",
        Text::Process => "Processar",
        Text::Processing => "Processando...",
        Text::Workout => "Treino",
        Text::Observation => "Observação",
        Text::Rest => "Descanso",
        Text::Sets => "Séries",
        Text::Completed => "Concluído",
        Text::Photo => "Foto",
        Text::Timer => "Tempo",
        Text::Language => "Idioma",
        Text::NoWorkouts => "Nenhum treino ainda. Adicione um ou importe um texto.",
        Text::NoExercises => "Nenhum exercício ainda.",
        Text::Gallery => "Galeria",
        Text::Evolution => "Evolução",
        Text::Download => "Baixar",
        Text::NoPhotos => "Nenhuma foto de evolução.",
        Text::NothingImported => "Nenhum exercício foi importado.",
        Text::NewExercise => "Novo Exercício",
        Text::Exercise => "Exercício",
    }
}

fn en(key: Text) -> &'static str {
    match key {
        Text::Title => "GymPro",
        Text::Goal => "Goal",
        Text::StartDate => "Start",
        Text::EndDate => "End",
        Text::AddWorkout => "Add workout",
        Text::ImportText => "Import text",
        Text::PasteTextPrompt => "Paste your workout text",
        Text::Cancel => "Cancel",
        Text::Process => "Process",
        Text::Processing => "Processing...",
        Text::Workout => "Workout",
        Text::Observation => "Note",
        Text::Rest => "Rest",
        Text::Sets => "Sets",
        Text::Completed => "Completed",
        Text::Photo => "Photo",
        Text::Timer => "Timer",
        Text::Language => "Language",
        Text::NoWorkouts => "No workouts yet. Add one or import some text.",
        Text::NoExercises => "No exercises yet.",
        Text::Gallery => "Gallery",
        Text::Evolution => "Evolution",
        Text::Download => "Download",
        Text::NoPhotos => "No progress photos.",
        Text::NothingImported => "No exercises were imported.",
        Text::NewExercise => "New Exercise",
        Text::Exercise => "Exercise",
    }
}

fn es(key: Text) -> &'static str {
    match key {
        Text::Title => "GymPro",
        Text::Goal => "Objetivo",
        Text::StartDate => "Inicio",
        Text::EndDate => "Fin",
        Text::AddWorkout => "Añadir entrenamiento",
        Text::ImportText => "Importar texto",
        Text::PasteTextPrompt => "Pega el texto de tu entrenamiento",
        Text::Cancel => "Cancelar",
        Text::Process => "Procesar",
        Text::Processing => "Procesando...",
        Text::Workout => "Entrenamiento",
        Text::Observation => "Observación",
        Text::Rest => "Descanso",
        Text::Sets => "Series",
        Text::Completed => "Completado",
        Text::Photo => "Foto",
        Text::Timer => "Tiempo",
        Text::Language => "Idioma",
        Text::NoWorkouts => "Aún no hay entrenamientos. Añade uno o importa un texto.",
        Text::NoExercises => "Aún no hay ejercicios.",
        Text::Gallery => "Galería",
        Text::Evolution => "Evolución",
        Text::Download => "Descargar",
        Text::NoPhotos => "No hay fotos de evolución.",
        Text::NothingImported => "No se importó ningún ejercicio.",
        Text::NewExercise => "Nuevo Ejercicio",
        Text::Exercise => "Ejercicio",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_cycle_and_codes() {
        assert_eq!(Language::Pt.next(), Language::En);
        assert_eq!(Language::En.next(), Language::Es);
        assert_eq!(Language::Es.next(), Language::Pt);
        assert_eq!(Language::Es.code(), "es");
        assert_eq!(serde_json::to_value(Language::En).unwrap(), "en");
    }

    #[test]
    fn test_date_formats() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(Language::Pt.format_date(date), "07/03/2026");
        assert_eq!(Language::En.format_date(date), "3/7/2026");
        assert_eq!(Language::Es.format_date(date), "3/7/2026");
    }

    #[test]
    fn test_default_exercise_names() {
        assert_eq!(Language::Pt.t(Text::NewExercise), "Novo Exercício");
        assert_eq!(Language::Pt.t(Text::Exercise), "Exercício");
        assert_eq!(Language::En.t(Text::Exercise), "Exercise");
    }
}
