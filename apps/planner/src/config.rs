use std::{fs, path::Path, time::Duration};

use planner_core::{Endpoints, RestOptions, StudentSession, MAX_PROGRAM_SEMESTERS};
use serde::Deserialize;
use shared::domain::{Semester, StudentId};
use tracing::warn;

pub const SETTINGS_FILE: &str = "planner.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub endpoints: Endpoints,
    pub student_id: i64,
    pub current_semester: u32,
    pub total_semesters: u32,
    pub reference_semester: Option<Semester>,
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080/api".into(),
            api_key: None,
            endpoints: Endpoints::default(),
            student_id: 1,
            current_semester: 1,
            total_semesters: 6,
            reference_semester: None,
            fetch_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn session(&self) -> StudentSession {
        StudentSession {
            student_id: StudentId(self.student_id),
            current_semester: self.current_semester,
            total_semesters: self.total_semesters,
        }
    }

    pub fn rest_options(&self) -> RestOptions {
        RestOptions {
            api_key: self.api_key.clone(),
            timeout: self.fetch_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    api_key: Option<String>,
    student_id: Option<i64>,
    current_semester: Option<u32>,
    total_semesters: Option<u32>,
    reference_semester: Option<Semester>,
    fetch_timeout_secs: Option<u64>,
    #[serde(default)]
    endpoints: FileEndpoints,
}

#[derive(Debug, Default, Deserialize)]
struct FileEndpoints {
    course: Option<String>,
    result_view: Option<String>,
    student_course_execution: Option<String>,
    planning: Option<String>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, overlaid by the settings file at `path` (if readable), overlaid
/// by environment variables resolved through `env`.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), "ignoring unreadable settings file: {err}"),
        }
    }

    for key in ["PLANNER_API_URL", "APP__API_URL"] {
        if let Some(v) = env(key) {
            settings.api_url = v;
        }
    }
    if let Some(v) = env("PLANNER_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = parsed_env(&env, "PLANNER_STUDENT_ID") {
        settings.student_id = v;
    }
    if let Some(v) = parsed_env(&env, "PLANNER_CURRENT_SEMESTER")
        .and_then(|v| within_program("PLANNER_CURRENT_SEMESTER", v))
    {
        settings.current_semester = v;
    }
    if let Some(v) = parsed_env(&env, "PLANNER_TOTAL_SEMESTERS")
        .and_then(|v| within_program("PLANNER_TOTAL_SEMESTERS", v))
    {
        settings.total_semesters = v;
    }
    if let Some(v) = parsed_env(&env, "PLANNER_REFERENCE_SEMESTER") {
        settings.reference_semester = Some(v);
    }
    if let Some(v) = parsed_env(&env, "PLANNER_FETCH_TIMEOUT_SECS") {
        settings.fetch_timeout_secs = Some(v);
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if file_cfg.api_key.is_some() {
        settings.api_key = file_cfg.api_key;
    }
    if let Some(v) = file_cfg.student_id {
        settings.student_id = v;
    }
    if let Some(v) = file_cfg
        .current_semester
        .and_then(|v| within_program("current_semester", v))
    {
        settings.current_semester = v;
    }
    if let Some(v) = file_cfg
        .total_semesters
        .and_then(|v| within_program("total_semesters", v))
    {
        settings.total_semesters = v;
    }
    if file_cfg.reference_semester.is_some() {
        settings.reference_semester = file_cfg.reference_semester;
    }
    if file_cfg.fetch_timeout_secs.is_some() {
        settings.fetch_timeout_secs = file_cfg.fetch_timeout_secs;
    }

    let endpoints = file_cfg.endpoints;
    if let Some(v) = endpoints.course {
        settings.endpoints.course = v;
    }
    if let Some(v) = endpoints.result_view {
        settings.endpoints.result_view = v;
    }
    if let Some(v) = endpoints.student_course_execution {
        settings.endpoints.student_course_execution = v;
    }
    if let Some(v) = endpoints.planning {
        settings.endpoints.planning = v;
    }
}

fn parsed_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = env(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

fn within_program(key: &str, value: u32) -> Option<u32> {
    if value > MAX_PROGRAM_SEMESTERS {
        warn!(key, value, max = MAX_PROGRAM_SEMESTERS, "ignoring out-of-range semester count");
        return None;
    }
    Some(value)
}
