//! Persona profile: who the assistant speaks as.
//!
//! The profile feeds three places: the instruction block of the prompt, the
//! third-to-first-person rewrite rules, and the canned intent answers.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::NormalizerError;

/// Fields missing from a YAML file stay empty; they do not fall back to the
/// built-in profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    #[serde(default)]
    pub full_name: String,
    /// Derived from `full_name` when left empty.
    #[serde(default)]
    pub first_name: String,
    /// One-line self description, e.g. "a backend engineer who ...".
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub clients: Vec<String>,
}

impl Default for PersonaProfile {
    fn default() -> Self {
        Self {
            full_name: "Alex Morgan".into(),
            first_name: "Alex".into(),
            headline: "a software engineer who builds reliable backend systems and developer tools"
                .into(),
            role: "a senior backend engineer".into(),
            location: "Lisbon, Portugal".into(),
            education: "a BSc in Computer Science from the University of Porto".into(),
            skills: vec![
                "Rust".into(),
                "Go".into(),
                "PostgreSQL".into(),
                "Kubernetes".into(),
                "Distributed systems design".into(),
            ],
            projects: vec![
                "A streaming ingestion service processing billions of events per day".into(),
                "An open-source CLI for reproducible local development environments".into(),
                "A retrieval-augmented chat assistant that answers questions about my work".into(),
            ],
            clients: vec![
                "a European fintech scale-up".into(),
                "a logistics platform".into(),
                "several early-stage startups".into(),
            ],
        }
    }
}

impl PersonaProfile {
    /// Parses a YAML profile and fills derived fields.
    ///
    /// # Errors
    /// [`NormalizerError::Yaml`] on malformed YAML, [`NormalizerError::Persona`]
    /// when no name is given.
    pub fn from_yaml_str(s: &str) -> Result<Self, NormalizerError> {
        let mut p: PersonaProfile = serde_yml::from_str(s)?;
        p.fill_derived();
        p.validate()?;
        Ok(p)
    }

    /// Reads a YAML profile from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NormalizerError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let p = Self::from_yaml_str(&raw)?;
        info!(path = %path.as_ref().display(), name = %p.full_name, "persona profile loaded");
        Ok(p)
    }

    /// Loads `PERSONA_FILE` when set, otherwise the built-in profile.
    pub fn from_env() -> Result<Self, NormalizerError> {
        match std::env::var("PERSONA_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => {
                info!("PERSONA_FILE not set; using built-in persona profile");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), NormalizerError> {
        if self.full_name.trim().is_empty() {
            return Err(NormalizerError::Persona("full_name must not be empty".into()));
        }
        if self.first_name.trim().is_empty() {
            return Err(NormalizerError::Persona("first_name must not be empty".into()));
        }
        Ok(())
    }

    fn fill_derived(&mut self) {
        self.full_name = self.full_name.trim().to_string();
        if self.first_name.trim().is_empty() {
            self.first_name = self
                .full_name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
        }
    }
}
