mod logging;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use logging::init_logging;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("input is neither JSON ({json}) nor TOML ({toml})")]
    Parse {
        json: serde_json::Error,
        toml: toml::de::Error,
    },
    #[error("failed to deserialize input: {0}")]
    Input(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unrecognized log level {0:?}")]
    LogLevel(String),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("no input on stdin")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, RunnerError>;

/// A single model run: the parsed `input` section, the seed and replicate
/// number lifted out of it, and where tabular output should go.
pub struct Environment<I = ()> {
    input_json: serde_json::Map<String, Value>,
    pub input: Option<I>,
    pub seed: u64,
    pub replicate: u64,
    pub log_level: LevelFilter,
    output: Value,
}

impl Environment {
    pub fn from_json(data: Value) -> Result<Self> {
        let mut input_json = data
            .get("input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let seed = input_json
            .remove("seed")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let replicate = input_json
            .remove("replicate")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let log_level = match input_json.remove("log_level") {
            Some(Value::String(level)) => {
                LevelFilter::from_str(&level).map_err(|_| RunnerError::LogLevel(level))?
            }
            Some(other) => return Err(RunnerError::LogLevel(other.to_string())),
            None => LevelFilter::Info,
        };

        let output = data.get("output").cloned().unwrap_or(Value::Null);

        Ok(Self {
            input_json,
            input: None,
            seed,
            replicate,
            log_level,
            output,
        })
    }

    /// Parses a run document. JSON is tried first; anything that is not JSON
    /// is read as TOML with the same `[input]` / `[output]` layout.
    pub fn from_document(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(RunnerError::EmptyInput);
        }
        let data = match serde_json::from_str::<Value>(raw) {
            Ok(data) => data,
            Err(json) => {
                let table = toml::from_str::<toml::Table>(raw)
                    .map_err(|toml| RunnerError::Parse { json, toml })?;
                serde_json::to_value(table)?
            }
        };
        Self::from_json(data)
    }

    pub fn from_stdin() -> Result<Self> {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        Self::from_document(&raw)
    }

    pub fn with_input_type<I: DeserializeOwned>(self) -> Result<Environment<I>> {
        let input_value = Value::Object(self.input_json.clone());
        let input = serde_json::from_value(input_value)?;
        Ok(Environment {
            input_json: self.input_json,
            input: Some(input),
            seed: self.seed,
            replicate: self.replicate,
            log_level: self.log_level,
            output: self.output,
        })
    }
}

impl<I: DeserializeOwned> Environment<I> {
    pub fn load() -> Result<Self> {
        Environment::from_stdin()?.with_input_type::<I>()
    }
}

impl<I> Environment<I> {
    pub fn input_json(&self) -> &serde_json::Map<String, Value> {
        &self.input_json
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        // Check flat output
        if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return output
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        // Check profiled output, preferring the default profile
        let profile = output
            .get("profile")
            .and_then(|v| v.as_object())
            .and_then(|profiles| profiles.get("default").or_else(|| profiles.values().next()))?;
        if profile.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return profile
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        None
    }

    /// Writes one table as CSV. The header row comes from the field names of
    /// `R`, so every row type doubles as the table's column schema.
    pub fn write_table<R: Serialize>(&self, filename: &str, rows: &[R]) -> Result<()> {
        if let Some(dir) = self.output_dir() {
            fs::create_dir_all(&dir)?;
            let file = fs::File::create(dir.join(filename))?;
            write_rows(csv::Writer::from_writer(file), rows)
        } else {
            write_rows(csv::Writer::from_writer(io::stdout()), rows)
        }
    }
}

fn write_rows<W: Write, R: Serialize>(mut wtr: csv::Writer<W>, rows: &[R]) -> Result<()> {
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
