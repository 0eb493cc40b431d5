/**************************************************************************
  Copyright 2026 Francesco Versaci (https://github.com/fversaci/)

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
**************************************************************************/
use crate::error::{Result, TilerError};
use crate::retry::RetryPolicy;
use crate::tiles::TILE_OFFSETS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONF: &str = "conf/defaults.toml";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Plain-text file holding the OpenAI API key
    pub key_file: PathBuf,
    pub text_model: String,
    pub image_model: String,
    pub edit_model: String,
    /// Sentences requested from the text model: one anchor plus one per tile
    pub sentence_count: usize,
    pub output_dir: PathBuf,
    pub canvas_size: u32,
    pub tile_size: u32,
    pub retry: RetryConf,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConf {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            key_file: PathBuf::from(".OPENAI_API_KEY"),
            text_model: "gpt-4".to_string(),
            image_model: "dall-e-2".to_string(),
            edit_model: "dall-e-2".to_string(),
            sentence_count: TILE_OFFSETS.len() + 1,
            output_dir: PathBuf::from("img"),
            canvas_size: 2048,
            tile_size: 512,
            retry: RetryConf::default(),
        }
    }
}

impl Default for RetryConf {
    fn default() -> Self {
        RetryConf {
            max_attempts: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 16000,
        }
    }
}

impl RetryConf {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
    }
}

impl Settings {
    /// Reads the configuration file, falling back to defaults when it does not exist.
    pub fn load(fname: &Path) -> Result<Self> {
        let conf_txt = match fs::read_to_string(fname) {
            Ok(txt) => txt,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("No configuration at {}, using defaults", fname.display());
                return Ok(Settings::default());
            }
            Err(err) => return Err(err.into()),
        };
        let settings: Settings = toml::from_str(&conf_txt).map_err(|source| TilerError::Config {
            path: fname.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Every tile offset must fit inside the canvas.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 || self.tile_size > self.canvas_size {
            return Err(TilerError::InvalidSettings(format!(
                "tile size {} must be in 1..={}",
                self.tile_size, self.canvas_size
            )));
        }
        let overflows = |pos: u32| {
            pos.checked_add(self.tile_size)
                .map_or(true, |end| end > self.canvas_size)
        };
        for &(x, y) in TILE_OFFSETS.iter() {
            if overflows(x) || overflows(y) {
                return Err(TilerError::InvalidSettings(format!(
                    "tile at ({x}, {y}) overflows a {} canvas",
                    self.canvas_size
                )));
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(TilerError::InvalidSettings(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tmp_path(&self) -> PathBuf {
        self.output_dir.join("tmp.png")
    }

    pub fn base_path(&self) -> PathBuf {
        self.output_dir.join("base.png")
    }

    pub fn api_key(&self) -> Result<String> {
        read_api_key(&self.key_file)
    }
}

/// Logs at info level unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

pub fn read_api_key(fname: &Path) -> Result<String> {
    let key = fs::read_to_string(fname).map_err(|source| TilerError::MissingCredential {
        path: fname.to_path_buf(),
        source,
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(TilerError::EmptyCredential(fname.to_path_buf()));
    }
    Ok(key.to_string())
}
