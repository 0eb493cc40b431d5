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
use async_openai::error::OpenAIError;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = TilerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TilerError {
    #[error("Cannot read API key from {}: {source}", .path.display())]
    MissingCredential {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("API key file {} is empty", .0.display())]
    EmptyCredential(PathBuf),
    #[error("Unable to parse configuration file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("OpenAI request failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("Invalid image response from {url}: status {status}, content type {content_type:?}")]
    InvalidImage {
        url: String,
        status: StatusCode,
        content_type: Option<String>,
    },
    #[error("Empty response: {0}")]
    EmptyResponse(&'static str),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Sentence pool is exhausted")]
    PoolExhausted,
    #[error("Tile {width}x{height} at ({x}, {y}) does not fit in a {canvas}x{canvas} canvas")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        canvas: u32,
    },
    #[error("Anchor image failed ({source}); unused sentences: {remaining:?}")]
    Anchor {
        #[source]
        source: Box<TilerError>,
        remaining: Vec<String>,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TilerError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TilerError::Api(OpenAIError::Reqwest(_)) => true,
            TilerError::Download(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            TilerError::InvalidImage { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(status: StatusCode) -> TilerError {
        TilerError::InvalidImage {
            url: "http://localhost/x.png".to_string(),
            status,
            content_type: None,
        }
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(invalid(StatusCode::BAD_GATEWAY).is_transient());
        assert!(invalid(StatusCode::TOO_MANY_REQUESTS).is_transient());
    }

    #[test]
    fn client_errors_are_fatal() {
        assert!(!invalid(StatusCode::NOT_FOUND).is_transient());
        assert!(!invalid(StatusCode::OK).is_transient());
        assert!(!TilerError::PoolExhausted.is_transient());
        assert!(!TilerError::EmptyResponse("choices").is_transient());
    }

    #[test]
    fn anchor_error_lists_remaining() {
        let err = TilerError::Anchor {
            source: Box::new(invalid(StatusCode::NOT_FOUND)),
            remaining: vec!["A quiet pantry.".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("A quiet pantry."));
    }
}
