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
use crate::anchor::generate_anchor;
use crate::canvas::Canvas;
use crate::conf::Settings;
use crate::error::{Result, TilerError};
use crate::pool::SentencePool;
use crate::studio::Studio;
use crate::tiles::{expand, TileFiles};
use rand::Rng;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Report {
    pub anchor_offset: (u32, u32),
    pub tiles_done: usize,
    pub pool_exhausted: bool,
    /// Regions pasted on the canvas, anchor included
    pub writes: usize,
    pub remaining: Vec<String>,
    pub output: PathBuf,
}

/// Anchor, center, expand: builds the composite from an already described pool.
pub async fn compose<S, R>(
    studio: &S,
    settings: &Settings,
    mut pool: SentencePool,
    rng: &mut R,
) -> Result<Report>
where
    S: Studio + ?Sized,
    R: Rng,
{
    fs::create_dir_all(&settings.output_dir)?;
    let files = TileFiles {
        tile_size: settings.tile_size,
        tmp_path: settings.tmp_path(),
        base_path: settings.base_path(),
    };

    let anchor = generate_anchor(studio, &mut pool, rng).await?;
    let mut canvas = Canvas::new(settings.canvas_size);
    let anchor_offset = canvas.center(&anchor)?;
    canvas.save(&files.base_path)?;
    log::info!(
        "Anchor centered at {anchor_offset:?}, saved {}",
        files.base_path.display()
    );

    let expansion = expand(studio, &mut canvas, &mut pool, rng, &files).await?;
    Ok(Report {
        anchor_offset,
        tiles_done: expansion.tiles_done,
        pool_exhausted: expansion.pool_exhausted,
        writes: canvas.writes(),
        remaining: pool.into_remaining(),
        output: files.base_path,
    })
}

/// Lists the sentences an anchor failure left unused. Returns false, writing
/// nothing, for any other error.
pub fn report_unused<W: Write>(out: &mut W, err: &TilerError) -> std::io::Result<bool> {
    let TilerError::Anchor { remaining, .. } = err else {
        return Ok(false);
    };
    writeln!(out, "Unused sentences:")?;
    for sentence in remaining {
        writeln!(out, "  {sentence}")?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_failure_lists_sentences() {
        let err = TilerError::Anchor {
            source: Box::new(TilerError::EmptyResponse("image data")),
            remaining: vec!["A quiet pantry.".to_string(), "Steam rises.".to_string()],
        };
        let mut out = Vec::new();
        assert!(report_unused(&mut out, &err).unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Unused sentences:\n  A quiet pantry.\n  Steam rises.\n"
        );
    }

    #[test]
    fn other_errors_print_nothing() {
        let mut out = Vec::new();
        assert!(!report_unused(&mut out, &TilerError::PoolExhausted).unwrap());
        assert!(out.is_empty());
    }
}
