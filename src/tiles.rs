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
use crate::canvas::Canvas;
use crate::error::{Result, TilerError};
use crate::pool::SentencePool;
use crate::studio::Studio;
use image::ImageFormat;
use rand::Rng;
use std::path::PathBuf;

/// Top-left corners of the edited tiles, in edit order.
///
/// Laid out for 512px tiles on a 2048px canvas whose center holds the anchor
/// at (768, 768): first the eight half-overlapping neighbours of the anchor,
/// then an outer ring of twelve.
pub const TILE_OFFSETS: [(u32, u32); 20] = [
    (512, 512),
    (768, 512),
    (1024, 512),
    (1024, 768),
    (1024, 1024),
    (768, 1024),
    (512, 1024),
    (512, 768),
    (512, 256),
    (768, 256),
    (1024, 256),
    (1280, 512),
    (1280, 768),
    (1280, 1024),
    (1024, 1280),
    (768, 1280),
    (512, 1280),
    (256, 1024),
    (256, 768),
    (256, 512),
];

pub struct TileFiles {
    pub tile_size: u32,
    /// scratch crop, sent as image and mask
    pub tmp_path: PathBuf,
    /// composite, rewritten after each edit
    pub base_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub tiles_done: usize,
    pub pool_exhausted: bool,
}

/// Crops, edits and pastes back every tile of [`TILE_OFFSETS`] in order.
///
/// Stops early, without error, when the sentence pool runs dry. Any other
/// failure aborts; the composite saved after the last good tile stays on disk.
pub async fn expand<S, R>(
    studio: &S,
    canvas: &mut Canvas,
    pool: &mut SentencePool,
    rng: &mut R,
    files: &TileFiles,
) -> Result<Expansion>
where
    S: Studio + ?Sized,
    R: Rng,
{
    let total = TILE_OFFSETS.len();
    for (i, &(x, y)) in TILE_OFFSETS.iter().enumerate() {
        let prompt = match pool.draw(rng) {
            Ok(prompt) => prompt,
            Err(TilerError::PoolExhausted) => {
                log::warn!("Out of sentences after {i} of {total} tiles");
                return Ok(Expansion {
                    tiles_done: i,
                    pool_exhausted: true,
                });
            }
            Err(err) => return Err(err),
        };
        log::info!("Tile {}/{total} at ({x}, {y}): {prompt}", i + 1);
        let crop = canvas.crop(x, y, files.tile_size)?;
        crop.save_with_format(&files.tmp_path, ImageFormat::Png)?;
        let edited = studio.edit(&files.tmp_path, &prompt).await?;
        canvas.paste(x, y, &edited)?;
        canvas.save(&files.base_path)?;
        log::debug!("Saved {}", files.base_path.display());
    }
    Ok(Expansion {
        tiles_done: total,
        pool_exhausted: false,
    })
}
