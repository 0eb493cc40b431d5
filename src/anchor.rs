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
use crate::pool::SentencePool;
use crate::studio::Studio;
use image::DynamicImage;
use rand::Rng;

/// Draws one sentence and turns it into the anchor image.
///
/// A failed generation is wrapped in [`TilerError::Anchor`] together with the
/// sentences that were never used.
pub async fn generate_anchor<S, R>(
    studio: &S,
    pool: &mut SentencePool,
    rng: &mut R,
) -> Result<DynamicImage>
where
    S: Studio + ?Sized,
    R: Rng,
{
    let prompt = pool.draw(rng)?;
    log::info!("Anchor: {prompt}");
    match studio.generate(&prompt).await {
        Ok(anchor) => {
            log::info!("Anchor is {}x{}", anchor.width(), anchor.height());
            Ok(anchor)
        }
        Err(err) => Err(TilerError::Anchor {
            source: Box::new(err),
            remaining: pool.remaining().to_vec(),
        }),
    }
}
