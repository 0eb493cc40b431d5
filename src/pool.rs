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
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Scene descriptions waiting to be turned into images.
///
/// Each draw removes the chosen sentence, so no description is used twice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentencePool {
    sentences: Vec<String>,
}

impl SentencePool {
    pub fn new(sentences: Vec<String>) -> Self {
        SentencePool { sentences }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Removes and returns a uniformly chosen sentence.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Result<String> {
        if self.sentences.is_empty() {
            return Err(TilerError::PoolExhausted);
        }
        let idx = rng.gen_range(0..self.sentences.len());
        Ok(self.sentences.remove(idx))
    }

    pub fn remaining(&self) -> &[String] {
        &self.sentences
    }

    pub fn into_remaining(self) -> Vec<String> {
        self.sentences
    }

    /// Loads a pool saved as a JSON array of strings.
    pub fn load(fname: &Path) -> Result<Self> {
        let txt = fs::read_to_string(fname)?;
        Ok(serde_json::from_str(&txt)?)
    }

    pub fn save(&self, fname: &Path) -> Result<()> {
        fs::write(fname, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl From<Vec<String>> for SentencePool {
    fn from(sentences: Vec<String>) -> Self {
        SentencePool::new(sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> SentencePool {
        (0..n).map(|i| format!("Scene {i}.")).collect::<Vec<_>>().into()
    }

    #[test]
    fn draws_shrink_by_one_and_never_repeat() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = pool(10);
        let mut seen = HashSet::new();
        for left in (0..10).rev() {
            let s = pool.draw(&mut rng).unwrap();
            assert!(seen.insert(s));
            assert_eq!(pool.len(), left);
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn empty_pool_reports_exhaustion() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pool = pool(1);
        pool.draw(&mut rng).unwrap();
        assert!(matches!(pool.draw(&mut rng), Err(TilerError::PoolExhausted)));
        assert!(matches!(pool.draw(&mut rng), Err(TilerError::PoolExhausted)));
    }

    #[test]
    fn remaining_keeps_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pool = pool(5);
        let taken = pool.draw(&mut rng).unwrap();
        let expected: Vec<String> = (0..5)
            .map(|i| format!("Scene {i}."))
            .filter(|s| *s != taken)
            .collect();
        assert_eq!(pool.remaining(), expected.as_slice());
    }

    #[test]
    fn same_seed_same_draws() {
        let draw_all = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pool = pool(6);
            (0..6)
                .map(|_| pool.draw(&mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw_all(42), draw_all(42));
    }

    #[test]
    fn json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("sentences.json");
        fs::write(&fname, r#"["One scene.", "Another scene."]"#).unwrap();
        let pool = SentencePool::load(&fname).unwrap();
        assert_eq!(pool.remaining(), ["One scene.", "Another scene."]);
        pool.save(&fname).unwrap();
        assert_eq!(SentencePool::load(&fname).unwrap(), pool);
    }
}
