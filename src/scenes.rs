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
use crate::error::Result;
use crate::studio::Studio;
use regex::Regex;
use std::sync::OnceLock;

pub const SYSTEM_MSG: &str = "You are very visual when describing things.";

pub fn scene_request(theme: &str, count: usize) -> String {
    format!("Write {count} sentences each describing a different scene about {theme}")
}

/// Asks the text model for `count` scene descriptions about `theme`.
///
/// The number of returned sentences is not checked: the model may answer
/// with more or fewer than requested.
pub async fn describe<S: Studio + ?Sized>(
    studio: &S,
    theme: &str,
    count: usize,
) -> Result<Vec<String>> {
    let request = scene_request(theme, count);
    log::info!("Describing {count} scenes about {theme:?}");
    let text = studio.complete(SYSTEM_MSG, &request).await?;
    log::debug!("Text model replied: {text}");
    let sentences = split_sentences(&text);
    if sentences.len() != count {
        log::warn!("Asked for {count} sentences, got {}", sentences.len());
    }
    Ok(sentences)
}

fn numeric_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.$").expect("valid regex"))
}

fn paren_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\)\s+").expect("valid regex"))
}

/// true for fragments like "3." left over from a numbered list
pub fn is_numeric_label(s: &str) -> bool {
    numeric_label().is_match(s.trim())
}

/// Splits after every `.`, `!` or `?` followed by whitespace.
fn split_after_terminators(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let mut next = end;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                break;
            }
            next = j + w.len_utf8();
            chars.next();
        }
        if next > end {
            pieces.push(&text[start..end]);
            start = next;
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Turns the model reply into clean sentences: numbered-list labels are
/// dropped and "N) " prefixes are stripped.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_after_terminators(text.trim())
        .into_iter()
        .filter(|s| !is_numeric_label(s))
        .map(|s| paren_prefix().replace(s.trim(), "").trim().to_string())
        .filter(|s| !s.is_empty() && !is_numeric_label(s))
        .collect()
}
