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
use anyhow::Result;
use clap::Parser;
use scene_tiler::conf::{init_logging, Settings, DEFAULT_CONF};
use scene_tiler::pool::SentencePool;
use scene_tiler::scenes::describe;
use scene_tiler::studio::OpenAiStudio;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topic of the scenes
    #[arg(short, long)]
    theme: String,
    /// Number of sentences to ask for
    #[arg(short, long)]
    number: usize,
    /// Save the sentences as a JSON array, usable by tile-scene --sentences
    #[arg(long)]
    out: Option<PathBuf>,
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONF)]
    conf: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let settings = Settings::load(&args.conf)?;
    log::debug!("{settings:?}");
    let key = settings.api_key()?;
    let studio = OpenAiStudio::new(&key, &settings)?;

    let sentences = describe(&studio, &args.theme, args.number).await?;
    for (i, sentence) in sentences.iter().enumerate() {
        println!("{}) {sentence}", i + 1);
    }
    if let Some(out) = args.out {
        SentencePool::new(sentences).save(&out)?;
        log::info!("Sentences saved to {}", out.display());
    }

    Ok(())
}
