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
use rand::rngs::StdRng;
use rand::SeedableRng;
use scene_tiler::conf::{init_logging, Settings, DEFAULT_CONF};
use scene_tiler::pipeline::{compose, report_unused};
use scene_tiler::pool::SentencePool;
use scene_tiler::scenes::describe;
use scene_tiler::studio::OpenAiStudio;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topic for the generated image
    #[arg(short, long)]
    theme: String,
    /// Number of hidden items in image (currently not used)
    #[arg(short, long)]
    number: u32,
    /// Reuse sentences saved by describe-scenes instead of asking for new ones
    #[arg(long)]
    sentences: Option<PathBuf>,
    /// Seed for the random sentence draws
    #[arg(long)]
    seed: Option<u64>,
    /// Directory for tmp.png and base.png
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONF)]
    conf: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let mut settings = Settings::load(&args.conf)?;
    if let Some(out_dir) = args.out_dir {
        settings.output_dir = out_dir;
    }
    log::debug!("{settings:?}");
    log::info!("Hidden items requested: {} (ignored)", args.number);
    let key = settings.api_key()?;
    let studio = OpenAiStudio::new(&key, &settings)?;

    let pool = match &args.sentences {
        Some(fname) => SentencePool::load(fname)?,
        None => describe(&studio, &args.theme, settings.sentence_count)
            .await?
            .into(),
    };
    log::info!("{} sentences in the pool", pool.len());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = match compose(&studio, &settings, pool, &mut rng).await {
        Ok(report) => report,
        Err(err) => {
            report_unused(&mut std::io::stdout().lock(), &err)?;
            return Err(err.into());
        }
    };

    if report.pool_exhausted {
        log::warn!("Ran out of sentences, not every tile was edited");
    }
    println!(
        "Edited {} tiles ({} regions written), {} sentences left",
        report.tiles_done,
        report.writes,
        report.remaining.len()
    );
    println!("Image file path: {}", report.output.display());

    Ok(())
}
