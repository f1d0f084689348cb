pub mod logging;
mod render;
mod session;
mod settings;

use std::process::ExitCode;

use anyhow::Context;
use engine_logging::engine_info;
use grabber_core::{JobRequest, Stage};
use grabber_engine::{list_heights, JobOutcome};

use crate::cli::{Cli, Commands};
use settings::Settings;

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(cli.config.as_deref())?;
    let mut config = settings.into_config();

    match cli.command {
        Commands::Qualities { url } => {
            let url = grabber_core::normalize_source_url(&url);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("starting runtime")?;
            let heights = runtime
                .block_on(list_heights(&config, &url))
                .with_context(|| format!("listing formats of {url}"))?;
            if heights.is_empty() {
                println!("No qualities found.");
            } else {
                println!("{} qualities found.", heights.len());
                for height in heights {
                    println!("{height}p");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Download {
            url,
            height,
            speed,
            output_dir,
            name,
        } => {
            let mut request = JobRequest::new(&url, height, speed)?;
            if let Some(name) = name {
                request = request.with_output_basename(&name);
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let outcome = session::run_download(config, request);
            engine_info!("Download finished: {:?}", outcome);
            Ok(match outcome {
                JobOutcome::Done { output } => {
                    println!("Saved {}", output.display());
                    ExitCode::SUCCESS
                }
                JobOutcome::Failed {
                    stage: Stage::Download,
                } => ExitCode::from(2),
                JobOutcome::Failed {
                    stage: Stage::Transcode,
                } => ExitCode::from(3),
                JobOutcome::Stopped => ExitCode::from(130),
            })
        }
        Commands::ShowConfig => {
            println!("{}", Settings::from_config(&config).to_ron()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
