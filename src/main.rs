// src/main.rs
use anyhow::{bail, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use rayon::ThreadPoolBuilder;

use burn_severity::batch::process_batch;
use burn_severity::cli::{Cli, Commands};
use burn_severity::io::{fetch_if_missing, write_index};
use burn_severity::processing::{SeverityOutputs, SeverityProcessor};
use burn_severity::render::{AnnotationStore, Legend, MapView};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(level)).init();

    ThreadPoolBuilder::new()
        .num_threads(cli.threads.unwrap_or_else(num_cpus::get))
        .build_global()?;

    let options = cli.write_options();

    match &cli.command {
        Commands::Nbr { input, bands } => {
            SeverityProcessor::new((*bands).into(), options).nbr(input, &cli.output)?;
        }
        Commands::Dnbr { pre, post, bands } => {
            let delta = SeverityProcessor::new((*bands).into(), options.clone()).delta(pre, post)?;
            write_index(&delta.data, &delta.geo_info, &cli.output, "dNBR", &options)?;
        }
        Commands::Classify { input } => {
            let processor = SeverityProcessor::new(Default::default(), options);
            let summary = processor.classify_file(input, &cli.output)?;
            println!("{}", summary);
        }
        Commands::Severity {
            pre,
            post,
            bands,
            delta_output,
            preview,
            delta_preview,
            map,
            center,
            zoom,
            annotations,
        } => {
            let view = match center.as_deref() {
                None => None,
                Some(&[lat, lon]) => Some(MapView {
                    center: [lat, lon],
                    zoom: *zoom,
                }),
                Some(other) => bail!("--center expects LAT,LON, got {} values", other.len()),
            };

            let processor = SeverityProcessor::new((*bands).into(), options);
            let outputs = SeverityOutputs {
                classes: cli.output.clone(),
                delta: delta_output.clone(),
                preview: preview.clone(),
                delta_preview: delta_preview.clone(),
            };
            let result = processor.run(pre, post, &outputs)?;
            println!("{}", result.summary);

            if let Some(path) = map {
                let mut document = processor.map_document(&result, &outputs, view)?;
                if let Some(log) = annotations {
                    document.attach_annotations(&AnnotationStore::from_event_log(log)?);
                }
                document.write(path)?;
                println!("Map document: {}", path.display());
            }
        }
        Commands::Fetch { url } => {
            if !fetch_if_missing(url, &cli.output)? {
                println!("Already present: {}", cli.output.display());
            }
        }
        Commands::Batch { config } => {
            process_batch(config)?;
            return Ok(());
        }
        Commands::Legend { json } => {
            let legend = Legend::severity();
            if *json {
                println!("{}", serde_json::to_string_pretty(&legend)?);
            } else {
                println!("{}", legend.to_text());
            }
            return Ok(());
        }
    }

    println!("Processing complete: {}", cli.output.display());
    Ok(())
}
