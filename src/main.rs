use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ocr_cer::{store::ResultsDocument, CerEvaluator, CerEvaluatorBuilder};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Character error rate between OCR of ground-truth photos and OCR of renders.
#[derive(Parser, Debug)]
#[command(name = "ocr-cer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Minimum IoU for two regions to be considered the same text
    #[arg(long, global = true, default_value = "0.1")]
    iou_threshold: f64,

    /// Worker threads used to score images (0 = one per core)
    #[arg(long, global = true, default_value = "4")]
    threads: usize,

    /// Extension of the image each region JSON was produced from
    #[arg(long, global = true, default_value = "png")]
    image_extension: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one folder of render OCR results against ground truth
    Folder {
        /// Directory of ground-truth region JSON files
        #[arg(long)]
        gt: PathBuf,

        /// Directory of render region JSON files
        #[arg(long)]
        render: PathBuf,

        /// Rendering method name the result is stored under
        #[arg(long, default_value = "renders")]
        method: String,

        /// Results document to merge into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate every method of one or more trained models
    Model {
        /// Model directories containing `test/` and `test_ocr_output/`
        #[arg(short, long = "model-path", required = true, num_args = 1..)]
        model_paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let evaluator = CerEvaluatorBuilder::new()
        .threads(args.threads)
        .iou_threshold(args.iou_threshold)
        .image_extension(args.image_extension)
        .build()
        .context("Failed to build evaluator")?;

    match args.command {
        Command::Folder {
            gt,
            render,
            method,
            output,
        } => {
            let result = evaluator
                .evaluate_dirs(&gt, &render)
                .with_context(|| format!("Failed to evaluate {render:?}"))?;
            println!(
                "{method}: CER {:.4} ({} images, {} ignored)",
                result.overall_cer, result.images_processed, result.images_ignored
            );
            if let Some(output) = output {
                let mut doc = ResultsDocument::open(&output)?;
                doc.insert(method, &result)?;
                doc.save()
                    .with_context(|| format!("Failed to write {output:?}"))?;
            }
        }
        Command::Model { model_paths } => {
            for model_path in model_paths {
                println!("OCR evaluation for model: {}", model_path.display());
                evaluate_model(&evaluator, &model_path)
                    .with_context(|| format!("Failed to evaluate model {model_path:?}"))?;
            }
        }
    }
    Ok(())
}

fn evaluate_model(evaluator: &CerEvaluator, model_path: &Path) -> Result<()> {
    let test_dir = model_path.join("test");
    let ocr_output_dir = model_path.join("test_ocr_output");
    let gt_jsons = ocr_output_dir.join("gt").join("ocr_jsons");

    let mut methods = fs::read_dir(&test_dir)
        .with_context(|| format!("Failed to list {test_dir:?}"))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect::<Vec<_>>();
    methods.sort();

    let mut doc = ResultsDocument::open(ocr_output_dir.join("ocr_results.json"))?;
    for method in methods {
        let render_jsons = ocr_output_dir.join(&method).join("ocr_jsons");
        if !render_jsons.is_dir() {
            log::warn!("No OCR output for method {method} at {render_jsons:?}, skipping");
            continue;
        }
        let result = evaluator.evaluate_dirs(&gt_jsons, &render_jsons)?;
        println!("  {method}: CER {:.4}", result.overall_cer);
        doc.insert(method, &result)?;
    }
    doc.save()?;
    println!("OCR evaluation complete for model: {}", model_path.display());
    Ok(())
}
