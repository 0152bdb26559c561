use std::{collections::BTreeMap, path::Path};

mod aggregate;
pub mod error;
pub mod graph;
pub mod overlap;
mod result;
mod scorer;
pub mod store;
pub mod util;

pub use aggregate::FolderAggregate;
pub use error::{CerError, Result};
use graph::DEFAULT_IOU_THRESHOLD;
use rayon::prelude::*;
pub use result::*;
pub use scorer::{best_match, score_image};
use tracing::instrument;

pub struct CerEvaluatorBuilder {
    threads: usize,
    options: EvaluationOptions,
}

impl CerEvaluatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.options.iou_threshold = iou_threshold;
        self
    }

    pub fn image_extension(mut self, extension: impl Into<String>) -> Self {
        self.options.image_extension = extension.into();
        self
    }

    pub fn options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> Result<CerEvaluator> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("ocr-cer-{i}"))
            .build()?;
        Ok(CerEvaluator {
            pool,
            options: self.options,
        })
    }
}

impl Default for CerEvaluatorBuilder {
    fn default() -> Self {
        Self {
            threads: 4,
            options: EvaluationOptions::default(),
        }
    }
}

pub struct CerEvaluator {
    pool: rayon::ThreadPool,
    options: EvaluationOptions,
}

impl CerEvaluator {
    pub fn evaluate_image(&self, gt: &[Region], render: &[Region]) -> ImageCerResult {
        score_image(gt, render, self.options.iou_threshold)
    }

    // Scored on the pool, folded in name order so totals are schedule independent.
    #[instrument(skip_all, fields(num_gt = gt.len(), num_render = render.len()))]
    pub fn evaluate_folder(
        &self,
        gt: &BTreeMap<String, Vec<Region>>,
        render: &BTreeMap<String, Vec<Region>>,
    ) -> FolderCerResult {
        let iou_threshold = self.options.iou_threshold;
        let scored = self.pool.install(|| {
            gt.par_iter()
                .map(|(name, gt_regions)| {
                    let outcome = match render.get(name) {
                        None => ImageOutcome::Missing,
                        Some(_) if gt_regions.is_empty() => ImageOutcome::Ignored,
                        Some(render_regions) => ImageOutcome::Scored(score_image(
                            gt_regions,
                            render_regions,
                            iou_threshold,
                        )),
                    };
                    (name, outcome)
                })
                .collect::<Vec<_>>()
        });

        let mut aggregate = FolderAggregate::new();
        for (name, outcome) in scored {
            match outcome {
                ImageOutcome::Missing => {
                    log::warn!("No render regions for {name}, skipping");
                    aggregate.record_missing(name.as_str());
                }
                ImageOutcome::Ignored => {
                    log::debug!("{name} has no ground-truth text, ignoring");
                    aggregate.record_ignored();
                }
                ImageOutcome::Scored(result) => {
                    log::debug!(
                        "{name}: cer {:.4} ({} of {} render regions matched)",
                        result.cer,
                        result.num_matched,
                        result.num_render
                    );
                    aggregate.record(name.as_str(), result);
                }
            }
        }

        let result = aggregate.finish();
        log::info!(
            "Overall CER {:.4} over {} images ({} ignored, {} without renders)",
            result.overall_cer,
            result.images_processed,
            result.images_ignored,
            result.missing_renders.len()
        );
        result
    }

    #[instrument(skip(self))]
    pub fn evaluate_dirs(&self, gt_dir: &Path, render_dir: &Path) -> Result<FolderCerResult> {
        let extension = &self.options.image_extension;
        let gt = store::load_region_dir(gt_dir, extension)?;
        let render = store::load_region_dir(render_dir, extension)?;
        Ok(self.evaluate_folder(&gt, &render))
    }
}

enum ImageOutcome {
    Missing,
    Ignored,
    Scored(ImageCerResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOptions {
    pub iou_threshold: f64,
    pub image_extension: String,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            image_extension: "png".into(),
        }
    }
}
