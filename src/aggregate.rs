use std::collections::BTreeMap;

use crate::{FolderCerResult, ImageCerResult};

#[derive(Debug, Clone, Default)]
pub struct FolderAggregate {
    total_char_errors: f64,
    total_chars_gt: usize,
    images_processed: usize,
    images_ignored: usize,
    per_image: BTreeMap<String, ImageCerResult>,
    missing_renders: Vec<String>,
}

impl FolderAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_missing(&mut self, image_name: impl Into<String>) {
        self.missing_renders.push(image_name.into());
    }

    pub fn record_ignored(&mut self) {
        self.images_ignored += 1;
    }

    pub fn record(&mut self, image_name: impl Into<String>, result: ImageCerResult) {
        self.total_char_errors += result.cer * result.num_gt_chars as f64;
        self.total_chars_gt += result.num_gt_chars;
        self.images_processed += 1;
        self.per_image.insert(image_name.into(), result);
    }

    pub fn overall_cer(&self) -> f64 {
        if self.total_chars_gt > 0 {
            self.total_char_errors / self.total_chars_gt as f64
        } else {
            0.0
        }
    }

    pub fn finish(self) -> FolderCerResult {
        FolderCerResult {
            overall_cer: self.overall_cer(),
            images_processed: self.images_processed,
            images_ignored: self.images_ignored,
            per_image: self.per_image,
            missing_renders: self.missing_renders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(cer: f64, num_gt_chars: usize) -> ImageCerResult {
        ImageCerResult {
            cer,
            num_gt_chars,
            num_render: 1,
            num_matched: 1,
            matches: vec![],
            char_errors: (cer * num_gt_chars as f64).round() as usize,
        }
    }

    #[test]
    fn weights_images_by_ground_truth_chars() {
        let mut aggregate = FolderAggregate::new();
        aggregate.record("a.png", image(0.5, 10));
        aggregate.record("b.png", image(0.0, 30));
        let result = aggregate.finish();
        assert_eq!(result.overall_cer, 5.0 / 40.0);
        assert_eq!(result.images_processed, 2);
        assert_eq!(result.per_image.len(), 2);
    }

    #[test]
    fn ignored_and_missing_images_do_not_count() {
        let mut aggregate = FolderAggregate::new();
        aggregate.record("a.png", image(0.25, 4));
        aggregate.record_ignored();
        aggregate.record_missing("c.png");
        let result = aggregate.finish();
        assert_eq!(result.overall_cer, 0.25);
        assert_eq!(result.images_processed, 1);
        assert_eq!(result.images_ignored, 1);
        assert_eq!(result.missing_renders, vec!["c.png".to_string()]);
        assert!(!result.per_image.contains_key("c.png"));
    }

    #[test]
    fn empty_folder_is_zero() {
        let result = FolderAggregate::new().finish();
        assert_eq!(result.overall_cer, 0.0);
        assert_eq!(result.images_processed, 0);
    }
}
