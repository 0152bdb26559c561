use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub text: String,
    pub polygon: Vec<[f64; 2]>,
}

impl Region {
    pub fn new(text: impl Into<String>, polygon: impl Into<Vec<[f64; 2]>>) -> Self {
        Self {
            text: text.into(),
            polygon: polygon.into(),
        }
    }
}

/// Best scoring outcome of one connected component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub gt_text: String,
    pub render_text: String,
    pub char_errors: usize,
}

// Reports only carry the text pair.
impl Serialize for Match {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.gt_text, &self.render_text).serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageCerResult {
    pub cer: f64,
    pub num_gt_chars: usize,
    pub num_render: usize,
    pub num_matched: usize,
    pub matches: Vec<Match>,
    #[serde(skip)]
    pub char_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderCerResult {
    pub overall_cer: f64,
    pub images_processed: usize,
    pub images_ignored: usize,
    pub per_image: BTreeMap<String, ImageCerResult>,
    /// Ground-truth images that had no render entry at all.
    #[serde(skip)]
    pub missing_renders: Vec<String>,
}
