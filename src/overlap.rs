use geo::{Area, Polygon};
use geo_clipper::Clipper;

use crate::util::to_geo_poly;

// fixed-point scale for clipper, keeps sub-pixel precision
const CLIP_FACTOR: f64 = 1024.0;

#[derive(Debug, Clone)]
pub struct RegionShape {
    polygon: Option<Polygon<f64>>,
    area: f64,
}

impl RegionShape {
    pub fn new(points: &[[f64; 2]]) -> Self {
        let polygon = to_geo_poly(points);
        let area = polygon.as_ref().map_or(0.0, |p| p.unsigned_area());
        Self { polygon, area }
    }

    pub fn iou(&self, other: &RegionShape) -> f64 {
        let (Some(a), Some(b)) = (&self.polygon, &other.polygon) else {
            return 0.0;
        };
        let intersection = a.intersection(b, CLIP_FACTOR).unsigned_area();
        let union = self.area + other.area - intersection;
        if union > 0.0 {
            (intersection / union).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

pub fn polygon_iou(a: &[[f64; 2]], b: &[[f64; 2]]) -> f64 {
    RegionShape::new(a).iou(&RegionShape::new(b))
}
