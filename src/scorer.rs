use std::collections::BTreeSet;

use float_ord::FloatOrd;
use tracing::instrument;

use crate::{
    graph::{build_graph, NodeId, Side},
    util::{axis_mean, char_len, normalize_text, SortAxis},
    ImageCerResult, Match, Region,
};

fn sort_by_axis(indices: &[usize], regions: &[Region], axis: SortAxis) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_by_key(|&i| (FloatOrd(axis_mean(&regions[i].polygon, axis)), i));
    sorted
}

fn assemble(indices: &[usize], regions: &[Region], axis: SortAxis) -> String {
    sort_by_axis(indices, regions, axis)
        .into_iter()
        .map(|i| normalize_text(&regions[i].text))
        .collect()
}

/// Picks the reading-order hypothesis with the fewest character edits.
///
/// Each side is concatenated in x order and in y order and all four pairings
/// are scored; the first minimum wins.
pub fn best_match(
    gt_indices: &[usize],
    gt: &[Region],
    render_indices: &[usize],
    render: &[Region],
) -> Match {
    let gt_texts = SortAxis::ALL.map(|axis| assemble(gt_indices, gt, axis));
    let render_texts = SortAxis::ALL.map(|axis| assemble(render_indices, render, axis));

    let mut best = (0, 0, usize::MAX);
    for (g, gt_text) in gt_texts.iter().enumerate() {
        for (r, render_text) in render_texts.iter().enumerate() {
            let char_errors = strsim::levenshtein(gt_text, render_text);
            if char_errors < best.2 {
                best = (g, r, char_errors);
            }
        }
    }

    let (g, r, char_errors) = best;
    Match {
        gt_text: gt_texts[g].clone(),
        render_text: render_texts[r].clone(),
        char_errors,
    }
}

#[instrument(level = "debug", skip(gt, render), fields(num_gt = gt.len(), num_render = render.len()))]
pub fn score_image(gt: &[Region], render: &[Region], iou_threshold: f64) -> ImageCerResult {
    let graph = build_graph(gt, render, iou_threshold);
    log::trace!(
        "{} correspondences among {} regions",
        graph.edge_count(),
        graph.node_count()
    );

    let mut char_errors = 0;
    let mut matched_gt = BTreeSet::new();
    let mut matched_render = BTreeSet::new();
    let mut matches = Vec::new();

    for component in graph.connected_components() {
        let (mut gt_indices, mut render_indices) = split_component(&component);
        if gt_indices.is_empty() {
            log::trace!("false positive render regions {render_indices:?}");
            continue;
        }
        if render_indices.is_empty() {
            // missed entirely, counted in full below
            continue;
        }
        gt_indices.sort_unstable();
        render_indices.sort_unstable();

        let found = best_match(&gt_indices, gt, &render_indices, render);
        char_errors += found.char_errors;
        matched_gt.extend(gt_indices);
        matched_render.extend(render_indices);
        matches.push(found);
    }

    for (i, region) in gt.iter().enumerate() {
        if !matched_gt.contains(&i) {
            char_errors += char_len(&region.text);
        }
    }

    let num_gt_chars = gt.iter().map(|it| char_len(&it.text)).sum::<usize>();
    let cer = if num_gt_chars > 0 {
        char_errors as f64 / num_gt_chars as f64
    } else {
        0.0
    };

    ImageCerResult {
        cer,
        num_gt_chars,
        num_render: render.len(),
        num_matched: matched_render.len(),
        matches,
        char_errors,
    }
}

fn split_component(component: &[NodeId]) -> (Vec<usize>, Vec<usize>) {
    let mut gt_indices = Vec::new();
    let mut render_indices = Vec::new();
    for node in component {
        match node.side {
            Side::GroundTruth => gt_indices.push(node.index),
            Side::Render => render_indices.push(node.index),
        }
    }
    (gt_indices, render_indices)
}
