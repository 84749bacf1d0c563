//! Line Grouping
//!
//! Assigns OCR lines to detected bubbles. Lines outside every bubble stand
//! alone.

use crate::collaborators::{BoundingBox, DetectedRegion, OcrLine};

#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    pub bbox: BoundingBox,
    pub text: String,
    /// Mean line confidence in `[0, 1]`
    pub confidence: f32,
}

pub fn group_lines(lines: &[OcrLine], regions: &[DetectedRegion]) -> Vec<LineGroup> {
    let mut buckets: Vec<(BoundingBox, Vec<&OcrLine>)> =
        regions.iter().map(|r| (r.bbox, Vec::new())).collect();
    let mut loose: Vec<&OcrLine> = Vec::new();

    for line in lines {
        match buckets
            .iter_mut()
            .find(|(bbox, _)| bbox.contains_center_of(&line.bbox))
        {
            Some((_, members)) => members.push(line),
            None => loose.push(line),
        }
    }

    buckets
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(bbox, members)| build(bbox, &members))
        .chain(loose.into_iter().map(|line| build(line.bbox, &[line])))
        .collect()
}

fn build(bbox: BoundingBox, members: &[&OcrLine]) -> LineGroup {
    let text = members
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let total: u32 = members.iter().map(|line| line.confidence as u32).sum();
    let confidence = total as f32 / (members.len().max(1) as f32 * 100.0);
    LineGroup {
        bbox,
        text,
        confidence: confidence.clamp(0.0, 1.0),
    }
}
