use std::collections::VecDeque;

use crate::emotion::{Distribution, EmotionLabel};
use crate::models::Segment;
use crate::segmentation::config::SegmentationConfig;
use crate::segmentation::scoring::{dominant_label, summarize_span};

/// Closed turn-index range of one segment, before statistics are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan {
    pub start: usize,
    pub end: usize,
}

/// Main segmentation function: partitions the smoothed sequence into
/// emotionally stable segments and summarizes each one.
///
/// `confidences` holds each turn's fused confidence and feeds the segment's
/// mean-confidence statistic.
pub fn segment_conversation(
    smoothed: &[Distribution],
    confidences: &[f64],
    config: &SegmentationConfig,
) -> Vec<Segment> {
    detect_spans(smoothed, config)
        .into_iter()
        .map(|span| summarize_span(span, smoothed, confidences))
        .collect()
}

/// Windowed-majority change detection over the smoothed sequence.
///
/// A change at turn `t` needs: an arg-max label different from the open
/// segment's running dominant label over `start..t`, at least
/// `majority_threshold` of the current window, an open segment of at least
/// `min_segment_len` turns, and no active cooldown. The final span always
/// ends at the last turn, and neighbouring spans never share a dominant
/// label.
pub fn detect_spans(smoothed: &[Distribution], config: &SegmentationConfig) -> Vec<SegmentSpan> {
    if smoothed.is_empty() {
        return Vec::new();
    }

    let window_size = config.window.max(1);
    let mut window: VecDeque<EmotionLabel> = VecDeque::with_capacity(window_size + 1);
    let mut spans = Vec::new();

    let mut start = 0usize;
    let mut cooldown = 0usize;

    for (turn, distribution) in smoothed.iter().enumerate() {
        let (label, _) = distribution.argmax();
        window.push_back(label);
        if window.len() > window_size {
            window.pop_front();
        }

        if cooldown > 0 {
            cooldown -= 1;
            continue;
        }

        if turn == start || label == dominant_label(&smoothed[start..turn]) {
            continue;
        }

        let votes = window.iter().filter(|&&seen| seen == label).count();
        let share = votes as f64 / window.len() as f64;

        if share >= config.majority_threshold && turn - start >= config.min_segment_len {
            spans.push(SegmentSpan {
                start,
                end: turn - 1,
            });
            start = turn;
            cooldown = config.cooldown_turns;
        }
    }

    // Push final span
    spans.push(SegmentSpan {
        start,
        end: smoothed.len() - 1,
    });

    merge_same_dominant(spans, smoothed)
}

/// Join neighbouring spans whose dominant labels ended up equal, e.g. when
/// the previous emotion took a new segment back over during its cooldown.
fn merge_same_dominant(spans: Vec<SegmentSpan>, smoothed: &[Distribution]) -> Vec<SegmentSpan> {
    let mut merged: Vec<(SegmentSpan, EmotionLabel)> = Vec::with_capacity(spans.len());
    for span in spans {
        let dominant = dominant_label(&smoothed[span.start..=span.end]);
        match merged.last_mut() {
            Some((last, last_dominant)) if *last_dominant == dominant => last.end = span.end,
            _ => merged.push((span, dominant)),
        }
    }
    merged.into_iter().map(|(span, _)| span).collect()
}
