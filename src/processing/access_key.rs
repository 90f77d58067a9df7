//! Recovery of access-key fragments the classifier left unlabelled.
//!
//! The 44-digit key is printed in groups of four and often reaches the
//! classifier as several words, only some of which get `CHAVE_ACESSO`.
//! Confident key words form a seed cluster; numeric words on the same text
//! line that sit next to the cluster are pulled into it.
//!
//! Candidates are visited in the order of the word list and the cluster grows
//! as words join, so a word can attach to an edge created by an earlier
//! merge. The list is not re-sorted by position.

use crate::config::AccessKeyConfig;
use crate::models::{FieldLabel, ReconstructedWord};
use log::debug;

/// Horizontal span of the key cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCluster {
    pub center_y: f32,
    pub x_min: i32,
    pub x_max: i32,
}

impl KeyCluster {
    /// Geometry of the seed words, or `None` without seeds.
    pub fn from_seeds(words: &[ReconstructedWord], seed_confidence: f32) -> Option<Self> {
        let seeds: Vec<&ReconstructedWord> = words
            .iter()
            .filter(|w| w.label == FieldLabel::AccessKey && w.confidence > seed_confidence)
            .collect();
        if seeds.is_empty() {
            return None;
        }

        let center_y =
            seeds.iter().map(|w| w.bbox.vertical_center()).sum::<f32>() / seeds.len() as f32;
        let x_min = seeds.iter().map(|w| w.bbox.x1).min()?;
        let x_max = seeds.iter().map(|w| w.bbox.x2).max()?;
        Some(KeyCluster { center_y, x_min, x_max })
    }

    fn same_line(&self, word: &ReconstructedWord, tolerance: f32) -> bool {
        (word.bbox.vertical_center() - self.center_y).abs() <= tolerance
    }

    fn adjacent(&self, word: &ReconstructedWord, max_gap: i32) -> bool {
        let to_left_edge = (word.bbox.x2 - self.x_min).abs();
        let to_right_edge = (word.bbox.x1 - self.x_max).abs();
        to_left_edge < max_gap || to_right_edge < max_gap
    }

    fn absorb(&mut self, word: &ReconstructedWord) {
        self.x_min = self.x_min.min(word.bbox.x1);
        self.x_max = self.x_max.max(word.bbox.x2);
    }
}

/// Four digits, or any all-digit run of two or more.
pub fn looks_like_key_fragment(text: &str) -> bool {
    let n = text.chars().count();
    n >= 2 && text.chars().all(|c| c.is_ascii_digit())
}

/// Relabels neighbouring numeric words as access-key fragments, in place.
///
/// Returns the final cluster, or `None` when there was nothing to seed it.
pub fn expand_access_key(words: &mut [ReconstructedWord], config: &AccessKeyConfig) -> Option<KeyCluster> {
    let mut cluster = KeyCluster::from_seeds(words, config.seed_confidence)?;
    let mut merged = 0usize;

    for word in words.iter_mut() {
        if word.label == FieldLabel::AccessKey {
            continue;
        }
        if !looks_like_key_fragment(&word.text) {
            continue;
        }
        if !cluster.same_line(word, config.y_tolerance) {
            continue;
        }
        if !cluster.adjacent(word, config.x_gap) {
            continue;
        }

        word.label = FieldLabel::AccessKey;
        word.confidence = config.merged_confidence;
        cluster.absorb(word);
        merged += 1;
    }

    debug!(
        "Access key cluster spans x {}..{} after merging {} fragments",
        cluster.x_min, cluster.x_max, merged
    );
    Some(cluster)
}
