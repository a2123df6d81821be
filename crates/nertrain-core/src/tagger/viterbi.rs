//! # Viterbi Decoding
//!
//! Finds the highest scoring BIO tag sequence given per-token emission
//! scores and a tag transition matrix. Transitions that break the BIO
//! scheme are never taken.

use crate::tagger::bio_tags::BioTag;

/// Viterbi decoder for BIO tag sequences over `num_labels` labels.
#[derive(Debug, Clone)]
pub struct ViterbiDecoder {
    num_labels: usize,
    num_tags: usize,
    valid_start: Vec<bool>,
    valid_transitions: Vec<Vec<bool>>,
}

impl ViterbiDecoder {
    /// Create a decoder and pre-compute the BIO constraint mask.
    pub fn new(num_labels: usize) -> Self {
        let num_tags = BioTag::num_tags(num_labels);
        let tags: Vec<BioTag> = (0..num_tags)
            .filter_map(|i| BioTag::from_index(i, num_labels))
            .collect();

        let valid_start = tags.iter().map(|&t| BioTag::is_valid_start(t)).collect();
        let valid_transitions = tags
            .iter()
            .map(|&prev| {
                tags.iter()
                    .map(|&curr| BioTag::is_valid_transition(prev, curr))
                    .collect()
            })
            .collect();

        Self {
            num_labels,
            num_tags,
            valid_start,
            valid_transitions,
        }
    }

    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    /// Decode the optimal tag sequence.
    ///
    /// # Arguments
    /// * `emission_scores` - `[seq_len][num_tags]` emission scores
    /// * `transition_matrix` - `[num_tags][num_tags]` scores, indexed `[prev][curr]`
    ///
    /// Rows shorter than `num_tags` are treated as scoring zero for the
    /// missing tags.
    pub fn decode(
        &self,
        emission_scores: &[Vec<f32>],
        transition_matrix: &[Vec<f32>],
    ) -> Vec<BioTag> {
        let seq_len = emission_scores.len();
        if seq_len == 0 {
            return Vec::new();
        }

        let emission = |pos: usize, tag: usize| -> f32 {
            emission_scores[pos].get(tag).copied().unwrap_or(0.0)
        };
        let transition = |prev: usize, curr: usize| -> f32 {
            transition_matrix
                .get(prev)
                .and_then(|row| row.get(curr))
                .copied()
                .unwrap_or(0.0)
        };

        let mut dp: Vec<Vec<f32>> = vec![vec![f32::NEG_INFINITY; self.num_tags]; seq_len];
        let mut backptr: Vec<Vec<usize>> = vec![vec![0; self.num_tags]; seq_len];

        for tag in 0..self.num_tags {
            if self.valid_start[tag] {
                dp[0][tag] = emission(0, tag);
            }
        }

        for pos in 1..seq_len {
            for curr in 0..self.num_tags {
                let mut best_score = f32::NEG_INFINITY;
                let mut best_prev = 0;

                for prev in 0..self.num_tags {
                    if !self.valid_transitions[prev][curr] {
                        continue;
                    }

                    let score = dp[pos - 1][prev] + transition(prev, curr);
                    if score > best_score {
                        best_score = score;
                        best_prev = prev;
                    }
                }

                dp[pos][curr] = best_score + emission(pos, curr);
                backptr[pos][curr] = best_prev;
            }
        }

        // Backtrack
        let mut best_final = 0;
        let mut best_final_score = f32::NEG_INFINITY;
        for tag in 0..self.num_tags {
            if dp[seq_len - 1][tag] > best_final_score {
                best_final_score = dp[seq_len - 1][tag];
                best_final = tag;
            }
        }

        let mut path = vec![best_final];
        let mut curr = best_final;
        for pos in (1..seq_len).rev() {
            curr = backptr[pos][curr];
            path.push(curr);
        }
        path.reverse();

        path.into_iter()
            .map(|idx| BioTag::from_index(idx, self.num_labels).unwrap_or(BioTag::Outside))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_transitions(num_tags: usize) -> Vec<Vec<f32>> {
        vec![vec![0.0; num_tags]; num_tags]
    }

    #[test]
    fn test_viterbi_follows_emissions() {
        let decoder = ViterbiDecoder::new(1);
        let transitions = zero_transitions(decoder.num_tags());

        // O, B-0, I-0
        let emissions = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];

        let path = decoder.decode(&emissions, &transitions);
        assert_eq!(path, vec![BioTag::Outside, BioTag::Begin(0), BioTag::Inside(0)]);
    }

    #[test]
    fn test_viterbi_never_starts_inside() {
        let decoder = ViterbiDecoder::new(1);
        let transitions = zero_transitions(decoder.num_tags());
        let emissions = vec![vec![0.0, 0.5, 5.0]];

        let path = decoder.decode(&emissions, &transitions);
        assert_eq!(path, vec![BioTag::Begin(0)]);
    }

    #[test]
    fn test_viterbi_respects_constraints() {
        let decoder = ViterbiDecoder::new(2);
        let transitions = zero_transitions(decoder.num_tags());

        // Position 1 strongly prefers I-1 but position 0 prefers B-0.
        let emissions = vec![
            vec![0.0, 3.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 2.0],
        ];

        let path = decoder.decode(&emissions, &transitions);
        for pair in path.windows(2) {
            assert!(BioTag::is_valid_transition(pair[0], pair[1]));
        }
    }

    #[test]
    fn test_viterbi_uses_transitions() {
        let decoder = ViterbiDecoder::new(1);
        let mut transitions = zero_transitions(decoder.num_tags());
        // Strongly prefer B-0 -> I-0
        transitions[1][2] = 10.0;

        let emissions = vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 0.0]];
        let path = decoder.decode(&emissions, &transitions);
        assert_eq!(path, vec![BioTag::Begin(0), BioTag::Inside(0)]);
    }

    #[test]
    fn test_viterbi_empty() {
        let decoder = ViterbiDecoder::new(3);
        let path = decoder.decode(&[], &zero_transitions(decoder.num_tags()));
        assert!(path.is_empty());
    }

    #[test]
    fn test_viterbi_no_labels() {
        let decoder = ViterbiDecoder::new(0);
        let path = decoder.decode(&[vec![0.0], vec![0.0]], &zero_transitions(1));
        assert_eq!(path, vec![BioTag::Outside, BioTag::Outside]);
    }
}
