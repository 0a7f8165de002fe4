use rayon::prelude::*;

/// Cosine similarity, defined as 0 when either side has zero magnitude or the
/// lengths differ. Clamped to [-1, 1] to absorb rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, aa, bb), (x, y)| {
            (d + (x * y), aa + (x * x), bb + (y * y))
        });

    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0)
    }
}

/// Scores `query` against every row, preserving row order.
pub fn score_rows<R>(query: &[f32], rows: &[R]) -> Vec<f32>
where
    R: AsRef<[f32]> + Sync,
{
    rows.par_iter()
        .map(|row| cosine_similarity(query, row.as_ref()))
        .collect()
}

/// Index and value of the highest score. Ties go to the lowest index.
pub fn best_index(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_works_for_unit_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let c = vec![0.0, 1.0, 0.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&a, &c) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let zero = vec![0.0; 3];
        assert_eq!(cosine_similarity(&zero, &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        let s = cosine_similarity(&[1.0, -2.0], &[-1.0, 2.0]);
        assert!((s + 1.0).abs() < 1e-6);
    }

    #[test]
    fn best_index_prefers_first_of_ties() {
        assert_eq!(best_index(&[0.2, 0.7, 0.7]), Some((1, 0.7)));
        assert_eq!(best_index(&[0.0, 0.0, 0.0]), Some((0, 0.0)));
        assert_eq!(best_index(&[-0.5, -0.1]), Some((1, -0.1)));
        assert_eq!(best_index(&[]), None);
    }

    #[test]
    fn score_rows_keeps_row_order() {
        let rows = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.0, 0.0]];
        let scores = score_rows(&[1.0, 0.0], &rows);
        assert_eq!(scores.len(), 3);
        assert!(scores[0].abs() < 1e-6);
        assert!((scores[1] - 1.0).abs() < 1e-6);
        assert_eq!(scores[2], 0.0);
    }
}
