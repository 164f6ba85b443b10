/// Cosine similarity remapped from [-1, 1] to [0, 1]
///
/// Returns exactly 0.0 when either vector has zero norm, so an absent
/// embedding (zero-vector sentinel) never produces NaN.
///
/// Both vectors are expected to have the same dimension; registration rejects
/// mismatched embeddings before they reach this point. Otherwise only the
/// common prefix is compared.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // One sqrt over the product keeps cosine(v, v) exactly 1.0
    let cos = (dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0);
    (cos + 1.0) / 2.0
}

/// 1.0 when both categories are equal ignoring case, 0.0 otherwise
///
/// An empty category on either side never matches. Whitespace is significant.
#[inline]
pub fn category_match(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.to_uppercase() == b.to_uppercase() {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let v = vec![0.3, -1.2, 4.5, 0.0];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
    }

    #[test]
    fn test_identical_dense_vectors_are_exactly_one() {
        // Pseudo-random values in [-0.5, 0.5]
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..200 {
            let v: Vec<f32> = (0..384)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    ((state >> 40) as f32 / (1u64 << 24) as f32) - 0.5
                })
                .collect();
            assert_eq!(cosine_similarity(&v, &v), 1.0);
        }
    }

    #[test]
    fn test_opposite_and_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.5);
    }

    #[test]
    fn test_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_category_match() {
        assert_eq!(category_match("ELECTRONIC", "electronic"), 1.0);
        assert_eq!(category_match("ELECTRONIC", "ACCESSORIES"), 0.0);
        assert_eq!(category_match("", "ELECTRONIC"), 0.0);
        assert_eq!(category_match("  ", "  "), 1.0);
        assert_eq!(category_match(" BAG", "BAG"), 0.0);
    }
}
