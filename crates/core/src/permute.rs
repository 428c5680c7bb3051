use crate::DrawRng;

/// Fisher-Yates exchange from the last index down to 1.
pub fn shuffle_in_place<T, R: DrawRng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// Uniform permutation of `items`, leaving the input untouched.
pub fn shuffle<T: Clone, R: DrawRng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle_in_place(&mut out, rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RngState, ScriptedRng};

    fn sorted(mut items: Vec<&str>) -> Vec<&str> {
        items.sort_unstable();
        items
    }

    #[test]
    fn shuffle_keeps_multiset() {
        let mut rng = RngState::from_seed(11);
        let items = vec!["a", "b", "b", "c", "d", "e"];
        for _ in 0..32 {
            let out = shuffle(&items, &mut rng);
            assert_eq!(sorted(out), sorted(items.clone()));
        }
    }

    #[test]
    fn shuffle_uses_one_draw_per_swap_position() {
        let mut rng = ScriptedRng::new(vec![0]);
        let out = shuffle(&[1, 2, 3, 4], &mut rng);
        assert_eq!(rng.consumed(), 3);
        // j = 0 every time rotates the head to the back.
        assert_eq!(out, vec![2, 3, 4, 1]);
    }

    #[test]
    fn identity_draws_keep_order() {
        // j == i at every position leaves each element where it is.
        let mut rng = ScriptedRng::new(vec![3, 2, 1]);
        assert_eq!(shuffle(&[1, 2, 3, 4], &mut rng), vec![1, 2, 3, 4]);
    }

    #[test]
    fn short_inputs_draw_nothing() {
        let mut rng = ScriptedRng::new(vec![1]);
        assert!(shuffle::<u8, _>(&[], &mut rng).is_empty());
        assert_eq!(shuffle(&[9], &mut rng), vec![9]);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn every_ordering_of_three_appears() {
        let mut rng = RngState::from_seed(2024);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..600 {
            seen.insert(shuffle(&[1, 2, 3], &mut rng));
        }
        assert_eq!(seen.len(), 6);
    }
}
