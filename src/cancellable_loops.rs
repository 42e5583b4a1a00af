use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Maps `items` in parallel and gives up early if `abort_flag` is set.
///
/// Returns `None` when the loop was cancelled. The flag is reset in that case so the next loop
/// starts clean.
pub fn par_map_cancellable<T, R, F>(items: &[T], abort_flag: &AtomicBool, func: F) -> Option<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    let result = items
        .par_iter()
        .map(|item| {
            if abort_flag.load(Ordering::Relaxed) {
                None // cancel
            } else {
                Some(func(item))
            }
        })
        .collect::<Option<Vec<R>>>();
    if result.is_none() {
        abort_flag.store(false, Ordering::Relaxed);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_without_abort() {
        let flag = AtomicBool::new(false);
        let out = par_map_cancellable(&[1, 2, 3], &flag, |v| v * 2).unwrap();
        assert_eq!(out, vec![2, 4, 6]);
    }

    #[test]
    fn test_abort_discards_results_and_resets_flag() {
        let flag = AtomicBool::new(true);
        assert!(par_map_cancellable(&[1, 2, 3], &flag, |v| v * 2).is_none());
        assert!(!flag.load(Ordering::Relaxed));
    }
}
