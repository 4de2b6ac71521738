// Multi-input dispatch for the CLI

use rayon::prelude::*;

/// Run `check` over every input, keeping input order in the result.
/// Parallel on the rayon pool unless `sequential` is set.
pub fn check_inputs<T, F>(inputs: &[String], sequential: bool, check: F) -> Vec<(String, T)>
where
    T: Send,
    F: Fn(&str) -> T + Sync,
{
    if sequential || inputs.len() < 2 {
        inputs
            .iter()
            .map(|input| (input.clone(), check(input)))
            .collect()
    } else {
        inputs
            .par_iter()
            .map(|input| (input.clone(), check(input)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn inputs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tez{i}.docx")).collect()
    }

    #[test]
    fn test_results_keep_input_order() {
        let inputs = inputs(32);
        let results = check_inputs(&inputs, false, |input| input.len());
        let names: Vec<_> = results.iter().map(|(name, _)| name.clone()).collect();
        assert_eq!(names, inputs);
        assert!(results.iter().all(|(name, len)| name.len() == *len));
    }

    #[test]
    fn test_each_input_checked_once() {
        let calls = AtomicUsize::new(0);
        let results = check_inputs(&inputs(10), false, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(results.len(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_sequential_runs_on_calling_thread() {
        let caller = std::thread::current().id();
        let results = check_inputs(&inputs(4), true, |_| std::thread::current().id());
        assert!(results.iter().all(|(_, id)| *id == caller));
    }
}
