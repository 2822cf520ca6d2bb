//! Ordered candidate resolution: try each candidate in order, first success wins.

use std::future::Future;

use tracing::warn;

/// Every candidate failed (or there were none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted<E> {
    pub attempted: usize,
    pub last: Option<E>,
}

/// Invoke `attempt` on each candidate in order and return the first `Ok`.
///
/// Candidates are cloned into `attempt` so the returned future can own them.
/// Candidates after the first success are never invoked.
///
/// # Errors
///
/// Returns [`Exhausted`] carrying the last candidate's error when none succeed.
pub async fn first_success<C, T, E, F, Fut>(candidates: &[C], mut attempt: F) -> Result<T, Exhausted<E>>
where
    C: Clone + std::fmt::Display,
    E: std::fmt::Display,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last = None;
    for (index, candidate) in candidates.iter().enumerate() {
        match attempt(candidate.clone()).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(%candidate, position = index + 1, total = candidates.len(), error = %e, "candidate failed");
                last = Some(e);
            }
        }
    }
    Err(Exhausted { attempted: candidates.len(), last })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn first_ok_wins_and_stops() {
        let calls = Cell::new(0);
        let result = first_success(&["a", "b", "c"], |c| {
            calls.set(calls.get() + 1);
            async move { if c == "b" { Ok(c) } else { Err(format!("{c} failed")) } }
        })
        .await;
        assert_eq!(result.unwrap(), "b");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn all_failing_reports_last_error() {
        let result: Result<(), _> = first_success(&["a", "b"], |c| async move { Err(format!("{c} failed")) }).await;
        let err = result.unwrap_err();
        assert_eq!(err.attempted, 2);
        assert_eq!(err.last.as_deref(), Some("b failed"));
    }

    #[tokio::test]
    async fn empty_candidates_is_exhausted_without_error() {
        let candidates: [&str; 0] = [];
        let result: Result<(), Exhausted<String>> = first_success(&candidates, |_| async { Ok(()) }).await;
        let err = result.unwrap_err();
        assert_eq!(err.attempted, 0);
        assert!(err.last.is_none());
    }
}
