use rand::Rng;

use crate::error::{AppError, Result};
use crate::models::{QualitySignal, Question};

/// Source of the like/dislike counts used to gate a candidate.
#[allow(async_fn_in_trait)]
pub trait QualityProbe {
    async fn quality(&self, slug: &str) -> Result<QualitySignal>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Sampling,
    /// Index into the candidate pool.
    Accepted(usize),
    Exhausted,
}

/// Rejection sampler over a candidate pool.
///
/// The pool is never mutated. Undrawn candidates are tracked as indices in a
/// swap-and-shrink buffer, so every pool element is probed at most once and a
/// search takes at most `max_attempts()` draws.
pub struct Selector<'a> {
    pool: &'a [Question],
    remaining: Vec<usize>,
    attempts: usize,
    state: SelectionState,
}

impl<'a> Selector<'a> {
    pub fn new(pool: &'a [Question]) -> Self {
        let state = if pool.is_empty() {
            SelectionState::Exhausted
        } else {
            SelectionState::Sampling
        };

        Self {
            pool,
            remaining: (0..pool.len()).collect(),
            attempts: 0,
            state,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.pool.len()
    }

    /// Draw one candidate and probe it. No-op once the search has ended.
    pub async fn step<R, P>(&mut self, rng: &mut R, probe: &P) -> Result<SelectionState>
    where
        R: Rng,
        P: QualityProbe,
    {
        if self.state != SelectionState::Sampling {
            return Ok(self.state);
        }
        // A failed lookup can leave the buffer empty while still sampling.
        if self.remaining.is_empty() {
            self.state = SelectionState::Exhausted;
            return Ok(self.state);
        }

        let slot = rng.gen_range(0..self.remaining.len());
        let index = self.remaining.swap_remove(slot);
        self.attempts += 1;

        let question = &self.pool[index];
        let signal = probe.quality(&question.slug).await?;

        if signal.is_approved() {
            self.state = SelectionState::Accepted(index);
        } else {
            tracing::debug!(
                "Rejected {} ({} likes / {} dislikes), {} candidates left",
                question.slug,
                signal.likes,
                signal.dislikes,
                self.remaining.len()
            );
            if self.remaining.is_empty() {
                self.state = SelectionState::Exhausted;
            }
        }

        Ok(self.state)
    }

    /// Run the search to completion.
    pub async fn select<R, P>(mut self, rng: &mut R, probe: &P) -> Result<&'a Question>
    where
        R: Rng,
        P: QualityProbe,
    {
        loop {
            match self.step(rng, probe).await? {
                SelectionState::Sampling => continue,
                SelectionState::Accepted(index) => {
                    let pool = self.pool;
                    return Ok(&pool[index]);
                }
                SelectionState::Exhausted => {
                    return Err(AppError::ExhaustedCandidates {
                        attempts: self.attempts,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use tokio_test::block_on;

    /// Serves fixed votes per slug and records every lookup.
    struct ScriptedProbe {
        votes: HashMap<String, QualitySignal>,
        fallback: QualitySignal,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn rejecting_all() -> Self {
            Self {
                votes: HashMap::new(),
                fallback: QualitySignal { likes: 1, dislikes: 2 },
                calls: Mutex::new(Vec::new()),
            }
        }

        fn approving_all() -> Self {
            Self {
                fallback: QualitySignal { likes: 2, dislikes: 1 },
                ..Self::rejecting_all()
            }
        }

        fn approving_only(slug: &str) -> Self {
            let mut probe = Self::rejecting_all();
            probe
                .votes
                .insert(slug.to_string(), QualitySignal { likes: 900, dislikes: 12 });
            probe
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl QualityProbe for ScriptedProbe {
        async fn quality(&self, slug: &str) -> Result<QualitySignal> {
            self.calls.lock().unwrap().push(slug.to_string());
            Ok(self.votes.get(slug).copied().unwrap_or(self.fallback))
        }
    }

    struct FailingProbe;

    impl QualityProbe for FailingProbe {
        async fn quality(&self, slug: &str) -> Result<QualitySignal> {
            Err(AppError::QuestionNotFound(slug.to_string()))
        }
    }

    fn pool(ids: &[u32]) -> Vec<Question> {
        ids.iter()
            .map(|&id| Question {
                id,
                title: format!("Question {}", id),
                slug: format!("question-{}", id),
                difficulty: Difficulty::Easy,
                paid_only: false,
            })
            .collect()
    }

    #[test]
    fn accepts_only_approved_candidates() {
        let pool = pool(&[1, 2, 3, 4, 5, 6]);
        for seed in 0..50 {
            let probe = ScriptedProbe::approving_only("question-4");
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = block_on(Selector::new(&pool).select(&mut rng, &probe)).unwrap();
            assert_eq!(picked.id, 4);
            assert_eq!(probe.calls().last().map(String::as_str), Some("question-4"));
        }
    }

    #[test]
    fn never_probes_a_candidate_twice() {
        let pool = pool(&[10, 20, 30, 40, 50]);
        let probe = ScriptedProbe::rejecting_all();
        let mut rng = StdRng::seed_from_u64(7);

        let result = block_on(Selector::new(&pool).select(&mut rng, &probe));

        assert!(matches!(
            result,
            Err(AppError::ExhaustedCandidates { attempts: 5 })
        ));
        let calls = probe.calls();
        let distinct: HashSet<&String> = calls.iter().collect();
        assert_eq!(calls.len(), 5);
        assert_eq!(distinct.len(), 5);
    }

    #[test]
    fn each_step_shrinks_the_working_set() {
        let pool = pool(&[1, 2, 3]);
        let probe = ScriptedProbe::rejecting_all();
        let mut rng = StdRng::seed_from_u64(1);
        let mut selector = Selector::new(&pool);
        assert_eq!(selector.max_attempts(), 3);

        let state = block_on(selector.step(&mut rng, &probe)).unwrap();
        assert_eq!(state, SelectionState::Sampling);
        assert_eq!((selector.attempts, selector.remaining.len()), (1, 2));

        block_on(selector.step(&mut rng, &probe)).unwrap();
        let state = block_on(selector.step(&mut rng, &probe)).unwrap();
        assert_eq!(state, SelectionState::Exhausted);
        assert!(selector.remaining.is_empty());

        // Further steps are no-ops.
        let state = block_on(selector.step(&mut rng, &probe)).unwrap();
        assert_eq!(state, SelectionState::Exhausted);
        assert_eq!(probe.calls().len(), 3);
    }

    #[test]
    fn empty_pool_is_exhausted_without_probing() {
        let probe = ScriptedProbe::approving_all();
        let mut rng = StdRng::seed_from_u64(0);
        let selector = Selector::new(&[]);
        assert_eq!(selector.state, SelectionState::Exhausted);

        let result = block_on(selector.select(&mut rng, &probe));
        assert!(matches!(
            result,
            Err(AppError::ExhaustedCandidates { attempts: 0 })
        ));
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn every_candidate_can_be_drawn() {
        let pool = pool(&[1, 2, 3, 4]);
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let probe = ScriptedProbe::approving_all();
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = block_on(Selector::new(&pool).select(&mut rng, &probe)).unwrap();
            seen.insert(picked.id);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn duplicate_pool_entries_are_separate_draws() {
        // Recommended question 2 is also free at the level, so it appears twice.
        let pool = pool(&[1, 2, 3, 2]);
        let probe = ScriptedProbe::approving_only("question-3");
        let mut rng = StdRng::seed_from_u64(3);

        let picked = block_on(Selector::new(&pool).select(&mut rng, &probe)).unwrap();

        assert_eq!(picked.id, 3);
        assert!(probe.calls().len() <= 4);
    }

    #[test]
    fn step_after_failed_lookup_on_last_candidate_is_exhausted() {
        let pool = pool(&[1]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut selector = Selector::new(&pool);

        let first = block_on(selector.step(&mut rng, &FailingProbe));
        assert!(matches!(first, Err(AppError::QuestionNotFound(_))));
        assert!(selector.remaining.is_empty());

        let state = block_on(selector.step(&mut rng, &FailingProbe)).unwrap();
        assert_eq!(state, SelectionState::Exhausted);
        assert_eq!(selector.attempts, 1);
    }

    #[tokio::test]
    async fn probe_failure_aborts_the_search() {
        let pool = pool(&[1, 2]);
        let mut rng = StdRng::seed_from_u64(0);
        let result = Selector::new(&pool).select(&mut rng, &FailingProbe).await;
        assert!(matches!(result, Err(AppError::QuestionNotFound(_))));
    }
}
