use std::collections::HashSet;

use crate::models::{Difficulty, Question};

/// Free questions at `difficulty`, in catalog order.
pub fn free_questions_at_level(catalog: &[Question], difficulty: Difficulty) -> Vec<Question> {
    catalog
        .iter()
        .filter(|q| !q.paid_only && q.difficulty == difficulty)
        .cloned()
        .collect()
}

pub fn recommended_id_set(ids: &[u32]) -> HashSet<u32> {
    ids.iter().copied().collect()
}

/// Catalog entries on the recommended list, whatever their difficulty or paid flag.
pub fn listed_questions(catalog: &[Question], ids: &HashSet<u32>) -> Vec<Question> {
    catalog
        .iter()
        .filter(|q| ids.contains(&q.id))
        .cloned()
        .collect()
}

/// Free questions at `difficulty` followed by every recommended question.
/// A recommended question that is also free at this level appears twice.
pub fn candidate_pool(
    catalog: &[Question],
    difficulty: Difficulty,
    recommended: &HashSet<u32>,
) -> Vec<Question> {
    let mut pool = free_questions_at_level(catalog, difficulty);
    pool.extend(listed_questions(catalog, recommended));
    pool
}
