use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::models::{format_text, Difficulty, Question};
use crate::selection::{candidate_pool, recommended_id_set, QualityProbe, Selector};
use crate::services::{LeetCodeClient, Publisher};

pub struct App {
    difficulties: Vec<Difficulty>,
    base_url: Url,
    rng: StdRng,

    // Services
    leetcode: LeetCodeClient,
    publisher: Publisher,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url()?;
        let leetcode = LeetCodeClient::new(
            &base_url,
            &config.recommended_list_id,
            config.request_timeout(),
        )?;
        let publisher = Publisher::new(config.destinations(), config.request_timeout())?;

        Ok(Self {
            difficulties: config.difficulties.clone(),
            base_url,
            rng: StdRng::from_entropy(),
            leetcode,
            publisher,
        })
    }

    /// Fetch the catalog once, then pick and post one question per difficulty.
    pub async fn run(&mut self) -> Result<()> {
        let ids = self.leetcode.fetch_recommended_ids().await?;
        let recommended = recommended_id_set(&ids);
        let catalog = self.leetcode.fetch_catalog().await?;

        let difficulties = self.difficulties.clone();
        for difficulty in difficulties {
            self.announce(&catalog, difficulty, &recommended).await?;
        }

        Ok(())
    }

    async fn announce(
        &mut self,
        catalog: &[Question],
        difficulty: Difficulty,
        recommended: &HashSet<u32>,
    ) -> Result<()> {
        let text = pick_announcement(
            catalog,
            difficulty,
            recommended,
            &self.base_url,
            &mut self.rng,
            &self.leetcode,
        )
        .await?;

        tracing::info!("Announcement:\n{}", text);

        let report = self.publisher.publish(&text).await;
        let failed = report.failures().count();
        if failed > 0 {
            tracing::warn!(
                "{} of {} deliveries failed",
                failed,
                report.deliveries.len()
            );
        }
        report.into_result()
    }
}

/// Build the candidate pool for `difficulty`, run the quality-gated search
/// and render the winner.
pub async fn pick_announcement<R, P>(
    catalog: &[Question],
    difficulty: Difficulty,
    recommended: &HashSet<u32>,
    base_url: &Url,
    rng: &mut R,
    probe: &P,
) -> Result<String>
where
    R: Rng,
    P: QualityProbe,
{
    let pool = candidate_pool(catalog, difficulty, recommended);
    let selector = Selector::new(&pool);
    tracing::info!(
        "{} candidates for {} (level {}, at most {} quality checks)",
        pool.len(),
        difficulty,
        difficulty.level(),
        selector.max_attempts()
    );

    let question = selector.select(rng, probe).await?;
    tracing::info!("Picked {}. {} ({})", question.id, question.title, question.difficulty);

    Ok(format_text(
        base_url,
        question.id,
        &question.title,
        &question.slug,
        question.difficulty.label(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::QualitySignal;

    struct ApproveOnly(&'static str);

    impl QualityProbe for ApproveOnly {
        async fn quality(&self, slug: &str) -> Result<QualitySignal> {
            if slug == self.0 {
                Ok(QualitySignal { likes: 4000, dislikes: 100 })
            } else {
                Ok(QualitySignal { likes: 100, dislikes: 4000 })
            }
        }
    }

    fn question(id: u32, slug: &str, difficulty: Difficulty, paid_only: bool) -> Question {
        Question {
            id,
            title: slug.replace('-', " "),
            slug: slug.to_string(),
            difficulty,
            paid_only,
        }
    }

    fn base() -> Url {
        Url::parse("https://leetcode.com/").unwrap()
    }

    #[tokio::test]
    async fn announces_the_approved_question() {
        let catalog = vec![
            question(1, "two-sum", Difficulty::Easy, false),
            question(2, "add-two-numbers", Difficulty::Easy, false),
            question(3, "valid-parentheses", Difficulty::Easy, false),
        ];
        let recommended = recommended_id_set(&[2]);
        assert_eq!(candidate_pool(&catalog, Difficulty::Easy, &recommended).len(), 4);

        let mut rng = StdRng::seed_from_u64(11);
        let text = pick_announcement(
            &catalog,
            Difficulty::Easy,
            &recommended,
            &base(),
            &mut rng,
            &ApproveOnly("valid-parentheses"),
        )
        .await
        .unwrap();

        assert_eq!(
            text,
            "3. valid parentheses - Easy\nhttps://leetcode.com/problems/valid-parentheses/"
        );
    }

    #[tokio::test]
    async fn labels_recommended_question_with_its_own_difficulty() {
        let catalog = vec![
            question(1, "two-sum", Difficulty::Easy, false),
            question(4, "median-of-two-sorted-arrays", Difficulty::Hard, true),
        ];
        let mut rng = StdRng::seed_from_u64(5);
        let text = pick_announcement(
            &catalog,
            Difficulty::Easy,
            &recommended_id_set(&[4]),
            &base(),
            &mut rng,
            &ApproveOnly("median-of-two-sorted-arrays"),
        )
        .await
        .unwrap();

        assert!(text.starts_with("4. median of two sorted arrays - Hard\n"));
    }

    #[tokio::test]
    async fn no_eligible_question_fails_the_run() {
        let catalog = vec![question(1, "two-sum", Difficulty::Easy, true)];
        let mut rng = StdRng::seed_from_u64(0);
        let result = pick_announcement(
            &catalog,
            Difficulty::Easy,
            &HashSet::new(),
            &base(),
            &mut rng,
            &ApproveOnly("two-sum"),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::ExhaustedCandidates { attempts: 0 })
        ));
    }
}
