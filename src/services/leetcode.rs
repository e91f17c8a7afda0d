use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Difficulty, QualitySignal, Question};
use crate::selection::QualityProbe;

const USER_AGENT: &str = concat!("daily-leetcode/", env!("CARGO_PKG_VERSION"));
const QUESTION_DATA_OPERATION: &str = "questionData";
const QUESTION_DATA_QUERY: &str = "query questionData($titleSlug: String!) {\n  question(titleSlug: $titleSlug) {\n    questionId\n    questionFrontendId\n    title\n    titleSlug\n    isPaidOnly\n    difficulty\n    likes\n    dislikes\n  }\n}\n";

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    stat_status_pairs: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    stat: CatalogStat,
    difficulty: CatalogDifficulty,
    #[serde(default)]
    paid_only: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogStat {
    frontend_question_id: u32,
    #[serde(rename = "question__title")]
    title: String,
    #[serde(rename = "question__title_slug")]
    slug: String,
}

#[derive(Debug, Deserialize)]
struct CatalogDifficulty {
    level: u8,
}

#[derive(Debug, Deserialize)]
struct RecommendedListResponse {
    questions: Vec<RecommendedQuestion>,
}

#[derive(Debug, Deserialize)]
struct RecommendedQuestion {
    id: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    operation_name: &'a str,
    variables: QuestionDataVariables<'a>,
    query: &'a str,
}

#[derive(Debug, Serialize)]
struct QuestionDataVariables<'a> {
    #[serde(rename = "titleSlug")]
    title_slug: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<QuestionData>,
}

#[derive(Debug, Deserialize)]
struct QuestionData {
    question: Option<QualitySignal>,
}

/// Client for the public LeetCode catalog, list and GraphQL endpoints.
pub struct LeetCodeClient {
    client: Client,
    catalog_url: Url,
    recommended_url: Url,
    graphql_url: Url,
}

impl LeetCodeClient {
    pub fn new(base_url: &Url, recommended_list_id: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            catalog_url: base_url.join("api/problems/all/")?,
            recommended_url: base_url
                .join(&format!("list/api/get_list/{}/", recommended_list_id))?,
            graphql_url: base_url.join("graphql")?,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self.client.get(url.clone()).send().await?;
        let response = check_status(response, url)?;
        Ok(response.json().await?)
    }

    /// Ids of the curated recommended list, in list order.
    pub async fn fetch_recommended_ids(&self) -> Result<Vec<u32>> {
        let list: RecommendedListResponse = self.fetch_json(&self.recommended_url).await?;
        let ids: Vec<u32> = list.questions.into_iter().map(|q| q.id).collect();
        tracing::info!("Fetched {} recommended question ids", ids.len());
        Ok(ids)
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<Question>> {
        let catalog: CatalogResponse = self.fetch_json(&self.catalog_url).await?;
        let questions = questions_from_catalog(catalog);
        tracing::info!("Fetched {} catalog questions", questions.len());
        Ok(questions)
    }

    pub async fn fetch_quality(&self, slug: &str) -> Result<QualitySignal> {
        let request = GraphqlRequest {
            operation_name: QUESTION_DATA_OPERATION,
            variables: QuestionDataVariables { title_slug: slug },
            query: QUESTION_DATA_QUERY,
        };

        let response = self
            .client
            .post(self.graphql_url.clone())
            .json(&request)
            .send()
            .await?;
        let response = check_status(response, &self.graphql_url)?;

        let body: GraphqlResponse = response.json().await?;
        quality_from_response(body, slug)
    }
}

impl QualityProbe for LeetCodeClient {
    async fn quality(&self, slug: &str) -> Result<QualitySignal> {
        self.fetch_quality(slug).await
    }
}

fn check_status(response: Response, url: &Url) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}

fn questions_from_catalog(catalog: CatalogResponse) -> Vec<Question> {
    catalog
        .stat_status_pairs
        .into_iter()
        .filter_map(|entry| match Difficulty::try_from(entry.difficulty.level) {
            Ok(difficulty) => Some(Question {
                id: entry.stat.frontend_question_id,
                title: entry.stat.title,
                slug: entry.stat.slug,
                difficulty,
                paid_only: entry.paid_only,
            }),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", entry.stat.slug, e);
                None
            }
        })
        .collect()
}

fn quality_from_response(body: GraphqlResponse, slug: &str) -> Result<QualitySignal> {
    body.data
        .and_then(|data| data.question)
        .ok_or_else(|| AppError::QuestionNotFound(slug.to_string()))
}
