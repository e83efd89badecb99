use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Product};
use crate::config::ScentConfig;
use crate::llm::models::Message as LlmMessage;
use crate::llm::CompletionGateway;

/// The fixed quiz schema. The storefront collects exactly one answer per
/// question and submits them together; partial submissions are rejected.
pub const QUIZ_QUESTIONS: [&str; 4] = ["mood", "space", "scent_family", "intensity"];

const RESULT_SIZE: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: String,
    pub answer: String,
}

/// What the model claims, before any of it is trusted. The asserted price
/// is read only to log how far off it was.
#[derive(Debug, Deserialize)]
struct Candidate {
    name: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    match_score: u8,
    #[serde(default)]
    price: f64,
}

#[derive(Debug, Deserialize)]
struct CandidateList {
    recommendations: Vec<Candidate>,
}

/// A recommendation the caller may trust: the name and price come from the
/// catalog, never from the model.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub reason: String,
    pub match_score: u8,
    pub price: f64,
}

#[derive(Debug, Error)]
pub enum ScentError {
    #[error("incomplete quiz: {0}")]
    IncompleteQuiz(String),
    #[error("catalog store error: {0}")]
    Store(#[from] duckdb::Error),
}

pub struct ScentFinder {
    catalog: Catalog,
    gateway: Arc<CompletionGateway>,
    fuzzy_threshold: f32,
}

impl ScentFinder {
    pub fn new(catalog: Catalog, gateway: Arc<CompletionGateway>, config: &ScentConfig) -> Self {
        Self {
            catalog,
            gateway,
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }

    /// Turns a completed quiz into exactly three catalog-backed picks.
    ///
    /// The model ranks; the catalog decides what exists and what it costs.
    /// Any failure past input validation degrades to the deterministic
    /// catalog fallback, so a well-formed submission always gets a full
    /// result.
    pub async fn recommend(&self, answers: &[QuizAnswer]) -> Result<Vec<Recommendation>, ScentError> {
        validate_answers(answers)?;

        let products = self.catalog.list_all()?;
        let prompt = build_prompt(&products);
        let turns = [LlmMessage::user(render_answers(answers))];

        let candidates = match self
            .gateway
            .complete_structured::<CandidateList>(&prompt, &turns)
            .await
        {
            Ok(list) => list.recommendations,
            Err(e) => {
                warn!(error = %e, "scent-finder completion failed, using catalog fallback");
                Vec::new()
            }
        };

        let mut picks = self.reconcile(candidates, &products);
        backfill(&mut picks, &products, answers);
        Ok(picks)
    }

    /// Per-candidate reconciliation: exact name match first, one fuzzy pass
    /// second, drop third. Duplicates collapsing onto the same product keep
    /// only the highest-ranked occurrence.
    fn reconcile(&self, mut candidates: Vec<Candidate>, products: &[Product]) -> Vec<Recommendation> {
        candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        let mut picks = Vec::new();
        let mut chosen: HashSet<String> = HashSet::new();

        for candidate in candidates {
            let resolved = exact_match(&candidate.name, products)
                .or_else(|| fuzzy_match(&candidate.name, products, self.fuzzy_threshold));

            let Some(product) = resolved else {
                warn!(name = %candidate.name, "model suggested a product not in the catalog, dropping");
                continue;
            };

            if !chosen.insert(product.id.clone()) {
                continue;
            }

            if (candidate.price - product.price).abs() > f64::EPSILON {
                debug!(
                    name = %product.name,
                    asserted = candidate.price,
                    actual = product.price,
                    "overriding model-asserted price"
                );
            }

            picks.push(Recommendation {
                name: product.name.clone(),
                reason: candidate.reason,
                match_score: candidate.match_score.min(100),
                price: product.price,
            });

            if picks.len() == RESULT_SIZE {
                break;
            }
        }

        picks
    }
}

fn validate_answers(answers: &[QuizAnswer]) -> Result<(), ScentError> {
    let mut seen = HashSet::new();
    for a in answers {
        if !QUIZ_QUESTIONS.contains(&a.question_id.as_str()) {
            return Err(ScentError::IncompleteQuiz(format!(
                "unknown question '{}'",
                a.question_id
            )));
        }
        if !seen.insert(a.question_id.as_str()) {
            return Err(ScentError::IncompleteQuiz(format!(
                "duplicate answer for '{}'",
                a.question_id
            )));
        }
    }
    for q in QUIZ_QUESTIONS {
        if !seen.contains(q) {
            return Err(ScentError::IncompleteQuiz(format!("missing answer for '{}'", q)));
        }
    }
    Ok(())
}

fn build_prompt(products: &[Product]) -> String {
    let mut catalog_lines = String::new();
    for p in products {
        catalog_lines.push_str(&format!(
            "- {} | {} | ₹{:.2} | rated {:.1}\n",
            p.name, p.scent_family, p.price, p.rating
        ));
    }

    format!(
        r#"You are the fragrance matcher for Fleur Fragrances. Based on the customer's quiz answers, pick the {RESULT_SIZE} best matches from the collection below. Choose ONLY from this collection; never invent a product.

Collection (name | scent family | price | rating):
{catalog_lines}
Return only valid JSON, no prose, in this exact shape:
{{"recommendations": [{{"name": "...", "reason": "...", "match_score": 0-100, "price": 0.0}}]}}
Order the list by descending match_score."#
    )
}

fn render_answers(answers: &[QuizAnswer]) -> String {
    answers
        .iter()
        .map(|a| format!("- {}: {}", a.question_id, a.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

fn exact_match<'a>(name: &str, products: &'a [Product]) -> Option<&'a Product> {
    let needle = name.trim().to_lowercase();
    products.iter().find(|p| p.name.to_lowercase() == needle)
}

fn fuzzy_match<'a>(name: &str, products: &'a [Product], threshold: f32) -> Option<&'a Product> {
    let mut best: Option<(f32, &Product)> = None;
    for p in products {
        let score = name_similarity(name, &p.name);
        if score >= threshold && best.map_or(true, |(s, _)| score > s) {
            best = Some((score, p));
        }
    }
    best.map(|(_, p)| p)
}

/// Token overlap with prefix tolerance, so "Ocean Secret" still lands on
/// "Ocean Secrets" and "the Lavender Bliss oil" on "Lavender Bliss".
fn name_similarity(a: &str, b: &str) -> f32 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let matched = ta
        .iter()
        .filter(|x| tb.iter().any(|y| tokens_agree(x, y)))
        .count();

    matched as f32 / ta.len().max(tb.len()) as f32
}

fn tokens_agree(a: &str, b: &str) -> bool {
    a == b || (a.len() >= 3 && b.starts_with(a)) || (b.len() >= 3 && a.starts_with(b))
}

fn tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deterministic completion of the result: scent families the customer
/// actually mentioned first, then overall rating, with synthetic scores kept
/// below whatever the model ranking already established.
fn backfill(picks: &mut Vec<Recommendation>, products: &[Product], answers: &[QuizAnswer]) {
    if picks.len() >= RESULT_SIZE {
        return;
    }

    let mentioned = mentioned_families(answers, products);

    let mut pool: Vec<&Product> = products.iter().collect();
    pool.sort_by(|a, b| {
        let a_hit = mentioned.contains(&a.scent_family.to_lowercase());
        let b_hit = mentioned.contains(&b.scent_family.to_lowercase());
        b_hit
            .cmp(&a_hit)
            .then(b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut next_score = picks
        .last()
        .map(|r| r.match_score.saturating_sub(5))
        .unwrap_or(90);

    for product in pool {
        if picks.len() == RESULT_SIZE {
            break;
        }
        if picks.iter().any(|r| r.name == product.name) {
            continue;
        }
        picks.push(Recommendation {
            name: product.name.clone(),
            reason: format!(
                "A {} favourite from the collection, rated {:.1} by our customers.",
                product.scent_family.to_lowercase(),
                product.rating
            ),
            match_score: next_score,
            price: product.price,
        });
        next_score = next_score.saturating_sub(5);
    }
}

fn mentioned_families(answers: &[QuizAnswer], products: &[Product]) -> HashSet<String> {
    let families: HashSet<String> = products.iter().map(|p| p.scent_family.to_lowercase()).collect();

    let text = answers
        .iter()
        .map(|a| a.answer.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    families
        .into_iter()
        .filter(|family| text.contains(family.as_str()))
        .collect()
}
