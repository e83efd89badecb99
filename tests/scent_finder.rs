#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use fleur::catalog::{seed::seed_catalog, Catalog};
    use fleur::config::{DatabaseConfig, ScentConfig};
    use fleur::db::{get_connection, DbPool};
    use fleur::llm::models::{ChatOptions, ChatResponse, Message};
    use fleur::llm::{CompletionGateway, LlmError, LlmProvider};
    use fleur::scent::{QuizAnswer, ScentError, ScentFinder};

    struct JsonProvider {
        payload: &'static str,
    }

    #[async_trait]
    impl LlmProvider for JsonProvider {
        fn name(&self) -> &str {
            "json"
        }

        async fn chat(&self, _messages: &[Message], _options: ChatOptions) -> Result<ChatResponse, LlmError> {
            Ok(ChatResponse {
                content: self.payload.to_string(),
                model: "json-1".to_string(),
                usage: None,
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn chat(&self, _messages: &[Message], _options: ChatOptions) -> Result<ChatResponse, LlmError> {
            Err(LlmError::Upstream {
                status: 502,
                body: "bad gateway".to_string(),
            })
        }
    }

    fn test_pool() -> DbPool {
        let pool = get_connection(&DatabaseConfig {
            path: ":memory:".to_string(),
        })
        .unwrap();
        {
            let conn = pool.lock().unwrap();
            seed_catalog(&conn).unwrap();
        }
        pool
    }

    fn finder(pool: DbPool, provider: Arc<dyn LlmProvider>) -> ScentFinder {
        let gateway = Arc::new(CompletionGateway::new(provider, Duration::from_secs(5)));
        ScentFinder::new(Catalog::new(pool), gateway, &ScentConfig { fuzzy_threshold: 0.5 })
    }

    fn full_answers() -> Vec<QuizAnswer> {
        vec![
            QuizAnswer {
                question_id: "mood".to_string(),
                answer: "calm and relaxed".to_string(),
            },
            QuizAnswer {
                question_id: "space".to_string(),
                answer: "bedroom".to_string(),
            },
            QuizAnswer {
                question_id: "scent_family".to_string(),
                answer: "fresh and floral".to_string(),
            },
            QuizAnswer {
                question_id: "intensity".to_string(),
                answer: "soft and subtle".to_string(),
            },
        ]
    }

    fn catalog_names(pool: &DbPool) -> HashSet<String> {
        Catalog::new(pool.clone())
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect()
    }

    fn assert_sorted_desc(scores: &[u8]) {
        for pair in scores.windows(2) {
            assert!(pair[0] >= pair[1], "scores not descending: {:?}", scores);
        }
    }

    #[tokio::test]
    async fn test_well_formed_quiz_returns_three_catalog_entries() {
        let pool = test_pool();
        let finder = finder(
            pool.clone(),
            Arc::new(JsonProvider {
                payload: r#"{"recommendations": [
                    {"name": "Ocean Secrets", "reason": "calming marine notes", "match_score": 95, "price": 300.0},
                    {"name": "Lavender Bliss", "reason": "made for sleep", "match_score": 90, "price": 280.0},
                    {"name": "Elegance", "reason": "a refined finish", "match_score": 85, "price": 350.0}
                ]}"#,
            }),
        );

        let recs = finder.recommend(&full_answers()).await.unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].name, "Ocean Secrets");

        let names = catalog_names(&pool);
        for r in &recs {
            assert!(names.contains(&r.name), "{} not in catalog", r.name);
        }
        let scores: Vec<u8> = recs.iter().map(|r| r.match_score).collect();
        assert_sorted_desc(&scores);
    }

    #[tokio::test]
    async fn test_catalog_price_overrides_model_price() {
        let pool = test_pool();
        let finder = finder(
            pool,
            Arc::new(JsonProvider {
                payload: r#"{"recommendations": [
                    {"name": "Ocean Secrets", "reason": "marine calm", "match_score": 95, "price": 999.0},
                    {"name": "Lavender Bliss", "reason": "sleepy", "match_score": 90, "price": 1.0},
                    {"name": "Elegance", "reason": "refined", "match_score": 85, "price": 0.0}
                ]}"#,
            }),
        );

        let recs = finder.recommend(&full_answers()).await.unwrap();
        assert_eq!(recs[0].price, 300.0);
        assert_eq!(recs[1].price, 280.0);
        assert_eq!(recs[2].price, 350.0);
    }

    #[tokio::test]
    async fn test_fuzzy_match_resolves_near_names() {
        let pool = test_pool();
        let finder = finder(
            pool,
            Arc::new(JsonProvider {
                // Singular "Ocean Secret" and a wordy "the Lavender Bliss oil"
                payload: r#"{"recommendations": [
                    {"name": "Ocean Secret", "reason": "marine calm", "match_score": 95, "price": 999.0},
                    {"name": "the Lavender Bliss oil", "reason": "sleepy", "match_score": 90, "price": 280.0},
                    {"name": "Elegance", "reason": "refined", "match_score": 85, "price": 350.0}
                ]}"#,
            }),
        );

        let recs = finder.recommend(&full_answers()).await.unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].name, "Ocean Secrets");
        assert_eq!(recs[0].price, 300.0);
        assert_eq!(recs[1].name, "Lavender Bliss");
    }

    #[tokio::test]
    async fn test_fictitious_candidate_dropped_and_backfilled() {
        let pool = test_pool();
        let finder = finder(
            pool.clone(),
            Arc::new(JsonProvider {
                payload: r#"{"recommendations": [
                    {"name": "Lavender Bliss", "reason": "sleepy", "match_score": 90, "price": 280.0},
                    {"name": "Desert Phantom Mirage", "reason": "invented", "match_score": 80, "price": 450.0}
                ]}"#,
            }),
        );

        let recs = finder.recommend(&full_answers()).await.unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].name, "Lavender Bliss");
        assert!(recs.iter().all(|r| r.name != "Desert Phantom Mirage"));

        let names = catalog_names(&pool);
        for r in &recs {
            assert!(names.contains(&r.name), "{} not in catalog", r.name);
        }
        let scores: Vec<u8> = recs.iter().map(|r| r.match_score).collect();
        assert_sorted_desc(&scores);
    }

    #[tokio::test]
    async fn test_gateway_failure_still_returns_three() {
        let pool = test_pool();
        let finder = finder(pool.clone(), Arc::new(FailingProvider));

        let recs = finder.recommend(&full_answers()).await.unwrap();
        assert_eq!(recs.len(), 3);

        let names = catalog_names(&pool);
        for r in &recs {
            assert!(names.contains(&r.name), "{} not in catalog", r.name);
        }
        let scores: Vec<u8> = recs.iter().map(|r| r.match_score).collect();
        assert_sorted_desc(&scores);
    }

    #[tokio::test]
    async fn test_unparseable_response_still_returns_three() {
        let pool = test_pool();
        let finder = finder(
            pool,
            Arc::new(JsonProvider {
                payload: "I would suggest something floral, perhaps?",
            }),
        );

        let recs = finder.recommend(&full_answers()).await.unwrap();
        assert_eq!(recs.len(), 3);
    }

    #[tokio::test]
    async fn test_code_fenced_json_is_accepted() {
        let pool = test_pool();
        let finder = finder(
            pool,
            Arc::new(JsonProvider {
                payload: "```json\n{\"recommendations\": [{\"name\": \"Fleur Rose\", \"reason\": \"classic\", \"match_score\": 88, \"price\": 280.0}]}\n```",
            }),
        );

        let recs = finder.recommend(&full_answers()).await.unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].name, "Fleur Rose");
    }

    #[tokio::test]
    async fn test_incomplete_quiz_rejected() {
        let pool = test_pool();
        let finder = finder(pool, Arc::new(FailingProvider));

        let mut missing = full_answers();
        missing.pop();
        let err = finder.recommend(&missing).await.unwrap_err();
        assert!(matches!(err, ScentError::IncompleteQuiz(_)));

        let mut duplicated = full_answers();
        duplicated[3] = duplicated[0].clone();
        let err = finder.recommend(&duplicated).await.unwrap_err();
        assert!(matches!(err, ScentError::IncompleteQuiz(_)));

        let mut unknown = full_answers();
        unknown[0].question_id = "favourite_colour".to_string();
        let err = finder.recommend(&unknown).await.unwrap_err();
        assert!(matches!(err, ScentError::IncompleteQuiz(_)));
    }
}
