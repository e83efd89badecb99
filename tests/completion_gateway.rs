#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;

    use fleur::llm::models::{ChatOptions, ChatResponse, Message};
    use fleur::llm::{CompletionGateway, LlmError, LlmProvider};

    #[derive(Debug, Deserialize)]
    struct Shape {
        items: Vec<String>,
    }

    /// Counts calls and replays a scripted outcome on every attempt.
    struct ScriptedProvider {
        calls: Arc<AtomicUsize>,
        outcome: Outcome,
    }

    enum Outcome {
        Reply(&'static str),
        Upstream(u16),
        Slow,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _messages: &[Message], _options: ChatOptions) -> Result<ChatResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Reply(text) => Ok(ChatResponse {
                    content: text.to_string(),
                    model: "scripted-1".to_string(),
                    usage: None,
                }),
                Outcome::Upstream(status) => Err(LlmError::Upstream {
                    status,
                    body: "scripted failure".to_string(),
                }),
                Outcome::Slow => {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(ChatResponse {
                        content: "too late".to_string(),
                        model: "scripted-1".to_string(),
                        usage: None,
                    })
                }
            }
        }
    }

    fn gateway(outcome: Outcome, timeout: Duration) -> (CompletionGateway, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = ScriptedProvider {
            calls: calls.clone(),
            outcome,
        };
        (CompletionGateway::new(Arc::new(provider), timeout), calls)
    }

    fn turns() -> Vec<Message> {
        vec![Message::user("hello")]
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let (gateway, calls) = gateway(Outcome::Reply("hi"), Duration::from_secs(1));

        let response = gateway.complete("system", &turns()).await.unwrap();
        assert_eq!(response.content, "hi");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_errors_get_exactly_one_retry() {
        let (gateway, calls) = gateway(Outcome::Upstream(503), Duration::from_secs(1));

        let err = gateway.complete("system", &turns()).await.unwrap_err();
        assert!(matches!(err, LlmError::Upstream { status: 503, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let (gateway, calls) = gateway(Outcome::Upstream(400), Duration::from_secs(1));

        let err = gateway.complete("system", &turns()).await.unwrap_err();
        assert!(matches!(err, LlmError::Upstream { status: 400, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out_and_retries_once() {
        let (gateway, calls) = gateway(Outcome::Slow, Duration::from_millis(20));

        let err = gateway.complete("system", &turns()).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_structured_parse_failure_is_malformed_without_retry() {
        let (gateway, calls) = gateway(Outcome::Reply("not json at all"), Duration::from_secs(1));

        let err = gateway
            .complete_structured::<Shape>("system", &turns())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Malformed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_structured_strips_code_fences() {
        let (gateway, _) = gateway(
            Outcome::Reply("```json\n{\"items\": [\"a\", \"b\"]}\n```"),
            Duration::from_secs(1),
        );

        let shape: Shape = gateway.complete_structured("system", &turns()).await.unwrap();
        assert_eq!(shape.items, vec!["a", "b"]);
    }
}
