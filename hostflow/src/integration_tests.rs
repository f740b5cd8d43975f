//! End-to-end tests exercising the host against the mock listener.

#[cfg(test)]
mod tests {
    use crate::errors::HostError;
    use crate::host::{Host, HostState};
    use crate::logging::{CollectingSink, HostEvent};
    use crate::pipeline::{Environment, Middleware, Next};
    use crate::shutdown::ShutdownSignal;
    use crate::testing::{MockListener, PanickingSink, RecordingMiddleware};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct ShutdownAwareMiddleware {
        shutdown: Arc<ShutdownSignal>,
    }

    #[async_trait]
    impl Middleware for ShutdownAwareMiddleware {
        async fn handle(&self, env: &mut Environment, next: Next<'_>) -> Result<(), HostError> {
            env.insert(
                "shutting_down".to_string(),
                serde_json::Value::Bool(self.shutdown.is_shutting_down()),
            );
            next.run(env).await
        }
    }

    struct FailingMiddleware;

    #[async_trait]
    impl Middleware for FailingMiddleware {
        async fn handle(&self, _env: &mut Environment, _next: Next<'_>) -> Result<(), HostError> {
            Err(HostError::Pipeline("request rejected".to_string()))
        }
    }

    #[tokio::test]
    async fn test_full_request_flow() {
        let listener = MockListener::new();
        let handle = listener.clone();

        let mut host = Host::new(listener, |builder| {
            Ok(builder
                .wrap(Arc::new(RecordingMiddleware::new("auth")))
                .wrap(Arc::new(RecordingMiddleware::new("router"))))
        });
        let user = Arc::new(CollectingSink::new());
        host.set_logger(user.clone()).ok();
        let stats = host.enable_statistics().ok();

        host.start(true).await.ok();
        assert_eq!(host.state(), HostState::Started);

        // The listener accepts a connection and serves a request
        handle.record_event(&HostEvent::ConnectionReceived {
            peer: "127.0.0.1:9100".to_string(),
        });
        let mut request = handle.build_request(1);
        assert!(request.process().await.is_ok());
        handle.record_event(&HostEvent::RequestProcessed {
            elapsed: Duration::from_millis(5),
        });

        assert_eq!(
            request.environment.get("trail"),
            Some(&serde_json::json!(["auth", "router"]))
        );
        assert_eq!(user.len(), 2);
        assert!(stats.is_some_and(|s| {
            let snapshot = s.snapshot();
            snapshot.connections_received == 1 && snapshot.requests_processed == 1
        }));
    }

    #[tokio::test]
    async fn test_identity_pipeline_end_to_end() {
        let listener = MockListener::new();
        let handle = listener.clone();
        let mut host = Host::new(listener, Ok);

        host.start(true).await.ok();

        let mut request = handle.build_request(1);
        request
            .environment
            .insert("body".to_string(), serde_json::json!("unchanged"));

        assert!(request.process().await.is_ok());
        assert_eq!(
            request.environment.get("body"),
            Some(&serde_json::json!("unchanged"))
        );
    }

    #[tokio::test]
    async fn test_middleware_observes_shutdown_through_builder() {
        let listener = MockListener::new();
        let handle = listener.clone();

        let mut host = Host::new(listener, |builder| {
            let middleware = ShutdownAwareMiddleware {
                shutdown: builder.shutdown().clone(),
            };
            Ok(builder.wrap(Arc::new(middleware)))
        });

        host.start(true).await.ok();

        let mut before = handle.build_request(1);
        before.process().await.ok();
        assert_eq!(
            before.environment.get("shutting_down"),
            Some(&serde_json::Value::Bool(false))
        );

        // A request constructed before stop can still reach the pipeline
        let mut in_flight = handle.build_request(2);
        host.stop();

        in_flight.process().await.ok();
        assert_eq!(
            in_flight.environment.get("shutting_down"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[tokio::test]
    async fn test_pipeline_error_reaches_caller_and_stats() {
        let listener = MockListener::new();
        let handle = listener.clone();

        let mut host = Host::new(listener, |builder| {
            Ok(builder.wrap(Arc::new(FailingMiddleware)))
        });
        let stats = host.enable_statistics().ok();

        host.start(true).await.ok();

        let mut request = handle.build_request(1);
        let result = request.process().await;
        assert!(matches!(result, Err(HostError::Pipeline(_))));

        // Request processing reports the failure through the logging surface
        handle.record_event(&HostEvent::ApplicationError {
            message: "request rejected".to_string(),
        });
        assert!(stats.is_some_and(|s| s.snapshot().application_errors == 1));
    }

    #[tokio::test]
    async fn test_panicking_user_sink_does_not_starve_statistics() {
        let listener = MockListener::new();
        let handle = listener.clone();

        let mut host = Host::new(listener, Ok);
        host.set_logger(Arc::new(PanickingSink)).ok();
        let stats = host.enable_statistics().ok();

        host.start(true).await.ok();

        handle.record_event(&HostEvent::ConnectionReceived {
            peer: "127.0.0.1:9200".to_string(),
        });

        assert!(stats.is_some_and(|s| s.snapshot().connections_received == 1));
    }
}
