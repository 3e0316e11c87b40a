// src/transport/mod.rs — Progress stream transports
//
// Two ways to ask for a bulk action's records: a `GET` subscription with
// query parameters or a `POST` with a JSON body. Which one is used comes
// from config. Either way the response body is framed by the same decoder,
// so both deliver identical events for identical bytes.

pub mod body;
pub mod decoder;

use async_trait::async_trait;

use crate::backend::endpoint_url;
use crate::core::types::StartRequest;
use crate::infra::config::TransportKind;
use crate::infra::errors::BulkOpsError;

pub use body::StreamedBody;

/// Path of the streaming bulk-action endpoint, relative to the backend URL.
pub const PROCESS_PATH: &str = "/api/process_data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The server accepted the request and the stream is live.
    Opened,
    /// One raw record payload, not yet parsed.
    Payload(String),
    /// A record that could not be decoded. The stream carries on.
    Malformed(String),
    /// Connection or protocol failure. Nothing more will arrive.
    Error(String),
}

/// A live progress stream for one session.
#[async_trait]
pub trait Transport: Send {
    /// Next event, or `None` once the stream has ended or been closed.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Drop the connection. Safe to call more than once.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Opens a transport for a start request.
pub trait TransportFactory: Send + Sync {
    fn open(&self, request: &StartRequest) -> Result<Box<dyn Transport>, BulkOpsError>;
}

/// Opens real HTTP transports against the backend.
pub struct HttpTransportFactory {
    client: reqwest::Client,
    endpoint: url::Url,
    kind: TransportKind,
}

impl HttpTransportFactory {
    pub fn new(base_url: &str, kind: TransportKind) -> Result<Self, BulkOpsError> {
        Ok(Self {
            // No overall timeout: the session deadline governs stream lifetime.
            client: reqwest::Client::new(),
            endpoint: endpoint_url(base_url, PROCESS_PATH)?,
            kind,
        })
    }

    /// The HTTP request that starts the action. Reconnects are never
    /// attempted: a bulk action must not be started twice.
    fn request(&self, request: &StartRequest) -> reqwest::RequestBuilder {
        let builder = match self.kind {
            TransportKind::EventSubscription => self
                .client
                .get(self.endpoint.clone())
                .query(&request.query_pairs()),
            TransportKind::ChunkedPull => self.client.post(self.endpoint.clone()).json(request),
        };
        builder.header(reqwest::header::ACCEPT, "text/event-stream")
    }
}

impl TransportFactory for HttpTransportFactory {
    fn open(&self, request: &StartRequest) -> Result<Box<dyn Transport>, BulkOpsError> {
        tracing::debug!(kind = %self.kind, url = %self.endpoint, "opening transport");
        Ok(Box::new(StreamedBody::send(self.request(request))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_endpoint() {
        let f = HttpTransportFactory::new("http://127.0.0.1:5000/", TransportKind::ChunkedPull)
            .unwrap();
        assert_eq!(f.endpoint.as_str(), "http://127.0.0.1:5000/api/process_data");
    }

    fn start_request() -> StartRequest {
        let action = crate::core::types::ActionSpec {
            name: "delete-invoices".into(),
            label: "Delete invoices".into(),
            endpoint: "invoices".into(),
            action: "delete".into(),
            branch_filter: true,
            extra_param: None,
        };
        let identity = crate::core::types::Identity {
            shop_name: "demo".into(),
            session_id: "sess-1".into(),
        };
        StartRequest::new(&identity, &action, Some("7"))
    }

    #[test]
    fn test_request_shape_per_kind() {
        let get = HttpTransportFactory::new("http://127.0.0.1:5000", TransportKind::EventSubscription)
            .unwrap()
            .request(&start_request())
            .build()
            .unwrap();
        assert_eq!(get.method(), reqwest::Method::GET);
        let query = get.url().query().unwrap_or_default();
        assert!(query.contains("endpoint=invoices"), "{query}");
        assert!(query.contains("branch_id=7"), "{query}");
        assert!(get.body().is_none());

        let post = HttpTransportFactory::new("http://127.0.0.1:5000", TransportKind::ChunkedPull)
            .unwrap()
            .request(&start_request())
            .build()
            .unwrap();
        assert_eq!(post.method(), reqwest::Method::POST);
        assert!(post.url().query().is_none());
        assert_eq!(post.headers()[reqwest::header::ACCEPT], "text/event-stream");
    }

    #[test]
    fn test_factory_rejects_bad_url() {
        assert!(HttpTransportFactory::new("nope", TransportKind::EventSubscription).is_err());
    }
}
