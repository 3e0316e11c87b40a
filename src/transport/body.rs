// src/transport/body.rs — Streamed response body framed by `SseDecoder`

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

use super::decoder::SseDecoder;
use super::{Transport, TransportEvent};

type EventStream = Pin<Box<dyn Stream<Item = TransportEvent> + Send>>;

/// A response body read chunk by chunk as it arrives. Records that fail to
/// decode come out as `Malformed` and the body keeps being read.
pub struct StreamedBody {
    stream: Option<EventStream>,
}

impl StreamedBody {
    /// Nothing is sent until the first `next_event`.
    pub fn send(builder: reqwest::RequestBuilder) -> Self {
        let stream = async_stream::stream! {
            let response = match builder.send().await {
                Ok(r) if r.status().is_success() => Some(r),
                Ok(r) => {
                    let status = r.status();
                    let body = r.text().await.unwrap_or_default();
                    yield TransportEvent::Error(format!("HTTP {status}: {}", body.trim()));
                    None
                }
                Err(e) => {
                    yield TransportEvent::Error(format!("request failed: {e}"));
                    None
                }
            };

            if let Some(response) = response {
                yield TransportEvent::Opened;

                let mut decoder = SseDecoder::new();
                let mut byte_stream = std::pin::pin!(response.bytes_stream());

                while let Some(chunk_result) = byte_stream.next().await {
                    let bytes = match chunk_result {
                        Ok(b) => b,
                        Err(e) => {
                            yield TransportEvent::Error(format!("stream read error: {e}"));
                            break;
                        }
                    };

                    for record in decoder.push(&bytes) {
                        yield match record {
                            Ok(payload) => TransportEvent::Payload(payload),
                            Err(e) => TransportEvent::Malformed(e.to_string()),
                        };
                    }
                }

                decoder.finish();
            }
        };

        Self {
            stream: Some(Box::pin(stream)),
        }
    }
}

#[async_trait]
impl Transport for StreamedBody {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        let stream = self.stream.as_mut()?;
        stream.next().await
    }

    fn close(&mut self) {
        self.stream = None;
    }

    fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}
