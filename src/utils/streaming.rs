//! Common streaming utilities.
//!
//! This module turns a reqwest response into a lazy stream of text lines,
//! with the HTTP status checked up front. Both pipes build on it: the
//! Perplexity normalizer consumes the lines one by one, and the AGI pipe
//! forwards them to the host verbatim.

use futures_util::StreamExt;

use crate::error::{PipeError, classify_http_error};
use crate::types::FragmentStream;

/// Stream factory for creating line-oriented response streams.
pub struct StreamFactory;

impl StreamFactory {
    /// Send `request_builder` and expose the response body as a stream of
    /// lines.
    ///
    /// Fails before producing a stream when the request cannot be sent or
    /// the response status is not 2xx; in the latter case the error carries
    /// the upstream's own error message when the body provides one.
    pub async fn create_line_stream(
        request_builder: reqwest::RequestBuilder,
    ) -> Result<FragmentStream, PipeError> {
        let response = request_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status, &error_text));
        }

        Ok(Self::lines(response))
    }

    /// Split a response body into lines as chunks arrive.
    ///
    /// Lines are separated by `\n`, with a trailing `\r` trimmed. Bytes are
    /// buffered until a full line is available, so multi-byte characters
    /// split across chunk boundaries survive intact; a non-terminated tail
    /// is flushed when the body ends. A failed chunk read ends the stream
    /// with one `Err` item.
    fn lines(response: reqwest::Response) -> FragmentStream {
        Box::pin(async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut byte_stream = Box::pin(response.bytes_stream());

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(PipeError::StreamError(format!("Stream error: {e}")));
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);

                while let Some(newline_pos) = buffer.iter().position(|&byte| byte == b'\n') {
                    let mut line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    yield Ok(String::from_utf8_lossy(&line).into_owned());
                }
            }

            if !buffer.is_empty() {
                yield Ok(String::from_utf8_lossy(&buffer).into_owned());
            }
        })
    }
}
