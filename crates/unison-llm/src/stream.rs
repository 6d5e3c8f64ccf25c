//! Stream reassembly
//!
//! Raw provider chunks are normalized one at a time into [`StreamChunk`]s and
//! yielded in arrival order while an accumulator collects content, the latest
//! usage snapshot and tool-call fragments. Once the source is exhausted the
//! accumulated state is turned back into the provider's complete response type,
//! so a streamed call ends in the same [`CallResponse`] a non-streaming call
//! would produce.

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::convert::{ResponseAdapter, fallback_call_id};
use crate::error::LlmError;
use crate::history::MessageHistory;
use crate::response::{CallResponse, NormalizeOptions};
use crate::types::{CallParams, StreamChunk, ToolCall, ToolCallFragment, Usage};

/// Per-wire-format chunk normalization
///
/// An adapter instance lives for one stream, so formats whose events refer to
/// earlier events (content block indices, running tool-call counters) keep that
/// state on `self`.
pub trait ChunkAdapter: Default + Send {
    /// One raw chunk or event as the provider sends it
    type Chunk: DeserializeOwned + Debug;

    /// Complete response type the stream reassembles into
    type Response: MessageHistory;

    /// Normalize one raw chunk
    fn normalize(&mut self, chunk: &Self::Chunk) -> StreamChunk;

    /// Error message carried in-band by the provider, if this chunk is one
    fn failure(&self, _chunk: &Self::Chunk) -> Option<String> {
        None
    }

    /// Build the complete response from the accumulated stream
    fn assemble(&self, snapshot: &StreamSnapshot) -> Self::Response;
}

/// Accumulated state of a finished stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSnapshot {
    /// Response identifier, when any chunk carried one
    pub id: Option<String>,
    /// Reported model, or the requested model when no chunk carried one
    pub model: String,
    /// Concatenated text deltas
    pub content: String,
    /// Last finish reason seen
    pub finish_reason: Option<String>,
    /// Last non-null usage snapshot
    pub usage: Option<Usage>,
    /// Tool calls assembled from fragments, ordered by index
    pub tool_calls: Vec<AssembledToolCall>,
}

/// A tool call reassembled from stream fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledToolCall {
    /// Position of the call in the response
    pub index: u32,
    /// Identifier from the first fragment that carried one
    pub id: Option<String>,
    /// Function name from the first fragment that carried one
    pub name: String,
    /// Concatenated argument fragments
    pub arguments: String,
}

impl AssembledToolCall {
    /// Provider id, or `call_{index}` when the stream carried none
    pub fn id_or_fallback(&self) -> String {
        self.id.clone().unwrap_or_else(|| fallback_call_id(self.index))
    }

    /// As a raw tool call
    pub fn to_tool_call(&self) -> ToolCall {
        ToolCall::new(self.id_or_fallback(), &self.name, &self.arguments)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    id: Option<String>,
    model: Option<String>,
    content: String,
    finish_reason: Option<String>,
    usage: Option<Usage>,
    tool_calls: BTreeMap<u32, AssembledToolCall>,
}

impl Accumulator {
    fn apply(&mut self, chunk: &StreamChunk) {
        self.content.push_str(&chunk.content);

        if let Some(reason) = &chunk.finish_reason {
            self.finish_reason = Some(reason.clone());
        }
        if let Some(usage) = chunk.usage {
            self.usage = Some(usage);
        }
        if self.id.is_none() {
            self.id.clone_from(&chunk.id);
        }
        if let Some(model) = &chunk.model {
            self.model = Some(model.clone());
        }

        for fragment in &chunk.tool_calls {
            self.apply_fragment(fragment);
        }
    }

    fn apply_fragment(&mut self, fragment: &ToolCallFragment) {
        let call = self
            .tool_calls
            .entry(fragment.index)
            .or_insert_with(|| AssembledToolCall {
                index: fragment.index,
                ..AssembledToolCall::default()
            });

        if call.id.is_none() {
            call.id.clone_from(&fragment.id);
        }
        if call.name.is_empty()
            && let Some(name) = &fragment.name
        {
            call.name.clone_from(name);
        }
        if let Some(arguments) = &fragment.arguments {
            call.arguments.push_str(arguments);
        }
    }

    fn snapshot(&self, requested_model: &str) -> StreamSnapshot {
        StreamSnapshot {
            id: self.id.clone(),
            model: self.model.clone().unwrap_or_else(|| requested_model.to_owned()),
            content: self.content.clone(),
            finish_reason: self.finish_reason.clone(),
            usage: self.usage,
            tool_calls: self.tool_calls.values().cloned().collect(),
        }
    }
}

/// Chunk-by-chunk normalizer and accumulator for one stream
///
/// Owned by the single consumer of the stream; nothing here is shared.
pub struct StreamReassembler<A: ChunkAdapter> {
    adapter: A,
    params: CallParams,
    options: NormalizeOptions,
    accumulator: Accumulator,
    finished: bool,
    failed: bool,
}

impl<A: ChunkAdapter> StreamReassembler<A> {
    /// Reassembler with default normalization options
    pub fn new(params: CallParams) -> Self {
        Self::with_options(params, NormalizeOptions::default())
    }

    /// Reassembler with explicit price table and tool policy
    pub fn with_options(params: CallParams, options: NormalizeOptions) -> Self {
        Self {
            adapter: A::default(),
            params,
            options,
            accumulator: Accumulator::default(),
            finished: false,
            failed: false,
        }
    }

    /// Normalize and accumulate one raw chunk
    ///
    /// An in-band provider error is returned as [`LlmError::Streaming`] and
    /// marks the stream failed.
    pub fn push(&mut self, chunk: &A::Chunk) -> Result<StreamChunk, LlmError> {
        if self.finished {
            return Err(LlmError::StreamMisuse("chunk received after the stream was exhausted"));
        }
        if let Some(message) = self.adapter.failure(chunk) {
            return Err(self.fail(message));
        }

        let normalized = self.adapter.normalize(chunk);
        self.accumulator.apply(&normalized);
        Ok(normalized)
    }

    /// Decode a raw JSON chunk, then [`push`](Self::push) it
    pub fn push_json(&mut self, raw: &str) -> Result<StreamChunk, LlmError> {
        let chunk: A::Chunk = serde_json::from_str(raw).map_err(|source| LlmError::Decode {
            provider: <A::Response as ResponseAdapter>::FORMAT.into(),
            source,
        })?;
        self.push(&chunk)
    }

    /// Mark the source as exhausted
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Record a mid-stream failure, returning it as a streaming error
    ///
    /// A failed stream can never be finalized, even after its source ends.
    pub fn fail(&mut self, message: impl Into<String>) -> LlmError {
        let message = message.into();
        tracing::debug!(provider = %self.params.provider, error = %message, "stream failed");
        self.failed = true;
        LlmError::Streaming(message)
    }

    /// Whether the source has been exhausted
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the stream has seen a source or provider error
    pub const fn is_failed(&self) -> bool {
        self.failed
    }

    /// Text accumulated so far
    pub fn content(&self) -> &str {
        &self.accumulator.content
    }

    /// Latest usage snapshot seen so far
    pub const fn usage(&self) -> Option<Usage> {
        self.accumulator.usage
    }

    /// Call params of the stream
    pub const fn params(&self) -> &CallParams {
        &self.params
    }

    /// Accumulated state, whether or not the stream has finished
    pub fn snapshot(&self) -> StreamSnapshot {
        self.accumulator.snapshot(&self.params.model)
    }

    /// Synthesize the complete response of an exhausted stream
    ///
    /// Fails with [`LlmError::StreamMisuse`] if the stream has not been
    /// exhausted, including when it was abandoned or ended in an error.
    pub fn construct_call_response(&self) -> Result<CallResponse<A::Response>, LlmError> {
        if self.failed {
            tracing::warn!(
                provider = %self.params.provider,
                "construct_call_response called on a stream that failed"
            );
            return Err(LlmError::StreamMisuse(
                "construct_call_response called on a stream that failed",
            ));
        }
        if !self.finished {
            tracing::warn!(
                provider = %self.params.provider,
                "construct_call_response called before the stream was exhausted"
            );
            return Err(LlmError::StreamMisuse(
                "construct_call_response called before the stream was exhausted",
            ));
        }

        let response = self.adapter.assemble(&self.snapshot());
        Ok(CallResponse::with_options(
            response,
            self.params.clone(),
            self.options.clone(),
        ))
    }
}

impl<A: ChunkAdapter> Debug for StreamReassembler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReassembler")
            .field("provider", &self.params.provider)
            .field("model", &self.params.model)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Async stream of normalized chunks over a raw chunk source
///
/// Yields one [`StreamChunk`] per raw chunk. A source error is yielded as
/// [`LlmError::Streaming`] and does not end the stream, but the stream can no
/// longer be finalized into a response.
pub struct CallStream<S, A: ChunkAdapter> {
    inner: S,
    reassembler: StreamReassembler<A>,
}

impl<S, A: ChunkAdapter> CallStream<S, A> {
    /// Wrap a raw chunk source
    pub fn new(inner: S, params: CallParams) -> Self {
        Self::with_options(inner, params, NormalizeOptions::default())
    }

    /// Wrap a raw chunk source with explicit normalization options
    pub fn with_options(inner: S, params: CallParams, options: NormalizeOptions) -> Self {
        Self {
            inner,
            reassembler: StreamReassembler::with_options(params, options),
        }
    }

    /// The underlying reassembler
    pub const fn reassembler(&self) -> &StreamReassembler<A> {
        &self.reassembler
    }

    /// Synthesize the complete response once the stream is exhausted
    pub fn construct_call_response(&self) -> Result<CallResponse<A::Response>, LlmError> {
        self.reassembler.construct_call_response()
    }
}

impl<S, E, A> Stream for CallStream<S, A>
where
    S: Stream<Item = Result<A::Chunk, E>> + Unpin,
    E: Display,
    A: ChunkAdapter + Unpin,
{
    type Item = Result<StreamChunk, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.reassembler.is_finished() {
            return Poll::Ready(None);
        }

        match ready!(this.inner.poll_next_unpin(cx)) {
            Some(Ok(chunk)) => Poll::Ready(Some(this.reassembler.push(&chunk))),
            Some(Err(e)) => Poll::Ready(Some(Err(this.reassembler.fail(e.to_string())))),
            None => {
                this.reassembler.finish();
                Poll::Ready(None)
            }
        }
    }
}

/// Blocking counterpart of [`CallStream`] over an iterator of raw chunks
pub struct BlockingCallStream<I, A: ChunkAdapter> {
    inner: I,
    reassembler: StreamReassembler<A>,
}

impl<I, A: ChunkAdapter> BlockingCallStream<I, A> {
    /// Wrap a raw chunk iterator
    pub fn new(inner: I, params: CallParams) -> Self {
        Self::with_options(inner, params, NormalizeOptions::default())
    }

    /// Wrap a raw chunk iterator with explicit normalization options
    pub fn with_options(inner: I, params: CallParams, options: NormalizeOptions) -> Self {
        Self {
            inner,
            reassembler: StreamReassembler::with_options(params, options),
        }
    }

    /// The underlying reassembler
    pub const fn reassembler(&self) -> &StreamReassembler<A> {
        &self.reassembler
    }

    /// Synthesize the complete response once the iterator is exhausted
    pub fn construct_call_response(&self) -> Result<CallResponse<A::Response>, LlmError> {
        self.reassembler.construct_call_response()
    }
}

impl<I, E, A> Iterator for BlockingCallStream<I, A>
where
    I: Iterator<Item = Result<A::Chunk, E>>,
    E: Display,
    A: ChunkAdapter,
{
    type Item = Result<StreamChunk, LlmError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reassembler.is_finished() {
            return None;
        }

        match self.inner.next() {
            Some(Ok(chunk)) => Some(self.reassembler.push(&chunk)),
            Some(Err(e)) => Some(Err(self.reassembler.fail(e.to_string()))),
            None => {
                self.reassembler.finish();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::StreamExt as _;
    use serde_json::json;

    use super::*;
    use crate::convert::openai::OpenAiChunkAdapter;
    use crate::protocol::openai::OpenAiStreamChunk;
    use crate::types::Provider;

    fn chunk(value: serde_json::Value) -> OpenAiStreamChunk {
        serde_json::from_value(value).unwrap()
    }

    fn text_chunks() -> Vec<OpenAiStreamChunk> {
        vec![
            chunk(json!({"id": "chatcmpl-1", "model": "gpt-4o", "choices": [{"index": 0, "delta": {"role": "assistant", "content": "The "}}]})),
            chunk(json!({"id": "chatcmpl-1", "model": "gpt-4o", "choices": [{"index": 0, "delta": {"content": "Name of "}}]})),
            chunk(json!({"id": "chatcmpl-1", "model": "gpt-4o", "choices": [{"index": 0, "delta": {"content": "the Wind"}, "finish_reason": "stop"}]})),
            chunk(json!({"id": "chatcmpl-1", "model": "gpt-4o", "choices": [], "usage": {"prompt_tokens": 12, "completion_tokens": 116, "total_tokens": 128}})),
            chunk(json!({"id": "chatcmpl-1", "model": "gpt-4o", "choices": []})),
        ]
    }

    fn params() -> CallParams {
        CallParams::new(Provider::OpenAi, "gpt-4o")
    }

    #[test]
    fn concatenated_deltas_equal_final_content() {
        let mut stream = BlockingCallStream::<_, OpenAiChunkAdapter>::new(
            text_chunks().into_iter().map(Ok::<_, Infallible>),
            params(),
        );

        let mut streamed = String::new();
        for chunk in stream.by_ref() {
            streamed.push_str(&chunk.unwrap().content);
        }

        let response = stream.construct_call_response().unwrap();
        assert_eq!(streamed, "The Name of the Wind");
        assert_eq!(response.content(), streamed);
        assert_eq!(response.finish_reasons(), ["stop"]);
        assert_eq!(response.id(), Some("chatcmpl-1"));
    }

    #[test]
    fn usage_is_last_non_null_snapshot() {
        let mut stream = BlockingCallStream::<_, OpenAiChunkAdapter>::new(
            text_chunks().into_iter().map(Ok::<_, Infallible>),
            params(),
        );
        stream.by_ref().for_each(drop);

        let usage = stream.construct_call_response().unwrap().usage().unwrap();
        assert_eq!(usage.input_tokens, Some(12));
        assert_eq!(usage.output_tokens, Some(116));
    }

    #[test]
    fn construct_before_exhaustion_is_misuse() {
        let mut stream = BlockingCallStream::<_, OpenAiChunkAdapter>::new(
            text_chunks().into_iter().map(Ok::<_, Infallible>),
            params(),
        );
        stream.next();

        let err = stream.construct_call_response().unwrap_err();
        assert!(matches!(err, LlmError::StreamMisuse(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn push_after_finish_is_misuse() {
        let mut reassembler = StreamReassembler::<OpenAiChunkAdapter>::new(params());
        reassembler.finish();

        let err = reassembler.push(&text_chunks()[0]).unwrap_err();
        assert!(matches!(err, LlmError::StreamMisuse(_)));
    }

    #[test]
    fn tool_fragments_join_by_index() {
        let chunks = vec![
            chunk(json!({"id": "c", "model": "gpt-4o", "choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "id": "call_a", "type": "function", "function": {"name": "format_book", "arguments": ""}}
            ]}}]})),
            chunk(json!({"id": "c", "model": "gpt-4o", "choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "{\"title\": "}},
            ]}}]})),
            chunk(json!({"id": "c", "model": "gpt-4o", "choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 1, "id": "call_b", "function": {"name": "format_book", "arguments": "{}"}},
                {"index": 0, "function": {"arguments": "\"Dune\"}"}},
            ]}}]})),
            chunk(json!({"id": "c", "model": "gpt-4o", "choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]})),
        ];

        let mut reassembler = StreamReassembler::<OpenAiChunkAdapter>::new(params());
        for c in &chunks {
            reassembler.push(c).unwrap();
        }
        reassembler.finish();

        let snapshot = reassembler.snapshot();
        assert_eq!(snapshot.tool_calls.len(), 2);
        assert_eq!(snapshot.tool_calls[0].arguments, r#"{"title": "Dune"}"#);
        assert_eq!(snapshot.tool_calls[1].id.as_deref(), Some("call_b"));

        let response = reassembler.construct_call_response().unwrap();
        let calls = response.tool_calls().unwrap();
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments(), r#"{"title": "Dune"}"#);
    }

    #[test]
    fn missing_ids_fall_back_to_index() {
        let call = AssembledToolCall {
            index: 2,
            id: None,
            name: "f".to_owned(),
            arguments: "{}".to_owned(),
        };
        assert_eq!(call.to_tool_call().id, "call_2");
    }

    #[test]
    fn requested_model_fills_in_when_stream_omits_it() {
        let reassembler = StreamReassembler::<OpenAiChunkAdapter>::new(params());
        assert_eq!(reassembler.snapshot().model, "gpt-4o");
    }

    #[tokio::test]
    async fn async_stream_yields_in_order_and_finalizes() {
        let source = futures::stream::iter(text_chunks().into_iter().map(Ok::<_, Infallible>));
        let mut stream = CallStream::<_, OpenAiChunkAdapter>::new(source, params());

        let mut deltas = Vec::new();
        while let Some(chunk) = stream.next().await {
            deltas.push(chunk.unwrap().content);
        }

        assert_eq!(deltas, ["The ", "Name of ", "the Wind", "", ""]);
        let response = stream.construct_call_response().unwrap();
        assert_eq!(response.content(), "The Name of the Wind");
    }

    #[tokio::test]
    async fn source_error_prevents_finalizing() {
        let source = futures::stream::iter(vec![
            Ok(text_chunks().remove(0)),
            Err("connection reset".to_owned()),
        ]);
        let mut stream = CallStream::<_, OpenAiChunkAdapter>::new(source, params());

        assert!(stream.next().await.unwrap().is_ok());
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, LlmError::Streaming(msg) if msg == "connection reset"));

        assert!(stream.construct_call_response().is_err());
        assert!(stream.next().await.is_none());
        assert!(stream.reassembler().is_finished());
        assert!(stream.reassembler().is_failed());
        assert!(matches!(
            stream.construct_call_response(),
            Err(LlmError::StreamMisuse(_))
        ));
    }

    #[test]
    fn blocking_source_error_prevents_finalizing() {
        let source = vec![Ok(text_chunks().remove(0)), Err("connection reset".to_owned())];
        let mut stream = BlockingCallStream::<_, OpenAiChunkAdapter>::new(source.into_iter(), params());

        let items: Vec<_> = stream.by_ref().collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[1], Err(LlmError::Streaming(msg)) if msg == "connection reset"));
        assert!(matches!(
            stream.construct_call_response(),
            Err(LlmError::StreamMisuse(_))
        ));
    }

    #[tokio::test]
    async fn abandoned_stream_cannot_be_finalized() {
        let source = futures::stream::iter(text_chunks().into_iter().map(Ok::<_, Infallible>));
        let mut stream = CallStream::<_, OpenAiChunkAdapter>::new(source, params());

        stream.next().await;
        assert_eq!(stream.reassembler().content(), "The ");
        assert!(matches!(
            stream.construct_call_response(),
            Err(LlmError::StreamMisuse(_))
        ));
    }
}
