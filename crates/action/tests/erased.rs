//! Type-erased invocation with encoded payloads.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use ember_action::prelude::*;
use ember_telemetry::TracingState;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Query {
    text: String,
    limit: usize,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Hit {
    id: u32,
    score: f32,
}

fn registry() -> Vec<Arc<dyn ErasedAction>> {
    let search = Action::new("search", ActionKind::Retriever, None, |_ctx, q: Query| async move {
        Ok((0..q.limit as u32)
            .map(|id| Hit { id, score: 1.0 })
            .collect::<Vec<_>>())
    })
    .with_description("keyword search");

    let tokens = Action::streaming(
        "tokens",
        ActionKind::Util,
        None,
        |ctx: ActionContext, text: String, cb: StreamingCallback<String>| async move {
            let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
            for word in &words {
                cb.send(&ctx, word.clone())?;
            }
            Ok::<_, ActionError>(words.len())
        },
    );

    vec![search.into_erased(), tokens.into_erased()]
}

fn isolate(actions: &[Arc<dyn ErasedAction>]) -> Arc<TracingState> {
    let _ = ember_log::init_test();
    let state = Arc::new(TracingState::new());
    for action in actions {
        assert!(action.attach_tracing(Arc::clone(&state)));
    }
    state
}

#[tokio::test]
async fn heterogeneous_actions_share_one_surface() {
    let actions = registry();
    let state = isolate(&actions);

    let names: Vec<&str> = actions.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["search", "tokens"]);
    assert_eq!(actions[0].kind(), ActionKind::Retriever);

    let out = actions[0]
        .invoke_encoded(
            &ActionContext::new(),
            br#"{"text":"rust","limit":2}"#,
            StreamingCallback::none(),
        )
        .await
        .unwrap();
    let hits: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(hits, json!([{ "id": 0, "score": 1.0 }, { "id": 1, "score": 1.0 }]));
    assert_eq!(state.meter().successes("search"), 1);
}

#[tokio::test]
async fn chunks_are_encoded_before_forwarding() {
    let actions = registry();
    isolate(&actions);

    let chunks = Arc::new(Mutex::new(Vec::<Bytes>::new()));
    let sink = Arc::clone(&chunks);
    let cb = StreamingCallback::new(move |_: &ActionContext, chunk: Bytes| {
        sink.lock().push(chunk);
        Ok(())
    });

    let out = actions[1]
        .invoke_encoded(&ActionContext::new(), br#""hello typed world""#, cb)
        .await
        .unwrap();

    assert_eq!(&out[..], b"3");
    let chunks: Vec<String> = chunks
        .lock()
        .iter()
        .map(|c| String::from_utf8(c.to_vec()).unwrap())
        .collect();
    assert_eq!(chunks, vec![r#""hello""#, r#""typed""#, r#""world""#]);
}

#[tokio::test]
async fn decode_failure_skips_the_function() {
    let actions = registry();
    let state = isolate(&actions);

    let err = actions[0]
        .invoke_encoded(&ActionContext::new(), br#"{"text":"rust"}"#, StreamingCallback::none())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "decode");
    let expected = serde_json::from_str::<Query>(r#"{"text":"rust"}"#)
        .unwrap_err()
        .to_string();
    assert_eq!(err.to_string(), expected);
    assert_eq!(state.meter().successes("search"), 0);
    assert_eq!(state.meter().failures("search"), 0);
}

#[tokio::test]
async fn callback_error_reaches_the_function() {
    let actions = registry();
    let state = isolate(&actions);

    let cb = StreamingCallback::new(|_: &ActionContext, _chunk: Bytes| {
        Err(ActionError::execution("client disconnected"))
    });
    let err = actions[1]
        .invoke_encoded(&ActionContext::new(), br#""a b""#, cb)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "client disconnected");
    assert_eq!(state.meter().failures("tokens"), 1);
}

/// JSON object keys must be strings, so this never encodes.
type ByteKeyed = BTreeMap<Vec<u8>, u8>;

fn byte_keyed(text: &str) -> ByteKeyed {
    BTreeMap::from([(text.as_bytes().to_vec(), 1)])
}

#[tokio::test]
async fn unencodable_output_is_an_encode_error() {
    let tally = Action::new("tally", ActionKind::Util, None, |_ctx, text: String| async move {
        Ok(byte_keyed(&text))
    })
    .into_erased();
    let state = isolate(std::slice::from_ref(&tally));

    let err = tally
        .invoke_encoded(&ActionContext::new(), br#""abc""#, StreamingCallback::none())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "encode");
    assert!(err.to_string().contains("key must be a string"), "{err}");
    // The function itself finished; only the erased encode step failed.
    assert_eq!(state.meter().successes("tally"), 1);
    assert_eq!(state.meter().failures("tally"), 0);
}

#[tokio::test]
async fn unencodable_chunk_fails_the_send() {
    let seen_by_function = Arc::new(Mutex::new(None::<&'static str>));
    let observed = Arc::clone(&seen_by_function);
    let chunker = Action::streaming(
        "chunker",
        ActionKind::Util,
        None,
        move |ctx: ActionContext, text: String, cb: StreamingCallback<ByteKeyed>| {
            let observed = Arc::clone(&observed);
            async move {
                if let Err(err) = cb.send(&ctx, byte_keyed(&text)) {
                    *observed.lock() = Some(err.kind());
                    return Err(err);
                }
                Ok::<_, ActionError>(text.len())
            }
        },
    )
    .into_erased();
    let state = isolate(std::slice::from_ref(&chunker));

    let forwarded = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&forwarded);
    let cb = StreamingCallback::new(move |_: &ActionContext, _chunk: Bytes| {
        *sink.lock() += 1;
        Ok(())
    });
    let err = chunker
        .invoke_encoded(&ActionContext::new(), br#""abc""#, cb)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "encode");
    assert!(err.to_string().contains("key must be a string"), "{err}");
    assert_eq!(*seen_by_function.lock(), Some("encode"));
    assert_eq!(*forwarded.lock(), 0);
    assert_eq!(state.meter().failures("chunker"), 1);
}

#[test]
fn descriptors_expose_schemas_and_placeholders() {
    let actions = registry();
    let search = actions[0].descriptor();

    assert_eq!(search.name, "search");
    assert_eq!(search.description.as_deref(), Some("keyword search"));
    assert_eq!(
        Value::Object(search.metadata.clone()),
        json!({ "inputSchema": null, "outputSchema": null })
    );

    let input = search.input_schema.as_ref().unwrap();
    assert_eq!(input.get("type"), Some(&json!("object")));
    assert!(input.get("properties").unwrap().get("limit").is_some());
    assert_eq!(actions[0].output_schema().get("type"), Some(&json!("array")));

    let keyed = search.with_key(ember_core::ActionKey::new(ActionKind::Retriever, "search").unwrap());
    let encoded = serde_json::to_value(&keyed).unwrap();
    assert_eq!(encoded["key"], "/retriever/search");
}
