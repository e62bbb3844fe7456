//! Running model actions under output contracts.

use std::sync::Arc;

use ember_action::{ActionContext, ActionError, StreamingCallback};
use ember_ai::{
    Candidate, FinishReason, GenerateError, GenerateRequest, GenerateResponse,
    GenerateResponseChunk, Message, ModelAction, OutputContract, ToolDefinition, define_model,
    generate,
};
use ember_core::ActionKind;
use ember_telemetry::TracingState;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, PartialEq, Deserialize)]
struct Weather {
    city: String,
    celsius: i32,
}

fn weather_contract() -> OutputContract {
    OutputContract::json().with_schema(json!({
        "type": "object",
        "required": ["city", "celsius"],
        "properties": {
            "city": { "type": "string" },
            "celsius": { "type": "integer" }
        }
    }))
}

/// A model that answers with one candidate per reply, in order, streaming
/// each reply as a chunk first.
fn scripted(replies: &'static [&'static str]) -> (ModelAction, Arc<TracingState>) {
    let _ = ember_log::init_test();
    let model = define_model(
        "scripted",
        None,
        move |ctx: ActionContext,
              request: GenerateRequest,
              cb: StreamingCallback<GenerateResponseChunk>| async move {
            let prompt = request.messages.last().map(Message::text).unwrap_or_default();
            let mut candidates = Vec::new();
            for (index, reply) in (0u32..).zip(replies) {
                cb.send(&ctx, GenerateResponseChunk::text(index, *reply))?;
                candidates.push(Candidate {
                    finish_reason: Some(FinishReason::Stop),
                    ..Candidate::new(index, Message::model(*reply))
                });
            }
            Ok::<_, ActionError>(GenerateResponse {
                candidates,
                usage: None,
                custom: Some(json!({ "prompt": prompt })),
            })
        },
    );
    let state = Arc::new(TracingState::new());
    model.attach_tracing(Arc::clone(&state));
    (model, state)
}

#[tokio::test]
async fn first_valid_candidate_is_kept() {
    let (model, state) = scripted(&[
        "```json\n{\"city\": \"Oslo\"\n```",
        "```json\n{\"city\": \"Oslo\", \"celsius\": 4}\n```",
        "{\"city\": \"Bergen\", \"celsius\": 7}",
    ]);
    let request = GenerateRequest::prompt("Weather in Oslo?").with_output(weather_contract());

    let response = generate(&model, &ActionContext::new(), request, StreamingCallback::none())
        .await
        .unwrap();

    assert_eq!(response.candidates.len(), 1);
    assert_eq!(response.candidates[0].index, 1);
    assert_eq!(
        response.output::<Weather>().unwrap(),
        Weather { city: "Oslo".into(), celsius: 4 }
    );
    assert_eq!(state.meter().successes("scripted"), 1);
}

#[tokio::test]
async fn schema_instruction_reaches_the_model() {
    let (model, _) = scripted(&["{\"city\": \"Oslo\", \"celsius\": 4}"]);
    let request = GenerateRequest::prompt("Weather in Oslo?").with_output(weather_contract());

    let response = generate(&model, &ActionContext::new(), request, StreamingCallback::none())
        .await
        .unwrap();

    let prompt = response.custom.as_ref().unwrap()["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("Weather in Oslo?\n\nOutput should be JSON formatted"));
    assert!(prompt.contains(r#""required":["city","celsius"]"#), "{prompt}");
}

#[tokio::test]
async fn all_candidates_rejected() {
    let (model, _) = scripted(&["sunny", "{\"city\": \"Oslo\", \"celsius\": \"cold\"}"]);
    let request = GenerateRequest::prompt("Weather?").with_output(weather_contract());

    let err = generate(&model, &ActionContext::new(), request, StreamingCallback::none())
        .await
        .unwrap_err();

    let rejected = match err {
        GenerateError::NoValidCandidate { rejected } => rejected,
        other => panic!("expected rejection, got {other:?}"),
    };
    let indices: Vec<u32> = rejected.iter().map(|(index, _)| *index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert!(rejected[0].1.to_string().starts_with("candidate did not have valid JSON"));
    assert!(rejected[1].1.to_string().starts_with("data did not match expected schema"));
}

#[tokio::test]
async fn malformed_contract_stops_at_the_first_candidate() {
    let (model, _) = scripted(&["{}", "{}"]);
    let request = GenerateRequest::prompt("?")
        .with_output(OutputContract::json().with_schema(json!({ "type": "invalid" })));

    let err = generate(&model, &ActionContext::new(), request, StreamingCallback::none())
        .await
        .unwrap_err();

    let err = match err {
        GenerateError::Contract(err) => err,
        other => panic!("expected contract error, got {other:?}"),
    };
    assert!(err.is_contract_authoring_error());
}

#[tokio::test]
async fn without_contract_the_response_is_untouched() {
    let (model, _) = scripted(&["one", "two"]);

    let response = generate(
        &model,
        &ActionContext::new(),
        GenerateRequest::prompt("count"),
        StreamingCallback::none(),
    )
    .await
    .unwrap();

    assert_eq!(response.candidates.len(), 2);
    assert_eq!(response.text(), "one");
}

#[tokio::test]
async fn chunks_stream_before_the_response() {
    let (model, _) = scripted(&["a", "b"]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let cb = StreamingCallback::new(move |_: &ActionContext, chunk: GenerateResponseChunk| {
        sink.lock().push(chunk.chunk_text());
        Ok(())
    });

    generate(&model, &ActionContext::new(), GenerateRequest::prompt("?"), cb)
        .await
        .unwrap();

    assert_eq!(*seen.lock(), vec!["a", "b"]);
}

#[tokio::test]
async fn model_failure_is_an_action_error() {
    let _ = ember_log::init_test();
    let model = define_model(
        "offline",
        None,
        |_ctx: ActionContext, _req: GenerateRequest, _cb: StreamingCallback<GenerateResponseChunk>| async {
            Err::<GenerateResponse, _>(ActionError::execution("connection refused"))
        },
    );
    model.attach_tracing(Arc::new(TracingState::new()));

    let err = generate(
        &model,
        &ActionContext::new(),
        GenerateRequest::prompt("?"),
        StreamingCallback::none(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GenerateError::Action(_)));
    assert_eq!(err.to_string(), "connection refused");
}

#[test]
fn models_are_actions_of_kind_model() {
    let (model, _) = scripted(&[]);
    assert_eq!(model.kind(), ActionKind::Model);

    let erased = model.into_erased();
    let tool = ToolDefinition::from_action(erased.as_ref());
    assert_eq!(tool.name, "scripted");
    assert_eq!(tool.input_schema["type"], Value::from("object"));
    assert!(tool.input_schema["properties"].get("messages").is_some());
}
