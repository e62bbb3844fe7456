//! Model actions and contract-checked generation.

use std::future::Future;

use ember_action::{Action, ActionContext, ActionError, StreamingCallback};
use ember_core::{ActionKind, Metadata};
use serde_json::Value;

use crate::model::{GenerateRequest, GenerateResponse, GenerateResponseChunk, Message, Part};
use crate::output::{OutputContract, OutputFormat};
use crate::validate::{ContractError, validate_candidate};

/// An action that calls a model.
pub type ModelAction = Action<GenerateRequest, GenerateResponse, GenerateResponseChunk>;

/// Errors from [`generate`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// The model action failed.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The output contract cannot be checked.
    #[error(transparent)]
    Contract(ContractError),

    /// Every candidate violated the output contract.
    #[error("no candidate satisfied the output contract ({} rejected)", .rejected.len())]
    NoValidCandidate {
        /// Index and reason for each rejected candidate.
        rejected: Vec<(u32, ContractError)>,
    },
}

/// Wrap a provider function as a streaming model action.
pub fn define_model<F, Fut>(name: impl Into<String>, metadata: Option<Metadata>, f: F) -> ModelAction
where
    F: Fn(ActionContext, GenerateRequest, StreamingCallback<GenerateResponseChunk>) -> Fut
        + Send
        + Sync
        + 'static,
    Fut: Future<Output = Result<GenerateResponse, ActionError>> + Send + 'static,
{
    Action::streaming(name, ActionKind::Model, metadata, f)
}

/// Run `model` and return a response whose single candidate satisfies the
/// request's output contract.
///
/// A JSON contract with a schema adds an instruction describing the schema
/// to the last message. Without a contract the model response is returned
/// as is.
pub async fn generate(
    model: &ModelAction,
    ctx: &ActionContext,
    request: GenerateRequest,
    cb: StreamingCallback<GenerateResponseChunk>,
) -> Result<GenerateResponse, GenerateError> {
    let request = prepare_request(request);
    let contract = request.output.clone();

    let response = model.run(ctx, request, cb).await?;
    let Some(contract) = contract else {
        return Ok(response);
    };

    let GenerateResponse {
        candidates,
        usage,
        custom,
    } = response;

    let mut rejected = Vec::new();
    for candidate in candidates {
        let index = candidate.index;
        match validate_candidate(candidate, &contract) {
            Ok(valid) => {
                return Ok(GenerateResponse {
                    candidates: vec![valid],
                    usage,
                    custom,
                });
            }
            Err(err) if err.is_contract_authoring_error() => {
                return Err(GenerateError::Contract(err));
            }
            Err(err) => {
                tracing::debug!(model = %model.name(), index, error = %err, "candidate rejected");
                rejected.push((index, err));
            }
        }
    }

    tracing::warn!(
        model = %model.name(),
        rejected = rejected.len(),
        "no candidate satisfied the output contract"
    );
    Err(GenerateError::NoValidCandidate { rejected })
}

fn prepare_request(mut request: GenerateRequest) -> GenerateRequest {
    let Some(contract) = request.output.take() else {
        return request;
    };
    let format = contract.effective_format();

    if format == OutputFormat::Json
        && let Some(schema) = &contract.schema
    {
        let instruction = Part::text(schema_instruction(schema));
        match request.messages.last_mut() {
            Some(message) => message.content.push(instruction),
            None => request.messages.push(Message {
                content: vec![instruction],
                ..Message::default()
            }),
        }
    }

    request.output = Some(OutputContract { format, ..contract });
    request
}

fn schema_instruction(schema: &Value) -> String {
    format!(
        "\n\nOutput should be JSON formatted and conform to the following schema:\n\n```\n{schema}\n```"
    )
}
