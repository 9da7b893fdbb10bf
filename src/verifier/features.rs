//! @ai:module:intent Feature detection from live probes and name/endpoint heuristics
//! @ai:module:layer application
//! @ai:module:public_api detect_features, apply_heuristics
//! @ai:module:stateless true

use crate::client::{ChatResponse, ProbeClientTrait, ToolDefinition};
use crate::results::FeatureDetection;
use crate::verifier::analysis::{mentions_all, mentions_any};
use crate::verifier::heuristics::{FeatureHeuristics, ProbeTarget};
use crate::verifier::probe::{Check, ProbeContext, ProbeOutcome};
use serde_json::json;

const REASONING_PROMPT: &str = "Solve this puzzle. There are three houses in a row. \
The Englishman lives in the red house. The German owns the fish. The Swede lives next to \
the blue house. The fish lives in the green house, which is left of the white house. \
Who owns the fish? Give the answer in one sentence.";

const MULTIMODAL_PROMPT: &str = "Can you accept image inputs in addition to text? \
Answer yes or no first, then list the input modalities you support.";

const BATCH_PROMPT: &str = "Answer each question on its own numbered line with only the number: \
1. What is 2+2? 2. What is 3+3? 3. What is 5+5?";

const FILLER_SENTENCE: &str = "This is a test sentence. ";
const FILLER_REPEATS: usize = 100;

const LSP_DIAGNOSTIC_PROMPT: &str = "You are acting as a language server. Report diagnostics \
for this Python code:\n\ndef calculate_sum(a, b):\n    return a + b\n\nresult = calculate_sum(1, 2, 3)\n";

const LSP_COMPLETION_PROMPT: &str = "As an IDE language server, complete this Python \
function:\n\ndef bubble_sort(arr):\n    n = len(arr)\n    # Implement bubble sort\n";

const LSP_SYMBOL_PROMPT: &str = "As a language server, explain what the len() function does \
in Python and where it is defined.";

const ACP_JSONRPC_PROMPT: &str = "You are an ACP-compatible coding agent. Respond to this \
JSON-RPC request with a valid JSON-RPC response:\n{\"jsonrpc\":\"2.0\",\"method\":\"textDocument/completion\",\
\"params\":{\"textDocument\":{\"uri\":\"file:///test.py\"},\"position\":{\"line\":0,\"character\":10}},\"id\":1}";

const ACP_TOOL_PROMPT: &str = "As an ACP agent you can call the tools file_read, file_write and \
execute_command. Show how you would call file_read to read main.py, then suggest improvements.";

const ACP_PROJECT_TURNS: [(&str, &str); 3] = [
    (
        "user",
        "My Python project has src/main.py (a Flask app), tests/test_main.py and \
requirements.txt. Remember this structure.",
    ),
    (
        "assistant",
        "Noted: src/main.py is the Flask app, tests live in tests/test_main.py, \
dependencies in requirements.txt.",
    ),
    (
        "user",
        "Where should I add a utility module for database operations, and how do I import \
it from the Flask app?",
    ),
];

const ACP_CODE_PROMPT: &str = "As an ACP coding agent, write a Python function that takes a \
list of user dicts with 'name' and 'email' keys, validates the email format, returns the valid \
users, and has type hints, error handling and a docstring.";

const ACP_DIAGNOSTIC_PROMPT: &str = "As an ACP agent, list the problems in this Python code \
with line numbers:\n\ndef process_user_data(users):\n    valid_users = []\n    for user in users:\n\
        if user['email'].contains('@'):\n            valid_users.append(user)\n    return valid_users\n";

/// Agent-protocol capabilities a model must show before ACP support is claimed.
const ACP_MIN_PASSING: usize = 3;

fn weather_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_current_weather".to_string(),
        description: "Get the current weather in a given location".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City and country, e.g. Paris, France"},
                "unit": {"type": "string", "enum": ["celsius", "fahrenheit"]}
            },
            "required": ["location"]
        }),
    }
}

fn stock_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_stock_price".to_string(),
        description: "Get the latest price for a stock ticker".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {"symbol": {"type": "string"}},
            "required": ["symbol"]
        }),
    }
}

/// @ai:intent Parse a response as a JSON object, tolerating a surrounding code fence
/// @ai:effects pure
fn is_json_object(content: &str) -> bool {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<serde_json::Value>(body.trim())
        .map(|value| value.is_object())
        .unwrap_or(false)
}

/// @ai:intent Run every live feature probe against the model
/// @ai:effects network
pub async fn detect_features<C: ProbeClientTrait>(
    ctx: &ProbeContext<'_, C>,
    heuristics: &FeatureHeuristics,
    base_url: &str,
) -> FeatureDetection {
    let mut features = FeatureDetection::default();
    let errors = &mut features.errors;

    let request = ctx
        .request("What is the weather like in Paris right now?")
        .with_tools(vec![weather_tool()]);
    features.tool_use = ctx.check(&request, |_| true).await.fold_into("tool_use", errors);

    let request = ctx
        .request("What is the weather in Tokyo and the current price of AAPL? Call both tools.")
        .with_tools(vec![weather_tool(), stock_tool()]);
    let parallel = match ctx.chat(&request).await {
        Ok(response) => ProbeOutcome::ok(response.tool_calls.len()),
        Err(err) => ProbeOutcome::failed(0, err.to_string()),
    };
    features.max_parallel_calls = parallel.fold_into("parallel_tool_use", errors);
    features.parallel_tool_use = features.max_parallel_calls >= 2;

    let request = ctx.request("Count from one to five.").streaming();
    features.streaming = ctx.check(&request, |_| true).await.fold_into("streaming", errors);

    let request = ctx
        .request("Return a JSON object with a field \"status\" set to \"ok\".")
        .json_mode();
    features.json_mode = ctx.check(&request, |_| true).await.fold_into("json_mode", errors);

    let request = ctx
        .request("Return a JSON object describing a person with the fields name, age and email.")
        .json_mode();
    features.structured_output = ctx
        .check(&request, |r: &ChatResponse| is_json_object(&r.content))
        .await
        .fold_into("structured_output", errors);

    let request = ctx.request(REASONING_PROMPT);
    features.reasoning = ctx
        .check(&request, |r: &ChatResponse| {
            mentions_all(&r.content, &["fish"]) && mentions_any(&r.content, &["german", "answer"])
        })
        .await
        .fold_into("reasoning", errors);

    let request = ctx.request(MULTIMODAL_PROMPT);
    features.multimodal = ctx
        .check(&request, |r: &ChatResponse| {
            r.content.trim().to_lowercase().starts_with("yes") && mentions_any(&r.content, &["image"])
        })
        .await
        .fold_into("multimodal", errors);

    let request = ctx.request(BATCH_PROMPT);
    features.batch_processing = ctx
        .check(&request, |r: &ChatResponse| {
            mentions_all(&r.content, &["4", "6", "10"])
        })
        .await
        .fold_into("batch_processing", errors);

    features.mcp = ctx
        .count_passing(&mcp_checks(ctx))
        .await
        .map(|passed| passed >= 1)
        .fold_into("mcp", errors);

    features.lsp = ctx
        .count_passing(&lsp_checks(ctx))
        .await
        .map(|passed| passed >= 1)
        .fold_into("lsp", errors);

    features.acp = ctx
        .count_passing(&acp_checks(ctx))
        .await
        .map(|passed| passed >= ACP_MIN_PASSING)
        .fold_into("acp", errors);

    features.function_calling = features.tool_use;

    apply_heuristics(&mut features, heuristics, &ProbeTarget::new(ctx.model_id, base_url));
    features
}

/// @ai:intent Context retention across turns and summarizing a long context
/// @ai:effects pure
fn mcp_checks<C: ProbeClientTrait>(ctx: &ProbeContext<'_, C>) -> Vec<Check> {
    let filler = FILLER_SENTENCE.repeat(FILLER_REPEATS);
    vec![
        Check::new(
            ctx.conversation(&[
                ("user", "Remember that my favorite color is blue and my name is John. What is my name?"),
                ("assistant", "Your name is John, and your favorite color is blue."),
                ("user", "What is my favorite color?"),
            ]),
            |r| mentions_any(&r.content, &["blue"]),
        ),
        Check::new(
            ctx.request(format!(
                "Context: {}\n\nNow summarize the context in 10 words or less.",
                filler
            )),
            |r| {
                let summary = r.content.trim();
                !summary.is_empty() && summary.len() < FILLER_SENTENCE.len() * FILLER_REPEATS
            },
        ),
    ]
}

/// @ai:intent Diagnostics, completion and symbol lookup the way a language server answers
/// @ai:effects pure
fn lsp_checks<C: ProbeClientTrait>(ctx: &ProbeContext<'_, C>) -> Vec<Check> {
    vec![
        Check::new(ctx.request(LSP_DIAGNOSTIC_PROMPT), |r| {
            mentions_any(&r.content, &["error", "too many", "arguments", "mismatch"])
        }),
        Check::new(ctx.request(LSP_COMPLETION_PROMPT), |r| r.content.trim().len() > 10),
        Check::new(ctx.request(LSP_SYMBOL_PROMPT), |r| {
            mentions_any(&r.content, &["length", "builtin", "built-in"])
        }),
    ]
}

/// @ai:intent JSON-RPC, tool calls, project context, code assistance and diagnostics
/// @ai:effects pure
fn acp_checks<C: ProbeClientTrait>(ctx: &ProbeContext<'_, C>) -> Vec<Check> {
    vec![
        Check::new(ctx.request(ACP_JSONRPC_PROMPT), |r| {
            mentions_any(&r.content, &["jsonrpc", "\"result\"", "items"])
        }),
        Check::new(ctx.request(ACP_TOOL_PROMPT), |r| {
            mentions_any(&r.content, &["file_read", "tool", "arguments", "parameters"])
        }),
        Check::new(ctx.conversation(&ACP_PROJECT_TURNS), |r| {
            mentions_any(&r.content, &["src", "utility", "database", "import"])
        }),
        Check::new(ctx.request(ACP_CODE_PROMPT), |r| {
            mentions_any(&r.content, &["def ", "->", "\"\"\""])
        }),
        Check::new(ctx.request(ACP_DIAGNOSTIC_PROMPT), |r| {
            mentions_any(&r.content, &["keyerror", "contains", "missing", "line"])
        }),
    ]
}

/// @ai:intent Fill pattern-based flags and derive the modality list
/// @ai:effects pure
pub fn apply_heuristics(
    features: &mut FeatureDetection,
    heuristics: &FeatureHeuristics,
    target: &ProbeTarget<'_>,
) {
    features.http3 = (heuristics.http3)(target);
    features.brotli = (heuristics.brotli)(target);
    features.toon = (heuristics.toon)(target);
    features.embeddings = (heuristics.embeddings)(target);
    features.reranking = (heuristics.reranking)(target);
    features.image_generation = (heuristics.image_generation)(target);
    features.audio_generation = (heuristics.audio_generation)(target);
    features.video_generation = (heuristics.video_generation)(target);
    features.text_generation = !(heuristics.non_generative)(target);

    refresh_modalities(features);
}

/// @ai:intent Recompute modalities from the current flags
/// @ai:effects pure
pub fn refresh_modalities(features: &mut FeatureDetection) {
    let mut modalities = vec!["text".to_string()];
    if features.multimodal || features.image_generation {
        modalities.push("image".to_string());
    }
    if features.audio_generation {
        modalities.push("audio".to_string());
    }
    if features.video_generation {
        modalities.push("video".to_string());
    }
    features.modalities = modalities;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockProbeClient;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_json_object() {
        assert!(is_json_object(r#"{"name": "Ada"}"#));
        assert!(is_json_object("```json\n{\"name\": \"Ada\"}\n```"));
        assert!(!is_json_object("[1, 2, 3]"));
        assert!(!is_json_object("name: Ada"));
    }

    #[tokio::test]
    async fn test_detects_features_from_capable_model() {
        let client = MockProbeClient::new(&["gpt-4o"])
            .respond_when("Who owns the fish", "The German owns the fish.")
            .respond_when("image inputs", "Yes. I accept text and image inputs.")
            .respond_when("What is 2+2?", "1. 4\n2. 6\n3. 10")
            .respond_when("JSON-RPC request", r#"{"jsonrpc": "2.0", "id": 1, "result": {"items": []}}"#)
            .respond_when(
                "utility module",
                "Create src/utils/database.py and import it with `from utils import database`.",
            );
        let ctx = ProbeContext::new(&client, "gpt-4o");

        let features =
            detect_features(&ctx, &FeatureHeuristics::default(), "https://api.openai.com/v1").await;

        assert!(features.tool_use);
        assert!(features.parallel_tool_use);
        assert_eq!(features.max_parallel_calls, 2);
        assert!(features.streaming);
        assert!(features.json_mode);
        assert!(features.structured_output);
        assert!(features.reasoning);
        assert!(features.multimodal);
        assert!(features.function_calling);
        assert!(features.batch_processing);
        assert!(features.mcp);
        assert!(features.lsp);
        assert!(features.acp);
        assert!(!features.video_generation);
        assert!(features.brotli);
        assert!(!features.http3);
        assert!(features.text_generation);
        assert_eq!(features.modalities, vec!["text".to_string(), "image".to_string()]);
        assert!(features.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failures_default_to_false_and_keep_errors() {
        let client = MockProbeClient::new(&["m"]).failing("HTTP 400: unsupported");
        let ctx = ProbeContext::new(&client, "m");

        let features =
            detect_features(&ctx, &FeatureHeuristics::default(), "http://localhost:8080").await;

        assert!(!features.tool_use);
        assert!(!features.streaming);
        assert!(!features.json_mode);
        assert_eq!(features.max_parallel_calls, 0);
        assert!(!features.function_calling);
        assert!(!features.mcp);
        assert!(!features.acp);
        assert_eq!(features.errors.len(), 11);
        assert!(features.errors[0].starts_with("tool_use: "));
        assert!(features.errors[10].starts_with("acp: "));
        assert_eq!(features.modalities, vec!["text".to_string()]);
    }

    #[test]
    fn test_heuristics_mark_embedding_model_non_generative() {
        let mut features = FeatureDetection::default();
        apply_heuristics(
            &mut features,
            &FeatureHeuristics::default(),
            &ProbeTarget::new("text-embedding-3-large", "https://api.openai.com/v1"),
        );

        assert!(features.embeddings);
        assert!(!features.text_generation);
        assert!(features.brotli);
    }

    #[tokio::test]
    async fn test_acp_needs_three_agent_answers() {
        // Code and JSON-RPC answers alone are two of five.
        let client = MockProbeClient::new(&["m"])
            .with_reply("ok")
            .respond_when("Python function that takes", "def valid(users: list) -> list: ...")
            .respond_when("JSON-RPC request", r#"{"jsonrpc": "2.0", "result": null}"#);
        let ctx = ProbeContext::new(&client, "m");

        let passed = ctx.count_passing(&acp_checks(&ctx)).await;

        assert_eq!(passed.value, 2);
        assert!(passed.error.is_none());
    }

    #[test]
    fn test_video_model_gains_video_modality() {
        let mut features = FeatureDetection::default();
        apply_heuristics(
            &mut features,
            &FeatureHeuristics::default(),
            &ProbeTarget::new("sora-2", "https://api.openai.com/v1"),
        );

        assert!(features.video_generation);
        assert!(features.modalities.contains(&"video".to_string()));
    }
}
