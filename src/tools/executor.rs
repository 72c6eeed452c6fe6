//! Tool executor: routes a named call with JSON arguments to [`TalkTools`]

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{TalkTools, ToolOutcome};
use crate::session::Session;
use crate::{Error, Result};

/// Published description of one tool
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema of the arguments object
    pub input_schema: Value,
}

#[derive(Deserialize)]
struct TextArgs {
    text: String,
}

#[derive(Deserialize)]
struct VoiceArgs {
    voice_id: String,
}

#[derive(Deserialize)]
struct FilenameArgs {
    filename: String,
}

#[derive(Deserialize)]
struct NameArgs {
    name: String,
}

/// Executes tool calls against [`TalkTools`]
pub struct ToolExecutor {
    tools: TalkTools,
}

impl ToolExecutor {
    #[must_use]
    pub const fn new(tools: TalkTools) -> Self {
        Self { tools }
    }

    #[must_use]
    pub const fn tools(&self) -> &TalkTools {
        &self.tools
    }

    /// Definitions of every callable tool
    #[must_use]
    pub fn definitions() -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: "speak",
                description: "Speak spoken keypoints aloud through ElevenLabs. Before calling, \
                    distill the reply into 2-5 short spoken sentences in natural language; do not \
                    pass the full response, markdown, lists or code. Use English only. If a \
                    template from list_templates fits the moment, use play_template instead.",
                input_schema: string_schema("text", "Keypoints to speak"),
            },
            ToolSpec {
                name: "speak_raw",
                description: "Speak the given text exactly as provided, without distillation. \
                    Meant for short confirmations or single-sentence replies.",
                input_schema: string_schema("text", "Text to speak verbatim"),
            },
            ToolSpec {
                name: "set_voice",
                description: "Change the ElevenLabs voice used for speech in this session.",
                input_schema: string_schema("voice_id", "ElevenLabs voice identifier"),
            },
            ToolSpec {
                name: "list_voices",
                description: "List the voices available from the ElevenLabs API as JSON.",
                input_schema: empty_schema(),
            },
            ToolSpec {
                name: "list_samples",
                description: "List the audio files in the configured audio files directory.",
                input_schema: empty_schema(),
            },
            ToolSpec {
                name: "play_sample",
                description: "Play an audio file from the audio files directory. \
                    Call list_samples first to see what is available.",
                input_schema: string_schema("filename", "File name as shown by list_samples"),
            },
            ToolSpec {
                name: "list_templates",
                description: "List reply templates: pre-recorded clips with a note on when to \
                    use each. Check these before speak; prefer play_template when one fits.",
                input_schema: empty_schema(),
            },
            ToolSpec {
                name: "play_template",
                description: "Play a pre-recorded reply template by name. Prefer this over speak \
                    whenever the context matches a template description, and for replies that \
                    would be in Hinglish.",
                input_schema: string_schema("name", "Template name as shown by list_templates"),
            },
            ToolSpec {
                name: "spoken_keypoints_prompt",
                description: "Return the instructions for turning a reply into spoken keypoints.",
                input_schema: empty_schema(),
            },
        ]
    }

    /// Execute a tool call
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTool`] or [`Error::InvalidArgument`] for bad
    /// calls, and the tool's own error for operational failures
    pub async fn execute(
        &self,
        session: &Session,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolOutcome> {
        tracing::debug!(tool = name, session = %session.id(), "executing tool");

        match name {
            "speak" => {
                let args: TextArgs = parse_args(name, arguments)?;
                self.tools.speak(session, &args.text).await
            }
            "speak_raw" => {
                let args: TextArgs = parse_args(name, arguments)?;
                self.tools.speak_raw(session, &args.text).await
            }
            "set_voice" => {
                let args: VoiceArgs = parse_args(name, arguments)?;
                Ok(self.tools.set_voice(session, &args.voice_id).await)
            }
            "list_voices" => self.tools.list_voices().await,
            "list_samples" => self.tools.list_samples().await,
            "play_sample" => {
                let args: FilenameArgs = parse_args(name, arguments)?;
                self.tools.play_sample(&args.filename).await
            }
            "list_templates" => self.tools.list_templates().await,
            "play_template" => {
                let args: NameArgs = parse_args(name, arguments)?;
                self.tools.play_template(&args.name).await
            }
            "spoken_keypoints_prompt" => Ok(ToolOutcome::completed(
                self.tools.spoken_keypoints_prompt(),
            )),
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Option<Value>) -> Result<T> {
    let arguments = arguments.unwrap_or_else(|| json!({}));
    serde_json::from_value(arguments)
        .map_err(|e| Error::InvalidArgument(format!("{tool}: {e}")))
}

fn string_schema(field: &str, description: &str) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        field.to_string(),
        json!({ "type": "string", "description": description }),
    );
    json!({
        "type": "object",
        "properties": properties,
        "required": [field]
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_are_unique_and_complete() {
        let defs = ToolExecutor::definitions();
        let mut names: Vec<&str> = defs.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 9);
        assert!(names.contains(&"play_template"));
    }

    #[test]
    fn test_string_schema_requires_field() {
        let schema = string_schema("text", "words");
        assert_eq!(schema["required"][0], "text");
        assert_eq!(schema["properties"]["text"]["type"], "string");
    }

    #[test]
    fn test_parse_args_reports_tool_name() {
        let err = parse_args::<TextArgs>("speak", Some(json!({"txt": "hi"}))).err().unwrap();
        assert_eq!(err.kind(), "invalid_argument");
        assert!(err.to_string().contains("speak"));
    }

    #[test]
    fn test_parse_args_missing_object() {
        assert!(parse_args::<TextArgs>("speak", None).is_err());
    }
}
