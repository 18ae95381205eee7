//! Note magic service implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use jajan_shared::config::MagicSettings;

use super::error::MagicError;
use super::provider::{AnthropicGenerator, OpenAiGenerator, TextGenerator};

/// Prompt for the summary mode.
const SUMMARY_PROMPT: &str = "You are a warm food journaling assistant. Summarize the following personal food note in 1-2 sentences. Keep the first-person voice, highlight feelings, textures, and standout bites. Avoid generic phrases.

NOTE:
{{note}}
";

/// Prompt for the title mode.
const TITLE_PROMPT: &str = "You are a creative copywriter. Craft one playful, romantic headline (max 6 words) for the following food memory.

If a place name is provided, feel free to weave it in naturally.

NOTE:
{{note}}

PLACE (optional):
{{place}}
";

/// Completion budget for rewritten notes.
const MAX_TOKENS: u32 = 256;

/// How a note should be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagicMode {
    /// 1-2 sentence first-person summary.
    Summary,
    /// Playful headline, max 6 words.
    Title,
}

/// A note rewrite request.
#[derive(Debug, Clone, Deserialize)]
pub struct MagicRequest {
    /// The note to rewrite.
    pub note: String,
    /// Place name, woven into titles when present.
    pub place_name: Option<String>,
    /// Rewrite mode.
    pub mode: MagicMode,
}

/// A rewritten note.
#[derive(Debug, Clone, Serialize)]
pub struct MagicResult {
    /// The rewritten text.
    pub text: String,
    /// The mode that produced it.
    pub mode: MagicMode,
}

/// Service rewriting notes through a configured text generator.
pub struct MagicService {
    generator: Arc<dyn TextGenerator>,
}

impl MagicService {
    /// Create a service over an explicit generator.
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Build a service from settings.
    ///
    /// OpenAI wins when both keys are present; no key at all means the
    /// feature is off and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured provider client cannot be built.
    pub fn from_settings(settings: &MagicSettings) -> Result<Option<Self>, MagicError> {
        if let Some(key) = &settings.openai_api_key {
            let generator = OpenAiGenerator::new(key, &settings.openai_model)?;
            return Ok(Some(Self::new(Arc::new(generator))));
        }

        if let Some(key) = &settings.anthropic_api_key {
            let generator = AnthropicGenerator::new(key, &settings.anthropic_model)?;
            return Ok(Some(Self::new(Arc::new(generator))));
        }

        Ok(None)
    }

    /// Rewrite a note.
    ///
    /// # Errors
    ///
    /// Returns [`MagicError::EmptyNote`] for blank input and a provider
    /// error when the generation call fails.
    pub async fn rewrite(&self, request: MagicRequest) -> Result<MagicResult, MagicError> {
        let note = request.note.trim();
        if note.is_empty() {
            return Err(MagicError::EmptyNote);
        }

        let prompt = render_prompt(request.mode, note, request.place_name.as_deref());
        let text = self.generator.complete(&prompt, MAX_TOKENS).await?;

        info!(provider = self.generator.name(), mode = ?request.mode, "Note rewritten");

        Ok(MagicResult {
            text: text.trim().to_string(),
            mode: request.mode,
        })
    }
}

/// Fills the mode's prompt template.
fn render_prompt(mode: MagicMode, note: &str, place_name: Option<&str>) -> String {
    match mode {
        MagicMode::Summary => SUMMARY_PROMPT.replace("{{note}}", note),
        MagicMode::Title => {
            let place = place_name
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or("Unknown place");
            TITLE_PROMPT
                .replace("{{note}}", note)
                .replace("{{place}}", place)
        }
    }
}
