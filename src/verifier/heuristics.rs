//! @ai:module:intent Name- and endpoint-pattern predicates for features that are not probed live
//! @ai:module:layer domain
//! @ai:module:public_api ProbeTarget, Predicate, FeatureHeuristics
//! @ai:module:stateless true

/// @ai:intent What a heuristic may inspect: the endpoint and the model identifier
#[derive(Debug, Clone, Copy)]
pub struct ProbeTarget<'a> {
    pub model_id: &'a str,
    pub base_url: &'a str,
}

impl<'a> ProbeTarget<'a> {
    pub fn new(model_id: &'a str, base_url: &'a str) -> Self {
        Self { model_id, base_url }
    }

    fn model_mentions(&self, needles: &[&str]) -> bool {
        let model = self.model_id.to_lowercase();
        needles.iter().any(|n| model.contains(n))
    }

    /// Matches whole name parts only; `-`, `_`, `/`, `:` and `.` separate parts.
    fn model_has_part(&self, needles: &[&str]) -> bool {
        let model = self.model_id.to_lowercase();
        let parts: Vec<&str> = model.split(['-', '_', '/', ':', '.']).collect();
        needles.iter().any(|needle| {
            let wanted: Vec<&str> = needle.split('-').collect();
            parts.windows(wanted.len()).any(|window| window == wanted.as_slice())
        })
    }

    fn endpoint_mentions(&self, needles: &[&str]) -> bool {
        let url = self.base_url.to_lowercase();
        needles.iter().any(|n| url.contains(n))
    }
}

pub type Predicate = fn(&ProbeTarget<'_>) -> bool;

/// @ai:intent HTTP/3 assumed for CDN-fronted providers
/// @ai:effects pure
pub fn supports_http3(target: &ProbeTarget<'_>) -> bool {
    target.endpoint_mentions(&["cloudflare", "google", "fastly"])
}

/// @ai:intent Brotli assumed for major hosted APIs known to negotiate it
/// @ai:effects pure
pub fn supports_brotli(target: &ProbeTarget<'_>) -> bool {
    target.endpoint_mentions(&[
        "api.anthropic.com",
        "api.openai.com",
        "googleapis.com",
        "api.deepseek.com",
        "api.mistral.ai",
        "api.cohere.com",
    ])
}

/// @ai:intent Toon output assumed for creative and image model families
/// @ai:effects pure
pub fn supports_toon(target: &ProbeTarget<'_>) -> bool {
    target.model_has_part(&[
        "toon",
        "creative",
        "art",
        "dalle",
        "dall-e",
        "stable-diffusion",
        "midjourney",
        "imagen",
    ])
}

pub fn is_embedding_model(target: &ProbeTarget<'_>) -> bool {
    target.model_mentions(&["embed"])
}

pub fn is_reranking_model(target: &ProbeTarget<'_>) -> bool {
    target.model_mentions(&["rerank"])
}

pub fn supports_image_generation(target: &ProbeTarget<'_>) -> bool {
    target.model_mentions(&["dall-e", "dalle", "imagen", "stable-diffusion", "flux", "midjourney"])
}

pub fn supports_audio_generation(target: &ProbeTarget<'_>) -> bool {
    target.model_mentions(&["tts", "audio", "speech"])
}

pub fn supports_video_generation(target: &ProbeTarget<'_>) -> bool {
    target.model_has_part(&["sora", "veo", "video", "runway", "kling", "gen-3"])
}

/// @ai:intent Models that cannot produce free-form text; generative probes are skipped
/// @ai:effects pure
pub fn is_non_generative(target: &ProbeTarget<'_>) -> bool {
    target.model_mentions(&["embed", "rerank", "moderation", "whisper", "tts"])
}

/// @ai:intent One replaceable predicate per heuristic feature
#[derive(Debug, Clone, Copy)]
pub struct FeatureHeuristics {
    pub http3: Predicate,
    pub brotli: Predicate,
    pub toon: Predicate,
    pub embeddings: Predicate,
    pub reranking: Predicate,
    pub image_generation: Predicate,
    pub audio_generation: Predicate,
    pub video_generation: Predicate,
    pub non_generative: Predicate,
}

impl Default for FeatureHeuristics {
    fn default() -> Self {
        Self {
            http3: supports_http3,
            brotli: supports_brotli,
            toon: supports_toon,
            embeddings: is_embedding_model,
            reranking: is_reranking_model,
            image_generation: supports_image_generation,
            audio_generation: supports_audio_generation,
            video_generation: supports_video_generation,
            non_generative: is_non_generative,
        }
    }
}
