//! @ai:module:intent Creative and generative writing probes
//! @ai:module:layer application
//! @ai:module:public_api CreativeProbe, assess_generative
//! @ai:module:stateless true

use crate::client::ProbeClientTrait;
use crate::results::GenerativeCapabilities;
use crate::verifier::analysis::{lexical_diversity, mentions_any};
use crate::verifier::probe::{ProbeContext, ProbeOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativeProbe {
    CreativeWriting,
    Storytelling,
    ContentGeneration,
    ArtisticCreativity,
    ProblemSolving,
    MultimodalGenerative,
}

impl CreativeProbe {
    pub const ALL: [CreativeProbe; 6] = [
        CreativeProbe::CreativeWriting,
        CreativeProbe::Storytelling,
        CreativeProbe::ContentGeneration,
        CreativeProbe::ArtisticCreativity,
        CreativeProbe::ProblemSolving,
        CreativeProbe::MultimodalGenerative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreativeProbe::CreativeWriting => "creative_writing",
            CreativeProbe::Storytelling => "storytelling",
            CreativeProbe::ContentGeneration => "content_generation",
            CreativeProbe::ArtisticCreativity => "artistic_creativity",
            CreativeProbe::ProblemSolving => "problem_solving",
            CreativeProbe::MultimodalGenerative => "multimodal_generative",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            CreativeProbe::CreativeWriting => "Write a short poem about the changing seasons.",
            CreativeProbe::Storytelling => {
                "Write a short story about a detective who solves a mystery in a lighthouse."
            }
            CreativeProbe::ContentGeneration => {
                "Write a product description for a smart water bottle that tracks hydration."
            }
            CreativeProbe::ArtisticCreativity => {
                "Invent a new art movement. Describe its name, its principles and one signature work."
            }
            CreativeProbe::ProblemSolving => {
                "Propose three creative solutions to reduce plastic waste in the oceans."
            }
            CreativeProbe::MultimodalGenerative => {
                "Outline a five-slide presentation explaining photosynthesis, describing the visual for each slide."
            }
        }
    }

    /// (minimum characters, keywords of which at least one must appear)
    fn criteria(&self) -> (usize, &'static [&'static str]) {
        match self {
            CreativeProbe::CreativeWriting => {
                (50, &["spring", "summer", "autumn", "fall", "winter", "season"])
            }
            CreativeProbe::Storytelling => (100, &["detective", "lighthouse", "mystery"]),
            CreativeProbe::ContentGeneration => (50, &["bottle", "hydrat", "water"]),
            CreativeProbe::ArtisticCreativity => (100, &["art", "movement", "style"]),
            CreativeProbe::ProblemSolving => (80, &["plastic", "ocean", "recycl"]),
            CreativeProbe::MultimodalGenerative => (80, &["slide", "photosynthesis", "visual"]),
        }
    }

    /// @ai:intent Judge a response against the length and keyword criteria
    /// @ai:effects pure
    pub fn accepts(&self, text: &str) -> bool {
        let (min_chars, keywords) = self.criteria();
        text.chars().count() >= min_chars && mentions_any(text, keywords)
    }

    fn flag<'a>(&self, caps: &'a mut GenerativeCapabilities) -> &'a mut bool {
        match self {
            CreativeProbe::CreativeWriting => &mut caps.creative_writing,
            CreativeProbe::Storytelling => &mut caps.storytelling,
            CreativeProbe::ContentGeneration => &mut caps.content_generation,
            CreativeProbe::ArtisticCreativity => &mut caps.artistic_creativity,
            CreativeProbe::ProblemSolving => &mut caps.problem_solving,
            CreativeProbe::MultimodalGenerative => &mut caps.multimodal_generative,
        }
    }
}

/// @ai:intent Run every creative probe and derive creativity and originality
/// @ai:effects network
pub async fn assess_generative<C: ProbeClientTrait>(ctx: &ProbeContext<'_, C>) -> GenerativeCapabilities {
    let mut caps = GenerativeCapabilities::default();
    let mut passed = 0usize;

    for probe in CreativeProbe::ALL {
        let request = ctx.request(probe.prompt());
        let outcome = match ctx.chat(&request).await {
            Ok(response) => {
                if probe == CreativeProbe::CreativeWriting {
                    caps.originality_score = lexical_diversity(&response.content);
                }
                ProbeOutcome::ok(probe.accepts(&response.content))
            }
            Err(err) => ProbeOutcome::failed(false, err.to_string()),
        };

        let ok = outcome.fold_into(probe.as_str(), &mut caps.errors);
        if ok {
            passed += 1;
        }
        *probe.flag(&mut caps) = ok;
    }

    caps.creativity_score = passed as f64 / CreativeProbe::ALL.len() as f64 * 100.0;
    caps
}

/// @ai:intent Value recorded when a model is flagged non-generative
/// @ai:effects pure
pub fn skipped() -> GenerativeCapabilities {
    GenerativeCapabilities {
        skipped: true,
        ..Default::default()
    }
}
