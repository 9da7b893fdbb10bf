//! @ai:module:intent Code capability probes: per-language success, task skills and complexity handling
//! @ai:module:layer application
//! @ai:module:public_api CodeTask, assess_code, assess_languages
//! @ai:module:stateless true

use crate::client::ProbeClientTrait;
use crate::results::{CodeCapabilities, CodeLanguage, ComplexityMetrics, LanguageResult};
use crate::verifier::analysis::{mentions_any, ResponseAnalyzer};
use crate::verifier::probe::{ProbeContext, ProbeOutcome};

const LANGUAGE_TASKS: [&str; 3] = [
    "a function that reverses a string",
    "a function that returns the nth Fibonacci number",
    "a function that checks whether a number is prime",
];

const COMPLEXITY_PROMPT: &str = "Create a task management system in Python. Model tasks and \
projects as classes, support task priorities and due dates, let urgent tasks extend regular \
tasks, deliver reminder notifications asynchronously, and include error handling and a main \
entry point. Mention the time complexity of the main operations.";

/// @ai:intent One scripted coding skill and how its answer is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeTask {
    Generation,
    Completion,
    Debugging,
    Optimization,
    Review,
    Explanation,
    TestGeneration,
    Documentation,
    Refactoring,
    ErrorResolution,
    Architecture,
    SecurityAssessment,
    PatternRecognition,
}

impl CodeTask {
    pub const ALL: [CodeTask; 13] = [
        CodeTask::Generation,
        CodeTask::Completion,
        CodeTask::Debugging,
        CodeTask::Optimization,
        CodeTask::Review,
        CodeTask::Explanation,
        CodeTask::TestGeneration,
        CodeTask::Documentation,
        CodeTask::Refactoring,
        CodeTask::ErrorResolution,
        CodeTask::Architecture,
        CodeTask::SecurityAssessment,
        CodeTask::PatternRecognition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeTask::Generation => "code_generation",
            CodeTask::Completion => "code_completion",
            CodeTask::Debugging => "code_debugging",
            CodeTask::Optimization => "code_optimization",
            CodeTask::Review => "code_review",
            CodeTask::Explanation => "code_explanation",
            CodeTask::TestGeneration => "test_generation",
            CodeTask::Documentation => "documentation",
            CodeTask::Refactoring => "refactoring",
            CodeTask::ErrorResolution => "error_resolution",
            CodeTask::Architecture => "architecture",
            CodeTask::SecurityAssessment => "security_assessment",
            CodeTask::PatternRecognition => "pattern_recognition",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            CodeTask::Generation => {
                "Write a Python function that merges two sorted lists into one sorted list."
            }
            CodeTask::Completion => {
                "Complete this Python function:\n\ndef is_palindrome(s):\n    # return True if s reads the same backwards\n"
            }
            CodeTask::Debugging => {
                "Find and fix the bug in this code:\n\ndef average(values):\n    return sum(values) / len(values) + 1\n"
            }
            CodeTask::Optimization => {
                "Optimize this function and state its time complexity:\n\ndef has_duplicates(items):\n    for i in range(len(items)):\n        for j in range(i + 1, len(items)):\n            if items[i] == items[j]:\n                return True\n    return False\n"
            }
            CodeTask::Review => {
                "Review this code and list any problems:\n\nfunction getUser(id) { return db.query('SELECT * FROM users WHERE id = ' + id); }\n"
            }
            CodeTask::Explanation => {
                "Explain what this code does:\n\nprint([x * x for x in range(10) if x % 2 == 0])\n"
            }
            CodeTask::TestGeneration => {
                "Write unit tests for a function add(a, b) that returns the sum of two numbers."
            }
            CodeTask::Documentation => {
                "Write a docstring for a function that parses an ISO 8601 date string and returns a datetime."
            }
            CodeTask::Refactoring => {
                "Refactor this code to remove duplication:\n\ndef area_square(s):\n    return s * s\n\ndef area_rect(w, h):\n    return w * h\n"
            }
            CodeTask::ErrorResolution => {
                "What does the Python error \"TypeError: unsupported operand type(s) for +: 'int' and 'str'\" mean and how do I fix it?"
            }
            CodeTask::Architecture => {
                "Design the high-level architecture of a URL shortening service. Name the main components and how they interact."
            }
            CodeTask::SecurityAssessment => {
                "Identify the security vulnerabilities in this code:\n\nimport os\ndef run(cmd):\n    os.system('ls ' + cmd)\n"
            }
            CodeTask::PatternRecognition => {
                "Which design pattern does this code implement?\n\nclass Logger:\n    _instance = None\n    def __new__(cls):\n        if cls._instance is None:\n            cls._instance = super().__new__(cls)\n        return cls._instance\n"
            }
        }
    }

    /// @ai:intent Judge whether a response demonstrates the skill
    /// @ai:effects pure
    pub fn accepts(&self, analyzer: &ResponseAnalyzer, text: &str) -> bool {
        match self {
            CodeTask::Generation | CodeTask::Refactoring => analyzer.contains_code(text),
            CodeTask::Completion => analyzer.contains_code(text) && text.contains("return"),
            CodeTask::Debugging => mentions_any(text, &["bug", "fix", "+ 1", "incorrect"]),
            CodeTask::Optimization => mentions_any(text, &["set", "o(n)", "complexity"]),
            CodeTask::Review => {
                mentions_any(text, &["sql injection", "parameter", "sanitiz", "prepared"])
            }
            CodeTask::Explanation => mentions_any(text, &["square", "even"]),
            CodeTask::TestGeneration => {
                analyzer.contains_code(text) && mentions_any(text, &["assert", "expect", "test"])
            }
            CodeTask::Documentation => {
                mentions_any(text, &["\"\"\"", "param", "args", "returns"])
            }
            CodeTask::ErrorResolution => mentions_any(text, &["str(", "int(", "convert", "cast"]),
            CodeTask::Architecture => {
                text.chars().count() > 100
                    && mentions_any(text, &["database", "cache", "service", "api"])
            }
            CodeTask::SecurityAssessment => {
                mentions_any(text, &["injection", "sanitiz", "escape", "subprocess"])
            }
            CodeTask::PatternRecognition => mentions_any(text, &["singleton"]),
        }
    }

    fn flag<'a>(&self, caps: &'a mut CodeCapabilities) -> &'a mut bool {
        match self {
            CodeTask::Generation => &mut caps.code_generation,
            CodeTask::Completion => &mut caps.code_completion,
            CodeTask::Debugging => &mut caps.code_debugging,
            CodeTask::Optimization => &mut caps.code_optimization,
            CodeTask::Review => &mut caps.code_review,
            CodeTask::Explanation => &mut caps.code_explanation,
            CodeTask::TestGeneration => &mut caps.test_generation,
            CodeTask::Documentation => &mut caps.documentation,
            CodeTask::Refactoring => &mut caps.refactoring,
            CodeTask::ErrorResolution => &mut caps.error_resolution,
            CodeTask::Architecture => &mut caps.architecture,
            CodeTask::SecurityAssessment => &mut caps.security_assessment,
            CodeTask::PatternRecognition => &mut caps.pattern_recognition,
        }
    }
}

/// @ai:intent Run the full code capability assessment
/// @ai:effects network
pub async fn assess_code<C: ProbeClientTrait>(
    ctx: &ProbeContext<'_, C>,
    analyzer: &ResponseAnalyzer,
) -> CodeCapabilities {
    let mut caps = CodeCapabilities::default();

    let (languages, overall) = assess_languages(ctx, analyzer).await;
    caps.languages = languages;
    caps.overall_success_rate = overall;

    for task in CodeTask::ALL {
        let request = ctx.request(task.prompt());
        let passed = ctx
            .check(&request, |r| task.accepts(analyzer, &r.content))
            .await
            .fold_into(task.as_str(), &mut caps.errors);
        *task.flag(&mut caps) = passed;
    }

    let request = ctx.request(COMPLEXITY_PROMPT);
    let complexity = match ctx.chat(&request).await {
        Ok(response) => ProbeOutcome::ok(analyzer.complexity_metrics(&response.content)),
        Err(err) => ProbeOutcome::failed(ComplexityMetrics::default(), err.to_string()),
    };
    caps.complexity = complexity.fold_into("complexity", &mut caps.errors);

    caps
}

/// @ai:intent Per-language success rates and the overall rate, both in percent
/// @ai:effects network
pub async fn assess_languages<C: ProbeClientTrait>(
    ctx: &ProbeContext<'_, C>,
    analyzer: &ResponseAnalyzer,
) -> (Vec<LanguageResult>, f64) {
    let mut results = Vec::with_capacity(CodeLanguage::ALL.len());
    let mut total_attempted = 0;
    let mut total_passed = 0;

    for language in CodeLanguage::ALL {
        let mut passed = 0;
        let mut error = None;

        for task in LANGUAGE_TASKS {
            let request = ctx.request(format!("Write {} in {}. Reply with code only.", task, language));
            match ctx.chat(&request).await {
                Ok(response) if analyzer.contains_code(&response.content) => passed += 1,
                Ok(_) => {}
                Err(err) => {
                    error.get_or_insert_with(|| err.to_string());
                }
            }
        }

        let attempted = LANGUAGE_TASKS.len();
        total_attempted += attempted;
        total_passed += passed;

        results.push(LanguageResult {
            language,
            attempted,
            passed,
            success_rate: passed as f64 / attempted as f64 * 100.0,
            error,
        });
    }

    let overall = if total_attempted == 0 {
        0.0
    } else {
        total_passed as f64 / total_attempted as f64 * 100.0
    };
    (results, overall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockProbeClient;

    #[tokio::test]
    async fn test_language_rates_for_code_writing_model() {
        let client = MockProbeClient::new(&["m"]);
        let ctx = ProbeContext::new(&client, "m");

        let (languages, overall) = assess_languages(&ctx, &ResponseAnalyzer::new()).await;

        assert_eq!(languages.len(), 6);
        assert!(languages.iter().all(|l| l.success_rate == 100.0 && l.error.is_none()));
        assert_eq!(overall, 100.0);
    }

    #[tokio::test]
    async fn test_single_language_failure_only_zeroes_that_language() {
        let client = MockProbeClient::new(&["m"]).respond_when(" in Go.", "I only know other languages.");
        let ctx = ProbeContext::new(&client, "m");

        let (languages, overall) = assess_languages(&ctx, &ResponseAnalyzer::new()).await;

        let go = languages.iter().find(|l| l.language == CodeLanguage::Go).unwrap();
        assert_eq!(go.success_rate, 0.0);
        assert_eq!(go.passed, 0);
        let python = languages.iter().find(|l| l.language == CodeLanguage::Python).unwrap();
        assert_eq!(python.success_rate, 100.0);
        assert!((overall - 15.0 / 18.0 * 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_call_failures_are_recorded_per_language_and_task() {
        let client = MockProbeClient::new(&["m"]).failing("HTTP 500: boom");
        let ctx = ProbeContext::new(&client, "m");

        let caps = assess_code(&ctx, &ResponseAnalyzer::new()).await;

        assert_eq!(caps.overall_success_rate, 0.0);
        assert!(caps.languages.iter().all(|l| l.error.as_deref() == Some("HTTP 500: boom")));
        assert!(!caps.code_generation);
        assert_eq!(caps.errors.len(), CodeTask::ALL.len() + 1);
        assert_eq!(caps.complexity, ComplexityMetrics::default());
    }

    #[tokio::test]
    async fn test_task_flags_follow_response_content() {
        let client = MockProbeClient::new(&["m"])
            .respond_when("design pattern", "This is the Singleton pattern.")
            .respond_when("Find and fix the bug", "The bug is the extra + 1; remove it.");
        let ctx = ProbeContext::new(&client, "m");

        let caps = assess_code(&ctx, &ResponseAnalyzer::new()).await;

        assert!(caps.code_generation);
        assert!(caps.code_completion);
        assert!(caps.pattern_recognition);
        assert!(caps.code_debugging);
        assert!(!caps.security_assessment);
        assert!(caps.complexity.max_handled_depth >= 1);
        assert!(caps.errors.is_empty());
    }

    #[test]
    fn test_accepts_review_findings() {
        let analyzer = ResponseAnalyzer::new();
        assert!(CodeTask::Review.accepts(&analyzer, "This is vulnerable to SQL injection."));
        assert!(!CodeTask::Review.accepts(&analyzer, "Looks fine to me."));
    }
}
