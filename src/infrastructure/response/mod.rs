use once_cell::sync::Lazy;
use regex::Regex;

// Hidden reasoning blocks some models emit ahead of the answer.
static REASONING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<think>[\s\S]*?</think>|<reasoning>[\s\S]*?</reasoning>|<internal>[\s\S]*?</internal>|<think\s*/>",
    )
    .unwrap()
});

static FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").unwrap());

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Model output without reasoning blocks, trimmed, blank runs collapsed.
pub fn clean_llm_response(response: &str) -> String {
    let without_reasoning = REASONING_BLOCK.replace_all(response, "");
    BLANK_RUN
        .replace_all(without_reasoning.trim(), "\n\n")
        .to_string()
}

/// Cleaned output with ``` fence lines dropped, ready for `serde_json`.
pub fn strip_code_fences(response: &str) -> String {
    let cleaned = clean_llm_response(response);
    FENCE_LINE.replace_all(&cleaned, "").trim().to_string()
}
