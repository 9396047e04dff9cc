//! Prompt construction for the grounded and direct answer paths.

use std::sync::OnceLock;

use regex::Regex;

use crate::stores::ScoredChunk;

/// Domain line shared by both paths so the generator stays on-topic even
/// without retrieved grounding.
pub const LEGAL_DOMAIN: &str = "the Indian Constitution and the Indian Penal Code";

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static pattern compiles"))
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static pattern compiles"))
}

/// Builds the grounded-path prompt: the question plus every passage that
/// cleared the relevance bar, most relevant first, each tagged with its
/// source id.
pub fn grounded_prompt(question: &str, passages: &[&ScoredChunk]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "You are a legal assistant for {LEGAL_DOMAIN}.\n\n\
         Context passages retrieved from the corpus, most relevant first:\n\n"
    ));
    for passage in passages {
        prompt.push_str(&format!("[{}] {}\n\n", passage.id, clean_passage(&passage.text)));
    }
    prompt.push_str(&format!(
        "Question: {question}\n\n\
         Answer using only the context passages above, citing the bracketed \
         passage ids you rely on. If the passages do not contain enough \
         information to answer, say so explicitly.\n"
    ));
    prompt
}

/// Builds the direct-path prompt: the question alone, pinned to the legal
/// domain because no retrieved grounding constrains the generator.
pub fn direct_prompt(question: &str) -> String {
    format!(
        "You are a legal assistant for {LEGAL_DOMAIN}. No corpus passages \
         were retrieved for this question; answer from your knowledge of \
         {LEGAL_DOMAIN} and stay within that domain.\n\n\
         Question: {question}\n"
    )
}

/// Flattens a stored passage for prompt inclusion.
fn clean_passage(text: &str) -> String {
    whitespace_run().replace_all(text.trim(), " ").into_owned()
}

/// Normalizes generator output before it is returned to the caller.
pub fn normalize_answer(text: &str) -> String {
    blank_lines().replace_all(text.trim(), "\n\n").into_owned()
}
