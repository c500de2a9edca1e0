// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction for enrichment and translation.

use lexis_core::{EnrichRequest, SentenceAnalysisMode, TranslateRequest};

const ENRICH_SYSTEM: &str = "You are a concise learner's dictionary. Explain the given word \
as it is used in the reader's context: part of speech, a plain definition, and one short \
example. Answer in plain text without headings.";

const TRANSLATE_SYSTEM: &str = "You are a translator for language learners. Translate the \
given sentence into natural English. Reply with the translation only.";

/// Context-heavy sentences are analysed in `smart` mode; shorter ones are not.
const SMART_ANALYSIS_MIN_WORDS: usize = 8;

pub fn enrich_system() -> &'static str {
    ENRICH_SYSTEM
}

pub fn translate_system() -> &'static str {
    TRANSLATE_SYSTEM
}

/// User turn for an enrichment request.
pub fn enrich_prompt(request: &EnrichRequest) -> String {
    let mut prompt = format!("Word: {}\n", request.word);
    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("Context: {}\n", context.trim()));
        if wants_sentence_analysis(request.options.sentence_analysis_mode, context) {
            prompt.push_str(
                "Also explain briefly how the sentence is built and what it means as a whole.\n",
            );
        }
    }
    if request.options.enhanced_phrase_detection {
        prompt.push_str(
            "If the word is part of an idiom or fixed phrase in the context, explain the phrase \
             instead of the word alone.\n",
        );
    }
    prompt
}

/// User turn for a translation request.
pub fn translate_prompt(request: &TranslateRequest) -> String {
    match request.paragraph.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(paragraph) => format!(
            "Paragraph for context:\n{}\n\nTranslate this sentence:\n{}",
            paragraph.trim(),
            request.sentence
        ),
        None => format!("Translate this sentence:\n{}", request.sentence),
    }
}

fn wants_sentence_analysis(mode: SentenceAnalysisMode, context: &str) -> bool {
    match mode {
        SentenceAnalysisMode::Always => true,
        SentenceAnalysisMode::Off => false,
        SentenceAnalysisMode::Smart => context.split_whitespace().count() >= SMART_ANALYSIS_MIN_WORDS,
    }
}
