//! services/verifier/src/session/prompts.rs
//!
//! Fixed instruction templates sent to the model, plus the apology shown when the
//! model gives us nothing usable.

const FACT_CHECK_TEMPLATE: &str = r#"You are a careful fact-checking assistant.

The user submitted the following text:
---
{claim}
---

If the text is a factual claim that can be checked (a headline, a quote, a statistic,
a statement about the world), respond with ONLY a JSON object in exactly this shape:
{
  "isReal": true or false,
  "confidenceScore": an integer from 0 to 100,
  "detailedAnalysis": "a few sentences explaining the verdict",
  "trustedSources": ["https://...", "https://..."]
}

Rules for the JSON:
- "isReal" is true when the claim is accurate, false when it is false or misleading.
- "confidenceScore" is how sure you are of that verdict.
- "trustedSources" lists reputable URLs that support your analysis, most relevant first.
- Do not add any text before or after the JSON object.

If the text is NOT a checkable claim (a greeting, small talk, a question about you,
gibberish), do not return JSON. Reply with one short, friendly sentence explaining that
you can only fact-check claims."#;

/// Instruction sent alongside every image.
pub const DETECTION_PROMPT: &str = "Analyze the provided image for any signs of AI-generation. \
Respond with a JSON object containing these fields: \"isAiGenerated\" (boolean), \
\"confidencePercentage\" (integer), \"briefDescription\" (string), and optionally \
\"originalSource\" (string).";

/// Shown when the model returned no text or only whitespace.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't come up with an answer. Please try again.";

/// Builds the fact-check instruction for one claim.
pub fn fact_check_prompt(claim: &str) -> String {
    FACT_CHECK_TEMPLATE.replace("{claim}", claim)
}
