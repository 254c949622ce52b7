//! Prompt construction for the response evaluator.
//!
//! One prompt embeds the whole session: every question with its
//! difficulty, the answer text, time spent, and an auto-submission marker,
//! plus a fixed description of the expected JSON output shape. Providers
//! are interchangeable, so the prompt is provider-agnostic text.

use hirevet_core::InterviewSession;
use std::fmt::Write;

/// Evaluation instructions and the required output shape.
///
/// The scoring rules are deliberately strict: the evaluator is asked to be
/// harsh but fair so provider scores stay comparable with the deterministic
/// fallback's distribution.
pub const EVALUATOR_SYSTEM_PROMPT: &str = r#"You are a STRICT technical interviewer. Evaluate this interview session critically and return ONLY valid JSON.

EVALUATION RULES:
1. Give 0 marks if an answer is irrelevant, wrong, or nonsense
2. Give 0-3 marks if an answer is partially correct but lacks depth
3. Give 4-6 marks if an answer is correct but missing key points
4. Give 7-8 marks if an answer is good with minor issues
5. Give 9-10 marks only if an answer is excellent and complete
6. Check that each answer actually addresses the question asked
7. Verify technical accuracy - wrong technical info scores 0
8. Random text or copy-paste scores 0

Output format:
{
  "perAnswer": [
    {"index": 0, "score": 8, "feedback": "Good explanation of concepts", "strengths": ["Clear communication"], "improvements": ["Add more examples"]}
  ],
  "overall": {
    "score": 75,
    "summary": "Strong technical knowledge with room for improvement",
    "strengths": ["Technical depth", "Problem-solving"],
    "improvements": ["Communication clarity", "Real-world examples"],
    "recommendation": "Proceed to next round"
  }
}

Score each answer on a 0-10 scale and the overall assessment on a 0-100 scale.
Be HARSH but FAIR. Only exceptional answers deserve 80%+ overall.
Return only the JSON object."#;

/// Build the full evaluation prompt for a session.
pub fn build_session_prompt(session: &InterviewSession) -> String {
    let mut prompt = String::with_capacity(EVALUATOR_SYSTEM_PROMPT.len() + session.len() * 256);
    prompt.push_str(EVALUATOR_SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    for (i, entry) in session.entries.iter().enumerate() {
        let answer_text = if entry.answer.text.trim().is_empty() {
            "No answer provided"
        } else {
            entry.answer.text.as_str()
        };

        let _ = writeln!(
            prompt,
            "Q{} [{}]: {}",
            i + 1,
            entry.question.difficulty,
            entry.question.text
        );
        let _ = writeln!(prompt, "A{}: {}", i + 1, answer_text);
        let _ = writeln!(
            prompt,
            "Time spent: {}s{}\n",
            entry.answer.time_spent,
            if entry.answer.is_auto_submitted {
                " (auto-submitted)"
            } else {
                ""
            }
        );
    }

    prompt
}
