//! Prompts for the cover identification call.
//!
//! The parser's labeled-line path depends on the exact wording of
//! `DEFAULT_PROMPT`; change it only together with the parser.

/// Strict two-line prompt used for the first attempt.
pub const DEFAULT_PROMPT: &str = "Analyze this book cover image. Extract the book's title and primary author. 
Respond with ONLY the title and author in the format:
Title: [Detected Title]
Author: [Detected Author]
If you cannot confidently identify both, respond with 'Unable to identify book details from cover.'";

/// Looser prompt used when the first answer could not be parsed.
pub const GENERAL_PROMPT: &str =
    "Describe the book cover image provided. What is the title and author? If you are unsure, say so.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_requests_labeled_lines() {
        assert!(DEFAULT_PROMPT.contains("Title: [Detected Title]\nAuthor: [Detected Author]"));
        assert!(DEFAULT_PROMPT.contains("Unable to identify book details from cover."));
    }

    #[test]
    fn test_general_prompt_allows_uncertainty() {
        assert!(GENERAL_PROMPT.contains("If you are unsure, say so."));
    }
}
