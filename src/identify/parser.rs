//! Extraction of a title/author pair from free-form model output.
//!
//! The model is asked for a strict two-line `Title:` / `Author:` answer but
//! does not always comply, so the parser layers several recoveries on top of
//! the labeled-line match. It never fails loudly: anything it cannot make
//! sense of comes back as `None`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::types::IdentifiedInfo;

// Captures stop at any line terminator, including a lone `\r`.
static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Title:\s*([^\r\n\x{2028}\x{2029}]*)").expect("valid title regex"));
static AUTHOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Author:\s*([^\r\n\x{2028}\x{2029}]*)").expect("valid author regex"));
static AUTHOR_IN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([^\r\n\x{2028}\x{2029}]*)Author:\s*([^\r\n\x{2028}\x{2029}]*)").expect("valid regex"));
static TITLE_IN_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([^\r\n\x{2028}\x{2029}]*)Title:\s*([^\r\n\x{2028}\x{2029}]*)").expect("valid regex"));
static TITLE_BY_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(.*)\s+by\s+(.*)").expect("valid regex"));

/// Separators tried when only a single unlabeled line was recovered.
const SEPARATORS: [&str; 3] = [" by ", " - ", " \u{2013} "];

const REFUSAL_MARKER: &str = "unable to identify";

/// True when the model explicitly declined to identify the book.
pub fn is_refusal(text: &str) -> bool {
    text.to_lowercase().contains(REFUSAL_MARKER)
}

/// Parse a model response into a title/author pair.
///
/// Returns `None` for empty input, explicit refusals and anything no
/// recovery path could turn into two non-empty fields.
pub fn parse_book_response(text: &str) -> Option<IdentifiedInfo> {
    if text.is_empty() || is_refusal(text) {
        return None;
    }

    let mut title = first_capture(&TITLE_LINE, text);
    let mut author = first_capture(&AUTHOR_LINE, text);

    // "Title: X Author: Y" on one line.
    if title.is_some() && author.is_none() {
        if let Some((left, right)) = title.as_deref().and_then(|t| split_pair(&AUTHOR_IN_TITLE, t)) {
            title = Some(left);
            author = Some(right);
        }
    }

    if author.is_some() && title.is_none() {
        if let Some((left, right)) = author.as_deref().and_then(|a| split_pair(&TITLE_IN_AUTHOR, a)) {
            author = Some(left);
            title = Some(right);
        }
    }

    if title.is_none() || author.is_none() {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if title.is_none() {
            title = lines.first().map(|line| line.to_string());
        }
        if author.is_none() && lines.len() >= 2 {
            match split_pair(&TITLE_BY_AUTHOR, lines[0]) {
                Some((left, right)) => {
                    title = Some(left);
                    author = Some(right);
                }
                None => author = Some(lines[1].to_string()),
            }
        }
    }

    let title = title.and_then(|t| non_empty(strip_label(&t, "author:")));
    let author = author.and_then(|a| non_empty(strip_label(&a, "title:")));

    match (title, author) {
        (Some(title), Some(author)) => {
            let title = strip_trailing_punctuation(&title);
            let author = strip_trailing_punctuation(&author);
            if !title.is_empty() && !author.is_empty() {
                return Some(IdentifiedInfo::new(title, author));
            }
        }
        (Some(title), None) => {
            for sep in SEPARATORS {
                if let Some((left, right)) = title.split_once(sep) {
                    let (left, right) = (left.trim(), right.trim());
                    if !left.is_empty() && !right.is_empty() {
                        return Some(IdentifiedInfo::new(left, right));
                    }
                }
            }
        }
        _ => {}
    }

    warn!("Could not parse model response into title/author: {:?}", text);
    None
}

/// Trimmed first capture group of the first match, if non-empty.
fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.trim().to_string())
}

/// Split on a two-group pattern; both groups must be non-empty.
fn split_pair(re: &Regex, text: &str) -> Option<(String, String)> {
    let caps = re.captures(text)?;
    let left = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty())?;
    let right = caps.get(2).map(|m| m.as_str()).filter(|s| !s.is_empty())?;
    Some((left.trim().to_string(), right.trim().to_string()))
}

/// Drop a leading ASCII label (case-insensitive) left over from a misassigned line.
fn strip_label(value: &str, label: &str) -> String {
    match value.get(..label.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(label) => value[label.len()..].trim().to_string(),
        _ => value.to_string(),
    }
}

fn strip_trailing_punctuation(value: &str) -> String {
    value
        .strip_suffix('.')
        .or_else(|| value.strip_suffix(','))
        .unwrap_or(value)
        .to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(title: &str, author: &str) -> Option<IdentifiedInfo> {
        Some(IdentifiedInfo::new(title, author))
    }

    #[test]
    fn test_labeled_lines() {
        assert_eq!(
            parse_book_response("Title: 1984\nAuthor: George Orwell"),
            pair("1984", "George Orwell")
        );
    }

    #[test]
    fn test_labeled_lines_with_carriage_returns() {
        assert_eq!(
            parse_book_response("Title: Dune\rAuthor: Frank Herbert"),
            pair("Dune", "Frank Herbert")
        );
        assert_eq!(
            parse_book_response("Title: Dune\r\nAuthor: Frank Herbert\r\n"),
            pair("Dune", "Frank Herbert")
        );
        assert_eq!(
            parse_book_response("Title: Dune\u{2028}Author: Frank Herbert"),
            pair("Dune", "Frank Herbert")
        );
    }

    #[test]
    fn test_labeled_lines_any_case_and_whitespace() {
        let text = "  title:    The Left Hand of Darkness  \n\n   AUTHOR:\tUrsula K. Le Guin   ";
        assert_eq!(
            parse_book_response(text),
            pair("The Left Hand of Darkness", "Ursula K. Le Guin")
        );
    }

    #[test]
    fn test_strips_single_trailing_period_or_comma() {
        assert_eq!(
            parse_book_response("Title: Dune,\nAuthor: Frank Herbert."),
            pair("Dune", "Frank Herbert")
        );
        // Only one character is removed.
        assert_eq!(
            parse_book_response("Title: Wait...\nAuthor: Someone"),
            pair("Wait..", "Someone")
        );
    }

    #[test]
    fn test_refusal_is_none() {
        assert_eq!(
            parse_book_response("Unable to identify book details from cover."),
            None
        );
        assert_eq!(
            parse_book_response("Title: X\nAuthor: Y\nActually I was UNABLE TO IDENTIFY it"),
            None
        );
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(parse_book_response(""), None);
        assert_eq!(parse_book_response("   \n\n  "), None);
    }

    #[test]
    fn test_single_line_by_pattern() {
        assert_eq!(
            parse_book_response("Great Expectations by Charles Dickens"),
            pair("Great Expectations", "Charles Dickens")
        );
    }

    #[test]
    fn test_single_line_dash_separator() {
        assert_eq!(
            parse_book_response("The Hobbit - J.R.R. Tolkien"),
            pair("The Hobbit", "J.R.R. Tolkien")
        );
    }

    #[test]
    fn test_single_line_en_dash_separator() {
        assert_eq!(
            parse_book_response("Beloved \u{2013} Toni Morrison"),
            pair("Beloved", "Toni Morrison")
        );
    }

    #[test]
    fn test_separator_keeps_rest_of_line_as_author() {
        assert_eq!(
            parse_book_response("Good Omens - Terry Pratchett - Neil Gaiman"),
            pair("Good Omens", "Terry Pratchett - Neil Gaiman")
        );
    }

    #[test]
    fn test_title_marker_with_unlabeled_second_line() {
        assert_eq!(
            parse_book_response("Title: Dune\nSome other line"),
            pair("Dune", "Some other line")
        );
    }

    #[test]
    fn test_author_marker_found_anywhere_in_text() {
        let info = parse_book_response("Title: Neuromancer Author: William Gibson").unwrap();
        assert_eq!(info.author, "William Gibson");
    }

    #[test]
    fn test_split_pair_on_embedded_marker() {
        assert_eq!(
            split_pair(&AUTHOR_IN_TITLE, "Neuromancer Author: William Gibson"),
            Some(("Neuromancer".to_string(), "William Gibson".to_string()))
        );
        assert_eq!(split_pair(&AUTHOR_IN_TITLE, "Author: William Gibson"), None);
    }

    #[test]
    fn test_two_unlabeled_lines() {
        assert_eq!(
            parse_book_response("Middlemarch\nGeorge Eliot"),
            pair("Middlemarch", "George Eliot")
        );
    }

    #[test]
    fn test_first_line_by_pattern_wins_over_second_line() {
        assert_eq!(
            parse_book_response("Emma by Jane Austen\nA classic novel."),
            pair("Emma", "Jane Austen")
        );
    }

    #[test]
    fn test_lone_author_line_falls_back_to_lines() {
        // No title marker: the first line becomes the title and the
        // leftover label is stripped.
        assert_eq!(
            parse_book_response("Author: Mary Shelley\nFrankenstein"),
            pair("Mary Shelley", "Mary Shelley")
        );
    }

    #[test]
    fn test_single_unlabeled_line_without_separator_is_none() {
        assert_eq!(parse_book_response("Just some prose about a cover"), None);
    }

    #[test]
    fn test_is_refusal() {
        assert!(is_refusal("I am Unable To Identify this."));
        assert!(!is_refusal("Title: A\nAuthor: B"));
    }

    #[test]
    fn test_strip_label() {
        assert_eq!(strip_label("Author: Jane", "author:"), "Jane");
        assert_eq!(strip_label("Jane", "author:"), "Jane");
        assert_eq!(strip_label("Ü", "author:"), "Ü");
    }
}
