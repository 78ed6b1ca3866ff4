use regex::Regex;

/// Strips Markdown formatting from a model explanation so it reads as plain
/// text.
///
/// Removes bold, italic and inline-code markers, heading markers, bullet
/// and numbered-list prefixes, reduces `[text](url)` links to their text,
/// collapses runs of blank lines and trims the result.
#[must_use]
pub fn clean_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let bold = Regex::new(r"\*\*(.*?)\*\*").expect("valid regex");
    let italic = Regex::new(r"\*(.*?)\*").expect("valid regex");
    let code = Regex::new(r"`(.*?)`").expect("valid regex");
    let heading = Regex::new(r"(?m)^[ \t]*#+[ \t]*").expect("valid regex");
    let link = Regex::new(r"\[(.*?)\]\(.*?\)").expect("valid regex");
    let bullet = Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").expect("valid regex");
    let numbered = Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+").expect("valid regex");
    let blank_lines = Regex::new(r"\n{3,}").expect("valid regex");

    let text = bold.replace_all(text, "$1");
    let text = italic.replace_all(&text, "$1");
    let text = code.replace_all(&text, "$1");
    let text = heading.replace_all(&text, "");
    let text = link.replace_all(&text, "$1");
    let text = bullet.replace_all(&text, "");
    let text = numbered.replace_all(&text, "");
    let text = blank_lines.replace_all(&text, "\n\n");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_inline_emphasis_and_code() {
        assert_eq!(
            clean_markdown("**Good** choice, *low* sugar, `0g` trans fat"),
            "Good choice, low sugar, 0g trans fat"
        );
    }

    #[test]
    fn strips_headings_and_links() {
        assert_eq!(
            clean_markdown("## Verdict\nSee [the label](https://example.com/x)."),
            "Verdict\nSee the label."
        );
    }

    #[test]
    fn strips_list_markers() {
        let input = "Pros:\n- high protein\n* low fat\n+ some fiber\n1. eat in moderation\n2. pair with vegetables";
        assert_eq!(
            clean_markdown(input),
            "Pros:\nhigh protein\nlow fat\nsome fiber\neat in moderation\npair with vegetables"
        );
    }

    #[test]
    fn keeps_signed_numbers_at_line_start() {
        assert_eq!(clean_markdown("-10 points for sugar"), "-10 points for sugar");
    }

    #[test]
    fn collapses_blank_line_runs_and_trims() {
        assert_eq!(clean_markdown("\n\nFirst\n\n\n\nSecond\n\n"), "First\n\nSecond");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_markdown(""), "");
    }

    #[test]
    fn cleaned_text_has_no_markers() {
        let out = clean_markdown(
            "# Score: 78\n\n**Summary:** a *solid* snack.\n\n- `120` kcal\n- 5g protein",
        );
        for marker in ["**", "#", "`", "- "] {
            assert!(!out.contains(marker), "{marker:?} left in {out:?}");
        }
        assert!(out.starts_with("Score: 78"));
    }
}
