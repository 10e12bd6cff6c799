use std::sync::LazyLock;

use regex::{Captures, Regex};

const END_OF_LINE: &str = "\n";

static REF_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(see|paramref) (name|cref|langword)="([TPF]:)?(?<display>.+?)" ?/>"#).unwrap()
});
static HREF_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<see\s+href="([^"]*)">\s*(.*?)\s*</see>"#).unwrap());
static CODE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<c>(?<display>.+?)</c>").unwrap());
static MULTILINE_CODE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<code>(?<display>.+?)</code>").unwrap());
static PARA_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<para>(?<display>.+?)</para>").unwrap());
static BR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<br ?/?>").unwrap());
static DOUBLE_LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\r?\n){2,}").unwrap());

/// Turn doc-comment markup into Markdown-flavored plain text.
///
/// Strips the indentation shared by all lines, renders references by their
/// display name, links as Markdown links, inline and block code as backticks
/// and fences, paragraphs and `<br>` as line breaks. Entities are decoded
/// last so escaped angle brackets never look like tags.
#[must_use]
pub fn humanize(text: &str) -> String {
    let text = normalize_indentation(text);
    let text = REF_TAG.replace_all(&text, "$display");
    let text = HREF_TAG.replace_all(&text, "[$2]($1)");
    let text = CODE_TAG.replace_all(&text, "`$display`");
    let text = MULTILINE_CODE_TAG.replace_all(&text, |caps: &Captures<'_>| {
        code_block(&caps["display"])
    });
    let text = PARA_TAG.replace_all(&text, |caps: &Captures<'_>| {
        format!("<br>{}", caps["display"].trim())
    });
    let text = BR_TAG.replace_all(&text, END_OF_LINE);
    html_escape::decode_html_entities(&text).into_owned()
}

fn lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect()
}

/// Whitespace prefix shared by every line that is not blank
fn common_leading_whitespace<'a>(lines: &[&'a str]) -> &'a str {
    let mut non_blank = lines.iter().filter(|line| !line.trim().is_empty());
    let Some(seed) = non_blank.next().copied() else {
        return "";
    };
    let others: Vec<&str> = non_blank.copied().collect();

    let mut len = 0;
    for (i, byte) in seed.bytes().enumerate() {
        if !byte.is_ascii_whitespace() {
            break;
        }
        if others.iter().any(|line| line.as_bytes().get(i) != Some(&byte)) {
            break;
        }
        len += 1;
    }
    &seed[..len]
}

fn normalize_indentation(text: &str) -> String {
    let lines = lines(text);
    let padding = common_leading_whitespace(&lines);
    let normalized: Vec<&str> = lines
        .iter()
        .map(|&line| line.strip_prefix(padding).unwrap_or(line))
        .skip_while(|line| line.trim().is_empty())
        .collect();
    normalized.join(END_OF_LINE).trim_end().to_string()
}

fn code_block(code: &str) -> String {
    if !code.contains('\n') {
        return format!("```{code}```");
    }

    let mut block = String::from("```");
    if !code.starts_with(['\r', '\n']) {
        block.push_str(END_OF_LINE);
    }
    block.push_str(&remove_common_leading_whitespace(code));
    if !code.ends_with('\n') {
        block.push_str(END_OF_LINE);
    }
    block.push_str("```");
    DOUBLE_LINE_BREAKS
        .replace_all(&block, END_OF_LINE)
        .into_owned()
}

fn remove_common_leading_whitespace(code: &str) -> String {
    let lines = lines(code);
    let padding = common_leading_whitespace(&lines);
    if padding.is_empty() {
        return code.to_string();
    }

    let mut result = String::new();
    for line in lines {
        if line.trim().is_empty() {
            result.push_str(line);
        } else {
            result.push_str(line.strip_prefix(padding).unwrap_or(line));
        }
        result.push_str(END_OF_LINE);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Returns a <c>Product</c> by id.", "Returns a `Product` by id.")]
    #[case(
        r#"Gets the <see cref="T:Api.Product"/> for <paramref name="id"/>."#,
        "Gets the Api.Product for id."
    )]
    #[case(r#"Returns <see langword="null" /> when absent"#, "Returns null when absent")]
    #[case(
        r#"See <see href="https://example.com/docs">the docs</see>."#,
        "See [the docs](https://example.com/docs)."
    )]
    #[case("First.<para>  Second paragraph. </para>", "First.\nSecond paragraph.")]
    #[case("one<br/>two<br />three<br>four", "one\ntwo\nthree\nfour")]
    #[case("a &lt; b &amp;&amp; c &gt; d", "a < b && c > d")]
    #[case("<code>x = 1</code>", "```x = 1```")]
    fn humanizes_markup(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(humanize(input), expected);
    }

    #[test]
    fn strips_common_indentation_and_blank_edges() {
        let input = "\n    Line one\n      indented\n    Line three\n  ";
        assert_eq!(humanize(input), "Line one\n  indented\nLine three");
    }

    #[test]
    fn multiline_code_becomes_fenced_block() {
        let input = "Example:\n<code>\n{\n  \"id\": 1\n}\n</code>";
        assert_eq!(humanize(input), "Example:\n```\n{\n  \"id\": 1\n}\n```");
    }

    #[test]
    fn escaped_tags_are_not_interpreted() {
        assert_eq!(humanize("Use &lt;c&gt;raw&lt;/c&gt;"), "Use <c>raw</c>");
    }
}
