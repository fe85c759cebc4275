//! Text-node extraction from page storage markup.

use scraper::{Html, Node};

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Concatenates every text node of `markup` in document order.
///
/// The markup is parsed as an HTML fragment, so quoted attributes,
/// unclosed tags and character references behave the way a browser
/// treats them. Script and style bodies are not text.
pub fn strip_tags(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut text = String::with_capacity(markup.len());

    for node in fragment.tree.root().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };

        let in_raw_text = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|element| RAW_TEXT_ELEMENTS.contains(&element.name()));
        if !in_raw_text {
            text.push_str(chunk);
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::strip_tags;

    #[test]
    fn keeps_only_text_nodes() {
        let markup = r#"<p>Hello <strong class="x">world</strong></p><br/><ac:structured-macro ac:name="info"><ac:rich-text-body>inside</ac:rich-text-body></ac:structured-macro>"#;
        assert_eq!(strip_tags(markup), "Hello worldinside");
    }

    #[test]
    fn angle_brackets_inside_attributes_stay_in_the_tag() {
        let markup = r#"<a title="1 > 0">link</a> <ac:parameter ac:name="x>y">secret</ac:parameter>"#;
        assert_eq!(strip_tags(markup), "link secret");
    }

    #[test]
    fn comments_and_scripts_are_dropped() {
        let markup = "a<!-- hidden -->b<script>var x = '<p>';</script>c<style>p { color: red }</style>d";
        assert_eq!(strip_tags(markup), "abcd");
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(strip_tags("1 < 2 and <b>3</b>"), "1 < 2 and 3");
    }

    #[test]
    fn unterminated_tag_is_dropped() {
        assert_eq!(strip_tags("text<p class="), "text");
    }

    #[test]
    fn references_are_decoded() {
        assert_eq!(
            strip_tags("<p>Fish &amp; Chips &lt;3 &#65;&#x42;</p>"),
            "Fish & Chips <3 AB"
        );
        assert_eq!(strip_tags("<p>a&nbsp;b</p>"), "a\u{a0}b");
    }
}
