//! Behavior tests for snapshot sanitization: subtree removal, attribute
//! filtering, formatting, determinism and idempotence.

use browser_console::{SanitizeError, Sanitizer};
use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Re-parse sanitized output and visit every node.
fn walk(node: &Handle, visit: &mut impl FnMut(&Handle)) {
    visit(node);
    for child in node.children.borrow().iter() {
        walk(child, visit);
    }
}

fn reparse(html: &str) -> Handle {
    let dom: RcDom = html5ever::parse_document(RcDom::default(), html5ever::ParseOpts::default())
        .one(StrTendril::from_slice(html));
    dom.document.clone()
}

/// Assert the two reduction invariants on already-sanitized markup: no
/// element carries a stripped tag name, and every attribute that survived
/// is allow-listed.
fn assert_clean(sanitizer: &Sanitizer, output: &str) {
    walk(&reparse(output), &mut |node| {
        if let NodeData::Element { name, attrs, .. } = &node.data {
            let tag: &str = &name.local;
            assert!(
                !sanitizer.is_stripped_tag(tag),
                "stripped tag <{tag}> survived in output:\n{output}"
            );
            for attr in attrs.borrow().iter() {
                let attr_name: &str = &attr.name.local;
                assert!(
                    sanitizer.is_allowed_attribute(attr_name),
                    "disallowed attribute {attr_name:?} survived on <{tag}>:\n{output}"
                );
            }
        }
    });
}

#[test]
fn drops_script_subtree_and_event_handlers() {
    let sanitizer = Sanitizer::new();
    let out = sanitizer
        .sanitize(
            r#"<div class="a" onclick="x()"><script>evil()</script><p title="t" style="color:red">Hi</p></div>"#,
        )
        .unwrap();

    assert!(out.contains(r#"<div class="a">"#));
    assert!(out.contains(r#"<p title="t">Hi</p>"#));
    assert!(!out.contains("script"));
    assert!(!out.contains("evil"));
    assert!(!out.contains("onclick"));
    assert!(!out.contains("style"));
    assert_clean(&sanitizer, &out);
}

#[test]
fn removes_self_closing_denied_elements_entirely() {
    let sanitizer = Sanitizer::new();
    let out = sanitizer
        .sanitize(r#"<img src="x.png" alt="pic">"#)
        .unwrap();

    // The element is removed, not merely stripped of attributes.
    assert!(!out.contains("<img"));
    assert!(!out.contains("x.png"));
    assert_clean(&sanitizer, &out);
}

#[test]
fn keeps_allowed_attributes_and_drops_the_rest() {
    let sanitizer = Sanitizer::new();
    let out = sanitizer
        .sanitize(r#"<a href="/x" target="_blank" data-track="1">Go</a>"#)
        .unwrap();

    assert!(out.contains(r#"<a href="/x" target="_blank">Go</a>"#));
    assert!(!out.contains("data-track"));
    assert_clean(&sanitizer, &out);
}

#[test]
fn repairs_unterminated_markup_instead_of_failing() {
    let sanitizer = Sanitizer::new();
    let out = sanitizer.sanitize("<div><p>text").unwrap();

    assert!(out.contains("<p>text</p>"));
    assert!(out.contains("</div>"));
    // The repaired output is already in canonical form.
    assert_eq!(sanitizer.sanitize(&out).unwrap(), out);
}

#[test]
fn catastrophic_input_raises_parse_error() {
    let sanitizer = Sanitizer::new();
    assert!(matches!(
        sanitizer.sanitize(""),
        Err(SanitizeError::Parse(_))
    ));
}

#[test]
fn output_format_is_stable() {
    let out = Sanitizer::new()
        .sanitize(r#"<div class="a"><p>Hi</p></div>"#)
        .unwrap();
    assert_eq!(
        out,
        "<html>\n  <head></head>\n  <body>\n    <div class=\"a\">\n      <p>Hi</p>\n    </div>\n  </body>\n</html>"
    );
}

#[test]
fn identical_input_gives_byte_identical_output() {
    let sanitizer = Sanitizer::new();
    let input = r#"<section id="s"><h2>Title</h2><ul><li>a</li><li>b</li></ul></section>"#;
    assert_eq!(
        sanitizer.sanitize(input).unwrap(),
        sanitizer.sanitize(input).unwrap()
    );
}

#[test]
fn sanitizing_twice_changes_nothing() {
    let sanitizer = Sanitizer::new();
    let input = r#"
        <html lang="x"><head><meta charset="utf-8"><title>t</title>
        <link rel="stylesheet" href="a.css"><style>p{}</style></head>
        <body data-theme="dark">
          <noscript>enable js</noscript>
          <nav class="top"><a href="/" aria-label="home">Home</a></nav>
          <!-- keep me -->
          <article><h1 style="x">Deep   spaces</h1>
            <p>one <em>two</em> three</p>
            <svg viewBox="0 0 1 1"><path d="M0 0"></path></svg>
            <form action="/s"><input type="text" name="q" autofill="x"></form>
          </article>
        </body></html>
    "#;

    let once = sanitizer.sanitize(input).unwrap();
    let twice = sanitizer.sanitize(&once).unwrap();
    assert_eq!(once, twice);
    assert_clean(&sanitizer, &once);
}

#[test]
fn text_outside_removed_subtrees_is_preserved() {
    let sanitizer = Sanitizer::new();
    let input = "<div>before<script>gone()</script>after</div>";
    let out = sanitizer.sanitize(input).unwrap();

    assert!(out.contains("before"));
    assert!(out.contains("after"));
    assert!(!out.contains("gone"));
}

#[test]
fn comments_are_not_filtered() {
    let sanitizer = Sanitizer::new();
    let out = sanitizer
        .sanitize("<div><!-- state: 3 --><p>x</p></div>")
        .unwrap();
    assert!(out.contains("<!-- state: 3 -->"));
}

#[test]
fn denied_subtree_descendants_never_surface() {
    let sanitizer = Sanitizer::new();
    // Allowed-looking content nested inside a denied subtree goes with it.
    let out = sanitizer
        .sanitize(r#"<div><noscript><p class="keep">nested</p></noscript><p>kept</p></div>"#)
        .unwrap();
    assert!(!out.contains("nested"));
    assert!(out.contains("kept"));
    assert_clean(&sanitizer, &out);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn tag_name() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "div", "span", "section", "em", "strong", "b", "script", "svg", "noscript",
        ])
    }

    fn attr_pair() -> impl Strategy<Value = (String, String)> {
        (
            prop::sample::select(vec![
                "class", "id", "href", "title", "onclick", "style", "data-x", "aria-label",
            ])
            .prop_map(str::to_string),
            "[a-z0-9]{0,8}",
        )
    }

    fn markup() -> impl Strategy<Value = String> {
        let leaf = "[a-z0-9 ]{1,12}";
        leaf.prop_recursive(3, 24, 4, |inner| {
            (
                tag_name(),
                prop::collection::vec(attr_pair(), 0..3),
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(tag, attrs, children)| {
                    let attrs: String = attrs
                        .iter()
                        .map(|(k, v)| format!(" {k}=\"{v}\""))
                        .collect();
                    format!("<{tag}{attrs}>{}</{tag}>", children.concat())
                })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn sanitize_is_idempotent_and_clean(input in markup()) {
            let sanitizer = Sanitizer::new();
            let once = sanitizer.sanitize(&input).unwrap();
            let twice = sanitizer.sanitize(&once).unwrap();
            prop_assert_eq!(&once, &twice);
            assert_clean(&sanitizer, &once);
        }
    }
}
