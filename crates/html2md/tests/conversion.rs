//! End-to-end conversion behavior through the public API.

use html2md::{convert, convert_with_options, Anomaly, Converter, Options};

fn no_wrap() -> Options {
    Options {
        split_lines: false,
        ..Default::default()
    }
}

#[test]
fn test_basic_conversion() {
    assert_eq!(convert("<h1>Hello Python!</h1>"), "# Hello Python!\n");
    assert_eq!(convert("<p>Simple paragraph</p>"), "Simple paragraph\n");
}

#[test]
fn test_clear_leaves_entity_spellings() {
    let mut converter = Converter::new("&quot; &lt; &gt; &amp; &nbsp;");
    converter.clear_html_symbol_conversions();

    let result = converter.convert();
    for spelling in ["&quot;", "&lt;", "&gt;", "&amp;", "&nbsp;"] {
        assert!(result.contains(spelling), "{} missing from {:?}", spelling, result);
    }
}

#[test]
fn test_unknown_entities_pass_through() {
    let mut converter = Converter::new("&copy; &reg; &custom;");
    assert_eq!(converter.convert(), "&copy; &reg; &custom;\n");

    converter
        .add_html_symbol_conversion("&copy;", "©")
        .add_html_symbol_conversion("&reg;", "®")
        .add_html_symbol_conversion("&custom;", "CUSTOM");
    assert_eq!(converter.convert(), "© ® CUSTOM\n");
}

#[test]
fn test_numeric_entity_spellings() {
    let mut converter = Converter::new("&#169; &#174; &#x1F600;");
    converter
        .add_html_symbol_conversion("&#169;", "©")
        .add_html_symbol_conversion("&#174;", "®")
        .add_html_symbol_conversion("&#x1F600;", "😀");
    assert_eq!(converter.convert(), "© ® 😀\n");
}

#[test]
fn test_multiple_conversions_in_text() {
    let html = r#"
    <p>
        &quot;Quoted text&quot; with &lt;tags&gt; and &amp; entities &nbsp; separated by &rarr; arrows
    </p>
    "#;
    let mut converter = Converter::with_options(html, no_wrap());
    converter
        .add_html_symbol_conversion("&rarr;", "->")
        .add_html_symbol_conversion("&nbsp;", "\t");

    let result = converter.convert();
    assert_eq!(
        result,
        "\"Quoted text\" with <tags> and & entities \t separated by -> arrows\n"
    );
    assert!(converter.ok());
}

#[test]
fn test_entities_in_attributes() {
    let html = r#"<a href="page.html?p1=1&amp;p2=2" title="&quot;Title&quot;">Link</a>"#;
    let result = convert(html);
    assert!(result.contains(r#"[Link](page.html?p1=1&p2=2 ""#), "{:?}", result);
}

#[test]
fn test_entity_tables_are_per_converter() {
    let mut first = Converter::new("&amp;");
    let mut second = Converter::new("&amp;");
    first.clear_html_symbol_conversions();

    assert_eq!(first.convert(), "&amp;\n");
    assert_eq!(second.convert(), "&\n");
    assert_eq!(convert("&amp;"), "&\n");
}

#[test]
fn test_escape_numbered_list_toggle() {
    let html = "4.<br />\nPlease implement as requested.";
    assert_eq!(convert(html), "4\\.  \nPlease implement as requested.\n");

    let options = Options {
        escape_numbered_list: false,
        ..Default::default()
    };
    let mut converter = Converter::with_options(html, options);
    assert_eq!(converter.convert(), "4.  \nPlease implement as requested.\n");
}

#[test]
fn test_escape_numbered_list_in_paragraph() {
    assert_eq!(convert("<p>1. Item</p>"), "1\\. Item\n");

    let options = Options {
        escape_numbered_list: false,
        ..Default::default()
    };
    assert_eq!(convert_with_options("<p>1. Item</p>", &options), "1. Item\n");
}

#[test]
fn test_whitespace_compression() {
    let html = "<p><b>1. Title</b></p>\n<p>Some \t\t text   with\t mixed\n    runs</p>";
    assert_eq!(convert(html), "**1. Title**\n\nSome text with mixed runs\n");
}

#[test]
fn test_list_marker_configuration() {
    let options = Options {
        split_lines: false,
        unordered_list: '*',
        ordered_list: ')',
        include_title: false,
        ..Default::default()
    };
    let mut converter = Converter::with_options("<ul><li>First</li><li>Second</li></ul>", options);
    let result = converter.convert();
    assert!(result.starts_with("* First"), "{:?}", result);
    assert!(converter.ok());

    let result = convert_with_options("<ol><li>One</li><li>Two</li></ol>", converter.options());
    assert_eq!(result, "1) One\n2) Two\n");
}

#[test]
fn test_complex_formatting() {
    let html = r#"
    <h1>Main Title</h1>
    <p><strong>Bold text</strong> and <em>italic text</em></p>
    <ul>
        <li>First item</li>
        <li>Second item</li>
    </ul>
    <p>Released in 2024. Version 3. is next.</p>
    <ol>
        <li>Numbered one</li>
        <li>Numbered two</li>
    </ol>
    "#;
    let result = convert_with_options(html, &no_wrap());
    assert_eq!(
        result,
        "# Main Title\n\n\
         **Bold text** and *italic text*\n\n\
         - First item\n\
         - Second item\n\n\
         Released in 2024. Version 3. is next.\n\n\
         1. Numbered one\n\
         2. Numbered two\n"
    );
}

#[test]
fn test_table_formatting() {
    let html = r#"
    <table>
        <tr><th>Header 1</th><th>Header 2</th></tr>
        <tr><td>Data 1</td><td>Data 2</td></tr>
    </table>
    "#;
    assert_eq!(
        convert(html),
        "| Header 1 | Header 2 |\n| --- | --- |\n| Data 1 | Data 2 |\n"
    );
}

#[test]
fn test_table_fallback() {
    let html = "<table><tr><th>Name</th><th>Value</th></tr><tr><td>alpha</td><td>beta</td></tr></table>";
    let options = Options {
        format_table: false,
        ..Default::default()
    };
    let result = convert_with_options(html, &options);
    assert!(result.contains("alpha"));
    assert!(result.contains("beta"));
    assert!(!result.contains('|'));
}

#[test]
fn test_line_breaks() {
    let html = "A very long line of text that should be wrapped according to the soft break and hard break settings";
    let options = Options {
        soft_break: 20,
        hard_break: 30,
        ..Default::default()
    };
    let result = convert_with_options(html, &options);

    assert!(result.lines().count() > 1);
    for line in result.lines() {
        assert!(line.chars().count() <= 30, "line too long: {:?}", line);
    }
    assert_eq!(result.replace('\n', " ").trim_end(), html);
}

#[test]
fn test_wrapping_disabled() {
    let html = format!("<p>{}</p>", "word ".repeat(40));
    let result = convert_with_options(&html, &no_wrap());
    assert_eq!(result.lines().count(), 1);
}

#[test]
fn test_invalid_widths_disable_wrapping() {
    let html = format!("<p>{}</p>", "word ".repeat(40));
    let options = Options {
        soft_break: 0,
        ..Default::default()
    };
    assert!(options.validate().is_err());
    assert_eq!(convert_with_options(&html, &options).lines().count(), 1);
}

#[test]
fn test_wrapping_inside_quote_counts_prefix() {
    let html = "<blockquote><p>aaaa bbbb cccc dddd</p></blockquote>";
    let options = Options {
        soft_break: 10,
        hard_break: 12,
        ..Default::default()
    };
    assert_eq!(
        convert_with_options(html, &options),
        "> aaaa bbbb\n> cccc dddd\n"
    );
}

#[test]
fn test_error_handling() {
    let mut converter = Converter::new("<p>Unclosed paragraph");
    let result = converter.convert();
    assert!(!result.is_empty());
    assert!(!converter.ok());
}

#[test]
fn test_unexpected_closing_tag() {
    let mut converter = Converter::new("<p>text</div></p>");
    assert_eq!(converter.convert(), "text\n");
    assert_eq!(
        converter.anomalies(),
        &[Anomaly::UnexpectedClosingTag {
            tag: "div".to_string()
        }]
    );
}

#[test]
fn test_ok_reflects_latest_conversion() {
    let mut converter = Converter::new("<p>fine</p>");
    assert!(converter.ok());
    converter.convert();
    assert!(converter.ok());
    assert_eq!(converter.convert(), converter.convert());
}

#[test]
fn test_options_equality() {
    let first = Options::default();
    let mut second = Options::default();
    assert_eq!(first, second);

    second.split_lines = false;
    assert_ne!(first, second);
}

#[test]
fn test_special_characters() {
    let result = convert("<p>&lt;special&gt; &amp; &quot;characters&quot;</p>");
    assert_eq!(result, "<special> & \"characters\"\n");
}

#[test]
fn test_nested_structures() {
    let html = r#"
    <blockquote>
        <p>Quoted text with <strong>bold</strong> and <em>italic</em></p>
        <ul>
            <li>Nested <strong>list</strong></li>
        </ul>
    </blockquote>
    "#;
    assert_eq!(
        convert(html),
        "> Quoted text with **bold** and *italic*\n>\n> - Nested **list**\n"
    );
}

#[test]
fn test_full_document() {
    let html = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Release notes</title>
  <style>body { margin: 0 }</style>
</head>
<body>
  <nav><a href="/">Home</a></nav>
  <main>
    <h2>Changes</h2>
    <p>See <a href="https://example.com/docs" title="Docs">the docs</a>.</p>
    <pre><code class="language-sh">cargo add html2md
</code></pre>
  </main>
</body>
</html>"#;
    let mut converter = Converter::new(html);
    assert_eq!(
        converter.convert(),
        "# Release notes\n\n\
         ## Changes\n\n\
         See [the docs](https://example.com/docs \"Docs\").\n\n\
         ```sh\ncargo add html2md\n```\n"
    );
    assert!(converter.ok(), "{:?}", converter.anomalies());
}

#[test]
fn test_force_left_trim() {
    let options = Options {
        force_left_trim: true,
        compress_whitespace: false,
        ..no_wrap()
    };
    let html = "<p>a\n   b</p><pre>  kept\n    indent</pre>";
    assert_eq!(
        convert_with_options(html, &options),
        "a\nb\n\n```\n  kept\n    indent\n```\n"
    );

    let options = Options {
        force_left_trim: false,
        ..options
    };
    assert!(convert_with_options(html, &options).starts_with("a\n   b\n"));
}

#[test]
fn test_entity_replacement_survives_wrapping() {
    let html = format!("<p>{}&sig; tail</p>", "word ".repeat(15));
    let mut converter = Converter::new(html);
    converter.add_html_symbol_conversion("&sig;", "Jane Q Public");

    let result = converter.convert();
    assert!(result.contains("Jane Q Public"), "{:?}", result);
    assert!(result.lines().all(|line| line.chars().count() <= 100));
}

#[test]
fn test_entity_replacement_at_line_start_not_escaped() {
    let mut converter = Converter::new("<p>&item; done</p>");
    converter.add_html_symbol_conversion("&item;", "1. x");
    assert_eq!(converter.convert(), "1. x done\n");

    let mut converter = Converter::new("<p>&gt; not a quote</p>");
    assert_eq!(converter.convert(), "\\> not a quote\n");
}

#[test]
fn test_whitespace_replacement_at_paragraph_end_kept() {
    let mut converter = Converter::new("<p>x&tab;</p><p>y</p>");
    converter.add_html_symbol_conversion("&tab;", "\t");
    assert_eq!(converter.convert(), "x\t\n\ny\n");
}

#[test]
fn test_line_start_fences_and_paren_numbers_escaped() {
    assert_eq!(convert("<p>~~~</p><p>after</p>"), "\\~~~\n\nafter\n");
    assert_eq!(convert("<p>1) x</p>"), "1\\) x\n");

    let options = Options {
        escape_numbered_list: false,
        ..Default::default()
    };
    assert_eq!(convert_with_options("<p>1) x</p>", &options), "1) x\n");
}
