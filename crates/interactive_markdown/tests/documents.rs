//! crates/interactive_markdown/tests/documents.rs

use interactive_markdown::{
    install, parser, render, render_markdown, BlockParser, InteractiveComponentRule,
    RenderOptions, COMPONENT_TOKEN, PLACEHOLDER_CLASS, TEXT_TOKEN,
};
use serde_json::{json, Value};

fn stable_id() -> String {
    "component-1700000000000-abcdef012".to_string()
}

fn stable_parser() -> BlockParser {
    BlockParser::new().with_rule(InteractiveComponentRule::with_id_generator(stable_id))
}

#[test]
fn document_with_components_between_prose() {
    let src = "# Lesson\n\nTry it:\n:::component{type=\"counter\" label=\"Clicks\" initial=\"0\"}\nThen a quiz.\n  :::component{type=\"quiz\"}\n";
    let tokens = parser().parse(src);

    let kinds: Vec<&str> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TEXT_TOKEN, COMPONENT_TOKEN, TEXT_TOKEN, COMPONENT_TOKEN]
    );
    assert_eq!(tokens[0].content, "# Lesson\n\nTry it:\n");
    assert_eq!(tokens[1].map, (3, 4));
    assert_eq!(tokens[2].content, "Then a quiz.\n");
    assert_eq!(tokens[3].attr("data-component-type"), Some("quiz"));

    let counter = &tokens[1];
    assert_eq!(counter.attr("class"), Some(PLACEHOLDER_CLASS));
    let props: Value =
        serde_json::from_str(counter.attr("data-component-props").unwrap()).unwrap();
    assert_eq!(
        props,
        json!({"type": "counter", "label": "Clicks", "initial": "0"})
    );
}

#[test]
fn each_component_gets_its_own_id() {
    let tokens = parser().parse(":::component{type=\"a\"}\n:::component{type=\"b\"}");
    assert_eq!(tokens.len(), 2);

    let first = tokens[0].attr("id").unwrap();
    let second = tokens[1].attr("id").unwrap();
    assert!(first.starts_with("component-"));
    assert_ne!(first, second);
}

#[test]
fn renders_placeholder_markup() {
    let id = stable_id();
    let html = render(
        &stable_parser().parse(":::component{type=\"counter\" initial=\"0\"}"),
        RenderOptions::default(),
    );

    assert_eq!(
        html,
        format!(
            "<div id='{}' class='interactive-component-placeholder' data-component-type='counter' data-component-props='{{\"type\":\"counter\",\"initial\":\"0\"}}' />\n",
            id
        )
    );
}

#[test]
fn prose_without_components_passes_through() {
    let src = "plain text\n:::note{type=\"x\"}\n";
    assert_eq!(render_markdown(src, RenderOptions::default()), src);
}

#[test]
fn verbatim_values_can_break_out_unless_escaped() {
    let src = ":::component{type=\"x' onclick='alert(1)\"}";
    let parser = stable_parser();

    let raw = render(&parser.parse(src), RenderOptions::default());
    assert!(raw.contains("data-component-type='x' onclick='alert(1)'"));

    let safe = render(
        &parser.parse(src),
        RenderOptions {
            escape_attributes: true,
        },
    );
    assert!(safe.contains("data-component-type='x&#39; onclick=&#39;alert(1)'"));
    assert!(!safe.contains("onclick='"));
}

#[test]
fn install_adds_the_rule_to_an_existing_parser() {
    let tokens = install(BlockParser::new()).parse(":::component{type=\"x\"}");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, COMPONENT_TOKEN);
}
