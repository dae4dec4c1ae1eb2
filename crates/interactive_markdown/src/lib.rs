//! crates/interactive_markdown/src/lib.rs
//!
//! Markdown extension that recognizes `:::component{...}` lines and renders
//! them as placeholder elements for the frontend to hydrate.

pub mod block;
pub mod component;

pub use block::{render, BlockParser, BlockRule, BlockState, RenderOptions, Token, TEXT_TOKEN};
pub use component::{
    generate_component_id, parse_attributes, ComponentAttrs, InteractiveComponentRule,
    COMPONENT_TOKEN, PLACEHOLDER_CLASS,
};

/// Registers the interactive component rule on `parser`.
pub fn install(parser: BlockParser) -> BlockParser {
    parser.with_rule(InteractiveComponentRule::new())
}

/// A parser with only the interactive component rule installed.
pub fn parser() -> BlockParser {
    install(BlockParser::new())
}

/// Parses `src` and renders it in one pass.
pub fn render_markdown(src: &str, options: RenderOptions) -> String {
    render(&parser().parse(src), options)
}
