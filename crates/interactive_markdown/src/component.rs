//! crates/interactive_markdown/src/component.rs
//!
//! Block rule for interactive components written as
//!
//! ```text
//! :::component{type="counter" label="Clicks" initial="0"}
//! ```
//!
//! Each such line becomes a placeholder element that the frontend hydrates
//! into the named component. Attribute values are plain double-quoted
//! literals; an embedded `"` cannot be escaped.

use chrono::Utc;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::LazyLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::block::{BlockRule, BlockState, Token};

pub const COMPONENT_TOKEN: &str = "interactive_component";
pub const PLACEHOLDER_CLASS: &str = "interactive-component-placeholder";

static COMPONENT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:::component\{([^}]*)\}").expect("component pattern is valid")
});

static COMPONENT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z0-9_-]+)="([^"]*)""#).expect("attribute pattern is valid")
});

//=========================================================================================
// Attributes
//=========================================================================================

/// Component attributes in source order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentAttrs(Vec<(String, String)>);

impl ComponentAttrs {
    /// Sets `key`, overwriting an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for ComponentAttrs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Extracts every `key="value"` pair from the text between the braces.
pub fn parse_attributes(body: &str) -> ComponentAttrs {
    let mut attrs = ComponentAttrs::default();
    for caps in COMPONENT_ATTR.captures_iter(body) {
        attrs.insert(&caps[1], &caps[2]);
    }
    attrs
}

/// `component-<unix millis>-<9 hex chars>`. Unique enough for one page view,
/// not a security token.
pub fn generate_component_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("component-{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}

//=========================================================================================
// The Block Rule
//=========================================================================================

/// Turns `:::component{...}` lines into placeholder tokens.
pub struct InteractiveComponentRule {
    next_id: fn() -> String,
}

impl Default for InteractiveComponentRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveComponentRule {
    pub fn new() -> Self {
        Self {
            next_id: generate_component_id,
        }
    }

    /// Uses `next_id` instead of the time-based generator, e.g. for stable output.
    pub fn with_id_generator(next_id: fn() -> String) -> Self {
        Self { next_id }
    }
}

impl BlockRule for InteractiveComponentRule {
    fn name(&self) -> &'static str {
        COMPONENT_TOKEN
    }

    fn apply(&self, state: &mut BlockState<'_>, silent: bool) -> bool {
        let Some(line) = state.current_line() else {
            return false;
        };
        let Some(caps) = COMPONENT_OPEN.captures(line) else {
            return false;
        };
        if silent {
            return true;
        }

        let attrs = parse_attributes(caps.get(1).map_or("", |m| m.as_str()));
        let component_type = attrs.get("type").unwrap_or_default().to_string();
        let props = attrs.to_json().unwrap_or_else(|e| {
            warn!("Failed to serialize component attributes on line {}: {}", state.line + 1, e);
            "{}".to_string()
        });
        let id = (self.next_id)();
        debug!(id = %id, component = %component_type, "Matched interactive component");

        state.push(Token {
            kind: COMPONENT_TOKEN,
            tag: "div",
            attrs: vec![
                ("id".to_string(), id),
                ("class".to_string(), PLACEHOLDER_CLASS.to_string()),
                ("data-component-type".to_string(), component_type),
                ("data-component-props".to_string(), props),
            ],
            content: line.to_string(),
            map: (state.line, state.line + 1),
        });
        state.line += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fixed_id() -> String {
        "component-1-abcdef012".to_string()
    }

    fn run(src: &str) -> (bool, BlockState<'_>) {
        let mut state = BlockState::new(src);
        let matched = InteractiveComponentRule::with_id_generator(fixed_id).apply(&mut state, false);
        (matched, state)
    }

    #[test]
    fn counter_component_becomes_one_placeholder_token() {
        let (matched, state) = run(":::component{type=\"counter\" label=\"Clicks\" initial=\"0\"}\n");
        assert!(matched);
        assert_eq!(state.line, 1);

        let tokens = state.tokens();
        assert_eq!(tokens.len(), 1);
        let token = &tokens[0];
        assert_eq!(token.kind, COMPONENT_TOKEN);
        assert_eq!(token.attr("id"), Some("component-1-abcdef012"));
        assert_eq!(token.attr("class"), Some(PLACEHOLDER_CLASS));
        assert_eq!(token.attr("data-component-type"), Some("counter"));

        let props: Value = serde_json::from_str(token.attr("data-component-props").unwrap()).unwrap();
        assert_eq!(props, json!({"type": "counter", "label": "Clicks", "initial": "0"}));
    }

    #[test]
    fn props_keep_source_order() {
        let (_, state) = run(r#":::component{label="A" type="quiz" answer="42"}"#);
        assert_eq!(
            state.tokens()[0].attr("data-component-props"),
            Some(r#"{"label":"A","type":"quiz","answer":"42"}"#)
        );
    }

    #[test]
    fn silent_mode_matches_without_emitting_or_advancing() {
        let mut state = BlockState::new(":::component{type=\"chart\"}\nrest");
        let rule = InteractiveComponentRule::new();

        assert!(rule.apply(&mut state, true));
        assert!(state.tokens().is_empty());
        assert_eq!(state.line, 0);
    }

    #[test]
    fn non_matching_lines_leave_state_untouched() {
        for src in [
            "text :::component{type=\"x\"}",
            ":::component type=\"x\"",
            ":::component{type=\"x\"",
            "::component{type=\"x\"}",
            "",
        ] {
            let (matched, state) = run(src);
            assert!(!matched, "matched {:?}", src);
            assert_eq!(state.line, 0);
            assert!(state.tokens().is_empty());
        }
    }

    #[test]
    fn missing_type_yields_empty_string() {
        let (_, state) = run(r#":::component{label="No type"}"#);
        assert_eq!(state.tokens()[0].attr("data-component-type"), Some(""));
    }

    #[test]
    fn empty_braces_give_empty_props() {
        let (matched, state) = run(":::component{}");
        assert!(matched);
        assert_eq!(state.tokens()[0].attr("data-component-props"), Some("{}"));
    }

    #[test]
    fn consumes_exactly_one_line() {
        let src = ":::component{type=\"a\" b=\"1\" c=\"2\" d=\"3\"}\n:::component{type=\"next\"}";
        let (_, state) = run(src);
        assert_eq!(state.line, 1);
        assert_eq!(state.tokens()[0].map, (0, 1));
    }

    #[test]
    fn repeated_keys_overwrite_in_place() {
        let attrs = parse_attributes(r#"type="a" label="x" type="b""#);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.iter().collect::<Vec<_>>(), vec![("type", "b"), ("label", "x")]);
    }

    #[test]
    fn escaped_quotes_are_not_supported() {
        let attrs = parse_attributes(r#"label="say \"hi\"" type="t""#);
        assert_eq!(attrs.get("label"), Some(r"say \"));
        assert_eq!(attrs.get("type"), Some("t"));
    }

    #[test]
    fn generated_ids_have_timestamp_and_suffix() {
        let id = generate_component_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "component");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert_ne!(id, generate_component_id());
    }
}
