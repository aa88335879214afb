/// Decoder for UI-TARS style responses:
///
/// ```text
/// Thought: The search box is at the top.
/// Action: click(point='<point>512 88</point>')
/// ```
///
/// The `Action:` section is read with a small call grammar
/// (`name(key='value', ...)`) and every call is dispatched through a rule
/// table keyed by action name. Coordinates go through a numeric-list reader
/// that only accepts numbers, tags and brackets; nothing in the model output
/// is ever evaluated.
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{GatewayError, GatewayResult};
use crate::grounding::resize::ResizeTarget;
use crate::grounding::types::{
    ActionKind, ActionSequence, NormalizedBox, ParamValue, StructuredAction,
};

/// How raw coordinate numbers relate to the image the model saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelVariant {
    /// Coordinates on a fixed relative grid (0..divisor).
    #[serde(rename = "qwen2vl")]
    Qwen2Vl,
    /// Coordinates in absolute pixels of the resized image.
    #[default]
    #[serde(rename = "qwen25vl")]
    Qwen25Vl,
}

static THOUGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Thought:\s*(.*?)\s*(?:Action:|$)").expect("thought regex must compile")
});
static REFLECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Reflection:\s*(.*?)\s*(?:Action_Summary:|Action:|$)")
        .expect("reflection regex must compile")
});
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action_Summary:\s*(.*?)\s*(?:Action:|$)").expect("summary regex must compile")
});
static POINT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(point|bbox)>(.*?)</(?:point|bbox)>").expect("point tag regex must compile")
});

const ACTION_MARKER: &str = "Action:";

// ── Rule table ───────────────────────────────────────────────────────────────

const START: &str = "start_box";
const END: &str = "end_box";

struct ActionRule {
    names: &'static [&'static str],
    /// Canonical coordinate parameters this action takes.
    coords: &'static [&'static str],
}

const RULES: &[ActionRule] = &[
    ActionRule { names: &["click", "left_single"], coords: &[START] },
    ActionRule { names: &["left_double"], coords: &[START] },
    ActionRule { names: &["right_single"], coords: &[START] },
    ActionRule { names: &["hover"], coords: &[START] },
    ActionRule { names: &["long_press"], coords: &[START] },
    ActionRule { names: &["drag", "select"], coords: &[START, END] },
    ActionRule { names: &["scroll"], coords: &[START] },
    ActionRule { names: &["hotkey", "press", "keydown", "keyup", "release"], coords: &[] },
    ActionRule { names: &["type", "finished", "call_user", "open_app"], coords: &[] },
    ActionRule { names: &["wait", "press_home", "press_back"], coords: &[] },
];

fn find_rule(name: &str) -> Option<&'static ActionRule> {
    RULES.iter().find(|rule| rule.names.contains(&name))
}

/// Map the point/box spellings the model family has used onto two keys.
fn canonical_coord_key(key: &str) -> Option<&'static str> {
    match key {
        "point" | "start_point" | "start_box" => Some(START),
        "end_point" | "end_box" => Some(END),
        _ => None,
    }
}

// ── Public entry points ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseHeader {
    pub thought: Option<String>,
    pub reflection: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub header: ResponseHeader,
    pub actions: ActionSequence,
}

/// The coordinate frame numbers in the response are expressed in.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateSpace {
    pub divisor: f64,
    pub resized: ResizeTarget,
    pub variant: ModelVariant,
}

impl CoordinateSpace {
    fn normalize(&self, numbers: &[Number]) -> GatewayResult<Vec<f64>> {
        let already_normalized = numbers.iter().all(|n| (0.0..=1.0).contains(&n.value))
            && numbers.iter().any(|n| n.fractional);
        if already_normalized {
            return Ok(numbers.iter().map(|n| n.value).collect());
        }

        match self.variant {
            ModelVariant::Qwen2Vl => {
                if self.divisor <= 0.0 {
                    return Err(GatewayError::CoordinateExtraction(format!(
                        "coordinate divisor must be positive, got {}",
                        self.divisor
                    )));
                }
                Ok(numbers.iter().map(|n| n.value / self.divisor).collect())
            }
            ModelVariant::Qwen25Vl => {
                let (w, h) = (self.resized.width as f64, self.resized.height as f64);
                if w <= 0.0 || h <= 0.0 {
                    return Err(GatewayError::CoordinateExtraction(
                        "resized dimensions must be positive".into(),
                    ));
                }
                Ok(numbers
                    .iter()
                    .enumerate()
                    .map(|(i, n)| if i % 2 == 0 { n.value / w } else { n.value / h })
                    .collect())
            }
        }
    }
}

/// Pull `Thought` / `Reflection` text out of a response.
pub fn parse_header(text: &str) -> ResponseHeader {
    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let reflection = if text.contains("Reflection:") { capture(&REFLECTION_RE) } else { None };
    let thought = if text.contains("Thought:") {
        capture(&THOUGHT_RE)
    } else if text.contains("Action_Summary:") {
        capture(&SUMMARY_RE)
    } else {
        None
    };

    ResponseHeader { thought, reflection }
}

/// Last `Action:` that opens a line. Quoted values escape their newlines,
/// so a marker typed inside `content='...'` never qualifies.
fn action_marker_offset(text: &str) -> Option<usize> {
    text.match_indices(ACTION_MARKER)
        .map(|(i, _)| i)
        .filter(|&i| text[..i].rsplit('\n').next().is_some_and(|line| line.trim().is_empty()))
        .last()
}

/// Decode a response, reporting why nothing could be decoded.
pub fn parse_response(
    raw_text: &str,
    coordinate_divisor: f64,
    resized_height: u32,
    resized_width: u32,
    model_variant: ModelVariant,
) -> GatewayResult<ParsedResponse> {
    let space = CoordinateSpace {
        divisor: coordinate_divisor,
        resized: ResizeTarget { height: resized_height, width: resized_width },
        variant: model_variant,
    };
    let text = raw_text.trim();
    let header = parse_header(text);

    let Some(idx) = action_marker_offset(text) else {
        return Err(GatewayError::Parse("response has no Action: section".into()));
    };
    let section = text[idx + ACTION_MARKER.len()..].trim();

    let calls = scan_calls(section);
    if calls.is_empty() {
        return Err(GatewayError::Parse(format!(
            "no action call recognized in {section:?}"
        )));
    }

    let actions = calls
        .into_iter()
        .map(|call| build_action(call, &space, &header))
        .collect();

    Ok(ParsedResponse { header, actions })
}

/// Decode a response into actions. Failures are logged and yield an empty
/// sequence so the caller still gets the raw text back.
pub fn parse(
    raw_text: &str,
    coordinate_divisor: f64,
    resized_height: u32,
    resized_width: u32,
    model_variant: ModelVariant,
) -> ActionSequence {
    match parse_response(raw_text, coordinate_divisor, resized_height, resized_width, model_variant)
    {
        Ok(parsed) => parsed.actions,
        Err(e) => {
            tracing::warn!(error = %e, "could not decode model response; returning no actions");
            Vec::new()
        }
    }
}

// ── Action assembly ──────────────────────────────────────────────────────────

fn build_action(call: RawCall, space: &CoordinateSpace, header: &ResponseHeader) -> StructuredAction {
    let kind = ActionKind::from(call.name.clone());
    let mut inputs = BTreeMap::new();

    match find_rule(&call.name) {
        Some(rule) => {
            for arg in call.args {
                if arg.value.is_empty() {
                    continue;
                }
                match canonical_coord_key(&arg.key).filter(|k| rule.coords.contains(k)) {
                    Some(key) => {
                        let value = match parse_coordinates(&arg.value, space) {
                            Ok(b) => ParamValue::Box(b),
                            Err(e) => {
                                tracing::warn!(
                                    action = %call.name,
                                    param = %arg.key,
                                    raw = %arg.raw,
                                    error = %e,
                                    "coordinate extraction failed; keeping raw value"
                                );
                                ParamValue::Unresolved { raw: arg.raw, error: e.to_string() }
                            }
                        };
                        inputs.insert(key.to_string(), value);
                    }
                    None => {
                        inputs.insert(arg.key, ParamValue::Text(arg.value));
                    }
                }
            }
        }
        None => {
            tracing::debug!(action = %call.name, "unrecognized action; keeping verbatim parameters");
            for arg in call.args {
                inputs.insert(arg.key, ParamValue::Text(arg.raw));
            }
        }
    }

    StructuredAction {
        kind,
        inputs,
        thought: header.thought.clone(),
        reflection: header.reflection.clone(),
    }
}

// ── Numeric list reader ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Number {
    value: f64,
    fractional: bool,
}

fn read_numbers(value: &str) -> GatewayResult<Vec<Number>> {
    let untagged = POINT_TAG_RE.replace_all(value, " $2 ");
    let stripped = untagged
        .replace("<|box_start|>", " ")
        .replace("<|box_end|>", " ")
        .replace("<|point_start|>", " ")
        .replace("<|point_end|>", " ");

    let mut numbers = Vec::new();
    for token in stripped
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')' | '[' | ']'))
        .filter(|t| !t.is_empty())
    {
        let parsed: f64 = token.parse().map_err(|_| {
            GatewayError::CoordinateExtraction(format!("{token:?} is not a number in {value:?}"))
        })?;
        if !parsed.is_finite() {
            return Err(GatewayError::CoordinateExtraction(format!(
                "non-finite coordinate {token:?}"
            )));
        }
        numbers.push(Number { value: parsed, fractional: token.contains('.') });
    }
    Ok(numbers)
}

fn parse_coordinates(value: &str, space: &CoordinateSpace) -> GatewayResult<NormalizedBox> {
    let numbers = read_numbers(value)?;
    let norm = match numbers.len() {
        2 | 4 => space.normalize(&numbers)?,
        n => {
            return Err(GatewayError::CoordinateExtraction(format!(
                "expected 2 or 4 numbers, found {n} in {value:?}"
            )))
        }
    };
    Ok(match norm.as_slice() {
        [x, y] => NormalizedBox::point(*x, *y),
        [x1, y1, x2, y2] => NormalizedBox([*x1, *y1, *x2, *y2]),
        _ => unreachable!("length checked above"),
    })
}

// ── Call grammar ─────────────────────────────────────────────────────────────
//
//   section := (junk* call)*
//   call    := ident ws* '(' (arg (',' arg)*)? ')'?
//   arg     := (ident ws* '=' ws*)? value
//   value   := quoted | bare

#[derive(Debug, Clone, PartialEq)]
struct RawArg {
    key: String,
    /// Decoded value (quotes removed, escapes applied).
    value: String,
    /// Value as written, minus surrounding quotes.
    raw: String,
}

#[derive(Debug, Clone, PartialEq)]
struct RawCall {
    name: String,
    args: Vec<RawArg>,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        Some(&self.src[start..self.pos])
    }

    /// A quote closes the string only when followed by `,`, `)` or the end.
    /// Anything else means the model forgot to escape it.
    fn closes_string(&self, after: usize) -> bool {
        let tail = self.src[after..].trim_start();
        tail.is_empty() || tail.starts_with(',') || tail.starts_with(')')
    }

    fn quoted(&mut self, quote: char) -> (String, String) {
        let start = self.pos;
        let mut decoded = String::new();
        while let Some(c) = self.bump() {
            if c == '\\' {
                match self.bump() {
                    Some('n') => decoded.push('\n'),
                    Some('t') => decoded.push('\t'),
                    Some('r') => decoded.push('\r'),
                    Some(e @ ('\'' | '"' | '\\')) => decoded.push(e),
                    Some(other) => {
                        decoded.push('\\');
                        decoded.push(other);
                    }
                    None => decoded.push('\\'),
                }
            } else if c == quote && self.closes_string(self.pos) {
                let raw = self.src[start..self.pos - c.len_utf8()].to_string();
                return (decoded, raw);
            } else {
                decoded.push(c);
            }
        }
        (decoded, self.src[start..].to_string())
    }

    fn bare(&mut self) -> String {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' if depth > 0 => depth -= 1,
                ',' | ')' if depth == 0 => break,
                _ => {}
            }
            self.bump();
        }
        self.src[start..self.pos].trim().to_string()
    }

    fn value(&mut self) -> (String, String) {
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.bump();
                self.quoted(q)
            }
            _ => {
                let v = self.bare();
                (v.clone(), v)
            }
        }
    }

    fn args(&mut self) -> Vec<RawArg> {
        let mut args = Vec::new();
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace() || c == ',') {
                self.bump();
            }
            match self.peek() {
                None => break,
                Some(')') => {
                    self.bump();
                    break;
                }
                _ => {}
            }

            let checkpoint = self.pos;
            let key = match self.ident() {
                Some(name) => {
                    self.skip_ws();
                    if self.peek() == Some('=') {
                        self.bump();
                        self.skip_ws();
                        Some(name.to_string())
                    } else {
                        self.pos = checkpoint;
                        None
                    }
                }
                None => None,
            };
            let key = key.unwrap_or_else(|| format!("arg{}", args.len()));
            let before = self.pos;
            let (value, raw) = self.value();
            args.push(RawArg { key, value, raw });
            if self.pos == before {
                // Stray character the value reader refused; step over it.
                self.bump();
            }
        }
        args
    }
}

fn scan_calls(section: &str) -> Vec<RawCall> {
    let mut scanner = Scanner::new(section);
    let mut calls = Vec::new();
    let mut bare_names = Vec::new();

    loop {
        while scanner.peek().is_some_and(|c| !(c.is_ascii_alphabetic() || c == '_')) {
            scanner.bump();
        }
        let Some(name) = scanner.ident() else { break };
        scanner.skip_ws();
        if scanner.peek() == Some('(') {
            scanner.bump();
            let args = scanner.args();
            calls.push(RawCall { name: name.to_string(), args });
        } else {
            bare_names.push(name);
        }
    }

    // `Action: wait` with the parentheses left off.
    if calls.is_empty() {
        if let [name] = bare_names.as_slice() {
            calls.push(RawCall { name: name.to_string(), args: Vec::new() });
        }
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_1000(text: &str) -> ActionSequence {
        parse(text, 1000.0, 1000, 1000, ModelVariant::Qwen25Vl)
    }

    fn start_box(action: &StructuredAction) -> [f64; 4] {
        match action.inputs.get("start_box") {
            Some(ParamValue::Box(b)) => b.0,
            other => panic!("expected start_box, got {other:?}"),
        }
    }

    fn assert_close(actual: [f64; 4], expected: [f64; 4]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn point_tag_click_is_normalized() {
        let actions = parse_1000("Thought: go\nAction: click(point='<point>500 400</point>')");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Click);
        assert_eq!(start_box(&actions[0]), [0.5, 0.4, 0.5, 0.4]);
        assert_eq!(actions[0].thought.as_deref(), Some("go"));
    }

    #[test]
    fn relative_variant_divides_by_divisor_only() {
        let actions = parse(
            "Action: click(start_box='(250,750)')",
            1000.0,
            812,
            1008,
            ModelVariant::Qwen2Vl,
        );
        assert_close(start_box(&actions[0]), [0.25, 0.75, 0.25, 0.75]);
    }

    #[test]
    fn absolute_variant_uses_resize_space() {
        let actions = parse(
            "Action: click(point='<point>504 406</point>')",
            1000.0,
            812,
            1008,
            ModelVariant::Qwen25Vl,
        );
        assert_close(start_box(&actions[0]), [0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn missing_action_line_yields_empty_sequence() {
        assert!(parse_1000("Thought: I should look around first.").is_empty());
        let err = parse_response("Thought: hmm", 1000.0, 1000, 1000, ModelVariant::Qwen25Vl)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[test]
    fn action_without_call_is_parse_error() {
        let err = parse_response("Action: ???", 1000.0, 1000, 1000, ModelVariant::Qwen25Vl)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[test]
    fn drag_maps_start_and_end_points() {
        let actions = parse_1000(
            "Thought: move it\nAction: drag(start_point='<point>100 200</point>', end_point='<point>300 400</point>')",
        );
        let drag = &actions[0];
        assert_eq!(drag.kind, ActionKind::Drag);
        assert_close(start_box(drag), [0.1, 0.2, 0.1, 0.2]);
        match drag.inputs.get("end_box") {
            Some(ParamValue::Box(b)) => assert_close(b.0, [0.3, 0.4, 0.3, 0.4]),
            other => panic!("expected end_box, got {other:?}"),
        }
    }

    #[test]
    fn bracketed_box_and_bbox_tag_are_read() {
        let actions = parse_1000(
            "Action: click(start_box='[100, 200, 300, 400]')\n\nright_single(point='<bbox>10 20 30 40</bbox>')",
        );
        assert_eq!(actions.len(), 2);
        assert_close(start_box(&actions[0]), [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(actions[1].kind, ActionKind::RightSingle);
        assert_close(start_box(&actions[1]), [0.01, 0.02, 0.03, 0.04]);
    }

    #[test]
    fn box_token_format_is_read() {
        let actions = parse_1000("Action: click(start_box='<|box_start|>(250,500)<|box_end|>')");
        assert_close(start_box(&actions[0]), [0.25, 0.5, 0.25, 0.5]);
    }

    #[test]
    fn already_normalized_floats_pass_through() {
        let actions = parse_1000("Action: click(start_box='[0.1,0.2,0.3,0.4]')");
        assert_close(start_box(&actions[0]), [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn multiple_actions_keep_order() {
        let actions = parse_1000(
            "Thought: fill and submit\nAction: click(point='<point>10 10</point>'); type(content='hello\\n'), hotkey(key='ctrl s')",
        );
        let kinds: Vec<_> = actions.iter().map(|a| a.kind.clone()).collect();
        assert_eq!(kinds, vec![ActionKind::Click, ActionKind::Type, ActionKind::Hotkey]);
        assert_eq!(actions[1].text("content"), Some("hello\n"));
        assert_eq!(actions[2].text("key"), Some("ctrl s"));
    }

    #[test]
    fn escapes_and_stray_quotes_in_content() {
        let actions = parse_1000(r#"Action: type(content='it\'s "ok"\nnext')"#);
        assert_eq!(actions[0].text("content"), Some("it's \"ok\"\nnext"));

        let actions = parse_1000("Action: type(content='don't stop')");
        assert_eq!(actions[0].text("content"), Some("don't stop"));
    }

    #[test]
    fn unterminated_call_is_tolerated() {
        let actions = parse_1000("Action: finished(content='all done'");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Finished);
        assert_eq!(actions[0].text("content"), Some("all done"));
    }

    #[test]
    fn bare_known_name_is_zero_arg_call() {
        let actions = parse_1000("Thought: nothing changed yet\nAction: wait");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Wait);
        assert!(actions[0].inputs.is_empty());
    }

    #[test]
    fn bare_unknown_name_is_kept() {
        let actions = parse_1000("Thought: x\nAction: triple_click");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Other("triple_click".into()));
        assert!(actions[0].inputs.is_empty());
    }

    #[test]
    fn marker_inside_typed_content_is_not_a_section() {
        let actions = parse_1000("Thought: label it\nAction: type(content='Action: next')");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Type);
        assert_eq!(actions[0].text("content"), Some("Action: next"));
        assert_eq!(actions[0].thought.as_deref(), Some("label it"));
    }

    #[test]
    fn last_line_start_marker_wins() {
        let text = "Thought: first try\nAction: wait()\nReconsidered.\n  Action: hotkey(key='ctrl c')";
        let actions = parse_1000(text);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Hotkey);
    }

    #[test]
    fn unknown_action_keeps_verbatim_params() {
        let actions = parse_1000("Action: triple_click(point='<point>1 2</point>', times=3)");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Other("triple_click".into()));
        assert_eq!(actions[0].text("point"), Some("<point>1 2</point>"));
        assert_eq!(actions[0].text("times"), Some("3"));
    }

    #[test]
    fn malformed_coordinates_keep_the_action() {
        let actions = parse_1000(
            "Action: click(point='<point>left top</point>')\nhotkey(key='enter')",
        );
        assert_eq!(actions.len(), 2);
        match actions[0].inputs.get("start_box") {
            Some(ParamValue::Unresolved { raw, error }) => {
                assert_eq!(raw, "<point>left top</point>");
                assert!(error.contains("not a number"));
            }
            other => panic!("expected unresolved start_box, got {other:?}"),
        }
        assert_eq!(actions[1].kind, ActionKind::Hotkey);
    }

    #[test]
    fn wrong_number_count_is_unresolved() {
        let actions = parse_1000("Action: click(point='<point>1 2 3</point>')");
        assert!(matches!(
            actions[0].inputs.get("start_box"),
            Some(ParamValue::Unresolved { .. })
        ));
    }

    #[test]
    fn expression_syntax_is_not_evaluated() {
        let actions = parse_1000("Action: click(start_box='[__import__(\"os\"), 1]')");
        assert!(matches!(
            actions[0].inputs.get("start_box"),
            Some(ParamValue::Unresolved { .. })
        ));
    }

    #[test]
    fn reflection_and_summary_header() {
        let text = "Reflection: the menu did not open\nAction_Summary: open it again\nAction: click(point='<point>5 5</point>')";
        let parsed = parse_response(text, 1000.0, 1000, 1000, ModelVariant::Qwen25Vl).unwrap();
        assert_eq!(parsed.header.reflection.as_deref(), Some("the menu did not open"));
        assert_eq!(parsed.header.thought.as_deref(), Some("open it again"));
        assert_eq!(parsed.actions[0].reflection.as_deref(), Some("the menu did not open"));
    }

    #[test]
    fn scroll_keeps_direction_text() {
        let actions = parse_1000("Action: scroll(point='<point>500 500</point>', direction='down')");
        assert_eq!(actions[0].kind, ActionKind::Scroll);
        assert_eq!(actions[0].text("direction"), Some("down"));
        assert_close(start_box(&actions[0]), [0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn empty_values_are_skipped() {
        let actions = parse_1000("Action: type(content='')");
        assert_eq!(actions[0].kind, ActionKind::Type);
        assert!(actions[0].inputs.is_empty());
    }
}
