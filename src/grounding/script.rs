/// pyautogui script generation for resolved actions.
///
/// Output is meant to be run as-is by a driver on the machine that produced
/// the screenshot. Every action contributes at least one line; anything that
/// cannot be automated becomes a `#` comment instead of an error.
use crate::grounding::types::{ActionKind, PixelRegion, ResolvedAction, ResolvedParam};

const SCROLL_CLICKS: i32 = 5;
const DEFAULT_WAIT_SECS: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct ScriptOptions {
    /// Multiplier from screenshot pixels to the automation surface.
    pub scale_factor: f64,
    /// Paste typed text via the clipboard (handles IME / non-ASCII input).
    pub input_swap: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self { scale_factor: 1.0, input_swap: true }
    }
}

/// Render with clipboard-based typing.
pub fn render(actions: &[ResolvedAction], image_width: u32, image_height: u32, scale_factor: f64) -> String {
    render_with(
        actions,
        image_width,
        image_height,
        &ScriptOptions { scale_factor, ..ScriptOptions::default() },
    )
}

pub fn render_with(
    actions: &[ResolvedAction],
    image_width: u32,
    image_height: u32,
    opts: &ScriptOptions,
) -> String {
    let mut lines = vec![
        "import pyautogui".to_string(),
        "import time".to_string(),
        format!(
            "# screenshot {image_width}x{image_height}, scale factor {}",
            fmt_coord(opts.scale_factor)
        ),
    ];

    if let Some(thought) = actions.first().and_then(|a| a.thought.as_deref()) {
        lines.push(String::new());
        for line in thought.lines() {
            lines.push(comment(&format!("Thought: {line}")));
        }
    }

    for (i, action) in actions.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
            lines.push("time.sleep(1)".to_string());
        }
        lines.push(String::new());
        lines.extend(render_action(action, opts));
    }

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

fn render_action(action: &ResolvedAction, opts: &ScriptOptions) -> Vec<String> {
    match &action.kind {
        ActionKind::Click | ActionKind::LeftDouble | ActionKind::RightSingle | ActionKind::Hover => {
            let Some((x, y)) = target(action, "start_box", opts) else {
                return vec![unresolved(action, "start_box")];
            };
            let call = match action.kind {
                ActionKind::LeftDouble => format!("pyautogui.doubleClick({x}, {y}, button='left')"),
                ActionKind::RightSingle => format!("pyautogui.click({x}, {y}, button='right')"),
                ActionKind::Hover => format!("pyautogui.moveTo({x}, {y})"),
                _ => format!("pyautogui.click({x}, {y}, button='left')"),
            };
            vec![call]
        }
        ActionKind::Drag | ActionKind::Select => {
            let Some((sx, sy)) = target(action, "start_box", opts) else {
                return vec![unresolved(action, "start_box")];
            };
            let Some((ex, ey)) = target(action, "end_box", opts) else {
                return vec![unresolved(action, "end_box")];
            };
            vec![
                format!("pyautogui.moveTo({sx}, {sy})"),
                format!("pyautogui.dragTo({ex}, {ey}, duration=1.0)"),
            ]
        }
        ActionKind::Scroll => render_scroll(action, opts),
        ActionKind::Hotkey => {
            let keys: Vec<String> = action
                .text("key")
                .or_else(|| action.text("hotkey"))
                .unwrap_or_default()
                .split_whitespace()
                .map(|k| py_str(key_name(k)))
                .collect();
            if keys.is_empty() {
                return vec![comment("hotkey without keys")];
            }
            vec![format!("pyautogui.hotkey({})", keys.join(", "))]
        }
        ActionKind::Press | ActionKind::KeyDown | ActionKind::KeyUp => {
            let key = ["key", "press", "keydown", "keyup", "release"]
                .iter()
                .find_map(|k| action.text(k))
                .map(str::trim)
                .filter(|k| !k.is_empty());
            let Some(key) = key else {
                return vec![comment(&format!("{} without key", action.kind))];
            };
            let func = match action.kind {
                ActionKind::Press => "press",
                ActionKind::KeyDown => "keyDown",
                _ => "keyUp",
            };
            vec![format!("pyautogui.{func}({})", py_str(key_name(key)))]
        }
        ActionKind::Type => render_type(action.text("content").unwrap_or_default(), opts),
        ActionKind::Wait => {
            let secs = ["time", "seconds", "duration"]
                .iter()
                .find_map(|k| action.text(k))
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|s| s.is_finite() && *s >= 0.0)
                .unwrap_or(DEFAULT_WAIT_SECS);
            vec![format!("time.sleep({})", fmt_coord(secs))]
        }
        ActionKind::Finished => match action.text("content") {
            Some(content) => vec![format!("print('DONE', {})", py_str(content))],
            None => vec!["print('DONE')".to_string()],
        },
        ActionKind::CallUser => vec![comment("call_user: waiting for human input")],
        ActionKind::LongPress | ActionKind::OpenApp | ActionKind::PressHome | ActionKind::PressBack => {
            vec![comment(&format!("Unsupported on desktop: {}", action.kind))]
        }
        ActionKind::Other(name) => vec![comment(&format!("Unrecognized action type: {name}"))],
    }
}

fn render_scroll(action: &ResolvedAction, opts: &ScriptOptions) -> Vec<String> {
    let direction = action.text("direction").unwrap_or_default().to_lowercase();
    let (func, amount) = if direction.contains("up") {
        ("scroll", SCROLL_CLICKS)
    } else if direction.contains("down") {
        ("scroll", -SCROLL_CLICKS)
    } else if direction.contains("left") {
        ("hscroll", -SCROLL_CLICKS)
    } else if direction.contains("right") {
        ("hscroll", SCROLL_CLICKS)
    } else {
        return vec![comment(&format!("scroll with unknown direction {direction:?}"))];
    };

    match action.inputs.get("start_box") {
        Some(ResolvedParam::Unresolved { .. }) => vec![unresolved(action, "start_box")],
        _ => match target(action, "start_box", opts) {
            Some((x, y)) => vec![format!("pyautogui.{func}({amount}, x={x}, y={y})")],
            None => vec![format!("pyautogui.{func}({amount})")],
        },
    }
}

fn render_type(content: &str, opts: &ScriptOptions) -> Vec<String> {
    let submit = content.ends_with('\n');
    let text = content.trim_end_matches('\n');
    let mut lines = Vec::new();

    if !text.is_empty() {
        if opts.input_swap {
            lines.push("import pyperclip".to_string());
            lines.push(format!("pyperclip.copy({})", py_str(text)));
            lines.push("pyautogui.hotkey('ctrl', 'v')".to_string());
            lines.push("time.sleep(0.5)".to_string());
        } else {
            lines.push(format!("pyautogui.write({}, interval=0.1)", py_str(text)));
            lines.push("time.sleep(0.5)".to_string());
        }
    }
    if submit {
        lines.push("pyautogui.press('enter')".to_string());
    }
    if lines.is_empty() {
        lines.push(comment("type without content"));
    }
    lines
}

fn target(action: &ResolvedAction, key: &str, opts: &ScriptOptions) -> Option<(String, String)> {
    let PixelRegion { center, .. } = action.region(key)?;
    Some((
        fmt_coord(center.x as f64 * opts.scale_factor),
        fmt_coord(center.y as f64 * opts.scale_factor),
    ))
}

fn unresolved(action: &ResolvedAction, key: &str) -> String {
    let reason = match action.inputs.get(key) {
        Some(ResolvedParam::Unresolved { error, .. }) => error.as_str(),
        _ => "missing",
    };
    comment(&format!("Unresolved {key} for {}: {reason}", action.kind))
}

/// Round to 3 decimals; integral values print without a fraction.
fn fmt_coord(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    format!("{r}")
}

fn key_name(key: &str) -> &str {
    match key {
        "arrowleft" => "left",
        "arrowright" => "right",
        "arrowup" => "up",
        "arrowdown" => "down",
        "space" => " ",
        other => other,
    }
}

/// Single-quoted Python string literal.
fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn comment(text: &str) -> String {
    format!("# {}", text.replace(['\n', '\r'], " "))
}
