use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Action vocabulary understood by the UI-TARS action space.
///
/// Names outside the vocabulary are kept as `Other` so nothing the model
/// emits is dropped on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Click,
    LeftDouble,
    RightSingle,
    Hover,
    Drag,
    Select,
    Hotkey,
    Press,
    KeyDown,
    KeyUp,
    Type,
    Scroll,
    Wait,
    Finished,
    CallUser,
    LongPress,
    OpenApp,
    PressHome,
    PressBack,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Click => "click",
            ActionKind::LeftDouble => "left_double",
            ActionKind::RightSingle => "right_single",
            ActionKind::Hover => "hover",
            ActionKind::Drag => "drag",
            ActionKind::Select => "select",
            ActionKind::Hotkey => "hotkey",
            ActionKind::Press => "press",
            ActionKind::KeyDown => "keydown",
            ActionKind::KeyUp => "keyup",
            ActionKind::Type => "type",
            ActionKind::Scroll => "scroll",
            ActionKind::Wait => "wait",
            ActionKind::Finished => "finished",
            ActionKind::CallUser => "call_user",
            ActionKind::LongPress => "long_press",
            ActionKind::OpenApp => "open_app",
            ActionKind::PressHome => "press_home",
            ActionKind::PressBack => "press_back",
            ActionKind::Other(name) => name,
        }
    }

    /// Actions aimed at a location on screen (click/drag-like).
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            ActionKind::Click
                | ActionKind::LeftDouble
                | ActionKind::RightSingle
                | ActionKind::Hover
                | ActionKind::Drag
                | ActionKind::Select
                | ActionKind::Scroll
                | ActionKind::LongPress
        )
    }
}

impl From<String> for ActionKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "click" | "left_single" => ActionKind::Click,
            "left_double" => ActionKind::LeftDouble,
            "right_single" => ActionKind::RightSingle,
            "hover" => ActionKind::Hover,
            "drag" => ActionKind::Drag,
            "select" => ActionKind::Select,
            "hotkey" => ActionKind::Hotkey,
            "press" => ActionKind::Press,
            "keydown" => ActionKind::KeyDown,
            "keyup" | "release" => ActionKind::KeyUp,
            "type" => ActionKind::Type,
            "scroll" => ActionKind::Scroll,
            "wait" => ActionKind::Wait,
            "finished" => ActionKind::Finished,
            "call_user" => ActionKind::CallUser,
            "long_press" => ActionKind::LongPress,
            "open_app" => ActionKind::OpenApp,
            "press_home" => ActionKind::PressHome,
            "press_back" => ActionKind::PressBack,
            _ => ActionKind::Other(name),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized box `[x1, y1, x2, y2]` in 0.0–1.0. A point is stored as a
/// degenerate box with both corners equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox(pub [f64; 4]);

impl NormalizedBox {
    pub fn point(x: f64, y: f64) -> Self {
        Self([x, y, x, y])
    }

    pub fn center(&self) -> (f64, f64) {
        let [x1, y1, x2, y2] = self.0;
        ((x1 + x2) / 2.0, (y1 + y2) / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Box(NormalizedBox),
    Text(String),
    /// Coordinate text that could not be read as numbers; kept verbatim.
    Unresolved { raw: String, error: String },
}

/// One action decoded from the model response, coordinates still normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAction {
    #[serde(rename = "action_type")]
    pub kind: ActionKind,
    #[serde(rename = "action_inputs")]
    pub inputs: BTreeMap<String, ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
}

impl StructuredAction {
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.inputs.get(key) {
            Some(ParamValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

pub type ActionSequence = Vec<StructuredAction>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    /// `[x1, y1, x2, y2]` in original-image pixels.
    pub bounds: [u32; 4],
    pub center: PixelPoint,
    /// True when a normalized input fell outside 0.0–1.0 and was clamped.
    pub clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedParam {
    Region(PixelRegion),
    Text(String),
    Unresolved { raw: String, error: String },
}

/// An action whose coordinates are absolute pixels of the original screenshot.
///
/// Deliberately a separate type from [`StructuredAction`]: there is no way
/// to feed it back into the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAction {
    pub kind: ActionKind,
    pub inputs: BTreeMap<String, ResolvedParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

impl ResolvedAction {
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.inputs.get(key) {
            Some(ResolvedParam::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn region(&self, key: &str) -> Option<&PixelRegion> {
        match self.inputs.get(key) {
            Some(ResolvedParam::Region(r)) => Some(r),
            _ => None,
        }
    }
}

/// Outcome for the first pointer-targeted action of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetResolution {
    /// The response had no click/drag-like action.
    NoAction,
    /// There was one, but its coordinates could not be read.
    Unresolved { action_type: ActionKind, reason: String },
    Resolved { action_type: ActionKind, x: u32, y: u32 },
}

impl TargetResolution {
    pub fn point(&self) -> Option<PixelPoint> {
        match self {
            TargetResolution::Resolved { x, y, .. } => Some(PixelPoint { x: *x, y: *y }),
            _ => None,
        }
    }
}
