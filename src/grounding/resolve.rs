/// Normalized → original-image pixel mapping.
use std::collections::BTreeMap;

use crate::grounding::types::{
    NormalizedBox, ParamValue, PixelPoint, PixelRegion, ResolvedAction, ResolvedParam,
    StructuredAction, TargetResolution,
};

/// Truncate `v * dim` to a pixel index inside `[0, dim - 1]`.
fn to_pixel(v: f64, dim: u32) -> u32 {
    ((v * dim as f64) as u32).min(dim.saturating_sub(1))
}

fn resolve_box(param: &str, b: &NormalizedBox, width: u32, height: u32) -> PixelRegion {
    let mut clamped = false;
    let mut coords = b.0;
    for c in coords.iter_mut() {
        if !(0.0..=1.0).contains(c) {
            clamped = true;
            *c = c.clamp(0.0, 1.0);
        }
    }
    if clamped {
        tracing::warn!(
            param,
            original = ?b.0,
            clamped = ?coords,
            "normalized coordinates outside [0, 1]; clamped"
        );
    }

    let [x1, y1, x2, y2] = coords;
    let (cx, cy) = NormalizedBox(coords).center();
    PixelRegion {
        bounds: [
            to_pixel(x1, width),
            to_pixel(y1, height),
            to_pixel(x2, width),
            to_pixel(y2, height),
        ],
        center: PixelPoint { x: to_pixel(cx, width), y: to_pixel(cy, height) },
        clamped,
    }
}

/// Map every coordinate parameter of `action` onto the original image.
pub fn resolve(action: &StructuredAction, original_width: u32, original_height: u32) -> ResolvedAction {
    let inputs: BTreeMap<String, ResolvedParam> = action
        .inputs
        .iter()
        .map(|(key, value)| {
            let resolved = match value {
                ParamValue::Box(b) => {
                    ResolvedParam::Region(resolve_box(key, b, original_width, original_height))
                }
                ParamValue::Text(s) => ResolvedParam::Text(s.clone()),
                ParamValue::Unresolved { raw, error } => ResolvedParam::Unresolved {
                    raw: raw.clone(),
                    error: error.clone(),
                },
            };
            (key.clone(), resolved)
        })
        .collect();

    ResolvedAction {
        kind: action.kind.clone(),
        inputs,
        thought: action.thought.clone(),
    }
}

pub fn resolve_all(actions: &[StructuredAction], original_width: u32, original_height: u32) -> Vec<ResolvedAction> {
    actions
        .iter()
        .map(|a| resolve(a, original_width, original_height))
        .collect()
}

/// Where the first click/drag-like action points, keeping "no such action"
/// and "action with unreadable coordinates" apart.
pub fn first_target(actions: &[ResolvedAction]) -> TargetResolution {
    let Some(action) = actions.iter().find(|a| a.kind.is_pointer()) else {
        return TargetResolution::NoAction;
    };

    match action.inputs.get("start_box") {
        Some(ResolvedParam::Region(region)) => TargetResolution::Resolved {
            action_type: action.kind.clone(),
            x: region.center.x,
            y: region.center.y,
        },
        Some(ResolvedParam::Unresolved { error, .. }) => TargetResolution::Unresolved {
            action_type: action.kind.clone(),
            reason: error.clone(),
        },
        Some(ResolvedParam::Text(_)) | None => TargetResolution::Unresolved {
            action_type: action.kind.clone(),
            reason: "action carries no start coordinates".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::types::ActionKind;

    fn action(kind: ActionKind, params: &[(&str, ParamValue)]) -> StructuredAction {
        StructuredAction {
            kind,
            inputs: params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            thought: None,
            reflection: None,
        }
    }

    #[test]
    fn center_point_maps_to_half_dimensions() {
        let a = action(ActionKind::Click, &[("start_box", ParamValue::Box(NormalizedBox::point(0.5, 0.5)))]);
        let r = resolve(&a, 1000, 800);
        let region = r.region("start_box").unwrap();
        assert_eq!(region.center, PixelPoint { x: 500, y: 400 });
        assert_eq!(region.bounds, [500, 400, 500, 400]);
        assert!(!region.clamped);
    }

    #[test]
    fn box_center_is_midpoint() {
        let a = action(
            ActionKind::Click,
            &[("start_box", ParamValue::Box(NormalizedBox([0.1, 0.2, 0.3, 0.4])))],
        );
        let r = resolve(&a, 1000, 800);
        let region = r.region("start_box").unwrap();
        assert_eq!(region.center, PixelPoint { x: 200, y: 240 });
        assert_eq!(region.bounds, [100, 160, 300, 320]);
    }

    #[test]
    fn edges_stay_inside_image() {
        let a = action(ActionKind::Click, &[("start_box", ParamValue::Box(NormalizedBox::point(1.0, 1.0)))]);
        let r = resolve(&a, 640, 480);
        assert_eq!(r.region("start_box").unwrap().center, PixelPoint { x: 639, y: 479 });
    }

    #[test]
    fn out_of_range_values_are_clamped_and_flagged() {
        let a = action(
            ActionKind::Drag,
            &[
                ("start_box", ParamValue::Box(NormalizedBox::point(-0.2, 0.5))),
                ("end_box", ParamValue::Box(NormalizedBox::point(1.7, 0.5))),
            ],
        );
        let r = resolve(&a, 100, 100);
        let start = r.region("start_box").unwrap();
        let end = r.region("end_box").unwrap();
        assert!(start.clamped && end.clamped);
        assert_eq!(start.center, PixelPoint { x: 0, y: 50 });
        assert_eq!(end.center, PixelPoint { x: 99, y: 50 });
    }

    #[test]
    fn text_and_unresolved_pass_through() {
        let a = action(
            ActionKind::Click,
            &[(
                "start_box",
                ParamValue::Unresolved { raw: "<point>a b</point>".into(), error: "bad".into() },
            )],
        );
        let r = resolve(&a, 100, 100);
        assert!(matches!(r.inputs.get("start_box"), Some(ResolvedParam::Unresolved { .. })));
        assert_eq!(
            first_target(&[r]),
            TargetResolution::Unresolved { action_type: ActionKind::Click, reason: "bad".into() }
        );
    }

    #[test]
    fn first_target_skips_non_pointer_actions() {
        let typed = action(ActionKind::Type, &[("content", ParamValue::Text("hi".into()))]);
        let click = action(ActionKind::Click, &[("start_box", ParamValue::Box(NormalizedBox::point(0.25, 0.75)))]);
        let resolved = resolve_all(&[typed, click], 400, 400);
        assert_eq!(
            first_target(&resolved),
            TargetResolution::Resolved { action_type: ActionKind::Click, x: 100, y: 300 }
        );
    }

    #[test]
    fn no_pointer_action_means_no_target() {
        let resolved = resolve_all(&[action(ActionKind::Wait, &[])], 100, 100);
        assert_eq!(first_target(&resolved), TargetResolution::NoAction);
        assert_eq!(first_target(&[]), TargetResolution::NoAction);
    }
}
