//! Lenient decoding of analyzer output into a typed annotation.
//!
//! The analyzer is untrusted input: fields can be missing, of the wrong
//! type, or out of range. Decoding never fails and never panics; anything
//! unusable falls back to a documented default. Unknown enum strings become
//! `other` / `medium` / `other` via the `parse_lossy` constructors.

use serde_json::Value;

use wheelway_core::annotation::{
    clamp_score, ImageAnnotation, SpaceFeatures, SpaceType, DEFAULT_ACCESSIBILITY_SCORE,
    DEFAULT_FLOOR_TYPE, DEFAULT_LIGHTING,
};
use wheelway_core::barrier::{
    truncate_chars, BarrierSeverity, BarrierType, BoundingBox, DetectedBarrier,
    DEFAULT_BARRIER_CONFIDENCE, MAX_BARRIER_DESCRIPTION_LEN, MAX_BARRIER_RECOMMENDATION_LEN,
    UNKNOWN_BARRIER_DESCRIPTION,
};

/// Decode one analyzer response document into an annotation.
///
/// Non-object barrier entries are skipped; everything else degrades
/// field-by-field rather than discarding the document.
pub fn parse_annotation(document: &Value) -> ImageAnnotation {
    let space_type = document
        .get("space_type")
        .and_then(Value::as_str)
        .map(|s| SpaceType::parse_lossy(&s.to_lowercase()))
        .unwrap_or(SpaceType::Other);

    let barriers = document
        .get("barriers")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(parse_barrier).collect())
        .unwrap_or_default();

    let accessibility_score = document
        .get("accessibility_score")
        .and_then(Value::as_f64)
        .map(clamp_score)
        .unwrap_or(DEFAULT_ACCESSIBILITY_SCORE);

    let overall_description = document
        .get("overall_description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    ImageAnnotation {
        space_type,
        features: parse_features(document.get("features")),
        barriers,
        accessibility_score,
        overall_description,
        error: None,
    }
}

fn parse_features(value: Option<&Value>) -> SpaceFeatures {
    let Some(object) = value.and_then(Value::as_object) else {
        return SpaceFeatures::default();
    };
    SpaceFeatures {
        has_ramp: object.get("has_ramp").and_then(Value::as_bool).unwrap_or(false),
        has_handrails: object
            .get("has_handrails")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        has_elevator: object
            .get("has_elevator")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        lighting: non_empty_str(object.get("lighting"))
            .unwrap_or(DEFAULT_LIGHTING)
            .to_string(),
        floor_type: non_empty_str(object.get("floor_type"))
            .unwrap_or(DEFAULT_FLOOR_TYPE)
            .to_string(),
    }
}

fn parse_barrier(entry: &Value) -> Option<DetectedBarrier> {
    let object = entry.as_object()?;

    let barrier_type = object
        .get("barrier_type")
        .and_then(Value::as_str)
        .map(|s| BarrierType::parse_lossy(&s.to_lowercase()))
        .unwrap_or(BarrierType::Other);

    let severity = object
        .get("severity")
        .and_then(Value::as_str)
        .map(|s| BarrierSeverity::parse_lossy(&s.to_lowercase()))
        .unwrap_or(BarrierSeverity::Medium);

    let description = non_empty_str(object.get("description"))
        .map(|s| truncate_chars(s, MAX_BARRIER_DESCRIPTION_LEN))
        .unwrap_or_else(|| UNKNOWN_BARRIER_DESCRIPTION.to_string());

    let recommendation = non_empty_str(object.get("recommendation"))
        .map(|s| truncate_chars(s, MAX_BARRIER_RECOMMENDATION_LEN));

    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_BARRIER_CONFIDENCE);

    Some(DetectedBarrier {
        barrier_type,
        severity,
        description,
        bbox: parse_bbox(object.get("bbox")),
        estimated_width_cm: dimension_cm(object.get("estimated_width_cm")),
        estimated_height_cm: dimension_cm(object.get("estimated_height_cm")),
        estimated_depth_cm: dimension_cm(object.get("estimated_depth_cm")),
        recommendation,
        confidence,
    })
}

/// All-or-nothing: a box missing any coordinate is dropped, coordinates are
/// clamped into the normalized [0, 1] range.
fn parse_bbox(value: Option<&Value>) -> Option<BoundingBox> {
    let object = value?.as_object()?;
    let coord = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_f64)
            .map(|v| v.clamp(0.0, 1.0))
    };
    Some(BoundingBox {
        x: coord("x")?,
        y: coord("y")?,
        width: coord("width")?,
        height: coord("height")?,
    })
}

fn dimension_cm(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| *v > 0.0)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
