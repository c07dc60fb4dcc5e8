//! Navigation-guide generation: fold per-image barriers, annotations, and an
//! optional wheelchair profile into ordered steps, alerts, and a summary.
//!
//! Pure functions of their inputs; persisting the result is the caller's
//! concern. The serde shapes here (`NavigationStep`, rating strings) are
//! part of the stored and served guide format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{ImageAnnotation, DEFAULT_ACCESSIBILITY_SCORE};
use crate::barrier::{BarrierSeverity, BarrierSummary, BarrierType};
use crate::profile::WheelchairProfileSpec;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Accessibility rating
// ---------------------------------------------------------------------------

/// Per-step accessibility verdict derived from the worst barrier severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessibilityRating {
    Accessible,
    Caution,
    Difficult,
    Inaccessible,
}

impl AccessibilityRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accessible => "accessible",
            Self::Caution => "caution",
            Self::Difficult => "difficult",
            Self::Inaccessible => "inaccessible",
        }
    }
}

/// Rating for a step given its barriers: no barriers or worst=low →
/// accessible, worst=medium → caution, worst=high → difficult,
/// worst=critical → inaccessible.
pub fn step_rating(barriers: &[GuideBarrier]) -> AccessibilityRating {
    match barriers.iter().map(|b| b.severity).max() {
        None | Some(BarrierSeverity::Low) => AccessibilityRating::Accessible,
        Some(BarrierSeverity::Medium) => AccessibilityRating::Caution,
        Some(BarrierSeverity::High) => AccessibilityRating::Difficult,
        Some(BarrierSeverity::Critical) => AccessibilityRating::Inaccessible,
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One persisted barrier as the guide generator needs it: the summary
/// fields plus the estimated width used for door checks.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideBarrier {
    pub id: DbId,
    pub barrier_type: BarrierType,
    pub severity: BarrierSeverity,
    pub description: String,
    pub recommendation: Option<String>,
    pub estimated_width_cm: Option<f64>,
}

impl GuideBarrier {
    pub fn summary(&self) -> BarrierSummary {
        BarrierSummary {
            id: self.id,
            barrier_type: self.barrier_type,
            severity: self.severity,
            description: self.description.clone(),
            recommendation: self.recommendation.clone(),
        }
    }
}

/// Per-image input to [`generate_guide`].
#[derive(Debug, Clone)]
pub struct GuideImage {
    pub image_id: DbId,
    pub sequence_order: i32,
    pub barriers: Vec<GuideBarrier>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One step of the navigation guide, matching one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationStep {
    pub step_number: u32,
    pub image_id: DbId,
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub barriers: Vec<BarrierSummary>,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
    pub accessibility_rating: AccessibilityRating,
}

/// A freshly generated guide, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideContent {
    pub title: String,
    pub summary: String,
    pub steps: Vec<NavigationStep>,
    pub critical_alerts: Vec<String>,
    pub overall_score: f64,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a navigation guide over a scan's images.
///
/// Images may arrive in any order; steps are emitted in sequence order with
/// dense step numbers starting at 1. `annotations` is keyed by image id and
/// may be sparse: an image without one contributes the default score and an
/// untitled "Location" step.
pub fn generate_guide(
    scan_id: DbId,
    images: &[GuideImage],
    annotations: &HashMap<DbId, ImageAnnotation>,
    profile: Option<&WheelchairProfileSpec>,
) -> GuideContent {
    let mut ordered: Vec<&GuideImage> = images.iter().collect();
    ordered.sort_by_key(|image| image.sequence_order);

    let mut steps = Vec::with_capacity(ordered.len());
    let mut critical_alerts = Vec::new();

    for image in &ordered {
        let step_number = steps.len() as u32 + 1;
        let annotation = annotations.get(&image.image_id);
        steps.push(build_step(scan_id, image, annotation, profile, step_number));

        for barrier in &image.barriers {
            if barrier.severity == BarrierSeverity::Critical {
                critical_alerts.push(format!("Step {step_number}: {}", barrier.description));
            }
        }
    }

    let overall_score = overall_score(images, annotations);
    let title = title_for_score(overall_score);
    let summary = build_summary(&steps, images, &critical_alerts, overall_score);

    GuideContent {
        title,
        summary,
        steps,
        critical_alerts,
        overall_score,
    }
}

fn build_step(
    scan_id: DbId,
    image: &GuideImage,
    annotation: Option<&ImageAnnotation>,
    profile: Option<&WheelchairProfileSpec>,
    step_number: u32,
) -> NavigationStep {
    let mut alerts = Vec::new();
    let mut recommendations = Vec::new();

    for barrier in &image.barriers {
        if matches!(
            barrier.severity,
            BarrierSeverity::High | BarrierSeverity::Critical
        ) {
            alerts.push(barrier.description.clone());
        }

        if let Some(recommendation) = &barrier.recommendation {
            recommendations.push(recommendation.clone());
        }

        if let (Some(profile), BarrierType::NarrowDoor, Some(width)) =
            (profile, barrier.barrier_type, barrier.estimated_width_cm)
        {
            if width < profile.min_door_width_cm {
                alerts.push(format!(
                    "Door is {width}cm - your wheelchair needs {}cm",
                    profile.min_door_width_cm
                ));
            }
        }
    }

    let space_label = annotation
        .map(|a| a.space_type.display_label())
        .unwrap_or("Location");
    let description = annotation
        .map(|a| a.overall_description.clone())
        .unwrap_or_default();

    NavigationStep {
        step_number,
        image_id: image.image_id,
        image_url: format!(
            "/api/v1/scans/{scan_id}/images/{}/file",
            image.image_id
        ),
        title: format!("Step {step_number}: {space_label}"),
        description,
        barriers: image.barriers.iter().map(GuideBarrier::summary).collect(),
        alerts,
        recommendations,
        accessibility_rating: step_rating(&image.barriers),
    }
}

/// Mean accessibility score across images; images without an annotation
/// count as [`DEFAULT_ACCESSIBILITY_SCORE`], and no images at all yields the
/// default.
pub fn overall_score(
    images: &[GuideImage],
    annotations: &HashMap<DbId, ImageAnnotation>,
) -> f64 {
    if images.is_empty() {
        return DEFAULT_ACCESSIBILITY_SCORE;
    }
    let total: f64 = images
        .iter()
        .map(|image| {
            annotations
                .get(&image.image_id)
                .map(|a| a.accessibility_score)
                .unwrap_or(DEFAULT_ACCESSIBILITY_SCORE)
        })
        .sum();
    total / images.len() as f64
}

/// Guide title from the overall score, bucketed at 80/60/40 (inclusive of
/// the higher bucket).
pub fn title_for_score(score: f64) -> String {
    let accessibility = if score >= 80.0 {
        "High Accessibility"
    } else if score >= 60.0 {
        "Moderate Accessibility"
    } else if score >= 40.0 {
        "Limited Accessibility"
    } else {
        "Restricted Accessibility"
    };
    format!("Navigation Guide - {accessibility}")
}

fn build_summary(
    steps: &[NavigationStep],
    images: &[GuideImage],
    critical_alerts: &[String],
    score: f64,
) -> String {
    let total_barriers: usize = images.iter().map(|image| image.barriers.len()).sum();

    let mut parts = vec![
        format!("This route consists of {} steps.", steps.len()),
        format!("Accessibility score: {score:.0}/100."),
    ];

    if total_barriers > 0 {
        parts.push(format!(
            "{total_barriers} accessibility barriers detected."
        ));
    }

    if !critical_alerts.is_empty() {
        parts.push(format!(
            "ATTENTION: {} critical alerts.",
            critical_alerts.len()
        ));
    }

    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profiles;

    fn barrier(id: DbId, severity: BarrierSeverity) -> GuideBarrier {
        GuideBarrier {
            id,
            barrier_type: BarrierType::Obstacle,
            severity,
            description: format!("barrier {id}"),
            recommendation: None,
            estimated_width_cm: None,
        }
    }

    fn image(image_id: DbId, sequence_order: i32, barriers: Vec<GuideBarrier>) -> GuideImage {
        GuideImage {
            image_id,
            sequence_order,
            barriers,
        }
    }

    fn annotation_with_score(score: f64) -> ImageAnnotation {
        ImageAnnotation {
            accessibility_score: score,
            ..ImageAnnotation::default()
        }
    }

    // -- step_rating -------------------------------------------------------

    #[test]
    fn rating_no_barriers_is_accessible() {
        assert_eq!(step_rating(&[]), AccessibilityRating::Accessible);
    }

    #[test]
    fn rating_low_only_is_accessible() {
        let barriers = vec![barrier(1, BarrierSeverity::Low)];
        assert_eq!(step_rating(&barriers), AccessibilityRating::Accessible);
    }

    #[test]
    fn rating_worst_severity_wins() {
        let barriers = vec![barrier(1, BarrierSeverity::Low), barrier(2, BarrierSeverity::Medium)];
        assert_eq!(step_rating(&barriers), AccessibilityRating::Caution);

        let barriers = vec![barrier(1, BarrierSeverity::High), barrier(2, BarrierSeverity::Low)];
        assert_eq!(step_rating(&barriers), AccessibilityRating::Difficult);

        let barriers = vec![
            barrier(1, BarrierSeverity::Medium),
            barrier(2, BarrierSeverity::Critical),
        ];
        assert_eq!(step_rating(&barriers), AccessibilityRating::Inaccessible);
    }

    // -- generate_guide basics ---------------------------------------------

    #[test]
    fn empty_guide_has_default_score_and_no_steps() {
        let guide = generate_guide(1, &[], &HashMap::new(), None);
        assert_eq!(guide.overall_score, 50.0);
        assert!(guide.steps.is_empty());
        assert!(guide.critical_alerts.is_empty());
        assert_eq!(guide.summary, "This route consists of 0 steps. Accessibility score: 50/100.");
    }

    #[test]
    fn steps_are_dense_and_sequence_ordered() {
        // Input unsorted, sequence orders gappy.
        let images = vec![
            image(20, 10, Vec::new()),
            image(10, 5, Vec::new()),
        ];
        let guide = generate_guide(1, &images, &HashMap::new(), None);
        assert_eq!(guide.steps.len(), 2);
        assert_eq!(guide.steps[0].step_number, 1);
        assert_eq!(guide.steps[0].image_id, 10);
        assert_eq!(guide.steps[1].step_number, 2);
        assert_eq!(guide.steps[1].image_id, 20);
    }

    #[test]
    fn step_title_uses_space_label_or_location() {
        let images = vec![image(1, 0, Vec::new()), image(2, 1, Vec::new())];
        let mut annotations = HashMap::new();
        annotations.insert(
            1,
            ImageAnnotation {
                space_type: crate::annotation::SpaceType::Corridor,
                ..ImageAnnotation::default()
            },
        );

        let guide = generate_guide(1, &images, &annotations, None);
        assert_eq!(guide.steps[0].title, "Step 1: Corridor");
        assert_eq!(guide.steps[1].title, "Step 2: Location");
    }

    #[test]
    fn step_description_comes_from_annotation() {
        let images = vec![image(1, 0, Vec::new())];
        let mut annotations = HashMap::new();
        annotations.insert(
            1,
            ImageAnnotation {
                overall_description: "Wide corridor with handrails".to_string(),
                ..ImageAnnotation::default()
            },
        );

        let guide = generate_guide(1, &images, &annotations, None);
        assert_eq!(guide.steps[0].description, "Wide corridor with handrails");
    }

    #[test]
    fn step_image_url_points_at_file_endpoint() {
        let images = vec![image(77, 0, Vec::new())];
        let guide = generate_guide(42, &images, &HashMap::new(), None);
        assert_eq!(guide.steps[0].image_url, "/api/v1/scans/42/images/77/file");
    }

    // -- alerts and recommendations ----------------------------------------

    #[test]
    fn high_and_critical_barriers_produce_step_alerts() {
        let barriers = vec![
            barrier(1, BarrierSeverity::Low),
            barrier(2, BarrierSeverity::High),
            barrier(3, BarrierSeverity::Critical),
        ];
        let images = vec![image(1, 0, barriers)];
        let guide = generate_guide(1, &images, &HashMap::new(), None);

        let step = &guide.steps[0];
        assert_eq!(step.alerts, vec!["barrier 2".to_string(), "barrier 3".to_string()]);
    }

    #[test]
    fn recommendations_are_collected_from_barriers() {
        let mut with_tip = barrier(1, BarrierSeverity::Low);
        with_tip.recommendation = Some("use the side entrance".to_string());
        let images = vec![image(1, 0, vec![with_tip, barrier(2, BarrierSeverity::Low)])];

        let guide = generate_guide(1, &images, &HashMap::new(), None);
        assert_eq!(
            guide.steps[0].recommendations,
            vec!["use the side entrance".to_string()]
        );
    }

    #[test]
    fn critical_alerts_reference_step_numbers_in_order() {
        let first = image(1, 0, vec![barrier(1, BarrierSeverity::Critical)]);
        let second = image(2, 1, Vec::new());
        let third = image(3, 2, vec![barrier(2, BarrierSeverity::Critical)]);

        let guide = generate_guide(1, &[first, second, third], &HashMap::new(), None);
        assert_eq!(
            guide.critical_alerts,
            vec!["Step 1: barrier 1".to_string(), "Step 3: barrier 2".to_string()]
        );
    }

    // -- profile door checks -----------------------------------------------

    fn narrow_door(width: Option<f64>) -> GuideBarrier {
        GuideBarrier {
            id: 1,
            barrier_type: BarrierType::NarrowDoor,
            severity: BarrierSeverity::Medium,
            description: "narrow doorway".to_string(),
            recommendation: None,
            estimated_width_cm: width,
        }
    }

    #[test]
    fn narrow_door_below_profile_minimum_adds_one_alert() {
        let profile = builtin_profiles().remove(0); // min door width 75
        let images = vec![image(1, 0, vec![narrow_door(Some(70.0))])];

        let guide = generate_guide(1, &images, &HashMap::new(), Some(&profile));
        let door_alerts: Vec<_> = guide.steps[0]
            .alerts
            .iter()
            .filter(|a| a.contains("70") && a.contains("75"))
            .collect();
        assert_eq!(door_alerts.len(), 1);
        assert_eq!(door_alerts[0], "Door is 70cm - your wheelchair needs 75cm");
    }

    #[test]
    fn narrow_door_wide_enough_adds_no_alert() {
        let profile = builtin_profiles().remove(0);
        let images = vec![image(1, 0, vec![narrow_door(Some(80.0))])];
        let guide = generate_guide(1, &images, &HashMap::new(), Some(&profile));
        assert!(guide.steps[0].alerts.is_empty());
    }

    #[test]
    fn narrow_door_without_width_adds_no_alert() {
        let profile = builtin_profiles().remove(0);
        let images = vec![image(1, 0, vec![narrow_door(None)])];
        let guide = generate_guide(1, &images, &HashMap::new(), Some(&profile));
        assert!(guide.steps[0].alerts.is_empty());
    }

    #[test]
    fn narrow_door_without_profile_adds_no_alert() {
        let images = vec![image(1, 0, vec![narrow_door(Some(70.0))])];
        let guide = generate_guide(1, &images, &HashMap::new(), None);
        assert!(guide.steps[0].alerts.is_empty());
    }

    // -- overall score -----------------------------------------------------

    #[test]
    fn overall_score_averages_annotated_images() {
        let images = vec![image(1, 0, Vec::new()), image(2, 1, Vec::new())];
        let mut annotations = HashMap::new();
        annotations.insert(1, annotation_with_score(80.0));
        annotations.insert(2, annotation_with_score(40.0));
        assert_eq!(overall_score(&images, &annotations), 60.0);
    }

    #[test]
    fn overall_score_defaults_missing_annotations_to_fifty() {
        let images = vec![image(1, 0, Vec::new()), image(2, 1, Vec::new())];
        let mut annotations = HashMap::new();
        annotations.insert(1, annotation_with_score(100.0));
        assert_eq!(overall_score(&images, &annotations), 75.0);
    }

    #[test]
    fn overall_score_counts_failed_images_as_zero() {
        let images = vec![image(1, 0, Vec::new()), image(2, 1, Vec::new())];
        let mut annotations = HashMap::new();
        annotations.insert(1, annotation_with_score(100.0));
        annotations.insert(2, ImageAnnotation::failed("timeout"));
        assert_eq!(overall_score(&images, &annotations), 50.0);
    }

    // -- titles and summary ------------------------------------------------

    #[test]
    fn title_buckets_map_to_four_labels() {
        assert_eq!(title_for_score(85.0), "Navigation Guide - High Accessibility");
        assert_eq!(title_for_score(65.0), "Navigation Guide - Moderate Accessibility");
        assert_eq!(title_for_score(45.0), "Navigation Guide - Limited Accessibility");
        assert_eq!(title_for_score(25.0), "Navigation Guide - Restricted Accessibility");
    }

    #[test]
    fn title_boundaries_are_inclusive_of_higher_bucket() {
        assert_eq!(title_for_score(80.0), "Navigation Guide - High Accessibility");
        assert_eq!(title_for_score(60.0), "Navigation Guide - Moderate Accessibility");
        assert_eq!(title_for_score(40.0), "Navigation Guide - Limited Accessibility");
    }

    #[test]
    fn summary_includes_barrier_and_alert_fragments() {
        let images = vec![
            image(1, 0, vec![barrier(1, BarrierSeverity::Critical), barrier(2, BarrierSeverity::Low)]),
            image(2, 1, Vec::new()),
        ];
        let mut annotations = HashMap::new();
        annotations.insert(1, annotation_with_score(20.0));
        annotations.insert(2, annotation_with_score(40.0));

        let guide = generate_guide(1, &images, &annotations, None);
        assert_eq!(
            guide.summary,
            "This route consists of 2 steps. Accessibility score: 30/100. \
             2 accessibility barriers detected. ATTENTION: 1 critical alerts."
        );
    }

    #[test]
    fn summary_omits_zero_counts() {
        let images = vec![image(1, 0, Vec::new())];
        let mut annotations = HashMap::new();
        annotations.insert(1, annotation_with_score(90.0));

        let guide = generate_guide(1, &images, &annotations, None);
        assert_eq!(
            guide.summary,
            "This route consists of 1 steps. Accessibility score: 90/100."
        );
        assert_eq!(guide.title, "Navigation Guide - High Accessibility");
    }
}
