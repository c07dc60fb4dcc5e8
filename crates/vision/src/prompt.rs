//! The fixed analysis prompt sent with every image.
//!
//! The enum strings and field names in the prompt are the wire contract:
//! they must stay in sync with the `parse_lossy` constructors in
//! `wheelway-core` and with the lenient decoder in [`crate::parser`].

/// Instruction text for the analyzer, sent as the text part of the user
/// message ahead of the image.
pub const ANALYSIS_PROMPT: &str = "\
Analyze this image for wheelchair accessibility. Identify any barriers or obstacles that could affect wheelchair users.

For each barrier found, provide:
1. barrier_type: One of: step, stairs, narrow_door, narrow_passage, steep_ramp, uneven_surface, obstacle, heavy_door, revolving_door, threshold, gravel, grass, slope, other
2. severity: One of: low (manageable with care), medium (difficult, may need help), high (very difficult, needs alternative), critical (impassable)
3. description: Brief description of the barrier
4. estimated_dimensions: If possible, estimate width/height/depth in centimeters
5. recommendation: Suggestion for navigating or avoiding the barrier
6. confidence: Your confidence level (0.0-1.0) in this assessment
7. bbox: If you can identify the location, provide normalized coordinates (0-1) as {x, y, width, height}

Also analyze:
- Space type (entrance, corridor, room, stairway, elevator, bathroom, outdoor, parking, other)
- Overall accessibility features (ramps, handrails, elevators, lighting quality, floor type)

Respond ONLY with valid JSON in this format:
{
    \"space_type\": \"corridor\",
    \"features\": {
        \"has_ramp\": false,
        \"has_handrails\": true,
        \"has_elevator\": false,
        \"lighting\": \"good\",
        \"floor_type\": \"tile\"
    },
    \"barriers\": [
        {
            \"barrier_type\": \"narrow_door\",
            \"severity\": \"medium\",
            \"description\": \"Door appears to be approximately 70cm wide\",
            \"estimated_width_cm\": 70,
            \"estimated_height_cm\": null,
            \"estimated_depth_cm\": null,
            \"recommendation\": \"May be tight for standard wheelchairs. Consider using side approach.\",
            \"confidence\": 0.8,
            \"bbox\": {\"x\": 0.3, \"y\": 0.2, \"width\": 0.15, \"height\": 0.6}
        }
    ],
    \"overall_description\": \"Indoor corridor with moderate accessibility. Main concern is door width.\",
    \"accessibility_score\": 65
}

If no barriers are found, return an empty barriers array and a high accessibility_score (90-100).";
