//! Fixed response texts owned by the guard layer.

/// The medical disclaimer attached to every answer.
pub const DISCLAIMER: &str = "\n\n---\n\
⚠️ **Medical Disclaimer:** This response is for informational purposes only \
and does not constitute professional medical advice, diagnosis, or treatment. \
Always consult a licensed physician or qualified healthcare provider for any \
medical concerns.";

/// The fixed crisis-resources response returned when a crisis indicator
/// short-circuits the pipeline.
pub const CRISIS_RESPONSE: &str = "I'm not able to provide information that could cause harm. \
If you or someone you know is in crisis, please contact the \
**National Suicide Prevention Lifeline** at **988** (US), \
or your local emergency services immediately.";

/// The generic refusal substituted when the post-check discards a generated
/// answer.
pub const REFUSAL: &str = "I can't help with that request. Please consult a licensed \
healthcare professional for guidance.";
