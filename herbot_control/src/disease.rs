//! Disease-verdict policy.
//!
//! A pure function of the top label's text and two thresholds:
//!
//! 1. `confidence < min_confidence` → not diseased, "no clear detection".
//! 2. Healthy iff the label ends with "leaf" (case-insensitive) and contains
//!    no disease keyword. A keyword always wins over the "leaf" suffix.
//! 3. Diseased iff not healthy and `confidence >= threshold`.

use serde::Serialize;

/// Label substrings that mark a class as a disease.
pub const DISEASE_KEYWORDS: [&str; 9] = [
    "blight",
    "spot",
    "rust",
    "scab",
    "mildew",
    "virus",
    "mold",
    "bacterial",
    "spider",
];

/// Label used when there is no image or no disease classifier.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label used when the disease classifier call failed.
pub const ERROR_LABEL: &str = "Error";

/// Outcome of the disease check for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseVerdict {
    pub is_diseased: bool,
    pub label: String,
    pub confidence: f64,
    pub inference_ms: f64,
}

impl DiseaseVerdict {
    pub fn unknown() -> Self {
        Self::sentinel(UNKNOWN_LABEL)
    }

    pub fn error() -> Self {
        Self::sentinel(ERROR_LABEL)
    }

    fn sentinel(label: &str) -> Self {
        Self {
            is_diseased: false,
            label: label.to_string(),
            confidence: 0.0,
            inference_ms: 0.0,
        }
    }

    pub fn with_inference_ms(mut self, inference_ms: f64) -> Self {
        self.inference_ms = inference_ms;
        self
    }
}

/// Thresholds applied to the disease classifier's top label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseasePolicy {
    pub threshold: f64,
    pub min_confidence: f64,
}

impl Default for DiseasePolicy {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            min_confidence: 0.4,
        }
    }
}

impl DiseasePolicy {
    pub fn verdict(&self, label: &str, confidence: f64) -> DiseaseVerdict {
        classify_disease(label, confidence, self.threshold, self.min_confidence)
    }
}

/// `true` for labels such as "Apple leaf"; false as soon as any disease
/// keyword appears.
pub fn is_healthy_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    lower.ends_with("leaf") && !DISEASE_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn classify_disease(
    label: &str,
    confidence: f64,
    threshold: f64,
    min_confidence: f64,
) -> DiseaseVerdict {
    if confidence < min_confidence {
        return DiseaseVerdict {
            is_diseased: false,
            label: format!("No clear detection ({label})"),
            confidence,
            inference_ms: 0.0,
        };
    }

    DiseaseVerdict {
        is_diseased: !is_healthy_label(label) && confidence >= threshold,
        label: label.to_string(),
        confidence,
        inference_ms: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_confidence_is_no_clear_detection() {
        let v = classify_disease("Tomato Early Blight", 0.35, 0.6, 0.4);
        assert!(!v.is_diseased);
        assert_eq!(v.label, "No clear detection (Tomato Early Blight)");
        assert_eq!(v.confidence, 0.35);
    }

    #[test]
    fn healthy_leaf_is_not_diseased() {
        let v = classify_disease("Apple leaf", 0.95, 0.6, 0.4);
        assert!(!v.is_diseased);
        assert_eq!(v.label, "Apple leaf");
    }

    #[test]
    fn confident_disease_is_diseased() {
        let v = classify_disease("Tomato Early Blight", 0.75, 0.6, 0.4);
        assert!(v.is_diseased);
        assert_eq!(v.confidence, 0.75);
    }

    #[test]
    fn keyword_overrides_leaf_token() {
        let v = classify_disease("Grape Leaf Spot", 0.65, 0.6, 0.4);
        assert!(v.is_diseased);
        assert!(!is_healthy_label("Tomato leaf mold leaf"));
    }

    #[test]
    fn between_thresholds_is_not_diseased() {
        let v = classify_disease("Corn rust leaf", 0.5, 0.6, 0.4);
        assert!(!v.is_diseased);
        assert_eq!(v.label, "Corn rust leaf");
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(classify_disease("Squash Powdery mildew leaf", 0.6, 0.6, 0.4).is_diseased);
        assert!(!classify_disease("Squash Powdery mildew leaf", 0.4, 0.6, 0.4).is_diseased);
    }

    #[test]
    fn suffix_match_is_case_insensitive() {
        assert!(is_healthy_label("Blueberry LEAF"));
        assert!(!is_healthy_label("leaf of basil"));
    }

    #[test]
    fn unknown_label_is_not_healthy() {
        // no "leaf" suffix and no keyword: treated as diseased when confident
        assert!(DiseasePolicy::default().verdict("Basil", 0.9).is_diseased);
    }

    #[test]
    fn sentinels() {
        assert_eq!(DiseaseVerdict::unknown().label, UNKNOWN_LABEL);
        assert_eq!(DiseaseVerdict::error().label, ERROR_LABEL);
        assert!(!DiseaseVerdict::error().is_diseased);
    }
}
