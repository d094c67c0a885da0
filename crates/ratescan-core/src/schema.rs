//! The fixed extraction schema the completion step must fill in.
//!
//! Kept permissive on purpose: unknown fields from the model are ignored and
//! most leaves are optional, since small local models frequently return
//! partial objects. Validation is just deserialization into these types.

use serde::{Deserialize, Serialize};

/// Top-level payload: one or more rate schedules found in an excerpt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionPayload {
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_name: String,
    pub schedule_code: Option<String>,
    pub effective_date: Option<String>,
    pub customer_class: Option<String>,
    pub eligibility: Eligibility,
    pub charges: Vec<Charge>,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eligibility {
    pub summary: String,
    #[serde(default)]
    pub rules: EligibilityRules,
    pub exclusions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EligibilityRules {
    pub demand_kw_max: Option<f64>,
    pub service_voltage: Option<String>,
    pub geography: Option<String>,
    pub metering: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    /// "customer" | "energy" | "demand" | "other"
    #[serde(rename = "type")]
    pub charge_type: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    /// "flat" | "tiered" | "tou" | "seasonal"
    pub structure: Option<String>,
    /// Free-shape tier detail; left as raw JSON since tier layouts vary widely.
    pub tiers: Option<Vec<serde_json::Value>>,
    pub notes: Option<String>,
}

/// Links one extracted field value back to the excerpt that supports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Field name or dot-path, e.g. "charges[0].value".
    pub field: String,
    /// 1-based page number taken from the excerpt's `--- PAGE n ---` markers.
    pub page: u32,
    /// Short verbatim supporting text.
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_with_missing_optionals() {
        let json = r#"{
            "schedules": [{
                "schedule_name": "Residential Service",
                "schedule_code": "RS",
                "effective_date": null,
                "customer_class": "residential",
                "eligibility": { "summary": "All residential customers." },
                "charges": [
                    { "type": "energy", "value": 0.102, "unit": "$/kWh", "structure": "flat" }
                ],
                "citations": [
                    { "field": "schedule_name", "page": 4, "snippet": "RATE SCHEDULE RS" }
                ]
            }]
        }"#;
        let payload: ExtractionPayload = serde_json::from_str(json).unwrap();
        let sched = &payload.schedules[0];
        assert_eq!(sched.schedule_code.as_deref(), Some("RS"));
        assert!(sched.eligibility.rules.demand_kw_max.is_none());
        assert_eq!(sched.charges[0].charge_type, "energy");
        assert_eq!(sched.citations[0].page, 4);
    }

    #[test]
    fn payload_ignores_unknown_fields() {
        let json = r#"{
            "schedules": [{
                "schedule_name": "GS",
                "eligibility": { "summary": "s", "confidence": 0.9 },
                "charges": [],
                "citations": [],
                "extra": true
            }]
        }"#;
        let payload: ExtractionPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.schedules[0].schedule_name, "GS");
    }
}
