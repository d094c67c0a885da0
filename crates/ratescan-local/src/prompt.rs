//! Extraction prompt construction.
//!
//! Small local models need the output contract spelled out aggressively:
//! the schema shape is inlined as JSON, and "no code fences" is stated
//! explicitly because many models default to wrapping output in ```json.

/// Build the single-shot extraction prompt for one assembled excerpt.
pub fn build_prompt(excerpt: &str) -> String {
    log::debug!("building extraction prompt ({} chars)", excerpt.len());

    let schema_hint = serde_json::json!({
        "schedules": [
            {
                "schedule_name": "string",
                "schedule_code": "string|null",
                "effective_date": "string|null",
                "customer_class": "string|null",
                "eligibility": {
                    "summary": "string",
                    "rules": {
                        "demand_kw_max": "number|null",
                        "service_voltage": "string|null",
                        "geography": "string|null",
                        "metering": "string|null",
                    },
                    "exclusions": "string|null",
                },
                "charges": [
                    {
                        "type": "customer|energy|demand|other",
                        "value": "number|null",
                        "unit": "string|null",
                        "structure": "flat|tiered|tou|seasonal|null",
                        "tiers": "array|null",
                        "notes": "string|null",
                    }
                ],
                "citations": [
                    {
                        "field": "schedule_name",
                        "page": 1,
                        "snippet": "verbatim supporting text",
                    }
                ],
            }
        ]
    });
    let schema_hint =
        serde_json::to_string_pretty(&schema_hint).unwrap_or_else(|_| schema_hint.to_string());

    format!(
        r#"You are an information extraction engine. Extract ONE OR MORE utility rate schedules from the tariff excerpt.

OUTPUT REQUIREMENTS (must follow exactly):
- Output MUST be a single JSON object, and MUST start with '{{' and end with '}}'.
- Do NOT output markdown. Do NOT wrap in ``` or ```json. Do NOT include explanations.
- The JSON MUST match this schema shape (keys, nesting, arrays):
{schema_hint}

CITATION RULES:
- Every non-null field must be supported by at least one citation in "citations".
- Citation objects:
  - field: the exact field name or dot-path (examples: "schedule_name", "eligibility.summary", "charges[0].value")
  - page: 1-based page number from the excerpt markers (e.g., "--- PAGE 7 ---" means page=7)
  - snippet: a short verbatim excerpt that supports the value
- If you are not confident, use null and do NOT cite.

CHARGE RULES:
- Include customer charge, energy charge, and demand charge if present.
- If charges are tiered or TOU, set structure accordingly and put details in "tiers" (can be a list of objects).
- If you cannot reliably structure tiers, set tiers=null and include a short description in notes.

TARIFF EXCERPT:
<<<BEGIN EXCERPT>>>
{excerpt}
<<<END EXCERPT>>>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_excerpt_between_sentinels() {
        let p = build_prompt("--- PAGE 4 ---\nRATE SCHEDULE RS");
        let begin = p.find("<<<BEGIN EXCERPT>>>").unwrap();
        let end = p.find("<<<END EXCERPT>>>").unwrap();
        assert!(begin < end);
        assert!(p[begin..end].contains("--- PAGE 4 ---"));
    }

    #[test]
    fn prompt_states_the_output_contract() {
        let p = build_prompt("x");
        assert!(p.contains("single JSON object"));
        assert!(p.contains("schedule_name"));
        assert!(p.contains("1-based page number"));
    }
}
