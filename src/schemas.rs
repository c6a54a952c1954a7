//! JSON schemas handed to the vendors for structured (object) generation.
//!
//! Every object is closed (`additionalProperties: false`) with all properties
//! required so that the same schema is accepted by both vendors' strict modes.

use serde_json::{Value, json};

/// A named schema for one structured call.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
}

fn string_list() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

fn closed_object(properties: Value) -> Value {
    let required: Vec<Value> = properties
        .as_object()
        .map(|m| m.keys().map(|k| Value::String(k.clone())).collect())
        .unwrap_or_default();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

pub fn pros_cons_schema() -> ObjectSchema {
    ObjectSchema {
        name: "pros_cons",
        description: "Key pros and cons of the startup idea",
        schema: closed_object(json!({
            "pros": string_list(),
            "cons": string_list()
        })),
    }
}

pub fn swot_schema() -> ObjectSchema {
    ObjectSchema {
        name: "swot_analysis",
        description: "SWOT analysis of the startup idea",
        schema: closed_object(json!({
            "strengths": string_list(),
            "weaknesses": string_list(),
            "opportunities": string_list(),
            "threats": string_list()
        })),
    }
}

pub fn bcg_schema() -> ObjectSchema {
    ObjectSchema {
        name: "bcg_matrix",
        description: "BCG matrix classification of the startup idea",
        schema: closed_object(json!({
            "category": {"type": "string", "enum": ["star", "cash-cow", "question-mark", "dog"]},
            "marketGrowth": {"type": "number"},
            "marketShare": {"type": "number"},
            "reasoning": {"type": "string"}
        })),
    }
}

pub fn business_model_schema() -> ObjectSchema {
    ObjectSchema {
        name: "business_model_canvas",
        description: "Business Model Canvas for the startup idea",
        schema: closed_object(json!({
            "keyPartners": string_list(),
            "keyActivities": string_list(),
            "keyResources": string_list(),
            "valuePropositions": string_list(),
            "customerRelationships": string_list(),
            "channels": string_list(),
            "customerSegments": string_list(),
            "costStructure": string_list(),
            "revenueStreams": string_list()
        })),
    }
}

pub fn metrics_schema() -> ObjectSchema {
    let score = json!({"type": "number", "minimum": 1, "maximum": 10});
    ObjectSchema {
        name: "idea_metrics",
        description: "Desirability, viability, feasibility and sustainability scores (1-10)",
        schema: closed_object(json!({
            "desirability": score,
            "viability": score,
            "feasibility": score,
            "sustainability": score
        })),
    }
}

pub fn recommendations_schema() -> ObjectSchema {
    ObjectSchema {
        name: "recommendations",
        description: "Naming, branding and next-step recommendations",
        schema: closed_object(json!({
            "startupNames": string_list(),
            "brandWheel": closed_object(json!({
                "mission": {"type": "string"},
                "vision": {"type": "string"},
                "values": string_list(),
                "personality": string_list()
            })),
            "elevatorPitch": {"type": "string"},
            "actionPlan": string_list(),
            "improvements": string_list()
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_model_requires_all_nine_lists() {
        let schema = business_model_schema().schema;
        assert_eq!(schema["required"].as_array().map(|r| r.len()), Some(9));
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn bcg_category_is_closed_enum() {
        let schema = bcg_schema().schema;
        let variants = schema["properties"]["category"]["enum"]
            .as_array()
            .expect("enum array");
        assert_eq!(variants.len(), 4);
        assert!(variants.contains(&json!("cash-cow")));
    }

    #[test]
    fn nested_brand_wheel_is_closed() {
        let schema = recommendations_schema().schema;
        let wheel = &schema["properties"]["brandWheel"];
        assert_eq!(wheel["required"].as_array().map(|r| r.len()), Some(4));
    }
}
