//! Prompt construction for the risk-analysis model call.
//!
//! `build_prompt` is a pure function of the validated input and the schema
//! variant: the same input always yields a byte-identical payload.

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{
    Choice, ProfileInput, SchemaVariant, VulnerabilityAnswers, VulnerabilityCategory,
};

/// Outgoing request description: instructions plus the reply schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPayload {
    pub variant: SchemaVariant,
    pub instructions: String,
    /// JSON-Schema style description of the object the model must return.
    pub schema: Value,
}

impl PromptPayload {
    /// Single user-role message sent to the model.
    pub fn user_message(&self) -> String {
        // Value's Display is compact JSON with a stable key order
        format!(
            "{}\n\nEsquema JSON que la respuesta debe cumplir exactamente:\n{}",
            self.instructions, self.schema
        )
    }
}

/// Builds the reply schema for a variant.
pub fn reply_schema(variant: SchemaVariant) -> Value {
    let mut required = vec!["monto", "mensaje", "fragilidad"];
    let mut properties = json!({
        "monto": {
            "type": "string",
            "description": "Monto en riesgo formateado, p. ej. \"$ 1.500.000\""
        },
        "mensaje": {
            "type": "string",
            "description": "Frase de impacto emocional/financiero"
        },
        "fragilidad": {
            "type": "integer",
            "minimum": 0,
            "maximum": 100
        },
        "tips": {
            "type": "array",
            "items": { "type": "string", "minLength": 1 }
        }
    });

    if variant.requires_numeric_loss() {
        required.push("monto_num");
        properties["monto_num"] = json!({
            "type": "number",
            "description": "El mismo monto en riesgo como número, sin símbolos"
        });
    }

    if variant.requires_preview() {
        required.push("preview");
        properties["preview"] = json!({
            "type": "string",
            "description": "Adelanto breve del informe completo"
        });
    }

    json!({
        "type": "object",
        "required": required,
        "properties": properties,
    })
}

fn example_shape(variant: SchemaVariant) -> String {
    let mut lines = vec![
        "  \"monto\": \"$ [CALCULAR MONTO REALISTA BASADO EN FACTURACION]\"".to_string(),
    ];
    if variant.requires_numeric_loss() {
        lines.push("  \"monto_num\": [MISMO MONTO COMO NUMERO]".to_string());
    }
    lines.push("  \"mensaje\": \"[FRASE DE IMPACTO EMOCIONAL/FINANCIERO]\"".to_string());
    lines.push("  \"fragilidad\": [NUMERO 0-100]".to_string());
    lines.push("  \"tips\": [\"Tip 1 corto\", \"Tip 2 corto\", \"Tip 3 corto\"]".to_string());
    if variant.requires_preview() {
        lines.push("  \"preview\": \"[ADELANTO DEL INFORME EN UNA FRASE]\"".to_string());
    }
    format!("{{\n{}\n}}", lines.join(",\n"))
}

/// Renders the request payload for one submission.
pub fn build_prompt(
    profile: &ProfileInput,
    answers: &VulnerabilityAnswers,
    variant: SchemaVariant,
) -> PromptPayload {
    let mut instructions = String::from("Actúa como DLI-AI, auditor financiero de riesgo IT.\n");

    instructions.push_str(&format!(
        "Calcula riesgo para: {}, Empleados: {}, Facturación mensual: {} {}.\n",
        profile.industry.label(),
        profile.employees,
        profile.monthly_revenue,
        profile.currency.label()
    ));

    if !profile.company_name.is_empty() {
        instructions.push_str(&format!("Empresa: {}.\n", profile.company_name));
    }

    instructions.push_str("Vulnerabilidades:\n");
    for category in VulnerabilityCategory::ALL {
        let tier = answers.answer(category);
        instructions.push_str(&format!(
            "- {} {} (riesgo {})\n",
            category.question(),
            category.answer_label(tier),
            tier.code()
        ));
    }

    instructions.push_str("\nResponde SOLO un JSON válido con esta estructura exacta:\n");
    instructions.push_str(&example_shape(variant));
    instructions.push_str("\nSin texto adicional fuera del JSON.");

    PromptPayload {
        variant,
        instructions,
        schema: reply_schema(variant),
    }
}
