//! Prompt text for the context core
//!
//! The system prompt embeds both JSON schemas so the model answers in the
//! shape [`MerchantContext`](super::model::MerchantContext) and
//! [`QueryAnswer`](super::model::QueryAnswer) deserialize from.

use serde_json::{Value, json};

/// Sentinel the routing model answers with when no merchant is recognizable
pub const UNKNOWN_MERCHANT: &str = "DESCONOCIDO";

/// Characters of raw text shown to the routing model
pub const ROUTING_SNIPPET_CHARS: usize = 1000;

/// User turn of the routing request
pub const ROUTING_USER_TURN: &str = "Identifica el merchant.";

/// Schema of the merchant context ("memoria viva")
pub fn context_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "merchant_name": {"type": "string", "description": "Nombre del merchant, e.g., 'Zoop'"},
            "lifecycle_stage": {"type": "string", "description": "Etapa: 'Lead', 'Negociación', 'Integración', 'Go-Live'"},
            "commercial_commitments": {"type": "string", "description": "Resumen de tasas, periodos de prueba o promesas de negocio."},
            "key_contacts": {
                "type": "object",
                "properties": {
                    "Ventas": {"type": "string"},
                    "Tech": {"type": "string"}
                }
            },
            "technical_restrictions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {"type": "string", "description": "Ej: 'Riesgo', 'Seguridad', 'Integración'"},
                        "detail": {"type": "string", "description": "Descripción de la restricción o límite."},
                        "source_reference": {"type": "string", "description": "Ej: 'Slack 2024-10-25'"}
                    }
                }
            },
            "geographies_mops": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "country": {"type": "string"},
                        "mops": {"type": "array", "items": {"type": "string"}},
                        "fraud_risk_level": {"type": "string"}
                    }
                }
            },
            "pending_tasks": {"type": "array", "items": {"type": "string"}}
        }
    })
}

/// Schema of the query mode answer
pub fn answer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "business_answer": {"type": "string", "description": "Respuesta concisa y profesional de negocio."},
            "visualization_filter": {
                "type": "object",
                "properties": {
                    "field": {"type": "string", "description": "Campo del JSON principal a filtrar (ej: 'technical_restrictions')"},
                    "value": {"type": "string", "description": "Valor a destacar (ej: 'Riesgo', 'Mexico')"}
                }
            }
        }
    })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// System prompt shared by the three modes
pub fn system_prompt() -> String {
    format!(
        r#"Eres el "Context Core", el agente de inteligencia de negocios del equipo comercial. Tu rol es transformar información dispersa en decisiones de negocio, actuando en uno de tres modos según la instrucción del usuario.

# MODO 1: CONDENSACIÓN DE DATOS (entrada: texto bruto o notas)
Extrae y estructura los datos. Responde SOLO con el objeto JSON del esquema de contexto.

# MODO 2: CAMPOS SALESFORCE (entrada: JSON de contexto)
Usa el contexto para redactar campos listos para copiar y pegar, en Markdown.

# MODO 3: CONSULTA Y FILTRO (entrada: pregunta de negocio y JSON de contexto)
Responde la pregunta y sugiere un filtro para el dashboard. Responde SOLO con el objeto JSON del esquema de respuesta.

---
ESQUEMA DE CONTEXTO (MODO 1):
{}

ESQUEMA DE RESPUESTA Y FILTRO (MODO 3):
{}
"#,
        pretty(&context_schema()),
        pretty(&answer_schema())
    )
}

/// System prompt of the routing request
pub fn routing_prompt(text: &str) -> String {
    let snippet: String = text.chars().take(ROUTING_SNIPPET_CHARS).collect();
    format!(
        r#"Eres un agente de routing. Analiza el siguiente fragmento e identifica SOLAMENTE el nombre del merchant al que se refiere.
Tu respuesta debe ser UN ÚNICO NOMBRE. Si no puedes identificarlo, responde '{UNKNOWN_MERCHANT}'.

FRAGMENTO: "{snippet}...""#
    )
}
