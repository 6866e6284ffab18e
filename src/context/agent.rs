//! Context core agent
//!
//! Runs the three business modes and merchant routing on top of any
//! [`Provider`].

use super::model::{MerchantContext, QueryAnswer};
use super::prompts::{self, ROUTING_USER_TURN, UNKNOWN_MERCHANT};
use super::ContextError;
use crate::core::config::Config;
use crate::core::invoker::{InvokeError, build_provider, complete};
use crate::core::provider::Provider;
use crate::models::openai::{OpenAIChatCompletionRequest, OpenAIMessage, OpenAIResponseFormat};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Operating mode of the context core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreMode {
    /// Extract a structured context from raw text
    Condense,
    /// Write copy-paste CRM fields from a context
    Salesforce,
    /// Answer a question about a context and suggest a dashboard filter
    Query,
}

impl CoreMode {
    pub fn response_format(self) -> OpenAIResponseFormat {
        match self {
            CoreMode::Condense | CoreMode::Query => OpenAIResponseFormat::json_object(),
            CoreMode::Salesforce => OpenAIResponseFormat::text(),
        }
    }

    fn number(self) -> u8 {
        match self {
            CoreMode::Condense => 1,
            CoreMode::Salesforce => 2,
            CoreMode::Query => 3,
        }
    }
}

impl fmt::Display for CoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoreMode::Condense => "condense",
            CoreMode::Salesforce => "salesforce",
            CoreMode::Query => "query",
        };
        write!(f, "{name}")
    }
}

pub struct ContextCore {
    provider: Arc<dyn Provider>,
    model: String,
    routing_model: String,
}

impl ContextCore {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        routing_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            routing_model: routing_model.into(),
        }
    }

    /// # Errors
    ///
    /// Fails when no credential is configured or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ContextError> {
        let provider = build_provider(config)?;
        Ok(Self::new(
            provider,
            &config.context_model,
            &config.routing_model,
        ))
    }

    /// Mode 1: extract a merchant context from raw text
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the answer is not a JSON context.
    pub async fn condense(&self, input: &str) -> Result<MerchantContext, ContextError> {
        let user_prompt = format!(
            "Activa el MODO {}. Extrae y estructura el siguiente texto de comunicación de un merchant. Devuelve SOLAMENTE el JSON. TEXTO: {input}",
            CoreMode::Condense.number()
        );
        self.run_json(CoreMode::Condense, user_prompt).await
    }

    /// Mode 2: write CRM fields from `context`
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ContextRequired`] for an empty context.
    pub async fn salesforce_fields(&self, context: &MerchantContext) -> Result<String, ContextError> {
        let context_json = Self::require(CoreMode::Salesforce, context)?;
        let user_prompt = format!(
            "Activa el MODO {}. Genera los campos de Salesforce listos para copiar y pegar, basándote SÓLO en el JSON de contexto adjunto.\n\nJSON DE CONTEXTO: {context_json}",
            CoreMode::Salesforce.number()
        );
        self.run(CoreMode::Salesforce, user_prompt).await
    }

    /// Mode 3: answer `question` about `context`
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ContextRequired`] for an empty context, or a
    /// JSON error if the answer does not parse.
    pub async fn query(
        &self,
        question: &str,
        context: &MerchantContext,
    ) -> Result<QueryAnswer, ContextError> {
        let context_json = Self::require(CoreMode::Query, context)?;
        let user_prompt = format!(
            "Activa el MODO {}. Responde a la pregunta y genera el filtro JSON para el dashboard.\nPREGUNTA: {question}\n\nJSON DE CONTEXTO: {context_json}",
            CoreMode::Query.number()
        );
        self.run_json(CoreMode::Query, user_prompt).await
    }

    /// Name the merchant `text` is about, if the model can tell
    ///
    /// # Errors
    ///
    /// Fails if the routing call fails.
    pub async fn identify_merchant(&self, text: &str) -> Result<Option<String>, ContextError> {
        let request = OpenAIChatCompletionRequest::new(
            &self.routing_model,
            vec![
                OpenAIMessage::system(prompts::routing_prompt(text)),
                OpenAIMessage::user(ROUTING_USER_TURN),
            ],
        )
        .map_err(InvokeError::from)?
        .with_temperature(0.0);

        let answer = complete(self.provider.as_ref(), &request).await?;
        let name = answer.trim().trim_matches(&['"', '\'', '.'][..]);
        if name.is_empty() || name.eq_ignore_ascii_case(UNKNOWN_MERCHANT) {
            debug!("Routing could not identify a merchant");
            return Ok(None);
        }

        info!(merchant = name, "Routed text to merchant");
        Ok(Some(name.to_string()))
    }

    fn require(mode: CoreMode, context: &MerchantContext) -> Result<String, ContextError> {
        if context.is_empty() {
            return Err(ContextError::ContextRequired(mode));
        }
        Ok(serde_json::to_string_pretty(context)?)
    }

    async fn run(&self, mode: CoreMode, user_prompt: String) -> Result<String, ContextError> {
        let request = OpenAIChatCompletionRequest::new(
            &self.model,
            vec![
                OpenAIMessage::system(prompts::system_prompt()),
                OpenAIMessage::user(user_prompt),
            ],
        )
        .map_err(InvokeError::from)?
        .with_response_format(mode.response_format());

        debug!(%mode, "Running context core mode");
        Ok(complete(self.provider.as_ref(), &request).await?)
    }

    async fn run_json<T: DeserializeOwned>(
        &self,
        mode: CoreMode,
        user_prompt: String,
    ) -> Result<T, ContextError> {
        let raw = self.run(mode, user_prompt).await?;
        serde_json::from_str(&raw).map_err(|source| ContextError::InvalidJson { mode, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::fake::{FakeProvider, FakeReply};
    use crate::models::openai::Role;

    fn context_core(replies: Vec<FakeReply>) -> (Arc<FakeProvider>, ContextCore) {
        let provider = Arc::new(FakeProvider::new(replies));
        let core = ContextCore::new(provider.clone(), "gpt-4-turbo", "gpt-4o-mini");
        (provider, core)
    }

    fn zoop() -> MerchantContext {
        MerchantContext::base("Zoop", "Negociación")
    }

    #[tokio::test]
    async fn test_condense_parses_context() {
        let (provider, core) = context_core(vec![FakeReply::content(
            r#"{"merchant_name": "Zoop", "lifecycle_stage": "Negociación", "pending_tasks": ["Confirmar PSE"]}"#,
        )]);

        let context = core.condense("La cuenta Zoop está en Negociación.").await.unwrap();
        assert_eq!(context.merchant_name, "Zoop");
        assert_eq!(context.pending_tasks, vec!["Confirmar PSE".to_string()]);

        let request = &provider.requests()[0].1;
        assert_eq!(request.model, "gpt-4-turbo");
        assert_eq!(request.response_format, Some(OpenAIResponseFormat::json_object()));
        assert_eq!(request.messages()[0].role, Role::System);
        let user = request.messages()[1].content.as_deref().unwrap();
        assert!(user.starts_with("Activa el MODO 1."));
        assert!(user.ends_with("La cuenta Zoop está en Negociación."));
    }

    #[tokio::test]
    async fn test_condense_rejects_non_json() {
        let (_, core) = context_core(vec![FakeReply::content("Claro, aquí tienes el resumen")]);
        let err = core.condense("texto").await.unwrap_err();
        assert!(matches!(
            err,
            ContextError::InvalidJson { mode: CoreMode::Condense, .. }
        ));
    }

    #[tokio::test]
    async fn test_condense_accepts_null_fields() {
        let (_, core) = context_core(vec![FakeReply::content(
            r#"{"merchant_name": "Zoop", "lifecycle_stage": "Negociación", "key_contacts": {"Ventas": "Maria@zoop.com", "Tech": null}, "commercial_commitments": null}"#,
        )]);

        let context = core.condense("La cuenta Zoop está en Negociación.").await.unwrap();
        assert_eq!(context.merchant_name, "Zoop");
        assert!(context.commercial_commitments.is_empty());
        assert_eq!(context.key_contacts.len(), 1);
        assert_eq!(context.key_contacts["Ventas"], "Maria@zoop.com");
    }

    #[tokio::test]
    async fn test_salesforce_requires_context() {
        let (provider, core) = context_core(vec![FakeReply::content("unused")]);
        let err = core
            .salesforce_fields(&MerchantContext::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContextError::ContextRequired(CoreMode::Salesforce)
        ));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_salesforce_returns_text() {
        let (provider, core) = context_core(vec![FakeReply::content("**Etapa:** Negociación")]);
        let fields = core.salesforce_fields(&zoop()).await.unwrap();
        assert_eq!(fields, "**Etapa:** Negociación");

        let request = &provider.requests()[0].1;
        assert_eq!(request.response_format, Some(OpenAIResponseFormat::text()));
        let user = request.messages()[1].content.as_deref().unwrap();
        assert!(user.contains("\"merchant_name\": \"Zoop\""));
    }

    #[tokio::test]
    async fn test_query_parses_answer() {
        let (_, core) = context_core(vec![FakeReply::content(
            r#"{"business_answer": "Maria@zoop.com; Colombia", "visualization_filter": {"field": "technical_restrictions", "value": "Colombia"}}"#,
        )]);
        let answer = core.query("¿Dónde aplica el límite?", &zoop()).await.unwrap();
        assert_eq!(answer.business_answer, "Maria@zoop.com; Colombia");
        assert_eq!(answer.visualization_filter.unwrap().value, "Colombia");
    }

    #[tokio::test]
    async fn test_query_requires_context() {
        let (_, core) = context_core(vec![FakeReply::content("{}")]);
        let err = core
            .query("¿?", &MerchantContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::ContextRequired(CoreMode::Query)));
    }

    #[tokio::test]
    async fn test_identify_merchant() {
        let (provider, core) = context_core(vec![FakeReply::content("  Zoop.\n")]);
        let merchant = core.identify_merchant("La cuenta Zoop...").await.unwrap();
        assert_eq!(merchant.as_deref(), Some("Zoop"));

        let request = &provider.requests()[0].1;
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.messages()[1].content.as_deref(), Some(ROUTING_USER_TURN));
    }

    #[tokio::test]
    async fn test_identify_unknown_merchant() {
        let (_, core) = context_core(vec![FakeReply::content("DESCONOCIDO")]);
        assert_eq!(core.identify_merchant("sin nombre").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_identify_merchant_failure_propagates() {
        let (_, core) = context_core(vec![FakeReply::NetworkError("timeout".into())]);
        assert!(matches!(
            core.identify_merchant("texto").await.unwrap_err(),
            ContextError::Invoke(_)
        ));
    }
}
