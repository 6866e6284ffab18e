//! End-to-end processing of one incoming document
//!
//! route → load → condense → save → CRM fields → optional query

use super::ContextError;
use super::agent::ContextCore;
use super::model::{MerchantContext, QueryAnswer};
use super::store::ContextStore;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// What one pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub merchant: String,
    pub context: MerchantContext,
    pub saved_to: Option<PathBuf>,
    pub salesforce_fields: String,
    pub answer: Option<QueryAnswer>,
}

/// Merge `text` into the stored context of the merchant it mentions
///
/// Results are written to `out` as they become available.
///
/// # Errors
///
/// Returns [`ContextError::UnknownMerchant`] when routing finds no merchant,
/// and propagates any mode, store, or output failure.
pub async fn run_pipeline<O: Write + ?Sized>(
    core: &ContextCore,
    store: &ContextStore,
    text: &str,
    question: Option<&str>,
    out: &mut O,
) -> Result<PipelineReport, ContextError> {
    let merchant = core
        .identify_merchant(text)
        .await?
        .ok_or(ContextError::UnknownMerchant)?;
    writeln!(out, "Merchant: {merchant}")?;

    let previous = store.load(&merchant);
    info!(
        merchant = %merchant,
        stage = %previous.lifecycle_stage,
        "Loaded previous merchant context"
    );

    let consolidated_input = format!(
        "CONTEXTO ANTERIOR DEL MERCHANT {merchant}: {}\nNUEVO TEXTO DE ARCHIVO: {text}",
        serde_json::to_string(&previous)?
    );
    let mut context = core.condense(&consolidated_input).await?;
    if context.merchant_name.trim().is_empty() {
        context.merchant_name = merchant.clone();
    }
    info!(merchant = %merchant, stage = %context.lifecycle_stage, "Context consolidated");

    let saved_to = store.save(&context)?;
    if let Some(path) = &saved_to {
        writeln!(out, "Context saved to {}", path.display())?;
    }

    let salesforce_fields = core.salesforce_fields(&context).await?;
    writeln!(out, "\n{salesforce_fields}")?;

    let answer = match question {
        Some(question) => {
            let answer = core.query(question, &context).await?;
            writeln!(out, "\n{}", serde_json::to_string_pretty(&answer)?)?;
            Some(answer)
        }
        None => None,
    };

    Ok(PipelineReport {
        merchant,
        context,
        saved_to,
        salesforce_fields,
        answer,
    })
}
