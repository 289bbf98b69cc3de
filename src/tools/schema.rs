// Store-backed conversion of a whole schema (convert_schema, `local` command).

use crate::error::ConversionError;
use crate::store::{ResourceStore, StoreError};
use crate::tools::convert::convert_batch;
use crate::types::{ConversionResult, ConversionSummary, SchemaVersion, DICTIONARY_KIND};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Outcome of a local schema conversion. `target_scope` is only set when
/// something was written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConversion {
    pub source_scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_scope: Option<String>,
    pub written_resources: usize,
    pub summary: ConversionSummary,
}

/// Locks `scope`, reads its components and relations and converts them.
pub fn convert_scope(
    store: &impl ResourceStore,
    scope: &str,
    current: SchemaVersion,
    target: SchemaVersion,
) -> Result<ConversionResult, SchemaError> {
    let _lock = store.lock(scope)?;
    convert_locked(store, scope, current, target)
}

fn convert_locked(
    store: &impl ResourceStore,
    scope: &str,
    current: SchemaVersion,
    target: SchemaVersion,
) -> Result<ConversionResult, SchemaError> {
    let mut documents = store.list_components(scope)?;
    documents.extend(store.list_relations(scope)?);
    tracing::info!(scope, resources = documents.len(), "loaded schema");
    Ok(convert_batch(documents, current, target)?)
}

/// Converts `scope` into a sibling scope named `<scope><suffix>`.
///
/// All or nothing: when any resource fails, the errors are logged and returned
/// in the summary and no file is written. On success every converted resource
/// is written together with the untouched dictionaries of the source scope.
pub fn convert_local_schema(
    store: &impl ResourceStore,
    scope: &str,
    suffix: &str,
    current: SchemaVersion,
    target: SchemaVersion,
) -> Result<LocalConversion, SchemaError> {
    let _source_lock = store.lock(scope)?;
    let result = convert_locked(store, scope, current, target)?;

    let mut outcome = LocalConversion {
        source_scope: scope.to_string(),
        target_scope: None,
        written_resources: 0,
        summary: result.summary,
    };
    if outcome.summary.has_errors() {
        tracing::error!(scope, "schema conversion failed, nothing written");
        for e in &outcome.summary.error_messages {
            tracing::error!(scope, resource = %e.resource_name, "{}", e.error);
        }
        return Ok(outcome);
    }

    let dictionaries = store.list_kind(scope, DICTIONARY_KIND)?;
    let target_scope = format!("{}{}", scope, suffix);
    let _target_lock = store.lock(&target_scope)?;
    for doc in result.documents.iter().chain(dictionaries.iter()) {
        store.write(&target_scope, doc)?;
        outcome.written_resources += 1;
    }
    tracing::info!(
        scope,
        target = %target_scope,
        written = outcome.written_resources,
        "schema conversion saved"
    );
    outcome.target_scope = Some(target_scope);
    Ok(outcome)
}
