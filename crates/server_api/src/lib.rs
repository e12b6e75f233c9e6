use shared::{
    error::{ApiError, ErrorCode},
    protocol::OptionList,
};
use storage::Storage;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Resolves the dataset options an API key may select.
///
/// The key is matched exactly as sent; surrounding whitespace is only used to
/// decide whether a key was supplied at all.
pub async fn list_options(ctx: &ApiContext, api_key: &str) -> Result<OptionList, ApiError> {
    authorize(ctx, api_key).await?;

    let options = ctx
        .storage
        .datasets_for_key(api_key)
        .await
        .map_err(internal)?;
    debug!(count = options.len(), "options: resolved");
    Ok(options)
}

/// Checks a multi-select submission against the key's grants.
///
/// An empty selection means every granted dataset. The result keeps the
/// granted name order and drops repeated names.
pub async fn select_datasets(
    ctx: &ApiContext,
    api_key: &str,
    requested: &[String],
) -> Result<OptionList, ApiError> {
    let granted = list_options(ctx, api_key).await?;
    if requested.is_empty() {
        return Ok(granted);
    }

    if let Some(missing) = requested.iter().find(|name| !granted.contains(name)) {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("dataset '{missing}' is not available for this key"),
        ));
    }

    Ok(granted
        .into_iter()
        .filter(|name| requested.contains(name))
        .collect())
}

async fn authorize(ctx: &ApiContext, api_key: &str) -> Result<(), ApiError> {
    if api_key.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Unauthorized, "missing api key"));
    }

    let record = ctx
        .storage
        .api_key_status(api_key)
        .await
        .map_err(internal)?;
    let Some(record) = record else {
        warn!("options: rejected unknown api key");
        return Err(ApiError::new(ErrorCode::Forbidden, "invalid api key"));
    };
    if record.revoked {
        warn!(key_id = record.id.0, "options: rejected revoked api key");
        return Err(ApiError::new(ErrorCode::Forbidden, "api key revoked"));
    }
    Ok(())
}

pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage.health_check().await.map_err(internal)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
