//! Provider data structure passed to resources and data sources

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use tfplug::context::Context;
use tfplug::types::Diagnostic;

use crate::api::{ApiError, Client};

#[derive(Clone)]
pub struct MerakiProviderData {
    pub client: Arc<Client>,
}

impl MerakiProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Recover the provider data handed to a resource or data source `configure`
    pub fn from_any(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<Self, Diagnostic> {
        let data = provider_data.ok_or_else(|| {
            Diagnostic::error(
                "No provider data",
                "No provider data was provided; configure the meraki provider first",
            )
        })?;

        data.downcast_ref::<MerakiProviderData>()
            .cloned()
            .ok_or_else(|| {
                Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract MerakiProviderData from provider data",
                )
            })
    }
}

pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

/// `operation` is the Dashboard operation id, e.g. `getNetwork`
pub(crate) fn api_failure(operation: &str, err: &ApiError) -> Diagnostic {
    Diagnostic::error(
        format!("Failure when executing {}", operation),
        format!("API error: {}", err),
    )
}

pub(crate) fn cancelled(ctx: &Context) -> Diagnostic {
    Diagnostic::error(
        "Operation cancelled",
        format!(
            "{} was cancelled or ran past its deadline before the Dashboard answered",
            ctx.operation()
        ),
    )
}

/// Runs one resource or data source step under the caller's context
pub(crate) async fn within<T>(
    ctx: &Context,
    work: impl Future<Output = Result<T, Diagnostic>>,
) -> Result<T, Diagnostic> {
    ctx.run(work).await.unwrap_or_else(|| {
        tracing::warn!("{} cancelled", ctx.operation());
        Err(cancelled(ctx))
    })
}
