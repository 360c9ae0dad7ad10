//! Runs every selected publisher of a [`PublishConfig`].

use outbound_config::{PublishConfig, PublisherConfig};
use outbound_transfer::BuildContext;
use tracing::{error, info};

use crate::error::PublishError;
use crate::host::HostRegistry;
use crate::publisher::RetryingPublisher;
use crate::selector::PublisherSelector;

/// Result of a publish run, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PublishOutcome {
    Success,
    Unstable,
    Failure,
}

impl PublishOutcome {
    /// The worse of the two.
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Publishes with every selected publisher in configured order.
///
/// Errors map to [`PublishOutcome::Failure`] when `fail_on_error` is set and
/// to [`PublishOutcome::Unstable`] otherwise.
pub async fn run(
    config: &PublishConfig,
    registry: &dyn HostRegistry,
    ctx: &BuildContext,
) -> PublishOutcome {
    let on_error = if config.fail_on_error {
        PublishOutcome::Failure
    } else {
        PublishOutcome::Unstable
    };

    let selector = match config
        .validate()
        .map_err(PublishError::from)
        .and_then(|()| PublisherSelector::from_config(config.param_publish.as_ref(), ctx))
    {
        Ok(selector) => selector,
        Err(e) => {
            error!(error = %e, "publish run not started");
            ctx.println(&e.to_string());
            return on_error;
        }
    };

    let mut outcome = PublishOutcome::Success;
    for publisher in &config.publishers {
        let mut publisher_ctx = ctx.clone();
        publisher_ctx.verbose = publisher.verbose;
        if !selector.selected(publisher, &publisher_ctx) {
            continue;
        }

        if let Err(e) = publish_one(publisher, registry, &publisher_ctx).await {
            error!(config = %publisher.config_name, error = %e, "publisher failed");
            publisher_ctx.println(&format!("ERROR: {e}"));
            if !config.continue_on_error {
                return on_error;
            }
            outcome = outcome.combine(on_error);
        }
    }

    info!(?outcome, "publish run finished");
    outcome
}

async fn publish_one(
    publisher: &PublisherConfig,
    registry: &dyn HostRegistry,
    ctx: &BuildContext,
) -> Result<(), PublishError> {
    let factory = registry
        .factory(&publisher.config_name)
        .ok_or_else(|| PublishError::UnknownHost(publisher.config_name.clone()))?;

    match hostname::get().ok().and_then(|h| h.into_string().ok()) {
        Some(host) => ctx.println(&format!("Publishing from host [{host}]")),
        None => ctx.println("Publishing from host [unknown]: could not read the local host name"),
    }

    RetryingPublisher::new(publisher)
        .perform(factory.as_ref(), ctx)
        .await?;
    Ok(())
}
