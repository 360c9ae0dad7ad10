//! Sends all transfers of one publisher over a single session, reconnecting
//! and resuming after failures.

use outbound_config::PublisherConfig;
use outbound_transfer::{
    BuildContext, RemoteSession, TransferCheckpoint, TransferError, TransferUnit,
};
use tracing::{info, warn};

use crate::error::PublishError;
use crate::host::{SessionFactory, open_session};

/// Files sent per transfer, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub per_unit: Vec<usize>,
}

impl PublishReport {
    pub fn total(&self) -> usize {
        self.per_unit.iter().sum()
    }

    /// `"5"` for a single transfer, `"5 ( 2 + 3 )"` for several.
    pub fn summary(&self) -> String {
        let total = self.total();
        if self.per_unit.len() > 1 {
            let parts: Vec<String> = self.per_unit.iter().map(usize::to_string).collect();
            format!("{total} ( {} )", parts.join(" + "))
        } else {
            total.to_string()
        }
    }
}

/// Where a publish stands between attempts.
#[derive(Debug, Default)]
struct Progress {
    /// Index of the first transfer not yet finished.
    next_unit: usize,
    per_unit: Vec<usize>,
    /// Resume point of `next_unit`, if it failed part way.
    checkpoint: Option<TransferCheckpoint>,
    /// `next_unit` sent all its files; only its end-group is outstanding.
    files_done: bool,
}

/// Runs one [`PublisherConfig`].
pub struct RetryingPublisher<'a> {
    config: &'a PublisherConfig,
}

impl<'a> RetryingPublisher<'a> {
    pub fn new(config: &'a PublisherConfig) -> Self {
        Self { config }
    }

    /// Publishes every transfer, retrying as the retry policy allows.
    ///
    /// Transfers that finished in an earlier attempt are not repeated; the
    /// one that failed continues from its checkpoint. When retries run out
    /// the error of the last attempt is returned.
    pub async fn perform(
        &self,
        factory: &dyn SessionFactory,
        ctx: &BuildContext,
    ) -> Result<PublishReport, PublishError> {
        let name = &self.config.config_name;
        let retry = self.config.retry;
        let mut remaining_tries = retry.retries;
        let mut progress = Progress::default();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            ctx.println(&format!("Connecting to {name} ..."));
            info!(config = %name, attempt, "connecting");

            let mut session: Option<Box<dyn RemoteSession>> = None;
            let result = self
                .attempt(factory, ctx, &mut session, &mut progress)
                .await;

            if let Some(mut session) = session.take() {
                ctx.println(&format!("Disconnecting configuration [{name}] ..."));
                session.disconnect_quietly().await;
            }

            let error = match result {
                Ok(()) => {
                    let report = PublishReport {
                        per_unit: progress.per_unit,
                    };
                    ctx.println(&format!("Transferred {} file(s)", report.summary()));
                    info!(config = %name, files = report.total(), "publish complete");
                    return Ok(report);
                }
                Err(e) => e,
            };

            if remaining_tries == 0 {
                warn!(config = %name, attempt, error = %error, "publish failed, no retries left");
                return Err(error.into());
            }
            remaining_tries -= 1;

            warn!(
                config = %name,
                attempt,
                remaining = remaining_tries,
                delay_ms = retry.delay_ms,
                configuration = error.is_configuration_error(),
                error = %error,
                "publish failed, retrying"
            );
            ctx.println(&format!(
                "Error when publishing, message [{error}]. Retrying in [{}] ms",
                retry.delay_ms
            ));
            tokio::time::sleep(retry.delay()).await;
        }
    }

    async fn attempt(
        &self,
        factory: &dyn SessionFactory,
        ctx: &BuildContext,
        slot: &mut Option<Box<dyn RemoteSession>>,
        progress: &mut Progress,
    ) -> Result<(), TransferError> {
        let session = slot.insert(open_session(factory, ctx).await?);
        let transfers = &self.config.transfers;

        while let Some(spec) = transfers.get(progress.next_unit) {
            session.begin_group(spec).await?;

            if !progress.files_done {
                let unit = TransferUnit::new(spec, ctx);
                let sent = if !unit.has_configured_source_files() {
                    0
                } else {
                    let result = match progress.checkpoint.take() {
                        Some(checkpoint) => {
                            let before = checkpoint.files_sent;
                            unit.resume(session.as_mut(), checkpoint)
                                .await
                                .map(|sent| before + sent)
                        }
                        None => unit.execute(session.as_mut()).await,
                    };
                    match result {
                        Ok(sent) => sent,
                        Err(interrupted) => {
                            progress.checkpoint = interrupted.checkpoint;
                            return Err(interrupted.source);
                        }
                    }
                };
                progress.per_unit.push(sent);
                progress.files_done = true;
            }

            session.end_group(spec).await?;
            progress.next_unit += 1;
            progress.checkpoint = None;
            progress.files_done = false;
        }

        Ok(())
    }
}
