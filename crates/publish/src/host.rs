//! Hosts and the factories that open sessions to them.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use outbound_config::{ConfigError, HostConfig, validate_name};
use outbound_transfer::{BuildContext, RemoteSession, TransferError};
use tracing::debug;

/// Boxed future returned by [`SessionFactory::connect`].
pub type ConnectFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Box<dyn RemoteSession>, TransferError>> + Send + 'a>>;

/// Opens sessions to one configured host.
pub trait SessionFactory: Send + Sync {
    fn host(&self) -> &HostConfig;

    /// Connects and authenticates. The session starts in the host's login
    /// directory.
    fn connect<'a>(&'a self, ctx: &'a BuildContext) -> ConnectFuture<'a>;
}

/// Looks up the factory for a configuration name.
pub trait HostRegistry: Send + Sync {
    fn factory(&self, name: &str) -> Option<Arc<dyn SessionFactory>>;
}

/// A [`HostRegistry`] backed by a map keyed on host name.
#[derive(Default)]
pub struct HostTable {
    factories: BTreeMap<String, Arc<dyn SessionFactory>>,
}

impl HostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory under its host's name, replacing any previous one.
    pub fn register(&mut self, factory: Arc<dyn SessionFactory>) -> Result<(), ConfigError> {
        let name = factory.host().name.clone();
        validate_name(&name)?;
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl HostRegistry for HostTable {
    fn factory(&self, name: &str) -> Option<Arc<dyn SessionFactory>> {
        self.factories.get(name).cloned()
    }
}

/// Changes into the host's remote root directory, if it has one.
pub async fn change_to_root_directory(
    session: &mut dyn RemoteSession,
    host: &HostConfig,
) -> Result<(), TransferError> {
    let Some(root) = host
        .remote_root_dir
        .as_deref()
        .filter(|dir| !dir.trim().is_empty())
    else {
        return Ok(());
    };

    if !session.change_directory(root).await? {
        return Err(TransferError::Session(format!(
            "failed to change into remote root directory [{root}]"
        )));
    }
    debug!(host = %host.name, root = %root, "entered remote root directory");
    Ok(())
}

/// Connects through `factory` and enters the host's root directory.
///
/// The session is disconnected again if the root directory can't be
/// entered.
pub async fn open_session(
    factory: &dyn SessionFactory,
    ctx: &BuildContext,
) -> Result<Box<dyn RemoteSession>, TransferError> {
    let mut session = factory.connect(ctx).await?;
    if let Err(e) = change_to_root_directory(session.as_mut(), factory.host()).await {
        session.disconnect_quietly().await;
        return Err(e);
    }
    Ok(session)
}
