//! Scripted session factory recording every call across reconnects.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use outbound_config::{HostConfig, TransferSpec};
use outbound_transfer::{BuildContext, RemoteSession, SessionFuture, TransferError};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::host::{ConnectFuture, SessionFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Connect,
    Initial,
    Cd(String),
    Begin(String),
    End(String),
    Upload(String),
    DeleteTree,
    Disconnect,
}

#[derive(Debug, Default)]
pub struct Script {
    pub ops: Vec<Op>,
    /// 1-based connect attempts that fail.
    pub fail_connects: BTreeSet<usize>,
    pub fail_uploads: BTreeSet<usize>,
    pub fail_begin_groups: BTreeSet<usize>,
    pub fail_end_groups: BTreeSet<usize>,
    /// Directories the session refuses to enter.
    pub locked_dirs: BTreeSet<String>,
    connects: usize,
    uploads: usize,
    begin_groups: usize,
    end_groups: usize,
}

impl Script {
    pub fn count(&self, op: &Op) -> usize {
        self.ops.iter().filter(|o| *o == op).count()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Upload(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

fn fail_on(counter: &mut usize, failing: &BTreeSet<usize>, what: &str) -> Result<(), TransferError> {
    *counter += 1;
    if failing.contains(counter) {
        Err(TransferError::Session(format!("{what} {counter} failed")))
    } else {
        Ok(())
    }
}

pub struct MockFactory {
    pub host: HostConfig,
    pub script: Arc<Mutex<Script>>,
}

impl MockFactory {
    pub fn new(name: &str) -> Self {
        Self {
            host: HostConfig::new(Some(name), name, "mock.example.com"),
            script: Arc::new(Mutex::new(Script::default())),
        }
    }
}

impl SessionFactory for MockFactory {
    fn host(&self) -> &HostConfig {
        &self.host
    }

    fn connect<'a>(&'a self, _ctx: &'a BuildContext) -> ConnectFuture<'a> {
        Box::pin(async move {
            {
                let mut script = self.script.lock().unwrap();
                script.ops.push(Op::Connect);
                let failing = script.fail_connects.clone();
                fail_on(&mut script.connects, &failing, "connect")?;
            }
            let session: Box<dyn RemoteSession> = Box::new(MockSession {
                script: Arc::clone(&self.script),
            });
            Ok(session)
        })
    }
}

pub struct MockSession {
    script: Arc<Mutex<Script>>,
}

impl MockSession {
    fn push(&self, op: Op) {
        self.script.lock().unwrap().ops.push(op);
    }
}

impl RemoteSession for MockSession {
    fn change_to_initial_directory(&mut self) -> SessionFuture<'_, bool> {
        Box::pin(async move {
            self.push(Op::Initial);
            Ok(true)
        })
    }

    fn change_directory<'a>(&'a mut self, path: &'a str) -> SessionFuture<'a, bool> {
        Box::pin(async move {
            let mut script = self.script.lock().unwrap();
            script.ops.push(Op::Cd(path.to_string()));
            Ok(!script.locked_dirs.contains(path))
        })
    }

    fn make_directory<'a>(&'a mut self, _path: &'a str) -> SessionFuture<'a, bool> {
        Box::pin(async move { Ok(true) })
    }

    fn begin_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            let mut script = self.script.lock().unwrap();
            script.ops.push(Op::Begin(spec.source_glob.clone()));
            let failing = script.fail_begin_groups.clone();
            fail_on(&mut script.begin_groups, &failing, "begin group")
        })
    }

    fn end_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            let mut script = self.script.lock().unwrap();
            script.ops.push(Op::End(spec.source_glob.clone()));
            let failing = script.fail_end_groups.clone();
            fail_on(&mut script.end_groups, &failing, "end group")
        })
    }

    fn upload_file<'a>(
        &'a mut self,
        _spec: &'a TransferSpec,
        file_name: &'a str,
        reader: &'a mut (dyn AsyncRead + Send + Unpin),
    ) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            {
                let mut script = self.script.lock().unwrap();
                let failing = script.fail_uploads.clone();
                fail_on(&mut script.uploads, &failing, "upload")?;
            }
            let mut sink = Vec::new();
            reader.read_to_end(&mut sink).await?;
            self.push(Op::Upload(file_name.to_string()));
            Ok(())
        })
    }

    fn delete_tree(&mut self) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            self.push(Op::DeleteTree);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            self.push(Op::Disconnect);
            Ok(())
        })
    }
}
