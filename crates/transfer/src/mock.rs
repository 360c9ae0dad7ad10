//! In-memory remote session recording every call.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use outbound_config::TransferSpec;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::session::{RemoteSession, SessionFuture};
use crate::TransferError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Initial,
    Cd(String),
    Mkdir(String),
    Begin(String),
    End(String),
    Upload(String),
    DeleteTree(String),
    Disconnect,
}

/// Remote tree and call log shared by every session of one test.
#[derive(Debug, Default)]
pub struct MockState {
    pub ops: Vec<Op>,
    pub dirs: BTreeSet<String>,
    pub files: BTreeMap<String, Vec<u8>>,
    /// 1-based upload calls that fail.
    pub fail_uploads: BTreeSet<usize>,
    /// 1-based delete calls that fail.
    pub fail_deletes: BTreeSet<usize>,
    /// 1-based end-group calls that fail.
    pub fail_end_groups: BTreeSet<usize>,
    /// Directories `make_directory` refuses to create.
    pub deny_mkdir: BTreeSet<String>,
    pub uploads: usize,
    pub deletes: usize,
    pub end_groups: usize,
}

impl MockState {
    pub fn shared() -> Arc<Mutex<MockState>> {
        Arc::new(Mutex::new(MockState::default()))
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Upload(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

pub struct MockSession {
    state: Arc<Mutex<MockState>>,
    cwd: String,
}

impl MockSession {
    pub fn new(state: Arc<Mutex<MockState>>) -> Self {
        Self {
            state,
            cwd: String::new(),
        }
    }

    fn resolve(&self, path: &str) -> String {
        let path = path.replace('\\', "/");
        if self.cwd.is_empty() {
            path
        } else {
            format!("{}/{path}", self.cwd)
        }
    }

    fn record(&self, op: Op) {
        self.state.lock().unwrap().ops.push(op);
    }
}

impl RemoteSession for MockSession {
    fn change_to_initial_directory(&mut self) -> SessionFuture<'_, bool> {
        Box::pin(async move {
            self.record(Op::Initial);
            self.cwd.clear();
            Ok(true)
        })
    }

    fn change_directory<'a>(&'a mut self, path: &'a str) -> SessionFuture<'a, bool> {
        Box::pin(async move {
            self.record(Op::Cd(path.to_string()));
            let target = self.resolve(path);
            let exists = self.state.lock().unwrap().dirs.contains(&target);
            if exists {
                self.cwd = target;
            }
            Ok(exists)
        })
    }

    fn make_directory<'a>(&'a mut self, path: &'a str) -> SessionFuture<'a, bool> {
        Box::pin(async move {
            self.record(Op::Mkdir(path.to_string()));
            let target = self.resolve(path);
            let mut state = self.state.lock().unwrap();
            if state.deny_mkdir.contains(&target) {
                return Ok(false);
            }
            // Like most servers, only one level is created at a time.
            let parent_exists = match target.rfind('/') {
                Some(idx) => state.dirs.contains(&target[..idx]),
                None => true,
            };
            if parent_exists {
                state.dirs.insert(target);
            }
            Ok(parent_exists)
        })
    }

    fn begin_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            self.record(Op::Begin(spec.source_glob.clone()));
            Ok(())
        })
    }

    fn end_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.end_groups += 1;
            let call = state.end_groups;
            state.ops.push(Op::End(spec.source_glob.clone()));
            if state.fail_end_groups.contains(&call) {
                return Err(TransferError::Session(format!("end group {call} failed")));
            }
            Ok(())
        })
    }

    fn upload_file<'a>(
        &'a mut self,
        _spec: &'a TransferSpec,
        file_name: &'a str,
        reader: &'a mut (dyn AsyncRead + Send + Unpin),
    ) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            let path = self.resolve(file_name);
            {
                let mut state = self.state.lock().unwrap();
                state.uploads += 1;
                let call = state.uploads;
                if state.fail_uploads.contains(&call) {
                    return Err(TransferError::Session(format!("upload {call} failed")));
                }
            }
            let mut content = Vec::new();
            reader.read_to_end(&mut content).await?;
            let mut state = self.state.lock().unwrap();
            state.ops.push(Op::Upload(path.clone()));
            state.files.insert(path, content);
            Ok(())
        })
    }

    fn delete_tree(&mut self) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.deletes += 1;
            let call = state.deletes;
            state.ops.push(Op::DeleteTree(self.cwd.clone()));
            if state.fail_deletes.contains(&call) {
                return Err(TransferError::Session(format!("delete {call} failed")));
            }
            let prefix = if self.cwd.is_empty() {
                String::new()
            } else {
                format!("{}/", self.cwd)
            };
            state.files.retain(|path, _| !path.starts_with(&prefix));
            state
                .dirs
                .retain(|dir| prefix.is_empty() || !dir.starts_with(&prefix));
            if prefix.is_empty() {
                state.dirs.clear();
            }
            Ok(())
        })
    }

    fn disconnect(&mut self) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            self.record(Op::Disconnect);
            Ok(())
        })
    }
}
