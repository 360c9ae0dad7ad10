//! Positions a remote session in the directory a file belongs in, creating
//! missing directories on the way.

use tracing::debug;

use crate::TransferError;
use crate::session::RemoteSession;

/// Tracks the session's position for one transfer unit so consecutive
/// files in the same directory don't cause extra round trips.
#[derive(Debug)]
pub struct DirectoryMaterializer {
    /// Resolved remote directory of the transfer.
    remote_dir: String,
    flatten: bool,
    flatten_reset_done: bool,
    previous: Option<String>,
}

impl DirectoryMaterializer {
    pub fn new(remote_dir: impl Into<String>, flatten: bool) -> Self {
        Self {
            remote_dir: remote_dir.into(),
            flatten,
            flatten_reset_done: false,
            previous: None,
        }
    }

    pub fn remote_dir(&self) -> &str {
        &self.remote_dir
    }

    /// Returns to the session's initial directory, then enters the
    /// transfer's remote directory.
    pub async fn reset(&mut self, session: &mut dyn RemoteSession) -> Result<(), TransferError> {
        if !session.change_to_initial_directory().await? {
            debug!("could not change to initial directory");
        }
        self.previous = None;
        if !self.remote_dir.is_empty() {
            chdir(session, &self.remote_dir).await?;
        }
        Ok(())
    }

    /// Makes `rel_dir` (below the remote directory) the current directory.
    ///
    /// In flatten mode `rel_dir` is ignored and only the remote directory is
    /// entered, once.
    pub async fn ensure(
        &mut self,
        session: &mut dyn RemoteSession,
        rel_dir: &str,
    ) -> Result<(), TransferError> {
        if self.flatten {
            if !self.flatten_reset_done {
                self.reset(session).await?;
                self.flatten_reset_done = true;
            }
            return Ok(());
        }

        if self.previous.as_deref() == Some(rel_dir) {
            return Ok(());
        }
        self.reset(session).await?;
        if !rel_dir.is_empty() {
            chdir(session, rel_dir).await?;
        }
        self.previous = Some(rel_dir.to_string());
        Ok(())
    }
}

/// Changes into `dir`, creating it if needed.
///
/// The whole path is tried first; if that fails each segment (split on
/// `/` or `\`) is entered or created in turn.
pub async fn chdir(session: &mut dyn RemoteSession, dir: &str) -> Result<(), TransferError> {
    if change_or_make(session, dir).await? {
        return Ok(());
    }
    for segment in dir.split(['/', '\\']).filter(|s| !s.is_empty()) {
        if !change_or_make(session, segment).await? {
            return Err(TransferError::DirectoryCreateFailed(segment.to_string()));
        }
    }
    Ok(())
}

/// Changes into `dir`, or creates it and then changes into it.
pub async fn change_or_make(
    session: &mut dyn RemoteSession,
    dir: &str,
) -> Result<bool, TransferError> {
    if session.change_directory(dir).await? {
        return Ok(true);
    }
    Ok(session.make_directory(dir).await? && session.change_directory(dir).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSession, MockState, Op};

    fn cd(path: &str) -> Op {
        Op::Cd(path.into())
    }

    fn mkdir(path: &str) -> Op {
        Op::Mkdir(path.into())
    }

    #[tokio::test]
    async fn existing_directory_is_entered_in_one_call() {
        let state = MockState::shared();
        state.lock().unwrap().dirs.extend(["a", "a/b"].map(String::from));
        let mut session = MockSession::new(state.clone());

        chdir(&mut session, "a/b").await.unwrap();
        assert_eq!(state.lock().unwrap().ops, vec![cd("a/b")]);
    }

    #[tokio::test]
    async fn missing_path_is_created_segment_by_segment() {
        let state = MockState::shared();
        let mut session = MockSession::new(state.clone());

        chdir(&mut session, "a/b").await.unwrap();
        assert_eq!(
            state.lock().unwrap().ops,
            vec![
                cd("a/b"),
                mkdir("a/b"),
                cd("a"),
                mkdir("a"),
                cd("a"),
                cd("b"),
                mkdir("b"),
                cd("b"),
            ]
        );
        assert!(state.lock().unwrap().dirs.contains("a/b"));
    }

    #[tokio::test]
    async fn backslash_segments_are_split() {
        let state = MockState::shared();
        let mut session = MockSession::new(state.clone());

        chdir(&mut session, "x\\y").await.unwrap();
        let state = state.lock().unwrap();
        assert!(state.dirs.contains("x"));
        assert!(state.dirs.contains("x/y"));
    }

    #[tokio::test]
    async fn segment_that_cannot_be_created_fails() {
        let state = MockState::shared();
        state.lock().unwrap().deny_mkdir.insert("a/locked".into());
        let mut session = MockSession::new(state.clone());

        let err = chdir(&mut session, "a/locked/c").await.unwrap_err();
        match err {
            TransferError::DirectoryCreateFailed(segment) => assert_eq!(segment, "locked"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn same_directory_is_not_re_entered() {
        let state = MockState::shared();
        state.lock().unwrap().dirs.extend(["out", "out/lib"].map(String::from));
        let mut session = MockSession::new(state.clone());
        let mut dirs = DirectoryMaterializer::new("out", false);

        dirs.ensure(&mut session, "lib").await.unwrap();
        dirs.ensure(&mut session, "lib").await.unwrap();
        dirs.ensure(&mut session, "").await.unwrap();

        assert_eq!(
            state.lock().unwrap().ops,
            vec![Op::Initial, cd("out"), cd("lib"), Op::Initial, cd("out")]
        );
    }

    #[tokio::test]
    async fn flatten_enters_remote_directory_once() {
        let state = MockState::shared();
        let mut session = MockSession::new(state.clone());
        let mut dirs = DirectoryMaterializer::new("", true);

        dirs.ensure(&mut session, "a/b").await.unwrap();
        dirs.ensure(&mut session, "c").await.unwrap();

        assert_eq!(state.lock().unwrap().ops, vec![Op::Initial]);
    }

    #[tokio::test]
    async fn reset_forgets_previous_directory() {
        let state = MockState::shared();
        state.lock().unwrap().dirs.insert("lib".into());
        let mut session = MockSession::new(state.clone());
        let mut dirs = DirectoryMaterializer::new("", false);

        dirs.ensure(&mut session, "lib").await.unwrap();
        dirs.reset(&mut session).await.unwrap();
        dirs.ensure(&mut session, "lib").await.unwrap();

        assert_eq!(
            state.lock().unwrap().ops,
            vec![Op::Initial, cd("lib"), Op::Initial, Op::Initial, cd("lib")]
        );
    }
}
