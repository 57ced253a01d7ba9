use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use super::{Result, SessionStore, StoreError};
use crate::types::{Session, SessionUpdate};

/// メモリ上のセッションストア
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn append(&self, session: Session) -> Result<Session> {
        self.lock().insert(0, session.clone());
        Ok(session)
    }

    fn all(&self) -> Result<Vec<Session>> {
        Ok(self.lock().clone())
    }

    fn update(&self, id: Uuid, update: &SessionUpdate) -> Result<Session> {
        let mut sessions = self.lock();
        let session = sessions
            .iter_mut()
            .find(|session| session.id == id)
            .ok_or(StoreError::NotFound(id))?;
        update.apply_to(session);
        Ok(session.clone())
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|session| session.id != id);
        Ok(sessions.len() != before)
    }

    fn clear(&self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }
}
