//! Slot-indexed session storage of one instance.

use super::session::Session;
use crate::error::InstanceError;

/// Sessions keyed by connection slot.
///
/// During a dispatch the sender's session is taken out of its slot and put
/// back afterwards, so handlers see every other session through this table
/// and the sender through the dispatch context.
#[derive(Debug)]
pub struct SessionTable {
    slots: Vec<Option<Session>>,
}

impl SessionTable {
    pub fn new(max_players: u8) -> Self {
        Self {
            slots: (0..max_players).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Lowest free slot.
    pub fn free_slot(&self) -> Option<u8> {
        self.slots
            .iter()
            .position(Option::is_none)
            .and_then(|i| u8::try_from(i).ok())
    }

    pub fn insert(&mut self, session: Session) -> Result<(), InstanceError> {
        let conn = session.conn;
        let slot = self
            .slots
            .get_mut(usize::from(conn))
            .ok_or(InstanceError::SlotOutOfRange(conn))?;
        if slot.is_some() {
            return Err(InstanceError::SlotOccupied(conn));
        }
        *slot = Some(session);
        Ok(())
    }

    pub fn get(&self, conn: u8) -> Option<&Session> {
        self.slots.get(usize::from(conn))?.as_ref()
    }

    pub fn get_mut(&mut self, conn: u8) -> Option<&mut Session> {
        self.slots.get_mut(usize::from(conn))?.as_mut()
    }

    /// Remove a session, freeing its slot.
    pub fn remove(&mut self, conn: u8) -> Option<Session> {
        self.slots.get_mut(usize::from(conn))?.take()
    }

    /// Put a session taken with [`remove`](Self::remove) back in its slot.
    pub fn restore(&mut self, session: Session) {
        if let Some(slot) = self.slots.get_mut(usize::from(session.conn)) {
            *slot = Some(session);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.slots.iter_mut().flatten()
    }

    /// Connection ids of every present session.
    pub fn ids(&self) -> Vec<u8> {
        self.iter().map(|s| s.conn).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether another session already uses `name` (case-insensitive).
    pub fn name_in_use(&self, name: &str, except: u8) -> bool {
        self.iter()
            .any(|s| s.conn != except && s.name.eq_ignore_ascii_case(name))
    }
}
