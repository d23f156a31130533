//! Handle table: wire reference numbers to decoded values.

use crate::class_desc::ClassId;
use crate::constants::BASE_WIRE_HANDLE;
use crate::entity::{EntityId, Value};
use crate::error::DecodeError;

/// What a handle is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Allocated, value not bound yet.
    Reserved,
    Entity(EntityId),
    Class(ClassId),
}

/// Per-session table of assigned handles.
///
/// Handles are numbered sequentially from [`BASE_WIRE_HANDLE`], in the
/// order their records appear in the stream. The table only maps numbers
/// to arena ids; the entities themselves live in the
/// [`Graph`](crate::Graph) and [`ClassTable`](crate::ClassTable), so a
/// reset forgets the numbering without invalidating anything decoded.
#[derive(Debug, Default, Clone)]
pub struct HandleTable {
    slots: Vec<Slot>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next handle.
    pub fn allocate(&mut self) -> u32 {
        let handle = self.next_handle();
        self.slots.push(Slot::Reserved);
        handle
    }

    /// Binds a previously allocated handle, replacing its placeholder.
    pub fn bind(&mut self, handle: u32, slot: Slot) -> Result<(), DecodeError> {
        let i = self.index(handle).ok_or(DecodeError::DanglingReference(handle))?;
        self.slots[i] = slot;
        Ok(())
    }

    /// Looks up a handle named by a back-reference.
    pub fn resolve(&self, handle: u32) -> Result<Value, DecodeError> {
        match self.index(handle).map(|i| self.slots[i]) {
            Some(Slot::Entity(id)) => Ok(Value::Entity(id)),
            Some(Slot::Class(id)) => Ok(Value::Class(id)),
            Some(Slot::Reserved) | None => Err(DecodeError::DanglingReference(handle)),
        }
    }

    /// Forgets every assigned handle; numbering restarts at the base.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// The handle the next [`allocate`](Self::allocate) will return.
    pub fn next_handle(&self) -> u32 {
        BASE_WIRE_HANDLE.wrapping_add(self.slots.len() as u32)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Assigned handles in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Slot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (BASE_WIRE_HANDLE.wrapping_add(i as u32), *slot))
    }

    fn index(&self, handle: u32) -> Option<usize> {
        let i = handle.checked_sub(BASE_WIRE_HANDLE)? as usize;
        (i < self.slots.len()).then_some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_sequential_from_base() {
        let mut t = HandleTable::new();
        assert_eq!(t.allocate(), 0x7e_0000);
        assert_eq!(t.allocate(), 0x7e_0001);
        assert_eq!(t.next_handle(), 0x7e_0002);
    }

    #[test]
    fn reserved_handle_does_not_resolve() {
        let mut t = HandleTable::new();
        let h = t.allocate();
        assert_eq!(t.resolve(h), Err(DecodeError::DanglingReference(h)));
        t.bind(h, Slot::Entity(EntityId(3))).unwrap();
        assert_eq!(t.resolve(h), Ok(Value::Entity(EntityId(3))));
    }

    #[test]
    fn unknown_handles_dangle() {
        let t = HandleTable::new();
        assert_eq!(t.resolve(0x7e_0000), Err(DecodeError::DanglingReference(0x7e_0000)));
        assert_eq!(t.resolve(5), Err(DecodeError::DanglingReference(5)));
    }

    #[test]
    fn reset_restarts_numbering() {
        let mut t = HandleTable::new();
        let h = t.allocate();
        t.bind(h, Slot::Class(ClassId(0))).unwrap();
        t.reset();
        assert!(t.is_empty());
        assert!(t.resolve(h).is_err());
        assert_eq!(t.allocate(), h);
    }
}
