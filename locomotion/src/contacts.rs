//! Bounded, reusable buffer of move contacts.

use crate::{constants::MAX_MOVE_CONTACTS, types::MoveContact};

/// Fixed-capacity list of contacts filled by the displacement resolver on each move.
///
/// The controller owns exactly one of these and hands it to the resolver every frame, so the
/// allocation is made once. The resolver clears it before reporting new contacts.
#[derive(Clone, Debug)]
pub struct ContactBuffer {
    contacts: Vec<MoveContact>,
    capacity: usize,
    dropped: usize,
}

impl Default for ContactBuffer {
    fn default() -> Self {
        Self::with_capacity(MAX_MOVE_CONTACTS)
    }
}

impl ContactBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            contacts: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.dropped = 0;
    }

    /// Appends a contact. Returns false (and counts the drop) when the buffer is full.
    pub fn push(&mut self, contact: MoveContact) -> bool {
        if self.contacts.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.contacts.push(contact);
        true
    }

    /// Contacts in the order the resolver reported them.
    pub fn iter(&self) -> impl Iterator<Item = &MoveContact> {
        self.contacts.iter()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of contacts rejected since the last `clear`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    fn contact(normal: Vec3) -> MoveContact {
        MoveContact {
            normal,
            point: Vec3::zeros(),
            surface: None,
        }
    }

    #[test]
    fn push_stops_at_capacity_and_counts_drops() {
        let mut buffer = ContactBuffer::with_capacity(2);
        assert!(buffer.push(contact(Vec3::x())));
        assert!(buffer.push(contact(Vec3::y())));
        assert!(!buffer.push(contact(Vec3::z())));

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.dropped(), 1);
    }

    #[test]
    fn clear_keeps_allocation_and_resets_drops() {
        let mut buffer = ContactBuffer::default();
        for _ in 0..MAX_MOVE_CONTACTS + 3 {
            buffer.push(contact(Vec3::y()));
        }
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.dropped(), 0);
        assert_eq!(buffer.capacity(), MAX_MOVE_CONTACTS);
    }

    #[test]
    fn iteration_preserves_report_order() {
        let mut buffer = ContactBuffer::default();
        buffer.push(contact(Vec3::x()));
        buffer.push(contact(-Vec3::y()));

        let normals: Vec<Vec3> = buffer.iter().map(|c| c.normal).collect();
        assert_eq!(normals, vec![Vec3::x(), -Vec3::y()]);
    }
}
