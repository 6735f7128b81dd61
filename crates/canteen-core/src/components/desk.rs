//! Desk Pool
//!
//! The facility's seats. A desk is `Empty`, `Reserved` by a customer walking
//! to it, or `Occupied` by a seated customer. The pool is the only place desk
//! status changes, so exclusivity holds by construction: every desk has at
//! most one holder and every customer holds at most one desk.

use bevy_ecs::prelude::*;
use canteen_events::{CustomerId, DeskId, DeskSnapshot, DeskStatus};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::world::level_of;

/// A single desk.
#[derive(Debug, Clone, PartialEq)]
pub struct Desk {
    pub id: DeskId,
    pub x: f32,
    pub y: f32,
    pub level: i32,
    status: DeskStatus,
    holder: Option<CustomerId>,
}

impl Desk {
    pub fn status(&self) -> DeskStatus {
        self.status
    }

    pub fn holder(&self) -> Option<CustomerId> {
        self.holder
    }

    pub fn is_free(&self) -> bool {
        self.status == DeskStatus::Empty
    }

    pub fn snapshot(&self) -> DeskSnapshot {
        DeskSnapshot {
            desk_id: self.id,
            level: self.level,
            x: self.x,
            y: self.y,
            status: self.status,
            holder: self.holder,
        }
    }

    fn clear(&mut self) {
        self.status = DeskStatus::Empty;
        self.holder = None;
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    #[error("desk {0} is not registered")]
    UnknownDesk(DeskId),
    #[error("desk {desk} is {status}")]
    Unavailable { desk: DeskId, status: DeskStatus },
    #[error("{customer} already holds desk {desk}")]
    AlreadyHolding { customer: CustomerId, desk: DeskId },
    #[error("desk {desk} is not held by {customer}")]
    NotHolder { desk: DeskId, customer: CustomerId },
}

/// Number of desks in each status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct StatusCounts {
    pub empty: usize,
    pub reserved: usize,
    pub occupied: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.empty + self.reserved + self.occupied
    }
}

/// Resource: every desk registered with the facility.
#[derive(Resource, Debug, Clone)]
pub struct DeskPool {
    level_height: f32,
    desks: BTreeMap<DeskId, Desk>,
}

impl DeskPool {
    pub fn new(level_height: f32) -> Self {
        Self {
            level_height,
            desks: BTreeMap::new(),
        }
    }

    /// Registers a desk. Returns `false` if the id is already taken.
    pub fn add_desk(&mut self, id: DeskId, x: f32, y: f32) -> bool {
        if self.desks.contains_key(&id) {
            return false;
        }
        let level = level_of(y, self.level_height);
        self.desks.insert(
            id,
            Desk {
                id,
                x,
                y,
                level,
                status: DeskStatus::Empty,
                holder: None,
            },
        );
        true
    }

    /// Next id not yet used by any desk.
    pub fn next_id(&self) -> DeskId {
        self.desks
            .keys()
            .next_back()
            .map_or(DeskId(0), |id| DeskId(id.0 + 1))
    }

    /// Unregisters a desk. Removing an unknown desk is a no-op.
    ///
    /// The returned desk still names its last holder, if any; that customer
    /// discovers the loss on its next tick.
    pub fn remove_desk(&mut self, id: DeskId) -> Option<Desk> {
        self.desks.remove(&id)
    }

    pub fn get(&self, id: DeskId) -> Option<&Desk> {
        self.desks.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Desk> {
        self.desks.values()
    }

    pub fn len(&self) -> usize {
        self.desks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.desks.is_empty()
    }

    /// Empty desks on one level, in id order.
    pub fn free_on_level(&self, level: i32) -> Vec<DeskId> {
        self.desks
            .values()
            .filter(|d| d.is_free() && d.level == level)
            .map(|d| d.id)
            .collect()
    }

    /// Empty desks on any level, in id order.
    pub fn free_anywhere(&self) -> Vec<DeskId> {
        self.desks
            .values()
            .filter(|d| d.is_free())
            .map(|d| d.id)
            .collect()
    }

    pub fn free_count(&self) -> usize {
        self.desks.values().filter(|d| d.is_free()).count()
    }

    /// Desk currently held by `customer`, if any.
    pub fn held_by(&self, customer: CustomerId) -> Option<DeskId> {
        self.desks
            .values()
            .find(|d| d.holder == Some(customer))
            .map(|d| d.id)
    }

    pub fn is_held_by(&self, id: DeskId, customer: CustomerId) -> bool {
        self.desks
            .get(&id)
            .map_or(false, |d| d.holder == Some(customer))
    }

    /// Soft-holds an empty desk for a customer on its way.
    pub fn reserve(&mut self, id: DeskId, customer: CustomerId) -> Result<(), PoolError> {
        if let Some(held) = self.held_by(customer) {
            return Err(PoolError::AlreadyHolding {
                customer,
                desk: held,
            });
        }
        let desk = self.desks.get_mut(&id).ok_or(PoolError::UnknownDesk(id))?;
        if !desk.is_free() {
            return Err(PoolError::Unavailable {
                desk: id,
                status: desk.status,
            });
        }
        desk.status = DeskStatus::Reserved;
        desk.holder = Some(customer);
        Ok(())
    }

    /// Promotes the customer's reservation to occupancy, or takes an empty
    /// desk outright.
    pub fn occupy(&mut self, id: DeskId, customer: CustomerId) -> Result<(), PoolError> {
        if !self.desks.contains_key(&id) {
            return Err(PoolError::UnknownDesk(id));
        }
        if let Some(held) = self.held_by(customer).filter(|held| *held != id) {
            return Err(PoolError::AlreadyHolding {
                customer,
                desk: held,
            });
        }
        let desk = self.desks.get_mut(&id).ok_or(PoolError::UnknownDesk(id))?;
        match desk.holder {
            Some(holder) if holder != customer => {
                Err(PoolError::NotHolder { desk: id, customer })
            }
            _ => {
                desk.holder = Some(customer);
                desk.status = DeskStatus::Occupied;
                Ok(())
            }
        }
    }

    /// Frees a desk held by `customer`.
    pub fn release(&mut self, id: DeskId, customer: CustomerId) -> Result<(), PoolError> {
        let desk = self.desks.get_mut(&id).ok_or(PoolError::UnknownDesk(id))?;
        if desk.holder != Some(customer) {
            return Err(PoolError::NotHolder { desk: id, customer });
        }
        desk.clear();
        Ok(())
    }

    /// Frees whatever desk `customer` holds.
    pub fn release_held_by(&mut self, customer: CustomerId) -> Option<DeskId> {
        let desk = self
            .desks
            .values_mut()
            .find(|d| d.holder == Some(customer))?;
        desk.clear();
        Some(desk.id)
    }

    /// Frees every desk. Returns how many were held.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for desk in self.desks.values_mut().filter(|d| !d.is_free()) {
            desk.clear();
            released += 1;
        }
        released
    }

    /// Moves a desk, keeping its status and holder.
    pub fn move_desk(&mut self, id: DeskId, x: f32, y: f32) -> Result<(), PoolError> {
        let level = level_of(y, self.level_height);
        let desk = self.desks.get_mut(&id).ok_or(PoolError::UnknownDesk(id))?;
        desk.x = x;
        desk.y = y;
        desk.level = level;
        Ok(())
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for desk in self.desks.values() {
            match desk.status {
                DeskStatus::Empty => counts.empty += 1,
                DeskStatus::Reserved => counts.reserved += 1,
                DeskStatus::Occupied => counts.occupied += 1,
            }
        }
        counts
    }

    pub fn snapshot(&self) -> Vec<DeskSnapshot> {
        self.desks.values().map(Desk::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> DeskPool {
        let mut pool = DeskPool::new(3.0);
        pool.add_desk(DeskId(0), 2.0, 0.0);
        pool.add_desk(DeskId(1), 4.0, 0.0);
        pool.add_desk(DeskId(2), 2.0, 3.0);
        pool
    }

    #[test]
    fn test_add_desk_is_idempotent() {
        let mut pool = pool();
        assert!(!pool.add_desk(DeskId(1), 9.0, 9.0));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(DeskId(1)).unwrap().x, 4.0);
        assert_eq!(pool.get(DeskId(2)).unwrap().level, 1);
        assert_eq!(pool.next_id(), DeskId(3));
    }

    #[test]
    fn test_remove_unknown_desk_is_noop() {
        let mut pool = pool();
        assert!(pool.remove_desk(DeskId(7)).is_none());
        assert!(pool.remove_desk(DeskId(0)).is_some());
        assert!(pool.remove_desk(DeskId(0)).is_none());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_free_queries() {
        let mut pool = pool();
        assert_eq!(pool.free_on_level(0), vec![DeskId(0), DeskId(1)]);
        assert_eq!(pool.free_on_level(1), vec![DeskId(2)]);
        assert!(pool.free_on_level(5).is_empty());

        pool.reserve(DeskId(0), CustomerId(1)).unwrap();
        assert_eq!(pool.free_on_level(0), vec![DeskId(1)]);
        assert_eq!(pool.free_anywhere(), vec![DeskId(1), DeskId(2)]);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn test_reserve_is_exclusive() {
        let mut pool = pool();
        pool.reserve(DeskId(0), CustomerId(1)).unwrap();

        let err = pool.reserve(DeskId(0), CustomerId(2)).unwrap_err();
        assert_eq!(
            err,
            PoolError::Unavailable {
                desk: DeskId(0),
                status: DeskStatus::Reserved
            }
        );

        let err = pool.reserve(DeskId(1), CustomerId(1)).unwrap_err();
        assert!(matches!(err, PoolError::AlreadyHolding { .. }));
        assert_eq!(pool.get(DeskId(0)).unwrap().holder(), Some(CustomerId(1)));
    }

    #[test]
    fn test_occupy_requires_holder() {
        let mut pool = pool();
        pool.reserve(DeskId(1), CustomerId(1)).unwrap();
        assert!(pool.occupy(DeskId(1), CustomerId(2)).is_err());
        pool.occupy(DeskId(1), CustomerId(1)).unwrap();
        assert_eq!(pool.get(DeskId(1)).unwrap().status(), DeskStatus::Occupied);
        assert_eq!(
            pool.occupy(DeskId(9), CustomerId(1)),
            Err(PoolError::UnknownDesk(DeskId(9)))
        );
    }

    #[test]
    fn test_occupy_empty_desk() {
        let mut pool = pool();
        pool.occupy(DeskId(1), CustomerId(3)).unwrap();
        let desk = pool.get(DeskId(1)).unwrap();
        assert_eq!(desk.status(), DeskStatus::Occupied);
        assert_eq!(desk.holder(), Some(CustomerId(3)));

        assert_eq!(
            pool.occupy(DeskId(2), CustomerId(3)),
            Err(PoolError::AlreadyHolding { customer: CustomerId(3), desk: DeskId(1) })
        );
        assert!(pool.get(DeskId(2)).unwrap().is_free());
        assert_eq!(
            pool.occupy(DeskId(1), CustomerId(4)),
            Err(PoolError::NotHolder { desk: DeskId(1), customer: CustomerId(4) })
        );
    }

    #[test]
    fn test_release() {
        let mut pool = pool();
        pool.reserve(DeskId(2), CustomerId(4)).unwrap();
        assert!(pool.release(DeskId(2), CustomerId(5)).is_err());
        pool.release(DeskId(2), CustomerId(4)).unwrap();
        let desk = pool.get(DeskId(2)).unwrap();
        assert!(desk.is_free());
        assert_eq!(desk.holder(), None);

        pool.reserve(DeskId(0), CustomerId(4)).unwrap();
        assert_eq!(pool.release_held_by(CustomerId(4)), Some(DeskId(0)));
        assert_eq!(pool.release_held_by(CustomerId(4)), None);
    }

    #[test]
    fn test_release_all_and_counts() {
        let mut pool = pool();
        pool.reserve(DeskId(0), CustomerId(1)).unwrap();
        pool.reserve(DeskId(1), CustomerId(2)).unwrap();
        pool.occupy(DeskId(1), CustomerId(2)).unwrap();

        let counts = pool.status_counts();
        assert_eq!(counts, StatusCounts { empty: 1, reserved: 1, occupied: 1 });
        assert_eq!(counts.total(), pool.len());

        assert_eq!(pool.release_all(), 2);
        assert_eq!(pool.status_counts().empty, 3);
    }

    #[test]
    fn test_move_desk_keeps_holder() {
        let mut pool = pool();
        pool.reserve(DeskId(0), CustomerId(3)).unwrap();
        pool.move_desk(DeskId(0), 1.0, 3.5).unwrap();
        let desk = pool.get(DeskId(0)).unwrap();
        assert_eq!(desk.level, 1);
        assert_eq!(desk.holder(), Some(CustomerId(3)));
        assert!(pool.move_desk(DeskId(8), 0.0, 0.0).is_err());
    }
}
