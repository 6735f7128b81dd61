//! Order Catalog
//!
//! Weighted menu the customers order from.

use bevy_ecs::prelude::*;
use rand::Rng;
use thiserror::Error;

/// What a customer asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Dish(String),
    /// The catalog had nothing to draw from
    Unavailable,
}

impl Order {
    pub fn dish(&self) -> Option<&str> {
        match self {
            Order::Dish(name) => Some(name),
            Order::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("dish '{name}' has invalid weight {weight}")]
    InvalidWeight { name: String, weight: f32 },
}

/// Resource: dish names with relative weights, in insertion order.
#[derive(Resource, Debug, Clone, Default)]
pub struct OrderCatalog {
    entries: Vec<(String, f32)>,
}

impl OrderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dish. Duplicate names are ignored and return `Ok(false)`.
    pub fn insert(&mut self, name: impl Into<String>, weight: f32) -> Result<bool, CatalogError> {
        let name = name.into();
        if !weight.is_finite() || weight < 0.0 {
            return Err(CatalogError::InvalidWeight { name, weight });
        }
        if self.entries.iter().any(|(n, _)| *n == name) {
            return Ok(false);
        }
        self.entries.push((name, weight));
        Ok(true)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws a dish with probability proportional to its weight.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Order {
        let total = self.total_weight();
        if total <= 0.0 {
            return Order::Unavailable;
        }

        let roll = rng.gen::<f32>() * total;
        let mut cumulative = 0.0;
        for (name, weight) in &self.entries {
            cumulative += weight;
            if *weight > 0.0 && cumulative >= roll {
                return Order::Dish(name.clone());
            }
        }

        // Rounding can leave the roll just above the final sum
        self.entries
            .iter()
            .rev()
            .find(|(_, w)| *w > 0.0)
            .map_or(Order::Unavailable, |(name, _)| Order::Dish(name.clone()))
    }
}
