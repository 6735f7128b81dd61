//! Layout Setup
//!
//! Builds the desk pool, stair registry and order catalog a facility starts
//! with.

use canteen_events::DeskId;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::components::{CatalogError, DeskPool, OrderCatalog, StairRegistry};
use crate::config::CanteenConfig;

/// Registers every configured desk, numbered in file order from 0.
pub fn build_desk_pool(config: &CanteenConfig) -> DeskPool {
    let mut pool = DeskPool::new(config.layout.level_height);
    for (index, desk) in config.desks.iter().enumerate() {
        pool.add_desk(DeskId(index as u32), desk.x, desk.y);
    }
    pool
}

pub fn build_stairs(config: &CanteenConfig) -> StairRegistry {
    let mut stairs = StairRegistry::new();
    for stair in &config.stairs {
        stairs.register(stair.level, stair.x);
    }
    stairs
}

/// Fills the catalog in file order. A repeated dish keeps its first weight.
pub fn build_catalog(config: &CanteenConfig) -> Result<OrderCatalog, CatalogError> {
    let mut catalog = OrderCatalog::new();
    for dish in &config.orders {
        catalog.insert(dish.name.clone(), dish.weight)?;
    }
    Ok(catalog)
}

/// What a facility was built with, for the startup banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub desks: usize,
    pub levels: usize,
    pub staircases: usize,
    pub dishes: usize,
}

pub fn layout_summary(pool: &DeskPool, stairs: &StairRegistry, catalog: &OrderCatalog) -> LayoutSummary {
    let levels: BTreeSet<i32> = pool.iter().map(|desk| desk.level).collect();
    LayoutSummary {
        desks: pool.len(),
        levels: levels.len(),
        staircases: stairs.len(),
        dishes: catalog.len(),
    }
}
