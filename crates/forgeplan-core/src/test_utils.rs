//! Shared test helpers for unit, integration, and property tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the helpers
//! are available to this crate's unit tests and, via the `test-utils`
//! feature, to the integration-tests crate.

use crate::id::ItemId;
use crate::rate::{rate, Rate};
use crate::registry::{RecipeEntry, Registry, RegistryBuilder};

/// Fixed-point helper.
pub fn fixed(v: f64) -> Rate {
    rate(v)
}

/// Every item in the standard test registry, by name.
pub struct StandardItems {
    // Ores
    pub hematite: ItemId,
    pub malachite: ItemId,
    pub limestone: ItemId,
    pub quartz: ItemId,
    pub bauxite: ItemId,
    pub natron: ItemId,
    pub petalite: ItemId,
    pub garnierite: ItemId,
    pub pyrite: ItemId,
    // Craftables
    pub pure_iron: ItemId,
    pub refined_copper: ItemId,
    pub slag: ItemId,
    pub gear: ItemId,
    pub circuit: ItemId,
    pub engine: ItemId,
    pub assembly_unit: ItemId,
}

fn entry(item: ItemId, quantity: u32) -> RecipeEntry {
    RecipeEntry { item, quantity }
}

/// Standard registry used across the test suites:
///
/// - `pure_iron`: 3 hematite -> 2 pure_iron per minute.
/// - `refined_copper`: 2 malachite -> 1 refined_copper + 1 slag per minute
///   (the byproduct recipe).
/// - `gear`: 1 pure_iron -> 1 gear per minute.
/// - `circuit`: 1 refined_copper -> 1 circuit per minute (pulls the
///   byproduct recipe through an intermediate buffer).
/// - `engine`: 24 pure_iron -> 1 engine per minute (a single ingredient
///   demand large enough to force split buffers upstream).
/// - `assembly_unit`: nine distinct ores with quantities 1..=9 -> 1 unit
///   per minute (the link-limit recipe).
pub fn standard_registry() -> (Registry, StandardItems) {
    let mut b = RegistryBuilder::new();

    let hematite = b.register_item("hematite");
    let malachite = b.register_item("malachite");
    let limestone = b.register_item("limestone");
    let quartz = b.register_item("quartz");
    let bauxite = b.register_item("bauxite");
    let natron = b.register_item("natron");
    let petalite = b.register_item("petalite");
    let garnierite = b.register_item("garnierite");
    let pyrite = b.register_item("pyrite");

    let pure_iron = b.register_item("pure_iron");
    let refined_copper = b.register_item("refined_copper");
    let slag = b.register_item("slag");
    let gear = b.register_item("gear");
    let circuit = b.register_item("circuit");
    let engine = b.register_item("engine");
    let assembly_unit = b.register_item("assembly_unit");

    b.register_recipe(
        entry(pure_iron, 2),
        vec![entry(hematite, 3)],
        vec![],
        fixed(1.0),
    )
    .unwrap();

    b.register_recipe(
        entry(refined_copper, 1),
        vec![entry(malachite, 2)],
        vec![entry(slag, 1)],
        fixed(1.0),
    )
    .unwrap();

    b.register_recipe(entry(gear, 1), vec![entry(pure_iron, 1)], vec![], fixed(1.0))
        .unwrap();

    b.register_recipe(
        entry(circuit, 1),
        vec![entry(refined_copper, 1)],
        vec![],
        fixed(1.0),
    )
    .unwrap();

    b.register_recipe(
        entry(engine, 1),
        vec![entry(pure_iron, 24)],
        vec![],
        fixed(1.0),
    )
    .unwrap();

    b.register_recipe(
        entry(assembly_unit, 1),
        vec![
            entry(hematite, 1),
            entry(malachite, 2),
            entry(limestone, 3),
            entry(quartz, 4),
            entry(bauxite, 5),
            entry(natron, 6),
            entry(petalite, 7),
            entry(garnierite, 8),
            entry(pyrite, 9),
        ],
        vec![],
        fixed(1.0),
    )
    .unwrap();

    let registry = b.build().expect("standard registry is well-formed");
    (
        registry,
        StandardItems {
            hematite,
            malachite,
            limestone,
            quartz,
            bauxite,
            natron,
            petalite,
            garnierite,
            pyrite,
            pure_iron,
            refined_copper,
            slag,
            gear,
            circuit,
            engine,
            assembly_unit,
        },
    )
}
