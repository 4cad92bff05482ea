use std::collections::{BTreeMap, HashMap};

use crate::id::ItemId;
use crate::rate::Rate;

/// One item/quantity pair in a recipe (product, ingredient, or byproduct).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeEntry {
    pub item: ItemId,
    pub quantity: u32,
}

/// A recipe: one run consumes the ingredients, produces the product plus
/// the byproducts, and takes `time` minutes. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub product: RecipeEntry,
    pub ingredients: Vec<RecipeEntry>,
    pub byproducts: Vec<RecipeEntry>,
    /// Minutes per run. Always positive (validated at build time).
    pub time: Rate,
}

impl Recipe {
    /// Items per minute a single fabrication unit running this recipe yields.
    pub fn product_rate(&self) -> Rate {
        Rate::from_num(self.product.quantity) / self.time
    }

    /// Items per minute one fabrication unit consumes or emits for `entry`.
    pub fn entry_rate(&self, entry: &RecipeEntry) -> Rate {
        Rate::from_num(entry.quantity) / self.time
    }
}

/// An item definition in the registry.
#[derive(Debug, Clone)]
pub struct ItemDef {
    pub name: String,
}

/// Builder for constructing an immutable [`Registry`].
/// Two-phase lifecycle: registration, then finalization via [`build`].
///
/// [`build`]: RegistryBuilder::build
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<ItemDef>,
    name_to_id: HashMap<String, ItemId>,
    recipes: BTreeMap<ItemId, Recipe>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item. Items with no recipe registered against them are
    /// ores: externally supplied, never fabricated.
    pub fn register_item(&mut self, name: &str) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        self.items.push(ItemDef {
            name: name.to_string(),
        });
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register the recipe producing `product.item`. A craftable item has
    /// exactly one recipe; registering a second is an error.
    pub fn register_recipe(
        &mut self,
        product: RecipeEntry,
        ingredients: Vec<RecipeEntry>,
        byproducts: Vec<RecipeEntry>,
        time: Rate,
    ) -> Result<(), RegistryError> {
        if self.recipes.contains_key(&product.item) {
            return Err(RegistryError::DuplicateRecipe(product.item));
        }
        self.recipes.insert(
            product.item,
            Recipe {
                product,
                ingredients,
                byproducts,
                time,
            },
        );
        Ok(())
    }

    /// Lookup item ID by name.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for recipe in self.recipes.values() {
            if recipe.time <= Rate::ZERO {
                return Err(RegistryError::InvalidDuration(recipe.product.item));
            }
            let entries = std::iter::once(&recipe.product)
                .chain(recipe.ingredients.iter())
                .chain(recipe.byproducts.iter());
            for entry in entries {
                if entry.item.0 as usize >= self.items.len() {
                    return Err(RegistryError::InvalidItemRef(entry.item));
                }
                if entry.quantity == 0 {
                    return Err(RegistryError::ZeroQuantity(recipe.product.item));
                }
            }
        }

        Ok(Registry {
            items: self.items,
            name_to_id: self.name_to_id,
            recipes: self.recipes,
        })
    }
}

/// Immutable item/recipe database. Frozen after build(). The planner only
/// ever reads from it.
#[derive(Debug)]
pub struct Registry {
    items: Vec<ItemDef>,
    name_to_id: HashMap<String, ItemId>,
    recipes: BTreeMap<ItemId, Recipe>,
}

impl Registry {
    /// Ores have no recipe and are assumed externally supplied.
    pub fn is_ore(&self, item: ItemId) -> bool {
        !self.recipes.contains_key(&item)
    }

    /// The recipe producing `item`, if it is craftable.
    pub fn recipe(&self, item: ItemId) -> Option<&Recipe> {
        self.recipes.get(&item)
    }

    pub fn get_item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.name_to_id.get(name).copied()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("item {0:?} already has a recipe")]
    DuplicateRecipe(ItemId),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemId),
    #[error("recipe for {0:?} has a non-positive duration")]
    InvalidDuration(ItemId),
    #[error("recipe for {0:?} has a zero-quantity entry")]
    ZeroQuantity(ItemId),
}
