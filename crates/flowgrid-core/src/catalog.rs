use crate::fixed::Fixed64;
use crate::id::*;
use std::collections::HashMap;

/// Largest per-batch quantity a recipe may name. Quantities enter rate
/// arithmetic as [`Fixed64`], whose integer part is an `i32`.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// One required input of a recipe: how many of an item a single batch uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeInput {
    pub item: ItemId,
    pub quantity: u32,
}

/// A recipe definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDef {
    pub name: String,
    /// Seconds per production cycle at full supply. Always positive once
    /// the catalog is built.
    pub batch_time: Fixed64,
    /// The item a batch produces.
    pub output: ItemId,
    pub output_quantity: u32,
    pub inputs: Vec<RecipeInput>,
}

/// Builder for constructing an immutable [`RecipeCatalog`].
/// Two-phase lifecycle: registration (with optional mutation) -> finalization.
#[derive(Debug, Default)]
pub struct RecipeCatalogBuilder {
    items: Vec<String>,
    item_name_to_id: HashMap<String, ItemId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
    duplicates: Vec<String>,
}

impl RecipeCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an item name, returning its ID. Repeated names share an ID.
    pub fn item(&mut self, name: &str) -> ItemId {
        if let Some(&id) = self.item_name_to_id.get(name) {
            return id;
        }
        let id = ItemId(self.items.len() as u32);
        self.items.push(name.to_string());
        self.item_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a recipe whose product is the item of the same name.
    ///
    /// Inputs are `(item name, quantity per batch)` pairs. Duplicate recipe
    /// names are reported by [`build`](Self::build).
    pub fn register_recipe(
        &mut self,
        name: &str,
        batch_time: Fixed64,
        output_quantity: u32,
        inputs: &[(&str, u32)],
    ) -> RecipeId {
        let output = self.item(name);
        let inputs = inputs
            .iter()
            .map(|&(item, quantity)| RecipeInput {
                item: self.item(item),
                quantity,
            })
            .collect();

        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(RecipeDef {
            name: name.to_string(),
            batch_time,
            output,
            output_quantity,
            inputs,
        });
        if self.recipe_name_to_id.contains_key(name) {
            self.duplicates.push(name.to_string());
        } else {
            self.recipe_name_to_id.insert(name.to_string(), id);
        }
        id
    }

    /// Mutate an existing recipe by name before the catalog is frozen.
    pub fn mutate_recipe<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut RecipeDef),
    {
        let id = self
            .recipe_name_to_id
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        f(&mut self.recipes[id.0 as usize]);
        Ok(())
    }

    /// Lookup recipe ID by name.
    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable catalog.
    pub fn build(self) -> Result<RecipeCatalog, CatalogError> {
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(CatalogError::DuplicateRecipe(name));
        }
        for recipe in &self.recipes {
            if recipe.batch_time <= Fixed64::ZERO {
                return Err(CatalogError::NonPositiveBatchTime(recipe.name.clone()));
            }
            let quantities = std::iter::once(recipe.output_quantity)
                .chain(recipe.inputs.iter().map(|input| input.quantity));
            for quantity in quantities {
                if quantity > MAX_QUANTITY {
                    return Err(CatalogError::QuantityOutOfRange {
                        recipe: recipe.name.clone(),
                        quantity,
                    });
                }
            }
            // Full-speed rate must fit Fixed64; every slower rate then does too.
            if Fixed64::from_num(recipe.output_quantity)
                .checked_div(recipe.batch_time)
                .is_none()
            {
                return Err(CatalogError::BatchTimeTooShort(recipe.name.clone()));
            }
            for input in &recipe.inputs {
                if input.item.0 as usize >= self.items.len() {
                    return Err(CatalogError::InvalidItemRef(input.item));
                }
            }
        }

        Ok(RecipeCatalog {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
            recipes: self.recipes,
            recipe_name_to_id: self.recipe_name_to_id,
        })
    }
}

/// Immutable recipe catalog. Frozen after build(), shared by reference with
/// every engine that analyzes a layout.
#[derive(Debug)]
pub struct RecipeCatalog {
    items: Vec<String>,
    item_name_to_id: HashMap<String, ItemId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
}

impl RecipeCatalog {
    pub fn recipe(&self, id: RecipeId) -> Option<&RecipeDef> {
        self.recipes.get(id.0 as usize)
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    /// Lookup a recipe definition directly by its name.
    pub fn recipe_by_name(&self, name: &str) -> Option<&RecipeDef> {
        self.recipe_id(name).and_then(|id| self.recipe(id))
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn item_name(&self, id: ItemId) -> Option<&str> {
        self.items.get(id.0 as usize).map(String::as_str)
    }

    pub fn recipes(&self) -> impl Iterator<Item = (RecipeId, &RecipeDef)> {
        self.recipes
            .iter()
            .enumerate()
            .map(|(i, r)| (RecipeId(i as u32), r))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("recipe not found: {0}")]
    NotFound(String),
    #[error("duplicate recipe: {0}")]
    DuplicateRecipe(String),
    #[error("recipe {0} has a non-positive batch time")]
    NonPositiveBatchTime(String),
    #[error("recipe {recipe} has out-of-range quantity {quantity}")]
    QuantityOutOfRange { recipe: String, quantity: u32 },
    #[error("recipe {0} has a batch time too short for its output rate to be represented")]
    BatchTimeTooShort(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemId),
}
