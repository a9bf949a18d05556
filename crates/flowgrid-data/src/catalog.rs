//! Recipe catalog loading.

use flowgrid_core::catalog::{CatalogError, RecipeCatalog, RecipeCatalogBuilder};
use flowgrid_core::fixed::Fixed64;
use std::path::Path;

use crate::loader::{DataLoadError, Format, INLINE_ORIGIN, deserialize_list, parse_list_str};
use crate::schema::RecipeData;

/// TOML files keep the recipe list under this key.
const RECIPES_KEY: &str = "recipes";

/// Build a catalog from parsed recipe entries, in file order.
///
/// Times that are not finite or do not fit the fixed-point range are
/// rejected as non-positive batch times.
pub fn build_catalog(recipes: &[RecipeData]) -> Result<RecipeCatalog, CatalogError> {
    let mut builder = RecipeCatalogBuilder::new();
    for recipe in recipes {
        let batch_time = Fixed64::checked_from_num(recipe.time).unwrap_or(Fixed64::ZERO);
        let inputs: Vec<(&str, u32)> = recipe
            .items
            .iter()
            .map(|item| (item.name.as_str(), item.qty))
            .collect();
        builder.register_recipe(&recipe.name, batch_time, recipe.produce_qty, &inputs);
    }
    let catalog = builder.build()?;
    log::info!(
        "recipe catalog: {} recipe(s), {} item(s)",
        catalog.recipe_count(),
        catalog.item_count()
    );
    Ok(catalog)
}

/// Load a recipe catalog file (RON, TOML or JSON).
pub fn load_catalog(path: &Path) -> Result<RecipeCatalog, DataLoadError> {
    let recipes: Vec<RecipeData> = deserialize_list(path, RECIPES_KEY)?;
    Ok(build_catalog(&recipes)?)
}

/// Load a recipe catalog from an in-memory document.
pub fn load_catalog_str(content: &str, format: Format) -> Result<RecipeCatalog, DataLoadError> {
    let recipes: Vec<RecipeData> =
        parse_list_str(content, format, RECIPES_KEY, Path::new(INLINE_ORIGIN))?;
    Ok(build_catalog(&recipes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_core::test_utils::assert_rate_eq;

    const GEAR_JSON: &str = r#"[
        {"name": "iron-gear-wheel", "time": 0.5, "produce-qty": 1,
         "items": [{"name": "iron-plate", "qty": 2}]},
        {"name": "copper-cable", "time": 0.5, "produce-qty": 2,
         "items": [{"name": "copper-plate", "qty": 1}]}
    ]"#;

    #[test]
    fn json_catalog_loads() {
        let catalog = load_catalog_str(GEAR_JSON, Format::Json).unwrap();
        assert_eq!(catalog.recipe_count(), 2);
        let cable = catalog.recipe_by_name("copper-cable").unwrap();
        assert_eq!(cable.output_quantity, 2);
        assert_rate_eq(cable.batch_time, 0.5);
        assert_eq!(catalog.item_name(cable.inputs[0].item), Some("copper-plate"));
        assert_eq!(cable.inputs[0].quantity, 1);
    }

    #[test]
    fn toml_catalog_loads() {
        let toml = r#"
[[recipes]]
name = "iron-gear-wheel"
time = 0.5
produce-qty = 1
items = [{ name = "iron-plate", qty = 2 }]
"#;
        let catalog = load_catalog_str(toml, Format::Toml).unwrap();
        let gear = catalog.recipe_by_name("iron-gear-wheel").unwrap();
        assert_eq!(gear.inputs.len(), 1);
    }

    #[test]
    fn missing_produce_qty_defaults_to_one() {
        let json = r#"[{"name": "iron-plate", "time": 3.2}]"#;
        let catalog = load_catalog_str(json, Format::Json).unwrap();
        let plate = catalog.recipe_by_name("iron-plate").unwrap();
        assert_eq!(plate.output_quantity, 1);
        assert!(plate.inputs.is_empty());
    }

    #[test]
    fn duplicate_recipe_is_catalog_error() {
        let json = r#"[{"name": "a", "time": 1}, {"name": "a", "time": 2}]"#;
        let err = load_catalog_str(json, Format::Json).unwrap_err();
        assert!(matches!(err, DataLoadError::Catalog(CatalogError::DuplicateRecipe(ref n)) if n == "a"));
    }

    #[test]
    fn zero_and_out_of_range_times_rejected() {
        let recipes = [RecipeData {
            name: "instant".into(),
            time: 0.0,
            produce_qty: 1,
            items: vec![],
        }];
        assert_eq!(
            build_catalog(&recipes).unwrap_err(),
            CatalogError::NonPositiveBatchTime("instant".into())
        );

        let recipes = [RecipeData {
            name: "forever".into(),
            time: 1e300,
            produce_qty: 1,
            items: vec![],
        }];
        assert!(matches!(
            build_catalog(&recipes),
            Err(CatalogError::NonPositiveBatchTime(_))
        ));
    }
}
