//! Domain models for Filed Recipes
//!
//! Contains the recipe record types without any I/O concerns.

mod recipe;

pub use recipe::{Ingredient, Recipe, RecipeError};
