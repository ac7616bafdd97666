//! Filed Recipes - a console recipe book kept in a plain text file
//!
//! Recipes live in a line-oriented text file with `[Recept]`,
//! `[Ingredienser]` and `[Instruktioner]` section headers. The
//! [`RecipeRepository`] loads the file into memory, hands out copies,
//! deletes entries and writes the whole collection back.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Ingredient, Recipe, RecipeError};
pub use storage::{RecipeRepository, RepositoryError};
