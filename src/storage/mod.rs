//! # Storage Layer
//!
//! Persistence for recipes in a plain, line-oriented text file.
//!
//! ## File Layout
//!
//! | Line | Meaning |
//! |------|---------|
//! | `[Recept]` | Next line is the name of a new recipe |
//! | `[Ingredienser]` | Following lines are `amount;measure;name` |
//! | `[Instruktioner]` | Following lines are instruction text |
//! | empty | Ignored |
//!
//! ## Key Types
//!
//! - [`RecipeRepository`] - In-memory collection bound to one recipe file
//! - [`format`] - Parser and writer for the text format
//! - [`Config`] - User configuration

pub mod format;
mod repository;
mod config;

pub use format::FormatError;
pub use repository::{RecipeRepository, RepositoryError};
pub use config::{Config, ConfigError, DEFAULT_RECIPES_FILE};
