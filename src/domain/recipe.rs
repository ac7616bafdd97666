//! Recipe domain model
//!
//! A recipe is a name plus an ordered list of ingredients and an ordered
//! list of instruction lines. Recipes are identified by name only: two
//! recipes with the same name compare equal even if their contents differ.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error("Recipe name cannot be empty")]
    EmptyName,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    /// Free-form quantity, e.g. "2" or "1/2"
    pub amount: String,

    /// Unit, e.g. "dl" or "st"
    pub measure: String,

    /// What the ingredient is
    pub name: String,
}

impl Ingredient {
    /// Creates a new ingredient
    pub fn new(
        amount: impl Into<String>,
        measure: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            measure: measure.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.amount, &self.measure, &self.name]
            .into_iter()
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// A cooking recipe
///
/// `Clone` is a deep copy: ingredient and instruction vectors are copied,
/// so a cloned recipe can be changed freely without touching the original.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    name: String,
    ingredients: Vec<Ingredient>,
    instructions: Vec<String>,
}

impl Recipe {
    /// Creates an empty recipe with the given name
    pub fn new(name: impl Into<String>) -> Result<Self, RecipeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RecipeError::EmptyName);
        }

        Ok(Self {
            name,
            ingredients: Vec::new(),
            instructions: Vec::new(),
        })
    }

    /// Returns the recipe name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ingredients in file order
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    /// Returns the instruction lines in file order
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// Appends an ingredient
    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
    }

    /// Appends an instruction line
    pub fn add_instruction(&mut self, line: impl Into<String>) {
        self.instructions.push(line.into());
    }
}

// Identity is the name alone; contents are not compared.
impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Recipe {}

impl PartialOrd for Recipe {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Recipe {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
