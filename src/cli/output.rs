//! Command output in text or JSON
//!
//! Results go to one writer (stdout in the binary), `--verbose` diagnostics
//! to another (stderr). Both are injectable so the shapes can be tested.

use std::io::{self, Stderr, Stdout, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::Recipe;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One line of `list` output
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    number: usize,
    name: &'a str,
    ingredients: usize,
    instructions: usize,
}

pub struct Output<W = Stdout, E = Stderr> {
    format: OutputFormat,
    verbose: bool,
    out: W,
    diag: E,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self::with_writers(format, verbose, io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> Output<W, E> {
    pub fn with_writers(format: OutputFormat, verbose: bool, out: W, diag: E) -> Self {
        Self {
            format,
            verbose,
            out,
            diag,
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writer for text rendering done by the caller
    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_writers(self) -> (W, E) {
        (self.out, self.diag)
    }

    /// Prints the numbered recipe list, numbers starting at 1
    pub fn recipe_list<I>(&mut self, source: &Path, recipes: I) -> io::Result<()>
    where
        I: IntoIterator<Item = Recipe>,
    {
        let recipes: Vec<Recipe> = recipes.into_iter().collect();

        if self.is_json() {
            let entries: Vec<_> = recipes
                .iter()
                .enumerate()
                .map(|(i, r)| ListEntry {
                    number: i + 1,
                    name: r.name(),
                    ingredients: r.ingredients().len(),
                    instructions: r.instructions().len(),
                })
                .collect();
            return self.json(&entries);
        }

        if recipes.is_empty() {
            return writeln!(self.out, "No recipes in {}", source.display());
        }
        for (i, recipe) in recipes.iter().enumerate() {
            writeln!(self.out, "{:>3}. {}", i + 1, recipe.name())?;
        }
        Ok(())
    }

    pub fn recipe_json(&mut self, recipe: &Recipe) -> io::Result<()> {
        self.json(recipe)
    }

    /// Prints recipes as a JSON array, even when there is only one
    pub fn recipes_json(&mut self, recipes: &[Recipe]) -> io::Result<()> {
        self.json(recipes)
    }

    /// Reports a deletion
    pub fn deleted(&mut self, name: &str, remaining: usize) -> io::Result<()> {
        if self.is_json() {
            self.json(&serde_json::json!({
                "deleted": name,
                "remaining": remaining,
            }))
        } else {
            writeln!(self.out, "Deleted recipe '{}'", name)
        }
    }

    fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }

    /// Prints a debug line (only when --verbose is set)
    pub fn verbose(&mut self, message: &str) {
        if self.verbose {
            let _ = writeln!(self.diag, "[verbose] {}", message);
        }
    }

    /// Prints a debug line tagged with the step it belongs to
    pub fn verbose_ctx(&mut self, context: &str, message: &str) {
        if self.verbose {
            let _ = writeln!(self.diag, "[verbose:{}] {}", context, message);
        }
    }
}
