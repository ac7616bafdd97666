//! Text format for recipe files
//!
//! Recipes are stored as plain text split into sections by header lines:
//!
//! ```text
//! [Recept]
//! Pancakes
//! [Ingredienser]
//! 2;dl;flour
//! [Instruktioner]
//! Mix.
//! ```
//!
//! Blank lines are ignored. Ingredient lines hold exactly three
//! `;`-separated fields (amount, measure, name), taken verbatim.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::domain::{Ingredient, Recipe};

/// Header that starts a new recipe; the next line is its name
pub const SECTION_RECIPE: &str = "[Recept]";

/// Header for the ingredient block of the current recipe
pub const SECTION_INGREDIENTS: &str = "[Ingredienser]";

/// Header for the instruction block of the current recipe
pub const SECTION_INSTRUCTIONS: &str = "[Instruktioner]";

const FIELD_SEPARATOR: char = ';';

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl FormatError {
    fn malformed(line: usize, reason: impl Into<String>) -> Self {
        FormatError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// How the next content line is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Indefinite,
    New,
    Ingredient,
    Instruction,
}

/// Parses every recipe from a reader, in file order
///
/// The result is not sorted; callers decide the order.
///
/// Bytes that are not valid UTF-8 (e.g. a Latin-1 file) are decoded with
/// replacement characters instead of failing the whole read.
pub fn parse<R: BufRead>(mut reader: R) -> Result<Vec<Recipe>, FormatError> {
    let mut state = ReadState::Indefinite;
    let mut recipes: Vec<Recipe> = Vec::new();
    let mut buf = Vec::new();
    let mut line_num = 0;

    loop {
        buf.clear();
        line_num += 1;
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| FormatError::Read {
                line: line_num,
                source,
            })?;
        if read == 0 {
            break;
        }

        let line = decode_line(&buf);

        match line.as_ref() {
            "" => continue,
            SECTION_RECIPE => state = ReadState::New,
            SECTION_INGREDIENTS => state = ReadState::Ingredient,
            SECTION_INSTRUCTIONS => state = ReadState::Instruction,
            content => match state {
                ReadState::New => {
                    // Empty lines were skipped above, so the name is never empty
                    let recipe = Recipe::new(content)
                        .map_err(|e| FormatError::malformed(line_num, e.to_string()))?;
                    recipes.push(recipe);
                }
                ReadState::Ingredient => {
                    let ingredient = parse_ingredient(content, line_num)?;
                    current(&mut recipes, line_num)?.add_ingredient(ingredient);
                }
                ReadState::Instruction => {
                    current(&mut recipes, line_num)?.add_instruction(content);
                }
                ReadState::Indefinite => {
                    return Err(FormatError::malformed(
                        line_num,
                        format!("content before any section header: '{}'", content),
                    ));
                }
            },
        }
    }

    Ok(recipes)
}

/// Strips the line ending and decodes, replacing invalid UTF-8
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

/// Returns the most recently started recipe
fn current(recipes: &mut [Recipe], line: usize) -> Result<&mut Recipe, FormatError> {
    recipes
        .last_mut()
        .ok_or_else(|| FormatError::malformed(line, "section content before any recipe name"))
}

fn parse_ingredient(line: &str, line_num: usize) -> Result<Ingredient, FormatError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

    match fields.as_slice() {
        [amount, measure, name] => Ok(Ingredient::new(*amount, *measure, *name)),
        _ => Err(FormatError::malformed(
            line_num,
            format!(
                "expected 3 ingredient fields separated by '{}', found {}",
                FIELD_SEPARATOR,
                fields.len()
            ),
        )),
    }
}

/// Writes recipes in the canonical format, in the given order
///
/// Every recipe gets all three headers, even when a section is empty.
pub fn write<'a, W, I>(writer: &mut W, recipes: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Recipe>,
{
    for recipe in recipes {
        writeln!(writer, "{}", SECTION_RECIPE)?;
        writeln!(writer, "{}", recipe.name())?;

        writeln!(writer, "{}", SECTION_INGREDIENTS)?;
        for ingredient in recipe.ingredients() {
            writeln!(
                writer,
                "{}{sep}{}{sep}{}",
                ingredient.amount,
                ingredient.measure,
                ingredient.name,
                sep = FIELD_SEPARATOR
            )?;
        }

        writeln!(writer, "{}", SECTION_INSTRUCTIONS)?;
        for line in recipe.instructions() {
            writeln!(writer, "{}", line)?;
        }
    }

    Ok(())
}
