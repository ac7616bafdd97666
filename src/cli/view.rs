//! Console rendering of recipes

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

use crate::domain::Recipe;

const PANEL_WIDTH: usize = 40;
const RULE: &str = "_______________________________";

/// Renders recipes to a writer
pub struct RecipeView<W: Write> {
    out: W,
}

impl<W: Write> RecipeView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Gives access to the underlying writer
    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints a boxed header line
    pub fn header_panel(&mut self, title: &str) -> io::Result<()> {
        let width = PANEL_WIDTH.max(title.chars().count() + 2);
        writeln!(self.out, "╔{}╗", "═".repeat(width))?;
        writeln!(self.out, "║ {:<inner$} ║", title, inner = width - 2)?;
        writeln!(self.out, "╚{}╝", "═".repeat(width))
    }

    /// Prints one recipe: name panel, ingredients, numbered instructions
    pub fn show(&mut self, recipe: &Recipe) -> io::Result<()> {
        self.header_panel(recipe.name())?;

        writeln!(self.out)?;
        writeln!(self.out, "Ingredients:")?;
        writeln!(self.out, "{}", RULE)?;
        for ingredient in recipe.ingredients() {
            writeln!(self.out, "{}", ingredient)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "Instructions:")?;
        writeln!(self.out, "{}", RULE)?;
        for (i, line) in recipe.instructions().iter().enumerate() {
            writeln!(self.out, "<{}>", i + 1)?;
            writeln!(self.out, "{}", line)?;
        }

        Ok(())
    }

    /// Prints recipes one at a time, calling `between` after each one
    pub fn show_all<I, F>(&mut self, recipes: I, mut between: F) -> io::Result<()>
    where
        I: IntoIterator<Item = Recipe>,
        F: FnMut(&mut W) -> io::Result<()>,
    {
        for recipe in recipes {
            self.show(&recipe)?;
            between(&mut self.out)?;
        }
        Ok(())
    }
}

/// Waits for the user before continuing
///
/// On a terminal a single key press is enough; otherwise one line of
/// stdin is consumed (EOF also continues).
pub fn continue_on_key_pressed<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "Press any key to continue...")?;
    out.flush()?;

    if io::stdin().is_terminal() {
        wait_for_key()?;
        writeln!(out)?;
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
    }

    Ok(())
}

fn wait_for_key() -> io::Result<()> {
    terminal::enable_raw_mode()?;

    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };

    // Always leave raw mode, even if reading failed
    terminal::disable_raw_mode()?;
    result
}
