//! Interactive menu over one recipe file
//!
//! Reads numbered choices line by line, so it works both on a terminal and
//! with piped input.

use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use anyhow::Result;

use super::view::RecipeView;
use crate::storage::RecipeRepository;

/// A menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuCommand {
    Open,
    Save,
    Delete,
    Show,
    ShowAll,
    Exit,
}

impl MenuCommand {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuCommand::Open),
            "2" => Some(MenuCommand::Save),
            "3" => Some(MenuCommand::Delete),
            "4" => Some(MenuCommand::Show),
            "5" => Some(MenuCommand::ShowAll),
            "0" => Some(MenuCommand::Exit),
            _ => None,
        }
    }
}

/// Interactive menu state
pub struct Menu<R: BufRead, W: Write> {
    repo: RecipeRepository,
    input: R,
    view: RecipeView<W>,
    pause_between_recipes: bool,

    /// Bumped by the repository's change listener
    revision: Rc<Cell<u64>>,
    shown_revision: u64,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(mut repo: RecipeRepository, input: R, out: W, pause_between_recipes: bool) -> Self {
        let revision = Rc::new(Cell::new(0));
        let handle = Rc::clone(&revision);
        repo.on_change(move || handle.set(handle.get() + 1));

        Self {
            repo,
            input,
            view: RecipeView::new(out),
            pause_between_recipes,
            revision,
            shown_revision: 0,
        }
    }

    /// Runs until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;

            let Some(choice) = self.read_line()? else {
                return Ok(());
            };

            match MenuCommand::parse(&choice) {
                Some(MenuCommand::Open) => self.open()?,
                Some(MenuCommand::Save) => self.save()?,
                Some(MenuCommand::Delete) => self.delete()?,
                Some(MenuCommand::Show) => self.show()?,
                Some(MenuCommand::ShowAll) => self.show_all()?,
                Some(MenuCommand::Exit) => {
                    if self.confirm_exit()? {
                        return Ok(());
                    }
                }
                None => {
                    let out = self.view.writer();
                    writeln!(out, "Unknown choice '{}'.", choice.trim())?;
                }
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let mut title = format!("Filed Recipes ({} recipes", self.repo.len());
        if self.repo.is_modified() {
            title.push_str(", unsaved changes");
        }
        title.push(')');

        writeln!(self.view.writer())?;
        self.view.header_panel(&title)?;

        let out = self.view.writer();
        if self.revision.get() != self.shown_revision {
            self.shown_revision = self.revision.get();
            writeln!(out, "Recipe list updated.")?;
        }
        writeln!(out, "1. Open")?;
        writeln!(out, "2. Save")?;
        writeln!(out, "3. Delete recipe")?;
        writeln!(out, "4. Show recipe")?;
        writeln!(out, "5. Show all recipes")?;
        writeln!(out, "0. Exit")?;
        write!(out, "Choice: ")?;
        out.flush()
    }

    /// Reads one line of input, `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn open(&mut self) -> Result<()> {
        match self.repo.load() {
            Ok(()) => writeln!(
                self.view.writer(),
                "Loaded {} recipes from {}.",
                self.repo.len(),
                self.repo.path().display()
            )?,
            Err(e) => writeln!(self.view.writer(), "Error: {}", e)?,
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        match self.repo.save() {
            Ok(()) => writeln!(
                self.view.writer(),
                "Saved {} recipes to {}.",
                self.repo.len(),
                self.repo.path().display()
            )?,
            Err(e) => writeln!(self.view.writer(), "Error: {}", e)?,
        }
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let Some(index) = self.choose_recipe("delete")? else {
            return Ok(());
        };

        let recipe = self.repo.get_at(index)?;
        self.repo.delete(&recipe);
        writeln!(self.view.writer(), "Deleted '{}'.", recipe.name())?;
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let Some(index) = self.choose_recipe("show")? else {
            return Ok(());
        };

        let recipe = self.repo.get_at(index)?;
        self.view.show(&recipe)?;
        self.wait_for_enter()?;
        Ok(())
    }

    fn show_all(&mut self) -> Result<()> {
        if self.repo.is_empty() {
            writeln!(self.view.writer(), "No recipes loaded.")?;
            return Ok(());
        }

        let recipes: Vec<_> = self.repo.get_all().collect();
        let input = &mut self.input;
        let pause = self.pause_between_recipes;

        self.view.show_all(recipes, |out| {
            if pause {
                prompt_enter(out, &mut *input)
            } else {
                writeln!(out)
            }
        })?;
        Ok(())
    }

    /// Lists recipes and asks for a number; `None` means cancelled
    fn choose_recipe(&mut self, action: &str) -> Result<Option<usize>> {
        if self.repo.is_empty() {
            writeln!(self.view.writer(), "No recipes loaded.")?;
            return Ok(None);
        }

        let names: Vec<String> = self.repo.get_all().map(|r| r.name().to_string()).collect();

        loop {
            let out = self.view.writer();
            writeln!(out)?;
            for (i, name) in names.iter().enumerate() {
                writeln!(out, "{:>3}. {}", i + 1, name)?;
            }
            write!(out, "Recipe to {} (0 to cancel): ", action)?;
            out.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            match line.trim().parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(n) if n <= names.len() => return Ok(Some(n - 1)),
                _ => writeln!(
                    self.view.writer(),
                    "Enter a number between 0 and {}.",
                    names.len()
                )?,
            }
        }
    }

    fn confirm_exit(&mut self) -> Result<bool> {
        if !self.repo.is_modified() {
            return Ok(true);
        }

        let out = self.view.writer();
        write!(out, "There are unsaved changes. Exit anyway? (y/n): ")?;
        out.flush()?;

        let answer = self.read_line()?.unwrap_or_else(|| "y".to_string());
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn wait_for_enter(&mut self) -> io::Result<()> {
        prompt_enter(self.view.writer(), &mut self.input)
    }
}

fn prompt_enter<W: Write, R: BufRead>(out: &mut W, input: &mut R) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "Press Enter to continue...")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    writeln!(out)
}
