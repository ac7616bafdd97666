//! Main CLI application structure

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::menu::Menu;
use super::output::{Output, OutputFormat};
use super::view::{continue_on_key_pressed, RecipeView};
use crate::storage::{Config, RecipeRepository};

#[derive(Parser)]
#[command(name = "recipes")]
#[command(author, version, about = "A recipe book kept in a plain text file")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Recipe file (overrides the configured one)
    #[arg(long, global = true, env = "RECIPES_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recipe names, sorted
    List,

    /// Show one recipe
    Show {
        /// Recipe number as printed by `list`
        number: usize,
    },

    /// Show every recipe, one at a time
    ShowAll {
        /// Do not wait for a key press between recipes
        #[arg(long)]
        no_pause: bool,
    },

    /// Delete a recipe and save the file
    Delete {
        /// Recipe number as printed by `list`
        #[arg(required_unless_present = "name", conflicts_with = "name")]
        number: Option<usize>,

        /// Delete by exact recipe name instead
        #[arg(long)]
        name: Option<String>,
    },

    /// Interactive menu (the default)
    Menu,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut output = Output::new(cli.format, cli.verbose);

    output.verbose("Filed Recipes starting");

    let config = Config::load()?;
    let file = cli.file.unwrap_or_else(|| config.recipes_file.clone());
    output.verbose_ctx("config", &format!("Recipe file: {}", file.display()));

    let repo = RecipeRepository::new(&file)?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::List => list(&mut output, repo)?,
        Commands::Show { number } => show(&mut output, repo, number)?,
        Commands::ShowAll { no_pause } => {
            let pause = config.pause_between_recipes && !no_pause;
            show_all(&mut output, repo, pause)?
        }
        Commands::Delete { number, name } => {
            delete(&mut output, repo, number, name.as_deref())?
        }
        Commands::Menu => {
            output.verbose_ctx("menu", "Starting interactive menu");
            let stdin = io::stdin();
            let mut menu = Menu::new(
                repo,
                stdin.lock(),
                io::stdout(),
                config.pause_between_recipes,
            );
            menu.run()?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}

fn open(output: &mut Output, mut repo: RecipeRepository) -> Result<RecipeRepository> {
    output.verbose_ctx("load", &format!("Loading {}", repo.path().display()));
    repo.load()
        .with_context(|| format!("Failed to load recipes from {}", repo.path().display()))?;
    output.verbose_ctx("load", &format!("Loaded {} recipes", repo.len()));
    Ok(repo)
}

/// Converts a 1-based recipe number to an index
fn index_of(number: usize, repo: &RecipeRepository) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) if index < repo.len() => Ok(index),
        _ => anyhow::bail!(
            "No recipe number {} (there are {} recipes)",
            number,
            repo.len()
        ),
    }
}

fn list(output: &mut Output, repo: RecipeRepository) -> Result<()> {
    let repo = open(output, repo)?;
    output.recipe_list(repo.path(), repo.get_all())?;
    Ok(())
}

fn show(output: &mut Output, repo: RecipeRepository, number: usize) -> Result<()> {
    let repo = open(output, repo)?;
    let recipe = repo.get_at(index_of(number, &repo)?)?;

    if output.is_json() {
        output.recipe_json(&recipe)?;
    } else {
        RecipeView::new(output.writer()).show(&recipe)?;
    }

    Ok(())
}

fn show_all(output: &mut Output, repo: RecipeRepository, pause: bool) -> Result<()> {
    let repo = open(output, repo)?;

    if output.is_json() {
        let recipes: Vec<_> = repo.get_all().collect();
        output.recipes_json(&recipes)?;
        return Ok(());
    }

    // Pausing only makes sense when someone is at the keyboard
    let pause = pause && io::stdin().is_terminal();
    output.verbose_ctx("show-all", &format!("Pause between recipes: {}", pause));

    let mut view = RecipeView::new(output.writer());
    view.show_all(repo.get_all(), |out| {
        if pause {
            continue_on_key_pressed(out)
        } else {
            writeln!(out)
        }
    })?;

    Ok(())
}

fn delete(
    output: &mut Output,
    repo: RecipeRepository,
    number: Option<usize>,
    name: Option<&str>,
) -> Result<()> {
    let mut repo = open(output, repo)?;

    let recipe = match (number, name) {
        (Some(number), _) => repo.get_at(index_of(number, &repo)?)?,
        (None, Some(name)) => repo
            .get_all()
            .find(|r| r.name() == name)
            .ok_or_else(|| anyhow::anyhow!("No recipe named '{}'", name))?,
        (None, None) => anyhow::bail!("Give a recipe number or --name"),
    };

    output.verbose_ctx("delete", &format!("Deleting '{}'", recipe.name()));
    repo.delete(&recipe);
    repo.save()
        .with_context(|| format!("Failed to save recipes to {}", repo.path().display()))?;

    output.deleted(recipe.name(), repo.len())?;
    Ok(())
}
