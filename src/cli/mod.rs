//! # Command-Line Interface
//!
//! User-facing commands, recipe rendering and the interactive menu.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `list` | Numbered, sorted recipe names |
//! | `show <n>` | One recipe |
//! | `show-all` | Every recipe, pausing between them |
//! | `delete <n>` / `delete --name <name>` | Remove a recipe and save |
//! | `menu` | Interactive menu (default) |
//!
//! ## Output Formats
//!
//! `--format json` switches `list`, `show`, `show-all` and `delete` to
//! machine-parseable JSON. `--verbose` (or `-v`) prints debug lines to stderr.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod view;
mod menu;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
pub use view::{RecipeView, continue_on_key_pressed};
pub use menu::Menu;
