//! File-backed recipe repository
//!
//! Holds the in-memory recipe collection bound to one text file.
//! Reads hand out deep copies; mutations raise a change notification.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::format::{self, FormatError};
use crate::domain::Recipe;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Invalid recipe file path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid recipe file format at line {line}: {reason}")]
    FileFormat { line: usize, reason: String },

    #[error("Failed to access recipe file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Recipe index {index} is out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },
}

impl RepositoryError {
    fn io(path: &Path, source: io::Error) -> Self {
        RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        RepositoryError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

type ChangeListeners = Vec<Box<dyn FnMut()>>;

/// Recipe collection bound to a text file
pub struct RecipeRepository {
    recipes: Vec<Recipe>,
    path: PathBuf,
    modified: bool,
    listeners: ChangeListeners,
}

impl fmt::Debug for RecipeRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeRepository")
            .field("path", &self.path)
            .field("recipes", &self.recipes.len())
            .field("modified", &self.modified)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl RecipeRepository {
    /// Creates an empty repository bound to `path`
    ///
    /// The path is made absolute but the file is not touched; it does not
    /// need to exist until [`load`](Self::load) is called.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let raw = path.as_ref();
        let shown = raw.to_string_lossy();

        if raw.to_str().is_some_and(|s| s.trim().is_empty()) {
            return Err(RepositoryError::invalid_path(&shown, "path is empty"));
        }
        if raw.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(RepositoryError::invalid_path(&shown, "path contains a NUL byte"));
        }

        let resolved =
            std::path::absolute(raw).map_err(|e| RepositoryError::invalid_path(&shown, e.to_string()))?;

        if resolved.file_name().is_none() {
            return Err(RepositoryError::invalid_path(&shown, "path does not name a file"));
        }

        Ok(Self {
            recipes: Vec::new(),
            path: resolved,
            modified: false,
            listeners: Vec::new(),
        })
    }

    /// Returns the absolute path of the recipe file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the collection changed since the last load or save
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Registers a callback run after every load, delete and save
    pub fn on_change(&mut self, listener: impl FnMut() + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify_changed(&mut self) {
        for listener in self.listeners.iter_mut() {
            listener();
        }
    }

    /// Returns copies of all recipes in the current order
    pub fn get_all(&self) -> impl Iterator<Item = Recipe> + '_ {
        self.recipes.iter().cloned()
    }

    /// Returns a copy of the recipe at `index`
    pub fn get_at(&self, index: usize) -> Result<Recipe, RepositoryError> {
        self.internal(index).cloned()
    }

    fn internal(&self, index: usize) -> Result<&Recipe, RepositoryError> {
        self.recipes.get(index).ok_or(RepositoryError::OutOfRange {
            index,
            len: self.recipes.len(),
        })
    }

    /// Removes the stored recipe equal to `recipe`
    ///
    /// Equality is by name, so any copy handed out by a read works. When
    /// nothing matches the collection is untouched, but it is still marked
    /// modified and listeners are still notified.
    pub fn delete(&mut self, recipe: &Recipe) {
        if let Some(pos) = self.recipes.iter().position(|r| r == recipe) {
            self.recipes.remove(pos);
        }
        self.modified = true;
        self.notify_changed();
    }

    /// Deletes the recipe found at `index`
    ///
    /// Same as [`delete`](Self::delete) with that recipe, so with duplicate
    /// names the first recipe of that name is the one removed.
    pub fn delete_at(&mut self, index: usize) -> Result<(), RepositoryError> {
        let recipe = self.internal(index)?.clone();
        self.delete(&recipe);
        Ok(())
    }

    /// Replaces the collection with the contents of the recipe file
    ///
    /// Recipes are sorted by name. Nothing changes if reading or parsing fails.
    pub fn load(&mut self) -> Result<(), RepositoryError> {
        let file = File::open(&self.path).map_err(|e| RepositoryError::io(&self.path, e))?;

        let mut recipes = format::parse(BufReader::new(file)).map_err(|e| match e {
            FormatError::Malformed { line, reason } => RepositoryError::FileFormat { line, reason },
            FormatError::Read { source, .. } => RepositoryError::io(&self.path, source),
        })?;

        recipes.sort();
        recipes.shrink_to_fit();

        self.recipes = recipes;
        self.modified = false;
        self.notify_changed();
        Ok(())
    }

    /// Writes the whole collection to the recipe file, replacing its contents
    ///
    /// Output goes to a temp file next to the target that is then renamed
    /// over it. A symlinked target is resolved first so the link survives,
    /// and the existing file's permissions are carried over.
    pub fn save(&mut self) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RepositoryError::io(parent, e))?;
        }

        let target = match fs::canonicalize(&self.path) {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.path.clone(),
            Err(e) => return Err(RepositoryError::io(&self.path, e)),
        };
        let permissions = fs::metadata(&target).ok().map(|m| m.permissions());
        let temp_path = temp_path_for(&target);

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| RepositoryError::io(&temp_path, e))?;

            if let Some(permissions) = permissions {
                file.set_permissions(permissions).map_err(|e| {
                    let _ = fs::remove_file(&temp_path);
                    RepositoryError::io(&temp_path, e)
                })?;
            }

            let mut writer = BufWriter::new(file);
            format::write(&mut writer, &self.recipes)
                .and_then(|_| writer.flush())
                .map_err(|e| {
                    let _ = fs::remove_file(&temp_path);
                    RepositoryError::io(&temp_path, e)
                })?;
        }

        fs::rename(&temp_path, &target).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            RepositoryError::io(&target, e)
        })?;

        self.modified = false;
        self.notify_changed();
        Ok(())
    }
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    use crate::domain::Ingredient;

    const TWO_RECIPES: &str = "\
[Recept]
Zebra Cake
[Ingredienser]
1;st;zebra
[Instruktioner]
Bake.
[Recept]
Apple Pie
[Ingredienser]
3;st;apples
[Instruktioner]
Peel.
Bake.
";

    fn repo_with(dir: &TempDir, content: &str) -> RecipeRepository {
        let path = dir.path().join("recipes.txt");
        fs::write(&path, content).unwrap();
        RecipeRepository::new(path.to_str().unwrap()).unwrap()
    }

    fn loaded(dir: &TempDir) -> RecipeRepository {
        let mut repo = repo_with(dir, TWO_RECIPES);
        repo.load().unwrap();
        repo
    }

    fn counter(repo: &mut RecipeRepository) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        repo.on_change(move || handle.set(handle.get() + 1));
        count
    }

    fn names(repo: &RecipeRepository) -> Vec<String> {
        repo.get_all().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn new_does_not_touch_filesystem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("recipes.txt");

        let repo = RecipeRepository::new(path.to_str().unwrap()).unwrap();

        assert!(repo.is_empty());
        assert!(!repo.is_modified());
        assert!(!path.exists());
    }

    #[test]
    fn new_resolves_relative_path() {
        let repo = RecipeRepository::new("recipes.txt").unwrap();
        assert!(repo.path().is_absolute());
        assert!(repo.path().ends_with("recipes.txt"));
    }

    #[test]
    fn new_rejects_bad_paths() {
        for bad in ["", "   ", "recipes\0.txt", "/"] {
            assert!(
                matches!(
                    RecipeRepository::new(bad),
                    Err(RepositoryError::InvalidPath { .. })
                ),
                "expected InvalidPath for {:?}",
                bad
            );
        }
    }

    #[test]
    fn load_sorts_by_name() {
        let dir = TempDir::new().unwrap();
        let repo = loaded(&dir);

        assert_eq!(names(&repo), ["Apple Pie", "Zebra Cake"]);
        assert!(!repo.is_modified());
    }

    #[test]
    fn load_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);

        fs::write(repo.path(), "[Recept]\nWaffles\n").unwrap();
        repo.load().unwrap();

        assert_eq!(names(&repo), ["Waffles"]);
    }

    #[test]
    fn load_notifies_listeners() {
        let dir = TempDir::new().unwrap();
        let mut repo = repo_with(&dir, TWO_RECIPES);
        let count = counter(&mut repo);

        repo.load().unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.txt");
        let mut repo = RecipeRepository::new(path.to_str().unwrap()).unwrap();

        assert!(matches!(repo.load(), Err(RepositoryError::Io { .. })));
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        repo.delete_at(0).unwrap();
        let count = counter(&mut repo);

        fs::write(repo.path(), "[Recept]\nPancakes\n[Ingredienser]\n2;dl\n").unwrap();
        let err = repo.load().unwrap_err();

        assert!(matches!(err, RepositoryError::FileFormat { line: 4, .. }));
        assert_eq!(names(&repo), ["Zebra Cake"]);
        assert!(repo.is_modified());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn io_failure_on_load_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        repo.delete_at(0).unwrap();
        let count = counter(&mut repo);

        fs::remove_file(repo.path()).unwrap();
        let err = repo.load().unwrap_err();

        assert!(matches!(err, RepositoryError::Io { .. }));
        assert_eq!(names(&repo), ["Zebra Cake"]);
        assert!(repo.is_modified());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn load_latin1_file_decodes_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipes.txt");
        fs::write(&path, b"[Recept]\nK\xf6ttbullar\n[Instruktioner]\nStek.\n").unwrap();
        let mut repo = RecipeRepository::new(&path).unwrap();

        repo.load().unwrap();

        assert_eq!(names(&repo), ["K\u{FFFD}ttbullar"]);
        assert_eq!(repo.get_at(0).unwrap().instructions(), ["Stek."]);
    }

    #[test]
    fn content_before_header_is_format_error() {
        let dir = TempDir::new().unwrap();
        let mut repo = repo_with(&dir, "Pancakes\n");

        assert!(matches!(
            repo.load(),
            Err(RepositoryError::FileFormat { line: 1, .. })
        ));
    }

    #[test]
    fn get_at_returns_copy() {
        let dir = TempDir::new().unwrap();
        let repo = loaded(&dir);

        let mut copy = repo.get_at(0).unwrap();
        copy.add_ingredient(Ingredient::new("1", "dl", "cream"));
        copy.add_instruction("Serve.");

        let stored = repo.get_at(0).unwrap();
        assert_eq!(stored.ingredients().len(), 1);
        assert_eq!(stored.instructions().len(), 2);
    }

    #[test]
    fn get_all_returns_copies() {
        let dir = TempDir::new().unwrap();
        let repo = loaded(&dir);

        for mut recipe in repo.get_all() {
            recipe.add_instruction("Extra.");
        }

        assert!(repo.get_all().all(|r| !r.instructions().contains(&"Extra.".to_string())));
    }

    #[test]
    fn get_at_out_of_range() {
        let dir = TempDir::new().unwrap();
        let repo = loaded(&dir);

        assert!(matches!(
            repo.get_at(2),
            Err(RepositoryError::OutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn delete_by_copy_removes_match() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        let count = counter(&mut repo);

        let copy = repo.get_at(1).unwrap();
        repo.delete(&copy);

        assert_eq!(names(&repo), ["Apple Pie"]);
        assert!(repo.is_modified());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn delete_by_fresh_instance_with_same_name() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);

        repo.delete(&Recipe::new("Apple Pie").unwrap());
        assert_eq!(names(&repo), ["Zebra Cake"]);
    }

    #[test]
    fn delete_without_match_still_marks_modified() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        let count = counter(&mut repo);

        repo.delete(&Recipe::new("Lasagne").unwrap());

        assert_eq!(repo.len(), 2);
        assert!(repo.is_modified());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn delete_at_removes_entry() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        let count = counter(&mut repo);

        repo.delete_at(0).unwrap();

        assert_eq!(names(&repo), ["Zebra Cake"]);
        assert!(repo.is_modified());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn delete_at_with_duplicate_names_removes_first_match() {
        let dir = TempDir::new().unwrap();
        let mut repo = repo_with(
            &dir,
            "[Recept]\nCake\n[Instruktioner]\nA\n[Recept]\nCake\n[Instruktioner]\nB\n",
        );
        repo.load().unwrap();
        let count = counter(&mut repo);

        repo.delete_at(1).unwrap();

        let remaining: Vec<Vec<String>> =
            repo.get_all().map(|r| r.instructions().to_vec()).collect();
        assert_eq!(remaining, vec![vec!["B".to_string()]]);
        assert!(repo.is_modified());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn delete_at_out_of_range() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        let count = counter(&mut repo);

        assert!(matches!(
            repo.delete_at(5),
            Err(RepositoryError::OutOfRange { index: 5, len: 2 })
        ));
        assert!(!repo.is_modified());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn save_writes_canonical_file() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        repo.delete_at(1).unwrap();
        let count = counter(&mut repo);

        repo.save().unwrap();

        assert!(!repo.is_modified());
        assert_eq!(count.get(), 1);
        assert_eq!(
            fs::read_to_string(repo.path()).unwrap(),
            "[Recept]\nApple Pie\n[Ingredienser]\n3;st;apples\n[Instruktioner]\nPeel.\nBake.\n"
        );
    }

    #[test]
    fn save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);

        repo.save().unwrap();
        let first = fs::read(repo.path()).unwrap();
        repo.save().unwrap();
        let second = fs::read(repo.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);
        let before: Vec<Recipe> = repo.get_all().collect();

        repo.save().unwrap();
        repo.load().unwrap();
        let after: Vec<Recipe> = repo.get_all().collect();

        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.name(), b.name());
            assert_eq!(a.ingredients(), b.ingredients());
            assert_eq!(a.instructions(), b.instructions());
        }
    }

    #[test]
    fn save_creates_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("recipes.txt");
        let mut repo = RecipeRepository::new(path.to_str().unwrap()).unwrap();

        repo.save().unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded(&dir);

        repo.save().unwrap();

        assert!(!dir.path().join("recipes.txt.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn save_through_symlink_keeps_link_and_permissions() {
        use std::os::unix::fs::{symlink, PermissionsExt};

        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.txt");
        fs::write(&real, TWO_RECIPES).unwrap();
        fs::set_permissions(&real, fs::Permissions::from_mode(0o600)).unwrap();
        let link = dir.path().join("recipes.txt");
        symlink(&real, &link).unwrap();

        let mut repo = RecipeRepository::new(&link).unwrap();
        repo.load().unwrap();
        repo.delete_at(0).unwrap();
        repo.save().unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        let saved = fs::read_to_string(&real).unwrap();
        assert!(!saved.contains("Apple Pie"));
        assert!(saved.contains("Zebra Cake"));
        let mode = fs::metadata(&real).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let dir = TempDir::new().unwrap();
        let mut repo = repo_with(&dir, TWO_RECIPES);
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));

        for id in 0..3 {
            let log = Rc::clone(&log);
            repo.on_change(move || log.borrow_mut().push(id));
        }
        repo.load().unwrap();

        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }
}
