//! Registry of loaded projects
//!
//! Keeps at most one live [`Project`] per normalized file path, so every
//! caller that asks for the same path shares the same instance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::conventions::ProjectConventions;
use super::error::ProjectError;
use super::paths::normalize_project_path;
use super::project::Project;

/// Shared handle to a registered project
pub type ProjectHandle = Rc<RefCell<Project>>;

/// Loaded projects keyed by normalized path
///
/// Dropping the registry unloads everything still registered.
#[derive(Debug)]
pub struct ProjectRegistry {
    projects: HashMap<PathBuf, ProjectHandle>,
    conventions: Rc<ProjectConventions>,
}

impl Default for ProjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectRegistry {
    /// Empty registry using the default conventions
    pub fn new() -> Self {
        Self::with_conventions(ProjectConventions::default())
    }

    /// Empty registry whose projects use `conventions`
    pub fn with_conventions(conventions: ProjectConventions) -> Self {
        Self {
            projects: HashMap::new(),
            conventions: Rc::new(conventions),
        }
    }

    /// Conventions shared by every project this registry loads
    pub fn conventions(&self) -> &ProjectConventions {
        &self.conventions
    }

    /// Load a project, replacing (and disposing) any instance already
    /// registered under the same path
    ///
    /// Fails with [`ProjectError::InUse`], leaving the registry unchanged,
    /// if the registered instance is currently borrowed.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<ProjectHandle, ProjectError> {
        let key = normalize_project_path(path.as_ref())?;
        self.ensure_replaceable(&key)?;
        if let Some(previous) = self.projects.remove(&key) {
            debug!(path = %key.display(), "replacing loaded project");
            release(&previous);
        }

        let project = Project::load(&key, Rc::clone(&self.conventions))?;
        let handle = Rc::new(RefCell::new(project));
        self.projects.insert(key.clone(), Rc::clone(&handle));
        info!(path = %key.display(), "loaded project");
        Ok(handle)
    }

    /// The registered instance for a path, if any
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<ProjectHandle> {
        let key = normalize_project_path(path.as_ref()).ok()?;
        self.projects.get(&key).cloned()
    }

    /// The registered instance for a path, loading it if needed
    pub fn get_or_load<P: AsRef<Path>>(&mut self, path: P) -> Result<ProjectHandle, ProjectError> {
        match self.get(path.as_ref()) {
            Some(handle) => Ok(handle),
            None => self.load(path),
        }
    }

    /// Dispose and forget the instance for a path. Returns whether one was
    /// registered.
    ///
    /// Never fails: an instance that is borrowed at the time is still
    /// forgotten but cannot be disposed, which is logged as a warning. Use
    /// [`ProjectRegistry::load`] or an overwriting clone to get an error
    /// instead.
    pub fn unload<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let Ok(key) = normalize_project_path(path.as_ref()) else {
            return false;
        };
        match self.projects.remove(&key) {
            Some(handle) => {
                release(&handle);
                info!(path = %key.display(), "unloaded project");
                true
            }
            None => false,
        }
    }

    /// Unload every registered project. Returns how many were unloaded.
    pub fn unload_all(&mut self) -> usize {
        let paths: Vec<PathBuf> = self.projects.keys().cloned().collect();
        let mut unloaded = 0;
        for path in paths {
            if self.unload(&path) {
                unloaded += 1;
            }
        }
        unloaded
    }

    /// Copy a project to a new path and register the copy
    ///
    /// Compiled-source includes are rewritten so they still point at the
    /// same files from the new directory, and gain a `Link` naming the file
    /// if they had none. The copy is only written when saved.
    ///
    /// Without `overwrite`, a target that is loaded or already exists on
    /// disk is refused. With it, any instance loaded at the target is
    /// unloaded first.
    pub fn clone_project<P: AsRef<Path>>(
        &mut self,
        source: &ProjectHandle,
        new_path: P,
        overwrite: bool,
    ) -> Result<ProjectHandle, ProjectError> {
        let new_path = new_path.as_ref();
        if new_path.as_os_str().is_empty() {
            return Err(ProjectError::InvalidArgument(
                "new project path must not be empty".to_string(),
            ));
        }
        let key = normalize_project_path(new_path)?;

        // Copy before unloading the target; the source may live there
        let (document, from_dir) = {
            let source = source.try_borrow().map_err(|_| {
                ProjectError::InvalidArgument("source project is being modified".to_string())
            })?;
            source.ensure_live()?;
            let from_dir = source.directory().ok_or_else(|| {
                ProjectError::InvalidArgument("source project has no file path".to_string())
            })?;
            (source.document().deep_clone(), from_dir)
        };

        if overwrite {
            self.ensure_replaceable(&key)?;
            self.unload(&key);
        } else if self.projects.contains_key(&key) {
            return Err(ProjectError::AlreadyLoaded(key));
        } else if key.exists() {
            return Err(ProjectError::AlreadyExists(key));
        }

        let mut document = document;
        document.set_path(key.clone());
        let mut project = Project::from_document(document, Rc::clone(&self.conventions));
        let rewritten = project.rebase_source_items(&from_dir)?;

        let handle = Rc::new(RefCell::new(project));
        self.projects.insert(key.clone(), Rc::clone(&handle));
        info!(
            from = %from_dir,
            to = %key.display(),
            rewritten,
            "cloned project"
        );
        Ok(handle)
    }

    /// Save a registered project to its own path
    pub fn save(&self, handle: &ProjectHandle) -> Result<(), ProjectError> {
        handle.borrow_mut().save()
    }

    /// Save every registered project, stopping at the first failure
    pub fn save_all(&self) -> Result<(), ProjectError> {
        for handle in self.projects.values() {
            self.save(handle)?;
        }
        Ok(())
    }

    /// Refuse to replace a registered instance that someone still borrows
    fn ensure_replaceable(&self, key: &Path) -> Result<(), ProjectError> {
        match self.projects.get(key) {
            Some(handle) if handle.try_borrow_mut().is_err() => {
                Err(ProjectError::InUse(key.to_path_buf()))
            }
            _ => Ok(()),
        }
    }

    /// Whether a project is registered under this path
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        normalize_project_path(path.as_ref())
            .map(|key| self.projects.contains_key(&key))
            .unwrap_or(false)
    }

    /// Number of registered projects
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Registered paths, in no particular order
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.projects.keys().map(PathBuf::as_path)
    }
}

impl Drop for ProjectRegistry {
    fn drop(&mut self) {
        let unloaded = self.unload_all();
        if unloaded > 0 {
            debug!(unloaded, "registry dropped");
        }
    }
}

/// Dispose a project that is leaving the registry
fn release(handle: &ProjectHandle) {
    match handle.try_borrow_mut() {
        Ok(mut project) => {
            project.dispose();
        }
        Err(_) => warn!("project is borrowed; removed without disposing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"<Project>
  <PropertyGroup>
    <ProjectGuid>{11111111-2222-3333-4444-555555555555}</ProjectGuid>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="System" />
    <Compile Include="Program.cs" />
  </ItemGroup>
</Project>
"#;

    fn write_project(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, MINIMAL).unwrap();
        path
    }

    #[test]
    fn test_lookup_normalizes_paths() {
        let dir = TempDir::new().unwrap();
        let path = write_project(dir.path(), "A/A.proj");
        let mut registry = ProjectRegistry::new();
        let handle = registry.load(&path).unwrap();

        let dotted = dir.path().join("A").join(".").join("..").join("A").join("A.proj");
        assert!(Rc::ptr_eq(&handle, &registry.get(&dotted).unwrap()));
        assert!(registry.contains(&dotted));
    }

    #[test]
    fn test_unload_disposes() {
        let dir = TempDir::new().unwrap();
        let path = write_project(dir.path(), "A.proj");
        let mut registry = ProjectRegistry::new();
        let handle = registry.load(&path).unwrap();

        assert!(registry.unload(&path));
        assert!(!registry.unload(&path));
        assert!(handle.borrow().is_disposed());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clone_rejects_empty_path() {
        let dir = TempDir::new().unwrap();
        let path = write_project(dir.path(), "A.proj");
        let mut registry = ProjectRegistry::new();
        let source = registry.load(&path).unwrap();

        let err = registry.clone_project(&source, "", false).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidArgument(_)));
    }

    #[test]
    fn test_clone_from_disposed_source_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_project(dir.path(), "A.proj");
        let mut registry = ProjectRegistry::new();
        let source = registry.load(&path).unwrap();
        registry.unload(&path);

        let err = registry
            .clone_project(&source, dir.path().join("B.proj"), false)
            .unwrap_err();
        assert!(matches!(err, ProjectError::Disposed));
    }

    #[test]
    fn test_borrowed_instance_is_not_replaced() {
        let dir = TempDir::new().unwrap();
        let path = write_project(dir.path(), "A.proj");
        let mut registry = ProjectRegistry::new();
        let first = registry.load(&path).unwrap();

        let guard = first.borrow();
        let err = registry.load(&path).unwrap_err();
        assert!(matches!(err, ProjectError::InUse(_)));
        assert!(err.is_invalid_operation());
        drop(guard);

        assert!(Rc::ptr_eq(&first, &registry.get(&path).unwrap()));
        assert!(!first.borrow().is_disposed());

        let second = registry.load(&path).unwrap();
        assert!(first.borrow().is_disposed());
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_overwrite_clone_refuses_borrowed_target() {
        let dir = TempDir::new().unwrap();
        let source_path = write_project(dir.path(), "A/A.proj");
        let target_path = write_project(dir.path(), "B/B.proj");
        let mut registry = ProjectRegistry::new();
        let source = registry.load(&source_path).unwrap();
        let target = registry.load(&target_path).unwrap();

        let _editing = target.borrow_mut();
        let err = registry
            .clone_project(&source, &target_path, true)
            .unwrap_err();
        assert!(matches!(err, ProjectError::InUse(_)));
        assert!(Rc::ptr_eq(&target, &registry.get(&target_path).unwrap()));
    }

    #[test]
    fn test_drop_disposes_everything() {
        let dir = TempDir::new().unwrap();
        let path = write_project(dir.path(), "A.proj");
        let handle = {
            let mut registry = ProjectRegistry::new();
            registry.load(&path).unwrap()
        };
        assert!(handle.borrow().is_disposed());
    }
}
