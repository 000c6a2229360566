//! Project management
//!
//! Locates the project, discovers its headers and wires configuration into
//! the resolve and merge pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, CONFIG_FILE};
use super::headers::FsHeaderSource;
use crate::domain::{
    ApiCatalog, DependencyResolver, HeaderId, MergeOptions, MergedDocument, Merger,
    OrderedHeaders, DEFAULT_SIGNATURE,
};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in an amalgam project. Run 'amalgam init' first.")]
    NotInProject,

    #[error("Header directory not found: {0}")]
    MissingHeaderDir(PathBuf),

    #[error("Header file name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),

    #[error("API catalog cache not found at {0}; fetching the documentation is not supported")]
    MissingApiCache(PathBuf),
}

/// Headers resolved for one run
pub struct Resolution {
    pub roots: Vec<HeaderId>,
    pub headers: OrderedHeaders,
    pub parses: usize,
}

/// An amalgam project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(CONFIG_FILE).is_file() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create project directory: {}", root.display()))?;

        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            let default_config = r#"# amalgam configuration
# All keys are optional; the values below are the defaults.

# Header identities are relative to this directory
include_root = "include"

# License commented into the merged header
license = "LICENSE"

# Default merged header path
output = "include/uvcxx-single.h"

guard_macro = "UVCXX_H"
umbrella_include = "uv.h"
version_header = "uvcxx/cxx/version.h"
first_header = "uvcxx/utils/standard.h"

# Headers are discovered in <include_root>/<header_prefix>/<dir> for each dir
header_prefix = "uvcxx"
header_dirs = ["utils", "cxx", "inner", ""]
header_extension = "h"

[coverage]
api_cache = "scripts/libuv_api.json"
corpus_dir = "include/uvcxx"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the include root directory
    pub fn include_root(&self) -> PathBuf {
        self.root.join(&self.config.project.include_root)
    }

    /// Returns the header source for the include root
    pub fn header_source(&self) -> FsHeaderSource {
        FsHeaderSource::new(self.include_root())
    }

    /// Lists the root headers: the first header, then each header directory
    ///
    /// Files within a directory are sorted by name so runs are reproducible.
    pub fn list_header_files(&self) -> Result<Vec<HeaderId>> {
        let project = &self.config.project;
        let mut headers = Vec::new();

        if let Some(first) = non_empty(project.first_header.as_deref()) {
            headers.push(HeaderId::new(first).context("Invalid first_header")?);
        }

        let prefix_dir = self.include_root().join(&project.header_prefix);
        for dir in &project.header_dirs {
            let path = prefix_dir.join(dir);
            if !path.is_dir() {
                return Err(ProjectError::MissingHeaderDir(path).into());
            }

            let mut names = Vec::new();
            for entry in fs::read_dir(&path)
                .with_context(|| format!("Failed to list headers in {}", path.display()))?
            {
                let entry = entry?;
                let file_path = entry.path();
                if !file_path.is_file() {
                    continue;
                }
                let matches_ext = file_path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(&project.header_extension));
                if !matches_ext {
                    continue;
                }
                let name = entry
                    .file_name()
                    .into_string()
                    .map_err(|_| ProjectError::NonUtf8Name(file_path.clone()))?;
                names.push(name);
            }
            names.sort();

            for name in names {
                let relative = [project.header_prefix.as_str(), dir.as_str(), name.as_str()]
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join("/");
                headers.push(HeaderId::new(&relative)?);
            }
        }

        Ok(headers)
    }

    /// Reads the license file
    pub fn read_license(&self) -> Result<String> {
        let path = self.root.join(&self.config.project.license);
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read license: {}", path.display()))
    }

    /// Builds merge options from configuration and the license file
    pub fn merge_options(&self) -> Result<MergeOptions> {
        let project = &self.config.project;

        let mut options = MergeOptions::new(project.guard_macro.clone());
        options.umbrella_include = non_empty(project.umbrella_include.as_deref()).map(str::to_string);
        options.version_header = non_empty(project.version_header.as_deref())
            .map(HeaderId::new)
            .transpose()
            .context("Invalid version_header")?;
        options.license = self.read_license()?;
        options.signature = project
            .signature
            .clone()
            .unwrap_or_else(|| DEFAULT_SIGNATURE.to_string());

        Ok(options)
    }

    /// Discovers and resolves every header
    pub fn resolve(&self) -> Result<Resolution> {
        let roots = self.list_header_files()?;
        let source = self.header_source();

        let mut resolver = DependencyResolver::new(&source);
        let headers = resolver.resolve(&roots)?;
        let parses = resolver.cache().parses();

        Ok(Resolution {
            roots,
            headers,
            parses,
        })
    }

    /// Resolves and merges every header into one document
    pub fn merge(&self, resolution: &Resolution) -> Result<MergedDocument> {
        let merger = Merger::new(self.merge_options()?);
        Ok(merger.merge(&resolution.headers)?)
    }

    /// Destination of the merged header
    ///
    /// An explicit path is taken as given; the configured default is
    /// relative to the project root.
    pub fn output_path(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => self.root.join(&self.config.project.output),
        }
    }

    /// Loads the cached API catalog
    pub fn read_api_catalog(&self) -> Result<ApiCatalog> {
        let path = self.root.join(&self.config.project.coverage.api_cache);
        if !path.is_file() {
            return Err(ProjectError::MissingApiCache(path).into());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read API catalog: {}", path.display()))?;
        ApiCatalog::from_json(&content)
            .with_context(|| format!("Failed to load API catalog: {}", path.display()))
    }

    /// Concatenates the corpus headers, sorted by name, newline separated
    pub fn read_corpus(&self) -> Result<String> {
        let dir = self.root.join(&self.config.project.coverage.corpus_dir);
        let extension = &self.config.project.header_extension;

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("Failed to list corpus directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .collect();
        paths.sort();

        let mut texts = Vec::with_capacity(paths.len());
        for path in &paths {
            texts.push(
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read header: {}", path.display()))?,
            );
        }

        Ok(texts.join("\n"))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn guarded(name: &str, content: &str) -> String {
        format!("#ifndef {name}\n#define {name}\n\n{content}\n\n#endif //{name}\n")
    }

    /// A small libuvcxx-shaped project
    fn setup_project() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let root = dir.path();

        write(root, "LICENSE", "MIT License\n");
        write(
            root,
            "include/uvcxx/utils/standard.h",
            &guarded("LIBUVCXX_STANDARD_H", "#include <cstddef>\n\n#define UVCXX_STD 1"),
        );
        write(
            root,
            "include/uvcxx/utils/defer.h",
            &guarded("LIBUVCXX_DEFER_H", "#include <functional>\n\n#include \"standard.h\"\n\nint defer();"),
        );
        write(
            root,
            "include/uvcxx/cxx/version.h",
            &guarded("LIBUVCXX_VERSION_H", "#include <uv.h>\n\n#define UVCXX_VERSION 1"),
        );
        write(
            root,
            "include/uvcxx/cxx/buffer.h",
            &guarded(
                "LIBUVCXX_BUFFER_H",
                "#include <cstring>\n\n#include \"version.h\"\n#include \"uvcxx/utils/defer.h\"\n\nint buffer();",
            ),
        );
        write(root, "include/uvcxx/cxx/notes.txt", "not a header");
        fs::create_dir_all(root.join("include/uvcxx/inner")).unwrap();
        write(
            root,
            "include/uvcxx/loop.h",
            &guarded("LIBUVCXX_LOOP_H", "#include \"cxx/buffer.h\"\n\nint loop();"),
        );

        (dir, project)
    }

    #[test]
    fn init_writes_default_config() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(dir.path().join(CONFIG_FILE).is_file());
        assert_eq!(project.config().project.guard_macro, "UVCXX_H");
        assert_eq!(project.include_root(), dir.path().join("include"));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "guard_macro = \"KEEP_H\"\n").unwrap();

        let project = Project::init(dir.path()).unwrap();
        assert_eq!(project.config().project.guard_macro, "KEEP_H");
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Project::open(dir.path()).is_err());
    }

    #[test]
    fn lists_headers_in_directory_order() {
        let (_dir, project) = setup_project();
        let headers: Vec<String> = project
            .list_header_files()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(
            headers,
            vec![
                "uvcxx/utils/standard.h",
                "uvcxx/utils/defer.h",
                "uvcxx/utils/standard.h",
                "uvcxx/cxx/buffer.h",
                "uvcxx/cxx/version.h",
                "uvcxx/loop.h",
            ]
        );
    }

    #[test]
    fn missing_header_dir_is_error() {
        let (dir, project) = setup_project();
        fs::remove_dir_all(dir.path().join("include/uvcxx/inner")).unwrap();
        assert!(project.list_header_files().is_err());
    }

    #[test]
    fn resolves_and_merges() {
        let (_dir, project) = setup_project();
        let resolution = project.resolve().unwrap();

        let order: Vec<&str> = resolution.headers.ids().map(HeaderId::as_str).collect();
        assert_eq!(
            order,
            vec![
                "uvcxx/utils/standard.h",
                "uvcxx/utils/defer.h",
                "uvcxx/cxx/version.h",
                "uvcxx/cxx/buffer.h",
                "uvcxx/loop.h",
            ]
        );
        assert_eq!(resolution.parses, 5);

        let text = project.merge(&resolution).unwrap().render();
        assert!(text.starts_with("/**\n * MIT License\n */\n"));
        assert_eq!(text.matches("#include <uv.h>").count(), 1);
        assert!(text.contains("// #include \"uvcxx/loop.h\""));
    }

    #[test]
    fn missing_license_is_error() {
        let (dir, project) = setup_project();
        fs::remove_file(dir.path().join("LICENSE")).unwrap();
        let resolution = project.resolve().unwrap();
        assert!(project.merge(&resolution).is_err());
    }

    #[test]
    fn output_path_defaults_to_config() {
        let (dir, project) = setup_project();
        assert_eq!(
            project.output_path(None),
            dir.path().join("include/uvcxx-single.h")
        );
        assert_eq!(
            project.output_path(Some(Path::new("out.h"))),
            PathBuf::from("out.h")
        );
    }

    #[test]
    fn corpus_and_catalog() {
        let (dir, project) = setup_project();
        assert!(project.read_api_catalog().is_err());

        write(
            dir.path(),
            "scripts/libuv_api.json",
            r#"{"sections": [{"name": "Loop", "functions": ["uv_run"]}]}"#,
        );
        let catalog = project.read_api_catalog().unwrap();
        assert_eq!(catalog.function_count(), 1);

        let corpus = project.read_corpus().unwrap();
        assert!(corpus.contains("int loop();"));
        assert!(!corpus.contains("int buffer();"));
    }

    #[test]
    fn empty_prefix_lists_headers_relative_to_include_root() {
        let (dir, _) = setup_project();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "header_prefix = \"\"\nheader_dirs = [\"uvcxx/utils\", \"uvcxx/cxx\", \"uvcxx\"]\n",
        )
        .unwrap();
        let project = Project::open(dir.path()).unwrap();

        let headers: Vec<String> = project
            .list_header_files()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            headers,
            vec![
                "uvcxx/utils/standard.h",
                "uvcxx/utils/defer.h",
                "uvcxx/utils/standard.h",
                "uvcxx/cxx/buffer.h",
                "uvcxx/cxx/version.h",
                "uvcxx/loop.h",
            ]
        );
        assert!(project.resolve().is_ok());
    }

    #[test]
    fn empty_values_disable_optional_pieces() {
        let (dir, _) = setup_project();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "umbrella_include = \"\"\nversion_header = \"\"\nfirst_header = \"\"\nsignature = \"\"\n",
        )
        .unwrap();
        let project = Project::open(dir.path()).unwrap();

        let roots = project.list_header_files().unwrap();
        assert_eq!(roots[0].as_str(), "uvcxx/utils/defer.h");

        let options = project.merge_options().unwrap();
        assert_eq!(options.umbrella_include, None);
        assert_eq!(options.version_header, None);
        assert!(options.signature.is_empty());

        // Without a version header every body, version.h included, is a plain block
        let resolution = project.resolve().unwrap();
        let text = project.merge(&resolution).unwrap().render();
        assert!(text.contains("// #include \"uvcxx/cxx/version.h\""));
        assert_eq!(text.matches("#include <uv.h>").count(), 1);
        assert!(!text.contains("Levalup"));
    }
}
