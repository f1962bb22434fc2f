//! Template tree generation.

use futures::future::join_all;
use rust_embed::RustEmbed;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::scaffold::header::apply_header;
use crate::scaffold::template::{render, TemplateContext};
use crate::scaffold::GenerationConfig;

const DOTFILE_PREFIX: &str = "dotfile-";
const TEMPLATE_EXTENSION: &str = ".ejs";

/// The project template shipped inside the binary.
#[derive(RustEmbed)]
#[folder = "template/"]
struct BundledTemplate;

/// Where template files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The template compiled into the binary
    Bundled,
    /// A template tree on disk
    Dir(PathBuf),
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => f.write_str("bundled template"),
            Self::Dir(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&Path> for TemplateSource {
    fn from(path: &Path) -> Self {
        Self::Dir(path.to_path_buf())
    }
}

impl From<PathBuf> for TemplateSource {
    fn from(path: PathBuf) -> Self {
        Self::Dir(path)
    }
}

/// Files written by one generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Project root
    pub root: PathBuf,
    /// Written files, relative to `root`, sorted
    pub files: Vec<PathBuf>,
}

/// Where a template file's bytes live.
#[derive(Debug, Clone)]
enum EntryOrigin {
    File(PathBuf),
    Bundled,
}

/// A template file paired with its output location.
#[derive(Debug, Clone)]
struct TemplateEntry {
    origin: EntryOrigin,
    template_path: String,
    output_path: String,
}

impl TemplateEntry {
    async fn read(&self) -> Result<Vec<u8>> {
        match &self.origin {
            EntryOrigin::File(path) => Ok(fs::read(path).await?),
            EntryOrigin::Bundled => BundledTemplate::get(&self.template_path)
                .map(|file| file.data.into_owned())
                .ok_or_else(|| {
                    Error::Internal(format!("Missing bundled template file {}", self.template_path))
                }),
        }
    }
}

/// Map a template file name to its output name: `dotfile-x` becomes `.x` and
/// a trailing `.ejs` is dropped.
pub fn output_file_name(template_name: &str) -> String {
    let name = match template_name.strip_prefix(DOTFILE_PREFIX) {
        Some(rest) => format!(".{}", rest),
        None => template_name.to_string(),
    };
    match name.strip_suffix(TEMPLATE_EXTENSION) {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Output path for a `/`-separated template path.
fn output_path(template_path: &str) -> String {
    match template_path.rsplit_once('/') {
        Some((dir, name)) => format!("{}/{}", dir, output_file_name(name)),
        None => output_file_name(template_path),
    }
}

/// Relative path with `/` separators regardless of platform.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn collect_dir_entries(template_dir: &Path) -> Result<Vec<TemplateEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(template_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(template_dir)
            .map_err(|e| Error::Internal(e.to_string()))?;
        let template_path = slash_path(relative);

        entries.push(TemplateEntry {
            origin: EntryOrigin::File(entry.path().to_path_buf()),
            output_path: output_path(&template_path),
            template_path,
        });
    }

    Ok(entries)
}

fn collect_bundled_entries() -> Vec<TemplateEntry> {
    let mut paths: Vec<String> = BundledTemplate::iter().map(|p| p.into_owned()).collect();
    paths.sort();

    paths
        .into_iter()
        .map(|template_path| TemplateEntry {
            origin: EntryOrigin::Bundled,
            output_path: output_path(&template_path),
            template_path,
        })
        .collect()
}

async fn collect_entries(source: &TemplateSource) -> Result<Vec<TemplateEntry>> {
    match source {
        TemplateSource::Bundled => Ok(collect_bundled_entries()),
        TemplateSource::Dir(dir) => {
            if !fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false) {
                return Err(Error::TemplateNotFound(dir.clone()));
            }
            collect_dir_entries(dir)
        }
    }
}

async fn write_entry(
    entry: TemplateEntry,
    target: &Path,
    project: &str,
    context: &TemplateContext,
) -> Result<PathBuf> {
    let bytes = entry.read().await?;
    let destination = target.join(&entry.output_path);

    let output = if entry.template_path.ends_with(TEMPLATE_EXTENSION) {
        let source = String::from_utf8(bytes)
            .map_err(|_| Error::template(&entry.template_path, "Template is not valid UTF-8"))?;
        let rendered = render(&source, context, &entry.template_path)?;
        apply_header(&rendered, project, &entry.output_path, &entry.template_path).into_bytes()
    } else {
        match String::from_utf8(bytes) {
            Ok(text) => {
                apply_header(&text, project, &entry.output_path, &entry.template_path).into_bytes()
            }
            // Binary assets are copied as-is.
            Err(e) => e.into_bytes(),
        }
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&destination, output).await?;
    debug!("Wrote {} from {}", entry.output_path, entry.template_path);

    Ok(PathBuf::from(entry.output_path))
}

/// Generate a project in `target` from `source`.
///
/// Fails with [`Error::DirectoryExists`] before touching the filesystem if
/// `target` exists. Every file is written by its own future; they are awaited
/// together and files already written stay in place when another fails. The
/// first failure is returned once all writes have settled.
pub async fn create_server(
    target: &Path,
    config: &GenerationConfig,
    source: impl Into<TemplateSource>,
) -> Result<GenerationReport> {
    if fs::try_exists(target).await? {
        return Err(Error::DirectoryExists(target.to_path_buf()));
    }

    let entries = collect_entries(&source.into()).await?;
    let context = config.context();
    let project = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| config.name.clone());

    fs::create_dir_all(target).await?;
    info!(
        "Creating {} from {} template files",
        target.display(),
        entries.len()
    );

    let results = join_all(
        entries
            .into_iter()
            .map(|entry| write_entry(entry, target, &project, &context)),
    )
    .await;

    let mut files = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(path) => files.push(path),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(_) => {}
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    files.sort();
    Ok(GenerationReport {
        root: target.to_path_buf(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> GenerationConfig {
        GenerationConfig {
            name: "demo".to_string(),
            description: "x".to_string(),
            runtime_dependency: "\"0.1.0\"".to_string(),
        }
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn fixture_template() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "package.json.ejs",
            "{\n  \"name\": \"<%= name %>\",\n  \"description\": \"<%= description %>\"\n}\n",
        );
        write(
            dir.path(),
            "src/index.ts.ejs",
            "#!/usr/bin/env node\nconst name = \"<%= name %>\";\n",
        );
        write(dir.path(), "README.md.ejs", "# <%= name %>\n\n<%= description %>\n");
        write(dir.path(), "dotfile-gitignore", "node_modules/\n");
        write(dir.path(), "tsconfig.json", "{\"compilerOptions\": {}}\n");
        dir
    }

    #[test]
    fn test_output_path_keeps_directories() {
        assert_eq!(output_path("src/main.rs.ejs"), "src/main.rs");
        assert_eq!(output_path("config/dotfile-env"), "config/.env");
        assert_eq!(output_path("README.md"), "README.md");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("index.ts.ejs"), "index.ts");
        assert_eq!(output_file_name("dotfile-gitignore"), ".gitignore");
        assert_eq!(output_file_name("dotfile-env.example.ejs"), ".env.example");
        assert_eq!(output_file_name("tsconfig.json"), "tsconfig.json");
    }

    #[tokio::test]
    async fn test_create_server_layout() {
        let template = fixture_template();
        let out = TempDir::new().unwrap();
        let target = out.path().join("demo");

        let report = create_server(&target, &config(), template.path()).await.unwrap();

        let files: Vec<_> = report.files.iter().map(|p| slash_path(p)).collect();
        assert_eq!(
            files,
            vec![".gitignore", "README.md", "package.json", "src/index.ts", "tsconfig.json"]
        );
    }

    #[tokio::test]
    async fn test_json_outputs_have_no_header() {
        let template = fixture_template();
        let out = TempDir::new().unwrap();
        let target = out.path().join("demo");
        create_server(&target, &config(), template.path()).await.unwrap();

        let package = std::fs::read_to_string(target.join("package.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&package).unwrap();
        assert_eq!(parsed["name"], "demo");
        assert_eq!(parsed["description"], "x");

        let tsconfig = std::fs::read_to_string(target.join("tsconfig.json")).unwrap();
        assert_eq!(tsconfig, "{\"compilerOptions\": {}}\n");
    }

    #[tokio::test]
    async fn test_headers_on_other_outputs() {
        let template = fixture_template();
        let out = TempDir::new().unwrap();
        let target = out.path().join("demo");
        create_server(&target, &config(), template.path()).await.unwrap();

        let index = std::fs::read_to_string(target.join("src/index.ts")).unwrap();
        let lines: Vec<_> = index.lines().collect();
        assert_eq!(lines[0], "#!/usr/bin/env node");
        assert_eq!(lines[1], "// File: demo/src/index.ts");
        assert_eq!(lines[2], "// Generated from template: src/index.ts.ejs");
        assert!(index.contains("const name = \"demo\";"));

        let readme = std::fs::read_to_string(target.join("README.md")).unwrap();
        assert!(readme.starts_with("<!-- File: demo/README.md -->"));
        assert!(readme.contains("# demo"));

        let gitignore = std::fs::read_to_string(target.join(".gitignore")).unwrap();
        assert!(gitignore.starts_with("# File: demo/.gitignore"));
        assert!(gitignore.ends_with("node_modules/\n"));
    }

    #[tokio::test]
    async fn test_existing_directory_fails_without_writing() {
        let template = fixture_template();
        let out = TempDir::new().unwrap();
        let target = out.path().join("demo");
        std::fs::create_dir(&target).unwrap();

        let err = create_server(&target, &config(), template.path()).await.unwrap_err();
        assert!(matches!(err, Error::DirectoryExists(_)));
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }

    #[test]
    fn test_bundled_template_is_embedded() {
        let entries = collect_bundled_entries();
        let outputs: Vec<_> = entries.iter().map(|e| e.output_path.as_str()).collect();

        assert!(outputs.contains(&"Cargo.toml"));
        assert!(outputs.contains(&"src/main.rs"));
        assert!(outputs.contains(&".gitignore"));
    }

    #[tokio::test]
    async fn test_create_server_from_bundled_template() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("demo");

        let report = create_server(&target, &config(), TemplateSource::Bundled)
            .await
            .unwrap();
        assert!(report.files.contains(&PathBuf::from("Cargo.toml")));

        let manifest = std::fs::read_to_string(target.join("Cargo.toml")).unwrap();
        assert!(manifest.starts_with("# File: demo/Cargo.toml\n"));
        assert!(manifest.contains("name = \"demo\""));
        assert!(manifest.contains("create-mcp-server = \"0.1.0\""));
    }

    #[test]
    fn test_template_source_display() {
        assert_eq!(TemplateSource::Bundled.to_string(), "bundled template");
        assert_eq!(
            TemplateSource::from(Path::new("tpl")).to_string(),
            "tpl"
        );
    }

    #[tokio::test]
    async fn test_missing_template_dir() {
        let out = TempDir::new().unwrap();
        let err = create_server(
            &out.path().join("demo"),
            &config(),
            out.path().join("no-template"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }

    #[tokio::test]
    async fn test_template_error_keeps_written_files() {
        let template = fixture_template();
        write(template.path(), "broken.txt.ejs", "<%= missing %>");
        let out = TempDir::new().unwrap();
        let target = out.path().join("demo");

        let err = create_server(&target, &config(), template.path()).await.unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
        assert!(target.join("package.json").exists());
        assert!(!target.join("broken.txt").exists());
    }

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let template = fixture_template();
        let out = TempDir::new().unwrap();
        let first = out.path().join("first").join("demo");
        let second = out.path().join("second").join("demo");

        create_server(&first, &config(), template.path()).await.unwrap();
        create_server(&second, &config(), template.path()).await.unwrap();

        for file in ["package.json", "src/index.ts", "README.md", ".gitignore"] {
            assert_eq!(
                std::fs::read(first.join(file)).unwrap(),
                std::fs::read(second.join(file)).unwrap()
            );
        }
    }
}
