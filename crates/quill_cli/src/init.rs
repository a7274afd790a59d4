//! `quill init` — project scaffolding command.
//!
//! Creates a new Quill project with a `quill.toml`, a `src/` directory with
//! a starter page, and the output directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Runs the `quill init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory. Returns exit
/// code 0 on success.
pub fn run(name: Option<String>) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{n}' already exists").into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    if project_dir.join("quill.toml").exists() {
        return Err(format!(
            "{} already contains a quill.toml",
            project_dir.display()
        )
        .into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my_project")
        .to_string();

    eprintln!("  Creating new Quill project `{project_name}`");
    scaffold(&project_dir, &project_name)?;
    eprintln!("     Created {}", project_dir.join("quill.toml").display());
    eprintln!(
        "     Created {}",
        project_dir.join("src").join("index.md").display()
    );

    Ok(0)
}

/// Writes the project skeleton into `root`.
fn scaffold(root: &Path, project_name: &str) -> io::Result<()> {
    fs::create_dir_all(root.join("src"))?;

    let config = format!(
        r#"[project]
name = "{project_name}"
version = "0.1.0"

[[input.sources]]
path = "src"

[output]
path = "docs"
"#
    );
    fs::write(root.join("quill.toml"), config)?;

    let index = format!("# {project_name}\n\nWelcome to the {project_name} documentation.\n");
    fs::write(root.join("src").join("index.md"), index)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_creates_config_and_starter_page() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path(), "manual").unwrap();

        assert!(dir.path().join("quill.toml").exists());
        assert!(dir.path().join("src").join("index.md").exists());

        let config = quill_config::load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "manual");
        assert_eq!(config.input.sources.len(), 1);
        assert_eq!(config.output.path, "docs");
    }

    #[test]
    fn scaffolded_project_name_appears_in_index() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path(), "manual").unwrap();
        let index = std::fs::read_to_string(dir.path().join("src").join("index.md")).unwrap();
        assert!(index.contains("# manual"));
    }
}
