//! Repo-local architectural lint for the complaint desk's layering.
//!
//! The backend keeps its state and rules in `domain`, reached only through
//! ports. HTTP handlers live in `inbound` and the on-disk store and password
//! hasher live in `outbound`. Every `.rs` file under those three directories
//! is parsed with `syn`, and each path it mentions is checked against the
//! owning layer's [`Rule`]:
//!
//! | layer      | may not reach                                            |
//! |------------|----------------------------------------------------------|
//! | `domain`   | `inbound`, `outbound`, actix, utoipa, cap-std, argon2    |
//! | `inbound`  | `outbound`, cap-std, argon2                              |
//! | `outbound` | `inbound`, actix, utoipa                                 |
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use syn::visit::{self, Visit};
use thiserror::Error;

/// Name the backend library is imported under from its binaries and tests.
const LIBRARY_CRATE: &str = "complaint_desk";

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: Utf8PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug, Error)]
pub enum ArchitectureLintError {
    /// A source directory or file could not be read.
    #[error("I/O error while reading {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A directory entry name is not valid UTF-8.
    #[error("non UTF-8 file name under {parent}: {name}")]
    NonUtf8Name {
        /// Directory holding the entry.
        parent: Utf8PathBuf,
        /// Lossy rendering of the name.
        name: String,
    },
    /// A source file sits outside the three layer directories.
    #[error("{file} is not under domain/, inbound/ or outbound/")]
    UnknownLayer {
        /// Source file, relative to `backend/src`.
        file: Utf8PathBuf,
    },
    /// Rust source parsing failed.
    #[error("failed to parse {file}: {message}")]
    Parse {
        /// Source file, relative to `backend/src`.
        file: Utf8PathBuf,
        /// Parser error text.
        message: String,
    },
    /// One or more boundary violations were found.
    #[error("{}", render_violations(.0))]
    Violations(Vec<Violation>),
}

fn render_violations(violations: &[Violation]) -> String {
    let mut rendered = String::from("Architecture boundary violations:");
    for violation in violations {
        rendered.push_str("\n- ");
        rendered.push_str(&violation.to_string());
    }
    rendered
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: Utf8PathBuf,
    /// Source text.
    pub contents: String,
}

/// What one layer must not depend on.
#[derive(Debug, Clone, Copy)]
struct Rule {
    modules: &'static [&'static str],
    crates: &'static [&'static str],
}

const DOMAIN_RULE: Rule = Rule {
    modules: &["inbound", "outbound"],
    crates: &[
        "actix_http",
        "actix_rt",
        "actix_web",
        "argon2",
        "cap_std",
        "utoipa",
        "utoipa_swagger_ui",
    ],
};

const INBOUND_RULE: Rule = Rule {
    modules: &["outbound"],
    crates: &["argon2", "cap_std"],
};

const OUTBOUND_RULE: Rule = Rule {
    modules: &["inbound"],
    crates: &[
        "actix_http",
        "actix_rt",
        "actix_web",
        "utoipa",
        "utoipa_swagger_ui",
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    const fn dir(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    const fn rule(self) -> Rule {
        match self {
            Self::Domain => DOMAIN_RULE,
            Self::Inbound => INBOUND_RULE,
            Self::Outbound => OUTBOUND_RULE,
        }
    }

    fn of(file: &Utf8Path) -> Option<Self> {
        let top = file.components().next()?.as_str();
        Self::ALL.into_iter().find(|layer| layer.dir() == top)
    }
}

/// Where a path mentioned in a source file leads.
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    /// A top-level module of the backend crate.
    Module(&'a str),
    /// An external crate.
    Crate(&'a str),
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

fn target_of(segments: &[String]) -> Option<Target<'_>> {
    let (first, rest) = segments.split_first()?;
    match first.as_str() {
        "crate" | "self" | "super" => rest
            .iter()
            .find(|segment| !is_relative(segment))
            .map(|segment| Target::Module(segment.as_str())),
        LIBRARY_CRATE => rest.first().map(|segment| Target::Module(segment.as_str())),
        root @ ("domain" | "inbound" | "outbound") => Some(Target::Module(root)),
        root => Some(Target::Crate(root)),
    }
}

impl Rule {
    fn check(self, layer: Layer, target: &Target<'_>) -> Option<String> {
        let name = layer.dir();
        match *target {
            Target::Module(module) if self.modules.contains(&module) => {
                Some(format!("{name} module must not depend on crate::{module}"))
            }
            Target::Crate(krate) if self.crates.contains(&krate) => Some(format!(
                "{name} module must not depend on external crate `{krate}`"
            )),
            Target::Module(_) | Target::Crate(_) => None,
        }
    }
}

/// Collects every path a file mentions, including each leaf of `use` trees.
#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.use_tree(&node.tree, Vec::new());
    }
}

fn lint_file(source: &LintSource) -> Result<Vec<Violation>, ArchitectureLintError> {
    let layer = Layer::of(&source.file).ok_or_else(|| ArchitectureLintError::UnknownLayer {
        file: source.file.clone(),
    })?;
    let parsed = syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
        file: source.file.clone(),
        message: err.to_string(),
    })?;

    let mut collector = PathCollector::default();
    collector.visit_file(&parsed);

    let rule = layer.rule();
    let messages: BTreeSet<String> = collector
        .paths
        .iter()
        .filter_map(|segments| target_of(segments))
        .filter_map(|target| rule.check(layer, &target))
        .collect();
    Ok(messages
        .into_iter()
        .map(|message| Violation {
            file: source.file.clone(),
            message,
        })
        .collect())
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        violations.extend(lint_file(source)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn io_error(path: &Utf8Path) -> impl FnOnce(io::Error) -> ArchitectureLintError + '_ {
    move |source| ArchitectureLintError::Io {
        path: path.to_owned(),
        source,
    }
}

fn collect_sources(
    dir: &Dir,
    relative: &Utf8Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let mut entries = dir
        .entries()
        .map_err(io_error(relative))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error(relative))?;
    entries.sort_by_key(cap_std::fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name().into_string().map_err(|name| {
            ArchitectureLintError::NonUtf8Name {
                parent: relative.to_owned(),
                name: name.to_string_lossy().into_owned(),
            }
        })?;
        let path = relative.join(&name);
        if entry.file_type().map_err(io_error(&path))?.is_dir() {
            let child = entry.open_dir().map_err(io_error(&path))?;
            collect_sources(&child, &path, sources)?;
        } else if path.extension() == Some("rs") {
            let contents = dir.read_to_string(&name).map_err(io_error(&path))?;
            sources.push(LintSource {
                file: path,
                contents,
            });
        }
    }
    Ok(())
}

/// Lint the backend crate sources on disk.
///
/// `backend_dir` must be the `backend/` directory at the repository root.
/// A missing layer directory is skipped.
pub fn lint_backend_sources(backend_dir: &Utf8Path) -> Result<(), ArchitectureLintError> {
    let src_dir = backend_dir.join("src");
    let src = Dir::open_ambient_dir(&src_dir, ambient_authority()).map_err(io_error(&src_dir))?;

    let mut sources = Vec::new();
    for layer in Layer::ALL {
        let layer_dir = Utf8Path::new(layer.dir());
        match src.open_dir(layer_dir) {
            Ok(dir) => collect_sources(&dir, layer_dir, &mut sources)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(io_error(layer_dir)(err)),
        }
    }
    lint_sources(&sources)
}
