//! Minimal CLI: swagger document → (model | definition) as JSON
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use swagger_typespec::{DocumentModel, ModelOptions, ResolveOptions, build_model, resolve_definition};
use swagger_typespec::resolver::DEFAULT_MAX_DEPTH;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// turn Swagger 2.0 schemas into the flat type model TypeScript templates consume
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// log at debug level (overridden by SWAGGER_TYPESPEC_LOG)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// only log errors (overridden by SWAGGER_TYPESPEC_LOG)
    #[arg(long, short, global = true, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// build the full document model (definitions + methods)
    Model(ModelOut),
    /// resolve a single named definition
    Definition(DefinitionOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone, Copy)]
struct ResolveSettings {
    /// deepest schema nesting accepted before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(clap::Parser, Debug)]
struct ModelOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    resolve_settings: ResolveSettings,

    /// keep parameters marked `x-exclude-from-bindings`
    #[arg(long, default_value_t = false)]
    include_excluded: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DefinitionOut {
    /// swagger document
    #[arg(long, short)]
    input: PathBuf,

    /// definition name, as it appears under `definitions`
    #[arg(long)]
    name: String,

    #[command(flatten)]
    resolve_settings: ResolveSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ResolveSettings {
    fn options(&self) -> ResolveOptions {
        ResolveOptions { max_depth: self.max_depth }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_tracing(&self) -> Result<()> {
        let level = if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        };
        let filter = tracing_subscriber::EnvFilter::try_from_env("SWAGGER_TYPESPEC_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Model(target) => {
                let options = ModelOptions {
                    resolve: target.resolve_settings.options(),
                    include_excluded: target.include_excluded,
                };
                let source_paths = resolve_file_path_patterns(&target.input_settings.input)?;

                // documents are independent; build them in parallel
                let models = source_paths
                    .par_iter()
                    .map(|path| -> Result<(String, DocumentModel)> {
                        let document = load_document(path)?;
                        let model = build_model(&document, &options)
                            .with_context(|| format!("failed to build model for {}", path.display()))?;
                        Ok((path.to_string_lossy().to_string(), model))
                    })
                    .collect::<Result<Vec<_>>>()?;

                if models.len() == 1 {
                    write_json(&models[0].1, target.out.as_deref())
                } else {
                    let keyed: indexmap::IndexMap<_, _> = models.into_iter().collect();
                    write_json(&keyed, target.out.as_deref())
                }
            }
            Command::Definition(target) => {
                let document = load_document(&target.input)?;
                let descriptor = resolve_definition(&document, &target.name, &target.resolve_settings.options())
                    .with_context(|| format!("in {}", target.input.display()))?;
                write_json(&descriptor, target.out.as_deref())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_document(path: &Path) -> Result<serde_json::Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("failed to parse JSON source file {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &rendered)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::debug!(path = %out.display(), "wrote model");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(anyhow!("glob pattern matched no files: {pattern}"));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("dir/b.json")]);
    }

    #[test]
    fn unmatched_glob_is_an_error() {
        let err = resolve_file_path_patterns(["/definitely/not/here/*.json"]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn parses_model_subcommand() {
        let cli = CommandLineInterface::try_parse_from([
            "swagger-typespec", "model", "-i", "a.json", "b.json", "--max-depth", "8", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.cmd {
            Command::Model(m) => {
                assert_eq!(m.input_settings.input, vec!["a.json", "b.json"]);
                assert_eq!(m.resolve_settings.max_depth, 8);
                assert!(!m.include_excluded);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let parsed = CommandLineInterface::try_parse_from([
            "swagger-typespec", "definition", "-i", "a.json", "--name", "Pet", "-v", "-q",
        ]);
        assert!(parsed.is_err());
    }
}
