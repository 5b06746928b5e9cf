//! esbuild-backed [`BundleEngine`].
//!
//! esbuild plugins run in JavaScript, so resolution is applied ahead of the
//! esbuild process: the module graph reachable from the entry is copied into
//! a staging directory that mirrors the project, and every specifier a plugin
//! claims is rewritten to the absolute staged path of its target. Relative
//! imports keep working because the mirror preserves directory structure.
//! Bare imports no plugin claims are looked up node-style so that modules
//! inside packages are staged too and their edges reach the plugins.
//! esbuild then bundles the rewritten entry from stdin.

use super::{BundleEngine, BundleOptions, BundleOutput, BundleRequest, Diagnostic, PluginContainer};
use crate::error::Result;
use crate::imports::{rewrite_imports, scan_imports};
use crate::probe::{probe, EntryKind};
use crate::rules::INDEX_FILE;
use crate::SourceTreeLayout;
use rayon::prelude::*;
use serde::Deserialize;
use specbundle_util::fs::write_creating_dirs;
use specbundle_util::path::to_slash;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Files whose imports are followed and rewritten. Anything else is copied.
const SCANNED_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts"];

/// Extensions tried for extensionless relative imports, in esbuild's order.
const RELATIVE_EXTENSIONS: &[&str] = &[".ts", ".js", ".mjs", ".cjs"];

/// Importer name reported for the virtual entry.
const ENTRY_NAME: &str = "<stdin>";

/// Runs the esbuild binary over a staged copy of the module graph.
#[derive(Debug, Clone)]
pub struct EsbuildEngine {
    binary: PathBuf,
    node_paths: Vec<PathBuf>,
}

impl EsbuildEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            node_paths: Vec::new(),
        }
    }

    /// Extra package directory for bare imports no plugin claims.
    pub fn with_node_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.node_paths.push(dir.into());
        self
    }

    /// The project's installed esbuild, resolving bare imports from its `node_modules`.
    #[must_use]
    pub fn for_layout(layout: &SourceTreeLayout) -> Self {
        Self::new(layout.node_bin("esbuild")).with_node_path(layout.node_modules_dir.clone())
    }

    fn run(&self, options: &BundleOptions, cwd: &Path, entry: &str) -> Result<String, Diagnostic> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--bundle")
            .arg(format!("--format={}", options.format.as_str()))
            .arg(format!("--platform={}", options.platform.as_str()))
            .arg("--log-level=warning");
        if options.keep_names {
            cmd.arg("--keep-names");
        }
        if !self.node_paths.is_empty() {
            if let Ok(joined) = std::env::join_paths(&self.node_paths) {
                cmd.env("NODE_PATH", joined);
            }
        }
        cmd.current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        tracing::debug!(binary = %self.binary.display(), "spawning esbuild");
        let mut child = cmd.spawn().map_err(|e| {
            Diagnostic::new("BUNDLE_ENGINE_SPAWN", e.to_string()).at(self.binary.display().to_string())
        })?;

        // Feed stdin from a separate thread so a chatty child cannot block on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let entry = entry.to_owned();
            std::thread::spawn(move || stdin.write_all(entry.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| Diagnostic::new("BUNDLE_ENGINE_WAIT", e.to_string()))?;

        if let Some(writer) = writer {
            if let Ok(Err(e)) = writer.join() {
                tracing::debug!(error = %e, "esbuild closed stdin early");
            }
        }

        if !output.status.success() {
            return Err(Diagnostic::new(
                "BUNDLE_ENGINE_FAILED",
                format!("esbuild exited with {}", output.status),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Diagnostic::new("BUNDLE_OUTPUT_NOT_UTF8", e.to_string()))
    }
}

impl BundleEngine for EsbuildEngine {
    fn name(&self) -> &str {
        "esbuild"
    }

    fn bundle(&self, request: &BundleRequest, plugins: &PluginContainer) -> Result<BundleOutput> {
        plugins.build_start()?;

        let root = dunce::canonicalize(&request.resolve_dir)
            .unwrap_or_else(|_| request.resolve_dir.clone());
        let staging = tempfile::Builder::new()
            .prefix("specbundle-stage-")
            .tempdir()?;

        let stager = Stager {
            root: &root,
            staging: staging.path(),
            plugins,
            node_paths: &self.node_paths,
        };
        let graph = stager.stage_graph(&request.contents)?;
        tracing::info!(
            modules = graph.modules.len(),
            staging = %staging.path().display(),
            "staged module graph"
        );

        let mut output = BundleOutput {
            modules: graph.modules,
            diagnostics: graph.diagnostics,
            ..BundleOutput::default()
        };

        if output.diagnostics.is_empty() {
            match self.run(&request.options, staging.path(), &graph.entry) {
                Ok(code) => output.code = code,
                Err(diagnostic) => output.diagnostics.push(diagnostic),
            }
        }

        Ok(output)
    }
}

/// Staged copy of the graph reachable from the entry.
#[derive(Debug, Default)]
struct StagedGraph {
    /// Rewritten entry source.
    entry: String,
    /// Original paths of staged modules, in traversal order.
    modules: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
struct StagedModule {
    deps: Vec<PathBuf>,
    diagnostics: Vec<Diagnostic>,
}

struct Stager<'a> {
    root: &'a Path,
    staging: &'a Path,
    plugins: &'a PluginContainer,
    /// Package directories searched after the importer's `node_modules` chain.
    node_paths: &'a [PathBuf],
}

impl Stager<'_> {
    fn staged_path(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(self.root)
            .ok()
            .map(|rel| self.staging.join(rel))
    }

    /// Breadth-first over the graph; each level is staged in parallel.
    fn stage_graph(&self, contents: &str) -> Result<StagedGraph> {
        let (entry, mut frontier) = self.rewrite(contents, ENTRY_NAME, self.root)?;
        let mut graph = StagedGraph {
            entry,
            ..StagedGraph::default()
        };
        let mut seen: HashSet<PathBuf> = HashSet::new();

        loop {
            frontier.retain(|path| seen.insert(path.clone()));
            if frontier.is_empty() {
                break;
            }

            let staged = frontier
                .par_iter()
                .map(|path| self.stage_module(path))
                .collect::<Result<Vec<_>>>()?;

            graph.modules.extend(frontier.iter().map(|p| to_slash(p)));
            frontier = Vec::new();
            for module in staged {
                graph.diagnostics.extend(module.diagnostics);
                frontier.extend(module.deps);
            }
        }

        Ok(graph)
    }

    fn stage_module(&self, path: &Path) -> Result<StagedModule> {
        let mut module = StagedModule::default();
        let Some(staged) = self.staged_path(path) else {
            return Ok(module);
        };
        let importer = path.to_string_lossy();

        if !is_scanned(path) {
            match fs::read(path) {
                Ok(bytes) => write_creating_dirs(&staged, &bytes)?,
                Err(e) => module
                    .diagnostics
                    .push(Diagnostic::new("BUNDLE_READ_ERROR", e.to_string()).at(importer)),
            }
            return Ok(module);
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                module
                    .diagnostics
                    .push(Diagnostic::new("BUNDLE_READ_ERROR", e.to_string()).at(importer));
                return Ok(module);
            }
        };

        let dir = path.parent().unwrap_or(self.root);
        let (rewritten, deps) = self.rewrite(&source, &importer, dir)?;
        write_creating_dirs(&staged, rewritten.as_bytes())?;
        module.deps = deps;
        Ok(module)
    }

    /// Rewrite plugin-claimed specifiers and collect the files to stage next.
    fn rewrite(&self, source: &str, importer: &str, dir: &Path) -> Result<(String, Vec<PathBuf>)> {
        let imports = scan_imports(source);
        let mut deps = Vec::new();
        let mut replacements = Vec::with_capacity(imports.len());

        for import in &imports {
            let (replacement, dep) = self.resolve_edge(&import.specifier, importer, dir)?;
            replacements.push(replacement);
            deps.extend(dep);
        }

        let mut replacements = replacements.into_iter();
        let rewritten = rewrite_imports(source, &imports, |_| replacements.next().flatten());
        Ok((rewritten, deps))
    }

    /// Returns the replacement specifier (if any) and the file to follow (if any).
    fn resolve_edge(
        &self,
        specifier: &str,
        importer: &str,
        dir: &Path,
    ) -> Result<(Option<String>, Option<PathBuf>)> {
        if let Some(resolved) = self.plugins.resolve_id(specifier, Some(importer))? {
            let target = PathBuf::from(&resolved.id);
            let target = dunce::canonicalize(&target).unwrap_or(target);
            return Ok(match self.staged_path(&target) {
                Some(staged) => (Some(to_slash(&staged)), Some(target)),
                None => (Some(to_slash(&target)), None),
            });
        }

        if !is_relative(specifier) {
            if !is_bare(specifier) {
                return Ok((None, None));
            }
            let Some(target) = resolve_package(specifier, dir, self.node_paths) else {
                tracing::debug!(specifier, importer, "bare import left to esbuild");
                return Ok((None, None));
            };
            return Ok(match self.staged_path(&target) {
                Some(staged) => (Some(to_slash(&staged)), Some(target)),
                None => (None, None),
            });
        }

        let Some(target) = resolve_relative(&dir.join(specifier)) else {
            tracing::debug!(specifier, importer, "relative import left to esbuild");
            return Ok((None, None));
        };

        Ok(match self.staged_path(&target) {
            Some(_) => (None, Some(target)),
            None => (Some(to_slash(&target)), None),
        })
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Package specifiers: not relative, not absolute, not a `node:` builtin.
fn is_bare(specifier: &str) -> bool {
    !specifier.is_empty()
        && !specifier.starts_with('/')
        && !specifier.starts_with('.')
        && !specifier.starts_with("node:")
        && !Path::new(specifier).is_absolute()
}

fn is_scanned(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCANNED_EXTENSIONS.contains(&ext))
}

/// esbuild's lookup order for a relative import: exact file, added
/// extension, then directory index.
fn resolve_relative(candidate: &Path) -> Option<PathBuf> {
    let found = if probe(candidate) == Some(EntryKind::File) {
        Some(candidate.to_path_buf())
    } else {
        RELATIVE_EXTENSIONS
            .iter()
            .map(|ext| {
                let mut with_ext = OsString::from(candidate);
                with_ext.push(ext);
                PathBuf::from(with_ext)
            })
            .find(|p| probe(p) == Some(EntryKind::File))
            .or_else(|| {
                let index = candidate.join(INDEX_FILE);
                (probe(&index) == Some(EntryKind::File)).then_some(index)
            })
    }?;
    dunce::canonicalize(&found).ok()
}

/// Entry fields of a `package.json`, in the order browser builds consult them.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    /// Only the string form; the object form remaps individual files.
    browser: Option<serde_json::Value>,
    module: Option<String>,
    main: Option<String>,
}

/// Split `name[/subpath]`, where scoped names span two segments.
fn split_package(specifier: &str) -> Option<(&str, Option<&str>)> {
    let name_len = if specifier.starts_with('@') {
        let mut parts = specifier.splitn(3, '/');
        let scope = parts.next()?;
        let name = parts.next().filter(|n| !n.is_empty())?;
        scope.len() + 1 + name.len()
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };
    if name_len == 0 {
        return None;
    }
    let (name, rest) = specifier.split_at(name_len);
    let subpath = rest.strip_prefix('/').filter(|s| !s.is_empty());
    Some((name, subpath))
}

/// Node-style lookup: `node_modules` in `dir` and each ancestor, then
/// `node_paths`. The first directory holding the package decides.
fn resolve_package(specifier: &str, dir: &Path, node_paths: &[PathBuf]) -> Option<PathBuf> {
    let (name, subpath) = split_package(specifier)?;
    let bases = dir
        .ancestors()
        .map(|d| d.join("node_modules"))
        .chain(node_paths.iter().cloned());

    for base in bases {
        let package_dir = base.join(name);
        if probe(&package_dir) != Some(EntryKind::Dir) {
            continue;
        }
        return match subpath {
            Some(subpath) => resolve_relative(&package_dir.join(subpath)),
            None => resolve_package_entry(&package_dir),
        };
    }
    None
}

fn resolve_package_entry(package_dir: &Path) -> Option<PathBuf> {
    let manifest = fs::read_to_string(package_dir.join("package.json"))
        .ok()
        .and_then(|text| match serde_json::from_str::<PackageJson>(&text) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::debug!(package = %package_dir.display(), error = %e, "unreadable package.json");
                None
            }
        })
        .unwrap_or_default();

    let browser = manifest
        .browser
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    let entry = [browser, manifest.module, manifest.main]
        .into_iter()
        .flatten()
        .find_map(|field| resolve_relative(&package_dir.join(field)));

    entry.or_else(|| {
        let index = package_dir.join(INDEX_FILE);
        (probe(&index) == Some(EntryKind::File))
            .then(|| dunce::canonicalize(&index).ok())
            .flatten()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{HookResult, Plugin, PluginContext, ResolveIdResult, ResolverPlugin};
    use crate::rules::{ResolutionRule, RuleChain};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn project() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        let out = root.join("dist/all/@angular");
        write(
            &out.join("core/index.js"),
            "export * from './src/core';\n",
        );
        write(&out.join("core/src/core.js"), "export const VERSION = 1;\n");
        write(
            &out.join("core/test/a_spec.js"),
            "import { VERSION } from '@angular/core';\nimport { help } from './helper';\nimport 'zone.js';\n",
        );
        write(&out.join("core/test/helper.js"), "export const help = 1;\n");
        (dir, root)
    }

    fn plugins(root: &Path) -> PluginContainer {
        let chain = RuleChain::new(vec![ResolutionRule::scoped_package(
            "scoped",
            "@angular/",
            root.join("dist/all/@angular"),
        )
        .unwrap()]);
        PluginContainer::new(root.to_path_buf()).with(Box::new(ResolverPlugin::new(Arc::new(chain))))
    }

    #[test]
    fn test_stage_graph_rewrites_plugin_edges() {
        let (_dir, root) = project();
        let plugins = plugins(&root);
        let staging = tempdir().unwrap();
        let stager = Stager {
            root: &root,
            staging: staging.path(),
            plugins: &plugins,
            node_paths: &[],
        };

        let graph = stager
            .stage_graph("import * as __0 from './dist/all/@angular/core/test/a_spec.js';\n")
            .unwrap();

        assert!(graph.diagnostics.is_empty());
        assert_eq!(graph.modules.len(), 4);

        let staged_spec = fs::read_to_string(
            staging.path().join("dist/all/@angular/core/test/a_spec.js"),
        )
        .unwrap();
        let staged_index = to_slash(&staging.path().join("dist/all/@angular/core/index.js"));
        assert!(staged_spec.contains(&format!("from '{staged_index}'")));
        // Relative and unclaimed bare imports are untouched.
        assert!(staged_spec.contains("from './helper'"));
        assert!(staged_spec.contains("import 'zone.js'"));

        assert!(staging.path().join("dist/all/@angular/core/src/core.js").is_file());
        assert!(staging.path().join("dist/all/@angular/core/test/helper.js").is_file());
    }

    #[test]
    fn test_missing_plugin_target_is_a_diagnostic() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        let chain = RuleChain::new(vec![ResolutionRule::fixed(
            "stub",
            "domino",
            root.join("dist/empty.js"),
        )
        .unwrap()]);
        let plugins =
            PluginContainer::new(root.clone()).with(Box::new(ResolverPlugin::new(Arc::new(chain))));
        let staging = tempdir().unwrap();
        let stager = Stager {
            root: &root,
            staging: staging.path(),
            plugins: &plugins,
            node_paths: &[],
        };

        let graph = stager.stage_graph("import 'domino';\n").unwrap();
        assert_eq!(graph.diagnostics.len(), 1);
        assert_eq!(graph.diagnostics[0].code, "BUNDLE_READ_ERROR");
    }

    /// Records every specifier it is asked about and claims none.
    struct Recording(Arc<Mutex<Vec<String>>>);

    impl Plugin for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn resolve_id(
            &self,
            specifier: &str,
            _importer: Option<&str>,
            _ctx: &PluginContext,
        ) -> HookResult<Option<ResolveIdResult>> {
            self.0.lock().unwrap().push(specifier.to_string());
            Ok(None)
        }
    }

    #[test]
    fn test_plugins_see_edges_inside_packages() {
        let (_dir, root) = project();
        write(
            &root.join("node_modules/somelib/package.json"),
            r#"{ "name": "somelib", "main": "lib/main.js" }"#,
        );
        write(
            &root.join("node_modules/somelib/lib/main.js"),
            "import { VERSION } from '@angular/core';\nexport const lib = VERSION;\n",
        );
        write(
            &root.join("dist/all/@angular/core/test/b_spec.js"),
            "import { lib } from 'somelib';\n",
        );

        // Recording goes first so it sees every edge, claimed or not.
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = RuleChain::new(vec![ResolutionRule::scoped_package(
            "scoped",
            "@angular/",
            root.join("dist/all/@angular"),
        )
        .unwrap()]);
        let plugins = PluginContainer::new(root.clone())
            .with(Box::new(Recording(Arc::clone(&seen))))
            .with(Box::new(ResolverPlugin::new(Arc::new(chain))));

        let staging = tempdir().unwrap();
        let stager = Stager {
            root: &root,
            staging: staging.path(),
            plugins: &plugins,
            node_paths: &[],
        };
        let graph = stager
            .stage_graph("import './dist/all/@angular/core/test/b_spec.js';\n")
            .unwrap();
        assert!(graph.diagnostics.is_empty(), "{:?}", graph.diagnostics);

        let seen = seen.lock().unwrap().clone();
        assert!(seen.contains(&"somelib".to_string()), "{seen:?}");
        assert!(seen.contains(&"@angular/core".to_string()), "{seen:?}");

        let staged_main = staging.path().join("node_modules/somelib/lib/main.js");
        let staged_index = to_slash(&staging.path().join("dist/all/@angular/core/index.js"));
        let main = fs::read_to_string(&staged_main).unwrap();
        assert!(main.contains(&format!("from '{staged_index}'")), "{main}");

        let spec =
            fs::read_to_string(staging.path().join("dist/all/@angular/core/test/b_spec.js")).unwrap();
        assert!(spec.contains(&format!("from '{}'", to_slash(&staged_main))), "{spec}");
    }

    #[test]
    fn test_split_package() {
        assert_eq!(split_package("rxjs"), Some(("rxjs", None)));
        assert_eq!(split_package("rxjs/operators"), Some(("rxjs", Some("operators"))));
        assert_eq!(split_package("@scope/pkg"), Some(("@scope/pkg", None)));
        assert_eq!(split_package("@scope/pkg/a/b"), Some(("@scope/pkg", Some("a/b"))));
        assert_eq!(split_package("@scope"), None);
    }

    #[test]
    fn test_resolve_package_entry_order() {
        let dir = tempdir().unwrap();
        let modules = dir.path().join("node_modules");
        write(
            &modules.join("both/package.json"),
            r#"{ "browser": "./browser.js", "main": "./main.js" }"#,
        );
        write(&modules.join("both/browser.js"), "");
        write(&modules.join("both/main.js"), "");
        write(
            &modules.join("objbrowser/package.json"),
            r#"{ "browser": { "fs": false }, "main": "lib/entry" }"#,
        );
        write(&modules.join("objbrowser/lib/entry.js"), "");
        write(&modules.join("plain/index.js"), "");
        write(&modules.join("@scope/pkg/sub/file.js"), "");

        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let found = |spec: &str| resolve_package(spec, &nested, &[]);
        assert!(found("both").unwrap().ends_with("both/browser.js"));
        assert!(found("objbrowser").unwrap().ends_with("lib/entry.js"));
        assert!(found("plain").unwrap().ends_with("plain/index.js"));
        assert!(found("@scope/pkg/sub/file").unwrap().ends_with("sub/file.js"));
        assert_eq!(found("missing"), None);
    }

    #[test]
    fn test_resolve_package_falls_back_to_node_paths() {
        let project = tempdir().unwrap();
        let shared = tempdir().unwrap();
        write(&shared.path().join("extra/index.js"), "");

        let found = resolve_package("extra", project.path(), &[shared.path().to_path_buf()]);
        assert!(found.unwrap().ends_with("extra/index.js"));
        assert_eq!(resolve_package("extra", project.path(), &[]), None);
    }

    #[test]
    fn test_builtins_and_absolute_paths_are_not_bare() {
        assert!(is_bare("rxjs"));
        assert!(is_bare("@angular/core"));
        assert!(!is_bare("node:fs"));
        assert!(!is_bare("/abs/file.js"));
        assert!(!is_bare("./rel"));
    }

    #[test]
    fn test_resolve_relative_prefers_file_over_index() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("util.js"), "");
        write(&dir.path().join("util/index.js"), "");

        let found = resolve_relative(&dir.path().join("util")).unwrap();
        assert!(found.ends_with("util.js"));
    }

    #[test]
    fn test_missing_binary_is_a_diagnostic() {
        let (_dir, root) = project();
        let engine = EsbuildEngine::new(root.join("node_modules/.bin/esbuild-missing"));
        let request = BundleRequest::iife("import './dist/all/@angular/core/index.js';\n", &root);

        let output = engine.bundle(&request, &plugins(&root)).unwrap();
        assert!(!output.is_ok());
        assert_eq!(output.diagnostics[0].code, "BUNDLE_ENGINE_SPAWN");
    }

    #[cfg(unix)]
    #[test]
    fn test_bundle_pipes_staged_entry_to_binary() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, root) = project();
        let bin = root.join("node_modules/.bin/esbuild");
        write(&bin, "#!/bin/sh\ncat\n");
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();

        let engine = EsbuildEngine::new(&bin);
        let request = BundleRequest::iife("import { VERSION } from '@angular/core';\n", &root);
        let output = engine.bundle(&request, &plugins(&root)).unwrap();

        assert!(output.is_ok(), "{:?}", output.diagnostics);
        assert!(output.code.contains("/dist/all/@angular/core/index.js'"));
        assert!(!output.code.contains("'@angular/core'"));
        assert_eq!(output.modules.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_a_diagnostic() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, root) = project();
        let bin = root.join("node_modules/.bin/esbuild");
        write(&bin, "#!/bin/sh\ncat > /dev/null\nexit 1\n");
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();

        let output = EsbuildEngine::new(&bin)
            .bundle(&BundleRequest::iife("", &root), &plugins(&root))
            .unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, "BUNDLE_ENGINE_FAILED");
    }
}
