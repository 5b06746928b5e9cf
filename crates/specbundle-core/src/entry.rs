//! Synthesized entry module.
//!
//! The entry imports the test bootstrap and then every spec under a numbered
//! namespace. Spec packages declare `"sideEffects": false`, so a bare import
//! list would be tree-shaken away; each namespace is therefore passed through
//! an identity function built at runtime (`new Function('x', 'return x')`),
//! which the bundler cannot prove unused.
//!
//! Generation ([`EntryModule::from_specs`]) and rendering
//! ([`EntryModule::render`]) are separate so either can be tested alone.

use specbundle_util::path::relative_slash;
use specbundle_util::path::to_slash;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// One line of the entry module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `import '<specifier>';`
    Bootstrap { specifier: String },
    /// `import * as <namespace> from '<specifier>';`
    NamespaceImport { namespace: String, specifier: String },
    /// `new Function('x', 'return x')(<namespace>);`
    Retain { namespace: String },
}

/// Statements of the entry module, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryModule {
    statements: Vec<Statement>,
}

impl EntryModule {
    /// Build the entry for `specs`, in the order given.
    ///
    /// Spec paths are made relative to `project_dir` with `/` separators.
    /// Namespaces are `__0`, `__1`, ... in input order.
    #[must_use]
    pub fn from_specs(bootstrap: &str, project_dir: &Path, specs: &[PathBuf]) -> Self {
        let mut statements = Vec::with_capacity(1 + specs.len() * 2);
        statements.push(Statement::Bootstrap {
            specifier: bootstrap.to_string(),
        });

        let namespaces: Vec<String> = (0..specs.len()).map(|i| format!("__{i}")).collect();

        for (spec, namespace) in specs.iter().zip(&namespaces) {
            statements.push(Statement::NamespaceImport {
                namespace: namespace.clone(),
                specifier: module_specifier(spec, project_dir),
            });
        }

        statements.extend(namespaces.into_iter().map(|namespace| Statement::Retain { namespace }));

        Self { statements }
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of spec imports.
    #[must_use]
    pub fn spec_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s, Statement::NamespaceImport { .. }))
            .count()
    }

    /// Serialize to JavaScript source, one statement per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            // Writing to a String cannot fail.
            let _ = match statement {
                Statement::Bootstrap { specifier } => writeln!(out, "import '{specifier}';"),
                Statement::NamespaceImport {
                    namespace,
                    specifier,
                } => writeln!(out, "import * as {namespace} from '{specifier}';"),
                Statement::Retain { namespace } => {
                    writeln!(out, "new Function('x', 'return x')({namespace});")
                }
            };
        }
        out
    }
}

/// `./`-prefixed, `/`-separated specifier for `spec` as seen from `project_dir`.
fn module_specifier(spec: &Path, project_dir: &Path) -> String {
    match relative_slash(spec, project_dir) {
        Some(rel) => format!("./{rel}"),
        None => to_slash(spec),
    }
}
