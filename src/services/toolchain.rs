//! External tool dispatch.
//!
//! Maps a source file's extension to the external build command and argument
//! list. The mapping is a closed enum so adding a language is an exhaustive-
//! match change, not a new string branch.

use std::path::{Path, PathBuf};

use crate::models::job::BuildOptions;

/// Node runtime the JS packager targets.
const NODE_TARGET: &str = "node18";

/// A resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// The external tool responsible for one source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    /// Python packager (also the fallback for unrecognized extensions)
    PyInstaller,
    /// JS/TS-to-binary packager
    NodePkg,
    /// Java compiler: emits class files, does not link a single binary
    Javac,
    /// C compiler
    NativeC,
    /// C++ compiler
    NativeCpp,
    /// C# compiler
    Csc,
    /// Go compiler
    Go,
}

impl Toolchain {
    /// Select the toolchain for a source file. Unknown or missing extensions
    /// fall back to the Python packager.
    pub fn for_source(source: &Path) -> Self {
        let ext = source
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "py" => Toolchain::PyInstaller,
            "js" | "ts" => Toolchain::NodePkg,
            "java" => Toolchain::Javac,
            "c" => Toolchain::NativeC,
            "cpp" | "cc" | "cxx" => Toolchain::NativeCpp,
            "cs" => Toolchain::Csc,
            "go" => Toolchain::Go,
            _ => Toolchain::PyInstaller,
        }
    }

    /// True when the extension maps to a tool directly, without the fallback.
    /// Used when scanning fetched repositories for buildable sources.
    pub fn supports_extension(ext: &str) -> bool {
        matches!(
            ext.to_lowercase().as_str(),
            "py" | "js" | "ts" | "java" | "c" | "cpp" | "cc" | "cxx" | "cs" | "go"
        )
    }

    /// Human-readable tool name for status and error messages.
    pub fn tool_name(self) -> &'static str {
        match self {
            Toolchain::PyInstaller => "pyinstaller",
            Toolchain::NodePkg => "pkg",
            Toolchain::Javac => "javac",
            Toolchain::NativeC => "cc",
            Toolchain::NativeCpp => "c++",
            Toolchain::Csc => "csc",
            Toolchain::Go => "go",
        }
    }

    /// Name the produced output is given, before any tool-specific suffix.
    fn output_name(self, source: &Path, options: &BuildOptions) -> String {
        options.custom_name.clone().unwrap_or_else(|| {
            source
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string())
        })
    }

    /// Resolve the external command for building `source` into `build_dir`.
    ///
    /// Options apply only to tools that understand them: the Python packager
    /// takes the full set, the compilers honor the custom output name.
    pub fn resolve(self, build_dir: &Path, source: &Path, options: &BuildOptions) -> Invocation {
        let build_dir_arg = build_dir.to_string_lossy().into_owned();
        let source_arg = source.to_string_lossy().into_owned();
        let name = self.output_name(source, options);

        let args = match self {
            Toolchain::PyInstaller => {
                let mut args = Vec::new();
                args.push(if options.one_file { "--onefile" } else { "--onedir" }.to_string());
                if options.windowed {
                    args.push("--windowed".to_string());
                }
                if let Some(ref custom) = options.custom_name {
                    args.push("--name".to_string());
                    args.push(custom.clone());
                }
                if let Some(ref icon) = options.icon_path {
                    args.push("--icon".to_string());
                    args.push(icon.clone());
                }
                for import in BuildOptions::split_list(&options.hidden_imports) {
                    args.push("--hidden-import".to_string());
                    args.push(import);
                }
                for module in BuildOptions::split_list(&options.exclude_modules) {
                    args.push("--exclude-module".to_string());
                    args.push(module);
                }
                args.push("--distpath".to_string());
                args.push(build_dir_arg);
                args.push(source_arg);
                args
            }
            Toolchain::NodePkg => {
                let mut args = vec![source_arg, "--targets".to_string(), NODE_TARGET.to_string()];
                if options.custom_name.is_some() {
                    args.push("--output".to_string());
                    args.push(build_dir.join(&name).to_string_lossy().into_owned());
                } else {
                    args.push("--out-path".to_string());
                    args.push(build_dir_arg);
                }
                args
            }
            Toolchain::Javac => vec!["-d".to_string(), build_dir_arg, source_arg],
            Toolchain::NativeC | Toolchain::NativeCpp => vec![
                source_arg,
                "-o".to_string(),
                build_dir.join(&name).to_string_lossy().into_owned(),
            ],
            Toolchain::Csc => vec![
                format!("-out:{}", build_dir.join(format!("{name}.exe")).to_string_lossy()),
                source_arg,
            ],
            Toolchain::Go => vec![
                "build".to_string(),
                "-o".to_string(),
                build_dir.join(&name).to_string_lossy().into_owned(),
                source_arg,
            ],
        };

        Invocation {
            program: self.tool_name(),
            args,
        }
    }

    /// Where the produced binary lands, by each tool's naming convention.
    /// The runner registers it only if something actually exists there.
    pub fn expected_output(self, build_dir: &Path, source: &Path, options: &BuildOptions) -> PathBuf {
        let name = self.output_name(source, options);
        match self {
            Toolchain::PyInstaller => {
                if options.one_file {
                    build_dir.join(&name)
                } else {
                    build_dir.join(&name).join(&name)
                }
            }
            Toolchain::NodePkg | Toolchain::NativeC | Toolchain::NativeCpp | Toolchain::Go => {
                build_dir.join(&name)
            }
            Toolchain::Javac => build_dir.join(format!("{name}.class")),
            Toolchain::Csc => build_dir.join(format!("{name}.exe")),
        }
    }
}
