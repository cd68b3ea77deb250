//! File classification by extension
//!
//! Classification is multi-label: a `.csproj` counts as both .NET and XML.

use anyhow::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Node,
    Python,
    Dotnet,
    Sql,
    Yaml,
    Json,
    Markdown,
    Xml,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Node,
        Language::Python,
        Language::Dotnet,
        Language::Sql,
        Language::Yaml,
        Language::Json,
        Language::Markdown,
        Language::Xml,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Language::Node => "node",
            Language::Python => "python",
            Language::Dotnet => "dotnet",
            Language::Sql => "sql",
            Language::Yaml => "yaml",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Xml => "xml",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::Node => &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs"],
            Language::Python => &[".py", ".pyx", ".pxd", ".pxi", ".pyi", ".ipynb"],
            Language::Dotnet => &[".cs", ".vb", ".fs", ".csproj", ".vbproj", ".fsproj", ".sqlproj", ".sln"],
            Language::Sql => &[".sql"],
            Language::Yaml => &[".yml", ".yaml"],
            Language::Json => &[".json", ".jsonc"],
            Language::Markdown => &[".md", ".mdx"],
            Language::Xml => &[".xml", ".csproj", ".vbproj", ".fsproj", ".sqlproj", ".props", ".targets"],
        }
    }

    pub fn matches(self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        self.extensions().iter().any(|ext| lower.ends_with(ext))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Languages present in one change set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageClassification {
    present: BTreeSet<Language>,
}

impl LanguageClassification {
    pub fn classify<S: AsRef<str>>(files: &[S]) -> Self {
        let present = Language::ALL
            .into_iter()
            .filter(|language| files.iter().any(|file| language.matches(file.as_ref())))
            .collect();

        Self { present }
    }

    pub fn has(&self, language: Language) -> bool {
        self.present.contains(&language)
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.present.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

impl fmt::Display for LanguageClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.languages().map(Language::tag).collect();
        if tags.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&tags.join(", "))
        }
    }
}

/// Dependency-manifest families the post-merge hook installs for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFamily {
    Node,
    Python,
    Dotnet,
}

impl ManifestFamily {
    pub const ALL: [ManifestFamily; 3] = [ManifestFamily::Node, ManifestFamily::Python, ManifestFamily::Dotnet];

    pub fn name(self) -> &'static str {
        match self {
            ManifestFamily::Node => "Node",
            ManifestFamily::Python => "Python",
            ManifestFamily::Dotnet => ".NET",
        }
    }

    /// File-name globs identifying this family's manifests
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            ManifestFamily::Node => &["package.json", "package-lock.json", "pnpm-lock.yaml", "yarn.lock"],
            ManifestFamily::Python => &["requirements*.txt"],
            ManifestFamily::Dotnet => &[
                "*.csproj",
                "*.fsproj",
                "*.vbproj",
                "*.sqlproj",
                "*.sln",
                "Directory.Packages.props",
            ],
        }
    }

    fn glob_set(self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.patterns() {
            builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
        }
        Ok(builder.build()?)
    }

    /// Files among `files` whose name matches this family
    pub fn matching<S: AsRef<str>>(self, files: &[S]) -> Result<Vec<String>> {
        let set = self.glob_set()?;
        let mut matched = Vec::new();
        for file in files {
            let file: &str = file.as_ref();
            let is_manifest = Path::new(file)
                .file_name()
                .is_some_and(|name| set.is_match(Path::new(name)));
            if is_manifest {
                matched.push(file.to_string());
            }
        }
        Ok(matched)
    }
}
