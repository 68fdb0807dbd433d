//! Dependency manifest writer.
//!
//! This module converts a [`DependencyRecord`] into the script consumed by
//! the dependency scanner, and a list of manifest paths into the project-wide
//! manifest of manifests. Sections are always written in the same order so
//! unchanged input yields byte-identical output.

use std::fmt::{self, Display, Formatter};

use crate::paths::escape_for_persistence;
use crate::record::{DependencyRecord, IncludePath, LanguageRecord};

/// File name of a target's dependency manifest.
pub const DEPEND_INFO_FILE: &str = "DependInfo.cmake";
/// File name of the project-wide manifest, under `CMakeFiles/`.
pub const DEPEND_INFO_MANIFEST_FILE: &str = "Makefile.cmake";

/// Render one target's dependency manifest.
#[must_use]
pub fn generate(record: &DependencyRecord) -> String {
    DisplayRecord(record).to_string()
}

/// Render the project manifest listing every target manifest.
#[must_use]
pub fn generate_manifest(paths: &[String]) -> String {
    DisplayManifest(paths).to_string()
}

struct DisplayManifest<'a>(&'a [String]);

impl Display for DisplayManifest<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Dependency information for all targets:")?;
        write!(f, "{}", ListBlock::new("CMAKE_DEPEND_INFO_FILES", self.0))
    }
}

/// A `SET(NAME ...)` block with one quoted entry per line.
struct ListBlock<'a, I> {
    name: &'a str,
    items: I,
}

impl<'a, I> ListBlock<'a, I> {
    const fn new(name: &'a str, items: I) -> Self {
        Self { name, items }
    }
}

impl<I> Display for ListBlock<'_, I>
where
    I: IntoIterator + Copy,
    I::Item: AsRef<str>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "SET({}", self.name)?;
        for item in self.items {
            writeln!(f, "  {}", escape_for_persistence(item.as_ref()))?;
        }
        writeln!(f, "  )")
    }
}

struct DisplayLanguage<'a>(&'a LanguageRecord);

impl Display for DisplayLanguage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let lang = self.0;
        writeln!(f, "SET(CMAKE_DEPENDS_CHECK_{}", lang.language)?;
        for pair in &lang.pairs {
            writeln!(
                f,
                "  {} {}",
                escape_for_persistence(&pair.source),
                escape_for_persistence(&pair.output)
            )?;
        }
        writeln!(f, "  )")?;
        if let Some(id) = &lang.compiler_id {
            writeln!(
                f,
                "SET(CMAKE_{}_COMPILER_ID {})",
                lang.language,
                escape_for_persistence(id)
            )?;
        }
        Ok(())
    }
}

struct DisplayIncludePath<'a>(&'a IncludePath);

impl Display for DisplayIncludePath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let include = self.0;
        let reference = format!("CMAKE_{}_TARGET_INCLUDE_PATH", include.reference_language);
        writeln!(f, "# The include file search paths:")?;
        write!(f, "{}", ListBlock::new(&reference, &include.directories))?;
        for alias in &include.aliases {
            writeln!(f, "SET(CMAKE_{alias}_TARGET_INCLUDE_PATH ${{{reference}}})")?;
        }
        Ok(())
    }
}

struct DisplayRecord<'a>(&'a DependencyRecord);

impl Display for DisplayRecord<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let record = self.0;
        writeln!(
            f,
            "# The set of languages for which implicit dependencies are needed:"
        )?;
        let languages: Vec<&str> = record
            .languages
            .iter()
            .map(|l| l.language.as_str())
            .collect();
        write!(f, "{}", ListBlock::new("CMAKE_DEPENDS_LANGUAGES", &languages))?;

        writeln!(f, "# The set of files for implicit dependencies of each language:")?;
        for lang in &record.languages {
            write!(f, "{}", DisplayLanguage(lang))?;
        }

        if !record.definitions.is_empty() {
            writeln!(f)?;
            writeln!(f, "# Preprocessor definitions for this target.")?;
            write!(
                f,
                "{}",
                ListBlock::new("CMAKE_TARGET_DEFINITIONS", &record.definitions)
            )?;
        }

        if !record.include_transforms.is_empty() {
            write!(
                f,
                "{}",
                ListBlock::new("CMAKE_INCLUDE_TRANSFORMS", &record.include_transforms)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "# Targets to which this target links.")?;
        write!(
            f,
            "{}",
            ListBlock::new("CMAKE_TARGET_LINKED_INFO_FILES", &record.linked_info_files)
        )?;

        writeln!(f)?;
        write!(f, "{}", DisplayIncludePath(&record.include_path))
    }
}
