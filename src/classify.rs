//! Source classification by language.

use indexmap::IndexMap;

use crate::graph::SourceFile;

/// Sources grouped by language, languages in order of first appearance.
pub type SourcesByLanguage<'a> = IndexMap<&'a str, Vec<&'a SourceFile>>;

/// Group `sources` by their resolved language.
///
/// Sources without a language (headers, plain text) are dropped. Within a
/// bucket, sources keep their encounter order so repeated runs over the same
/// input produce identical manifests.
#[must_use]
pub fn classify(sources: &[SourceFile]) -> SourcesByLanguage<'_> {
    let mut buckets = SourcesByLanguage::new();
    for source in sources {
        if let Some(language) = source.language() {
            buckets.entry(language).or_default().push(source);
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Properties;
    use rstest::rstest;

    fn source(path: &str, language: Option<&str>) -> SourceFile {
        SourceFile {
            path: path.into(),
            language: language.map(str::to_owned),
            object: None,
            properties: Properties::new(),
        }
    }

    fn paths<'a>(buckets: &SourcesByLanguage<'a>, language: &str) -> Vec<&'a str> {
        buckets
            .get(language)
            .map(|list| list.iter().map(|s| s.path.as_str()).collect())
            .unwrap_or_default()
    }

    #[rstest]
    fn groups_in_encounter_order() {
        let sources = vec![
            source("b.cpp", Some("CXX")),
            source("a.c", Some("C")),
            source("c.cpp", Some("CXX")),
            source("d.c", Some("C")),
        ];
        let buckets = classify(&sources);
        let languages: Vec<_> = buckets.keys().copied().collect();
        assert_eq!(languages, ["CXX", "C"]);
        assert_eq!(paths(&buckets, "CXX"), ["b.cpp", "c.cpp"]);
        assert_eq!(paths(&buckets, "C"), ["a.c", "d.c"]);
    }

    #[rstest]
    fn sources_without_language_are_dropped() {
        let sources = vec![
            source("notes.txt", None),
            source("header.h", Some("")),
            source("a.c", Some("C")),
        ];
        let buckets = classify(&sources);
        assert_eq!(buckets.len(), 1);
        assert_eq!(paths(&buckets, "C"), ["a.c"]);
    }

    #[rstest]
    fn empty_input_yields_no_buckets() {
        assert!(classify(&[]).is_empty());
    }
}
