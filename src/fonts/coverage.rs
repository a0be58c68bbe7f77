//! Typeface pool keyed by name, queried by character coverage

use crate::fonts::oracle::{CmapOracle, GlyphCoverageOracle};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File extensions scanned when loading a directory
pub const TYPEFACE_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// One loaded typeface and the characters it can render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypefaceRecord {
    /// Unique key, the file stem of the source file
    pub name: String,
    pub glyph_set: BTreeSet<u32>,
    pub source_path: PathBuf,
}

impl TypefaceRecord {
    pub fn supports(&self, character: char) -> bool {
        self.glyph_set.contains(&u32::from(character))
    }
}

/// Index of loaded typefaces.
///
/// Names iterate in sorted order, so seeded selections are reproducible.
/// Every record has a non-empty glyph set.
#[derive(Debug, Clone, Default)]
pub struct GlyphCoverageIndex {
    records: BTreeMap<String, TypefaceRecord>,
}

impl GlyphCoverageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records that were obtained elsewhere.
    ///
    /// Records without coverage are skipped.
    pub fn from_records(records: impl IntoIterator<Item = TypefaceRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    fn insert(&mut self, record: TypefaceRecord) {
        if record.glyph_set.is_empty() {
            warn!("Skipping typeface {} with empty coverage", record.name);
            return;
        }
        if let Some(previous) = self.records.get(&record.name) {
            warn!(
                "Typeface name {} from {:?} replaces the one from {:?}",
                record.name, record.source_path, previous.source_path
            );
        }
        self.records.insert(record.name.clone(), record);
    }

    /// Load every `.ttf`/`.otf` file in `directory` using the font's cmap.
    ///
    /// See [`GlyphCoverageIndex::load_with`].
    pub fn load(&mut self, directory: impl AsRef<Path>) -> usize {
        self.load_with(directory, &CmapOracle)
    }

    /// Replace the index with the typefaces found in `directory`.
    ///
    /// Files the oracle cannot read are logged and skipped. A missing
    /// directory loads nothing. Files sharing a stem collapse into one
    /// typeface, the last in path order. Returns the number of typefaces
    /// now in the index.
    pub fn load_with(&mut self, directory: impl AsRef<Path>, oracle: &dyn GlyphCoverageOracle) -> usize {
        let directory = directory.as_ref();
        self.records.clear();

        let paths = match typeface_files(directory) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Cannot scan typeface directory {:?}: {}", directory, e);
                return 0;
            }
        };

        for path in paths {
            let Some(name) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
                continue;
            };
            match oracle.glyph_coverage(&path) {
                Ok(glyph_set) => {
                    info!("Loaded typeface {} ({} characters)", name, glyph_set.len());
                    let record = TypefaceRecord {
                        name,
                        glyph_set,
                        source_path: path,
                    };
                    self.insert(record);
                }
                Err(e) => warn!("Skipping typeface file: {}", e),
            }
        }

        debug!("Typeface index holds {} entries", self.records.len());
        self.records.len()
    }

    /// Names of every typeface covering `character`, sorted
    pub fn supporting_typefaces(&self, character: char) -> Vec<&str> {
        self.records
            .values()
            .filter(|record| record.supports(character))
            .map(|record| record.name.as_str())
            .collect()
    }

    /// A uniformly chosen typeface covering `character`, or `None` when
    /// no loaded typeface can render it
    pub fn random_supporting_typeface<R: Rng + ?Sized>(&self, rng: &mut R, character: char) -> Option<&str> {
        self.supporting_typefaces(character).choose(rng).copied()
    }

    /// A uniformly chosen typeface regardless of coverage
    pub fn random_typeface<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        let names: Vec<&str> = self.typeface_names().collect();
        names.choose(rng).copied()
    }

    pub fn typeface_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn typeface_names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn record(&self, name: &str) -> Option<&TypefaceRecord> {
        self.records.get(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &TypefaceRecord> {
        self.records.values()
    }

    pub fn is_char_supported(&self, name: &str, character: char) -> bool {
        self.record(name).is_some_and(|record| record.supports(character))
    }
}

/// Typeface files directly inside `directory`, in sorted order.
///
/// A directory that does not exist holds no typefaces.
fn typeface_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !directory.exists() {
        info!("Typeface directory {:?} does not exist", directory);
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && has_typeface_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn has_typeface_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TYPEFACE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::fonts::oracle::CoverageError;
    use std::collections::HashMap;

    /// Coverage keyed by file name; unknown files fail to parse
    #[derive(Debug, Default)]
    pub struct MapOracle {
        pub coverage: HashMap<String, BTreeSet<u32>>,
    }

    impl MapOracle {
        pub fn with(mut self, file_name: &str, characters: &str) -> Self {
            self.coverage.insert(
                file_name.to_string(),
                characters.chars().map(u32::from).collect(),
            );
            self
        }
    }

    impl GlyphCoverageOracle for MapOracle {
        fn glyph_coverage(&self, path: &Path) -> Result<BTreeSet<u32>, CoverageError> {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.coverage
                .get(&file_name)
                .cloned()
                .ok_or_else(|| CoverageError::Parse {
                    path: path.to_path_buf(),
                    message: "unknown test font".to_string(),
                })
        }
    }

    pub fn record(name: &str, characters: &str) -> TypefaceRecord {
        TypefaceRecord {
            name: name.to_string(),
            glyph_set: characters.chars().map(u32::from).collect(),
            source_path: PathBuf::from(format!("{name}.ttf")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{record, MapOracle};
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"stub").unwrap();
    }

    #[test]
    fn test_load_skips_unparsable_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Alpha.ttf");
        touch(dir.path(), "Beta.OTF");
        touch(dir.path(), "Broken.ttf");
        touch(dir.path(), "notes.txt");

        let oracle = MapOracle::default()
            .with("Alpha.ttf", "abc")
            .with("Beta.OTF", "cde")
            .with("notes.txt", "xyz");

        let mut index = GlyphCoverageIndex::new();
        assert_eq!(index.load_with(dir.path(), &oracle), 2);
        assert_eq!(index.typeface_names().collect::<Vec<_>>(), vec!["Alpha", "Beta"]);
        assert_eq!(index.record("Alpha").unwrap().source_path, dir.path().join("Alpha.ttf"));
    }

    #[test]
    fn test_same_stem_counts_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Alpha.otf");
        touch(dir.path(), "Alpha.ttf");
        touch(dir.path(), "Beta.ttf");

        let oracle = MapOracle::default()
            .with("Alpha.otf", "ab")
            .with("Alpha.ttf", "abc")
            .with("Beta.ttf", "b");

        let mut index = GlyphCoverageIndex::new();
        assert_eq!(index.load_with(dir.path(), &oracle), 2);
        assert_eq!(index.typeface_count(), 2);
        let alpha = index.record("Alpha").unwrap();
        assert_eq!(alpha.source_path, dir.path().join("Alpha.ttf"));
        assert_eq!(alpha.glyph_set.len(), 3);
    }

    #[test]
    fn test_reload_replaces_previous_state() {
        let first = tempfile::tempdir().unwrap();
        touch(first.path(), "Alpha.ttf");
        let second = tempfile::tempdir().unwrap();
        touch(second.path(), "Gamma.ttf");

        let oracle = MapOracle::default()
            .with("Alpha.ttf", "a")
            .with("Gamma.ttf", "g");

        let mut index = GlyphCoverageIndex::new();
        index.load_with(first.path(), &oracle);
        assert_eq!(index.load_with(second.path(), &oracle), 1);
        assert_eq!(index.typeface_names().collect::<Vec<_>>(), vec!["Gamma"]);
    }

    #[test]
    fn test_missing_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = GlyphCoverageIndex::from_records([record("Alpha", "a")]);

        assert_eq!(index.load(dir.path().join("no-such-dir")), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_empty_coverage_is_excluded() {
        let index = GlyphCoverageIndex::from_records([record("Empty", ""), record("Full", "x")]);
        assert_eq!(index.typeface_count(), 1);
        assert!(index.record("Empty").is_none());
    }

    #[test]
    fn test_supporting_typefaces_matches_glyph_sets() {
        let index = GlyphCoverageIndex::from_records([
            record("One", "Hi"),
            record("Two", "i!"),
            record("Three", "码"),
        ]);

        for character in ['H', 'i', '!', '码', 'z'] {
            let supporting = index.supporting_typefaces(character);
            for record in index.records() {
                assert_eq!(
                    supporting.contains(&record.name.as_str()),
                    record.glyph_set.contains(&u32::from(character)),
                    "{character} vs {}",
                    record.name
                );
            }
        }
        assert_eq!(index.supporting_typefaces('i'), vec!["One", "Two"]);
        assert!(index.supporting_typefaces('z').is_empty());
        assert!(GlyphCoverageIndex::new().supporting_typefaces('a').is_empty());
    }

    #[test]
    fn test_random_selection_with_fixed_seed() {
        let index = GlyphCoverageIndex::from_records([record("OnlyLatin", "A")]);
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..20 {
            assert_eq!(index.random_supporting_typeface(&mut rng, 'A'), Some("OnlyLatin"));
            assert_eq!(index.random_supporting_typeface(&mut rng, '码'), None);
        }
    }

    #[test]
    fn test_random_typeface() {
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(GlyphCoverageIndex::new().random_typeface(&mut rng), None);

        let index = GlyphCoverageIndex::from_records([record("A", "a"), record("B", "b")]);
        let mut seen = BTreeSet::new();
        for _ in 0..100 {
            seen.insert(index.random_typeface(&mut rng).unwrap());
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_is_char_supported() {
        let index = GlyphCoverageIndex::from_records([record("A", "ab")]);
        assert!(index.is_char_supported("A", 'a'));
        assert!(!index.is_char_supported("A", 'c'));
        assert!(!index.is_char_supported("Missing", 'a'));
    }
}
