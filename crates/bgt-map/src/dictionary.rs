//! Ordered synonym dictionary: canonical field name → aliases.

use bgt_common::{fold_key, normalize_text};

/// One canonical field and its known spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymEntry {
    canonical: String,
    aliases: Vec<String>,
    /// Folded canonical name followed by folded aliases.
    keys: Vec<String>,
}

impl SynonymEntry {
    fn new(canonical: String) -> Self {
        let keys = vec![fold_key(&canonical)];
        Self {
            canonical,
            aliases: Vec::new(),
            keys,
        }
    }

    fn add_alias(&mut self, alias: &str) -> bool {
        let alias = normalize_text(alias);
        if alias.is_empty() || self.aliases.contains(&alias) {
            return false;
        }
        self.keys.push(fold_key(&alias));
        self.aliases.push(alias);
        true
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Folded match keys: the canonical name and every alias.
    pub(crate) fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// Canonical names in registration order, each with de-duplicated aliases.
///
/// The dictionary is assembled once through [`SynonymDictionary::with_aliases`]
/// and [`SynonymDictionary::merge_reference`], then shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymDictionary {
    entries: Vec<SynonymEntry>,
}

impl SynonymDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from `(canonical, aliases)` pairs in order.
    pub fn from_pairs<I, C, A, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, A)>,
        C: AsRef<str>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |dict, (canonical, aliases)| {
                dict.with_aliases(canonical.as_ref(), aliases)
            })
    }

    /// Registers `canonical` (if new) and adds its aliases.
    ///
    /// Blank canonical names are ignored.
    pub fn with_aliases<A, S>(mut self, canonical: &str, aliases: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(entry) = self.entry_mut(canonical) {
            for alias in aliases {
                entry.add_alias(alias.as_ref());
            }
        }
        self
    }

    /// Merges a reference table (data dictionary) into the dictionary.
    ///
    /// Each row is `canonical, alias, alias, …`. Rows with a blank first cell
    /// are skipped, blank aliases are skipped, and unseen canonical names are
    /// appended in row order. Returns the dictionary and the number of rows
    /// that contributed.
    pub fn merge_reference<R, S>(self, rows: &[R]) -> (Self, usize)
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut merged = 0usize;
        let mut dict = self;
        for row in rows {
            let cells = row.as_ref();
            let Some((canonical, aliases)) = cells.split_first() else {
                continue;
            };
            let canonical = normalize_text(canonical.as_ref());
            if canonical.is_empty() {
                continue;
            }
            dict = dict.with_aliases(&canonical, aliases);
            merged += 1;
        }
        (dict, merged)
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn get(&self, canonical: &str) -> Option<&SynonymEntry> {
        let canonical = normalize_text(canonical);
        self.entries.iter().find(|e| e.canonical == canonical)
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.canonical.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, canonical: &str) -> Option<&mut SynonymEntry> {
        let canonical = normalize_text(canonical);
        if canonical.is_empty() {
            return None;
        }
        let index = match self.entries.iter().position(|e| e.canonical == canonical) {
            Some(index) => index,
            None => {
                self.entries.push(SynonymEntry::new(canonical));
                self.entries.len() - 1
            }
        };
        self.entries.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_normalized_and_deduplicated() {
        let dict = SynonymDictionary::new()
            .with_aliases("หน่วยงาน", ["กรม", " กรม ", "", "สถาบัน"])
            .with_aliases("หน่วยงาน", ["สถาบัน"]);
        let entry = dict.get("หน่วยงาน").expect("entry");
        assert_eq!(entry.aliases(), ["กรม", "สถาบัน"]);
    }

    #[test]
    fn registration_order_is_kept() {
        let dict = SynonymDictionary::from_pairs([
            ("แผนงาน", vec!["แผน"]),
            ("หน่วยงาน", vec!["กรม"]),
        ]);
        let names: Vec<&str> = dict.canonical_names().collect();
        assert_eq!(names, ["แผนงาน", "หน่วยงาน"]);
    }

    #[test]
    fn blank_canonical_is_ignored() {
        let dict = SynonymDictionary::new().with_aliases("  ", ["x"]);
        assert!(dict.is_empty());
    }

    #[test]
    fn reference_merge_is_additive() {
        let dict = SynonymDictionary::from_pairs([("หน่วยงาน", vec!["กรม"])]);
        let rows = vec![
            vec!["หน่วยงาน".to_string(), "ส่วนราชการ".to_string(), "กรม".to_string()],
            vec![String::new(), "ignored".to_string()],
            vec!["รหัสงบ".to_string(), String::new(), "budget code".to_string()],
        ];
        let (dict, merged) = dict.merge_reference(&rows);
        assert_eq!(merged, 2);
        assert_eq!(
            dict.get("หน่วยงาน").expect("entry").aliases(),
            ["กรม", "ส่วนราชการ"]
        );
        assert_eq!(dict.get("รหัสงบ").expect("entry").aliases(), ["budget code"]);
        let names: Vec<&str> = dict.canonical_names().collect();
        assert_eq!(names, ["หน่วยงาน", "รหัสงบ"]);
    }
}
