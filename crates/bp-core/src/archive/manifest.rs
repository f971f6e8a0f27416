use std::collections::HashSet;

use bytes::Bytes;

/// Prefix every archived entry name carries.
pub const ENTRY_PREFIX: &str = "compressed-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Bytes,
}

/// Ordered set of entries fed to the archive writer. Built fresh for every
/// assembly and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveManifest {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveManifest {
    /// Derives entry names from the original file names.
    ///
    /// Names are deterministic for a given input order. A name that already
    /// occurs earlier in the manifest gets a ` (n)` suffix before its extension.
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (String, Bytes)>,
    {
        let mut taken = HashSet::new();
        let entries = sources
            .into_iter()
            .map(|(original, bytes)| {
                let name = unique_name(entry_name(&original), &mut taken);
                ArchiveEntry { name, bytes }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ArchiveEntry> {
        self.entries
    }
}

/// `compressed-` followed by the file name without any directory part.
pub fn entry_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .filter(|base| !base.is_empty())
        .unwrap_or("image");
    format!("{ENTRY_PREFIX}{base}")
}

fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > ENTRY_PREFIX.len() => name.split_at(dot),
        _ => (name.as_str(), ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
