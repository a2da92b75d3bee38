//! Zero sets: which absorbed rows a candidate lies on.

const WORD_BITS: usize = usize::BITS as usize;

/// Growable bitset over row indices.
///
/// Trailing zero words are trimmed so equal sets compare and hash equal.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct SatSet {
    words: Vec<usize>,
}

impl SatSet {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_rows<I: IntoIterator<Item = usize>>(rows: I) -> Self {
        let mut set = Self::new();
        for row in rows {
            set.insert(row);
        }
        set
    }

    #[inline]
    fn trim(&mut self) {
        while self.words.last().is_some_and(|w| *w == 0) {
            self.words.pop();
        }
    }

    #[inline]
    pub(crate) fn contains(&self, row: usize) -> bool {
        self.words
            .get(row / WORD_BITS)
            .is_some_and(|w| (*w & (1usize << (row % WORD_BITS))) != 0)
    }

    #[inline]
    pub(crate) fn insert(&mut self, row: usize) {
        let word = row / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1usize << (row % WORD_BITS);
    }

    pub(crate) fn intersection(&self, other: &Self) -> Self {
        let mut out = Self {
            words: self
                .words
                .iter()
                .zip(other.words.iter())
                .map(|(a, b)| a & b)
                .collect(),
        };
        out.trim();
        out
    }

    pub(crate) fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w |= o;
        }
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// `self ⊆ other`.
    pub(crate) fn is_subset_of(&self, other: &Self) -> bool {
        self.words.iter().enumerate().all(|(i, w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &w)| {
            (0..WORD_BITS)
                .filter(move |&bit| w & (1usize << bit) != 0)
                .map(move |bit| i * WORD_BITS + bit)
        })
    }
}
