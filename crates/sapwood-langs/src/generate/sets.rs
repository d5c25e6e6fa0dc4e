/// Dense bit set over terminal indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    pub(crate) fn single(index: usize) -> Self {
        let mut set = Self::default();
        set.insert(index);
        set
    }

    pub(crate) fn insert(&mut self, index: usize) -> bool {
        let (word, bit) = (index / 64, index % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let before = self.words[word];
        self.words[word] |= 1u64 << bit;
        before != self.words[word]
    }

    pub(crate) fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|&w| w & (1u64 << (index % 64)) != 0)
    }

    /// Add every member of `other`; reports whether anything was new.
    pub(crate) fn union(&mut self, other: &TerminalSet) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64usize)
                .filter(move |&bit| word & (1u64 << bit) != 0)
                .map(move |bit| i * 64 + bit)
        })
    }
}
