//! Sets of DFA states used as partition groups by the minimizer.
//!
//! A `StateSet` keeps up to 128 bits inline and moves to a heap buffer once a
//! larger bit count is needed. A `complement` flag lets "every state except
//! these" be stored without materializing the full set. The complement is
//! bounded by the bit count: over `n` bits it is `[0, n) \ S`.

const WORD_BITS: usize = u64::BITS as usize;
const INLINE_WORDS: usize = 2;

fn words_for(nbits: usize) -> usize {
    (nbits + WORD_BITS - 1) / WORD_BITS
}

#[derive(Debug, Clone)]
enum Storage {
    Inline([u64; INLINE_WORDS]),
    Heap(Vec<u64>),
}

impl Storage {
    fn with_words(words: usize) -> Self {
        if words <= INLINE_WORDS {
            Storage::Inline([0; INLINE_WORDS])
        } else {
            Storage::Heap(vec![0; words])
        }
    }

    fn words(&self) -> &[u64] {
        match self {
            Storage::Inline(words) => words,
            Storage::Heap(words) => words,
        }
    }

    fn words_mut(&mut self) -> &mut [u64] {
        match self {
            Storage::Inline(words) => words,
            Storage::Heap(words) => words,
        }
    }

    fn grow(&mut self, words: usize) {
        match self {
            Storage::Inline(_) if words <= INLINE_WORDS => {}
            Storage::Inline(inline) => {
                let mut heap = inline.to_vec();
                heap.resize(words, 0);
                *self = Storage::Heap(heap);
            }
            Storage::Heap(heap) => {
                if heap.len() < words {
                    heap.resize(words, 0);
                }
            }
        }
    }
}

/// A set of state indices below [`StateSet::num_bits`].
///
/// Raw bits at or beyond `nbits` are always zero.
#[derive(Debug, Clone)]
pub struct StateSet {
    nbits: usize,
    complement: bool,
    storage: Storage,
}

impl StateSet {
    /// An empty set able to hold `nbits` states without growing.
    pub fn new(nbits: usize) -> Self {
        Self {
            nbits,
            complement: false,
            storage: Storage::with_words(words_for(nbits)),
        }
    }

    /// The set `[0, nbits)`.
    pub fn full(nbits: usize) -> Self {
        Self::new(nbits).complement_of()
    }

    pub fn with_members(nbits: usize, members: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(nbits);
        for state in members {
            set.add(state);
        }
        set
    }

    pub fn num_bits(&self) -> usize {
        self.nbits
    }

    pub fn is_complement(&self) -> bool {
        self.complement
    }

    pub fn contains(&self, state: usize) -> bool {
        state < self.nbits && (self.raw(state) != self.complement)
    }

    /// Insert `state`, growing the set when it lies beyond the bit count.
    pub fn add(&mut self, state: usize) {
        if state >= self.nbits {
            self.grow(state + 1);
        }
        let complement = self.complement;
        self.set_raw(state, !complement);
    }

    pub fn remove(&mut self, state: usize) {
        if state < self.nbits {
            let complement = self.complement;
            self.set_raw(state, complement);
        }
    }

    pub fn complement_of(&self) -> Self {
        Self {
            complement: !self.complement,
            ..self.clone()
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        (0..words_for(self.nbits))
            .map(|w| self.member_word(w).count_ones() as usize)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        (0..words_for(self.nbits)).all(|w| self.member_word(w) == 0)
    }

    /// Smallest member, if any.
    pub fn first(&self) -> Option<usize> {
        self.iter().next()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..words_for(self.nbits)).flat_map(move |w| {
            let mut word = self.member_word(w);
            std::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let bit = word.trailing_zeros() as usize;
                word &= word - 1;
                Some(w * WORD_BITS + bit)
            })
        })
    }

    pub fn union_with(&mut self, other: &StateSet) {
        for state in other.iter() {
            self.add(state);
        }
    }

    pub fn difference_with(&mut self, other: &StateSet) {
        for state in other.iter() {
            self.remove(state);
        }
    }

    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.iter().all(|state| other.contains(state))
    }

    pub fn is_disjoint(&self, other: &StateSet) -> bool {
        !self.iter().any(|state| other.contains(state))
    }

    fn grow(&mut self, nbits: usize) {
        let old = self.nbits;
        self.storage.grow(words_for(nbits));
        self.nbits = nbits;
        // new bits of a complemented set start out as non-members
        if self.complement {
            for state in old..nbits {
                self.set_raw(state, true);
            }
        }
    }

    fn raw(&self, state: usize) -> bool {
        let word = self.storage.words()[state / WORD_BITS];
        word & (1 << (state % WORD_BITS)) != 0
    }

    fn set_raw(&mut self, state: usize, value: bool) {
        let word = &mut self.storage.words_mut()[state / WORD_BITS];
        let mask = 1u64 << (state % WORD_BITS);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Membership bits of word `w`, with the complement applied.
    fn member_word(&self, w: usize) -> u64 {
        let raw = self.storage.words().get(w).copied().unwrap_or(0);
        if !self.complement {
            return raw;
        }
        let start = w * WORD_BITS;
        let valid = if start >= self.nbits {
            0
        } else if self.nbits - start >= WORD_BITS {
            u64::MAX
        } else {
            (1u64 << (self.nbits - start)) - 1
        };
        !raw & valid
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        let words = words_for(self.nbits.max(other.nbits));
        (0..words).all(|w| self.member_word(w) == other.member_word(w))
    }
}

impl Eq for StateSet {}
