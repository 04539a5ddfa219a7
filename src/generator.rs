//! Odometer-style combination generator.
//!
//! Enumerates every string over an alphabet for each length in an inclusive
//! range, in lexicographic order with respect to the alphabet's own ordering:
//! one index per position, the last position ticks fastest, a carry past the
//! first position exhausts the current length and moves to the next.

pub struct CombinationGenerator {
    alphabet: Vec<char>,
    indices: Vec<usize>,
    current_length: usize,
    max_length: usize,
    fresh_length: bool,
}

impl CombinationGenerator {
    pub fn new(alphabet: Vec<char>, min_length: usize, max_length: usize) -> Self {
        CombinationGenerator {
            alphabet,
            indices: Vec::new(),
            current_length: min_length,
            max_length,
            fresh_length: true,
        }
    }

    /// Total number of candidates this generator will yield, saturating on
    /// overflow. Used for logging the size of the search space up front.
    pub fn space_size(&self) -> u64 {
        let k = self.alphabet.len() as u64;
        let mut total: u64 = 0;
        for length in self.current_length..=self.max_length {
            let mut combos: u64 = 1;
            for _ in 0..length {
                combos = combos.saturating_mul(k);
            }
            total = total.saturating_add(combos);
        }
        total
    }

    fn advance(&mut self) {
        let mut i = self.current_length - 1;
        loop {
            self.indices[i] += 1;
            if self.indices[i] < self.alphabet.len() {
                return;
            }
            self.indices[i] = 0;
            if i == 0 {
                // carried past the first position: this length is exhausted
                self.current_length += 1;
                self.fresh_length = true;
                return;
            }
            i -= 1;
        }
    }
}

impl Iterator for CombinationGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.alphabet.is_empty() || self.current_length > self.max_length {
            return None;
        }

        if self.fresh_length {
            self.indices = vec![0; self.current_length];
            self.fresh_length = false;
        } else {
            self.advance();
            if self.current_length > self.max_length {
                return None;
            }
            if self.fresh_length {
                self.indices = vec![0; self.current_length];
                self.fresh_length = false;
            }
        }

        Some(self.indices.iter().map(|&i| self.alphabet[i]).collect())
    }
}
