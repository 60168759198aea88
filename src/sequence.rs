use bit_set::BitSet;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{MiningError, Result};

/// One transaction of a customer: the items bought together.
pub type Itemset = BitSet;
pub type Pattern = Vec<Item>;

/// Dense id of a symbol inside an [`Alphabet`].
///
/// Ids are handed out in symbol order, so comparing two patterns of ids
/// gives the same answer as comparing the symbol sequences they stand for.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Item(usize);

impl Item {
    pub fn new(index: usize) -> Self {
        Item(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// The sorted, duplicate-free set of symbols seen in a database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<String>,
    ids: HashMap<String, Item>,
    separator: &'static str,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::from_symbols(Vec::<String>::new())
    }
}

impl Alphabet {
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = symbols.into_iter().map(Into::into).collect();
        let symbols: Vec<String> = sorted.into_iter().collect();
        let ids = symbols
            .iter()
            .enumerate()
            .map(|(idx, symbol)| (symbol.clone(), Item::new(idx)))
            .collect();
        // Single-character alphabets concatenate, anything wider is comma separated.
        let separator = if symbols.iter().all(|s| s.chars().count() == 1) {
            ""
        } else {
            ","
        };

        Self {
            symbols,
            ids,
            separator,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn item(&self, symbol: &str) -> Option<Item> {
        self.ids.get(symbol).copied()
    }

    /// Panics if `item` was not issued by this alphabet.
    pub fn symbol(&self, item: Item) -> &str {
        &self.symbols[item.index()]
    }

    /// Translate a symbol sequence into a pattern, `None` if any symbol is unknown.
    pub fn pattern<S: AsRef<str>>(&self, symbols: &[S]) -> Option<Pattern> {
        symbols.iter().map(|s| self.item(s.as_ref())).collect()
    }

    /// Text form of a pattern. Single-character alphabets concatenate
    /// (`abc`), anything wider is comma separated (`foo,bar`).
    pub fn render(&self, pattern: &[Item]) -> String {
        pattern
            .iter()
            .map(|&item| self.symbol(item))
            .collect::<Vec<_>>()
            .join(self.separator)
    }
}

/// The ordered history of a single customer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerSequence {
    itemsets: Vec<Itemset>,
}

impl CustomerSequence {
    pub fn new(itemsets: Vec<Itemset>) -> Self {
        Self { itemsets }
    }

    pub fn from_items<I, T>(itemsets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = Item>,
    {
        let itemsets = itemsets
            .into_iter()
            .map(|items| items.into_iter().map(Item::index).collect())
            .collect();

        Self { itemsets }
    }

    pub fn itemsets(&self) -> &[Itemset] {
        &self.itemsets
    }

    /// Number of itemsets.
    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Every distinct item of the sequence, whatever itemset it occurs in.
    pub fn distinct_items(&self) -> Vec<Item> {
        let mut all = BitSet::new();
        for itemset in &self.itemsets {
            all.union_with(itemset);
        }
        all.iter().map(Item::new).collect()
    }
}

/// The three counts announced on the first line of a database file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub sequence_count: usize,
    pub max_itemsets: usize,
    pub distinct_items: usize,
}

impl Header {
    fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(MiningError::parse(
                1,
                line,
                "header must hold three integers",
            ));
        }

        let mut counts = [0usize; 3];
        for (count, field) in counts.iter_mut().zip(&fields) {
            *count = field.parse().map_err(|_| {
                MiningError::parse(1, line, format!("header field {:?} is not a count", field))
            })?;
        }

        Ok(Self {
            sequence_count: counts[0],
            max_itemsets: counts[1],
            distinct_items: counts[2],
        })
    }
}

/// The parsed database, read-only once built.
#[derive(Clone, Debug, Default)]
pub struct SequenceStore {
    sequences: Vec<CustomerSequence>,
    by_size: BTreeMap<usize, Vec<usize>>,
    alphabet: Alphabet,
    header: Header,
}

impl SequenceStore {
    /// Parse a whole database. A single malformed line rejects the input.
    pub fn load(raw: &str) -> Result<Self> {
        let mut lines = raw
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')));

        let header_line = match lines.next() {
            Some((_, line)) => line,
            None => return Err(MiningError::parse(1, "", "empty database")),
        };
        let header = Header::parse(header_line)?;
        if header.sequence_count == 0 {
            return Err(MiningError::parse(1, header_line, "empty database"));
        }

        let mut data: Vec<(usize, &str)> = lines.collect();
        while data.last().map_or(false, |(_, line)| line.trim().is_empty()) {
            data.pop();
        }
        if data.len() != header.sequence_count {
            return Err(MiningError::parse(
                1,
                header_line,
                format!(
                    "header declares {} sequences but {} lines follow",
                    header.sequence_count,
                    data.len()
                ),
            ));
        }

        let mut parsed = Vec::with_capacity(data.len());
        for (line_number, line) in data {
            let itemsets = parse_sequence(line_number, line)?;
            if itemsets.len() > header.max_itemsets {
                return Err(MiningError::parse(
                    line_number,
                    line,
                    format!(
                        "{} itemsets exceed the declared maximum of {}",
                        itemsets.len(),
                        header.max_itemsets
                    ),
                ));
            }
            parsed.push(itemsets);
        }

        let store = Self::from_tokens(header, parsed);
        if store.alphabet.len() != header.distinct_items {
            tracing::warn!(
                "header declares {} distinct items, database holds {}",
                header.distinct_items,
                store.alphabet.len()
            );
        }
        tracing::info!(
            "loaded {} customer sequences over {} items",
            store.len(),
            store.alphabet.len()
        );

        Ok(store)
    }

    /// Read and parse a database file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| MiningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&raw)
    }

    fn from_tokens<S: AsRef<str>>(header: Header, parsed: Vec<Vec<Vec<S>>>) -> Self {
        let alphabet = Alphabet::from_symbols(
            parsed
                .iter()
                .flatten()
                .flatten()
                .map(|symbol| symbol.as_ref().to_string()),
        );

        let mut sequences = Vec::with_capacity(parsed.len());
        let mut by_size: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for itemsets in parsed {
            let sequence = CustomerSequence::from_items(itemsets.iter().map(|itemset| {
                itemset
                    .iter()
                    .filter_map(|symbol| alphabet.item(symbol.as_ref()))
                    .collect::<Vec<_>>()
            }));
            by_size.entry(sequence.len()).or_default().push(sequences.len());
            sequences.push(sequence);
        }

        Self {
            sequences,
            by_size,
            alphabet,
            header,
        }
    }

    pub fn sequences(&self) -> &[CustomerSequence] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn header(&self) -> Header {
        self.header
    }

    /// Itemset count of the longest sequence.
    pub fn max_sequence_len(&self) -> usize {
        self.by_size.keys().next_back().copied().unwrap_or(0)
    }

    /// Sequences holding at least `k` itemsets. A length-`k` pattern needs
    /// `k` distinct itemsets, so shorter sequences can never contain it.
    pub fn sequences_of_size_at_least(&self, k: usize) -> impl Iterator<Item = &CustomerSequence> {
        self.by_size
            .range(k..)
            .flat_map(|(_, indices)| indices.iter())
            .map(move |&idx| &self.sequences[idx])
    }
}

impl FromStr for SequenceStore {
    type Err = MiningError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::load(raw)
    }
}

/// Build a store straight from symbol tokens, one `Vec` of itemsets per
/// customer. The header is derived from the data.
impl<S: AsRef<str>> FromIterator<Vec<Vec<S>>> for SequenceStore {
    fn from_iter<I: IntoIterator<Item = Vec<Vec<S>>>>(iter: I) -> Self {
        let parsed: Vec<Vec<Vec<S>>> = iter.into_iter().collect();
        let max_itemsets = parsed.iter().map(Vec::len).max().unwrap_or(0);
        let mut store = Self::from_tokens(Header::default(), parsed);
        store.header = Header {
            sequence_count: store.len(),
            max_itemsets,
            distinct_items: store.alphabet.len(),
        };
        store
    }
}

/// Split `<{a,b}{c}>` into its itemsets of raw symbols.
fn parse_sequence(line_number: usize, line: &str) -> Result<Vec<Vec<&str>>> {
    let err = |reason: &str| MiningError::parse(line_number, line, reason);

    let body = line.trim();
    if body.is_empty() {
        return Err(err("blank line"));
    }
    let inner = body
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| err("sequence must be enclosed in '<' and '>'"))?;

    let mut itemsets = Vec::new();
    let mut rest = inner.trim_start();
    while !rest.is_empty() {
        let group_start = rest
            .strip_prefix('{')
            .ok_or_else(|| err("expected '{' to open an itemset"))?;
        let close = group_start
            .find('}')
            .ok_or_else(|| err("unbalanced braces"))?;
        let group = &group_start[..close];

        if group.contains(|c: char| matches!(c, '{' | '<' | '>')) {
            return Err(err("nested or misplaced bracket"));
        }
        if group.trim().is_empty() {
            return Err(err("empty itemset"));
        }

        let items: Vec<&str> = group.split(',').map(str::trim).collect();
        if items
            .iter()
            .any(|item| item.is_empty() || item.contains(char::is_whitespace))
        {
            return Err(err("malformed item"));
        }

        itemsets.push(items);
        rest = group_start[close + 1..].trim_start();
    }

    if itemsets.is_empty() {
        return Err(err("empty sequence"));
    }
    Ok(itemsets)
}
