//! Multi-key sorting.
//!
//! Sort criteria are a flat list in the familiar `field, direction, field,
//! direction` shape. [`SortCriterion`] is one element of that list; the
//! list is parsed into [`SortColumn`]s (key source, direction, comparison
//! mode) and applied as a stable lexicographic sort: the first column is
//! primary and each following column only breaks ties left by the previous
//! ones.

use std::cmp::Ordering;
use std::fmt;

use crate::attribute::{get_attribute, AttributeSource};
use crate::collection::Collection;
use crate::error::{QuarryError, Result};
use crate::value::{parse_number, Number, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Parses `asc` or `desc`, ignoring case.
    pub fn parse(token: &str) -> Option<Dir> {
        if token.eq_ignore_ascii_case("asc") {
            Some(Dir::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(Dir::Desc)
        } else {
            None
        }
    }

    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the keys of one sort column are compared.
///
/// Every mode folds strings to lower case first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    /// Native ordering per type; numeric strings order as numbers.
    #[default]
    Regular,
    /// Everything coerced to a number; non-numeric values count as zero.
    Numeric,
    /// Everything rendered as text.
    String,
    /// Text with embedded digit runs ordered by value (`img2` < `img10`).
    Natural,
}

impl SortMode {
    /// Compares two keys under this mode.
    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match self {
            SortMode::Regular => compare_values(a, b),
            SortMode::Numeric => {
                let x = a.to_number().map_or(0.0, Number::to_f64);
                let y = b.to_number().map_or(0.0, Number::to_f64);
                x.total_cmp(&y)
            }
            SortMode::String => fold(&a.to_string()).cmp(&fold(&b.to_string())),
            SortMode::Natural => natural_cmp(&fold(&a.to_string()), &fold(&b.to_string())),
        }
    }
}

/// One element of a flat sort criteria list.
#[derive(Debug, Clone, PartialEq)]
pub enum SortCriterion {
    /// Starts a column keyed by an item attribute.
    Field(String),
    /// Sets the direction of the preceding column.
    Dir(Dir),
    /// Sets the comparison mode of the preceding column.
    Mode(SortMode),
    /// Starts a column with precomputed keys, one per item in current order.
    Keys(Vec<Value>),
}

impl From<&str> for SortCriterion {
    /// `"asc"`/`"desc"` (any case) become directions, anything else a field.
    fn from(token: &str) -> Self {
        match Dir::parse(token) {
            Some(dir) => SortCriterion::Dir(dir),
            None => SortCriterion::Field(token.to_string()),
        }
    }
}

impl From<String> for SortCriterion {
    fn from(token: String) -> Self {
        SortCriterion::from(token.as_str())
    }
}

impl From<&String> for SortCriterion {
    fn from(token: &String) -> Self {
        SortCriterion::from(token.as_str())
    }
}

impl From<Dir> for SortCriterion {
    fn from(dir: Dir) -> Self {
        SortCriterion::Dir(dir)
    }
}

impl From<SortMode> for SortCriterion {
    fn from(mode: SortMode) -> Self {
        SortCriterion::Mode(mode)
    }
}

impl From<Vec<Value>> for SortCriterion {
    fn from(keys: Vec<Value>) -> Self {
        SortCriterion::Keys(keys)
    }
}

/// Where a column's keys come from.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Extract the named attribute from each item.
    Field(String),
    /// Use the given keys, positionally.
    Keys(Vec<Value>),
}

/// A parsed sort column.
#[derive(Debug, Clone, PartialEq)]
pub struct SortColumn {
    /// Where the keys come from.
    pub source: KeySource,
    /// The sort direction.
    pub dir: Dir,
    /// The comparison mode.
    pub mode: SortMode,
}

impl SortColumn {
    /// Creates an ascending, regular column for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        SortColumn::new(KeySource::Field(field.into()), Dir::Asc)
    }

    /// Creates a descending, regular column for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        SortColumn::new(KeySource::Field(field.into()), Dir::Desc)
    }

    fn new(source: KeySource, dir: Dir) -> Self {
        SortColumn {
            source,
            dir,
            mode: SortMode::Regular,
        }
    }
}

/// Parses a flat criteria list into columns.
///
/// Fails when the list has no column, when a direction or mode has no
/// column to apply to, when a column gets two directions or two modes, or
/// when a field name is empty.
pub fn parse_criteria<I>(criteria: I) -> Result<Vec<SortColumn>>
where
    I: IntoIterator,
    I::Item: Into<SortCriterion>,
{
    let mut columns: Vec<SortColumn> = Vec::new();
    let mut dir_set = false;
    let mut mode_set = false;

    for criterion in criteria {
        match criterion.into() {
            SortCriterion::Field(field) => {
                if field.trim().is_empty() {
                    return Err(QuarryError::InvalidSortSpec("empty field name".into()));
                }
                columns.push(SortColumn::new(KeySource::Field(field), Dir::Asc));
                dir_set = false;
                mode_set = false;
            }
            SortCriterion::Keys(keys) => {
                columns.push(SortColumn::new(KeySource::Keys(keys), Dir::Asc));
                dir_set = false;
                mode_set = false;
            }
            SortCriterion::Dir(dir) => {
                let column = columns.last_mut().ok_or_else(|| {
                    QuarryError::InvalidSortSpec(format!("direction `{dir}` has no field to apply to"))
                })?;
                if dir_set {
                    return Err(QuarryError::InvalidSortSpec(format!(
                        "direction `{dir}` follows another direction"
                    )));
                }
                column.dir = dir;
                dir_set = true;
            }
            SortCriterion::Mode(mode) => {
                let column = columns.last_mut().ok_or_else(|| {
                    QuarryError::InvalidSortSpec(format!("mode {mode:?} has no field to apply to"))
                })?;
                if mode_set {
                    return Err(QuarryError::InvalidSortSpec(format!(
                        "mode {mode:?} follows another mode"
                    )));
                }
                column.mode = mode;
                mode_set = true;
            }
        }
    }

    if columns.is_empty() {
        return Err(QuarryError::InvalidSortSpec("no sort field given".into()));
    }
    Ok(columns)
}

/// Compares two values with the regular sort semantics.
///
/// Values fall into classes ordered bool < number < string < array < map <
/// null. Numbers and numeric strings share the number class and compare by
/// value; other strings compare case-folded. `Null` therefore sorts after
/// everything else. The result is a total order, so mixed data such as
/// `"10"`, `"1a"` and `2` always sorts consistently.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (SortKey::of(a), SortKey::of(b)) {
        (SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(&y),
        (SortKey::Number(x), SortKey::Number(y)) => compare_numbers(x, y),
        (SortKey::Text(x), SortKey::Text(y)) => fold(x).cmp(&fold(y)),
        (SortKey::Array(x), SortKey::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare_values(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (SortKey::Map(x), SortKey::Map(y)) => x.cmp(&y),
        (SortKey::Null, SortKey::Null) => Ordering::Equal,
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

/// A value reduced to its regular sort class.
enum SortKey<'a> {
    Bool(bool),
    Number(Number),
    Text(&'a str),
    Array(&'a [Value]),
    Map(usize),
    Null,
}

impl<'a> SortKey<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => SortKey::Null,
            Value::Bool(b) => SortKey::Bool(*b),
            Value::Number(n) => SortKey::Number(*n),
            Value::String(s) => match parse_number(s) {
                Some(n) => SortKey::Number(n),
                None => SortKey::Text(s),
            },
            Value::Array(items) => SortKey::Array(items),
            Value::Map(map) => SortKey::Map(map.len()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Array(_) => 3,
            SortKey::Map(_) => 4,
            SortKey::Null => 5,
        }
    }
}

/// Compares the items at positions `a` and `b` column by column.
pub(crate) fn compare_rows(columns: &[(Vec<Value>, Dir, SortMode)], a: usize, b: usize) -> Ordering {
    for (keys, dir, mode) in columns {
        let ordering = dir.apply(mode.compare(&keys[a], &keys[b]));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Orders numbers by float value, then by exact integer value.
///
/// Integers beyond 2^53 can share a float value, and the second key keeps
/// them apart without breaking transitivity.
fn compare_numbers(x: Number, y: Number) -> Ordering {
    let (xf, xi) = number_key(x);
    let (yf, yi) = number_key(y);
    xf.total_cmp(&yf).then(xi.cmp(&yi))
}

fn number_key(n: Number) -> (f64, i128) {
    match n {
        Number::I64(v) => (v as f64, i128::from(v)),
        Number::U64(v) => (v as f64, i128::from(v)),
        Number::F64(v) if v.fract() == 0.0 => (v, v as i128),
        Number::F64(v) => (v, 0),
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Natural order: digit runs compare by numeric value, everything else by
/// character.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let x = take_digits(&mut a);
                let y = take_digits(&mut b);
                let x = x.trim_start_matches('0');
                let y = y.trim_start_matches('0');
                let ordering = x.len().cmp(&y.len()).then_with(|| x.cmp(y));
                if ordering.is_ne() {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

impl<T: AttributeSource + Clone> Collection<T> {
    /// Sorts by any number of columns.
    ///
    /// ```
    /// use quarry::{record, Collection, Item};
    ///
    /// let pages: Collection = [
    ///     ("a", Item::record(record([("score", 10)]))),
    ///     ("b", Item::record(record([("score", 30)]))),
    ///     ("c", Item::record(record([("score", 20)]))),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let sorted = pages.sort_by(["score", "desc"]).unwrap();
    /// assert_eq!(sorted.keys().collect::<Vec<_>>(), ["b", "c", "a"]);
    /// ```
    ///
    /// Criteria are parsed with [`parse_criteria`]. Precomputed key lists
    /// must have one key per item. An empty collection sorts to itself.
    pub fn sort_by<I>(&self, criteria: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<SortCriterion>,
    {
        let columns = parse_criteria(criteria)?;
        self.sort_by_columns(&columns)
    }

    /// Sorts by already parsed columns.
    pub fn sort_by_columns(&self, columns: &[SortColumn]) -> Result<Self> {
        if self.is_empty() {
            return Ok(self.clone());
        }

        let mut keyed = Vec::with_capacity(columns.len());
        for column in columns {
            let keys = match &column.source {
                KeySource::Field(field) => self
                    .values()
                    .map(|item| get_attribute(item, field))
                    .collect(),
                KeySource::Keys(keys) => {
                    if keys.len() != self.count() {
                        return Err(QuarryError::InvalidSortSpec(format!(
                            "precomputed keys have {} entries for {} items",
                            keys.len(),
                            self.count()
                        )));
                    }
                    keys.clone()
                }
            };
            keyed.push((keys, column.dir, column.mode));
        }

        let mut order: Vec<usize> = (0..self.count()).collect();
        order.sort_by(|&a, &b| compare_rows(&keyed, a, b));
        Ok(self.reorder(&order))
    }
}
