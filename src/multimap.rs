/// Ordered map from a name to an ordered, non-empty list of values.
///
/// Key order is the order in which names were first inserted, and it is what
/// [`iter`](Self::iter) yields. A key disappears as soon as its last value is
/// removed, so every stored list is non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamedValues {
    entries: Vec<(String, Vec<String>)>,
}

impl NamedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Values stored under `name`, empty when the name is absent.
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(position) => &self.entries[position].1,
            None => &[],
        }
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    pub fn last(&self, name: &str) -> Option<&str> {
        self.get(name).last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Flattened `(name, value)` pairs: names in key order, values in list order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| {
            values
                .iter()
                .map(move |value| (name.as_str(), value.as_str()))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(position) => self.entries[position].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Inserts `value` at the front of the list for `name`. A new name still
    /// goes to the end of the key order.
    pub fn prepend(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(position) => self.entries[position].1.insert(0, value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Removes the value at `index`; `None` when the name or index is absent.
    pub fn remove_at(&mut self, name: &str, index: usize) -> Option<String> {
        let position = self.position(name)?;
        let values = &mut self.entries[position].1;
        if index >= values.len() {
            return None;
        }
        let removed = values.remove(index);
        if values.is_empty() {
            self.entries.remove(position);
        }
        Some(removed)
    }

    pub fn remove_first(&mut self, name: &str) -> Option<String> {
        self.remove_at(name, 0)
    }

    pub fn remove_last(&mut self, name: &str) -> Option<String> {
        let len = self.get(name).len();
        if len == 0 {
            return None;
        }
        self.remove_at(name, len - 1)
    }

    pub fn remove_all(&mut self, name: &str) -> Option<Vec<String>> {
        let position = self.position(name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(candidate, _)| candidate == name)
    }
}

impl<N, V> FromIterator<(N, V)> for NamedValues
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.append(name, value);
        }
        values
    }
}
