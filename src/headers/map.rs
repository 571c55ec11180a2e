use bytes::Bytes;

use super::{AsHeaderName, HeaderName, HeaderValue};

/// HTTP Headers Multimap.
///
/// Fields are kept in insertion order. Lookup is linear, which outperforms hashing for the
/// handful of headers a typical message carries.
#[derive(Clone, Default)]
pub struct HeaderMap {
    fields: Vec<Field>,
}

#[derive(Clone)]
struct Field {
    name: HeaderName,
    /// name as written by the user or received from the peer
    orig: Bytes,
    value: HeaderValue,
}

impl HeaderMap {
    /// Create new empty [`HeaderMap`].
    ///
    /// This function does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create new empty [`HeaderMap`] with at least the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of header values, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if headers has no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remove all headers, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

// ===== Lookup =====

impl HeaderMap {
    /// Returns `true` if the map contains a header value for given header name.
    #[inline]
    pub fn contains_key<K: AsHeaderName>(&self, name: K) -> bool {
        self.position(name.as_header_str()).is_some()
    }

    /// Returns a reference to the first header value corresponding to the given header name.
    #[inline]
    pub fn get<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.position(name.as_header_str()).map(|i| &self.fields[i].value)
    }

    /// Returns an iterator to all header values corresponding to the given header name.
    #[inline]
    pub fn get_all<K: AsHeaderName>(&self, name: K) -> GetAll<'_, K> {
        GetAll {
            iter: self.fields.iter(),
            name,
        }
    }

    /// Returns an iterator over headers as name and value pair.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            iter: self.fields.iter(),
        }
    }

    /// Returns an iterator over headers with the name in its original casing.
    #[inline]
    pub fn iter_raw(&self) -> IterRaw<'_> {
        IterRaw {
            iter: self.fields.iter(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name.eq_ignore_ascii_case(name))
    }
}

// ===== Mutation =====

impl HeaderMap {
    /// Inserts a key-value pair into the map.
    ///
    /// Every previous value of the same name is removed, the first of them is returned.
    #[inline]
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) -> Option<HeaderValue> {
        let orig = Bytes::copy_from_slice(name.as_str().as_bytes());
        self.insert_cased(name, orig, value)
    }

    /// Append a header key and value into the map.
    ///
    /// Unlike [`insert`][HeaderMap::insert], if header key is present, header value is still
    /// appended as extra value.
    #[inline]
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        let orig = Bytes::copy_from_slice(name.as_str().as_bytes());
        self.append_cased(name, orig, value);
    }

    /// [`insert`][HeaderMap::insert] keeping the original casing of the name.
    pub(crate) fn insert_cased(
        &mut self,
        name: HeaderName,
        orig: Bytes,
        value: HeaderValue,
    ) -> Option<HeaderValue> {
        let Some(first) = self.position(name.as_str()) else {
            self.fields.push(Field { name, orig, value });
            return None;
        };

        let old = std::mem::replace(&mut self.fields[first], Field { name, orig, value });

        let mut i = first + 1;
        while i < self.fields.len() {
            if self.fields[i].name == old.name {
                self.fields.remove(i);
            } else {
                i += 1;
            }
        }

        Some(old.value)
    }

    /// [`append`][HeaderMap::append] keeping the original casing of the name.
    pub(crate) fn append_cased(&mut self, name: HeaderName, orig: Bytes, value: HeaderValue) {
        self.fields.push(Field { name, orig, value });
    }

    /// Removes every value of a header, returning the first value if any.
    pub fn remove<K: AsHeaderName>(&mut self, name: K) -> Option<HeaderValue> {
        let name = name.as_header_str();
        let first = self.position(name)?;
        let removed = self.fields.remove(first);
        self.fields.retain(|f| !f.name.eq_ignore_ascii_case(name));
        Some(removed.value)
    }
}

// ===== Iterators =====

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a HeaderName, &'a HeaderValue);

    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over name and value pairs, see [`HeaderMap::iter`].
#[derive(Debug)]
pub struct Iter<'a> {
    iter: std::slice::Iter<'a, Field>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a HeaderName, &'a HeaderValue);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|f| (&f.name, &f.value))
    }
}

/// Iterator over original cased name and value pairs, see [`HeaderMap::iter_raw`].
#[derive(Debug)]
pub struct IterRaw<'a> {
    iter: std::slice::Iter<'a, Field>,
}

impl<'a> Iterator for IterRaw<'a> {
    type Item = (&'a [u8], &'a HeaderValue);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|f| (&f.orig[..], &f.value))
    }
}

/// Iterator over all values of a header, see [`HeaderMap::get_all`].
#[derive(Debug)]
pub struct GetAll<'a, K> {
    iter: std::slice::Iter<'a, Field>,
    name: K,
}

impl<K> GetAll<'_, K> {
    /// Returns `true` if there is more value of the header.
    pub fn has_remaining(&self) -> bool
    where
        K: AsHeaderName,
    {
        let name = self.name.as_header_str();
        self.iter.as_slice().iter().any(|f| f.name.eq_ignore_ascii_case(name))
    }
}

impl<'a, K: AsHeaderName> Iterator for GetAll<'a, K> {
    type Item = &'a HeaderValue;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.name.as_header_str();
        self.iter.by_ref().find(|f| f.name.eq_ignore_ascii_case(name)).map(|f| &f.value)
    }
}

// ===== Traits =====

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

impl std::fmt::Debug for HeaderMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
