use http::{HeaderMap, header::ACCEPT_ENCODING};
use indexmap::IndexMap;

/// The header representations a request may carry.
#[derive(Debug, Clone)]
pub enum HeaderSource {
    /// Ordered `(name, value)` pairs.
    Pairs(Vec<(String, String)>),
    /// Name to a single value.
    Single(IndexMap<String, String>),
    /// Name to a list of values, one header per element.
    Multi(IndexMap<String, Vec<String>>),
    /// A native header collection, iterated in its own order.
    Map(HeaderMap),
}

/// Headers reduced to ordered pairs, duplicates kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    pub headers: Vec<(String, String)>,
    /// Set when any header is `accept-encoding` (case-insensitive).
    pub encoding_requested: bool,
}

impl HeaderList {
    fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if name.eq_ignore_ascii_case(ACCEPT_ENCODING.as_str()) {
            self.encoding_requested = true;
        }
        self.headers.push((name, value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl HeaderSource {
    pub fn normalize(&self) -> HeaderList {
        let mut list = HeaderList::default();
        match self {
            HeaderSource::Pairs(pairs) => {
                for (name, value) in pairs {
                    list.push(name.as_str(), value.as_str());
                }
            }
            HeaderSource::Single(map) => {
                for (name, value) in map {
                    list.push(name.as_str(), value.as_str());
                }
            }
            HeaderSource::Multi(map) => {
                for (name, values) in map {
                    for value in values {
                        list.push(name.as_str(), value.as_str());
                    }
                }
            }
            HeaderSource::Map(map) => {
                for (name, value) in map {
                    list.push(
                        name.as_str(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    );
                }
            }
        }
        list
    }
}

impl Default for HeaderSource {
    fn default() -> Self {
        HeaderSource::Pairs(Vec::new())
    }
}

impl From<HeaderMap> for HeaderSource {
    fn from(map: HeaderMap) -> Self {
        HeaderSource::Map(map)
    }
}

impl From<IndexMap<String, String>> for HeaderSource {
    fn from(map: IndexMap<String, String>) -> Self {
        HeaderSource::Single(map)
    }
}

impl From<IndexMap<String, Vec<String>>> for HeaderSource {
    fn from(map: IndexMap<String, Vec<String>>) -> Self {
        HeaderSource::Multi(map)
    }
}

impl From<Vec<(String, String)>> for HeaderSource {
    fn from(pairs: Vec<(String, String)>) -> Self {
        HeaderSource::Pairs(pairs)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for HeaderSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        HeaderSource::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
