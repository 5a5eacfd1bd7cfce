//! Query string parsing.
//!
//! A query string is decoded as `application/x-www-form-urlencoded`. Every
//! name maps to all of its values in the order they appear. Pairs with an
//! empty value are dropped, so `?q=` and `?q` leave `q` absent.

use indexmap::IndexMap;
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let mut params: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            params
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { params }
    }

    /// First value for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn all(&self, name: &str) -> &[String] {
        self.params.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
