//! Ordered route table.
//!
//! Routes are tried in registration order and the first one whose pattern
//! covers the *whole* path wins. There is no specificity ranking: register
//! narrow patterns before broad ones.

use std::fmt;

use regex::Regex;

use crate::error::{Error, Result};
use crate::handler::HandlerFactory;
use crate::handler::context::Captures;

pub struct Route {
    pattern: Regex,
    source: String,
    factory: HandlerFactory,
}

impl Route {
    pub fn new(pattern: &str, factory: HandlerFactory) -> Result<Self> {
        // Anchor at the start only; the full-length check happens at match
        // time so a pattern that stops short of the path end is a miss.
        let compiled = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
            Error::InvalidRoute {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: compiled,
            source: pattern.to_string(),
            factory,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    fn captures(&self, path: &str) -> Option<Captures> {
        let caps = self.pattern.captures(path)?;
        let whole = caps.get(0)?;
        if whole.end() != path.len() {
            return None;
        }

        Some(Captures::new(
            caps.iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        ))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("pattern", &self.source).finish()
    }
}

pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub captures: Captures,
}

impl RouteMatch<'_> {
    pub fn factory(&self) -> &HandlerFactory {
        &self.route.factory
    }
}

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn register(&mut self, pattern: &str, factory: HandlerFactory) -> Result<()> {
        self.routes.push(Route::new(pattern, factory)?);
        Ok(())
    }

    /// First route whose pattern spans all of `path`.
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            route
                .captures(path)
                .map(|captures| RouteMatch { route, captures })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
