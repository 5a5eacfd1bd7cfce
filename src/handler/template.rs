//! View templates.
//!
//! Views are plain text files with `$name` / `${name}` placeholders (`$$` is
//! a literal dollar). The raw text of a view is read from disk once and kept
//! for the life of the cache: editing a view file has no effect until the
//! server restarts.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::{BuildHasher, Hash};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::{Lazy, OnceCell};
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{Error, Result};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|(?P<named>[_a-zA-Z][_a-zA-Z0-9]*)|\{(?P<braced>[_a-zA-Z][_a-zA-Z0-9]*)\}|(?P<invalid>))",
    )
    .expect("placeholder pattern is valid")
});

/// Values looked up by placeholder name.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<B: Bindings + ?Sized> Bindings for &B {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

impl<K, V, S> Bindings for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: Display,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }
}

impl<V: Display> Bindings for [(&str, V)] {
    fn lookup(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

impl<V: Display, const N: usize> Bindings for [(&str, V); N] {
    fn lookup(&self, name: &str) -> Option<String> {
        self.as_slice().lookup(name)
    }
}

impl Bindings for serde_json::Map<String, serde_json::Value> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl Bindings for serde_json::Value {
    fn lookup(&self, name: &str) -> Option<String> {
        self.as_object().and_then(|map| map.lookup(name))
    }
}

#[derive(Debug)]
enum SubstituteError {
    Missing(String),
    Invalid { line: usize, col: usize },
}

fn substitute<B>(template: &str, bindings: &B) -> std::result::Result<String, SubstituteError>
where
    B: Bindings + ?Sized,
{
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&template[last..whole.start]);
        last = whole.end;
        out.push_str(&expand(template, &caps, bindings)?);
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn expand<B>(
    template: &str,
    caps: &Captures<'_>,
    bindings: &B,
) -> std::result::Result<String, SubstituteError>
where
    B: Bindings + ?Sized,
{
    if caps.name("escaped").is_some() {
        return Ok("$".to_string());
    }
    if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
        return bindings
            .lookup(name.as_str())
            .ok_or_else(|| SubstituteError::Missing(name.as_str().to_string()));
    }

    let at = caps.get(0).map_or(0, |m| m.start());
    let before = &template[..at];
    let line = before.matches('\n').count() + 1;
    let col = at - before.rfind('\n').map_or(0, |i| i + 1) + 1;
    Err(SubstituteError::Invalid { line, col })
}

/// Raw view text keyed by resolved file path.
///
/// Each key has its own cell, so concurrent first renders of one view read
/// the file once while renders of other views proceed.
#[derive(Debug, Default)]
pub struct TemplateCache {
    views: Mutex<HashMap<PathBuf, Arc<OnceCell<Arc<str>>>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text of `view`, a relative name below `view_path`.
    pub fn get(&self, view_path: &Path, view: &str) -> Result<Arc<str>> {
        let path = view_file(view_path, view)?;
        let cell = {
            let mut views = self.lock();
            views.entry(path.clone()).or_default().clone()
        };

        let loaded = cell.get_or_try_init(|| {
            debug!(path = %path.display(), "loading view");
            std::fs::read_to_string(&path)
                .map(Arc::from)
                .map_err(|source| Error::ViewNotFound {
                    path: path.clone(),
                    source,
                })
        });

        match loaded {
            Ok(text) => Ok(Arc::clone(text)),
            Err(err) => {
                // Failed loads are not remembered; the next render retries.
                let mut views = self.lock();
                if views.get(&path).is_some_and(|c| c.get().is_none()) {
                    views.remove(&path);
                }
                Err(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<OnceCell<Arc<str>>>>> {
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn render<B>(&self, view_path: &Path, view: &str, bindings: &B) -> Result<String>
    where
        B: Bindings + ?Sized,
    {
        let template = self.get(view_path, view)?;
        substitute(&template, bindings).map_err(|err| placeholder_error(view, err))
    }

    pub fn render_list<I>(&self, view_path: &Path, view: &str, items: I) -> Result<String>
    where
        I: IntoIterator,
        I::Item: Bindings,
    {
        let template = self.get(view_path, view)?;
        let mut out = String::new();
        for item in items {
            out.push_str(&substitute(&template, &item).map_err(|err| placeholder_error(view, err))?);
        }
        Ok(out)
    }

    /// Views cached, or being loaded right now.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Views are plain relative names: no root, prefix or `..` components.
fn view_file(view_path: &Path, view: &str) -> Result<PathBuf> {
    let name = Path::new(view);
    let plain = name
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if view.is_empty() || !plain {
        return Err(Error::InvalidView(view.to_string()));
    }
    Ok(view_path.join(name))
}

fn placeholder_error(view: &str, err: SubstituteError) -> Error {
    match err {
        SubstituteError::Missing(name) => Error::MissingBinding(name),
        SubstituteError::Invalid { line, col } => Error::Template {
            view: view.to_string(),
            reason: format!("line {line}, col {col}"),
        },
    }
}
