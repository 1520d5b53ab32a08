//! Named replacement methods.
//!
//! Hosts pick a strategy by name at runtime. [`Registry::standard`] knows
//! `"preact"` (HTML) and `"preact-xml"` (XML); anything else is registered
//! by the host. Names are case-sensitive, like [`MarkupMode`]'s `FromStr`.

use std::collections::HashMap;

use log::debug;

use super::{CommitOutcome, DiagnosticSink, LogSink, Replacer};
use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::markup::{MarkupMode, MarkupParser, StandardParser};
use crate::render::{DomRenderer, Renderer};

/// Replace `placeholder` in `document` with content built from `markup`.
pub trait ReplacementMethod {
    fn replace(
        &mut self,
        document: &mut Document,
        placeholder: NodeId,
        markup: &str,
    ) -> Result<CommitOutcome>;
}

impl<F> ReplacementMethod for F
where
    F: FnMut(&mut Document, NodeId, &str) -> Result<CommitOutcome>,
{
    fn replace(
        &mut self,
        document: &mut Document,
        placeholder: NodeId,
        markup: &str,
    ) -> Result<CommitOutcome> {
        self(document, placeholder, markup)
    }
}

/// A [`Replacer`] bound to one markup mode.
pub struct PreactReplacement<P = StandardParser, R = DomRenderer, S = LogSink> {
    mode: MarkupMode,
    replacer: Replacer<P, R, S>,
}

impl PreactReplacement {
    pub fn new(mode: MarkupMode) -> Self {
        Self::with_replacer(mode, Replacer::new())
    }
}

impl<P, R, S> PreactReplacement<P, R, S>
where
    P: MarkupParser,
    R: Renderer,
    S: DiagnosticSink,
{
    pub fn with_replacer(mode: MarkupMode, replacer: Replacer<P, R, S>) -> Self {
        Self { mode, replacer }
    }

    pub fn mode(&self) -> MarkupMode {
        self.mode
    }

    pub fn replacer(&self) -> &Replacer<P, R, S> {
        &self.replacer
    }
}

impl<P, R, S> ReplacementMethod for PreactReplacement<P, R, S>
where
    P: MarkupParser,
    R: Renderer,
    S: DiagnosticSink,
{
    fn replace(
        &mut self,
        document: &mut Document,
        placeholder: NodeId,
        markup: &str,
    ) -> Result<CommitOutcome> {
        self.replacer.commit(document, placeholder, markup, self.mode)
    }
}

/// Replacement methods keyed by name.
#[derive(Default)]
pub struct Registry {
    methods: HashMap<String, Box<dyn ReplacementMethod>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// `"preact"` and `"preact-xml"`, reporting diagnostics through `log`.
    pub fn standard() -> Self {
        Self::standard_with_sink(LogSink)
    }

    /// The standard methods, both reporting to (a clone of) `sink`.
    ///
    /// Pass an `Rc<RefCell<_>>` to collect diagnostics from both methods
    /// in one place.
    pub fn standard_with_sink<S>(sink: S) -> Self
    where
        S: DiagnosticSink + Clone + 'static,
    {
        let mut registry = Self::new();
        for mode in [MarkupMode::Html, MarkupMode::Xml] {
            let replacer = Replacer::with_parts(StandardParser, DomRenderer, sink.clone());
            registry.register(
                mode.strategy_name(),
                PreactReplacement::with_replacer(mode, replacer),
            );
        }
        registry
    }

    /// Add a method, returning the one previously registered under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        method: impl ReplacementMethod + 'static,
    ) -> Option<Box<dyn ReplacementMethod>> {
        self.methods.insert(name.into(), Box::new(method))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the method registered as `name`.
    pub fn replace(
        &mut self,
        name: &str,
        document: &mut Document,
        placeholder: NodeId,
        markup: &str,
    ) -> Result<CommitOutcome> {
        let method = self
            .methods
            .get_mut(name)
            .ok_or_else(|| Error::UnknownMethod(name.to_string()))?;
        debug!("replacing {placeholder:?} with method {name}");
        method.replace(document, placeholder, markup)
    }
}
