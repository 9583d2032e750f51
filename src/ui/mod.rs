//! Search box adapter: binds one text input to a [`Suggester`].
//!
//! The adapter owns the input value, the visible suggestion list and the
//! overlay visibility. Drawing and navigation are delegated to a
//! [`SuggestionView`].

pub mod terminal;

use crate::search::{Suggester, Suggestion, tokenize};

pub use terminal::TerminalView;

/// Output side of a search box.
pub trait SuggestionView {
    /// Replace the displayed list with `suggestions`.
    ///
    /// `query_tokens` are the lowercased tokens of the current input; views
    /// that highlight matches mark them in each title, others ignore them.
    fn render(&mut self, suggestions: &[Suggestion], query_tokens: &[String]);

    /// Hide the displayed list.
    fn clear(&mut self);

    /// Show or hide the overlay containing the input.
    fn set_overlay(&mut self, open: bool);

    /// Go to the chosen suggestion's page.
    fn navigate(&mut self, link: &str);
}

/// A search input wired to a suggester and a view.
pub struct SearchBox<S, V> {
    suggester: S,
    view: V,
    value: String,
    results: Vec<Suggestion>,
    open: bool,
}

impl<S: Suggester, V: SuggestionView> SearchBox<S, V> {
    pub fn new(suggester: S, view: V) -> Self {
        Self {
            suggester,
            view,
            value: String::new(),
            results: Vec::new(),
            open: false,
        }
    }

    /// Handle an input change: query with the new value and redraw.
    ///
    /// The input lives inside the overlay, so typing into a closed box opens
    /// it first.
    pub fn input(&mut self, value: &str) -> &[Suggestion] {
        if !self.open {
            self.open();
        }
        value.clone_into(&mut self.value);
        self.results = self.suggester.suggest(value);
        let tokens: Vec<String> = tokenize(value).collect();
        self.view.render(&self.results, &tokens);
        &self.results
    }

    /// Navigate to the suggestion at `position` in the visible list.
    ///
    /// Returns the chosen suggestion, or `None` if nothing is shown there.
    pub fn select(&mut self, position: usize) -> Option<Suggestion> {
        let chosen = self.results.get(position)?.clone();
        self.view.navigate(&chosen.link);
        Some(chosen)
    }

    /// Flip overlay visibility, as the trigger button does.
    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    fn open(&mut self) {
        self.open = true;
        self.view.set_overlay(true);
    }

    /// Hide the overlay and the suggestion list. The input value is kept.
    pub fn close(&mut self) {
        self.open = false;
        self.results.clear();
        self.view.clear();
        self.view.set_overlay(false);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn results(&self) -> &[Suggestion] {
        &self.results
    }

    pub fn suggester_mut(&mut self) -> &mut S {
        &mut self.suggester
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}
