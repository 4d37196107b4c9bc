//! Text renderers standing in for DOM insertion

use std::cell::RefCell;
use std::rc::Rc;

use crate::bridge::RenderSink;

use super::dataset::Country;

/// Format a country as a text card, the same fields the original page rendered
pub fn country_card(country: &Country, class: &str) -> String {
    let marker = if class.is_empty() {
        String::new()
    } else {
        format!(" [{}]", class)
    };
    format!(
        "{} {}{}\n  region: {}\n  capital: {}\n  speaks: {}\n  pays in: {}\n  population: {:.1}M",
        country.flag,
        country.name,
        marker,
        country.region,
        country.capital,
        country.languages.join(", "),
        country.currency,
        country.population as f64 / 1_000_000.0,
    )
}

/// Render sink that prints cards to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl RenderSink for ConsoleSink {
    fn render(&self, record: &str) {
        println!("{}\n", record);
    }

    fn render_error(&self, message: &str) {
        eprintln!("Something went wrong: {}", message);
    }
}

/// Render sink that collects records in memory
#[derive(Debug, Clone, Default)]
pub struct CollectSink {
    records: Rc<RefCell<Vec<String>>>,
    errors: Rc<RefCell<Vec<String>>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        self.records.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

impl RenderSink for CollectSink {
    fn render(&self, record: &str) {
        self.records.borrow_mut().push(record.to_string());
    }

    fn render_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}
