#![allow(dead_code)]

use field_props_core::{DeckItem, DeckKeyword, DeckRecord};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Expand deck shorthand into items
///
/// `3*0.2` repeats a value, `4*` is four defaulted items, integers stay
/// integers and anything that is not a number becomes a string item.
pub fn items(text: &str) -> Vec<DeckItem> {
    let mut out = Vec::new();
    for token in text.split_whitespace() {
        match token.split_once('*') {
            Some((count, value)) => {
                let count: usize = count.parse().expect("repeat count");
                let repeated = if value.is_empty() {
                    DeckItem::Defaulted
                } else {
                    item(value)
                };
                out.resize(out.len() + count, repeated);
            }
            None => out.push(item(token)),
        }
    }
    out
}

fn item(token: &str) -> DeckItem {
    if let Ok(v) = token.parse::<i32>() {
        DeckItem::Int(v)
    } else if let Ok(v) = token.parse::<f64>() {
        DeckItem::Double(v)
    } else {
        DeckItem::Str(token.to_string())
    }
}

/// Flat data keyword such as `PORO 27*0.15`
pub fn data(name: &str, text: &str) -> DeckKeyword {
    DeckKeyword::data(name, items(text))
}

/// Structured keyword with one record per entry
pub fn keyword(name: &str, records: &[&str]) -> DeckKeyword {
    DeckKeyword::new(name, records.iter().copied().map(record).collect())
}

pub fn record(text: &str) -> DeckRecord {
    DeckRecord::new(items(text))
}
