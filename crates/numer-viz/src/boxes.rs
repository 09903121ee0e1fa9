#![forbid(unsafe_code)]

//! Labelled-value box view.
//!
//! Input values and result fields are merged into one ordered set (result
//! fields win on collision). Keys listed in the display's `main` go to the
//! primary section in declared order; `"="` and `"\n"` in that list are
//! separators. Every other key lands in the secondary section, grouped by
//! [`ValueClass`].

use numer_core::{DisplaySpec, Fields, Layout, Value};

/// Separator token drawn as an equals sign.
pub const EQUALS_TOKEN: &str = "=";

/// Separator token that starts a new primary row.
pub const LINE_BREAK_TOKEN: &str = "\n";

/// Key used for a scalar result, which has no field names of its own.
pub const SCALAR_RESULT_KEY: &str = "result";

const EXPRESSION_OPERATORS: &[char] = &['+', '-', '*', '/', '^', '(', ')'];

#[must_use]
pub fn is_separator(key: &str) -> bool {
    key == EQUALS_TOKEN || key == LINE_BREAK_TOKEN
}

/// Coarse kind of a boxed value, in secondary-section order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueClass {
    String,
    Number,
    /// Array whose first element is a number.
    Vector,
    /// Array whose first element is an array.
    Matrix,
    Other,
}

impl ValueClass {
    pub const ORDER: [Self; 5] = [
        Self::String,
        Self::Number,
        Self::Vector,
        Self::Matrix,
        Self::Other,
    ];

    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Text(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Array(items) => match items.first() {
                Some(Value::Number(_)) => Self::Vector,
                Some(Value::Array(_)) => Self::Matrix,
                _ => Self::Other,
            },
            Value::Null | Value::Record(_) => Self::Other,
        }
    }
}

/// Whether a string reads as a formula rather than a plain word or number.
#[must_use]
pub fn looks_like_expression(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_alphabetic() || EXPRESSION_OPERATORS.contains(&c))
}

/// One labelled value.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxEntry {
    pub key: String,
    /// `None` when a `main` key names nothing in the data.
    pub value: Option<Value>,
    pub class: ValueClass,
    pub expression: bool,
}

impl BoxEntry {
    fn new(key: &str, value: Option<&Value>) -> Self {
        Self {
            key: key.to_owned(),
            value: value.cloned(),
            class: value.map_or(ValueClass::Other, ValueClass::of),
            expression: value
                .and_then(Value::as_str)
                .is_some_and(looks_like_expression),
        }
    }

    /// `key: value`, or the bare key when the value is missing.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.value {
            Some(value) => format!("{}: {value}", self.key),
            None => self.key.clone(),
        }
    }
}

/// An element of the primary section.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryItem {
    Entry(BoxEntry),
    Equals,
    LineBreak,
}

impl PrimaryItem {
    fn text(&self) -> String {
        match self {
            Self::Entry(entry) => entry.text(),
            Self::Equals => EQUALS_TOKEN.to_owned(),
            Self::LineBreak => String::new(),
        }
    }
}

/// The formatted box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxView {
    layout: Layout,
    primary: Vec<PrimaryItem>,
    secondary: Vec<BoxEntry>,
}

/// `{...ui_values, ...raw}` with array results keyed by index.
fn merge_sources(raw: &Value, ui_values: &Fields) -> Fields {
    let mut merged = ui_values.clone();
    match raw {
        Value::Record(fields) => merged.merge_from(fields),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                merged.insert(i.to_string(), item.clone());
            }
        }
        Value::Null => {}
        scalar => {
            merged.insert(SCALAR_RESULT_KEY, scalar.clone());
        }
    }
    merged
}

impl BoxView {
    #[must_use]
    pub fn build(display: Option<&DisplaySpec>, raw: &Value, ui_values: &Fields) -> Self {
        let merged = merge_sources(raw, ui_values);
        let main: &[String] = display.map(|d| d.main.as_slice()).unwrap_or_default();
        let layout = display.map(|d| d.layout).unwrap_or_default();

        let primary = main
            .iter()
            .map(|key| match key.as_str() {
                EQUALS_TOKEN => PrimaryItem::Equals,
                LINE_BREAK_TOKEN => PrimaryItem::LineBreak,
                key => PrimaryItem::Entry(BoxEntry::new(key, merged.get(key))),
            })
            .collect();

        let mut secondary: Vec<BoxEntry> = merged
            .iter()
            .filter(|(key, _)| !main.iter().any(|m| m.as_str() == *key))
            .map(|(key, value)| BoxEntry::new(key, Some(value)))
            .collect();
        secondary.sort_by_key(|entry| entry.class);

        Self {
            layout,
            primary,
            secondary,
        }
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub fn primary(&self) -> &[PrimaryItem] {
        &self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> &[BoxEntry] {
        &self.secondary
    }

    /// Primary items grouped into display rows.
    ///
    /// Horizontal layout splits at line breaks and drops empty rows. Vertical
    /// layout puts every non-break item on its own row.
    #[must_use]
    pub fn primary_rows(&self) -> Vec<Vec<&PrimaryItem>> {
        match self.layout {
            Layout::Horizontal => self
                .primary
                .split(|item| *item == PrimaryItem::LineBreak)
                .filter(|row| !row.is_empty())
                .map(|row| row.iter().collect())
                .collect(),
            Layout::Vertical => self
                .primary
                .iter()
                .filter(|item| **item != PrimaryItem::LineBreak)
                .map(|item| vec![item])
                .collect(),
        }
    }

    /// Secondary entries of one class, in merged order.
    pub fn secondary_of(&self, class: ValueClass) -> impl Iterator<Item = &BoxEntry> {
        self.secondary.iter().filter(move |entry| entry.class == class)
    }

    /// Plain-text rendering: primary rows, a blank line, then secondary entries.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for row in self.primary_rows() {
            let parts: Vec<String> = row.iter().map(|item| item.text()).collect();
            out.push_str(&parts.join("  "));
            out.push('\n');
        }
        if !self.secondary.is_empty() {
            out.push('\n');
            for entry in &self.secondary {
                out.push_str(&entry.text());
                out.push('\n');
            }
        }
        out
    }
}
