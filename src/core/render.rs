//! HTML escaping for every value that ends up inside generated markup.
//!
//! Collection data, form input and chat text are all untrusted. Templates in
//! this crate interpolate them only through [`Escaped`] or [`escape`].

use std::fmt::{self, Write};

/// Display adapter that writes its content HTML-escaped.
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                other => f.write_char(other)?,
            }
        }
        Ok(())
    }
}

pub fn escape(input: &str) -> String {
    Escaped(input).to_string()
}

/// Renders each item with `render` and concatenates the results.
pub fn join_map<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect()
}
