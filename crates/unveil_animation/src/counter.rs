//! Numeric counters
//!
//! A counter drives a value from 0 to a target integer and renders it as
//! `round(value)` followed by an optional literal suffix. [`CounterDisplay`]
//! keeps rendered output monotonic even when the ease overshoots or a frame
//! arrives out of order.

/// A counter target and its suffix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counter {
    target: i64,
    suffix: String,
}

impl Counter {
    pub fn new(target: i64, suffix: impl Into<String>) -> Self {
        Self {
            target,
            suffix: suffix.into(),
        }
    }

    /// Parse a rendered statistic such as `"1500+"` or `"73%"`
    ///
    /// Digits form the target, every other character forms the suffix, so
    /// grouping separators end up in the suffix: `"1,500+"` renders `"1500,+"`.
    /// Returns `None` when the text holds no digits or the number is zero.
    pub fn from_stat_text(text: &str) -> Option<Self> {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        let suffix: String = text.chars().filter(|c| !c.is_ascii_digit()).collect();
        let target = digits.parse::<i64>().ok()?;
        if target == 0 {
            return None;
        }
        Some(Self::new(target, suffix))
    }

    /// Parse a `data-counter` attribute value (integer target, no suffix)
    pub fn from_attribute(value: &str) -> Option<Self> {
        let value = value.trim();
        // Leading integer, like parseInt
        let end = value
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
            .map(|(i, _)| i)
            .unwrap_or(value.len());
        value[..end].parse::<i64>().ok().map(|t| Self::new(t, ""))
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Render a value
    pub fn render(&self, value: f32) -> String {
        format!("{}{}", value.round() as i64, self.suffix)
    }

    /// Text shown once the counter completes
    pub fn final_text(&self) -> String {
        format!("{}{}", self.target, self.suffix)
    }
}

/// Tracks what a counter has rendered so far
#[derive(Clone, Debug)]
pub struct CounterDisplay {
    counter: Counter,
    last: Option<i64>,
}

impl CounterDisplay {
    pub fn new(counter: Counter) -> Self {
        Self {
            counter,
            last: None,
        }
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    /// Text for a new frame value, or `None` if the rendered text is unchanged
    pub fn update(&mut self, value: f32) -> Option<String> {
        let target = self.counter.target;
        let mut rounded = value.round() as i64;
        // Never run past the target or backwards
        rounded = if target >= 0 {
            rounded.min(target)
        } else {
            rounded.max(target)
        };
        if let Some(last) = self.last {
            rounded = if target >= 0 {
                rounded.max(last)
            } else {
                rounded.min(last)
            };
            if rounded == last {
                return None;
            }
        }
        self.last = Some(rounded);
        Some(format!("{}{}", rounded, self.counter.suffix))
    }

    /// Final text; always returned so completion renders exactly the target
    pub fn complete(&mut self) -> String {
        self.last = Some(self.counter.target);
        self.counter.final_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_text_parsing() {
        let counter = Counter::from_stat_text("1500+").unwrap();
        assert_eq!(counter.target(), 1500);
        assert_eq!(counter.suffix(), "+");

        let counter = Counter::from_stat_text("73%").unwrap();
        assert_eq!(counter.target(), 73);
        assert_eq!(counter.suffix(), "%");

        let grouped = Counter::from_stat_text("1,500+").unwrap();
        assert_eq!(grouped.target(), 1500);
        assert_eq!(grouped.final_text(), "1500,+");

        assert!(Counter::from_stat_text("N/A").is_none());
        assert!(Counter::from_stat_text("0").is_none());
    }

    #[test]
    fn test_attribute_parsing() {
        assert_eq!(Counter::from_attribute("250").unwrap().target(), 250);
        assert_eq!(Counter::from_attribute("42px").unwrap().target(), 42);
        assert!(Counter::from_attribute("many").is_none());
    }

    #[test]
    fn test_render_rounds() {
        let counter = Counter::new(1500, "+");
        assert_eq!(counter.render(749.6), "750+");
        assert_eq!(counter.final_text(), "1500+");
    }

    #[test]
    fn test_display_is_monotonic() {
        let mut display = CounterDisplay::new(Counter::new(100, ""));
        let frames = [0.0, 10.4, 30.0, 29.0, 80.0, 104.0, 99.0];
        let mut rendered = Vec::new();
        for value in frames {
            if let Some(text) = display.update(value) {
                rendered.push(text.parse::<i64>().unwrap());
            }
        }
        assert_eq!(rendered, vec![0, 10, 30, 80, 100]);
        assert_eq!(display.complete(), "100");
    }
}
