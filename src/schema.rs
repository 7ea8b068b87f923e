//! Tag resolution.
//!
//! A [`Schema`] decides which tag a node stands for, given the node and the path of collections
//! it sits in. Schemas are applied to event streams through a [`SchemaDecorator`], an
//! [`EventDecorator`] that can wrap a parser ([`Decorated`]) or be handed to the emitter
//! ([`crate::emitter::Emitter::set_decorator`]).

use crate::error::{Error, Result};
use crate::event::{CollectionStart, Event, EventKind, ScalarEvent};
use crate::names::{tags, TagName};
use crate::scanner::ScalarStyle;

/// A collection enclosing the current node.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Ancestor {
    /// A sequence, with the index of the item being visited.
    Sequence {
        /// The sequence's tag.
        tag: TagName,
        /// Index of the next (or current) item.
        index: usize,
    },
    /// A mapping.
    Mapping {
        /// The mapping's tag.
        tag: TagName,
        /// The last scalar key seen, if the last key was a scalar.
        key: Option<String>,
        /// Whether the next node is a key.
        in_key: bool,
    },
}

/// The chain of collections leading to the node being visited, outermost first.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct AncestorPath {
    ancestors: Vec<Ancestor>,
}

impl AncestorPath {
    /// An empty path, at document level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enclosing collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    /// Whether the node is at document level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// The directly enclosing collection.
    #[must_use]
    pub fn parent(&self) -> Option<&Ancestor> {
        self.ancestors.last()
    }

    /// Iterate over the enclosing collections, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &Ancestor> {
        self.ancestors.iter()
    }

    /// Whether the next node is a mapping key.
    #[must_use]
    pub fn in_key(&self) -> bool {
        matches!(self.parent(), Some(Ancestor::Mapping { in_key: true, .. }))
    }

    /// Advance the path past `event`.
    pub fn advance(&mut self, event: &Event) {
        match &event.kind {
            EventKind::DocumentStart(_) | EventKind::DocumentEnd { .. } => self.ancestors.clear(),
            EventKind::SequenceStart(start) => self.ancestors.push(Ancestor::Sequence {
                tag: start.tag.clone(),
                index: 0,
            }),
            EventKind::MappingStart(start) => self.ancestors.push(Ancestor::Mapping {
                tag: start.tag.clone(),
                key: None,
                in_key: true,
            }),
            EventKind::SequenceEnd | EventKind::MappingEnd => {
                self.ancestors.pop();
                self.node_done(None);
            }
            EventKind::Scalar(scalar) => self.node_done(Some(&scalar.value)),
            EventKind::Alias(_) => self.node_done(None),
            EventKind::StreamStart | EventKind::StreamEnd | EventKind::Comment { .. } => {}
        }
    }

    fn node_done(&mut self, scalar: Option<&str>) {
        match self.ancestors.last_mut() {
            Some(Ancestor::Sequence { index, .. }) => *index += 1,
            Some(Ancestor::Mapping { key, in_key, .. }) => {
                if *in_key {
                    *key = scalar.map(str::to_owned);
                }
                *in_key = !*in_key;
            }
            None => {}
        }
    }
}

/// The outcome of resolving a node.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Resolution {
    /// The concrete tag.
    pub tag: TagName,
    /// The style the schema prefers the node be written in, if any.
    pub style: Option<ScalarStyle>,
}

impl Resolution {
    fn tag(tag: &str) -> Option<Self> {
        Some(Resolution {
            tag: TagName::new(tag),
            style: None,
        })
    }
}

/// Maps nodes to concrete tags.
pub trait Schema {
    /// Resolve the tag a plain, untagged scalar stands for.
    ///
    /// Returns `None` when the schema has no type for the value.
    fn resolve_plain(&self, value: &str, path: &AncestorPath) -> Option<Resolution>;

    /// Resolve a scalar, whatever its tag and style.
    fn resolve_scalar(&self, scalar: &ScalarEvent, path: &AncestorPath) -> Option<Resolution> {
        let plain = matches!(scalar.style, ScalarStyle::Plain | ScalarStyle::Any);
        match scalar.tag.as_str() {
            None | Some("?") if plain => self.resolve_plain(&scalar.value, path),
            None | Some("!" | "?") => Resolution::tag(tags::STR),
            Some(tag) => Resolution::tag(tag),
        }
    }

    /// Resolve a sequence.
    fn resolve_sequence(&self, start: &CollectionStart, _path: &AncestorPath) -> Option<TagName> {
        if start.tag.is_empty() || start.tag.is_non_specific() {
            Some(TagName::new(tags::SEQ))
        } else {
            Some(start.tag.clone())
        }
    }

    /// Resolve a mapping.
    fn resolve_mapping(&self, start: &CollectionStart, _path: &AncestorPath) -> Option<TagName> {
        if start.tag.is_empty() || start.tag.is_non_specific() {
            Some(TagName::new(tags::MAP))
        } else {
            Some(start.tag.clone())
        }
    }
}

/// Every scalar is a string.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailsafeSchema;

impl Schema for FailsafeSchema {
    fn resolve_plain(&self, _value: &str, _path: &AncestorPath) -> Option<Resolution> {
        Resolution::tag(tags::STR)
    }
}

/// The JSON schema: only JSON literals resolve; strings are written double-quoted.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSchema;

impl Schema for JsonSchema {
    fn resolve_plain(&self, value: &str, _path: &AncestorPath) -> Option<Resolution> {
        match value {
            "null" => Resolution::tag(tags::NULL),
            "true" | "false" => Resolution::tag(tags::BOOL),
            _ if is_json_int(value) => Resolution::tag(tags::INT),
            _ if is_json_float(value) => Resolution::tag(tags::FLOAT),
            _ => None,
        }
    }

    fn resolve_scalar(&self, scalar: &ScalarEvent, path: &AncestorPath) -> Option<Resolution> {
        let plain = matches!(scalar.style, ScalarStyle::Plain | ScalarStyle::Any);
        match scalar.tag.as_str() {
            None | Some("?") if plain => self.resolve_plain(&scalar.value, path),
            None | Some("!" | "?") => Some(Resolution {
                tag: TagName::new(tags::STR),
                style: Some(ScalarStyle::DoubleQuoted),
            }),
            Some(tags::STR) => Some(Resolution {
                tag: TagName::new(tags::STR),
                style: Some(ScalarStyle::DoubleQuoted),
            }),
            Some(tag) => Resolution::tag(tag),
        }
    }
}

/// The YAML 1.2 core schema.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoreSchema;

impl Schema for CoreSchema {
    fn resolve_plain(&self, value: &str, _path: &AncestorPath) -> Option<Resolution> {
        match value {
            "" | "~" | "null" | "Null" | "NULL" => Resolution::tag(tags::NULL),
            "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => Resolution::tag(tags::BOOL),
            _ if is_core_int(value) => Resolution::tag(tags::INT),
            _ if is_core_float(value) => Resolution::tag(tags::FLOAT),
            _ => Resolution::tag(tags::STR),
        }
    }
}

/// The YAML 1.1 types: booleans such as `yes`/`off`, sexagesimal numbers, timestamps and merge
/// keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct Yaml11Schema;

impl Schema for Yaml11Schema {
    fn resolve_plain(&self, value: &str, _path: &AncestorPath) -> Option<Resolution> {
        match value {
            "" | "~" | "null" | "Null" | "NULL" => Resolution::tag(tags::NULL),
            "y" | "Y" | "yes" | "Yes" | "YES" | "n" | "N" | "no" | "No" | "NO" | "true"
            | "True" | "TRUE" | "false" | "False" | "FALSE" | "on" | "On" | "ON" | "off"
            | "Off" | "OFF" => Resolution::tag(tags::BOOL),
            "<<" => Resolution::tag(tags::MERGE),
            _ if is_yaml11_int(value) => Resolution::tag(tags::INT),
            _ if is_yaml11_float(value) => Resolution::tag(tags::FLOAT),
            _ if is_timestamp(value) => Resolution::tag(tags::TIMESTAMP),
            _ => Resolution::tag(tags::STR),
        }
    }
}

/// Tries `A`, then `B`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompositeSchema<A, B> {
    first: A,
    second: B,
}

impl<A: Schema, B: Schema> CompositeSchema<A, B> {
    /// Combine two schemas.
    pub fn new(first: A, second: B) -> Self {
        CompositeSchema { first, second }
    }
}

impl<A: Schema, B: Schema> Schema for CompositeSchema<A, B> {
    fn resolve_plain(&self, value: &str, path: &AncestorPath) -> Option<Resolution> {
        self.first
            .resolve_plain(value, path)
            .or_else(|| self.second.resolve_plain(value, path))
    }

    fn resolve_scalar(&self, scalar: &ScalarEvent, path: &AncestorPath) -> Option<Resolution> {
        self.first
            .resolve_scalar(scalar, path)
            .or_else(|| self.second.resolve_scalar(scalar, path))
    }

    fn resolve_sequence(&self, start: &CollectionStart, path: &AncestorPath) -> Option<TagName> {
        self.first
            .resolve_sequence(start, path)
            .or_else(|| self.second.resolve_sequence(start, path))
    }

    fn resolve_mapping(&self, start: &CollectionStart, path: &AncestorPath) -> Option<TagName> {
        self.first
            .resolve_mapping(start, path)
            .or_else(|| self.second.resolve_mapping(start, path))
    }
}

/// Transforms one event, knowing where it sits.
pub trait EventDecorator {
    /// Return the event to use in place of `event`.
    fn decorate(&mut self, event: Event, path: &AncestorPath) -> Event;
}

/// Applies a [`Schema`] to events.
///
/// Non-specific and missing tags are replaced by the resolved tag. Scalars carrying a specific tag
/// get their implicit flags set according to whether the schema would infer that tag anyway, so
/// that an emitter omits redundant tags. A style preferred by the schema replaces
/// [`ScalarStyle::Any`].
#[derive(Clone, Debug, Default)]
pub struct SchemaDecorator<S> {
    schema: S,
}

impl<S: Schema> SchemaDecorator<S> {
    /// Decorate events with `schema`.
    pub fn new(schema: S) -> Self {
        SchemaDecorator { schema }
    }

    /// The schema in use.
    pub fn schema(&self) -> &S {
        &self.schema
    }
}

impl<S: Schema> EventDecorator for SchemaDecorator<S> {
    fn decorate(&mut self, mut event: Event, path: &AncestorPath) -> Event {
        match &mut event.kind {
            EventKind::Scalar(scalar) => {
                let Some(resolution) = self.schema.resolve_scalar(scalar, path) else {
                    return event;
                };
                let specific = !scalar.tag.is_empty() && !scalar.tag.is_non_specific();
                if specific {
                    let plain = self.schema.resolve_plain(&scalar.value, path);
                    scalar.is_plain_implicit =
                        plain.is_some_and(|plain| plain.tag == resolution.tag);
                    scalar.is_quoted_implicit = resolution.tag.as_str() == Some(tags::STR);
                }
                if scalar.style == ScalarStyle::Any {
                    if let Some(style) = resolution.style {
                        scalar.style = style;
                    }
                }
                scalar.tag = resolution.tag;
            }
            EventKind::SequenceStart(start) => {
                if let Some(tag) = self.schema.resolve_sequence(start, path) {
                    start.tag = tag;
                }
            }
            EventKind::MappingStart(start) => {
                if let Some(tag) = self.schema.resolve_mapping(start, path) {
                    start.tag = tag;
                }
            }
            _ => {}
        }
        event
    }
}

/// Applies an [`EventDecorator`] to a stream of events.
#[derive(Debug)]
pub struct Decorated<I, D> {
    events: I,
    decorator: D,
    path: AncestorPath,
}

impl<I, D> Decorated<I, D>
where
    I: Iterator<Item = Result<Event>>,
    D: EventDecorator,
{
    /// Decorate every event of `events`.
    pub fn new(events: I, decorator: D) -> Self {
        Decorated {
            events,
            decorator,
            path: AncestorPath::new(),
        }
    }

    /// Give back the decorator.
    pub fn into_decorator(self) -> D {
        self.decorator
    }
}

impl<I, D> Iterator for Decorated<I, D>
where
    I: Iterator<Item = Result<Event>>,
    D: EventDecorator,
{
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = match self.events.next()? {
            Ok(event) => event,
            Err(e) => return Some(Err(e)),
        };
        let event = self.decorator.decorate(event, &self.path);
        self.path.advance(&event);
        Some(Ok(event))
    }
}

/// Parse an integer literal in any of the notations the schemas accept.
///
/// Underscores are ignored; `0x`, `0o` and `0b` prefixes select the radix. Returns `Ok(None)` if
/// `value` is not an integer literal.
///
/// # Errors
/// Returns [`Error::Overflow`] when the value does not fit an `i64`.
pub fn parse_integer(value: &str) -> Result<Option<i64>> {
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(octal) = digits.strip_prefix("0o") {
        (8, octal)
    } else if let Some(binary) = digits.strip_prefix("0b") {
        (2, binary)
    } else {
        (10, digits)
    };

    let mut seen_digit = false;
    let mut result: i64 = 0;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let Some(digit) = c.to_digit(radix) else {
            return Ok(None);
        };
        seen_digit = true;
        // Accumulate negatively so that `i64::MIN` fits.
        result = result
            .checked_mul(i64::from(radix))
            .and_then(|r| r.checked_sub(i64::from(digit)))
            .ok_or_else(|| Error::Overflow {
                value: value.to_owned(),
            })?;
    }
    if !seen_digit {
        return Ok(None);
    }
    if negative {
        Ok(Some(result))
    } else {
        result.checked_neg().map(Some).ok_or_else(|| Error::Overflow {
            value: value.to_owned(),
        })
    }
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value)
}

fn all_digits(value: &str, radix: u32) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_digit(radix))
}

fn is_json_int(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    digits == "0" || (all_digits(digits, 10) && !digits.starts_with('0'))
}

fn is_json_float(value: &str) -> bool {
    let rest = value.strip_prefix('-').unwrap_or(value);
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (mantissa, None),
    };
    let int_ok = int == "0" || (all_digits(int, 10) && !int.starts_with('0'));
    let frac_ok = frac.map_or(true, |frac| frac.chars().all(|c| c.is_ascii_digit()));
    let exp_ok = exponent.map_or(true, |exp| all_digits(strip_sign(exp), 10));
    int_ok && frac_ok && exp_ok && (frac.is_some() || exponent.is_some())
}

fn is_core_int(value: &str) -> bool {
    if let Some(octal) = value.strip_prefix("0o") {
        return all_digits(octal, 8);
    }
    if let Some(hex) = value.strip_prefix("0x") {
        return all_digits(hex, 16);
    }
    all_digits(strip_sign(value), 10)
}

fn is_special_float(value: &str) -> bool {
    matches!(
        strip_sign(value),
        ".inf" | ".Inf" | ".INF"
    ) || matches!(value, ".nan" | ".NaN" | ".NAN")
}

fn is_core_float(value: &str) -> bool {
    if is_special_float(value) {
        return true;
    }
    let rest = strip_sign(value);
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            (int.is_empty() && all_digits(frac, 10))
                || (all_digits(int, 10) && frac.chars().all(|c| c.is_ascii_digit()))
        }
        None => all_digits(mantissa, 10),
    };
    let exp_ok = exponent.map_or(true, |exp| all_digits(strip_sign(exp), 10));
    mantissa_ok && exp_ok && (mantissa.contains('.') || exponent.is_some())
}

fn is_sexagesimal(value: &str, float: bool) -> bool {
    let rest = strip_sign(value);
    let mut parts = rest.split(':');
    let Some(head) = parts.next() else {
        return false;
    };
    if !all_digits(&head.replace('_', ""), 10) || head.starts_with('0') {
        return false;
    }
    let mut tail: Vec<&str> = parts.collect();
    if tail.is_empty() {
        return false;
    }
    if float {
        let Some(last) = tail.pop() else {
            return false;
        };
        let Some((seconds, frac)) = last.split_once('.') else {
            return false;
        };
        if !is_base60_digit(seconds) || !frac.chars().all(|c| c.is_ascii_digit() || c == '_') {
            return false;
        }
    }
    tail.iter().all(|part| is_base60_digit(part))
}

fn is_base60_digit(part: &str) -> bool {
    match part.len() {
        1 => all_digits(part, 10),
        2 => all_digits(part, 10) && part.as_bytes()[0] <= b'5',
        _ => false,
    }
}

fn is_yaml11_int(value: &str) -> bool {
    let rest = strip_sign(value);
    if let Some(binary) = rest.strip_prefix("0b") {
        return all_digits(&binary.replace('_', ""), 2);
    }
    if let Some(hex) = rest.strip_prefix("0x") {
        return all_digits(&hex.replace('_', ""), 16);
    }
    if rest == "0" {
        return true;
    }
    if let Some(octal) = rest.strip_prefix('0') {
        return all_digits(&octal.replace('_', ""), 8);
    }
    if rest.contains(':') {
        return is_sexagesimal(value, false);
    }
    !rest.starts_with('_') && all_digits(&rest.replace('_', ""), 10)
}

fn is_yaml11_float(value: &str) -> bool {
    if is_special_float(value) {
        return true;
    }
    if value.contains(':') {
        return is_sexagesimal(value, true);
    }
    let rest = strip_sign(value);
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };
    let Some((int, frac)) = mantissa.split_once('.') else {
        return false;
    };
    let int_ok = int.chars().all(|c| c.is_ascii_digit() || c == '_');
    let frac_ok = frac.chars().all(|c| c.is_ascii_digit() || c == '_');
    let exp_ok = exponent.map_or(true, |exp| {
        (exp.starts_with('-') || exp.starts_with('+')) && all_digits(&exp[1..], 10)
    });
    int_ok && frac_ok && exp_ok && (int.chars().any(|c| c.is_ascii_digit()) || frac.chars().any(|c| c.is_ascii_digit()))
}

/// `YYYY-MM-DD`, optionally followed by a time and a time zone.
fn is_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    let digits = |range: std::ops::Range<usize>| {
        bytes.get(range).is_some_and(|b| b.iter().all(u8::is_ascii_digit))
    };
    if !digits(0..4) || bytes.get(4) != Some(&b'-') {
        return false;
    }
    if value.len() == 10 {
        return digits(5..7) && bytes.get(7) == Some(&b'-') && digits(8..10);
    }
    // The long form allows one-digit months, days and hours.
    let mut parts = value.splitn(2, ['T', 't', ' ', '\t']);
    let (Some(date), Some(time)) = (parts.next(), parts.next()) else {
        return false;
    };
    let mut date_parts = date.split('-');
    let date_ok = date_parts.next().is_some_and(|y| y.len() == 4 && all_digits(y, 10))
        && date_parts.next().is_some_and(|m| (1..=2).contains(&m.len()) && all_digits(m, 10))
        && date_parts.next().is_some_and(|d| (1..=2).contains(&d.len()) && all_digits(d, 10))
        && date_parts.next().is_none();
    let time = time.trim_start();
    let time_end = time
        .find(['Z', '+', '-', ' ', '\t'])
        .unwrap_or(time.len());
    let (clock, zone) = time.split_at(time_end);
    let (clock, fraction) = clock.split_once('.').unwrap_or((clock, "0"));
    let mut clock_parts = clock.split(':');
    let clock_ok = clock_parts.next().is_some_and(|h| (1..=2).contains(&h.len()) && all_digits(h, 10))
        && clock_parts.next().is_some_and(|m| m.len() == 2 && all_digits(m, 10))
        && clock_parts.next().is_some_and(|s| s.len() == 2 && all_digits(s, 10))
        && clock_parts.next().is_none()
        && fraction.chars().all(|c| c.is_ascii_digit());
    let zone = zone.trim_start();
    let zone_ok = zone.is_empty()
        || zone == "Z"
        || (zone.starts_with(['+', '-']) && {
            let offset = &zone[1..];
            let (hours, minutes) = offset.split_once(':').unwrap_or((offset, "00"));
            (1..=2).contains(&hours.len())
                && all_digits(hours, 10)
                && minutes.len() == 2
                && all_digits(minutes, 10)
        });
    date_ok && clock_ok && zone_ok
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::CollectionStyle;
    use crate::parser::Parser;

    fn plain_tag<S: Schema>(schema: &S, value: &str) -> Option<String> {
        schema
            .resolve_plain(value, &AncestorPath::new())
            .and_then(|r| r.tag.as_str().map(str::to_owned))
    }

    #[test]
    fn test_core_schema() {
        let schema = CoreSchema;
        assert_eq!(plain_tag(&schema, "~").as_deref(), Some(tags::NULL));
        assert_eq!(plain_tag(&schema, "").as_deref(), Some(tags::NULL));
        assert_eq!(plain_tag(&schema, "True").as_deref(), Some(tags::BOOL));
        assert_eq!(plain_tag(&schema, "yes").as_deref(), Some(tags::STR));
        assert_eq!(plain_tag(&schema, "-42").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "0x1F").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "0o17").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "1.5e3").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, ".5").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, "-.inf").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, ".NaN").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, "1.2.3").as_deref(), Some(tags::STR));
        assert_eq!(plain_tag(&schema, "0x").as_deref(), Some(tags::STR));
    }

    #[test]
    fn test_json_schema() {
        let schema = JsonSchema;
        assert_eq!(plain_tag(&schema, "null").as_deref(), Some(tags::NULL));
        assert_eq!(plain_tag(&schema, "Null"), None);
        assert_eq!(plain_tag(&schema, "-0").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "012"), None);
        assert_eq!(plain_tag(&schema, "1e5").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, "1.").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, "hello"), None);
    }

    #[test]
    fn test_yaml11_schema() {
        let schema = Yaml11Schema;
        assert_eq!(plain_tag(&schema, "off").as_deref(), Some(tags::BOOL));
        assert_eq!(plain_tag(&schema, "Y").as_deref(), Some(tags::BOOL));
        assert_eq!(plain_tag(&schema, "<<").as_deref(), Some(tags::MERGE));
        assert_eq!(plain_tag(&schema, "0b1010_0111").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "02472256").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "685_230").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "190:20:30").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "190:20:30.15").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, "6.8523015e+5").as_deref(), Some(tags::FLOAT));
        assert_eq!(plain_tag(&schema, "2002-12-14").as_deref(), Some(tags::TIMESTAMP));
        assert_eq!(
            plain_tag(&schema, "2001-12-14t21:59:43.10-05:00").as_deref(),
            Some(tags::TIMESTAMP)
        );
        assert_eq!(
            plain_tag(&schema, "2001-12-14 21:59:43.10 -5").as_deref(),
            Some(tags::TIMESTAMP)
        );
        assert_eq!(plain_tag(&schema, "2001-12-1").as_deref(), Some(tags::STR));
    }

    #[test]
    fn test_composite_schema() {
        let schema = CompositeSchema::new(JsonSchema, FailsafeSchema);
        assert_eq!(plain_tag(&schema, "12").as_deref(), Some(tags::INT));
        assert_eq!(plain_tag(&schema, "hello").as_deref(), Some(tags::STR));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42").unwrap(), Some(42));
        assert_eq!(parse_integer("-0x1f").unwrap(), Some(-31));
        assert_eq!(parse_integer("0b1010_0111").unwrap(), Some(167));
        assert_eq!(parse_integer("0o17").unwrap(), Some(15));
        assert_eq!(parse_integer("-9223372036854775808").unwrap(), Some(i64::MIN));
        assert_eq!(parse_integer("abc").unwrap(), None);
        assert_eq!(parse_integer("-").unwrap(), None);
        assert!(matches!(
            parse_integer("9223372036854775808"),
            Err(Error::Overflow { .. })
        ));
    }

    #[test]
    fn test_ancestor_path() {
        let mut path = AncestorPath::new();
        let events: Vec<Event> = Parser::new_from_str("a: [x, y]\nb: c\n")
            .collect::<Result<_>>()
            .unwrap();
        let mut seen = Vec::new();
        for event in &events {
            if let EventKind::Scalar(scalar) = &event.kind {
                seen.push((scalar.value.clone(), path.len(), path.in_key()));
            }
            path.advance(event);
        }
        assert_eq!(
            seen,
            vec![
                ("a".to_owned(), 1, true),
                ("x".to_owned(), 2, false),
                ("y".to_owned(), 2, false),
                ("b".to_owned(), 1, true),
                ("c".to_owned(), 1, false),
            ]
        );
        assert!(path.is_empty());
    }

    #[test]
    fn test_decorated_parser() {
        let events: Vec<Event> = Decorated::new(
            Parser::new_from_str("- 12\n- '12'\n- !!int 7\n- [x]\n"),
            SchemaDecorator::new(CoreSchema),
        )
        .collect::<Result<_>>()
        .unwrap();
        let tags: Vec<(Option<String>, bool)> = events
            .iter()
            .filter_map(|ev| match &ev.kind {
                EventKind::Scalar(s) => Some((s.tag.as_str().map(str::to_owned), s.is_plain_implicit)),
                EventKind::SequenceStart(s) if s.style == CollectionStyle::Flow => {
                    Some((s.tag.as_str().map(str::to_owned), s.is_implicit))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            tags,
            vec![
                (Some(tags::INT.to_owned()), true),
                (Some(tags::STR.to_owned()), false),
                (Some(tags::INT.to_owned()), true),
                (Some(tags::SEQ.to_owned()), true),
                (Some(tags::STR.to_owned()), true),
            ]
        );
    }
}
