//! Merge key (`<<`) expansion.
//!
//! ```yaml
//! base: &base {x: 1, y: 2}
//! point:
//!   <<: *base
//!   y: 3
//! ```
//!
//! [`MergingParser`] rewrites `point` into `{x: 1, y: 3}`. Resolving an alias needs the anchored
//! node, which may sit anywhere earlier in the document, so the whole stream is buffered before the
//! first event is handed out.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::error::{Error, Result};
use crate::event::{Event, EventKind};
use crate::names::{tags, AnchorName};
use crate::recursion::RecursionLevel;
use crate::scanner::ScalarStyle;
use crate::schema::AncestorPath;

/// An event iterator with merge keys expanded.
///
/// Merged pairs are inserted where the `<<` key stood. Keys written in the mapping itself win over
/// merged ones, and among several merged mappings the earlier one wins. Anchors are removed from
/// the copies so that every anchor still appears once.
///
/// ```
/// # use yaml_stream::event::EventKind;
/// # use yaml_stream::merge::MergingParser;
/// # use yaml_stream::parser::Parser;
/// let yaml = "a: &a {x: 1}\nb: {<<: *a, y: 2}\n";
/// let values: Vec<String> = MergingParser::new(Parser::new_from_str(yaml))
///     .filter_map(|ev| match ev.unwrap().kind {
///         EventKind::Scalar(scalar) => Some(scalar.value),
///         _ => None,
///     })
///     .collect();
/// assert_eq!(values, ["a", "x", "1", "b", "x", "1", "y", "2"]);
/// ```
#[derive(Debug)]
pub struct MergingParser<I> {
    source: Option<I>,
    events: std::vec::IntoIter<Event>,
    depth: RecursionLevel,
}

impl<I: Iterator<Item = Result<Event>>> MergingParser<I> {
    /// Wrap an event iterator, usually a [`crate::parser::Parser`].
    pub fn new(events: I) -> Self {
        MergingParser {
            source: Some(events),
            events: Vec::new().into_iter(),
            depth: RecursionLevel::default(),
        }
    }

    /// Set the maximum collection nesting depth.
    #[must_use]
    pub fn max_depth(mut self, maximum: usize) -> Self {
        self.depth = RecursionLevel::new(maximum);
        self
    }

    fn load(&mut self, source: I) -> Result<()> {
        let events = source.collect::<Result<Vec<_>>>()?;
        debug_print!("merging over {} buffered events", events.len());
        let expanded = Expansion::new(&mut self.depth).run(&events)?;
        self.events = expanded.into_iter();
        Ok(())
    }
}

impl<I: Iterator<Item = Result<Event>>> Iterator for MergingParser<I> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(source) = self.source.take() {
            if let Err(e) = self.load(source) {
                return Some(Err(e));
            }
        }
        self.events.next().map(Ok)
    }
}

/// A `<<` key whose value has not been read completely.
#[derive(Debug)]
struct PendingMerge {
    /// Index of the key in the output.
    key: usize,
    /// Input index right after the value.
    value_end: usize,
}

/// A resolved `<<` pair.
#[derive(Debug)]
struct Merge {
    key: usize,
    /// Output ranges of the mappings to merge, highest priority first.
    sources: Vec<Range<usize>>,
}

#[derive(Debug)]
struct MappingFrame {
    start: usize,
    pending: Option<PendingMerge>,
    merges: Vec<Merge>,
}

struct Expansion<'d> {
    out: Vec<Event>,
    anchors: HashMap<String, Range<usize>>,
    /// Open collections with their anchor and output index.
    open: Vec<(Option<String>, usize)>,
    frames: Vec<MappingFrame>,
    path: AncestorPath,
    depth: &'d mut RecursionLevel,
}

impl<'d> Expansion<'d> {
    fn new(depth: &'d mut RecursionLevel) -> Self {
        Expansion {
            out: Vec::new(),
            anchors: HashMap::new(),
            open: Vec::new(),
            frames: Vec::new(),
            path: AncestorPath::new(),
            depth,
        }
    }

    fn run(mut self, events: &[Event]) -> Result<Vec<Event>> {
        self.out.reserve(events.len());
        for (i, event) in events.iter().enumerate() {
            self.finish_pending(i)?;

            let merge_key = self.path.in_key() && is_merge_key(event);
            self.path.advance(event);

            match &event.kind {
                EventKind::DocumentStart(_) => {
                    self.anchors.clear();
                    self.out.push(event.clone());
                }
                EventKind::SequenceStart(start) => {
                    self.depth.increment(event.start())?;
                    self.open
                        .push((start.anchor.as_str().map(str::to_owned), self.out.len()));
                    self.out.push(event.clone());
                }
                EventKind::MappingStart(start) => {
                    self.depth.increment(event.start())?;
                    self.open
                        .push((start.anchor.as_str().map(str::to_owned), self.out.len()));
                    self.frames.push(MappingFrame {
                        start: self.out.len(),
                        pending: None,
                        merges: Vec::new(),
                    });
                    self.out.push(event.clone());
                }
                EventKind::SequenceEnd => {
                    self.out.push(event.clone());
                    self.close();
                }
                EventKind::MappingEnd => {
                    if let Some(frame) = self.frames.pop() {
                        if !frame.merges.is_empty() {
                            self.rewrite(&frame)?;
                        }
                    }
                    self.out.push(event.clone());
                    self.close();
                }
                EventKind::Scalar(scalar) => {
                    if merge_key {
                        let value = skip_comments(events, i + 1, events.len());
                        let value_end = node_end(events, value)
                            .ok_or_else(|| Error::semantic(event.span, "merge key without a value"))?;
                        if let Some(frame) = self.frames.last_mut() {
                            frame.pending = Some(PendingMerge {
                                key: self.out.len(),
                                value_end,
                            });
                        }
                    }
                    if let Some(name) = scalar.anchor.as_str() {
                        self.anchors
                            .insert(name.to_owned(), self.out.len()..self.out.len() + 1);
                    }
                    self.out.push(event.clone());
                }
                _ => self.out.push(event.clone()),
            }
        }
        Ok(self.out)
    }

    fn close(&mut self) {
        if let Some((anchor, start)) = self.open.pop() {
            if let Some(name) = anchor {
                self.anchors.insert(name, start..self.out.len());
            }
        }
        self.depth.decrement();
    }

    /// Resolve the `<<` value once input index `i` is past it.
    fn finish_pending(&mut self, i: usize) -> Result<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        if !frame.pending.as_ref().is_some_and(|p| p.value_end == i) {
            return Ok(());
        }
        let Some(pending) = frame.pending.take() else {
            return Ok(());
        };
        let sources = merge_sources(&self.out, pending.key + 1, &self.anchors)?;
        if let Some(frame) = self.frames.last_mut() {
            frame.merges.push(Merge {
                key: pending.key,
                sources,
            });
        }
        Ok(())
    }

    /// Replace the body of the mapping starting at `frame.start` with its merged form.
    fn rewrite(&mut self, frame: &MappingFrame) -> Result<()> {
        let body_start = frame.start + 1;
        let pairs = split_pairs(&self.out, body_start, self.out.len())?;
        let is_merge = |key: &Range<usize>| frame.merges.iter().find(|m| m.key == key.start);

        let mut seen: HashSet<&str> = pairs
            .iter()
            .filter(|(key, _)| is_merge(key).is_none())
            .filter_map(|(key, _)| scalar_value(&self.out[key.start]))
            .collect();

        let mut body = Vec::new();
        for (key, value) in &pairs {
            let Some(merge) = is_merge(key) else {
                body.extend_from_slice(&self.out[key.start..value.end]);
                continue;
            };
            for source in &merge.sources {
                for (k, v) in split_pairs(&self.out, source.start + 1, source.end - 1)? {
                    if let Some(name) = scalar_value(&self.out[k.start]) {
                        if !seen.insert(name) {
                            continue;
                        }
                    }
                    body.extend(self.out[k.start..v.end].iter().cloned().map(without_anchor));
                }
            }
        }
        debug_print!(
            "merged mapping at {}: {} pairs became {} events",
            self.out[frame.start].start(),
            pairs.len(),
            body.len()
        );

        self.out.truncate(body_start);
        self.out.extend(body);
        self.anchors.retain(|_, range| range.start < body_start);
        for j in body_start..self.out.len() {
            if let Some(name) = anchor_of(&self.out[j]) {
                if let Some(end) = node_end(&self.out, j) {
                    self.anchors.insert(name.to_owned(), j..end);
                }
            }
        }
        Ok(())
    }
}

fn is_merge_key(event: &Event) -> bool {
    match &event.kind {
        EventKind::Scalar(scalar) => {
            scalar.value == "<<"
                && (scalar.tag.as_str() == Some(tags::MERGE)
                    || (scalar.tag.is_empty()
                        && matches!(scalar.style, ScalarStyle::Plain | ScalarStyle::Any)))
        }
        _ => false,
    }
}

fn scalar_value(event: &Event) -> Option<&str> {
    match &event.kind {
        EventKind::Scalar(scalar) => Some(&scalar.value),
        _ => None,
    }
}

fn anchor_of(event: &Event) -> Option<&str> {
    match &event.kind {
        EventKind::Scalar(scalar) => scalar.anchor.as_str(),
        EventKind::SequenceStart(start) | EventKind::MappingStart(start) => start.anchor.as_str(),
        _ => None,
    }
}

fn without_anchor(mut event: Event) -> Event {
    match &mut event.kind {
        EventKind::Scalar(scalar) => scalar.anchor = AnchorName::empty(),
        EventKind::SequenceStart(start) | EventKind::MappingStart(start) => {
            start.anchor = AnchorName::empty();
        }
        _ => {}
    }
    event
}

fn skip_comments(events: &[Event], mut from: usize, to: usize) -> usize {
    while from < to && events[from].is_comment() {
        from += 1;
    }
    from
}

/// Index right after the node starting at `start`.
fn node_end(events: &[Event], start: usize) -> Option<usize> {
    let mut level = 0;
    for (offset, event) in events.get(start..)?.iter().enumerate() {
        level += event.nesting_increase();
        if level <= 0 && !event.is_comment() {
            return Some(start + offset + 1);
        }
    }
    None
}

/// The key and value ranges of the pairs in `events[from..to]`.
fn split_pairs(
    events: &[Event],
    from: usize,
    to: usize,
) -> Result<Vec<(Range<usize>, Range<usize>)>> {
    let mut pairs = Vec::new();
    let mut i = skip_comments(events, from, to);
    while i < to {
        let broken = || Error::semantic(events[i].span, "mapping key without a value");
        let key_end = node_end(events, i).ok_or_else(broken)?;
        let value = skip_comments(events, key_end, to);
        if value >= to {
            return Err(broken());
        }
        let value_end = node_end(events, value).ok_or_else(broken)?;
        pairs.push((i..key_end, value..value_end));
        i = skip_comments(events, value_end, to);
    }
    Ok(pairs)
}

/// The mappings a `<<` value at `from` refers to.
fn merge_sources(
    out: &[Event],
    from: usize,
    anchors: &HashMap<String, Range<usize>>,
) -> Result<Vec<Range<usize>>> {
    let value = skip_comments(out, from, out.len());
    let Some(event) = out.get(value) else {
        return Ok(Vec::new());
    };
    match event.kind {
        EventKind::Alias(_) | EventKind::MappingStart(_) => {
            Ok(vec![merge_source(out, value, anchors)?])
        }
        EventKind::SequenceStart(_) => {
            let last = node_end(out, value)
                .ok_or_else(|| Error::semantic(event.span, "unterminated merge sequence"))?
                - 1;
            let mut sources = Vec::new();
            let mut i = skip_comments(out, value + 1, last);
            while i < last {
                sources.push(merge_source(out, i, anchors)?);
                let end = node_end(out, i)
                    .ok_or_else(|| Error::semantic(out[i].span, "unterminated merge source"))?;
                i = skip_comments(out, end, last);
            }
            Ok(sources)
        }
        _ => Err(Error::semantic(
            event.span,
            "merge value must be a mapping, an alias, or a sequence of those",
        )),
    }
}

fn merge_source(
    out: &[Event],
    at: usize,
    anchors: &HashMap<String, Range<usize>>,
) -> Result<Range<usize>> {
    let event = &out[at];
    let range = match &event.kind {
        EventKind::Alias(name) => anchors
            .get(name.as_str().unwrap_or_default())
            .cloned()
            .ok_or_else(|| {
                Error::semantic(event.span, &format!("found undefined alias `{name}` in merge"))
            })?,
        EventKind::MappingStart(_) => at..node_end(out, at)
            .ok_or_else(|| Error::semantic(event.span, "unterminated merge source"))?,
        _ => {
            return Err(Error::semantic(
                event.span,
                "merge sequence items must be mappings or aliases",
            ))
        }
    };
    if !matches!(out[range.start].kind, EventKind::MappingStart(_)) {
        return Err(Error::semantic(event.span, "merge source is not a mapping"));
    }
    Ok(range)
}
