//! The build tree: namespaced SVG markup assembly and serialization.
//!
//! Generators never concatenate markup strings. They build an [`SvgTree`] —
//! a plain element hierarchy plus stylesheet fragments — and the registry
//! serializes it twice, once readable ([`RenderMode::Raw`]) and once compact
//! ([`RenderMode::Minified`]). Both serializations come from the same tree
//! in the same call order, so they are structurally identical and differ
//! only in insignificant whitespace.
//!
//! ## Namespacing
//!
//! A page embeds many generated graphics, each carrying its own `<style>`
//! element and its own ids. The tree therefore rewrites, identically in
//! both modes, every identifier it introduces or references under its
//! namespace:
//!
//! - the root `id` is the namespace itself;
//! - `id` attributes become `{ns}-{value}`, `class` tokens `{ns}-{token}`;
//! - `url(#x)` in any attribute value and `href="#x"` fragments are
//!   rewritten to point at the prefixed id;
//! - in style text, `@keyframes` names and their references, `#id` and
//!   `.class` selector tokens are prefixed, and every other selector is
//!   scoped under the root id so bare element selectors (`circle`,
//!   `polyline`) cannot style a neighboring tree.
//!
//! Two trees with different namespaces can be concatenated on one page with
//! no identifier resolving across the boundary.
//!
//! ## Render freeze
//!
//! Rendering is pure and repeatable: the same tree in the same mode
//! produces byte-identical output, and rendering leaves no state behind
//! that could differ between the raw and minified passes. To keep that
//! guarantee honest, the first render freezes the tree — any later attempt
//! to add styles or reach the element hierarchy fails with
//! [`TreeError::Frozen`] instead of silently producing markup that the
//! already-rendered output does not contain.

use std::cell::Cell;
use thiserror::Error;

const XMLNS: &str = "http://www.w3.org/2000/svg";

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("tree namespace must not be empty")]
    EmptyNamespace,
    #[error("malformed viewBox {0:?}: expected four numbers")]
    MalformedViewBox(String),
    #[error("animation duration must be strictly positive, got {0}")]
    BadDuration(f64),
    #[error("tree is frozen: it has already been rendered")]
    Frozen,
}

/// Serialization mode. Both modes rewrite identifiers identically; they
/// differ only in whitespace emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Pretty-printed, two-space indentation, stable formatting. Meant for
    /// humans and output diffing.
    Raw,
    /// No whitespace between tags, collapsed stylesheet whitespace. Meant
    /// for embedding.
    Minified,
}

/// Root configuration for one generator's tree.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Identifier prefix, unique per page context. Non-empty.
    pub namespace: String,
    /// Four-number `viewBox` string, e.g. `-50 -50 100 100`.
    pub view_box: String,
    /// Animation cycle length in seconds, strictly positive. Emitted as
    /// `data-animation-duration` on the root for the embedding page.
    pub animation_duration: f64,
}

/// One markup element: tag, attributes in insertion order, children in
/// call order.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a child element and return it for further nesting. Children
    /// render in call order; there is no depth or fan-out limit.
    pub fn child(&mut self, tag: &str) -> &mut Element {
        self.children.push(Element::new(tag));
        self.children.last_mut().unwrap()
    }

    /// Set an attribute. A repeated key overwrites in place, keeping the
    /// first-insertion position so output stays stable.
    pub fn attr(&mut self, name: &str, value: impl Into<String>) -> &mut Element {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The build tree a generator returns: root element, stylesheet fragments,
/// and the namespace everything is rewritten under.
#[derive(Debug)]
pub struct SvgTree {
    namespace: String,
    view_box: String,
    animation_duration: f64,
    root: Element,
    styles: Vec<String>,
    frozen: Cell<bool>,
}

impl SvgTree {
    pub fn new(config: TreeConfig) -> Result<Self, TreeError> {
        if config.namespace.is_empty() {
            return Err(TreeError::EmptyNamespace);
        }
        validate_view_box(&config.view_box)?;
        if !config.animation_duration.is_finite() || config.animation_duration <= 0.0 {
            return Err(TreeError::BadDuration(config.animation_duration));
        }
        Ok(Self {
            namespace: config.namespace,
            view_box: config.view_box,
            animation_duration: config.animation_duration,
            root: Element::new("svg"),
            styles: Vec::new(),
            frozen: Cell::new(false),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Append one literal stylesheet fragment. Fragments concatenate in
    /// call order into a single `<style>` element at the top of the tree.
    pub fn style(&mut self, css: &str) -> Result<(), TreeError> {
        self.ensure_mutable()?;
        self.styles.push(css.trim().to_string());
        Ok(())
    }

    /// Mutable access to the root element for building the hierarchy.
    pub fn root_mut(&mut self) -> Result<&mut Element, TreeError> {
        self.ensure_mutable()?;
        Ok(&mut self.root)
    }

    fn ensure_mutable(&self) -> Result<(), TreeError> {
        if self.frozen.get() {
            Err(TreeError::Frozen)
        } else {
            Ok(())
        }
    }

    /// Serialize the tree depth-first, children in insertion order.
    ///
    /// Freezes the tree on first call; rendering again (in either mode) is
    /// fine and byte-identical, mutating afterwards is not.
    pub fn render(&self, mode: RenderMode) -> String {
        self.frozen.set(true);
        let mut out = String::new();

        out.push('<');
        out.push_str(self.root.tag());
        write_attr(&mut out, "id", &self.namespace);
        write_attr(&mut out, "viewBox", &self.view_box);
        write_attr(
            &mut out,
            "data-animation-duration",
            &format!("{}s", fmt_num(self.animation_duration)),
        );
        write_attr(&mut out, "xmlns", XMLNS);
        for (name, value) in &self.root.attrs {
            write_attr(&mut out, name, &self.rewrite_attr(name, value));
        }
        out.push('>');

        if !self.styles.is_empty() {
            let css = rewrite_css(&self.styles.join("\n\n"), &self.namespace);
            match mode {
                RenderMode::Raw => {
                    out.push_str("\n  <style>\n");
                    out.push_str(&css);
                    out.push_str("\n  </style>");
                }
                RenderMode::Minified => {
                    out.push_str("<style>");
                    out.push_str(&minify_css(&css));
                    out.push_str("</style>");
                }
            }
        }

        for child in &self.root.children {
            self.write_element(child, &mut out, 1, mode);
        }

        if mode == RenderMode::Raw {
            out.push('\n');
        }
        out.push_str("</svg>");
        out
    }

    fn write_element(&self, el: &Element, out: &mut String, depth: usize, mode: RenderMode) {
        if mode == RenderMode::Raw {
            out.push('\n');
            for _ in 0..depth {
                out.push_str("  ");
            }
        }
        out.push('<');
        out.push_str(el.tag());
        for (name, value) in &el.attrs {
            write_attr(out, name, &self.rewrite_attr(name, value));
        }
        if el.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &el.children {
            self.write_element(child, out, depth + 1, mode);
        }
        if mode == RenderMode::Raw {
            out.push('\n');
            for _ in 0..depth {
                out.push_str("  ");
            }
        }
        out.push_str("</");
        out.push_str(el.tag());
        out.push('>');
    }

    fn rewrite_attr(&self, name: &str, value: &str) -> String {
        let ns = &self.namespace;
        match name {
            "id" => format!("{ns}-{value}"),
            "class" => value
                .split_whitespace()
                .map(|token| format!("{ns}-{token}"))
                .collect::<Vec<_>>()
                .join(" "),
            "href" | "xlink:href" if value.starts_with('#') => {
                format!("#{ns}-{}", &value[1..])
            }
            _ => rewrite_url_refs(value, ns),
        }
    }
}

fn validate_view_box(view_box: &str) -> Result<(), TreeError> {
    let numbers: Vec<f64> = view_box
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| TreeError::MalformedViewBox(view_box.to_string()))?;
    if numbers.len() != 4 || numbers.iter().any(|n| !n.is_finite()) {
        return Err(TreeError::MalformedViewBox(view_box.to_string()));
    }
    Ok(())
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Format a coordinate or duration for markup output: at most three
/// decimals, trailing zeros trimmed. Shared by both render modes so raw
/// and minified markup carry identical values.
pub fn fmt_num(value: f64) -> String {
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Identifier rewriting
// ============================================================================

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Prefix the fragment in every `url(#x)` occurrence.
fn rewrite_url_refs(text: &str, ns: &str) -> String {
    const MARKER: &str = "url(#";
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(MARKER) {
        out.push_str(&rest[..pos + MARKER.len()]);
        out.push_str(ns);
        out.push('-');
        rest = &rest[pos + MARKER.len()..];
    }
    out.push_str(rest);
    out
}

/// Names declared by `@keyframes` rules in the stylesheet text.
fn keyframes_names(css: &str) -> Vec<String> {
    const MARKER: &str = "@keyframes";
    let mut names = Vec::new();
    let mut rest = css;
    while let Some(pos) = rest.find(MARKER) {
        rest = &rest[pos + MARKER.len()..];
        let name: String = rest
            .trim_start()
            .chars()
            .take_while(|c| is_ident_char(*c))
            .collect();
        if !name.is_empty() {
            names.push(name);
        }
    }
    names
}

/// Replace whole-identifier occurrences of `from` (boundaries are
/// non-identifier characters, so `spin` does not match inside `spin-fast`).
fn replace_ident(text: &str, from: &str, to: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if text[i..].starts_with(from) {
            let before_ok = text[..i].chars().next_back().is_none_or(|c| !is_ident_char(c));
            let after_ok = text[i + from.len()..]
                .chars()
                .next()
                .is_none_or(|c| !is_ident_char(c));
            if before_ok && after_ok {
                out.push_str(to);
                i += from.len();
                continue;
            }
        }
        let c = text[i..].chars().next().unwrap();
        out.push(c);
        i += c.len_utf8();
    }
    out
}

/// Rewrite a stylesheet under a namespace.
///
/// Shallow brace-walk, no CSS parser: top-level `@keyframes` headers get
/// their name prefixed; every other top-level selector list is scoped under
/// the root id with its `.class`/`#id` tokens prefixed; declaration runs
/// get `url(#x)` fragments and keyframes-name references rewritten.
/// Keyframe step selectors (`from`, `to`, percentages) pass through.
fn rewrite_css(css: &str, ns: &str) -> String {
    let names = keyframes_names(css);
    let mut out = String::with_capacity(css.len() + 64);
    let mut buf = String::new();
    let mut depth = 0usize;

    for c in css.chars() {
        match c {
            '{' => {
                if depth == 0 {
                    if buf.trim_start().starts_with("@keyframes") {
                        out.push_str(&rewrite_keyframes_header(&buf, ns));
                    } else {
                        out.push_str(&rewrite_selector_list(&buf, ns));
                    }
                } else {
                    // keyframe step selector: from / to / 50%
                    out.push_str(&buf);
                }
                buf.clear();
                out.push('{');
                depth += 1;
            }
            '}' => {
                out.push_str(&rewrite_declarations(&buf, ns, &names));
                buf.clear();
                depth = depth.saturating_sub(1);
                out.push('}');
            }
            other => buf.push(other),
        }
    }
    out.push_str(&buf);
    out
}

fn rewrite_keyframes_header(header: &str, ns: &str) -> String {
    match header.split_once("@keyframes") {
        Some((lead, rest)) => format!("{lead}@keyframes {ns}-{} ", rest.trim()),
        None => header.to_string(),
    }
}

fn rewrite_selector_list(text: &str, ns: &str) -> String {
    let lead: String = text.chars().take_while(|c| c.is_whitespace()).collect();
    let rewritten = text
        .trim()
        .split(',')
        .map(|selector| format!("#{ns} {}", rewrite_selector_tokens(selector.trim(), ns)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{lead}{rewritten} ")
}

fn rewrite_selector_tokens(selector: &str, ns: &str) -> String {
    let mut out = String::with_capacity(selector.len());
    let mut chars = selector.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if (c == '.' || c == '#')
            && chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_')
        {
            out.push_str(ns);
            out.push('-');
        }
    }
    out
}

fn rewrite_declarations(text: &str, ns: &str, keyframes: &[String]) -> String {
    let mut out = rewrite_url_refs(text, ns);
    for name in keyframes {
        out = replace_ident(&out, name, &format!("{ns}-{name}"));
    }
    out
}

/// Collapse stylesheet whitespace: runs become a single space, and spaces
/// adjacent to structural characters disappear entirely. Pure whitespace
/// removal — no token is altered.
fn minify_css(css: &str) -> String {
    const TIGHT: &str = "{}:;,>()";
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let prev_tight = out.chars().next_back().is_none_or(|p| TIGHT.contains(p));
            let next_tight = chars.peek().is_none_or(|n| TIGHT.contains(*n));
            if !prev_tight && !next_tight {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    out
}
