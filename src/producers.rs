//! Built-in generator programs.
//!
//! A generator module on disk names one of these producers and supplies a
//! parameter table. Each producer is a pure function from `(identity,
//! params)` to a fully built [`SvgTree`]: no I/O, no ordering dependency on
//! other generators, deterministic for a fixed input — discovery invokes a
//! generator once per pass and relies on stable results across reloads.
//!
//! Parameter tables deserialize through serde with per-producer defaults,
//! so a module file can say as little as `producer = "pulse-grid"` and
//! still render.

use crate::geometry::{grid_points, points_attr, sierpinski_square, square_path};
use crate::naming;
use crate::svg::{SvgTree, TreeConfig, TreeError, fmt_num};
use kurbo::Point;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("invalid generator params: {0}")]
    Params(#[from] Box<toml::de::Error>),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// A generator: identity string plus parameter table in, build tree out.
pub type Producer = fn(&str, &toml::Table) -> Result<SvgTree, ProducerError>;

const BUILTINS: &[(&str, Producer)] = &[
    ("pulse-grid", pulse_grid),
    ("dash-trace", dash_trace),
    ("stripe-spinner", stripe_spinner),
];

/// Resolve a producer by the name a module file uses.
pub fn resolve(name: &str) -> Option<Producer> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, producer)| *producer)
}

/// Names of all built-in producers, for diagnostics.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|(name, _)| *name).collect()
}

fn params<T: DeserializeOwned>(table: &toml::Table) -> Result<T, ProducerError> {
    T::deserialize(toml::Value::Table(table.clone())).map_err(|e| ProducerError::Params(Box::new(e)))
}

fn tree_for(identity: &str, view_box: String, duration: f64) -> Result<SvgTree, TreeError> {
    SvgTree::new(TreeConfig {
        namespace: naming::namespace_for(identity),
        view_box,
        animation_duration: duration,
    })
}

// ============================================================================
// pulse-grid
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PulseGridParams {
    size: f64,
    cells: u32,
    duration: f64,
}

impl Default for PulseGridParams {
    fn default() -> Self {
        Self {
            size: 200.0,
            cells: 10,
            duration: 1.0,
        }
    }
}

/// Square lattice of paired circles; the outer ring of each pair pulses.
fn pulse_grid(identity: &str, table: &toml::Table) -> Result<SvgTree, ProducerError> {
    let p: PulseGridParams = params(table)?;
    let half = p.size / 2.0;

    let mut tree = tree_for(
        identity,
        format!(
            "{} {} {} {}",
            fmt_num(-half),
            fmt_num(-half),
            fmt_num(p.size),
            fmt_num(p.size)
        ),
        p.duration,
    )?;

    let duration = fmt_num(p.duration);
    tree.style(&format!(
        "circle:nth-child(1) {{
  fill: none;
  stroke: black;
  stroke-width: 0.5;
  transform-origin: 0 0;
  animation: first-circle {duration}s infinite ease-out alternate;
}}

circle:nth-child(2) {{
  fill: black;
  stroke: none;
}}

@keyframes first-circle {{
  from {{
    transform: scale(1);
  }}

  to {{
    transform: scale(1.05);
  }}
}}"
    ))?;

    let root = tree.root_mut()?;
    for row in grid_points(p.size, p.cells) {
        for point in row {
            let g = root.child("g");
            g.child("circle")
                .attr("cx", fmt_num(point.x))
                .attr("cy", fmt_num(point.y))
                .attr("r", "2");
            g.child("circle")
                .attr("cx", fmt_num(point.x))
                .attr("cy", fmt_num(point.y))
                .attr("r", "2");
        }
    }

    Ok(tree)
}

// ============================================================================
// dash-trace
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DashTraceParams {
    size: f64,
    iterations: u32,
}

impl Default for DashTraceParams {
    fn default() -> Self {
        Self {
            size: 90.0,
            iterations: 5,
        }
    }
}

/// Sierpiński square curve traced by an animated stroke dash.
///
/// The dash array is two segments long, so one animation cycle shifts the
/// dash pattern by exactly its own length — the duration scales with the
/// dash/segment ratio to keep the apparent tracing speed constant.
fn dash_trace(identity: &str, table: &toml::Table) -> Result<SvgTree, ProducerError> {
    let p: DashTraceParams = params(table)?;
    let points = sierpinski_square(p.size, p.iterations);

    let segment = points[0].distance(points[1]);
    let dash_array = [segment, segment];
    let dash_length: f64 = dash_array.iter().sum();
    let duration = dash_length / segment;

    let frame = p.size + 10.0;
    let half = frame / 2.0;
    let mut tree = tree_for(
        identity,
        format!("{} {} {} {}", fmt_num(-half), fmt_num(-half), fmt_num(frame), fmt_num(frame)),
        duration,
    )?;

    let dashes = dash_array
        .iter()
        .map(|v| format!("{}%", fmt_num(*v)))
        .collect::<Vec<_>>()
        .join(",");
    tree.style(&format!(
        "polyline {{
  stroke: black;
  stroke-width: 0.3;
  fill: none;
  stroke-dasharray: {dashes};
  animation: main-anim {}s linear infinite;
}}

@keyframes main-anim {{
  from {{
    stroke-dashoffset: 0;
  }}
  to {{
    stroke-dashoffset: {}%;
  }}
}}",
        fmt_num(duration),
        fmt_num(dash_length)
    ))?;

    tree.root_mut()?
        .child("polyline")
        .attr("points", points_attr(&points));

    Ok(tree)
}

// ============================================================================
// stripe-spinner
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StripeSpinnerParams {
    strips: u32,
    circle_radius: f64,
    square_size: f64,
    duration: f64,
}

impl Default for StripeSpinnerParams {
    fn default() -> Self {
        Self {
            strips: 15,
            circle_radius: 30.0,
            square_size: 70.0,
            duration: 20.0,
        }
    }
}

/// Stripe pattern shown through a static square mask and, inside it, a
/// rotating circular mask. Exercises `defs`/`use` reuse and clip-path
/// references, which all cross the namespace rewrite.
fn stripe_spinner(identity: &str, table: &toml::Table) -> Result<SvgTree, ProducerError> {
    let p: StripeSpinnerParams = params(table)?;

    let mut tree = tree_for(identity, "0 0 100 100".to_string(), p.duration)?;

    tree.style(&format!(
        ".stripe {{
  fill: black;
  stroke: none;
}}

.circle {{
  transform-origin: 50% 50%;
  animation: circle-anim {}s linear infinite;
}}

@keyframes circle-anim {{
  from {{
    transform: rotate(0);
  }}

  to {{
    transform: rotate(180deg);
  }}
}}",
        fmt_num(p.duration)
    ))?;

    let root = tree.root_mut()?;
    let defs = root.child("defs");

    let stripes = defs.child("g");
    stripes.attr("id", "stripes");
    let thickness = p.square_size / (f64::from(p.strips) * 2.0 - 1.0);
    let top = (100.0 - p.square_size) / 2.0;
    for i in 0..p.strips {
        let y = f64::from(i) * thickness * 2.0 + top;
        stripes
            .child("rect")
            .attr("class", "stripe")
            .attr("x", "0")
            .attr("y", fmt_num(y))
            .attr("width", "100")
            .attr("height", fmt_num(thickness));
    }

    defs.child("clipPath")
        .attr("id", "square-mask")
        .child("path")
        .attr("fill-rule", "evenodd")
        .attr(
            "d",
            square_path(p.square_size, Point::new(50.0, 50.0), true),
        );

    defs.child("clipPath")
        .attr("id", "circle-mask")
        .child("circle")
        .attr("cx", "50")
        .attr("cy", "50")
        .attr("r", fmt_num(p.circle_radius));

    root.child("g")
        .attr("clip-path", "url(#square-mask)")
        .child("use")
        .attr("href", "#stripes");

    root.child("g")
        .attr("clip-path", "url(#circle-mask)")
        .child("g")
        .attr("transform", "rotate(0, 50, 50)")
        .child("use")
        .attr("class", "circle")
        .attr("href", "#stripes");

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::RenderMode;

    fn table(toml_text: &str) -> toml::Table {
        toml_text.parse().unwrap()
    }

    #[test]
    fn resolve_finds_builtins() {
        for name in builtin_names() {
            assert!(resolve(name).is_some(), "{name} should resolve");
        }
        assert!(resolve("no-such-producer").is_none());
    }

    #[test]
    fn pulse_grid_builds_one_group_per_lattice_point() {
        let tree = pulse_grid("05-c", &table("cells = 4")).unwrap();
        let raw = tree.render(RenderMode::Raw);
        assert_eq!(raw.matches("<g>").count(), 16);
        assert_eq!(raw.matches("<circle").count(), 32);
        assert!(raw.contains("id=\"svg-05-c\""));
        assert!(raw.contains("@keyframes svg-05-c-first-circle"));
    }

    #[test]
    fn pulse_grid_defaults_match_module_with_no_params() {
        let tree = pulse_grid("05-c", &toml::Table::new()).unwrap();
        let raw = tree.render(RenderMode::Raw);
        assert!(raw.contains("viewBox=\"-100 -100 200 200\""));
        assert!(raw.contains("data-animation-duration=\"1s\""));
    }

    #[test]
    fn dash_trace_duration_follows_dash_length() {
        // dash array is [segment, segment]: one cycle is two segments long
        let tree = dash_trace("18-k", &table("iterations = 3")).unwrap();
        let raw = tree.render(RenderMode::Raw);
        assert!(raw.contains("data-animation-duration=\"2s\""));
        assert!(raw.contains("animation: svg-18-k-main-anim 2s linear infinite;"));
        assert!(raw.contains("<polyline points=\""));
    }

    #[test]
    fn dash_trace_frame_leaves_margin_around_curve() {
        let tree = dash_trace("18-k", &toml::Table::new()).unwrap();
        let raw = tree.render(RenderMode::Raw);
        assert!(raw.contains("viewBox=\"-50 -50 100 100\""));
    }

    #[test]
    fn stripe_spinner_masks_reference_namespaced_defs() {
        let tree = stripe_spinner("23-b", &toml::Table::new()).unwrap();
        let raw = tree.render(RenderMode::Raw);
        assert!(raw.contains("id=\"svg-23-b-stripes\""));
        assert!(raw.contains("clip-path=\"url(#svg-23-b-square-mask)\""));
        assert!(raw.contains("clip-path=\"url(#svg-23-b-circle-mask)\""));
        assert!(raw.contains("href=\"#svg-23-b-stripes\""));
        assert_eq!(raw.matches("<rect").count(), 15);
    }

    #[test]
    fn unknown_param_key_is_rejected() {
        let err = pulse_grid("05-c", &table("cels = 4")).unwrap_err();
        assert!(matches!(err, ProducerError::Params(_)));
    }

    #[test]
    fn producers_are_deterministic() {
        let once = dash_trace("18-k", &toml::Table::new())
            .unwrap()
            .render(RenderMode::Minified);
        let twice = dash_trace("18-k", &toml::Table::new())
            .unwrap()
            .render(RenderMode::Minified);
        assert_eq!(once, twice);
    }
}
