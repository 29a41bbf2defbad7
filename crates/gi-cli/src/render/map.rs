//! Terminal map panel: a bubble plot on an equirectangular grid, or a list of
//! styled choropleth features.

use std::fmt::Write as _;

use gi_core::geo::{
    bubble_markers, choropleth_styles, fit_viewport, BubbleMarker, Viewport, WorldBoundaries,
};
use gi_core::{CountryAggregate, CountrySelection};

use super::Renderer;

const GRID_COLS: usize = 72;
const GRID_ROWS: usize = 18;

#[derive(Debug, Clone)]
pub(crate) enum MapView {
    Bubble,
    Choropleth(WorldBoundaries),
}

pub(super) fn write_map(
    renderer: &Renderer,
    out: &mut String,
    countries: &[CountryAggregate],
    selection: &CountrySelection,
) -> std::fmt::Result {
    match &renderer.map {
        MapView::Bubble => write_bubbles(renderer, out, countries, selection),
        MapView::Choropleth(world) => write_choropleth(renderer, out, world, countries, selection),
    }
}

fn write_bubbles(
    renderer: &Renderer,
    out: &mut String,
    countries: &[CountryAggregate],
    selection: &CountrySelection,
) -> std::fmt::Result {
    let markers = bubble_markers(countries, selection);
    let viewport = fit_viewport(&markers);
    writeln!(out, "Map ({})", describe(viewport))?;

    let grid = plot(&markers, viewport);
    let border = format!("  +{}+", "-".repeat(GRID_COLS));
    writeln!(out, "{border}")?;
    for row in &grid {
        let line: String = row
            .iter()
            .map(|cell| match cell {
                Some(i) => {
                    let m = &markers[*i];
                    renderer.paint(m.color, &glyph(m).to_string())
                }
                None => " ".to_string(),
            })
            .collect();
        writeln!(out, "  |{line}|")?;
    }
    writeln!(out, "{border}")?;

    for m in &markers {
        let mark = if m.selected { "*" } else { " " };
        writeln!(
            out,
            " {mark}{} {:<4}{:<18}posts {:>5}  avg {:+.2}",
            renderer.paint(m.color, &glyph(m).to_string()),
            m.cc,
            m.name,
            m.n,
            m.avg
        )?;
    }
    if markers.is_empty() {
        writeln!(out, "  No mappable countries.")?;
    }
    Ok(())
}

fn write_choropleth(
    renderer: &Renderer,
    out: &mut String,
    world: &WorldBoundaries,
    countries: &[CountryAggregate],
    selection: &CountrySelection,
) -> std::fmt::Result {
    let styles = choropleth_styles(world, countries, selection);
    let (shown, empty): (Vec<_>, Vec<_>) = styles
        .iter()
        .partition(|s| s.aggregate.is_some() || s.selected);
    let with_data = shown.iter().filter(|s| s.aggregate.is_some()).count();
    writeln!(out, "Map (choropleth, {with_data} countries with data)")?;
    for style in &shown {
        let mark = if style.selected { "*" } else { " " };
        let detail = match &style.aggregate {
            Some(agg) => format!("posts {:>5}  avg {:+.2}", agg.n, agg.avg),
            None => "no data".to_string(),
        };
        writeln!(
            out,
            " {mark}{} {:<4}{:<24}{detail}",
            renderer.paint(style.fill, "■"),
            style.iso,
            style.name,
        )?;
    }
    writeln!(out, "  {} more countries with no data", empty.len())
}

/// Marker glyph by radius band; selected markers stand out.
fn glyph(marker: &BubbleMarker) -> char {
    if marker.selected {
        '#'
    } else if marker.radius < 10.0 {
        'o'
    } else if marker.radius < 20.0 {
        'O'
    } else {
        '@'
    }
}

fn describe(viewport: Viewport) -> String {
    match viewport {
        Viewport::Fit {
            south,
            west,
            north,
            east,
        } => format!("lat {south:.0}..{north:.0}, lon {west:.0}..{east:.0}"),
        Viewport::World { center, zoom } => {
            format!("world view, center {:.0},{:.0} zoom {zoom}", center.0, center.1)
        }
    }
}

/// Place markers on the grid; where two overlap the larger one wins.
fn plot(markers: &[BubbleMarker], viewport: Viewport) -> Vec<Vec<Option<usize>>> {
    let (south, west, north, east) = match viewport {
        Viewport::Fit {
            south,
            west,
            north,
            east,
        } => (south, west, north, east),
        Viewport::World { .. } => (-90.0, -180.0, 90.0, 180.0),
    };

    let mut grid: Vec<Vec<Option<usize>>> = vec![vec![None; GRID_COLS]; GRID_ROWS];
    for (i, m) in markers.iter().enumerate() {
        let col = scale(m.lon, west, east, GRID_COLS);
        let row = scale(north - m.lat + south, south, north, GRID_ROWS);
        let cell = &mut grid[row][col];
        match cell {
            Some(j) if markers[*j].radius >= m.radius => {}
            _ => *cell = Some(i),
        }
    }
    grid
}

/// Map `v` in `[lo, hi]` to a cell index in `0..cells`.
fn scale(v: f64, lo: f64, hi: f64, cells: usize) -> usize {
    let span = (hi - lo).max(f64::EPSILON);
    let t = ((v - lo) / span).clamp(0.0, 1.0);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let idx = (t * (cells - 1) as f64).round() as usize;
    idx.min(cells - 1)
}
