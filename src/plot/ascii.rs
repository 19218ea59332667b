//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output (pinned by a golden test).
//!
//! Plot elements:
//! - follow-up vs baseline scatter: `f` (female), `m` (male), `*` (both in one cell)
//! - a baseline density strip per group under the grid, on a shared scale
//! - a legend with group sizes and means

use crate::data::{Dataset, exposure_label};
use crate::models::Roles;

/// Density glyphs from empty to the most populated bin.
const LEVELS: [char; 6] = [' ', '.', ':', '-', '=', '#'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Female,
    Male,
}

impl Group {
    const ALL: [Group; 2] = [Group::Female, Group::Male];

    fn of(exposure: f64) -> Self {
        if exposure_label(exposure) == "male" { Group::Male } else { Group::Female }
    }

    fn label(self) -> &'static str {
        match self {
            Group::Female => exposure_label(-1.0),
            Group::Male => exposure_label(1.0),
        }
    }

    fn glyph(self) -> char {
        match self {
            Group::Female => 'f',
            Group::Male => 'm',
        }
    }
}

/// Scatter of follow-up against baseline for one dataset.
pub fn render_ascii_plot(data: &Dataset, roles: &Roles, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(exposure), Some(xs), Some(ys)) = (
        data.column(roles.exposure),
        data.column(roles.baseline),
        data.column(roles.follow_up),
    ) else {
        return format!("Plot: {} | no data\n", data.scenario().display_name());
    };
    let groups: Vec<Group> = exposure.iter().map(|&e| Group::of(e)).collect();

    let (x_min, x_max) = value_range(xs).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = value_range(ys).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for ((&x, &y), &g) in xs.iter().zip(ys).zip(&groups) {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let cell = &mut grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)];
        *cell = match *cell {
            ' ' => g.glyph(),
            c if c == g.glyph() => c,
            _ => '*',
        };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | {}=[{x_min:.2}, {x_max:.2}] | {}=[{y_min:.2}, {y_max:.2}]\n",
        data.scenario().display_name(),
        roles.baseline,
        roles.follow_up
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str(&format!("{} density by group:\n", roles.baseline));
    let counts: Vec<Vec<usize>> = Group::ALL
        .iter()
        .map(|&g| {
            let mut bins = vec![0usize; width];
            for (&x, _) in xs.iter().zip(&groups).filter(|(x, og)| **og == g && x.is_finite()) {
                bins[map_x(x, x_min, x_max, width)] += 1;
            }
            bins
        })
        .collect();
    let peak = counts.iter().flatten().copied().max().unwrap_or(0);
    for (g, bins) in Group::ALL.iter().zip(&counts) {
        let strip: String = bins.iter().map(|&c| density_glyph(c, peak)).collect();
        out.push_str(&format!("{strip} {}\n", g.glyph()));
    }

    for g in Group::ALL {
        let idx: Vec<usize> = (0..groups.len()).filter(|&i| groups[i] == g).collect();
        if idx.is_empty() {
            out.push_str(&format!("{} = {}: n=0\n", g.glyph(), g.label()));
            continue;
        }
        let n = idx.len() as f64;
        let mean_x = idx.iter().map(|&i| xs[i]).sum::<f64>() / n;
        let mean_y = idx.iter().map(|&i| ys[i]).sum::<f64>() / n;
        out.push_str(&format!(
            "{} = {}: n={}, mean {}={mean_x:.2}, mean {}={mean_y:.2}\n",
            g.glyph(),
            g.label(),
            idx.len(),
            roles.baseline,
            roles.follow_up
        ));
    }
    out.push_str("* = both groups\n");

    out
}

fn density_glyph(count: usize, peak: usize) -> char {
    if count == 0 || peak == 0 {
        return LEVELS[0];
    }
    let top = LEVELS.len() - 1;
    let level = ((count as f64 / peak as f64) * top as f64).ceil() as usize;
    LEVELS[level.clamp(1, top)]
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min { Some((min, max)) } else { Some((min - 0.5, max + 0.5)) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::domain::Scenario;
    use crate::models::ROLES;

    fn dataset(rows: &[(f64, f64, f64)]) -> Dataset {
        let col = |name: &'static str, f: fn(&(f64, f64, f64)) -> f64| Column {
            name,
            values: rows.iter().map(f).collect(),
        };
        Dataset {
            scenario: Scenario::NoConfounding,
            n_rows: rows.len(),
            exposure: "sex",
            standardized: Vec::new(),
            reported: vec![col("sex", |r| r.0), col("wt0", |r| r.1), col("wt1", |r| r.2)],
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let data = dataset(&[
            (-1.0, 60.0, 62.0),
            (-1.0, 70.0, 68.0),
            (1.0, 80.0, 84.0),
            (1.0, 90.0, 96.0),
        ]);

        let txt = render_ascii_plot(&data, &ROLES, 10, 5);
        let expected = concat!(
            "Plot: A: no mediator-outcome confounding | wt0=[60.00, 90.00] | wt1=[60.30, 97.70]\n",
            "         m\n",
            "      m   \n",
            "          \n",
            "   f      \n",
            "f         \n",
            "wt0 density by group:\n",
            "#  #       f\n",
            "      #  # m\n",
            "f = female: n=2, mean wt0=65.00, mean wt1=65.00\n",
            "m = male: n=2, mean wt0=85.00, mean wt1=90.00\n",
            "* = both groups\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn shared_cells_are_marked() {
        let data = dataset(&[(-1.0, 60.0, 60.0), (1.0, 60.0, 60.0), (1.0, 90.0, 90.0)]);
        let txt = render_ascii_plot(&data, &ROLES, 10, 5);
        let grid: Vec<&str> = txt.lines().skip(1).take(5).collect();
        assert_eq!(grid[4].chars().next(), Some('*'));
        assert_eq!(grid[0].chars().last(), Some('m'));
    }

    #[test]
    fn density_levels_scale_with_peak() {
        assert_eq!(density_glyph(0, 10), ' ');
        assert_eq!(density_glyph(1, 10), '.');
        assert_eq!(density_glyph(10, 10), '#');
        assert_eq!(density_glyph(5, 10), '-');
    }
}
