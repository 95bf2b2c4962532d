//! ASCII battle visualizer.
//!
//! Renders arenas as text for quick terminal review.

use std::collections::HashSet;
use std::fmt::Write as _;

use skirmish_core::arena::Arena;
use skirmish_core::battlefield::BattleField;
use skirmish_core::simulation::Skirmish;
use skirmish_core::spatial::GridPos;
use skirmish_core::team::{CellState, Team};

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Draw a box around the grid.
    pub show_border: bool,
    /// Mark wounded soldiers in lowercase.
    pub show_health: bool,
    /// Show team counts below the grid.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_border: true,
            show_health: true,
            show_legend: true,
            use_color: true,
        }
    }
}

impl AsciiConfig {
    /// Bare glyphs only, one line per row.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            show_border: false,
            show_health: true,
            show_legend: false,
            use_color: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const GRAY: &str = "\x1b[90m";
}

fn team_color(team: Team) -> &'static str {
    match team {
        Team::Red => colors::RED,
        Team::Blue => colors::BLUE,
    }
}

fn cell_glyph(cell: CellState, wounded: bool) -> char {
    match cell {
        CellState::Occupied(team) if wounded => team.glyph().to_ascii_lowercase(),
        other => other.glyph(),
    }
}

fn cell_color(cell: CellState) -> &'static str {
    match cell {
        CellState::Occupied(team) => team_color(team),
        CellState::Obstacle => colors::GRAY,
        CellState::Empty | CellState::OutOfBounds => colors::DIM,
    }
}

/// Render an arena as ASCII art.
#[must_use]
pub fn render_ascii(arena: &Arena, config: &AsciiConfig) -> String {
    render_cells(arena, config, &HashSet::new())
}

/// Render a battle in progress. With `show_health`, wounded soldiers are
/// drawn in lowercase.
#[must_use]
pub fn render_skirmish(battle: &Skirmish<'_>, config: &AsciiConfig) -> String {
    let wounded: HashSet<GridPos> = if config.show_health {
        let full = battle.profile().initial_health;
        battle
            .soldiers()
            .filter(|(_, s)| s.health() < full)
            .map(|(_, s)| s.position())
            .collect()
    } else {
        HashSet::new()
    };
    render_cells(battle.arena(), config, &wounded)
}

fn render_cells(arena: &Arena, config: &AsciiConfig, wounded: &HashSet<GridPos>) -> String {
    let mut output = String::new();
    let width = arena.cols() as usize;

    if config.show_border {
        output.push('╔');
        output.push_str(&"═".repeat(width));
        output.push_str("╗\n");
    }

    for row in 0..arena.rows() {
        if config.show_border {
            output.push('║');
        }
        for col in 0..arena.cols() {
            let pos = GridPos::new(row, col);
            let cell = arena.get(pos);
            let ch = cell_glyph(cell, wounded.contains(&pos));
            if config.use_color {
                output.push_str(cell_color(cell));
                output.push(ch);
                output.push_str(colors::RESET);
            } else {
                output.push(ch);
            }
        }
        if config.show_border {
            output.push('║');
        }
        output.push('\n');
    }

    if config.show_border {
        output.push('╚');
        output.push_str(&"═".repeat(width));
        output.push_str("╝\n");
    }

    if config.show_legend {
        output.push_str(&render_legend(arena, config));
    }

    output
}

fn render_legend(arena: &Arena, config: &AsciiConfig) -> String {
    let mut legend = String::new();
    for team in Team::ALL {
        let count = arena.count(CellState::Occupied(team));
        let (color, reset) = if config.use_color {
            (team_color(team), colors::RESET)
        } else {
            ("", "")
        };
        let _ = write!(legend, "{color}{}{reset}={team}:{count} ", team.glyph());
    }
    let _ = writeln!(legend, "#=obstacle");
    legend
}

/// Render a before/after table of team strength.
#[must_use]
pub fn render_battle_progress(before: &Arena, after: &Arena, config: &AsciiConfig) -> String {
    let mut output = String::new();
    let (bold, reset) = if config.use_color {
        (colors::BOLD, colors::RESET)
    } else {
        ("", "")
    };

    let _ = writeln!(output, "\n{bold}Battle Progress{reset}");
    output.push_str("┌────────┬────────┬────────┬────────┐\n");
    output.push_str("│ Team   │ Before │ After  │ Change │\n");
    output.push_str("├────────┼────────┼────────┼────────┤\n");

    for team in Team::ALL {
        let b = before.count(CellState::Occupied(team)) as i64;
        let a = after.count(CellState::Occupied(team)) as i64;
        let change = a - b;

        let change_str = if change > 0 {
            format!("+{change}")
        } else {
            change.to_string()
        };

        let change_color = if config.use_color {
            match change.signum() {
                1 => colors::GREEN,
                -1 => colors::RED,
                _ => colors::GRAY,
            }
        } else {
            ""
        };

        let _ = writeln!(
            output,
            "│ {:<6} │ {:>6} │ {:>6} │ {}{:>6}{} │",
            team.display_name(),
            b,
            a,
            change_color,
            change_str,
            reset
        );
    }

    output.push_str("└────────┴────────┴────────┴────────┘\n");
    output
}
