use minesweeper_core::{BestScores, CellView, GameState, Snapshot, Theme};
use std::fmt::Write;

struct Glyphs {
    hidden: char,
    empty: char,
}

const fn glyphs(theme: Theme) -> Glyphs {
    match theme {
        Theme::Classic => Glyphs {
            hidden: '#',
            empty: '.',
        },
        Theme::Dark => Glyphs {
            hidden: '░',
            empty: ' ',
        },
    }
}

fn cell_glyph(view: CellView, glyphs: &Glyphs) -> char {
    use CellView::*;
    match view {
        Hidden => glyphs.hidden,
        Flagged => 'F',
        Questioned => '?',
        Revealed(0) => glyphs.empty,
        Revealed(count) => char::from(b'0' + count),
        Mine => '*',
        Exploded => 'X',
        WrongFlag => '!',
    }
}

/// Text frame: status line, column ruler, then one row per board line.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let (x_end, y_end) = snapshot.size();

    let _ = writeln!(
        out,
        "{} {}x{}  mines: {:03}  time: {:03}  theme: {}{}",
        snapshot.difficulty.name(),
        x_end,
        y_end,
        snapshot.mines_left,
        snapshot.elapsed_secs,
        snapshot.theme.name(),
        if snapshot.question_marks { "" } else { "  (no ? marks)" },
    );

    if snapshot.paused {
        out.push_str("-- paused, p to resume --\n");
        return out;
    }

    out.push_str("    ");
    for x in 0..x_end {
        out.push(char::from(b'0' + x % 10));
    }
    out.push('\n');

    let glyphs = glyphs(snapshot.theme);
    for y in 0..y_end {
        let _ = write!(out, "{:>3} ", y);
        for x in 0..x_end {
            let view = snapshot.cell((x, y)).unwrap_or(CellView::Hidden);
            let glyph = match view {
                CellView::Hidden | CellView::Questioned if snapshot.hint == Some((x, y)) => '+',
                view => cell_glyph(view, &glyphs),
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    match snapshot.state {
        GameState::Playing => {}
        GameState::Won if snapshot.new_best => out.push_str("You win! New best time!\n"),
        GameState::Won => out.push_str("You win!\n"),
        GameState::Lost => out.push_str("Boom! n for a new game\n"),
    }

    out
}

pub fn score_lines(scores: &BestScores) -> Vec<String> {
    if scores.is_empty() {
        return vec!["No records yet".to_owned()];
    }
    scores
        .iter()
        .map(|(key, secs)| format!("{key} : {secs}s"))
        .collect()
}
