use std::io::{self, Write as _};

use anyhow::Context as _;
use pivotris_engine::{Board, PieceKind, Point, Tetromino};

const GAP: &str = "  ";

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShapesArg {
    /// Only print this piece kind (one of I, O, T, S, Z, J, L)
    #[arg(long, value_parser = parse_kind)]
    kind: Option<PieceKind>,
}

fn parse_kind(s: &str) -> Result<PieceKind, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PieceKind::from_char(c),
        _ => None,
    }
    .ok_or_else(|| format!("unknown piece kind '{s}'"))
}

pub(crate) fn run(arg: &ShapesArg) -> anyhow::Result<()> {
    let kinds = match arg.kind {
        Some(kind) => vec![kind],
        None => PieceKind::ALL.to_vec(),
    };

    let mut stdout = io::stdout().lock();
    for kind in kinds {
        let text = render_orientations(kind)?;
        writeln!(stdout, "{text}").context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Renders the four orientations of `kind` side by side.
///
/// Each orientation is locked onto its own 4x4 board with the top-left
/// corner of its outline at the origin.
fn render_orientations(kind: PieceKind) -> anyhow::Result<String> {
    let mut piece = Tetromino::from_kind(kind, Point::default());
    let mut boards = vec![];
    for _ in 0..4 {
        let left = piece.verts().iter().map(|v| v.x).min().unwrap_or_default();
        let top = piece.verts().iter().map(|v| v.y).min().unwrap_or_default();
        let mut board = Board::new(4, 4);
        board
            .place_tetromino(&piece.translated(-left, -top))
            .with_context(|| format!("{kind} orientation {} does not fit", piece.orientation()))?;
        boards.push(board.to_string());
        piece.rotate();
    }

    let mut text = format!("{kind}\n");
    let mut rows: Vec<_> = boards.iter().map(|board| board.lines()).collect();
    for _ in 0..4 {
        let line: Vec<_> = rows.iter_mut().filter_map(|lines| lines.next()).collect();
        text.push_str(&line.join(GAP));
        text.push('\n');
    }
    Ok(text)
}
