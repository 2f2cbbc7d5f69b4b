use sweeper_protocol::{HIDDEN, TextBoard};

/// Terminal glyph for a wire cell: hidden cells are `#` and zero counts are left blank.
pub fn display_cell(cell: &str) -> &str {
    match cell {
        HIDDEN => "#",
        "0" => " ",
        other => other,
    }
}

/// Renders the board with column numbers on top and row numbers on the left.
pub fn render(board: &TextBoard) -> String {
    let Some(width) = board.first().map(Vec::len) else {
        return "(empty board)\n".to_string();
    };

    let header: String = (0..width).map(|x| format!("{:>3}", x)).collect();
    let mut out = format!("    {}\n", header);
    for (y, row) in board.iter().enumerate() {
        let cells: String = row
            .iter()
            .map(|cell| format!("{:>3}", display_cell(cell)))
            .collect();
        out.push_str(&format!("{:>3} {}\n", y, cells));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[&str]]) -> TextBoard {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn glyphs() {
        assert_eq!(display_cell(" "), "#");
        assert_eq!(display_cell("0"), " ");
        assert_eq!(display_cell("3"), "3");
        assert_eq!(display_cell("X"), "X");
    }

    #[test]
    fn renders_headers_and_cells() {
        let text = render(&board(&[&[" ", "1"], &["0", "B"]]));

        assert_eq!(text, "      0  1\n  0   #  1\n  1      B\n");
    }

    #[test]
    fn empty_board() {
        assert_eq!(render(&Vec::new()), "(empty board)\n");
    }
}
