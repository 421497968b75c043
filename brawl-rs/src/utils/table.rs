//! Table formatting utilities

use glam::Vec2;
use prettytable::{Cell, Row, Table};

/// A table with bold headers and no separators between rows
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers.iter().map(|h| Cell::new(h).style_spec("b")).collect(),
    ));
    table
}

pub fn add_table_row<I, S>(table: &mut Table, cells: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    table.add_row(Row::new(cells.into_iter().map(|s| Cell::new(s.as_ref())).collect()));
}

pub fn fmt_f32(value: f32) -> String {
    format!("{value:.3}")
}

pub fn fmt_vec2(value: Vec2) -> String {
    format!("({:.2}, {:.2})", value.x, value.y)
}
