//! ASCII board rendering.
use std::fmt::Write as _;

use tactics_core::{Faction, Occupancy, Position};
use tactics_runtime::Session;

/// Draws the board top row first (highest y), followed by a roster summary.
///
/// `A`/`E` mark allies and enemies, `@` the selected unit, `+` the cells the
/// selected unit may still move to, `#` walls and `?` interactables.
pub fn board(session: &Session) -> String {
    let battlefield = session.battlefield();
    let bounds = battlefield.bounds();
    let selected = session.selected().and_then(|id| battlefield.unit(id));
    let reachable: Vec<Position> = selected
        .filter(|unit| !unit.has_moved())
        .map(|unit| {
            unit.move_tiles()
                .iter()
                .filter_map(|node| battlefield.position_of(*node))
                .collect()
        })
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "round {} | {} | {}",
        session.round(),
        session.phase(),
        session
            .outcome()
            .map_or_else(|| "in progress".to_owned(), |outcome| outcome.to_string())
    );

    for y in (bounds.min().y..=bounds.max().y).rev() {
        let _ = write!(out, "{y:>3} ");
        for x in bounds.min().x..=bounds.max().x {
            let position = Position::new(x, y);
            let glyph = match battlefield.unit_at(position) {
                Some(unit) if Some(unit.id()) == selected.map(|unit| unit.id()) => '@',
                Some(unit) if unit.faction() == Faction::Ally => 'A',
                Some(_) => 'E',
                None => match battlefield.grid().occupancy(position) {
                    Some(Occupancy::Wall) => '#',
                    Some(Occupancy::Interactable) => '?',
                    _ if reachable.contains(&position) => '+',
                    _ => '.',
                },
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    let _ = write!(out, "    ");
    for x in bounds.min().x..=bounds.max().x {
        out.push(char::from_digit(x.rem_euclid(10) as u32, 10).unwrap_or(' '));
    }
    out.push('\n');

    for unit in battlefield.units().iter() {
        let _ = writeln!(
            out,
            "  {} {:<5} {} hp {:>3}/{:<3} {}{}",
            unit.id(),
            unit.faction(),
            unit.grid_position(),
            unit.health(),
            unit.stats().max_health,
            if unit.has_moved() { 'm' } else { '-' },
            if unit.has_attacked() { 'a' } else { '-' },
        );
    }
    out
}
