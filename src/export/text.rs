use crate::qto::{AggregationResult, QuantityKinds};
use std::io::{self, Write};

/// Plain-text takeoff: one block per quantity set, values to two decimals.
pub fn write_table<W: Write>(
    result: &AggregationResult,
    kinds: &QuantityKinds,
    mut out: W,
) -> io::Result<()> {
    if result.is_empty() {
        return writeln!(out, "No quantities for the current selection.");
    }

    let width = result
        .rows()
        .map(|(_, name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    for (set_name, quantities) in result.sets() {
        writeln!(out, "{set_name}")?;
        for (name, value) in quantities {
            let unit = kinds.get(set_name, name).map_or("", |k| k.unit());
            writeln!(out, "  {name:<width$}  {value:>12.2} {unit}")?;
        }
    }

    Ok(())
}
