//! SELECT column lists derived from descriptor tables.

use super::{Entity, Field};

/// Qualified column names for `E`, depth-first in declaration order.
///
/// Embedded structs share `alias`; a nested entity uses its own alias when the
/// descriptor names one (the joined table) and `alias` otherwise.
pub fn project<E: Entity>(alias: &str) -> Vec<String> {
    let mut out = Vec::new();
    walk(E::FIELDS, alias, &mut out);
    out
}

/// `project` joined with `", "`, ready to splice after `SELECT`.
pub fn select_columns<E: Entity>(alias: &str) -> String {
    project::<E>(alias).join(", ")
}

fn walk(fields: &[Field], alias: &str, out: &mut Vec<String>) {
    for field in fields {
        match *field {
            Field::Column(name) => out.push(format!("{alias}.{name}")),
            Field::Ignore(_) => {}
            Field::Embed(inner) => walk(inner, alias, out),
            Field::Nested { fields: inner, alias: own } => walk(inner, own.unwrap_or(alias), out),
        }
    }
}
