//! Scan targets: ordered, borrowed slots a result row is decoded into.

use super::{column_names, width, Entity};
use crate::error::{AppError, MapError};
use sqlx::postgres::PgRow;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};

/// How a column value is laid out on the SQL side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnShape {
    Scalar,
    /// Opaque binary (`bytea`), e.g. a password hash.
    Bytes,
    /// SQL array decoded into a sequence of scalars.
    Array,
}

/// Field types a `column(..)` descriptor may point at.
///
/// Sequences of anything other than bytes or scalars have no impl and are
/// rejected when the entity is compiled.
pub trait ColumnValue: for<'r> Decode<'r, Postgres> + Type<Postgres> + Send {
    const SHAPE: ColumnShape = ColumnShape::Scalar;
}

macro_rules! column_values {
    ($shape:ident: $($t:ty),* $(,)?) => {
        $(
            impl ColumnValue for $t {
                const SHAPE: ColumnShape = ColumnShape::$shape;
            }
            impl ColumnValue for Option<$t> {
                const SHAPE: ColumnShape = ColumnShape::$shape;
            }
        )*
    };
}

column_values!(
    Scalar: bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    uuid::Uuid,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    serde_json::Value,
);
column_values!(Bytes: Vec<u8>);
column_values!(
    Array: Vec<String>,
    Vec<i16>,
    Vec<i32>,
    Vec<i64>,
    Vec<uuid::Uuid>,
);

/// One addressable location (or window of locations) in a row.
pub trait ScanTarget {
    /// Columns consumed.
    fn width(&self) -> usize;

    /// Unaliased column names consumed, in order.
    fn columns(&self, out: &mut Vec<&'static str>);

    /// Decode columns `start..start + width()` into the target.
    fn scan(&mut self, row: &PgRow, start: usize) -> Result<(), AppError>;
}

struct ColumnSlot<'a, T> {
    name: &'static str,
    slot: &'a mut T,
}

impl<T: ColumnValue> ScanTarget for ColumnSlot<'_, T> {
    fn width(&self) -> usize {
        1
    }

    fn columns(&self, out: &mut Vec<&'static str>) {
        out.push(self.name);
    }

    fn scan(&mut self, row: &PgRow, start: usize) -> Result<(), AppError> {
        check_shape(self.name, T::SHAPE, row, start)?;
        *self.slot = row.try_get::<T, _>(start)?;
        Ok(())
    }
}

fn check_shape(name: &'static str, shape: ColumnShape, row: &PgRow, index: usize) -> Result<(), MapError> {
    let sql_type = row.column(index).type_info();
    let is_array = sql_type.name().ends_with("[]");
    let fits = match shape {
        ColumnShape::Array => is_array,
        ColumnShape::Scalar | ColumnShape::Bytes => !is_array,
    };
    if fits {
        Ok(())
    } else {
        Err(MapError::UnsupportedScanType {
            column: name,
            sql_type: sql_type.name().to_string(),
        })
    }
}

/// Optional nested entity read from its own column window. Left `None` when
/// every column in the window is NULL (e.g. the unmatched side of a LEFT JOIN).
struct NestedSlot<'a, E> {
    slot: &'a mut Option<E>,
}

impl<E: Entity> ScanTarget for NestedSlot<'_, E> {
    fn width(&self) -> usize {
        width(E::FIELDS)
    }

    fn columns(&self, out: &mut Vec<&'static str>) {
        out.extend(column_names(E::FIELDS));
    }

    fn scan(&mut self, row: &PgRow, start: usize) -> Result<(), AppError> {
        let end = start + self.width();
        let mut absent = true;
        for index in start..end {
            if !row.try_get_raw(index)?.is_null() {
                absent = false;
                break;
            }
        }
        if absent {
            *self.slot = None;
            return Ok(());
        }

        let mut entity = E::default();
        {
            let mut targets = Targets::new(E::NAME);
            entity.bind(&mut targets);
            targets.scan_from(row, start)?;
        }
        *self.slot = Some(entity);
        Ok(())
    }
}

/// Ordered scan targets borrowed from one entity instance.
pub struct Targets<'a> {
    entity: &'static str,
    items: Vec<Box<dyn ScanTarget + 'a>>,
}

impl<'a> Targets<'a> {
    pub fn new(entity: &'static str) -> Self {
        Targets {
            entity,
            items: Vec::new(),
        }
    }

    /// Targets for every mapped field of `entity`.
    pub fn for_entity<E: Entity>(entity: &'a mut E) -> Self {
        let mut targets = Targets::new(E::NAME);
        entity.bind(&mut targets);
        targets
    }

    pub fn column<T: ColumnValue + 'a>(&mut self, name: &'static str, slot: &'a mut T) {
        self.items.push(Box::new(ColumnSlot { name, slot }));
    }

    pub fn embed<E: Entity>(&mut self, inner: &'a mut E) {
        inner.bind(self);
    }

    pub fn nested<E: Entity>(&mut self, slot: &'a mut Option<E>) {
        self.items.push(Box::new(NestedSlot { slot }));
    }

    /// Number of targets (a nested entity counts once).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of row columns the targets consume.
    pub fn width(&self) -> usize {
        self.items.iter().map(|t| t.width()).sum()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        let mut out = Vec::with_capacity(self.width());
        for target in &self.items {
            target.columns(&mut out);
        }
        out
    }

    /// Scan a row whose columns map one-to-one onto the targets.
    pub fn scan(&mut self, row: &PgRow) -> Result<(), AppError> {
        self.scan_at(row, 0)
    }

    /// Scan a row whose first `offset` columns are not part of the entity
    /// (e.g. a window total). The remaining width must match exactly.
    pub fn scan_at(&mut self, row: &PgRow, offset: usize) -> Result<(), AppError> {
        let expected = self.width();
        let columns = row.len().saturating_sub(offset);
        if columns != expected {
            return Err(MapError::Bind {
                entity: self.entity,
                columns,
                expected,
            }
            .into());
        }
        self.scan_from(row, offset)
    }

    fn scan_from(&mut self, row: &PgRow, start: usize) -> Result<(), AppError> {
        let mut index = start;
        for target in &mut self.items {
            target.scan(row, index)?;
            index += target.width();
        }
        Ok(())
    }
}
