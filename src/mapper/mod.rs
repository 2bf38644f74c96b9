//! Declarative row mapping: per-entity field descriptor tables drive both the
//! SELECT column list (projection) and the ordered scan targets (binding).
//!
//! An entity is a plain struct plus one `impl_entity!` invocation listing its
//! persisted layout in declaration order:
//!
//! ```ignore
//! impl_entity!(Tag {
//!     id: column("id"),
//!     name: column("name"),
//!     user_id: column("user_id"),
//!     base: embed(BaseModel),
//!     last_log: nested(Daylog, "dl"),
//! });
//! ```
//!
//! Fields not listed are untagged scalars and are neither projected nor bound.

mod bind;
mod project;

pub use bind::{ColumnShape, ColumnValue, ScanTarget, Targets};
pub use project::{project, select_columns};

/// One entry of an entity's field descriptor table.
#[derive(Debug, Clone, Copy)]
pub enum Field {
    /// Persisted scalar, byte or array column.
    Column(&'static str),
    /// In-memory only; never projected or bound.
    Ignore(&'static str),
    /// Embedded struct flattened under the same table alias.
    Embed(&'static [Field]),
    /// Optional nested entity. `alias` overrides the table alias for its columns.
    Nested {
        fields: &'static [Field],
        alias: Option<&'static str>,
    },
}

/// A struct that maps onto a result row.
pub trait Entity: Default + Send + Unpin + 'static {
    /// Name used in NotFound and bind errors.
    const NAME: &'static str;

    /// Layout in declaration order.
    const FIELDS: &'static [Field];

    /// Push one scan target per column, in `FIELDS` order.
    fn bind<'a>(&'a mut self, targets: &mut Targets<'a>);
}

/// Number of row columns the descriptor table consumes.
pub const fn width(fields: &[Field]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += match fields[i] {
            Field::Column(_) => 1,
            Field::Ignore(_) => 0,
            Field::Embed(inner) => width(inner),
            Field::Nested { fields: inner, .. } => width(inner),
        };
        i += 1;
    }
    total
}

/// Unaliased column names in binding order.
pub fn column_names(fields: &[Field]) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(width(fields));
    collect_names(fields, &mut out);
    out
}

fn collect_names(fields: &[Field], out: &mut Vec<&'static str>) {
    for field in fields {
        match *field {
            Field::Column(name) => out.push(name),
            Field::Ignore(_) => {}
            Field::Embed(inner) => collect_names(inner, out),
            Field::Nested { fields: inner, .. } => collect_names(inner, out),
        }
    }
}

/// Registers a struct as an [`Entity`](crate::mapper::Entity).
///
/// Field kinds: `column("name")`, `ignore`, `embed(Type)`, `nested(Type)`,
/// `nested(Type, "alias")`. Nested fields must be `Option<Type>`.
#[macro_export]
macro_rules! impl_entity {
    ($ty:ident { $($field:ident : $kind:ident $(( $($arg:tt)* ))?),* $(,)? }) => {
        impl $crate::mapper::Entity for $ty {
            const NAME: &'static str = stringify!($ty);

            const FIELDS: &'static [$crate::mapper::Field] = &[
                $( $crate::impl_entity!(@field $field $kind $(( $($arg)* ))?) ),*
            ];

            fn bind<'a>(&'a mut self, targets: &mut $crate::mapper::Targets<'a>) {
                let $ty { $($field,)* .. } = self;
                $( $crate::impl_entity!(@bind targets $field $kind $(( $($arg)* ))?); )*
            }
        }
    };

    (@field $f:ident column ($col:literal)) => {
        $crate::mapper::Field::Column($col)
    };
    (@field $f:ident ignore) => {
        $crate::mapper::Field::Ignore(stringify!($f))
    };
    (@field $f:ident embed ($t:ty)) => {
        $crate::mapper::Field::Embed(<$t as $crate::mapper::Entity>::FIELDS)
    };
    (@field $f:ident nested ($t:ty, $alias:literal)) => {
        $crate::mapper::Field::Nested {
            fields: <$t as $crate::mapper::Entity>::FIELDS,
            alias: Some($alias),
        }
    };
    (@field $f:ident nested ($t:ty)) => {
        $crate::mapper::Field::Nested {
            fields: <$t as $crate::mapper::Entity>::FIELDS,
            alias: None,
        }
    };

    (@bind $targets:ident $f:ident column ($col:literal)) => {
        $targets.column($col, $f)
    };
    (@bind $targets:ident $f:ident ignore) => {{
        let _ = $f;
    }};
    (@bind $targets:ident $f:ident embed ($($arg:tt)*)) => {
        $targets.embed($f)
    };
    (@bind $targets:ident $f:ident nested ($($arg:tt)*)) => {
        $targets.nested($f)
    };
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small entities covering every field kind.

    use chrono::{DateTime, Utc};

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Audit {
        pub version: i32,
        pub deleted: bool,
        pub created_at: Option<DateTime<Utc>>,
    }

    crate::impl_entity!(Audit {
        version: column("version"),
        deleted: column("deleted"),
        created_at: column("created_at"),
    });

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Owner {
        pub id: i64,
        pub name: String,
        pub avatar: Vec<u8>,
    }

    crate::impl_entity!(Owner {
        id: column("id"),
        name: column("name"),
        avatar: column("avatar"),
    });

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Note {
        pub id: i64,
        pub labels: Vec<String>,
        pub parent: Option<Box<Note>>,
        pub scratch: u32,
        pub audit: Audit,
        pub owner: Option<Owner>,
        pub body: String,
    }

    crate::impl_entity!(Note {
        id: column("id"),
        labels: column("labels"),
        parent: ignore,
        audit: embed(Audit),
        owner: nested(Owner, "o"),
        body: column("body"),
    });

    #[derive(Debug, Default)]
    pub struct Inline {
        pub owner: Option<Owner>,
        pub code: i32,
    }

    crate::impl_entity!(Inline {
        owner: nested(Owner),
        code: column("code"),
    });
}
