//! Parameter values bound to PostgreSQL statements.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};
use std::collections::HashMap;
use uuid::Uuid;

/// A value that can be bound to a PostgreSQL query. Each variant reports its
/// own wire type, so a NULL still carries the type the column expects.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null(PgTypeInfo),
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F64(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Bytes(Vec<u8>),
    TextArray(Vec<String>),
    Json(serde_json::Value),
}

impl SqlValue {
    /// NULL typed as `T` on the wire.
    pub fn null_of<T: Type<Postgres>>() -> Self {
        SqlValue::Null(pg_type::<T>())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }
}

impl<'q> Encode<'q, Postgres> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self {
            SqlValue::Null(_) => Ok(IsNull::Yes),
            SqlValue::Bool(v) => <bool as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::I16(v) => <i16 as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::I32(v) => <i32 as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::I64(v) => <i64 as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::F64(v) => <f64 as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::Text(v) => <String as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::Uuid(v) => <Uuid as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::Timestamp(v) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::Date(v) => <NaiveDate as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::Bytes(v) => <Vec<u8> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::TextArray(v) => <Vec<String> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlValue::Json(v) => <serde_json::Value as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            SqlValue::Null(ty) => ty.clone(),
            SqlValue::Bool(_) => pg_type::<bool>(),
            SqlValue::I16(_) => pg_type::<i16>(),
            SqlValue::I32(_) => pg_type::<i32>(),
            SqlValue::I64(_) => pg_type::<i64>(),
            SqlValue::F64(_) => pg_type::<f64>(),
            SqlValue::Text(_) => pg_type::<String>(),
            SqlValue::Uuid(_) => pg_type::<Uuid>(),
            SqlValue::Timestamp(_) => pg_type::<DateTime<Utc>>(),
            SqlValue::Date(_) => pg_type::<NaiveDate>(),
            SqlValue::Bytes(_) => pg_type::<Vec<u8>>(),
            SqlValue::TextArray(_) => pg_type::<Vec<String>>(),
            SqlValue::Json(_) => pg_type::<serde_json::Value>(),
        })
    }
}

fn pg_type<T: Type<Postgres>>() -> PgTypeInfo {
    T::type_info()
}

impl Type<Postgres> for SqlValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

macro_rules! sql_value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    SqlValue::$variant(v.into())
                }
            }

            impl From<Option<$t>> for SqlValue {
                fn from(v: Option<$t>) -> Self {
                    match v {
                        Some(v) => SqlValue::$variant(v.into()),
                        None => SqlValue::Null(<$t as Type<Postgres>>::type_info()),
                    }
                }
            }
        )*
    };
}

sql_value_from!(
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f64 => F64,
    String => Text,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
    NaiveDate => Date,
    Vec<u8> => Bytes,
    Vec<String> => TextArray,
    serde_json::Value => Json,
);

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Option<&str>> for SqlValue {
    fn from(v: Option<&str>) -> Self {
        v.map(str::to_string).into()
    }
}

/// Named statement parameters. Lookup only; order never matters.
#[derive(Clone, Debug, Default)]
pub struct Params(HashMap<String, SqlValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<SqlValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::TypeInfo;

    fn wire_type(v: &SqlValue) -> String {
        <SqlValue as Encode<Postgres>>::produces(v)
            .map(|t| t.name().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn typed_nulls_keep_their_postgres_type() {
        assert_eq!(wire_type(&SqlValue::from(None::<Uuid>)), "UUID");
        assert_eq!(wire_type(&SqlValue::from(None::<NaiveDate>)), "DATE");
        assert_eq!(wire_type(&SqlValue::from(None::<i32>)), "INT4");
        assert!(SqlValue::from(None::<String>).is_null());
    }

    #[test]
    fn values_report_their_own_type() {
        assert_eq!(wire_type(&SqlValue::from(7_i64)), "INT8");
        assert_eq!(wire_type(&SqlValue::from("x")), "TEXT");
        assert_eq!(wire_type(&SqlValue::from(vec!["a".to_string()])), "TEXT[]");
        assert_eq!(SqlValue::from(Some(3_i16)), SqlValue::I16(3));
    }

    #[test]
    fn params_builder_overwrites_by_name() {
        let params = Params::new().set("id", 1_i64).set("id", 2_i64).set("name", "a");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some(&SqlValue::I64(2)));
        assert!(params.get("missing").is_none());
    }
}
