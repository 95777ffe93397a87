use crate::sql::base::error::DbError;
use tokio_postgres::types::{ToSql, Type};

pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    /// Binds an id with the width the server inferred for its placeholder.
    /// Postgres refuses an `int8` value for an `int4` parameter.
    pub fn id_for(ty: Option<&Type>, id: i64) -> Result<Self, DbError> {
        let out_of_range = |_| DbError::Write(format!("id {id} does not fit the id column type"));
        match ty {
            Some(t) if *t == Type::INT2 => Ok(PgParam(Box::new(
                i16::try_from(id).map_err(out_of_range)?,
            ))),
            Some(t) if *t == Type::INT4 => Ok(PgParam(Box::new(
                i32::try_from(id).map_err(out_of_range)?,
            ))),
            _ => Ok(PgParam(Box::new(id))),
        }
    }

    pub fn int(value: i64) -> Self {
        PgParam(Box::new(value))
    }

    pub fn text(value: &str) -> Self {
        PgParam(Box::new(value.to_string()))
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    pub fn from_ints(values: &[i64]) -> Self {
        Self {
            params: values.iter().copied().map(PgParam::int).collect(),
        }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|param| param.as_ref()).collect()
    }
}
