use mysql_async::{Params, Value as MySqlValue};

pub struct MySqlParamStore {
    pub params: Vec<MySqlValue>,
}

impl MySqlParamStore {
    pub fn from_ints(values: &[i64]) -> Self {
        MySqlParamStore {
            params: values.iter().map(|v| MySqlValue::Int(*v)).collect(),
        }
    }

    pub fn update(token: &str, id: i64) -> Self {
        MySqlParamStore {
            params: vec![
                MySqlValue::Bytes(token.as_bytes().to_vec()),
                MySqlValue::Int(id),
            ],
        }
    }

    pub fn params(&self) -> Params {
        if self.params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(self.params.clone())
        }
    }
}
