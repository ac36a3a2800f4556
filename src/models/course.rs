use crate::error::Result;
use crate::models::{Professor, Student};
use crate::record::{Entity, Filter, Record, Values};
use crate::schema::Schema;
use crate::sqlite::Database;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub code: i64,
    pub name: String,
}

impl Entity for Course {
    const SCHEMA: Schema = Schema::new("courses", &["code", "name"], &["code"]);

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            code: values.take()?,
            name: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![self.code.into(), self.name.as_str().into()]
    }
}

impl Course {
    pub fn professors(&self, db: &Database) -> Result<Vec<Record<Professor>>> {
        Professor::filter(db, Filter::new().with_condition("course_code", self.code))
    }

    pub fn students(&self, db: &Database) -> Result<Vec<Record<Student>>> {
        Student::filter(db, Filter::new().with_condition("course_code", self.code))
    }
}
