//! Blog users.

use blog_store::table::{Predicate, Row};
use blog_store::types::Value;
use blog_store::DbError;

use crate::entity::{Entity, OrderField, RowReader};
use crate::schema::USERS;

/// A registered user. `email` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<u64>,
    pub email: String,
    pub password: String,
    pub fullname: String,
    pub is_admin: bool,
}

impl User {
    /// Creates an unsaved, non-admin user.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        fullname: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            email: email.into(),
            password: password.into(),
            fullname: fullname.into(),
            is_admin: false,
        }
    }
}

/// Named lookups on users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    ByEmail(String),
    ByFullname(String),
}

impl From<UserFilter> for Predicate {
    fn from(filter: UserFilter) -> Self {
        match filter {
            UserFilter::ByEmail(email) => Predicate::eq("email", email),
            UserFilter::ByFullname(fullname) => Predicate::eq("fullname", fullname),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrder {
    Id,
    Email,
    Fullname,
}

impl OrderField for UserOrder {
    fn field(&self) -> &'static str {
        match self {
            UserOrder::Id => "id",
            UserOrder::Email => "email",
            UserOrder::Fullname => "fullname",
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = USERS;
    type Filter = UserFilter;
    type Order = UserOrder;

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.email.as_str()),
            Value::from(self.password.as_str()),
            Value::from(self.fullname.as_str()),
            Value::Bool(self.is_admin),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, DbError> {
        let reader = RowReader::new(USERS, row);
        Ok(Self {
            id: Some(row.id),
            email: reader.text(0)?,
            password: reader.text(1)?,
            fullname: reader.text(2)?,
            is_admin: reader.bool(3)?,
        })
    }
}
