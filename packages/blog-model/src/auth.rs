use blog_store::DbError;

use crate::entity::Entity;
use crate::user::{User, UserFilter};
use crate::Blog;

impl User {
    /// Looks up a user by exact email and checks the password exactly.
    ///
    /// Unknown email and wrong password both give `Ok(None)`.
    pub fn connect(blog: &Blog, email: &str, password: &str) -> Result<Option<User>, DbError> {
        let user = User::find(blog, UserFilter::ByEmail(email.to_string()))
            .first()?
            .filter(|user| user.password == password);
        if user.is_none() {
            tracing::debug!("Rejected connection attempt");
        }
        Ok(user)
    }
}
