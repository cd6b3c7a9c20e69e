// self
use crate::{_prelude::*, client::Client, http::HttpTransport};

const LOGIN_USER_PATH: &str = "hr/api/v1/users/me";

/// User behind the current authorization, with every company it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
	/// User identifier.
	pub id: i64,
	/// Companies the user can act on.
	#[serde(default)]
	pub companies: Vec<Company>,
}

/// Company membership of a [`LoginUser`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
	/// Company identifier, passed as `company_id` to most other endpoints.
	pub id: i64,
	/// Company name.
	pub name: String,
	/// Role of the user in the company (`company_admin`, `self_only`, `clerk`).
	pub role: String,
	/// External company code.
	#[serde(default)]
	pub external_cid: String,
	/// Employee record of the user; absent for employees outside payroll calculation.
	#[serde(default)]
	pub employee_id: Option<i64>,
	/// Display name of that employee record.
	#[serde(default)]
	pub display_name: Option<String>,
}

impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Fetches the user behind the current credential.
	pub async fn login_user(&self) -> Result<LoginUser> {
		self.get(LOGIN_USER_PATH, &[]).await
	}
}
