// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Value for the authorize URL's `prompt` hint; `select_company` makes freee ask which
	/// company the grant applies to.
	pub authorize_prompt: Option<String>,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { authorize_prompt: Some("select_company".into()) }
	}
}
