//! Runs the interactive loopback authorization against freee and prints the login user.
//!
//! ```sh
//! FREEE_CLIENT_ID=... FREEE_CLIENT_SECRET=... cargo run --example authorize -- 8080
//! ```
//!
//! The redirect URI `http://localhost:<port>/` must be registered for the application.

// std
use std::{env, time::Duration};
// crates.io
use color_eyre::{Result, eyre::WrapErr};
// self
use freee_oauth::{
	client::Client,
	flows::{AuthorizeOptions, OAuthClient},
	provider::ProviderDescriptor,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = env::var("FREEE_CLIENT_ID").wrap_err("FREEE_CLIENT_ID must be set")?;
	let client_secret =
		env::var("FREEE_CLIENT_SECRET").wrap_err("FREEE_CLIENT_SECRET must be set")?;
	let port = match env::args().nth(1) {
		Some(raw) => raw.parse().wrap_err("Port must be a number")?,
		None => 8080,
	};
	let oauth_client = OAuthClient::new(ProviderDescriptor::freee()?, client_id, client_secret)?;
	let options = AuthorizeOptions::default().with_timeout(Duration::from_secs(300));
	let credential = oauth_client.authorize(port, &options).await?;

	println!("Authorized; the token expires at {}.", credential.expires_at());

	let client = Client::new(oauth_client, credential);

	client.token_manager().set_refresh_observer(|credential| {
		println!("Refreshed; the new token expires at {}.", credential.expires_at());

		Ok(())
	});

	let user = client.login_user().await?;

	println!("Login user {}:", user.id);

	for company in user.companies {
		println!("- {} ({}) as {}", company.name, company.id, company.role);
	}

	Ok(())
}
