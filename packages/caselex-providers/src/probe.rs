use std::time::{Duration, Instant};

use reqwest::{Client, Response, StatusCode, redirect::Policy};

use crate::{Error, Result};

const MAX_REDIRECTS: usize = 5;
const MAX_SNIFF_BYTES: usize = 64 * 1_024;

/// Outcome of probing one direct link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeVerdict {
	/// The link answered with a success or redirect status and a usable page.
	Ok,
	/// The server stated the document does not exist.
	Broken,
	/// Network failure, timeout, unexpected status, or an error page served with success.
	Inconclusive,
}
impl ProbeVerdict {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Ok => "ok",
			Self::Broken => "broken",
			Self::Inconclusive => "inconclusive",
		}
	}
}

/// HTTP link checker shared by every probe of the process.
#[derive(Clone, Debug)]
pub struct LinkChecker {
	client: Client,
	error_page_markers: Vec<String>,
}
impl LinkChecker {
	pub fn new(cfg: &caselex_config::Links) -> Result<Self> {
		if cfg.user_agent.trim().is_empty() {
			return Err(Error::InvalidConfig {
				message: "Link checker requires a user agent.".to_string(),
			});
		}

		let client = Client::builder()
			.user_agent(cfg.user_agent.as_str())
			.redirect(Policy::limited(MAX_REDIRECTS))
			.build()?;
		let error_page_markers = cfg
			.error_page_markers
			.iter()
			.map(|marker| marker.trim().to_lowercase())
			.filter(|marker| !marker.is_empty())
			.collect();

		Ok(Self { client, error_page_markers })
	}

	/// Probes `url` within `timeout`. Never fails: every error maps to a verdict.
	///
	/// A HEAD request decides most links. The page body is fetched only when the server rejects
	/// HEAD or when error-page markers are configured, and the GET shares the same time budget.
	pub async fn check(&self, url: &str, timeout: Duration) -> ProbeVerdict {
		let started = Instant::now();
		let head = match self.client.head(url).timeout(timeout).send().await {
			Ok(response) => response,
			Err(err) => {
				tracing::warn!(url, error = %err, "Link probe failed.");

				return ProbeVerdict::Inconclusive;
			},
		};
		let head_status = head.status();

		match classify_status(head_status) {
			ProbeVerdict::Broken => return ProbeVerdict::Broken,
			ProbeVerdict::Inconclusive if !head_unsupported(head_status) => {
				tracing::warn!(url, status = head_status.as_u16(), "Link probe got unexpected status.");

				return ProbeVerdict::Inconclusive;
			},
			ProbeVerdict::Ok if self.error_page_markers.is_empty() => return ProbeVerdict::Ok,
			_ => {},
		}

		let remaining = timeout.saturating_sub(started.elapsed());

		if remaining.is_zero() {
			return ProbeVerdict::Inconclusive;
		}

		let response = match self.client.get(url).timeout(remaining).send().await {
			Ok(response) => response,
			Err(err) => {
				tracing::warn!(url, error = %err, "Link probe body request failed.");

				return ProbeVerdict::Inconclusive;
			},
		};

		match classify_status(response.status()) {
			ProbeVerdict::Ok => {},
			verdict => return verdict,
		}

		match read_prefix(response).await {
			Some(body) if body_has_error_marker(&body, &self.error_page_markers) => {
				tracing::warn!(url, "Link probe detected an error page.");

				ProbeVerdict::Inconclusive
			},
			Some(_) => ProbeVerdict::Ok,
			None => ProbeVerdict::Inconclusive,
		}
	}
}

pub fn classify_status(status: StatusCode) -> ProbeVerdict {
	if status.is_success() || status.is_redirection() {
		ProbeVerdict::Ok
	} else if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) {
		ProbeVerdict::Broken
	} else {
		ProbeVerdict::Inconclusive
	}
}

pub fn body_has_error_marker(body: &str, markers: &[String]) -> bool {
	let body = body.to_lowercase();

	markers.iter().any(|marker| body.contains(marker.as_str()))
}

fn head_unsupported(status: StatusCode) -> bool {
	matches!(status, StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED)
}

async fn read_prefix(mut response: Response) -> Option<String> {
	let mut buf = Vec::new();

	while buf.len() < MAX_SNIFF_BYTES {
		match response.chunk().await {
			Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
			Ok(None) => break,
			Err(_) => return None,
		}
	}

	buf.truncate(MAX_SNIFF_BYTES);

	Some(String::from_utf8_lossy(&buf).into_owned())
}
