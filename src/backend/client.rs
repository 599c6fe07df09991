use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{Envelope, FaAnalysis, GrammarAnalysis, GrammarKind, InputTrace, Ll1Analysis, LrAnalysis};
use crate::config::BackendConfig;
use crate::error::{GlabError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductionsBody<'a> {
    inp_productions: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InputBody<'a> {
    inp_productions: &'a [String],
    inp_str: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegexBody<'a> {
    inp_regex: &'a str,
}

/// Blocking client for the analysis service.
pub struct BackendClient {
    base_url: String,
    client: reqwest::blocking::Client,
    success_codes: Vec<i64>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("success_codes", &self.success_codes)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GlabError::Config(format!("backend http client: {err}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            success_codes: config.success_codes.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_success(&self, code: i64) -> bool {
        self.success_codes.contains(&code)
    }

    /// Check connectivity; returns whatever `data` the service sends.
    pub fn ping(&self) -> Result<Option<Value>> {
        let url = format!("{}/api/test", self.base_url);
        debug!(url = %url, "pinging backend");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| GlabError::Http(format!("GET /api/test failed: {err}")))?;
        let envelope: Envelope<Value> = Self::read_envelope("/api/test", response)?;
        if !self.is_success(envelope.code) {
            return Err(GlabError::Backend {
                code: envelope.code,
                message: envelope.error_message(),
            });
        }
        info!(code = envelope.code, "backend reachable");
        Ok(envelope.data)
    }

    pub fn ll1_analyse(&self, productions: &[String]) -> Result<Ll1Analysis> {
        self.post_data(
            GrammarKind::Ll1.analyse_path(),
            &ProductionsBody {
                inp_productions: productions,
            },
        )
    }

    pub fn lr0_analyse(&self, productions: &[String]) -> Result<LrAnalysis> {
        self.post_data(
            GrammarKind::Lr0.analyse_path(),
            &ProductionsBody {
                inp_productions: productions,
            },
        )
    }

    pub fn slr1_analyse(&self, productions: &[String]) -> Result<LrAnalysis> {
        self.post_data(
            GrammarKind::Slr1.analyse_path(),
            &ProductionsBody {
                inp_productions: productions,
            },
        )
    }

    /// Analyse `productions` with the given kind.
    pub fn analyse(&self, kind: GrammarKind, productions: &[String]) -> Result<GrammarAnalysis> {
        Ok(match kind {
            GrammarKind::Ll1 => GrammarAnalysis::Ll1(self.ll1_analyse(productions)?),
            GrammarKind::Lr0 => GrammarAnalysis::Lr0(self.lr0_analyse(productions)?),
            GrammarKind::Slr1 => GrammarAnalysis::Slr1(self.slr1_analyse(productions)?),
        })
    }

    /// Trace the parse of `input` under `productions`.
    pub fn analyse_input(
        &self,
        kind: GrammarKind,
        productions: &[String],
        input: &str,
    ) -> Result<InputTrace> {
        self.post_data(
            kind.input_path(),
            &InputBody {
                inp_productions: productions,
                inp_str: input,
            },
        )
    }

    pub fn regex_to_dfa(&self, regex: &str) -> Result<FaAnalysis> {
        self.post_data("/api/Regex_to_DFAM", &RegexBody { inp_regex: regex })
    }

    fn post_data<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "posting to backend");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|err| GlabError::Http(format!("POST {path} failed: {err}")))?;

        let envelope: Envelope<T> = Self::read_envelope(path, response)?;
        if !self.is_success(envelope.code) {
            warn!(path, code = envelope.code, "backend rejected request");
            return Err(GlabError::Backend {
                code: envelope.code,
                message: envelope.error_message(),
            });
        }

        envelope.data.ok_or_else(|| GlabError::Backend {
            code: envelope.code,
            message: format!("{path} returned no data"),
        })
    }

    fn read_envelope<T: DeserializeOwned>(
        path: &str,
        response: reqwest::blocking::Response,
    ) -> Result<Envelope<T>> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| GlabError::Http(format!("read {path} response: {err}")))?;

        if !status.is_success() {
            // Error bodies usually still carry the envelope.
            let detail = serde_json::from_str::<Envelope<Value>>(&body)
                .map_or_else(|_| body.trim().to_string(), |envelope| envelope.error_message());
            return Err(GlabError::Http(format!("{path} returned {status}: {detail}")));
        }

        serde_json::from_str(&body)
            .map_err(|err| GlabError::Http(format!("invalid {path} response: {err}")))
    }
}
