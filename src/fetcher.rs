//! Responsible for downloading route pages. Knows nothing about their contents.
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{Instrument, info, info_span};

use crate::extractor::{self, ExtractError, SourceFormat, StopPageError};
use crate::model::{RouteExtractionResult, StopArrivals};
use crate::utils::{fill_route_template, fill_stop_template};

/// Only pda5284 has per stop pages
pub const DEFAULT_STOP_URL_TEMPLATE: &str =
    "https://pda5284.gov.taipei/MQS/stop.jsp?from=r&sid={stop_id}";

/// The two sites route data is scraped from
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// pda5284.gov.taipei, server rendered tables
    Pda,
    /// ebus.gov.taipei, JSON stop lists
    Ebus,
}

impl DataSource {
    pub fn format(self) -> SourceFormat {
        match self {
            DataSource::Pda => SourceFormat::HtmlTableMarked,
            DataSource::Ebus => SourceFormat::JsonStructured,
        }
    }

    pub fn default_route_url_template(self) -> &'static str {
        match self {
            DataSource::Pda => "https://pda5284.gov.taipei/MQS/route.jsp?rid={route_id}",
            DataSource::Ebus => "https://ebus.gov.taipei/Route/StopsOfRoute?routeid={route_id}",
        }
    }

    pub fn default_route_list_url(self) -> &'static str {
        match self {
            DataSource::Pda => "https://pda5284.gov.taipei/MQS/routelist.jsp",
            DataSource::Ebus => "https://ebus.gov.taipei/ebus",
        }
    }
}

/// A downloaded route page, ready to be extracted
#[derive(Clone, Debug)]
pub struct RoutePage {
    pub route_id: String,
    pub format: SourceFormat,
    pub content: String,
}

impl RoutePage {
    pub fn extract(&self) -> Result<RouteExtractionResult, ExtractError> {
        extractor::extract(&self.route_id, &self.content, self.format)
    }
}

/// A downloaded stop page
#[derive(Clone, Debug)]
pub struct StopPage {
    pub stop_id: String,
    pub content: String,
}

impl StopPage {
    pub fn extract(&self) -> Result<StopArrivals, StopPageError> {
        extractor::extract_stop_arrivals(&self.stop_id, &self.content)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("error building the http client")]
    ClientBuildError(#[source] reqwest::Error),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("error fetching {url}")]
    HttpRequestError {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Clone, Debug)]
pub struct PageFetcher {
    client: Client,
    source: DataSource,
    route_url_template: String,
}

impl PageFetcher {
    /// Uses the source's default route url when `route_url_template` is `None`.
    pub fn new(
        source: DataSource,
        route_url_template: Option<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuildError)?;

        Ok(PageFetcher {
            client,
            source,
            route_url_template: route_url_template
                .unwrap_or_else(|| source.default_route_url_template().to_string()),
        })
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn route_url(&self, route_id: &str) -> String {
        fill_route_template(&self.route_url_template, route_id)
    }

    #[tracing::instrument(err, skip(self), fields(source = ?self.source))]
    pub async fn fetch_route_page(&self, route_id: &str) -> Result<RoutePage, FetchError> {
        let content = self.fetch_page(&self.route_url(route_id)).await?;

        Ok(RoutePage {
            route_id: route_id.to_string(),
            format: self.source.format(),
            content,
        })
    }

    /// `stop_url_template` has a `{stop_id}` placeholder, see [`DEFAULT_STOP_URL_TEMPLATE`].
    #[tracing::instrument(err, skip(self, stop_url_template))]
    pub async fn fetch_stop_page(
        &self,
        stop_url_template: &str,
        stop_id: &str,
    ) -> Result<StopPage, FetchError> {
        let content = self
            .fetch_page(&fill_stop_template(stop_url_template, stop_id))
            .await?;

        Ok(StopPage {
            stop_id: stop_id.to_string(),
            content,
        })
    }

    /// GETs a page and returns its body. Non 2xx responses are errors.
    #[tracing::instrument(err, skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let http_error = |source| FetchError::HttpRequestError {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(parsed)
            .send()
            .instrument(info_span!("Fetching page"))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?;

        let content = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await
            .map_err(http_error)?;

        info!("got {} bytes", content.len());

        Ok(content)
    }
}
