use std::time::Duration;

use reqwest::{Client, Method};
use tracing::debug;
use url::Url;

use crate::condition::{FileCondition, FilePredicate};
use crate::config::{DEFAULT_BASE_URL, Endpoints, SiaConfig};
use crate::error::SiaError;
use crate::model::{DownloadListing, FileListing, FileRecord, decode};
use crate::poller::{FileSource, WaitOptions, wait_until};

#[derive(Clone)]
pub struct SiaClient {
    http: Client,
    base_url: Url,
    endpoints: Endpoints,
    poll_interval: Duration,
}

impl SiaClient {
    pub fn new() -> Result<Self, SiaError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, SiaError> {
        Self::from_config(SiaConfig::new(base_url)?)
    }

    pub fn from_config(config: SiaConfig) -> Result<Self, SiaError> {
        let mut builder = Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url,
            endpoints: config.endpoints,
            poll_interval: config.poll_interval,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_files(&self) -> Result<FileListing, SiaError> {
        let url = self.endpoint(&self.endpoints.files)?;
        let body = self.request(Method::GET, url, &[]).await?;
        decode(&body)
    }

    pub async fn list_downloads(&self) -> Result<DownloadListing, SiaError> {
        let url = self.endpoint(&self.endpoints.downloads)?;
        let body = self.request(Method::GET, url, &[]).await?;
        decode(&body)
    }

    pub async fn delete(&self, siapath: &str) -> Result<(), SiaError> {
        let url = self.resource(&self.endpoints.delete, siapath)?;
        self.request(Method::POST, url, &[]).await?;
        Ok(())
    }

    /// Asks the node to fetch `siapath` into `destination` on the node's own
    /// filesystem. Returns once the node has accepted the request.
    pub async fn download(&self, siapath: &str, destination: &str) -> Result<(), SiaError> {
        let url = self.resource(&self.endpoints.download, siapath)?;
        self.request(Method::GET, url, &[("destination", destination)])
            .await?;
        Ok(())
    }

    /// Starts an upload of the node-local file `source` to `siapath` without
    /// waiting for it to become available.
    pub async fn upload(&self, source: &str, siapath: &str) -> Result<(), SiaError> {
        let url = self.resource(&self.endpoints.upload, siapath)?;
        self.request(Method::POST, url, &[("source", source)]).await?;
        Ok(())
    }

    pub async fn upload_and_wait_available(
        &self,
        source: &str,
        siapath: &str,
        options: &WaitOptions,
    ) -> Result<FileRecord, SiaError> {
        self.upload(source, siapath).await?;
        self.wait_for(&FileCondition::available(siapath), options).await
    }

    pub async fn wait_for_redundancy(
        &self,
        siapath: &str,
        threshold: f64,
        options: &WaitOptions,
    ) -> Result<FileRecord, SiaError> {
        let condition = FileCondition::redundancy_at_least(siapath, threshold);
        self.wait_for(&condition, options).await
    }

    /// Polls the files listing until a record satisfies `predicate` and
    /// returns that record.
    pub async fn wait_for<P>(
        &self,
        predicate: &P,
        options: &WaitOptions,
    ) -> Result<FileRecord, SiaError>
    where
        P: FilePredicate + Sync + ?Sized,
    {
        wait_until(self, predicate, options, self.poll_interval).await
    }

    /// Appends `path` below the base address, keeping any prefix it carries.
    fn endpoint(&self, path: &str) -> Result<Url, SiaError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        self.append_segments(&mut url, path)?;
        Ok(url)
    }

    fn resource(&self, endpoint: &str, siapath: &str) -> Result<Url, SiaError> {
        if siapath.split('/').all(str::is_empty) {
            return Err(SiaError::EmptySiapath);
        }
        let mut url = self.endpoint(endpoint)?;
        self.append_segments(&mut url, siapath)?;
        Ok(url)
    }

    fn append_segments(&self, url: &mut Url, path: &str) -> Result<(), SiaError> {
        url.path_segments_mut()
            .map_err(|_| SiaError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(())
    }

    async fn request(
        &self,
        method: Method,
        mut url: Url,
        query: &[(&str, &str)],
    ) -> Result<String, SiaError> {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!(%method, path = url.path(), "sia request");
        let response = self.http.request(method, url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(SiaError::Api { status, body })
        }
    }
}

impl FileSource for SiaClient {
    async fn fetch_files(&self) -> Result<FileListing, SiaError> {
        self.list_files().await
    }
}
