/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

use crate::v0::errors::DropboxError;
use crate::v0::options::{
    AccountOptions, ApiParams, CallOptions, DeltaOptions, GetFileOptions, MetadataOptions,
    NewAccount, PutOptions, SearchOptions, ThumbnailOptions, ToParams,
};
use crate::v0::request::RequestBody;
use crate::v0::signer::escape_path;
use crate::v0::stream::FileStream;
use crate::v0::{
    API_ORIGIN, API_VERSION, AccountInfo, ApiClient, ApiRequest, AuthMode, CONTENT_ORIGIN, Creds,
    DeltaPage, Metadata, Root, TokenPair, USER_AGENT,
};
use bytes::Bytes;
use reqwest::Method;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Where and how the client talks to the API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub root: Root,
    /// Host serving metadata, account and file operation calls
    pub api_origin: String,
    /// Host serving uploads, downloads and thumbnails
    pub content_origin: String,
    pub api_version: String,
    /// Sent as the `User-Agent` header of every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root: Root::Dropbox,
            api_origin: API_ORIGIN.into(),
            content_origin: CONTENT_ORIGIN.into(),
            api_version: API_VERSION.into(),
            user_agent: USER_AGENT.into(),
        }
    }
}

impl ClientConfig {
    /// Paths relative to the application folder
    pub fn sandbox() -> Self {
        Self {
            root: Root::Sandbox,
            ..Default::default()
        }
    }

    /// Sends both API and content calls to the same origin
    pub fn with_origin(origin: &str) -> Self {
        Self {
            api_origin: origin.into(),
            content_origin: origin.into(),
            ..Default::default()
        }
    }
}

/// Dropbox API client.
///
/// Cheap to clone, clones share the credential record.
///
/// ```rust,no_run
/// use dropbox_oauth1::v0::{Client, Creds, MetadataOptions};
///
/// # async fn run() -> Result<(), dropbox_oauth1::v0::DropboxError> {
/// let client = Client::new(Creds::from_tokens(
///     "consumer key",
///     Some("consumer secret"),
///     Some("access token"),
///     Some("access token secret"),
/// ));
/// let listing = client.metadata("/Photos", &MetadataOptions::default()).await?;
/// for entry in listing.contents {
///     println!("{entry}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    api_client: Arc<ApiClient>,
    config: Arc<ClientConfig>,
}

impl Client {
    pub fn new(creds: Creds) -> Self {
        Self::with_config(creds, ClientConfig::default())
    }

    pub fn with_config(creds: Creds, config: ClientConfig) -> Self {
        Self {
            api_client: Arc::new(ApiClient::with_user_agent(creds, &config.user_agent)),
            config: Arc::new(config),
        }
    }

    /// Lower level access for calls not wrapped here
    pub fn api_client(&self) -> &ApiClient {
        &self.api_client
    }

    pub fn creds(&self) -> Creds {
        self.api_client.creds()
    }

    pub fn root(&self) -> Root {
        self.config.root
    }

    fn endpoint(&self, origin: &str, endpoint: &str) -> Result<Url, DropboxError> {
        let url = format!(
            "{}/{}/{}",
            origin.trim_end_matches('/'),
            self.config.api_version,
            endpoint
        );
        Ok(Url::parse(&url)?)
    }

    fn api_url(&self, endpoint: &str) -> Result<Url, DropboxError> {
        self.endpoint(&self.config.api_origin, endpoint)
    }

    fn content_url(&self, endpoint: &str) -> Result<Url, DropboxError> {
        self.endpoint(&self.config.content_origin, endpoint)
    }

    // `{endpoint}/{root}/{escaped path}`
    fn rooted(&self, endpoint: &str, path: &str) -> String {
        let root: &'static str = self.config.root.into();
        format!("{}/{}/{}", endpoint, root, escape_path(path))
    }

    fn root_param(&self) -> (&'static str, String) {
        ("root", self.config.root.to_string())
    }

    /// Exchanges an email and password for an access token pair.
    ///
    /// The pair is stored in this client (and its clones) and also returned so
    /// the caller can persist it.
    pub async fn get_access_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, DropboxError> {
        if email.is_empty() || password.is_empty() {
            return Err(DropboxError::Config(
                "both an email and a password are required".into(),
            ));
        }
        let req = ApiRequest::get(self.api_url("token")?)
            .params(vec![("email", email.into()), ("password", password.into())])
            .auth(AuthMode::Consumer);
        let pair: TokenPair = self.api_client.json(req).await?;
        self.api_client.set_token_pair(&pair.token, &pair.secret);
        log::debug!("Access token pair stored");
        Ok(pair)
    }

    /// Retrieves information about the user's account
    pub async fn account_info(&self, opts: &AccountOptions) -> Result<AccountInfo, DropboxError> {
        let req = ApiRequest::get(self.api_url("account/info")?).params(opts.to_params());
        self.api_client.json(req).await
    }

    /// Creates a new account. Only needs the consumer credentials.
    pub async fn create_account(
        &self,
        account: &NewAccount,
    ) -> Result<serde_json::Value, DropboxError> {
        if account.email.is_empty() || account.password.is_empty() {
            return Err(DropboxError::Config(
                "both an email and a password are required".into(),
            ));
        }
        let req = ApiRequest::get(self.api_url("account")?)
            .params(account.to_params())
            .auth(AuthMode::Consumer);
        self.api_client.json(req).await
    }

    fn get_file_request(&self, path: &str, opts: &GetFileOptions) -> Result<ApiRequest, DropboxError> {
        Ok(ApiRequest::get(self.content_url(&self.rooted("files", path))?)
            .params(opts.to_params())
            .range(opts.range_header()))
    }

    /// Downloads the whole file into memory
    pub async fn get_file(&self, path: &str, opts: &GetFileOptions) -> Result<Bytes, DropboxError> {
        let req = self.get_file_request(path, opts)?;
        self.api_client.bytes(req).await
    }

    /// Starts a download and hands back the body as it arrives
    pub async fn get_file_stream(
        &self,
        path: &str,
        opts: &GetFileOptions,
    ) -> Result<FileStream, DropboxError> {
        let req = self.get_file_request(path, opts)?;
        Ok(FileStream::new(self.api_client.send(req).await?))
    }

    /// Uploads a local file. The file is read fully before anything is sent.
    pub async fn put_file(
        &self,
        local_path: impl AsRef<Path>,
        remote_path: &str,
        opts: &PutOptions,
    ) -> Result<Metadata, DropboxError> {
        let data = tokio::fs::read(local_path.as_ref()).await.map_err(|err| {
            log::error!("Unable to read {}: {}", local_path.as_ref().display(), err);
            err
        })?;
        self.put_buffer(data, remote_path, opts).await
    }

    /// Uploads data as a `multipart/form-data` POST into the parent folder
    /// of `remote_path`
    pub async fn put_buffer(
        &self,
        data: impl Into<Bytes>,
        remote_path: &str,
        opts: &PutOptions,
    ) -> Result<Metadata, DropboxError> {
        let (dir, filename) = match remote_path.rsplit_once('/') {
            Some((dir, filename)) => (dir, filename),
            None => ("", remote_path),
        };
        if filename.is_empty() {
            return Err(DropboxError::Config(format!(
                "{remote_path} does not name a file"
            )));
        }

        let mut params: ApiParams = opts.to_params();
        params.push(("file", filename.into()));
        let req = ApiRequest::post(self.content_url(&self.rooted("files", dir))?)
            .params(params)
            .body(RequestBody::multipart(filename, data.into()));
        self.api_client.json(req).await
    }

    /// Uploads data as the raw body of a PUT
    pub async fn files_put(
        &self,
        data: impl Into<Bytes>,
        remote_path: &str,
        content_type: &str,
        opts: &PutOptions,
    ) -> Result<Metadata, DropboxError> {
        let req = ApiRequest::new(
            Method::PUT,
            self.content_url(&self.rooted("files_put", remote_path))?,
        )
        .params(opts.to_params())
        .body(RequestBody::Raw {
            data: data.into(),
            content_type: content_type.into(),
        });
        self.api_client.json(req).await
    }

    /// Metadata for a file or folder, including the listing for folders
    pub async fn metadata(
        &self,
        path: &str,
        opts: &MetadataOptions,
    ) -> Result<Metadata, DropboxError> {
        let req =
            ApiRequest::get(self.api_url(&self.rooted("metadata", path))?).params(opts.to_params());
        self.api_client.json(req).await
    }

    /// Downloads a thumbnail for an image file
    pub async fn thumbnail(
        &self,
        path: &str,
        opts: &ThumbnailOptions,
    ) -> Result<Bytes, DropboxError> {
        let req = ApiRequest::get(self.content_url(&self.rooted("thumbnails", path))?)
            .params(opts.to_params());
        self.api_client.bytes(req).await
    }

    async fn fileop(
        &self,
        op: &str,
        mut params: ApiParams,
        opts: &CallOptions,
    ) -> Result<Metadata, DropboxError> {
        params.insert(0, self.root_param());
        params.extend(opts.to_params());
        let req = ApiRequest::get(self.api_url(&format!("fileops/{op}"))?).params(params);
        self.api_client.json(req).await
    }

    /// Copies a file or folder to a new location
    pub async fn copy_item(
        &self,
        from: &str,
        to: &str,
        opts: &CallOptions,
    ) -> Result<Metadata, DropboxError> {
        let params = vec![("from_path", from.into()), ("to_path", to.into())];
        self.fileop("copy", params, opts).await
    }

    /// Moves a file or folder to a new location
    pub async fn move_item(
        &self,
        from: &str,
        to: &str,
        opts: &CallOptions,
    ) -> Result<Metadata, DropboxError> {
        let params = vec![("from_path", from.into()), ("to_path", to.into())];
        self.fileop("move", params, opts).await
    }

    /// Deletes a file or folder
    pub async fn delete_item(&self, path: &str, opts: &CallOptions) -> Result<Metadata, DropboxError> {
        self.fileop("delete", vec![("path", path.into())], opts).await
    }

    pub async fn create_folder(
        &self,
        path: &str,
        opts: &CallOptions,
    ) -> Result<Metadata, DropboxError> {
        self.fileop("create_folder", vec![("path", path.into())], opts)
            .await
    }

    /// Searches below `path` for names containing the query
    pub async fn search(
        &self,
        path: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Metadata>, DropboxError> {
        if opts.query.trim().is_empty() {
            return Err(DropboxError::Config("search query is empty".into()));
        }
        let req =
            ApiRequest::get(self.api_url(&self.rooted("search", path))?).params(opts.to_params());
        self.api_client.json(req).await
    }

    /// Next page of changes since the cursor
    pub async fn delta(&self, opts: &DeltaOptions) -> Result<DeltaPage, DropboxError> {
        let req = ApiRequest::post(self.api_url("delta")?).params(opts.to_params());
        self.api_client.json(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(root: Root) -> Client {
        let config = ClientConfig {
            root,
            ..ClientConfig::default()
        };
        Client::with_config(Creds::default(), config)
    }

    #[test]
    fn rooted_paths_are_escaped() {
        let client = client(Root::Dropbox);
        assert_eq!(
            client.rooted("metadata", "/My Docs/a(1).txt"),
            "metadata/dropbox/My%20Docs/a%281%29.txt"
        );
        assert_eq!(client.rooted("metadata", "/"), "metadata/dropbox/");
    }

    #[test]
    fn endpoints_use_the_right_host() {
        let client = client(Root::Sandbox);
        assert_eq!(
            client.api_url(&client.rooted("search", "docs")).unwrap().as_str(),
            "https://api.dropbox.com/0/search/sandbox/docs"
        );
        assert_eq!(
            client.content_url(&client.rooted("files", "a.txt")).unwrap().as_str(),
            "https://api-content.dropbox.com/0/files/sandbox/a.txt"
        );
    }

    #[test]
    fn clones_share_credentials() {
        let client = client(Root::Dropbox);
        let other = client.clone();
        client.api_client().set_token_pair("tok", "sec");
        assert_eq!(other.creds().token_pair(), Some(("tok", "sec")));
    }
}
