//! Application service — artifact upload use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{ApiResponse, FailOnError, ProgressReporter, VendorApi};
use crate::domain::{ArtifactKind, RunError, RunnerConfig, UploadResult};

/// Upload one file to `url` and return the raw response.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, the request fails, or the
/// status is non-2xx while `fail` is [`FailOnError::Yes`].
pub fn upload_file(
    api: &impl VendorApi,
    url: &str,
    path: &Path,
    fail: FailOnError,
) -> Result<ApiResponse> {
    api.post_file(url, path, fail)
        .with_context(|| format!("uploading {}", path.display()))
}

/// Upload an artifact and extract the vendor-issued URL for it.
///
/// # Errors
///
/// Returns an error if the upload fails or the response lacks the URL field.
pub fn upload_artifact(
    api: &impl VendorApi,
    config: &RunnerConfig,
    kind: ArtifactKind,
    path: &Path,
) -> Result<UploadResult> {
    let url = config.endpoint(kind.endpoint());
    let response = upload_file(api, &url, path, FailOnError::Yes)?;
    let artifact_url = response
        .str_field(kind.url_field())
        .ok_or(RunError::MissingField {
            url,
            field: kind.url_field(),
        })?;
    Ok(UploadResult {
        kind,
        local_path: path.to_path_buf(),
        url: artifact_url.to_owned(),
    })
}

/// Upload the app and the test suite, in that order.
///
/// # Errors
///
/// Returns the first upload failure; the test suite is not uploaded if the
/// app upload fails.
pub fn upload_artifacts(
    api: &impl VendorApi,
    config: &RunnerConfig,
    reporter: &impl ProgressReporter,
    app_file: &Path,
    tests_file: &Path,
) -> Result<(UploadResult, UploadResult)> {
    reporter.step(&format!("uploading {}...", app_file.display()));
    let app = upload_artifact(api, config, ArtifactKind::App, app_file)?;
    reporter.success(&format!("app uploaded: {}", app.url));

    reporter.step(&format!("uploading {}...", tests_file.display()));
    let tests = upload_artifact(api, config, ArtifactKind::TestSuite, tests_file)?;
    reporter.success(&format!("test suite uploaded: {}", tests.url));

    Ok((app, tests))
}
