//! End-to-end converge against a real AWS account.
//!
//! Ignored by default because it creates (and deletes) billable resources
//! and needs live credentials:
//!
//! ```sh
//! cargo test -p siteflow-cloud-aws -- --ignored
//! ```

use siteflow_cloud::{CloudProvider, SiteSpec, desired_site};
use siteflow_cloud_aws::AwsProvider;

const REGION: &str = "us-east-1";

fn unique_site() -> String {
    format!("siteflow-e2e-{}", chrono::Utc::now().timestamp())
}

fn write_source_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        "<html><body>siteflow e2e index</body></html>",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("error.html"),
        "<html><body>siteflow e2e error</body></html>",
    )
    .unwrap();
    dir
}

#[tokio::test]
#[ignore]
async fn converge_serves_index_and_error_document() {
    let site = unique_site();
    let source = write_source_dir();

    let spec = SiteSpec {
        site: site.clone(),
        bucket: site.clone(),
        provider: "aws".to_string(),
        source_path: source.path().display().to_string(),
        index_document: "index.html".to_string(),
        error_document: "error.html".to_string(),
    };
    let desired = desired_site(&spec);

    let provider = AwsProvider::connect(REGION, &spec.site, &spec.bucket).await;
    let auth = provider.check_auth().await.unwrap();
    assert!(auth.authenticated, "auth failed: {:?}", auth.error);

    let plan = provider.plan(&desired).await.unwrap();
    assert!(plan.has_changes);

    let result = provider.apply(&plan).await.unwrap();
    assert!(result.is_success(), "apply failed: {:?}", result.failed);

    let outputs = provider.outputs().await.unwrap().expect("no outputs");
    assert!(outputs.origin_url.starts_with("http://"));
    assert!(outputs.cdn_url.starts_with("https://"));

    // The bucket website endpoint serves immediately; the distribution can
    // take minutes to propagate, so only the origin is probed here.
    let http = reqwest::Client::new();

    let index = http.get(&outputs.origin_url).send().await.unwrap();
    assert_eq!(index.status(), 200);
    assert!(index.text().await.unwrap().contains("siteflow e2e index"));

    let missing = http
        .get(format!("{}/definitely-missing", outputs.origin_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
    assert!(missing.text().await.unwrap().contains("siteflow e2e error"));

    let teardown = provider.destroy_all().await.unwrap();
    assert!(teardown.is_success(), "teardown failed: {:?}", teardown.failed);
}
