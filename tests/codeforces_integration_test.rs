use progress_tracker::codeforces::{
    CodeforcesClient, CodeforcesHttpClient, DEFAULT_BASE_URL, SubmissionPage,
};

fn client() -> CodeforcesHttpClient {
    dotenvy::dotenv().ok();
    let base_url = std::env::var("CODEFORCES_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    CodeforcesHttpClient::new(base_url).expect("Failed to create Codeforces client")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_fetch_live_profile() {
    let profile = client().fetch_profile("tourist").await.expect("profile should exist");
    assert_eq!(profile.handle.to_lowercase(), "tourist");
    assert!(profile.max_rating >= profile.rating);
    assert!(profile.max_rating > 0);
}

#[tokio::test]
#[ignore]
async fn test_fetch_live_history_and_submissions() {
    let client = client();

    let contests = client.fetch_rating_history("tourist").await;
    assert!(!contests.is_empty());
    for c in &contests {
        assert_eq!(c.rating_change, c.new_rating - c.old_rating);
    }

    let page = SubmissionPage { from: 1, count: Some(10) };
    let submissions = client.fetch_submissions("tourist", page).await;
    assert!(!submissions.is_empty());
    assert!(submissions.len() <= 10);
}

#[tokio::test]
#[ignore]
async fn test_unknown_handle_degrades_to_empty() {
    let client = client();
    let handle = "this_handle_should_not_exist_0000";

    assert!(client.fetch_profile(handle).await.is_none());
    assert!(client.fetch_rating_history(handle).await.is_empty());
}
