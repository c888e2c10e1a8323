//! The lookup pipeline: fetch, aggregate, render.

use crate::AppState;
use card_renderer::CardRequest;
use futures::future::try_join_all;
use threadcard_core::{top_engaged_friends, CoreError, Liker, Thread, UserData};
use threads_client::{ThreadsApi, ThreadsApiClient};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct LookupSettings {
    pub likes_per_thread: usize,
    pub top_friends: usize,
}

#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub data: UserData,
    /// Where the rendered card is served; `None` when nothing was drawn.
    pub image_url: Option<String>,
}

/// Resolves `username`, then gathers profile, threads with their likers and
/// the friend ranking. An unknown username yields empty data, not an error.
pub async fn fetch_user_data<A: ThreadsApi>(
    api: &A,
    username: &str,
    settings: LookupSettings,
) -> Result<UserData, CoreError> {
    let Some(user_id) = api.get_user_id_from_username(username).await? else {
        info!("No Threads user named {}", username);
        return Ok(UserData::default());
    };

    let profile = api.get_user_profile(&user_id).await?;
    let mut threads = api.get_user_threads(&user_id).await?;
    attach_likes(api, &mut threads, settings.likes_per_thread).await?;

    // handles resolve case-insensitively, so rank against the canonical one
    let top_friends = top_engaged_friends(&profile.username, &threads, settings.top_friends);
    debug!(
        "Ranked {} friends for {} across {} threads",
        top_friends.len(),
        profile.username,
        threads.len()
    );

    Ok(UserData {
        user_id: Some(user_id),
        profile: Some(profile),
        threads,
        top_friends,
    })
}

/// Fetches every thread's likers concurrently. One failed fetch fails all.
pub async fn attach_likes<A: ThreadsApi>(
    api: &A,
    threads: &mut [Thread],
    likes_per_thread: usize,
) -> Result<(), CoreError> {
    let likes = try_join_all(
        threads
            .iter()
            .map(|thread| likes_for_post(api, thread.post_code(), likes_per_thread)),
    )
    .await?;

    for (thread, likes) in threads.iter_mut().zip(likes) {
        thread.likes = likes;
    }
    Ok(())
}

async fn likes_for_post<A: ThreadsApi>(
    api: &A,
    post_code: &str,
    limit: usize,
) -> Result<Vec<Liker>, CoreError> {
    let post_url = api.post_url(post_code);
    let Some(post_id) = api.get_post_id_from_url(&post_url).await? else {
        debug!("No post ID behind {}, counting no likes", post_url);
        return Ok(Vec::new());
    };

    let mut likes = api.get_post_likes(&post_id).await?;
    likes.truncate(limit);
    Ok(likes)
}

/// Runs one lookup on its own client session and renders the card when the
/// user has threads.
pub async fn run_lookup(state: &AppState, username: &str) -> Result<LookupOutcome, CoreError> {
    let settings = LookupSettings {
        likes_per_thread: state.config.threads.likes_per_thread,
        top_friends: state.config.threads.top_friends,
    };

    let api = ThreadsApiClient::new(state.config.threads.clone())?;
    let fetched = fetch_user_data(&api, username, settings).await;
    api.close_gracefully().await;
    let data = fetched?;

    if !data.has_threads() {
        info!("{} has no threads, skipping the card", username);
        return Ok(LookupOutcome {
            data,
            image_url: None,
        });
    }

    let card = card_request(username, &data);
    let path = state.renderer.render(&card, &state.avatars).await?;
    let image_url = path
        .file_name()
        .map(|name| format!("/static/{}", name.to_string_lossy()));

    Ok(LookupOutcome { data, image_url })
}

fn card_request(username: &str, data: &UserData) -> CardRequest {
    CardRequest {
        username: username.to_string(),
        follower_count: data.profile.as_ref().map_or(0, |p| p.follower_count),
        profile_pic_url: data
            .profile
            .as_ref()
            .and_then(|p| p.profile_pic_url.clone()),
        friends: data.top_friends.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use threadcard_core::{Profile, ThreadsApiError};

    #[derive(Default)]
    struct FakeThreadsApi {
        users: HashMap<String, String>,
        threads: Vec<Thread>,
        post_ids: HashMap<String, String>,
        likes: HashMap<String, Vec<Liker>>,
        failing_post: Option<String>,
        like_requests: AtomicUsize,
    }

    impl ThreadsApi for FakeThreadsApi {
        async fn get_user_id_from_username(
            &self,
            username: &str,
        ) -> Result<Option<String>, CoreError> {
            Ok(self.users.get(username).cloned())
        }

        async fn get_user_profile(&self, user_id: &str) -> Result<Profile, CoreError> {
            Ok(Profile {
                user_id: user_id.to_string(),
                username: "alice".to_string(),
                full_name: None,
                biography: None,
                follower_count: 4200,
                profile_pic_url: Some("https://cdn/alice.jpg".to_string()),
                is_verified: false,
            })
        }

        async fn get_user_threads(&self, _user_id: &str) -> Result<Vec<Thread>, CoreError> {
            Ok(self.threads.clone())
        }

        async fn get_post_id_from_url(
            &self,
            post_url: &str,
        ) -> Result<Option<String>, CoreError> {
            let code = threadcard_core::post_code_from_url(post_url);
            Ok(self.post_ids.get(code).cloned())
        }

        async fn get_post_likes(&self, post_id: &str) -> Result<Vec<Liker>, CoreError> {
            self.like_requests.fetch_add(1, Ordering::SeqCst);
            if self.failing_post.as_deref() == Some(post_id) {
                return Err(ThreadsApiError::ServerError { status_code: 500 }.into());
            }
            Ok(self.likes.get(post_id).cloned().unwrap_or_default())
        }

        fn post_url(&self, code: &str) -> String {
            format!("https://www.threads.net/t/{}", code)
        }

        async fn close_gracefully(self) {}
    }

    fn liker(username: &str) -> Liker {
        Liker {
            username: username.to_string(),
            profile_pic_url: Some(format!("https://cdn/{}.jpg", username)),
        }
    }

    fn thread(code: &str) -> Thread {
        Thread {
            code: code.to_string(),
            post_id: None,
            caption: None,
            like_count: 0,
            likes: Vec::new(),
        }
    }

    fn settings() -> LookupSettings {
        LookupSettings {
            likes_per_thread: 50,
            top_friends: 10,
        }
    }

    fn api_with_two_threads() -> FakeThreadsApi {
        FakeThreadsApi {
            users: HashMap::from([("alice".to_string(), "1".to_string())]),
            threads: vec![thread("AAA"), thread("BBB")],
            post_ids: HashMap::from([
                ("AAA".to_string(), "100".to_string()),
                ("BBB".to_string(), "200".to_string()),
            ]),
            likes: HashMap::from([
                ("100".to_string(), vec![liker("alice"), liker("bob"), liker("carol")]),
                ("200".to_string(), vec![liker("carol"), liker("dave")]),
            ]),
            ..FakeThreadsApi::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_user_data_ranks_friends() {
        let api = api_with_two_threads();

        let data = fetch_user_data(&api, "alice", settings()).await.unwrap();
        assert_eq!(data.user_id.as_deref(), Some("1"));
        assert_eq!(data.profile.unwrap().follower_count, 4200);
        assert_eq!(data.threads[0].likes.len(), 3);
        assert_eq!(data.threads[1].likes.len(), 2);

        let ranked: Vec<&str> = data.top_friends.iter().map(|f| f.username.as_str()).collect();
        assert_eq!(ranked, vec!["carol", "bob", "dave"]);
        assert_eq!(api.like_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_subject_excluded_regardless_of_handle_case() {
        let mut api = api_with_two_threads();
        api.users.insert("Alice".to_string(), "1".to_string());

        let data = fetch_user_data(&api, "Alice", settings()).await.unwrap();
        assert_eq!(data.profile.as_ref().unwrap().username, "alice");

        let ranked: Vec<&str> = data.top_friends.iter().map(|f| f.username.as_str()).collect();
        assert_eq!(ranked, vec!["carol", "bob", "dave"]);
    }

    #[tokio::test]
    async fn test_unknown_user_yields_empty_data() {
        let api = api_with_two_threads();

        let data = fetch_user_data(&api, "nobody", settings()).await.unwrap();
        assert!(data.user_id.is_none());
        assert!(data.profile.is_none());
        assert!(!data.has_threads());
        assert!(data.top_friends.is_empty());
        assert_eq!(api.like_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_user_without_threads() {
        let api = FakeThreadsApi {
            users: HashMap::from([("alice".to_string(), "1".to_string())]),
            ..FakeThreadsApi::default()
        };

        let data = fetch_user_data(&api, "alice", settings()).await.unwrap();
        assert!(data.profile.is_some());
        assert!(data.threads.is_empty());
        assert!(data.top_friends.is_empty());
    }

    #[tokio::test]
    async fn test_likes_are_capped_per_thread() {
        let mut api = api_with_two_threads();
        api.likes.insert(
            "100".to_string(),
            (0..80).map(|i| liker(&format!("fan{i}"))).collect(),
        );

        let data = fetch_user_data(
            &api,
            "alice",
            LookupSettings {
                likes_per_thread: 50,
                top_friends: 10,
            },
        )
        .await
        .unwrap();
        assert_eq!(data.threads[0].likes.len(), 50);
        assert_eq!(data.threads[0].likes[49].username, "fan49");
        assert_eq!(data.top_friends.len(), 10);
    }

    #[tokio::test]
    async fn test_unresolvable_post_has_no_likes() {
        let mut api = api_with_two_threads();
        api.post_ids.remove("BBB");

        let data = fetch_user_data(&api, "alice", settings()).await.unwrap();
        assert!(data.threads[1].likes.is_empty());
        assert_eq!(api.like_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_one_failed_like_fetch_fails_the_batch() {
        let mut api = api_with_two_threads();
        api.failing_post = Some("200".to_string());

        let result = fetch_user_data(&api, "alice", settings()).await;
        assert!(matches!(
            result,
            Err(CoreError::ThreadsApi(ThreadsApiError::ServerError { status_code: 500 }))
        ));
    }
}
