pub mod api;
pub mod metrics;


pub use api::ThreadsApiClient;

use threadcard_core::{CoreError, Liker, PostId, Profile, Thread, UserId};

/// Operations the lookup pipeline needs from the Threads web API.
///
/// One value is one session: open it per request, finish with
/// [`ThreadsApi::close_gracefully`].
pub trait ThreadsApi {
    /// `Ok(None)` when no profile exists under `username`.
    async fn get_user_id_from_username(&self, username: &str)
        -> Result<Option<UserId>, CoreError>;

    async fn get_user_profile(&self, user_id: &str) -> Result<Profile, CoreError>;

    /// Most recent threads, newest first, without likers attached.
    async fn get_user_threads(&self, user_id: &str) -> Result<Vec<Thread>, CoreError>;

    async fn get_post_id_from_url(&self, post_url: &str) -> Result<Option<PostId>, CoreError>;

    async fn get_post_likes(&self, post_id: &str) -> Result<Vec<Liker>, CoreError>;

    /// Public URL of the post with short code `code`.
    fn post_url(&self, code: &str) -> String;

    async fn close_gracefully(self)
    where
        Self: Sized;
}
