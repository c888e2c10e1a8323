use crate::types::{RankedFriend, Thread};
use std::collections::HashMap;

pub const TOP_FRIENDS_LIMIT: usize = 10;

/// Ranks the users who liked `subject`'s threads by how many of those
/// threads they liked.
///
/// The subject never ranks. Equal counts keep the order in which each liker
/// was first seen, and the avatar URL is the one attached to that first like.
pub fn top_engaged_friends(subject: &str, threads: &[Thread], limit: usize) -> Vec<RankedFriend> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tally: Vec<RankedFriend> = Vec::new();

    for liker in threads.iter().flat_map(|thread| thread.likes.iter()) {
        if liker.username == subject {
            continue;
        }

        match index.get(liker.username.as_str()) {
            Some(&slot) => tally[slot].like_count += 1,
            None => {
                index.insert(liker.username.as_str(), tally.len());
                tally.push(RankedFriend {
                    username: liker.username.clone(),
                    profile_pic_url: liker.profile_pic_url.clone(),
                    like_count: 1,
                });
            }
        }
    }

    // sort_by is stable, so insertion order survives among ties
    tally.sort_by(|a, b| b.like_count.cmp(&a.like_count));
    tally.truncate(limit);
    tally
}
