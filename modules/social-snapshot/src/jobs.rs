// Per-platform job construction: which dataset, which request, where the output goes.

use brightdata_client::{Dataset, JobRequest};

use crate::sink::Locator;

/// One trigger/poll/write unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub dataset: Dataset,
    pub request: JobRequest,
    pub locator: Locator,
}

impl Job {
    pub fn instagram_profile(handle: &str) -> Self {
        let handle = clean_handle(handle);
        Self {
            dataset: Dataset::InstagramProfile,
            request: Dataset::InstagramProfile.request(handle),
            locator: Locator::new(format!("instagram_{handle}"), "about"),
        }
    }

    pub fn instagram_posts(handle: &str, num_of_posts: u32) -> Self {
        let handle = clean_handle(handle);
        Self {
            dataset: Dataset::InstagramPosts,
            request: Dataset::InstagramPosts
                .request(handle)
                .with_param("num_of_posts", num_of_posts),
            locator: Locator::new(
                format!("instagram_data_{handle}"),
                format!("instagram_post_{handle}_data"),
            ),
        }
    }

    pub fn linkedin_profile(handle: &str) -> Self {
        let handle = clean_handle(handle);
        Self {
            dataset: Dataset::LinkedInProfile,
            request: Dataset::LinkedInProfile.request(handle),
            locator: Locator::new(format!("linkedin_{handle}"), "about"),
        }
    }

    pub fn x_profile(handle: &str) -> Self {
        let handle = clean_handle(handle);
        Self {
            dataset: Dataset::XProfile,
            request: Dataset::XProfile.request(handle),
            locator: Locator::new(format!("xcom_{handle}"), "profile"),
        }
    }

    /// `post` is a status id or a full status URL.
    pub fn x_post(post: &str) -> Self {
        let post = post.trim();
        let path = post.split(['?', '#']).next().unwrap_or(post);
        let stem = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(post);
        Self {
            dataset: Dataset::XPost,
            request: Dataset::XPost.request(post),
            locator: Locator::new("xcom_posts", stem),
        }
    }

    pub fn youtube_profile(handle: &str) -> Self {
        let handle = clean_handle(handle);
        Self {
            dataset: Dataset::YouTubeProfile,
            request: Dataset::YouTubeProfile.request(handle),
            locator: Locator::new(format!("youtube_{handle}"), "about"),
        }
    }

    /// Videos of a channel. Absent dates are sent as empty strings (no bound).
    pub fn youtube_channel(
        channel_id: &str,
        num_of_posts: u32,
        from_date: Option<&str>,
        until_date: Option<&str>,
        handle: Option<&str>,
    ) -> Self {
        let channel_id = channel_id.trim();
        let folder = match handle {
            Some(handle) => format!("youtube_{}", clean_handle(handle)),
            None => format!("youtube_{channel_id}"),
        };
        Self {
            dataset: Dataset::YouTubeChannel,
            request: Dataset::YouTubeChannel
                .request(channel_id)
                .with_param("num_of_posts", num_of_posts)
                .with_param("start_date", from_date.unwrap_or_default())
                .with_param("end_date", until_date.unwrap_or_default()),
            locator: Locator::new(folder, format!("youtube_channel_{channel_id}_data")),
        }
    }
}

fn clean_handle(handle: &str) -> &str {
    handle.trim().trim_start_matches('@').trim_end_matches('/')
}
