use crate::poll::{PollPolicy, Readiness};
use crate::types::{Discovery, JobRequest, TriggerQuery};

/// Dataset for Instagram profile pages.
const INSTAGRAM_PROFILE: &str = "gd_l1vikfch901nx3by4";

/// Dataset for Instagram posts discovered from a profile URL.
const INSTAGRAM_POSTS: &str = "gd_lk5ns7kz21pck8jpis";

/// Dataset for LinkedIn person profiles.
const LINKEDIN_PROFILE: &str = "gd_l1viktl72bvl7bjuj0";

/// Dataset for X profiles.
const X_PROFILE: &str = "gd_lwxmeb2u1cniijd7t4";

/// Dataset for single X posts.
const X_POST: &str = "gd_lwxkxvnf1cynvib9co";

/// Dataset for YouTube channel "about" pages.
const YOUTUBE_PROFILE: &str = "gd_lk538t2k2p1k3oos71";

/// Dataset for YouTube videos discovered from a channel URL.
const YOUTUBE_CHANNEL: &str = "gd_lk56epmy2i5g7lzu0k";

/// One configured scrape target on the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    InstagramProfile,
    InstagramPosts,
    LinkedInProfile,
    XProfile,
    XPost,
    YouTubeProfile,
    YouTubeChannel,
}

/// Everything the client needs to run a job against a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub dataset_id: &'static str,
    pub discovery: Option<Discovery>,
    pub readiness: Readiness,
    pub poll: PollPolicy,
    /// Ask the snapshot endpoint for `format=json` explicitly.
    pub snapshot_format: bool,
    pub uncompressed_webhook: bool,
}

impl DatasetSpec {
    pub fn trigger_query(&self) -> TriggerQuery {
        let query = TriggerQuery::new(self.dataset_id)
            .with_uncompressed_webhook(self.uncompressed_webhook);
        match self.discovery {
            Some(discovery) => query.with_discovery(discovery),
            None => query,
        }
    }
}

impl Dataset {
    pub fn spec(self) -> DatasetSpec {
        match self {
            Dataset::InstagramProfile => singleton(INSTAGRAM_PROFILE),
            Dataset::LinkedInProfile => singleton(LINKEDIN_PROFILE),
            Dataset::XProfile => singleton(X_PROFILE),
            Dataset::YouTubeProfile => singleton(YOUTUBE_PROFILE),
            Dataset::XPost => DatasetSpec {
                poll: PollPolicy::long_posts(),
                ..singleton(X_POST)
            },
            Dataset::InstagramPosts => DatasetSpec {
                dataset_id: INSTAGRAM_POSTS,
                discovery: Some(Discovery::new_by("profile_url")),
                readiness: Readiness::first_record_has("shortcode"),
                poll: PollPolicy::posts(),
                snapshot_format: true,
                uncompressed_webhook: false,
            },
            Dataset::YouTubeChannel => DatasetSpec {
                dataset_id: YOUTUBE_CHANNEL,
                discovery: Some(Discovery::new_by("url")),
                readiness: Readiness::first_record_has("views"),
                poll: PollPolicy::posts(),
                snapshot_format: true,
                uncompressed_webhook: true,
            },
        }
    }

    /// Public URL of the entity identified by `identifier` (a handle or an id).
    pub fn target_url(self, identifier: &str) -> String {
        let identifier = identifier.trim().trim_start_matches('@');
        match self {
            Dataset::InstagramProfile | Dataset::InstagramPosts => {
                format!("https://www.instagram.com/{identifier}/")
            }
            Dataset::LinkedInProfile => format!("https://www.linkedin.com/in/{identifier}/"),
            Dataset::XProfile => format!("https://x.com/{identifier}"),
            Dataset::XPost => {
                if identifier.starts_with("http://") || identifier.starts_with("https://") {
                    identifier.to_string()
                } else {
                    format!("https://x.com/i/status/{identifier}")
                }
            }
            Dataset::YouTubeProfile => format!("https://www.youtube.com/@{identifier}/about"),
            Dataset::YouTubeChannel => format!("https://www.youtube.com/channel/{identifier}"),
        }
    }

    /// Bare request for the entity, without platform-specific params.
    pub fn request(self, identifier: &str) -> JobRequest {
        JobRequest::new(self.target_url(identifier))
    }

    pub fn name(self) -> &'static str {
        match self {
            Dataset::InstagramProfile => "instagram_profile",
            Dataset::InstagramPosts => "instagram_posts",
            Dataset::LinkedInProfile => "linkedin_profile",
            Dataset::XProfile => "x_profile",
            Dataset::XPost => "x_post",
            Dataset::YouTubeProfile => "youtube_profile",
            Dataset::YouTubeChannel => "youtube_channel",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn singleton(dataset_id: &'static str) -> DatasetSpec {
    DatasetSpec {
        dataset_id,
        discovery: None,
        readiness: Readiness::StatusNotRunning,
        poll: PollPolicy::profile(),
        snapshot_format: false,
        uncompressed_webhook: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_urls() {
        assert_eq!(
            Dataset::InstagramPosts.target_url("nasa"),
            "https://www.instagram.com/nasa/"
        );
        assert_eq!(
            Dataset::YouTubeProfile.target_url("@mkbhd"),
            "https://www.youtube.com/@mkbhd/about"
        );
        assert_eq!(
            Dataset::XPost.target_url("1790000000000000000"),
            "https://x.com/i/status/1790000000000000000"
        );
        assert_eq!(
            Dataset::XPost.target_url("https://x.com/someone/status/42"),
            "https://x.com/someone/status/42"
        );
        assert_eq!(
            Dataset::LinkedInProfile.target_url("satyanadella"),
            "https://www.linkedin.com/in/satyanadella/"
        );
    }

    #[test]
    fn discovery_datasets_use_key_readiness() {
        let spec = Dataset::YouTubeChannel.spec();
        assert_eq!(spec.readiness, Readiness::first_record_has("views"));
        assert_eq!(spec.discovery, Some(Discovery::new_by("url")));
        assert!(spec.snapshot_format);

        let spec = Dataset::InstagramPosts.spec();
        assert_eq!(spec.readiness, Readiness::first_record_has("shortcode"));
        assert!(!spec.trigger_query().uncompressed_webhook);
    }

    #[test]
    fn profiles_poll_quickly() {
        for dataset in [
            Dataset::InstagramProfile,
            Dataset::LinkedInProfile,
            Dataset::XProfile,
            Dataset::YouTubeProfile,
        ] {
            let spec = dataset.spec();
            assert_eq!(spec.readiness, Readiness::StatusNotRunning);
            assert_eq!(spec.poll, PollPolicy::profile());
            assert!(spec.trigger_query().uncompressed_webhook);
        }
        assert_eq!(Dataset::XPost.spec().poll, PollPolicy::long_posts());
    }
}
