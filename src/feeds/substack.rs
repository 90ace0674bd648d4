//! Newsletter directory built from static profile files, plus a digest of
//! the latest posts of every newsletter.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};
use url::Url;

use crate::config::{SUBDOMAIN_PLACEHOLDER, SubstackConfig};
use crate::feeds::digest::{fetch_all, sort_newest_first};
use crate::feeds::errors::FeedError;
use crate::feeds::model::{Blog, FeedDocument, ParsedFeed, SubstackPost, SubstackProfile};
use crate::fetcher::Fetcher;
use crate::output::{JsonStyle, write_json};

pub const POSTS_FILE: &str = "posts.json";
pub const BLOGS_FILE: &str = "blogs.json";

/// Every regular file in `dir`, parsed as a profile, in file name order.
pub async fn load_profiles(dir: &Path) -> Result<Vec<(PathBuf, SubstackProfile)>, FeedError> {
    let io_err = |source| FeedError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    let mut listing = fs::read_dir(dir).await.map_err(io_err)?;
    while let Some(entry) = listing.next_entry().await.map_err(io_err)? {
        if entry.file_type().await.map_err(io_err)?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut profiles = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)
            .await
            .map_err(|source| FeedError::Io {
                path: path.clone(),
                source,
            })?;
        let profile = serde_json::from_str(&text).map_err(|source| FeedError::Profile {
            path: path.clone(),
            source,
        })?;
        profiles.push((path, profile));
    }
    Ok(profiles)
}

pub fn blog_from_profile(profile: SubstackProfile, feed_url_template: &str) -> Blog {
    Blog {
        feed_url: feed_url_template.replace(SUBDOMAIN_PLACEHOLDER, &profile.subdomain),
        logo: profile.logo_url,
        name: profile.name,
        hero_text: profile.hero_text,
        base_url: profile.base_url,
    }
}

/// The first `limit` entries of a newsletter feed, tagged with the channel.
pub fn posts_from_feed(blog: &Blog, feed: ParsedFeed, limit: usize) -> Vec<SubstackPost> {
    let channel_title = feed.title;
    feed.entries
        .into_iter()
        .take(limit)
        .map(|entry| SubstackPost {
            channel_title: channel_title.clone(),
            channel_url: blog.base_url.clone(),
            channel_logo: blog.logo.clone(),
            title: entry.title,
            url: entry.link,
            published: entry.published,
            published_at: entry.published_at,
        })
        .collect()
}

/// Newsletter directory and post digest for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub blogs: Vec<Blog>,
    pub posts: Vec<SubstackPost>,
}

pub async fn collect(config: &SubstackConfig, fetcher: &Fetcher) -> Result<Directory, FeedError> {
    let blogs: Vec<Blog> = load_profiles(&config.metadata_dir)
        .await?
        .into_iter()
        .map(|(_, profile)| blog_from_profile(profile, &config.feed_url_template))
        .collect();
    info!(blogs = blogs.len(), "loaded newsletter profiles");

    let urls = blogs
        .iter()
        .map(|blog| {
            Url::parse(&blog.feed_url).map_err(|source| FeedError::FeedUrl {
                name: blog.name.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut posts = Vec::new();
    let fetched = fetch_all(fetcher, &urls, config.concurrency).await;
    for (index, (blog, (url, result))) in blogs.iter().zip(fetched).enumerate() {
        match result {
            Ok(feed) => {
                info!(feed = index + 1, of = blogs.len(), %url, "processed newsletter feed");
                posts.extend(posts_from_feed(blog, feed, config.per_feed_limit));
            }
            Err(err) => warn!(%url, error = %err, "skipping newsletter feed"),
        }
    }
    sort_newest_first(&mut posts, |post| post.published_at);
    info!(posts = posts.len(), "built newsletter digest");

    Ok(Directory { blogs, posts })
}

pub async fn run(config: &SubstackConfig, fetcher: &Fetcher) -> Result<Directory, FeedError> {
    let directory = collect(config, fetcher).await?;

    let posts = FeedDocument {
        feed: directory.posts.clone(),
    };
    write_json(&config.export_dir.join(POSTS_FILE), &posts, JsonStyle::Compact).await?;

    let blogs = FeedDocument {
        feed: directory.blogs.clone(),
    };
    write_json(&config.export_dir.join(BLOGS_FILE), &blogs, JsonStyle::Compact).await?;

    Ok(directory)
}
