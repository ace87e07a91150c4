//! The "following" feed: a fixed list of strategies tried in order until one
//! produces posts.

use log::debug;
use serde::Serialize;

use crate::database::repository::{PostRepository, UserRepository};
use crate::middleware::auth::SessionUser;
use crate::post::post_model::{Post, PostQuery, PostSort};
use crate::utils::error::CustomError;

pub const PERSONALIZED_LIMIT: i64 = 20;
pub const POPULAR_FALLBACK_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    /// Newest posts by the authors the caller follows.
    Personalized,
    /// Most upvoted posts.
    Popular,
    Empty,
}

impl FeedSource {
    pub const ORDER: [FeedSource; 3] = [
        FeedSource::Personalized,
        FeedSource::Popular,
        FeedSource::Empty,
    ];

    /// `Ok(None)` hands over to the next strategy.
    pub async fn run(
        self,
        posts: &dyn PostRepository,
        users: &dyn UserRepository,
        session: Option<&SessionUser>,
    ) -> Result<Option<Vec<Post>>, CustomError> {
        match self {
            FeedSource::Personalized => personalized(posts, users, session).await,
            FeedSource::Popular => {
                let popular = posts
                    .list_posts(&PostQuery::published(
                        PostSort::VotesDesc,
                        Some(POPULAR_FALLBACK_LIMIT),
                    ))
                    .await?;
                Ok(Some(popular).filter(|p| !p.is_empty()))
            }
            FeedSource::Empty => Ok(Some(Vec::new())),
        }
    }
}

async fn personalized(
    posts: &dyn PostRepository,
    users: &dyn UserRepository,
    session: Option<&SessionUser>,
) -> Result<Option<Vec<Post>>, CustomError> {
    let Some(session) = session else {
        return Ok(None);
    };
    let Some(me) = users.find_by_id(&session.id).await? else {
        debug!("session user {} no longer exists", session.id.to_hex());
        return Ok(None);
    };
    if me.following.is_empty() {
        return Ok(None);
    }

    let emails: Vec<String> = users
        .find_by_ids(&me.following)
        .await?
        .into_iter()
        .map(|u| u.email)
        .collect();
    if emails.is_empty() {
        return Ok(None);
    }

    let mut query = PostQuery::published(PostSort::CreatedDesc, Some(PERSONALIZED_LIMIT));
    query.author_emails = Some(emails);
    let found = posts.list_posts(&query).await?;
    Ok(Some(found).filter(|p| !p.is_empty()))
}

/// Runs the strategies in `FeedSource::ORDER` and returns the first hit.
pub async fn following_feed(
    posts: &dyn PostRepository,
    users: &dyn UserRepository,
    session: Option<&SessionUser>,
) -> Result<(FeedSource, Vec<Post>), CustomError> {
    for source in FeedSource::ORDER {
        if let Some(found) = source.run(posts, users, session).await? {
            return Ok((source, found));
        }
    }
    Ok((FeedSource::Empty, Vec::new()))
}
